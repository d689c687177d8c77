//! Incoming uploads.
//!
//! An [`IncomingUpload`] is whatever delivered the user's bytes: a request
//! body held in memory, or a temp file the HTTP layer already spooled to disk.
//! The pipeline only needs its size, its extension, and a one-shot move to a
//! path it chooses. `persist_to` consumes the upload, so it can only happen
//! once. Sizes of file-backed uploads come from metadata, so an oversized
//! file is rejected without reading it.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

pub trait IncomingUpload: Send + 'static {
    /// Size of the upload in bytes.
    fn size(&self) -> u64;

    /// Original file extension, without the dot. Empty when there is none.
    fn extension(&self) -> &str;

    /// Write or move the upload's bytes to `dest`.
    fn persist_to(self, dest: &Path) -> io::Result<()>;
}

fn extension_of(file_name: &str) -> &str {
    Path::new(file_name)
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
}

/// An upload held in memory.
#[derive(Debug, Clone)]
pub struct BytesUpload {
    data: Vec<u8>,
    file_name: String,
}

impl BytesUpload {
    pub fn new(data: Vec<u8>, file_name: impl Into<String>) -> Self {
        Self {
            data,
            file_name: file_name.into(),
        }
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }
}

impl IncomingUpload for BytesUpload {
    fn size(&self) -> u64 {
        self.data.len() as u64
    }

    fn extension(&self) -> &str {
        extension_of(&self.file_name)
    }

    fn persist_to(self, dest: &Path) -> io::Result<()> {
        fs::write(dest, self.data)
    }
}

/// An upload backed by a local file.
///
/// A spooled upload ([`FileUpload::new`]) is moved on persist and its path is
/// gone afterwards. A caller's own file ([`FileUpload::local`]) is copied and
/// left in place.
#[derive(Debug, Clone)]
pub struct FileUpload {
    path: PathBuf,
    file_name: String,
    size: u64,
    keep_source: bool,
}

impl FileUpload {
    /// `file_name` is the client-supplied name, used only for its extension.
    pub fn new(path: impl Into<PathBuf>, file_name: impl Into<String>) -> io::Result<Self> {
        let path = path.into();
        let size = fs::metadata(&path)?.len();
        Ok(Self {
            path,
            file_name: file_name.into(),
            size,
            keep_source: false,
        })
    }

    /// A file that stays where it is, named after its own path.
    pub fn local(path: impl Into<PathBuf>) -> io::Result<Self> {
        let path = path.into();
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        Ok(Self {
            keep_source: true,
            ..Self::new(path, file_name)?
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }
}

impl IncomingUpload for FileUpload {
    fn size(&self) -> u64 {
        self.size
    }

    fn extension(&self) -> &str {
        extension_of(&self.file_name)
    }

    fn persist_to(self, dest: &Path) -> io::Result<()> {
        if self.keep_source {
            return fs::copy(&self.path, dest).map(|_| ());
        }
        // rename fails across filesystems; fall back to copy + remove.
        if fs::rename(&self.path, dest).is_ok() {
            return Ok(());
        }
        fs::copy(&self.path, dest)?;
        fs::remove_file(&self.path)
    }
}
