//! Local staging of upload temp files.
//!
//! Each artifact gets a fresh UUID v4 key. The local file lives at
//! `<dir>/<key>.<ext>`; the remote object uses the bare key. A [`StagedFile`]
//! removes its file when dropped, so temp files never outlive the upload that
//! created them, whichever way it ends.

use crate::config::UploadsConfig;
use std::fs;
use std::io::{self, ErrorKind};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use uuid::Uuid;

#[derive(Debug, Clone)]
pub struct StagingArea {
    dir: PathBuf,
}

impl StagingArea {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn from_config(config: &UploadsConfig) -> Self {
        Self::new(config.staging_dir())
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Claim a fresh key and its local path. Creates the directory if needed;
    /// the file itself is not created.
    pub fn reserve(&self, extension: &str) -> io::Result<StagedFile> {
        fs::create_dir_all(&self.dir)?;
        let key = new_key();
        let path = self.dir.join(file_name(&key, extension));
        Ok(StagedFile { key, path })
    }
}

pub fn new_key() -> String {
    Uuid::new_v4().to_string()
}

/// Keep only ASCII alphanumerics, lowercased, so client-supplied extensions
/// cannot smuggle path separators into the staging path.
pub fn sanitize_extension(raw: &str) -> String {
    raw.chars()
        .filter(char::is_ascii_alphanumeric)
        .map(|c| c.to_ascii_lowercase())
        .collect()
}

fn file_name(key: &str, extension: &str) -> String {
    if extension.is_empty() {
        key.to_string()
    } else {
        format!("{key}.{extension}")
    }
}

/// A staged temp file, deleted on drop.
#[derive(Debug)]
pub struct StagedFile {
    key: String,
    path: PathBuf,
}

impl StagedFile {
    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for StagedFile {
    fn drop(&mut self) {
        match fs::remove_file(&self.path) {
            Ok(()) => debug!(path = %self.path.display(), "removed temp file"),
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(e) => warn!(
                path = %self.path.display(),
                error = %e,
                "could not remove temp file"
            ),
        }
    }
}
