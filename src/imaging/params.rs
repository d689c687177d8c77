//! Parameter types for image operations.
//!
//! These structs describe *what* to do, not *how* to do it. They are the
//! interface between the high-level [`operations`](super::operations) module
//! (which decides geometry and rotation) and the [`backend`](super::backend)
//! (which does the actual pixel work), so the upload pipeline can be tested
//! against a mock backend.
//!
//! ## Types
//!
//! - [`Quality`]: Lossy encoding quality (1–100, default 90). Clamped on construction.
//! - [`NormalizeParams`]: Rewrite a file in place with its orientation corrected.
//! - [`ResizeParams`]: Source, output path and exact target dimensions for a resample.

use std::path::PathBuf;

/// Quality setting for lossy image encoding (1-100).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Quality(u32);

impl Quality {
    pub fn new(value: u32) -> Self {
        Self(value.clamp(1, 100))
    }

    pub fn value(self) -> u32 {
        self.0
    }
}

impl Default for Quality {
    fn default() -> Self {
        Self(90)
    }
}

/// Parameters for an in-place orientation fix.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizeParams {
    pub path: PathBuf,
    /// Used when the file is re-encoded as JPEG.
    pub quality: Quality,
}

/// Parameters for a resample into a new file.
///
/// The output format follows the extension of `output`.
#[derive(Debug, Clone, PartialEq)]
pub struct ResizeParams {
    pub source: PathBuf,
    pub output: PathBuf,
    pub width: u32,
    pub height: u32,
    pub quality: Quality,
}
