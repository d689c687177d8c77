//! High-level image operations.
//!
//! These functions combine calculations with backend execution.
//! They take configuration, compute parameters, and call the backend.

use super::backend::{BackendError, ImageBackend};
use super::calculations::fit_within;
use super::orientation::Rotation;
use super::params::{NormalizeParams, Quality, ResizeParams};
use std::path::Path;
use tracing::debug;

/// Result type for image operations.
pub type Result<T> = std::result::Result<T, BackendError>;

/// Get image dimensions using the backend.
pub fn get_dimensions(backend: &impl ImageBackend, path: &Path) -> Result<(u32, u32)> {
    let dims = backend.identify(path)?;
    Ok((dims.width, dims.height))
}

/// Fix the orientation of `path` in place and strip its metadata.
///
/// An empty path is a no-op: nothing is opened and no rotation is reported.
pub fn normalize_orientation(
    backend: &impl ImageBackend,
    path: &Path,
    quality: Quality,
) -> Result<Rotation> {
    if path.as_os_str().is_empty() {
        return Ok(Rotation::None);
    }

    let rotation = backend.normalize(&NormalizeParams {
        path: path.to_path_buf(),
        quality,
    })?;
    debug!(
        path = %path.display(),
        degrees = rotation.degrees(),
        "normalized orientation"
    );
    Ok(rotation)
}

/// Plan a resize into a `max_size` bounding square without executing it.
///
/// Edges that round down to zero are kept at one pixel so the output is
/// always encodable.
pub fn plan_resize(
    source: &Path,
    output: &Path,
    original: (u32, u32),
    max_size: u32,
    quality: Quality,
) -> ResizeParams {
    let (width, height) = fit_within(original, max_size);

    ResizeParams {
        source: source.to_path_buf(),
        output: output.to_path_buf(),
        width: width.max(1),
        height: height.max(1),
        quality,
    }
}

/// Resize `source` into a new file at `output`, longer edge = `max_size`.
///
/// The source is left untouched. Returns the output dimensions.
pub fn resize_to_fit(
    backend: &impl ImageBackend,
    source: &Path,
    output: &Path,
    max_size: u32,
    quality: Quality,
) -> Result<(u32, u32)> {
    let original = get_dimensions(backend, source)?;
    let params = plan_resize(source, output, original, max_size, quality);
    backend.resize(&params)?;

    debug!(
        source = %source.display(),
        output = %output.display(),
        width = params.width,
        height = params.height,
        "resized image"
    );
    Ok((params.width, params.height))
}
