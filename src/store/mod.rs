//! Remote object storage.
//!
//! | Type | Role |
//! |---|---|
//! | [`ObjectStore`] | trait: delete, public-read put, wait-until-exists, URL |
//! | [`S3Store`] | S3 and S3-compatible providers via `aws-sdk-s3` |
//! | [`LocalStore`] | files under a directory, for development and tests |
//! | [`StoreClient`] | the upload sequence (delete → put → wait → URL) with logging |

pub mod backend;
mod client;
mod local;
mod s3;

pub use backend::{ObjectStore, StoreError, WaitPolicy};
pub use client::StoreClient;
pub use local::LocalStore;
pub use s3::S3Store;

use crate::config::{StoreBackend, StoreConfig};
use std::path::Path;
use std::sync::Arc;
use url::Url;

/// Build the store selected by `config.backend`.
pub fn build_store(config: &StoreConfig) -> Result<Arc<dyn ObjectStore>, StoreError> {
    let store: Arc<dyn ObjectStore> = match config.backend {
        StoreBackend::S3 => Arc::new(S3Store::new(&config.s3)?),
        StoreBackend::Local => Arc::new(LocalStore::new(
            &config.local.root,
            &config.local.base_url,
        )?),
    };
    Ok(store)
}

/// MIME type for an uploaded file, from its extension.
pub fn content_type_for(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase());
    match ext.as_deref() {
        Some("jpg" | "jpeg") => "image/jpeg",
        Some("png") => "image/png",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        Some("tif" | "tiff") => "image/tiff",
        Some("svg") => "image/svg+xml",
        Some("pdf") => "application/pdf",
        Some("txt") => "text/plain",
        Some("json") => "application/json",
        _ => "application/octet-stream",
    }
}

/// Parse a base URL, forcing a trailing `/` so keys join under it instead of
/// replacing its last segment.
fn parse_base_url(raw: &str) -> Result<Url, StoreError> {
    let normalized = if raw.ends_with('/') {
        raw.to_string()
    } else {
        format!("{raw}/")
    };
    Url::parse(&normalized).map_err(|e| StoreError::Config(format!("invalid base URL {raw:?}: {e}")))
}
