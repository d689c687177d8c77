//! Image uploads: from an incoming file to a stored main image and thumbnail.
//!
//! | Module | Role |
//! |---|---|
//! | [`pipeline`] | [`UploadPipeline`], the step-by-step orchestrator |
//! | `incoming` | [`IncomingUpload`] and its in-memory / spooled-file impls |
//! | `record` | [`ImageRecord`], [`UploadOutcome`], [`Stage`] |
//! | `staging` | temp file layout and the self-deleting [`StagedFile`] |

mod error;
mod incoming;
pub mod pipeline;
mod record;
mod staging;

pub use error::UploadError;
pub use incoming::{BytesUpload, FileUpload, IncomingUpload};
pub use pipeline::{UploadPipeline, UploadSettings};
pub use record::{ImageRecord, Stage, StoredImage, UploadOutcome};
pub use staging::{StagedFile, StagingArea, new_key, sanitize_extension};
