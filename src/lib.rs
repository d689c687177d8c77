//! # Image Uploader
//!
//! Takes a user-submitted image, fixes its orientation, makes a 300px
//! thumbnail, stores both in an object store, and reports their public URLs
//! and the image's pixel dimensions.
//!
//! # Architecture: One Pipeline, Two Seams
//!
//! ```text
//! incoming file → validate → persist → normalize → upload main
//!                                                 → resize → upload thumbnail → finalize
//! ```
//!
//! The pipeline in [`upload`] only sequences steps. Pixel work sits behind the
//! [`imaging::ImageBackend`] trait and remote storage behind
//! [`store::ObjectStore`], so the whole state machine (including every
//! failure branch and its cleanup) is unit tested against recording mocks.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`upload`] | The pipeline, incoming uploads, records and outcomes, temp file staging |
//! | [`imaging`] | Pure-Rust image operations: geometry, orientation fix, resize |
//! | [`store`] | Object store trait, S3 and local backends, the upload sequence client |
//! | [`config`] | TOML config loading, validation and stock defaults |
//! | [`output`] | CLI output formatting |
//!
//! # Design Decisions
//!
//! ## Structured Outcomes Over Flags
//!
//! [`upload::UploadPipeline::upload`] returns an [`upload::UploadOutcome`]:
//! either every stored field, or the [`upload::Stage`] that failed and its
//! typed cause. The record-filling entry point
//! ([`upload::UploadPipeline::upload_into`]) still returns a plain `bool`, and
//! the record may hold the main URL after a later failure; the flag is what
//! counts.
//!
//! ## Temp Files Are Guards
//!
//! Local temp files are [`upload::StagedFile`] values that delete themselves
//! on drop. Every exit path, including cancellation and panics in blocking
//! tasks, removes both the main file and the thumbnail. Blocking jobs share
//! ownership of the guards they work on, so when a caller drops an upload
//! mid-step the files go away as soon as the last running job finishes.
//!
//! ## Verified Durability
//!
//! An upload is not done when the put returns: [`store::StoreClient`] waits
//! until the store reports the object readable, bounded by the configured
//! [`store::WaitPolicy`] and cancellable by the caller.
//!
//! ## Pure-Rust Imaging
//!
//! Decoding, rotation, Lanczos3 resampling and encoding all use the `image`
//! crate. No system libraries, and re-encoding drops EXIF along the way.

pub mod config;
pub mod imaging;
pub mod output;
pub mod store;
pub mod upload;

#[cfg(test)]
pub(crate) mod test_helpers;
