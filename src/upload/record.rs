//! What an upload produces.
//!
//! [`ImageRecord`] is the caller-owned record the pipeline fills in as it
//! goes. [`UploadOutcome`] is the structured result: either every field of a
//! [`StoredImage`], or the [`Stage`] that failed and why.

use super::error::UploadError;
use serde::Serialize;
use std::fmt;

/// Caller-owned image record.
///
/// `main` is written as soon as the main upload succeeds, so a failed upload
/// can leave it set while `thumbnail` is still empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ImageRecord {
    pub main: Option<String>,
    pub thumbnail: Option<String>,
    pub width: u32,
    pub height: u32,
}

impl ImageRecord {
    /// Both URLs present and non-empty.
    pub fn is_complete(&self) -> bool {
        let present = |url: &Option<String>| url.as_deref().is_some_and(|u| !u.is_empty());
        present(&self.main) && present(&self.thumbnail)
    }
}

/// Steps of an upload, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Validate,
    Persist,
    Normalize,
    UploadMain,
    Resize,
    UploadThumbnail,
    Finalize,
}

impl Stage {
    pub fn as_str(self) -> &'static str {
        match self {
            Stage::Validate => "validate",
            Stage::Persist => "persist",
            Stage::Normalize => "normalize",
            Stage::UploadMain => "upload_main",
            Stage::Resize => "resize",
            Stage::UploadThumbnail => "upload_thumbnail",
            Stage::Finalize => "finalize",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A fully stored image.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StoredImage {
    pub main_url: String,
    pub thumbnail_url: String,
    pub width: u32,
    pub height: u32,
}

#[derive(Debug)]
pub enum UploadOutcome {
    Success(StoredImage),
    Failure { stage: Stage, cause: UploadError },
}

impl UploadOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, UploadOutcome::Success(_))
    }

    pub fn stored(&self) -> Option<&StoredImage> {
        match self {
            UploadOutcome::Success(stored) => Some(stored),
            UploadOutcome::Failure { .. } => None,
        }
    }

    pub fn failed_stage(&self) -> Option<Stage> {
        match self {
            UploadOutcome::Success(_) => None,
            UploadOutcome::Failure { stage, .. } => Some(*stage),
        }
    }

    pub fn into_result(self) -> Result<StoredImage, (Stage, UploadError)> {
        match self {
            UploadOutcome::Success(stored) => Ok(stored),
            UploadOutcome::Failure { stage, cause } => Err((stage, cause)),
        }
    }
}
