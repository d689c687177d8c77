use crate::imaging::BackendError;
use crate::store::StoreError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum UploadError {
    #[error("upload is {size} bytes, limit is {limit}")]
    TooLarge { size: u64, limit: u64 },
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("image processing failed: {0}")]
    Imaging(#[from] BackendError),
    #[error("object store error: {0}")]
    Store(StoreError),
    #[error("background task failed: {0}")]
    Task(String),
    #[error("upload cancelled")]
    Cancelled,
}

impl From<StoreError> for UploadError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::Cancelled => UploadError::Cancelled,
            other => UploadError::Store(other),
        }
    }
}

impl From<tokio::task::JoinError> for UploadError {
    fn from(e: tokio::task::JoinError) -> Self {
        UploadError::Task(e.to_string())
    }
}
