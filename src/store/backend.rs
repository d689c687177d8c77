//! Object store trait and shared types.
//!
//! [`ObjectStore`] is the seam between the upload pipeline and a concrete
//! store. It exposes the three remote primitives an upload needs (delete,
//! public-read put, wait-until-exists) plus URL resolution. Sequencing and
//! logging live one level up in [`StoreClient`](super::client::StoreClient).

use async_trait::async_trait;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("{operation} failed: {message}")]
    Remote {
        operation: &'static str,
        message: String,
    },
    #[error("object {key} was not readable after {waited:?}")]
    Timeout { key: String, waited: Duration },
    #[error("upload cancelled")]
    Cancelled,
    #[error("store configuration error: {0}")]
    Config(String),
    #[error("invalid object key: {0:?}")]
    InvalidKey(String),
}

/// Bounded polling policy for [`ObjectStore::wait_until_exists`].
///
/// Delays start at `initial_delay` and double up to `max_delay`; the whole
/// wait gives up after `max_wait`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WaitPolicy {
    pub max_wait: Duration,
    pub initial_delay: Duration,
    pub max_delay: Duration,
}

impl WaitPolicy {
    pub fn next_delay(&self, current: Duration) -> Duration {
        current.saturating_mul(2).min(self.max_delay)
    }
}

impl Default for WaitPolicy {
    fn default() -> Self {
        Self {
            max_wait: Duration::from_secs(60),
            initial_delay: Duration::from_millis(100),
            max_delay: Duration::from_secs(5),
        }
    }
}

/// A remote (or remote-like) object store.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Short identifier used in log fields.
    fn name(&self) -> &'static str;

    /// Remove the object at `key`. Deleting a missing object succeeds.
    async fn delete(&self, key: &str) -> Result<(), StoreError>;

    /// Store the contents of `path` at `key`, publicly readable.
    async fn put_public(&self, key: &str, path: &Path, content_type: &str)
    -> Result<(), StoreError>;

    /// Block until the object at `key` is readable, or fail with
    /// [`StoreError::Timeout`] once `policy.max_wait` has elapsed.
    async fn wait_until_exists(&self, key: &str, policy: &WaitPolicy) -> Result<(), StoreError>;

    /// Public URL of the object at `key`.
    fn public_url(&self, key: &str) -> Result<String, StoreError>;
}
