//! Filesystem-backed object store.
//!
//! Objects live as plain files under `root`, addressed by key. Useful for
//! development (serve `root` with any static file server) and for exercising
//! the whole pipeline in tests without a network.

use super::backend::{ObjectStore, StoreError, WaitPolicy};
use async_trait::async_trait;
use std::io::ErrorKind;
use std::path::{Component, Path, PathBuf};
use tokio::time::Instant;
use tracing::debug;
use url::Url;

pub struct LocalStore {
    root: PathBuf,
    base_url: Url,
}

impl LocalStore {
    pub fn new(root: impl Into<PathBuf>, base_url: &str) -> Result<Self, StoreError> {
        Ok(Self {
            root: root.into(),
            base_url: super::parse_base_url(base_url)?,
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolve `key` to a path under `root`.
    ///
    /// A leading `/` is ignored. Keys that are empty or step outside `root`
    /// are rejected.
    pub fn object_path(&self, key: &str) -> Result<PathBuf, StoreError> {
        let trimmed = relative_key(key)?;
        Ok(self.root.join(trimmed))
    }
}

fn relative_key(key: &str) -> Result<&str, StoreError> {
    let trimmed = key.trim_start_matches('/');
    let safe = !trimmed.is_empty()
        && Path::new(trimmed)
            .components()
            .all(|c| matches!(c, Component::Normal(_)));
    if safe {
        Ok(trimmed)
    } else {
        Err(StoreError::InvalidKey(key.to_string()))
    }
}

fn partial_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(".partial");
    path.with_file_name(name)
}

#[async_trait]
impl ObjectStore for LocalStore {
    fn name(&self) -> &'static str {
        "local"
    }

    async fn delete(&self, key: &str) -> Result<(), StoreError> {
        let path = self.object_path(key)?;
        match tokio::fs::remove_file(&path).await {
            Ok(()) => {
                debug!(path = %path.display(), "deleted object");
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    async fn put_public(
        &self,
        key: &str,
        path: &Path,
        _content_type: &str,
    ) -> Result<(), StoreError> {
        let dest = self.object_path(key)?;
        if let Some(parent) = dest.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        // Copy next to the destination, then rename, so readers never see a
        // half-written object.
        let partial = partial_path(&dest);
        if let Err(e) = tokio::fs::copy(path, &partial).await {
            let _ = tokio::fs::remove_file(&partial).await;
            return Err(e.into());
        }
        tokio::fs::rename(&partial, &dest).await?;
        debug!(path = %dest.display(), "stored object");
        Ok(())
    }

    async fn wait_until_exists(&self, key: &str, policy: &WaitPolicy) -> Result<(), StoreError> {
        let path = self.object_path(key)?;
        let start = Instant::now();
        let deadline = start + policy.max_wait;
        let mut delay = policy.initial_delay;

        loop {
            if tokio::fs::try_exists(&path).await? {
                return Ok(());
            }
            let now = Instant::now();
            if now >= deadline {
                return Err(StoreError::Timeout {
                    key: key.to_string(),
                    waited: now - start,
                });
            }
            tokio::time::sleep(delay.min(deadline - now)).await;
            delay = policy.next_delay(delay);
        }
    }

    fn public_url(&self, key: &str) -> Result<String, StoreError> {
        let trimmed = relative_key(key)?;
        self.base_url
            .join(trimmed)
            .map(String::from)
            .map_err(|_| StoreError::InvalidKey(key.to_string()))
    }
}
