//! The upload sequence against an [`ObjectStore`].
//!
//! 1. Delete whatever is at the key (best effort)
//! 2. Put the file, publicly readable
//! 3. Wait until the store reports the object readable (bounded, cancellable)
//! 4. Resolve the public URL
//!
//! Failures are logged here, at the boundary, and returned as typed
//! [`StoreError`]s.

use super::backend::{ObjectStore, StoreError, WaitPolicy};
use super::content_type_for;
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

/// Process-lifetime handle to a configured store. Cheap to share.
#[derive(Clone)]
pub struct StoreClient {
    store: Arc<dyn ObjectStore>,
    wait: WaitPolicy,
}

impl StoreClient {
    pub fn new(store: Arc<dyn ObjectStore>, wait: WaitPolicy) -> Self {
        Self { store, wait }
    }

    pub fn store(&self) -> &dyn ObjectStore {
        self.store.as_ref()
    }

    pub fn wait_policy(&self) -> &WaitPolicy {
        &self.wait
    }

    /// Upload `path` to `key`, replacing any existing object. Returns the
    /// object's public URL once the store confirms it is readable.
    pub async fn upload(&self, key: &str, path: &Path) -> Result<String, StoreError> {
        self.upload_cancellable(key, path, &CancellationToken::new())
            .await
    }

    /// [`upload`](Self::upload), abandoned with [`StoreError::Cancelled`] as
    /// soon as `cancel` fires.
    pub async fn upload_cancellable(
        &self,
        key: &str,
        path: &Path,
        cancel: &CancellationToken,
    ) -> Result<String, StoreError> {
        let start = Instant::now();
        let result = self.run(key, path, cancel).await;
        let duration_ms = start.elapsed().as_secs_f64() * 1000.0;

        match &result {
            Ok(url) => info!(
                store = self.store.name(),
                key,
                url = %url,
                duration_ms,
                "object uploaded"
            ),
            Err(StoreError::Cancelled) => warn!(
                store = self.store.name(),
                key,
                duration_ms,
                "object upload cancelled"
            ),
            Err(e) => error!(
                store = self.store.name(),
                key,
                path = %path.display(),
                error = %e,
                duration_ms,
                "object upload failed"
            ),
        }
        result
    }

    async fn run(
        &self,
        key: &str,
        path: &Path,
        cancel: &CancellationToken,
    ) -> Result<String, StoreError> {
        if cancel.is_cancelled() {
            return Err(StoreError::Cancelled);
        }

        if let Err(e) = self.store.delete(key).await {
            warn!(
                store = self.store.name(),
                key,
                error = %e,
                "could not delete previous object, uploading anyway"
            );
        }

        self.store
            .put_public(key, path, content_type_for(path))
            .await?;

        tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(StoreError::Cancelled),
            waited = self.store.wait_until_exists(key, &self.wait) => waited?,
        }

        self.store.public_url(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::LocalStore;
    use crate::store::backend::tests::{MockStore, StoreOp};
    use std::time::Duration;
    use tempfile::TempDir;

    fn file(tmp: &TempDir, name: &str) -> std::path::PathBuf {
        let path = tmp.path().join(name);
        std::fs::write(&path, b"0123456789").unwrap();
        path
    }

    fn client(store: Arc<MockStore>) -> StoreClient {
        StoreClient::new(store, WaitPolicy::default())
    }

    #[tokio::test]
    async fn upload_deletes_puts_waits_in_order() {
        let tmp = TempDir::new().unwrap();
        let path = file(&tmp, "main.png");
        let store = Arc::new(MockStore::new());

        let url = client(store.clone()).upload("k1", &path).await.unwrap();

        assert_eq!(url, "https://cdn.test/k1");
        assert_eq!(
            store.get_operations(),
            vec![
                StoreOp::Delete("k1".into()),
                StoreOp::Put {
                    key: "k1".into(),
                    content_type: "image/png".into(),
                    bytes: 10,
                },
                StoreOp::Wait("k1".into()),
            ]
        );
    }

    #[tokio::test]
    async fn delete_failure_does_not_abort_upload() {
        let tmp = TempDir::new().unwrap();
        let path = file(&tmp, "main.jpg");
        let store = Arc::new(MockStore::failing_delete());

        let url = client(store.clone()).upload("k1", &path).await.unwrap();

        assert_eq!(url, "https://cdn.test/k1");
        assert!(store.contains("k1"));
    }

    #[tokio::test]
    async fn put_failure_is_returned() {
        let tmp = TempDir::new().unwrap();
        let path = file(&tmp, "main.jpg");
        let store = Arc::new(MockStore::failing_put(0));

        let result = client(store.clone()).upload("k1", &path).await;

        assert!(matches!(
            result,
            Err(StoreError::Remote {
                operation: "put_object",
                ..
            })
        ));
        // No wait after a failed put.
        assert_eq!(store.get_operations().len(), 2);
    }

    #[tokio::test]
    async fn missing_local_file_is_an_io_error() {
        let tmp = TempDir::new().unwrap();
        let store = Arc::new(MockStore::new());

        let result = client(store)
            .upload("k1", &tmp.path().join("gone.jpg"))
            .await;

        assert!(matches!(result, Err(StoreError::Io(_))));
    }

    #[tokio::test]
    async fn wait_timeout_is_a_failure() {
        let tmp = TempDir::new().unwrap();
        let path = file(&tmp, "main.jpg");
        let store = Arc::new(MockStore::never_exists());

        let result = client(store).upload("k1", &path).await;

        assert!(matches!(result, Err(StoreError::Timeout { .. })));
    }

    #[tokio::test]
    async fn cancel_interrupts_the_wait() {
        let tmp = TempDir::new().unwrap();
        let path = file(&tmp, "main.jpg");
        let store = Arc::new(MockStore::hanging_wait());
        let token = CancellationToken::new();

        let canceller = token.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(20)).await;
            canceller.cancel();
        });
        let result = client(store.clone())
            .upload_cancellable("k1", &path, &token)
            .await;

        assert!(matches!(result, Err(StoreError::Cancelled)));
        assert!(store.get_operations().contains(&StoreOp::Wait("k1".into())));
    }

    #[tokio::test]
    async fn already_cancelled_touches_nothing() {
        let tmp = TempDir::new().unwrap();
        let path = file(&tmp, "main.jpg");
        let store = Arc::new(MockStore::new());
        let token = CancellationToken::new();
        token.cancel();

        let result = client(store.clone())
            .upload_cancellable("k1", &path, &token)
            .await;

        assert!(matches!(result, Err(StoreError::Cancelled)));
        assert!(store.get_operations().is_empty());
    }

    #[tokio::test]
    async fn reupload_to_same_key_replaces_object() {
        let tmp = TempDir::new().unwrap();
        let store = Arc::new(LocalStore::new(tmp.path().join("bucket"), "http://h/s/").unwrap());
        let client = StoreClient::new(
            store.clone(),
            WaitPolicy {
                max_wait: Duration::from_millis(100),
                initial_delay: Duration::from_millis(5),
                max_delay: Duration::from_millis(20),
            },
        );

        let first = file(&tmp, "first.txt");
        client.upload("doc", &first).await.unwrap();
        let second = tmp.path().join("second.txt");
        std::fs::write(&second, b"second").unwrap();
        let url = client.upload("doc", &second).await.unwrap();

        assert_eq!(url, "http://h/s/doc");
        assert_eq!(std::fs::read(store.root().join("doc")).unwrap(), b"second");
    }

    #[tokio::test]
    async fn delete_of_missing_key_through_local_store_is_ok() {
        let tmp = TempDir::new().unwrap();
        let store = LocalStore::new(tmp.path(), "http://h/").unwrap();
        let client = StoreClient::new(Arc::new(store), WaitPolicy::default());

        client.store().delete("never-there").await.unwrap();
    }
}
