//! The upload pipeline.
//!
//! ```text
//! validate → persist → normalize → upload main → resize → upload thumbnail → finalize
//! ```
//!
//! Each step returns a typed error; the first failure ends the attempt and is
//! reported together with the [`Stage`] it happened in. Temp files are
//! [`StagedFile`] guards, so both are removed on every path. Image work runs
//! on the blocking thread pool, and each blocking job holds its own handle on
//! the guards it touches: a dropped upload future cannot delete a file that a
//! job is still about to write.

use super::error::UploadError;
use super::incoming::IncomingUpload;
use super::record::{ImageRecord, Stage, StoredImage, UploadOutcome};
use super::staging::{StagedFile, StagingArea, sanitize_extension};
use crate::config::{UploaderConfig, UploadsConfig};
use crate::imaging::{
    ImageBackend, Quality, RustBackend, get_dimensions, normalize_orientation, resize_to_fit,
};
use crate::store::{StoreClient, StoreError, build_store};
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

pub const DEFAULT_MAX_UPLOAD_BYTES: u64 = 10 * 1024 * 1024;
pub const DEFAULT_THUMBNAIL_MAX_SIZE: u32 = 300;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UploadSettings {
    pub max_upload_bytes: u64,
    pub thumbnail_max_size: u32,
    pub quality: Quality,
}

impl Default for UploadSettings {
    fn default() -> Self {
        Self {
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            thumbnail_max_size: DEFAULT_THUMBNAIL_MAX_SIZE,
            quality: Quality::default(),
        }
    }
}

impl UploadSettings {
    pub fn from_config(config: &UploadsConfig) -> Self {
        Self {
            max_upload_bytes: config.max_upload_bytes,
            thumbnail_max_size: config.thumbnail_max_size,
            quality: config.quality(),
        }
    }
}

/// Orchestrates one upload attempt per call. Shareable across tasks; every
/// attempt owns its own keys and temp files.
pub struct UploadPipeline<B = RustBackend> {
    backend: Arc<B>,
    client: StoreClient,
    staging: StagingArea,
    settings: UploadSettings,
}

impl UploadPipeline<RustBackend> {
    /// Production pipeline: [`RustBackend`] plus the configured store.
    pub fn from_config(config: &UploaderConfig) -> Result<Self, StoreError> {
        let store = build_store(&config.store)?;
        Ok(Self::new(
            RustBackend::new(),
            StoreClient::new(store, config.store.wait.policy()),
            StagingArea::from_config(&config.uploads),
            UploadSettings::from_config(&config.uploads),
        ))
    }
}

/// Run image work on the blocking pool.
async fn blocking<T, F>(work: F) -> Result<T, UploadError>
where
    F: FnOnce() -> Result<T, UploadError> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(work).await?
}

/// Tag an error with the stage it happened in.
fn at<E: Into<UploadError>>(stage: Stage) -> impl FnOnce(E) -> (Stage, UploadError) {
    move |e| (stage, e.into())
}

fn ensure_live(cancel: &CancellationToken, stage: Stage) -> Result<(), (Stage, UploadError)> {
    if cancel.is_cancelled() {
        return Err((stage, UploadError::Cancelled));
    }
    Ok(())
}

impl<B: ImageBackend + 'static> UploadPipeline<B> {
    pub fn new(
        backend: B,
        client: StoreClient,
        staging: StagingArea,
        settings: UploadSettings,
    ) -> Self {
        Self {
            backend: Arc::new(backend),
            client,
            staging,
            settings,
        }
    }

    pub fn client(&self) -> &StoreClient {
        &self.client
    }

    pub fn staging(&self) -> &StagingArea {
        &self.staging
    }

    pub fn settings(&self) -> &UploadSettings {
        &self.settings
    }

    /// Run an upload and return the structured outcome.
    pub async fn upload<U: IncomingUpload>(&self, upload: U) -> UploadOutcome {
        let mut record = ImageRecord::default();
        self.upload_with_cancel(upload, &mut record, &CancellationToken::new())
            .await
    }

    /// Run an upload, filling `record` as fields become known.
    ///
    /// Returns `true` only if the upload succeeded and both URLs are set.
    /// On `false` the record may still carry the main URL.
    pub async fn upload_into<U: IncomingUpload>(&self, upload: U, record: &mut ImageRecord) -> bool {
        let outcome = self
            .upload_with_cancel(upload, record, &CancellationToken::new())
            .await;
        outcome.is_success() && record.is_complete()
    }

    /// [`upload_into`](Self::upload_into) with the structured outcome, stopping
    /// early once `cancel` fires.
    pub async fn upload_with_cancel<U: IncomingUpload>(
        &self,
        upload: U,
        record: &mut ImageRecord,
        cancel: &CancellationToken,
    ) -> UploadOutcome {
        let start = Instant::now();
        match self.run(upload, record, cancel).await {
            Ok(stored) => {
                info!(
                    main = %stored.main_url,
                    thumbnail = %stored.thumbnail_url,
                    width = stored.width,
                    height = stored.height,
                    duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                    "image upload complete"
                );
                UploadOutcome::Success(stored)
            }
            Err((stage, cause)) => {
                warn!(
                    stage = %stage,
                    error = %cause,
                    duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                    "image upload failed"
                );
                UploadOutcome::Failure { stage, cause }
            }
        }
    }

    /// Upload an arbitrary local file to `key` as-is: no validation, staging,
    /// resizing or cleanup. For non-image assets.
    pub async fn upload_native(&self, path: &Path, key: &str) -> Result<String, StoreError> {
        self.client.upload(key, path).await
    }

    async fn run<U: IncomingUpload>(
        &self,
        upload: U,
        record: &mut ImageRecord,
        cancel: &CancellationToken,
    ) -> Result<StoredImage, (Stage, UploadError)> {
        let size = upload.size();
        let limit = self.settings.max_upload_bytes;
        if size > limit {
            return Err((Stage::Validate, UploadError::TooLarge { size, limit }));
        }
        let extension = sanitize_extension(upload.extension());

        ensure_live(cancel, Stage::Persist)?;
        let main = Arc::new(self.staging.reserve(&extension).map_err(at(Stage::Persist))?);
        let dest = Arc::clone(&main);
        blocking(move || Ok(upload.persist_to(dest.path())?))
            .await
            .map_err(at(Stage::Persist))?;
        debug!(key = main.key(), size, "persisted upload");

        ensure_live(cancel, Stage::Normalize)?;
        self.normalize(&main).await.map_err(at(Stage::Normalize))?;

        let main_url = self
            .client
            .upload_cancellable(main.key(), main.path(), cancel)
            .await
            .map_err(at(Stage::UploadMain))?;
        record.main = Some(main_url.clone());

        ensure_live(cancel, Stage::Resize)?;
        let thumbnail = Arc::new(self.staging.reserve(&extension).map_err(at(Stage::Resize))?);
        self.resize(&main, &thumbnail)
            .await
            .map_err(at(Stage::Resize))?;

        let thumbnail_url = self
            .client
            .upload_cancellable(thumbnail.key(), thumbnail.path(), cancel)
            .await
            .map_err(at(Stage::UploadThumbnail))?;
        record.thumbnail = Some(thumbnail_url.clone());

        let (width, height) = self
            .dimensions(&main)
            .await
            .map_err(at(Stage::Finalize))?;
        record.width = width;
        record.height = height;

        Ok(StoredImage {
            main_url,
            thumbnail_url,
            width,
            height,
        })
    }

    async fn normalize(&self, file: &Arc<StagedFile>) -> Result<(), UploadError> {
        let backend = Arc::clone(&self.backend);
        let file = Arc::clone(file);
        let quality = self.settings.quality;
        blocking(move || {
            normalize_orientation(backend.as_ref(), file.path(), quality)?;
            Ok(())
        })
        .await
    }

    async fn resize(
        &self,
        source: &Arc<StagedFile>,
        output: &Arc<StagedFile>,
    ) -> Result<(), UploadError> {
        let backend = Arc::clone(&self.backend);
        let source = Arc::clone(source);
        let output = Arc::clone(output);
        let max_size = self.settings.thumbnail_max_size;
        let quality = self.settings.quality;
        blocking(move || {
            resize_to_fit(
                backend.as_ref(),
                source.path(),
                output.path(),
                max_size,
                quality,
            )?;
            Ok(())
        })
        .await
    }

    async fn dimensions(&self, file: &Arc<StagedFile>) -> Result<(u32, u32), UploadError> {
        let backend = Arc::clone(&self.backend);
        let file = Arc::clone(file);
        blocking(move || Ok(get_dimensions(backend.as_ref(), file.path())?)).await
    }
}
