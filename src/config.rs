//! Uploader configuration module.
//!
//! Handles loading, validating, and merging the uploader's TOML config file.
//! Stock defaults are the base layer; the user's file overrides only the keys
//! it names.
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! [uploads]
//! public_root = "public"          # Public-facing directory tree
//! subdir = "images/chat_image"    # Staging directory, relative to public_root
//! max_upload_bytes = 10485760     # 10 MiB; larger uploads are rejected
//! thumbnail_max_size = 300        # Longer thumbnail edge, in pixels
//! quality = 90                    # JPEG re-encode quality (1-100)
//!
//! [store]
//! backend = "local"               # "s3" or "local"
//!
//! [store.s3]
//! region = "us-east-1"
//! bucket = ""
//! access_key_id = ""
//! secret_access_key = ""
//! force_path_style = false
//! # endpoint = "http://localhost:9000"       # S3-compatible providers
//! # public_base_url = "https://cdn.example.com/"
//!
//! [store.local]
//! root = "storage"
//! base_url = "http://localhost:8080/storage/"
//!
//! [store.wait]
//! max_wait_secs = 60              # Give up waiting for an upload after this
//! initial_delay_ms = 100          # First poll delay, doubled on each retry
//! max_delay_ms = 5000             # Poll delay cap
//! ```
//!
//! ## Partial Configuration
//!
//! Config files are sparse. Override just the values you want:
//!
//! ```toml
//! [store]
//! backend = "s3"
//!
//! [store.s3]
//! bucket = "chat-images"
//! access_key_id = "AKIA..."
//! secret_access_key = "..."
//! ```
//!
//! Unknown keys are rejected to catch typos early.

use crate::imaging::Quality;
use crate::store::WaitPolicy;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Component, Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Uploader configuration.
///
/// All fields have defaults. User config files need only specify the values
/// they want to override. Unknown keys are rejected.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct UploaderConfig {
    /// Local staging and image settings.
    pub uploads: UploadsConfig,
    /// Which object store to use and how to reach it.
    pub store: StoreConfig,
}

impl UploaderConfig {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.uploads.validate()?;
        self.store.validate()
    }

    /// Copy with credentials masked, for printing.
    pub fn redacted(&self) -> Self {
        let mut config = self.clone();
        config.store.s3 = config.store.s3.redacted();
        config
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct UploadsConfig {
    pub public_root: String,
    pub subdir: String,
    pub max_upload_bytes: u64,
    pub thumbnail_max_size: u32,
    pub quality: u32,
}

impl Default for UploadsConfig {
    fn default() -> Self {
        Self {
            public_root: "public".to_string(),
            subdir: "images/chat_image".to_string(),
            max_upload_bytes: 10 * 1024 * 1024,
            thumbnail_max_size: 300,
            quality: 90,
        }
    }
}

impl UploadsConfig {
    /// Directory where upload temp files are staged.
    pub fn staging_dir(&self) -> PathBuf {
        Path::new(&self.public_root).join(&self.subdir)
    }

    pub fn quality(&self) -> Quality {
        Quality::new(self.quality)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.max_upload_bytes == 0 {
            return Err(ConfigError::Validation(
                "uploads.max_upload_bytes must be non-zero".into(),
            ));
        }
        if self.thumbnail_max_size == 0 {
            return Err(ConfigError::Validation(
                "uploads.thumbnail_max_size must be non-zero".into(),
            ));
        }
        if !(1..=100).contains(&self.quality) {
            return Err(ConfigError::Validation(
                "uploads.quality must be 1-100".into(),
            ));
        }
        let relative = Path::new(&self.subdir)
            .components()
            .all(|c| matches!(c, Component::Normal(_) | Component::CurDir));
        if !relative {
            return Err(ConfigError::Validation(
                "uploads.subdir must be a relative path inside public_root".into(),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    S3,
    #[default]
    Local,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StoreConfig {
    pub backend: StoreBackend,
    pub s3: S3Config,
    pub local: LocalConfig,
    pub wait: WaitConfig,
}

impl StoreConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        self.wait.validate()?;
        match self.backend {
            StoreBackend::S3 => self.s3.validate(),
            StoreBackend::Local => {
                if self.local.root.is_empty() {
                    return Err(ConfigError::Validation(
                        "store.local.root must not be empty".into(),
                    ));
                }
                Ok(())
            }
        }
    }
}

/// Connection settings for S3 and S3-compatible providers.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct S3Config {
    pub region: String,
    pub bucket: String,
    pub access_key_id: String,
    pub secret_access_key: String,
    /// Custom endpoint, e.g. MinIO or DigitalOcean Spaces.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,
    pub force_path_style: bool,
    /// Base URL for returned object URLs (a CDN in front of the bucket).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub public_base_url: Option<String>,
}

impl Default for S3Config {
    fn default() -> Self {
        Self {
            region: "us-east-1".to_string(),
            bucket: String::new(),
            access_key_id: String::new(),
            secret_access_key: String::new(),
            endpoint: None,
            force_path_style: false,
            public_base_url: None,
        }
    }
}

const REDACTED: &str = "********";

fn mask(value: &str) -> String {
    if value.is_empty() {
        String::new()
    } else {
        REDACTED.to_string()
    }
}

impl S3Config {
    /// Copy with both keys masked. Unset keys stay empty.
    pub fn redacted(&self) -> Self {
        Self {
            access_key_id: mask(&self.access_key_id),
            secret_access_key: mask(&self.secret_access_key),
            ..self.clone()
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        for (name, value) in [
            ("region", &self.region),
            ("bucket", &self.bucket),
            ("access_key_id", &self.access_key_id),
            ("secret_access_key", &self.secret_access_key),
        ] {
            if value.is_empty() {
                return Err(ConfigError::Validation(format!(
                    "store.s3.{name} is required when store.backend = \"s3\""
                )));
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LocalConfig {
    pub root: String,
    pub base_url: String,
}

impl Default for LocalConfig {
    fn default() -> Self {
        Self {
            root: "storage".to_string(),
            base_url: "http://localhost:8080/storage/".to_string(),
        }
    }
}

/// Polling bounds for "wait until the object is readable".
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct WaitConfig {
    pub max_wait_secs: u64,
    pub initial_delay_ms: u64,
    pub max_delay_ms: u64,
}

impl Default for WaitConfig {
    fn default() -> Self {
        Self {
            max_wait_secs: 60,
            initial_delay_ms: 100,
            max_delay_ms: 5000,
        }
    }
}

impl WaitConfig {
    pub fn policy(&self) -> WaitPolicy {
        WaitPolicy {
            max_wait: Duration::from_secs(self.max_wait_secs),
            initial_delay: Duration::from_millis(self.initial_delay_ms),
            max_delay: Duration::from_millis(self.max_delay_ms),
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.max_wait_secs == 0 {
            return Err(ConfigError::Validation(
                "store.wait.max_wait_secs must be non-zero".into(),
            ));
        }
        if self.initial_delay_ms == 0 || self.max_delay_ms < self.initial_delay_ms {
            return Err(ConfigError::Validation(
                "store.wait delays must satisfy 0 < initial_delay_ms <= max_delay_ms".into(),
            ));
        }
        Ok(())
    }
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Returns the stock default config as a `toml::Value::Table`.
///
/// This is the canonical representation of all default values, used as the
/// base layer for merging user overrides on top.
pub fn stock_defaults_value() -> toml::Value {
    toml::Value::try_from(UploaderConfig::default()).expect("default config must serialize")
}

/// Recursively merge `overlay` on top of `base`.
///
/// - Tables are merged key-by-key (overlay keys override base keys).
/// - Non-table values in overlay replace base values entirely.
/// - Keys in base that are not in overlay are preserved.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let merged = match base_table.remove(&key) {
                    Some(base_val) => merge_toml(base_val, overlay_val),
                    None => overlay_val,
                };
                base_table.insert(key, merged);
            }
            toml::Value::Table(base_table)
        }
        (_, overlay) => overlay,
    }
}

/// Load a config file as a raw TOML value.
///
/// Returns `Ok(None)` if the file does not exist.
pub fn load_raw_config(path: &Path) -> Result<Option<toml::Value>, ConfigError> {
    if !path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(path)?;
    let value: toml::Value = toml::from_str(&content)?;
    Ok(Some(value))
}

/// Merge an optional overlay onto the stock defaults, then deserialize and validate.
pub fn resolve_config(overlay: Option<toml::Value>) -> Result<UploaderConfig, ConfigError> {
    let base = stock_defaults_value();
    let merged = match overlay {
        Some(ov) => merge_toml(base, ov),
        None => base,
    };
    let config: UploaderConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Load config from the TOML file at `path`.
///
/// A missing file yields the validated stock defaults.
pub fn load_config(path: &Path) -> Result<UploaderConfig, ConfigError> {
    resolve_config(load_raw_config(path)?)
}

/// Returns a fully-commented stock config with all keys and explanations.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# Image Uploader Configuration
# ===========================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults.
# Unknown keys will cause an error.

# ---------------------------------------------------------------------------
# Uploads
# ---------------------------------------------------------------------------
[uploads]
# Public-facing directory tree. Upload temp files are staged under
# <public_root>/<subdir>/<uuid>.<ext> and deleted when the upload finishes.
public_root = "public"
subdir = "images/chat_image"

# Uploads larger than this many bytes are rejected before anything is
# written (10 MiB).
max_upload_bytes = 10485760

# Longer edge of the generated thumbnail, in pixels.
thumbnail_max_size = 300

# Quality used whenever a JPEG is re-encoded (1-100).
quality = 90

# ---------------------------------------------------------------------------
# Object store
# ---------------------------------------------------------------------------
[store]
# "s3" for S3 and S3-compatible providers, "local" for a plain directory.
backend = "local"

[store.s3]
region = "us-east-1"
bucket = ""
access_key_id = ""
secret_access_key = ""
# Path-style addressing (http://endpoint/bucket/key), needed by most
# S3-compatible providers.
force_path_style = false
# Custom endpoint for S3-compatible providers.
# endpoint = "http://localhost:9000"
# Base URL for returned object URLs, e.g. a CDN in front of the bucket.
# Defaults to the bucket URL.
# public_base_url = "https://cdn.example.com/"

[store.local]
# Objects are written to <root>/<key>.
root = "storage"
# Returned URLs are <base_url><key>.
base_url = "http://localhost:8080/storage/"

# ---------------------------------------------------------------------------
# Waiting for uploads to become readable
# ---------------------------------------------------------------------------
[store.wait]
# An upload fails if the object is not readable after this many seconds.
max_wait_secs = 60
# Polling starts at initial_delay_ms and doubles up to max_delay_ms.
initial_delay_ms = 100
max_delay_ms = 5000
"##
}
