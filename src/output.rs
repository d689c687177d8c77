//! CLI output formatting.
//!
//! Every command has a `format_*` function returning lines (tested) and a thin
//! `print_*` wrapper. `--json` swaps the text for a single JSON document.
//!
//! # Output Format
//!
//! ## Upload
//!
//! ```text
//! Uploaded photo.jpg (1024x768)
//!     Main:      https://cdn.example.com/1b4e28ba-2fa1-11d2-883f-0016d3cca427
//!     Thumbnail: https://cdn.example.com/6fa459ea-ee8a-3ca4-894e-db77e160355e
//! ```
//!
//! ```text
//! Failed photo.jpg at upload_thumbnail
//!     Cause: object store error: put_object failed: service unavailable
//! ```
//!
//! ## Check
//!
//! ```text
//! Store: s3 (bucket chat-images, region eu-west-1)
//!     Staging: public/images/chat_image
//!     Limit: 10485760 bytes, thumbnail 300px
//!     Wait: up to 60s
//! ```

use crate::config::{StoreBackend, UploaderConfig};
use crate::upload::UploadOutcome;
use serde_json::{Value, json};

fn indent(line: impl AsRef<str>) -> String {
    format!("    {}", line.as_ref())
}

pub fn format_upload_outcome(name: &str, outcome: &UploadOutcome) -> Vec<String> {
    match outcome {
        UploadOutcome::Success(stored) => vec![
            format!("Uploaded {} ({}x{})", name, stored.width, stored.height),
            indent(format!("Main:      {}", stored.main_url)),
            indent(format!("Thumbnail: {}", stored.thumbnail_url)),
        ],
        UploadOutcome::Failure { stage, cause } => vec![
            format!("Failed {} at {}", name, stage),
            indent(format!("Cause: {}", cause)),
        ],
    }
}

pub fn upload_outcome_json(outcome: &UploadOutcome) -> Value {
    match outcome {
        UploadOutcome::Success(stored) => json!({
            "status": "success",
            "main": stored.main_url,
            "thumbnail": stored.thumbnail_url,
            "width": stored.width,
            "height": stored.height,
        }),
        UploadOutcome::Failure { stage, cause } => json!({
            "status": "failure",
            "stage": stage,
            "error": cause.to_string(),
        }),
    }
}

pub fn print_upload_outcome(name: &str, outcome: &UploadOutcome) {
    for line in format_upload_outcome(name, outcome) {
        println!("{}", line);
    }
}

pub fn format_put_output(key: &str, url: &str) -> Vec<String> {
    vec![format!("Stored {}", key), indent(format!("URL: {}", url))]
}

pub fn format_check_output(config: &UploaderConfig) -> Vec<String> {
    let store = &config.store;
    let header = match store.backend {
        StoreBackend::S3 => {
            let mut line = format!(
                "Store: s3 (bucket {}, region {})",
                store.s3.bucket, store.s3.region
            );
            if let Some(endpoint) = &store.s3.endpoint {
                line.push_str(&format!(" via {}", endpoint));
            }
            line
        }
        StoreBackend::Local => format!("Store: local ({})", store.local.root),
    };

    vec![
        header,
        indent(format!("Staging: {}", config.uploads.staging_dir().display())),
        indent(format!(
            "Limit: {} bytes, thumbnail {}px",
            config.uploads.max_upload_bytes, config.uploads.thumbnail_max_size
        )),
        indent(format!("Wait: up to {}s", store.wait.max_wait_secs)),
    ]
}

/// The effective config as JSON, with credentials masked.
pub fn check_output_json(config: &UploaderConfig) -> Value {
    json!(config.redacted())
}

pub fn print_check_output(config: &UploaderConfig) {
    for line in format_check_output(config) {
        println!("{}", line);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::StoreError;
    use crate::upload::{Stage, StoredImage, UploadError};

    fn success() -> UploadOutcome {
        UploadOutcome::Success(StoredImage {
            main_url: "https://cdn/m".into(),
            thumbnail_url: "https://cdn/t".into(),
            width: 1024,
            height: 768,
        })
    }

    fn failure() -> UploadOutcome {
        UploadOutcome::Failure {
            stage: Stage::UploadThumbnail,
            cause: UploadError::Store(StoreError::Remote {
                operation: "put_object",
                message: "service unavailable".into(),
            }),
        }
    }

    #[test]
    fn success_lines() {
        let lines = format_upload_outcome("photo.jpg", &success());
        assert_eq!(lines[0], "Uploaded photo.jpg (1024x768)");
        assert_eq!(lines[1], "    Main:      https://cdn/m");
        assert_eq!(lines[2], "    Thumbnail: https://cdn/t");
    }

    #[test]
    fn failure_lines_name_the_stage() {
        let lines = format_upload_outcome("photo.jpg", &failure());
        assert_eq!(lines[0], "Failed photo.jpg at upload_thumbnail");
        assert!(lines[1].contains("put_object failed: service unavailable"));
    }

    #[test]
    fn success_json() {
        let value = upload_outcome_json(&success());
        assert_eq!(value["status"], "success");
        assert_eq!(value["main"], "https://cdn/m");
        assert_eq!(value["width"], 1024);
    }

    #[test]
    fn failure_json() {
        let value = upload_outcome_json(&failure());
        assert_eq!(value["status"], "failure");
        assert_eq!(value["stage"], "upload_thumbnail");
    }

    #[test]
    fn put_lines() {
        assert_eq!(
            format_put_output("docs/a.pdf", "https://cdn/docs/a.pdf"),
            vec!["Stored docs/a.pdf", "    URL: https://cdn/docs/a.pdf"]
        );
    }

    #[test]
    fn check_lines_for_s3() {
        let mut config = UploaderConfig::default();
        config.store.backend = StoreBackend::S3;
        config.store.s3.bucket = "chat-images".into();
        config.store.s3.region = "eu-west-1".into();
        config.store.s3.endpoint = Some("http://localhost:9000".into());

        let lines = format_check_output(&config);

        assert_eq!(
            lines[0],
            "Store: s3 (bucket chat-images, region eu-west-1) via http://localhost:9000"
        );
        assert_eq!(lines[2], "    Limit: 10485760 bytes, thumbnail 300px");
        assert_eq!(lines[3], "    Wait: up to 60s");
    }

    #[test]
    fn check_json_hides_credentials() {
        let mut config = UploaderConfig::default();
        config.store.backend = StoreBackend::S3;
        config.store.s3.bucket = "chat-images".into();
        config.store.s3.access_key_id = "AKIDEXAMPLE".into();
        config.store.s3.secret_access_key = "TOPSECRET".into();

        let value = check_output_json(&config);
        let text = value.to_string();

        assert!(!text.contains("TOPSECRET"));
        assert!(!text.contains("AKIDEXAMPLE"));
        assert_eq!(value["store"]["s3"]["bucket"], "chat-images");
        assert_eq!(value["store"]["s3"]["secret_access_key"], "********");
    }

    #[test]
    fn check_lines_for_local() {
        let lines = format_check_output(&UploaderConfig::default());
        assert_eq!(lines[0], "Store: local (storage)");
    }
}
