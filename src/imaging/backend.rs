//! Image processing backend trait and shared types.
//!
//! The [`ImageBackend`] trait defines the three operations the upload pipeline
//! needs from an image library: identify, normalize (orientation fix + metadata
//! strip, in place), and resize.
//!
//! The production implementation is
//! [`RustBackend`](super::rust_backend::RustBackend), built on the pure-Rust
//! `image` crate.

use super::orientation::Rotation;
use super::params::{NormalizeParams, ResizeParams};
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BackendError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to decode {path}: {message}")]
    Decode { path: String, message: String },
    #[error("Failed to encode {path}: {message}")]
    Encode { path: String, message: String },
    #[error("Unsupported image format: {0}")]
    UnsupportedFormat(String),
}

/// Result of an identify operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

/// Trait for image processing backends.
///
/// Implementations must be shareable across threads: the pipeline runs each
/// call on the blocking thread pool while other uploads proceed.
pub trait ImageBackend: Send + Sync {
    /// Get image dimensions.
    fn identify(&self, path: &Path) -> Result<Dimensions, BackendError>;

    /// Correct the orientation of the file at `params.path` and rewrite it
    /// without metadata. Returns the rotation that was applied.
    fn normalize(&self, params: &NormalizeParams) -> Result<Rotation, BackendError>;

    /// Resample `params.source` into a new file at `params.output`.
    fn resize(&self, params: &ResizeParams) -> Result<(), BackendError>;
}

#[cfg(test)]
pub mod tests {
    use super::*;
    use std::sync::Mutex;

    /// Mock backend that records operations without decoding anything.
    ///
    /// `resize` writes an empty file at the output path so callers can observe
    /// (and clean up) the artifact. With `normalize_delay` set, `normalize`
    /// sleeps and then rewrites its file, like a slow re-encode. Uses Mutex
    /// (not RefCell) so it is Sync.
    #[derive(Default)]
    pub struct MockBackend {
        pub identify_results: Mutex<Vec<Dimensions>>,
        pub rotation: Mutex<Option<Rotation>>,
        pub fail_normalize: bool,
        pub fail_resize: bool,
        pub normalize_delay: Option<std::time::Duration>,
        pub operations: Mutex<Vec<RecordedOp>>,
    }

    #[derive(Debug, Clone, PartialEq)]
    pub enum RecordedOp {
        Identify(String),
        Normalize(String),
        Resize {
            source: String,
            output: String,
            width: u32,
            height: u32,
        },
    }

    impl MockBackend {
        pub fn new() -> Self {
            Self::default()
        }

        /// Dimensions are popped from the back on each `identify` call.
        pub fn with_dimensions(dims: Vec<Dimensions>) -> Self {
            Self {
                identify_results: Mutex::new(dims),
                ..Self::default()
            }
        }

        pub fn failing_normalize() -> Self {
            Self {
                fail_normalize: true,
                ..Self::default()
            }
        }

        pub fn slow_normalize(delay: std::time::Duration) -> Self {
            Self {
                normalize_delay: Some(delay),
                ..Self::default()
            }
        }

        pub fn failing_resize(dims: Vec<Dimensions>) -> Self {
            Self {
                fail_resize: true,
                ..Self::with_dimensions(dims)
            }
        }

        pub fn get_operations(&self) -> Vec<RecordedOp> {
            self.operations.lock().unwrap().clone()
        }
    }

    impl ImageBackend for MockBackend {
        fn identify(&self, path: &Path) -> Result<Dimensions, BackendError> {
            self.operations
                .lock()
                .unwrap()
                .push(RecordedOp::Identify(path.to_string_lossy().to_string()));

            self.identify_results
                .lock()
                .unwrap()
                .pop()
                .ok_or_else(|| BackendError::Decode {
                    path: path.display().to_string(),
                    message: "No mock dimensions".to_string(),
                })
        }

        fn normalize(&self, params: &NormalizeParams) -> Result<Rotation, BackendError> {
            self.operations.lock().unwrap().push(RecordedOp::Normalize(
                params.path.to_string_lossy().to_string(),
            ));

            if self.fail_normalize {
                return Err(BackendError::Decode {
                    path: params.path.display().to_string(),
                    message: "corrupt image".to_string(),
                });
            }
            if let Some(delay) = self.normalize_delay {
                std::thread::sleep(delay);
                std::fs::write(&params.path, b"normalized")?;
            }
            Ok(self.rotation.lock().unwrap().unwrap_or(Rotation::None))
        }

        fn resize(&self, params: &ResizeParams) -> Result<(), BackendError> {
            self.operations.lock().unwrap().push(RecordedOp::Resize {
                source: params.source.to_string_lossy().to_string(),
                output: params.output.to_string_lossy().to_string(),
                width: params.width,
                height: params.height,
            });

            if self.fail_resize {
                return Err(BackendError::Encode {
                    path: params.output.display().to_string(),
                    message: "encoder exploded".to_string(),
                });
            }
            std::fs::write(&params.output, b"")?;
            Ok(())
        }
    }

    #[test]
    fn mock_records_identify() {
        let backend = MockBackend::with_dimensions(vec![Dimensions {
            width: 800,
            height: 600,
        }]);

        let result = backend.identify(Path::new("/test/image.jpg")).unwrap();
        assert_eq!(result.width, 800);
        assert_eq!(result.height, 600);

        let ops = backend.get_operations();
        assert_eq!(ops.len(), 1);
        assert!(matches!(&ops[0], RecordedOp::Identify(p) if p == "/test/image.jpg"));
    }

    #[test]
    fn mock_identify_without_dimensions_errors() {
        let backend = MockBackend::new();
        assert!(matches!(
            backend.identify(Path::new("/a.jpg")),
            Err(BackendError::Decode { .. })
        ));
    }

    #[test]
    fn mock_resize_writes_output() {
        let tmp = tempfile::TempDir::new().unwrap();
        let output = tmp.path().join("thumb.png");
        let backend = MockBackend::new();

        backend
            .resize(&ResizeParams {
                source: "/source.png".into(),
                output: output.clone(),
                width: 300,
                height: 200,
                quality: super::super::params::Quality::default(),
            })
            .unwrap();

        assert!(output.exists());
        assert!(matches!(
            &backend.get_operations()[0],
            RecordedOp::Resize {
                width: 300,
                height: 200,
                ..
            }
        ));
    }

    #[test]
    fn mock_failing_normalize() {
        let backend = MockBackend::failing_normalize();
        let result = backend.normalize(&NormalizeParams {
            path: "/x.jpg".into(),
            quality: super::super::params::Quality::default(),
        });
        assert!(result.is_err());
        assert_eq!(backend.get_operations().len(), 1);
    }
}
