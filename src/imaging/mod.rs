//! Image processing in pure Rust, on top of the `image` crate.
//!
//! | Operation | Crate / function |
//! |---|---|
//! | **Identify** | `ImageReader::into_dimensions` (format sniffed from content) |
//! | **Orientation fix** | `ImageDecoder::orientation` + right-angle rotation, re-encoded without metadata |
//! | **Resize** | `resize_exact` with Lanczos3, RGBA output where the format allows |
//!
//! The module is split into:
//! - **Calculations**: Pure functions for dimension math (unit testable)
//! - **Orientation**: Tag → rotation mapping
//! - **Parameters**: Data structures describing image operations
//! - **Backend**: [`ImageBackend`] trait + [`RustBackend`]
//! - **Operations**: High-level functions combining calculations + backend

pub mod backend;
mod calculations;
pub mod operations;
mod orientation;
mod params;
pub mod rust_backend;

pub use backend::{BackendError, Dimensions, ImageBackend};
pub use calculations::{RATIO_PRECISION, fit_within, round_to};
pub use operations::{get_dimensions, normalize_orientation, plan_resize, resize_to_fit};
pub use orientation::Rotation;
pub use params::{NormalizeParams, Quality, ResizeParams};
pub use rust_backend::RustBackend;
