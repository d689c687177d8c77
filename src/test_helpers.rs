//! Shared test utilities for the image-uploader test suite.
//!
//! Synthetic image fixtures written on the fly, so no binary files are
//! checked in. Orientation tags are spliced into encoded JPEGs as a minimal
//! EXIF APP1 segment.
//!
//! # Usage
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let tmp = tempfile::TempDir::new().unwrap();
//! let path = tmp.path().join("upside-down.jpg");
//! create_two_tone_jpeg(&path, 64, 64, Some(3));
//! ```

use image::codecs::jpeg::JpegEncoder;
use image::{ExtendedColorType, ImageEncoder, Rgb, RgbImage, Rgba, RgbaImage};
use std::path::Path;

// =========================================================================
// Encoding
// =========================================================================

fn encode_jpeg(img: &RgbImage) -> Vec<u8> {
    let mut bytes = Vec::new();
    JpegEncoder::new_with_quality(&mut bytes, 95)
        .write_image(
            img.as_raw(),
            img.width(),
            img.height(),
            ExtendedColorType::Rgb8,
        )
        .unwrap();
    bytes
}

/// Build a big-endian EXIF APP1 segment holding only an orientation tag.
pub fn exif_orientation_segment(orientation: u8) -> Vec<u8> {
    let mut tiff = Vec::new();
    tiff.extend_from_slice(b"MM\x00\x2A"); // big-endian TIFF header
    tiff.extend_from_slice(&8u32.to_be_bytes()); // IFD0 offset
    tiff.extend_from_slice(&1u16.to_be_bytes()); // one entry
    tiff.extend_from_slice(&0x0112u16.to_be_bytes()); // Orientation
    tiff.extend_from_slice(&3u16.to_be_bytes()); // SHORT
    tiff.extend_from_slice(&1u32.to_be_bytes()); // count
    tiff.extend_from_slice(&[0, orientation, 0, 0]); // value, left-justified
    tiff.extend_from_slice(&0u32.to_be_bytes()); // no next IFD

    let mut payload = b"Exif\x00\x00".to_vec();
    payload.extend_from_slice(&tiff);

    let mut segment = vec![0xFF, 0xE1];
    segment.extend_from_slice(&((payload.len() + 2) as u16).to_be_bytes());
    segment.extend_from_slice(&payload);
    segment
}

/// Insert an orientation tag right after the SOI marker of an encoded JPEG.
pub fn with_exif_orientation(jpeg: &[u8], orientation: u8) -> Vec<u8> {
    assert_eq!(&jpeg[..2], &[0xFF, 0xD8], "not a JPEG");
    let mut out = jpeg[..2].to_vec();
    out.extend_from_slice(&exif_orientation_segment(orientation));
    out.extend_from_slice(&jpeg[2..]);
    out
}

// =========================================================================
// Fixture files
// =========================================================================

/// Create a small valid JPEG file with a gradient pattern.
pub fn create_test_jpeg(path: &Path, width: u32, height: u32) {
    let img = RgbImage::from_fn(width, height, |x, y| {
        Rgb([(x % 256) as u8, (y % 256) as u8, 128])
    });
    std::fs::write(path, encode_jpeg(&img)).unwrap();
}

/// Create a JPEG whose top half is red and bottom half is blue, optionally
/// tagged with an EXIF orientation.
pub fn create_two_tone_jpeg(path: &Path, width: u32, height: u32, orientation: Option<u8>) {
    let img = RgbImage::from_fn(width, height, |_, y| {
        if y < height / 2 {
            Rgb([255, 0, 0])
        } else {
            Rgb([0, 0, 255])
        }
    });
    let bytes = encode_jpeg(&img);
    let bytes = match orientation {
        Some(value) => with_exif_orientation(&bytes, value),
        None => bytes,
    };
    std::fs::write(path, bytes).unwrap();
}

/// Create a gradient JPEG tagged with the given EXIF orientation.
pub fn write_oriented_jpeg(path: &Path, width: u32, height: u32, orientation: u8) {
    let img = RgbImage::from_fn(width, height, |x, y| Rgb([x as u8, y as u8, 64]));
    std::fs::write(path, with_exif_orientation(&encode_jpeg(&img), orientation)).unwrap();
}

/// Create a semi-transparent RGBA PNG.
pub fn create_test_png(path: &Path, width: u32, height: u32) {
    let img = RgbaImage::from_fn(width, height, |x, y| {
        Rgba([(x % 256) as u8, (y % 256) as u8, 200, 180])
    });
    img.save(path).unwrap();
}

/// Encoded bytes of a gradient JPEG, for in-memory uploads.
pub fn jpeg_bytes(width: u32, height: u32) -> Vec<u8> {
    let img = RgbImage::from_fn(width, height, |x, y| {
        Rgb([(x % 256) as u8, (y % 256) as u8, 32])
    });
    encode_jpeg(&img)
}

#[test]
fn exif_segment_length_covers_payload() {
    let segment = exif_orientation_segment(6);
    let declared = u16::from_be_bytes([segment[2], segment[3]]) as usize;
    assert_eq!(declared, segment.len() - 2);
    assert_eq!(&segment[4..10], b"Exif\x00\x00");
}
