//! Pure Rust image processing backend.
//!
//! ## Crate mapping
//!
//! | Operation | Crate / function |
//! |---|---|
//! | Decode (JPEG, PNG, TIFF, WebP, GIF) | `image` crate (pure Rust decoders) |
//! | Orientation tag | `image::ImageDecoder::orientation` (EXIF 0x0112) |
//! | Rotate | `DynamicImage::rotate90` / `rotate180` / `rotate270` |
//! | Resize | `DynamicImage::resize_exact` with `Lanczos3` |
//! | Encode | `JpegEncoder` (with quality) or `DynamicImage::write_to` |
//!
//! The `image` encoders never write EXIF, ICC or XMP chunks, so every file
//! this backend writes comes out stripped of metadata.
//!
//! Output is encoded in the format the destination extension names, so a
//! file's bytes always match the content type its name implies. Only an
//! extension `image` cannot write falls back to the decoded format.
//!
//! Files are written to a `.partial` sibling first and renamed into place, so
//! a failed encode never leaves a truncated image at the destination.

use super::backend::{BackendError, Dimensions, ImageBackend};
use super::orientation::Rotation;
use super::params::{NormalizeParams, Quality, ResizeParams};
use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use image::metadata::Orientation;
use image::{DynamicImage, ImageDecoder, ImageFormat, ImageReader};
use std::fmt::Display;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

/// Pure Rust backend using the `image` crate ecosystem.
///
/// See the [module docs](self) for the crate-to-operation mapping.
pub struct RustBackend;

impl RustBackend {
    pub fn new() -> Self {
        Self
    }
}

impl Default for RustBackend {
    fn default() -> Self {
        Self::new()
    }
}

fn decode_error(path: &Path, e: impl Display) -> BackendError {
    BackendError::Decode {
        path: path.display().to_string(),
        message: e.to_string(),
    }
}

fn encode_error(path: &Path, e: impl Display) -> BackendError {
    BackendError::Encode {
        path: path.display().to_string(),
        message: e.to_string(),
    }
}

/// Open an image and sniff its container format from the content.
fn open_reader(
    path: &Path,
) -> Result<(ImageFormat, ImageReader<std::io::BufReader<File>>), BackendError> {
    let reader = ImageReader::open(path)?.with_guessed_format()?;
    let format = reader
        .format()
        .ok_or_else(|| BackendError::UnsupportedFormat(path.display().to_string()))?;
    Ok((format, reader))
}

/// Decode an image together with its orientation tag.
///
/// An unreadable EXIF block counts as "no tag"; only pixel decode failures
/// are errors.
fn load_with_orientation(
    path: &Path,
) -> Result<(ImageFormat, Orientation, DynamicImage), BackendError> {
    let (format, reader) = open_reader(path)?;
    let mut decoder = reader.into_decoder().map_err(|e| decode_error(path, e))?;
    let orientation = decoder
        .orientation()
        .unwrap_or(Orientation::NoTransforms);
    let img = DynamicImage::from_decoder(decoder).map_err(|e| decode_error(path, e))?;
    Ok((format, orientation, img))
}

fn load_image(path: &Path) -> Result<(ImageFormat, DynamicImage), BackendError> {
    let (format, reader) = open_reader(path)?;
    let img = reader.decode().map_err(|e| decode_error(path, e))?;
    Ok((format, img))
}

/// The format named by `path`'s extension if it can be written, else `fallback`.
fn target_format(path: &Path, fallback: ImageFormat) -> ImageFormat {
    ImageFormat::from_path(path)
        .ok()
        .filter(|format| format.writing_enabled())
        .unwrap_or(fallback)
}

fn supports_alpha(format: ImageFormat) -> bool {
    matches!(
        format,
        ImageFormat::Png | ImageFormat::WebP | ImageFormat::Tiff | ImageFormat::Gif
    )
}

/// Force a transparency-capable 8-bit layout, or plain RGB where the
/// container has no alpha channel (JPEG).
fn with_alpha_channel(img: DynamicImage, format: ImageFormat) -> DynamicImage {
    if supports_alpha(format) {
        DynamicImage::ImageRgba8(img.into_rgba8())
    } else {
        DynamicImage::ImageRgb8(img.into_rgb8())
    }
}

/// Convert to a layout the encoder for `format` accepts, keeping the decoded
/// layout whenever it already is one.
fn encodable(img: DynamicImage, format: ImageFormat) -> DynamicImage {
    match (format, img) {
        (ImageFormat::Jpeg, img @ (DynamicImage::ImageLuma8(_) | DynamicImage::ImageRgb8(_))) => {
            img
        }
        (ImageFormat::Jpeg, img) => DynamicImage::ImageRgb8(img.into_rgb8()),
        (ImageFormat::WebP | ImageFormat::Gif, img) if img.color().has_alpha() => {
            DynamicImage::ImageRgba8(img.into_rgba8())
        }
        (ImageFormat::WebP | ImageFormat::Gif, img) => DynamicImage::ImageRgb8(img.into_rgb8()),
        (_, img) => img,
    }
}

fn partial_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    name.push(".partial");
    path.with_file_name(name)
}

fn encode_to(
    img: &DynamicImage,
    path: &Path,
    format: ImageFormat,
    quality: Quality,
) -> Result<(), BackendError> {
    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);
    let encoded = match format {
        ImageFormat::Jpeg => img.write_with_encoder(JpegEncoder::new_with_quality(
            &mut writer,
            u8::try_from(quality.value()).unwrap_or(100),
        )),
        other => img.write_to(&mut writer, other),
    };
    encoded.map_err(|e| encode_error(path, e))?;
    writer.flush()?;
    Ok(())
}

/// Encode `img` and move it over `path`; nothing is left behind on failure.
fn write_image(
    img: &DynamicImage,
    path: &Path,
    format: ImageFormat,
    quality: Quality,
) -> Result<(), BackendError> {
    let partial = partial_path(path);
    let result = encode_to(img, &partial, format, quality)
        .and_then(|()| fs::rename(&partial, path).map_err(BackendError::Io));
    if result.is_err() {
        let _ = fs::remove_file(&partial);
    }
    result
}

impl ImageBackend for RustBackend {
    fn identify(&self, path: &Path) -> Result<Dimensions, BackendError> {
        let (_, reader) = open_reader(path)?;
        let (width, height) = reader
            .into_dimensions()
            .map_err(|e| decode_error(path, e))?;
        Ok(Dimensions { width, height })
    }

    fn normalize(&self, params: &NormalizeParams) -> Result<Rotation, BackendError> {
        let (source_format, orientation, img) = load_with_orientation(&params.path)?;
        let format = target_format(&params.path, source_format);
        let rotation = Rotation::for_orientation(orientation);
        let img = encodable(rotation.apply(img), format);
        write_image(&img, &params.path, format, params.quality)?;
        Ok(rotation)
    }

    fn resize(&self, params: &ResizeParams) -> Result<(), BackendError> {
        let (source_format, img) = load_image(&params.source)?;
        let format = target_format(&params.output, source_format);
        let resized = img.resize_exact(params.width, params.height, FilterType::Lanczos3);
        drop(img);
        let output = with_alpha_channel(resized, format);
        write_image(&output, &params.output, format, params.quality)
    }
}
