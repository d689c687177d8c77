//! Orientation tag → rotation mapping.
//!
//! Only the three pure rotations are corrected. The mirrored orientations
//! (EXIF 2, 4, 5, 7) are left alone and only lose their tag when the file is
//! rewritten. All corrections are right angles, so no background fill is ever
//! exposed.

use image::DynamicImage;
use image::metadata::Orientation;

/// Clockwise rotation applied to correct an image's orientation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rotation {
    None,
    /// +90°, for images tagged right-top (EXIF 6).
    Clockwise90,
    /// 180°, for images tagged bottom-right (EXIF 3).
    Half,
    /// −90°, for images tagged left-bottom (EXIF 8).
    CounterClockwise90,
}

impl Rotation {
    /// Rotation for a decoded orientation tag.
    pub fn for_orientation(orientation: Orientation) -> Self {
        match orientation {
            Orientation::Rotate180 => Rotation::Half,
            Orientation::Rotate90 => Rotation::Clockwise90,
            Orientation::Rotate270 => Rotation::CounterClockwise90,
            _ => Rotation::None,
        }
    }

    /// Rotation for a raw EXIF orientation value (0x0112).
    pub fn for_exif(value: u8) -> Self {
        match value {
            3 => Rotation::Half,
            6 => Rotation::Clockwise90,
            8 => Rotation::CounterClockwise90,
            _ => Rotation::None,
        }
    }

    pub fn degrees(self) -> i32 {
        match self {
            Rotation::None => 0,
            Rotation::Clockwise90 => 90,
            Rotation::Half => 180,
            Rotation::CounterClockwise90 => -90,
        }
    }

    pub fn apply(self, img: DynamicImage) -> DynamicImage {
        match self {
            Rotation::None => img,
            Rotation::Clockwise90 => img.rotate90(),
            Rotation::Half => img.rotate180(),
            Rotation::CounterClockwise90 => img.rotate270(),
        }
    }
}
