//! Pure calculation functions for image dimensions.
//!
//! All functions here are pure and testable without any I/O or images.

/// Decimal places kept on the aspect ratio before it is scaled to pixels.
pub const RATIO_PRECISION: u32 = 5;

/// Round `value` to `decimals` places, halves away from zero.
///
/// ```
/// # use image_uploader::imaging::round_to;
/// assert_eq!(round_to(2.0 / 3.0, 5), 0.66667);
/// assert_eq!(round_to(-2.5, 0), -3.0);
/// ```
pub fn round_to(value: f64, decimals: u32) -> f64 {
    let factor = 10f64.powi(decimals as i32);
    (value * factor).round() / factor
}

/// Calculate the dimensions that fit an image inside a `max_size` square.
///
/// The longer edge becomes `max_size`; the shorter edge is scaled by the
/// source aspect ratio, which is first rounded to [`RATIO_PRECISION`] places.
/// Landscape and square sources constrain the height, portrait sources
/// constrain the width.
///
/// # Arguments
/// * `original` - Source dimensions (width, height)
/// * `max_size` - Bounding size for the longer edge
///
/// # Returns
/// * `(width, height)` - Target dimensions
///
/// # Examples
/// ```
/// # use image_uploader::imaging::fit_within;
/// // 4000x3000 landscape into 300 → 300x225
/// assert_eq!(fit_within((4000, 3000), 300), (300, 225));
///
/// // 1080x1920 portrait into 300 → 169x300
/// assert_eq!(fit_within((1080, 1920), 300), (169, 300));
/// ```
pub fn fit_within(original: (u32, u32), max_size: u32) -> (u32, u32) {
    let (width, height) = original;

    if width >= height {
        (max_size, scaled_edge(height, width, max_size))
    } else {
        (scaled_edge(width, height, max_size), max_size)
    }
}

/// Scale the shorter edge against the longer one, clamping degenerate input.
fn scaled_edge(short: u32, long: u32, max_size: u32) -> u32 {
    if long == 0 {
        return 0;
    }
    let ratio = round_to(short as f64 / long as f64, RATIO_PRECISION);
    (max_size as f64 * ratio).round() as u32
}

#[cfg(test)]
mod tests {
    use super::*;

    // =========================================================================
    // round_to tests
    // =========================================================================

    #[test]
    fn round_to_five_places() {
        assert_eq!(round_to(2.0 / 3.0, 5), 0.66667);
        assert_eq!(round_to(0.75, 5), 0.75);
    }

    #[test]
    fn round_to_halves_away_from_zero() {
        assert_eq!(round_to(0.5, 0), 1.0);
        assert_eq!(round_to(1.5, 0), 2.0);
        assert_eq!(round_to(2.5, 0), 3.0);
        assert_eq!(round_to(-0.5, 0), -1.0);
    }

    // =========================================================================
    // fit_within tests
    // =========================================================================

    #[test]
    fn fit_landscape() {
        // 4:3 → height = round(300 * 0.75) = 225
        assert_eq!(fit_within((800, 600), 300), (300, 225));
    }

    #[test]
    fn fit_portrait() {
        // 9:16 → width = round(300 * 0.5625) = 169 (168.75)
        assert_eq!(fit_within((1080, 1920), 300), (169, 300));
    }

    #[test]
    fn fit_square() {
        assert_eq!(fit_within((512, 512), 300), (300, 300));
        assert_eq!(fit_within((1, 1), 300), (300, 300));
    }

    #[test]
    fn fit_upscales_small_sources() {
        // The longer edge always maps to max_size, even when smaller
        assert_eq!(fit_within((100, 50), 300), (300, 150));
    }

    #[test]
    fn fit_uses_rounded_ratio() {
        // 1/3 → 0.33333 → 300 * 0.33333 = 99.999 → 100
        assert_eq!(fit_within((3000, 1000), 300), (300, 100));
        // 2/3 → 0.66667 → 200.001 → 200
        assert_eq!(fit_within((2000, 3000), 300), (200, 300));
    }

    #[test]
    fn fit_extreme_panorama() {
        // 1/10000 → 0.0001 → 0.03 → 0
        assert_eq!(fit_within((10000, 1), 300), (300, 0));
    }

    #[test]
    fn fit_zero_dimensions_do_not_divide_by_zero() {
        assert_eq!(fit_within((0, 0), 300), (300, 0));
        assert_eq!(fit_within((0, 10), 300), (0, 300));
    }

    #[test]
    fn fit_exactly_one_edge_is_max_size() {
        for &(w, h) in &[(640, 480), (480, 640), (1920, 1081), (7, 5), (5, 7), (333, 334)] {
            let (tw, th) = fit_within((w, h), 300);
            assert!(
                (tw == 300) ^ (th == 300),
                "{w}x{h} → {tw}x{th} should constrain exactly one edge"
            );

            let (short, long) = (w.min(h) as f64, w.max(h) as f64);
            let expected = (300.0 * round_to(short / long, RATIO_PRECISION)).round() as u32;
            assert_eq!(tw.min(th), expected, "{w}x{h} unconstrained edge");
        }
    }
}
