//! Pure calculation functions for canvas geometry.
//!
//! All functions here are pure and testable without any I/O or images.
//!
//! Each operation keeps its own rounding policy:
//!
//! | Operation | Quantity | Rounding |
//! |---|---|---|
//! | extend | subject padding | nearest, halves up |
//! | extend | final fit dimensions | truncate |
//! | crop | user scale, safeguard fit | truncate |
//! | matte | padding, fit dimensions | truncate |
//! | all | centering offsets | floor division, clamped at 0 |
//!
//! Unifying them would shift output pixels for existing callers, so each has
//! its own function and its own boundary tests.

use super::raster::Rect;

/// Upper bound on the sampling stripe height, in rows.
pub const STRIPE_MAX_HEIGHT: u32 = 20;
/// Upper bound on the sampling stripe half-width, in columns.
pub const STRIPE_MAX_HALF_WIDTH: u32 = 40;
/// Cushion subtracted from the darker stripe mean.
pub const THRESHOLD_CUSHION: i64 = 5;
/// Range an automatically derived threshold is clamped to.
pub const AUTO_THRESHOLD_RANGE: (u8, u8) = (180, 250);

/// Top and bottom sampling stripes for the adaptive threshold.
///
/// Both stripes are centered on column `width / 2`. The half-width is the
/// smallest of [`STRIPE_MAX_HALF_WIDTH`] and the distance to either edge
/// (minus one), so the stripe is `2 * half + 1` columns wide. The height is
/// `min(20, height / 10)` but never less than one row.
pub fn sampling_stripes(width: u32, height: u32) -> (Rect, Rect) {
    let cx = width / 2;
    let to_left = cx.saturating_sub(1);
    let to_right = width.saturating_sub(cx).saturating_sub(1);
    let half = STRIPE_MAX_HALF_WIDTH.min(to_left).min(to_right);
    let stripe_w = (2 * half + 1).min(width);
    let stripe_h = STRIPE_MAX_HEIGHT.min(height / 10).max(1).min(height);
    let x = cx - half.min(cx);

    let top = Rect {
        x,
        y: 0,
        width: stripe_w,
        height: stripe_h,
    };
    let bottom = Rect {
        y: height - stripe_h,
        ..top
    };
    (top, bottom)
}

/// Threshold from the two stripe means: darker mean, rounded, minus the
/// cushion, clamped into [`AUTO_THRESHOLD_RANGE`].
pub fn threshold_from_means(top_mean: f64, bottom_mean: f64) -> u8 {
    let (lo, hi) = AUTO_THRESHOLD_RANGE;
    let raw = top_mean.min(bottom_mean).round() as i64 - THRESHOLD_CUSHION;
    raw.clamp(i64::from(lo), i64::from(hi)) as u8
}

/// Padding added above and below the subject: `round(subject_height * pct)`,
/// halves rounding up.
pub fn subject_padding(subject_height: u32, padding_pct: f64) -> u32 {
    (f64::from(subject_height) * padding_pct + 0.5).floor() as u32
}

/// Inclusive row range `[crop_top, crop_bottom]` of the padded subject region,
/// clamped to the image.
pub fn subject_region(top: u32, bottom: u32, pad: u32, image_height: u32) -> (u32, u32) {
    let crop_top = top.saturating_sub(pad);
    let crop_bottom = bottom.saturating_add(pad).min(image_height - 1);
    (crop_top, crop_bottom)
}

/// Offset that center-crops `region` rows down to `desired` rows.
pub fn center_crop_offset(region: u32, desired: u32) -> u32 {
    region.saturating_sub(desired) / 2
}

/// Split `extra` rows of filler between top and bottom; the bottom absorbs
/// the odd row.
pub fn filler_split(extra: u32) -> (u32, u32) {
    let top = extra / 2;
    (top, extra - top)
}

/// Letterbox fit used by the extension's final resize and the cropper's
/// safeguard: uniform `min(box_w / w, box_h / h)`, dimensions truncated and
/// kept at least one pixel.
pub fn letterbox_fit(source: (u32, u32), bounds: (u32, u32)) -> (u32, u32) {
    let (w, h) = source;
    let (bw, bh) = bounds;
    let scale = (f64::from(bw) / f64::from(w)).min(f64::from(bh) / f64::from(h));
    scale_dimensions(source, scale)
}

/// Multiply both dimensions by `scale`, truncating, never below one pixel.
pub fn scale_dimensions(source: (u32, u32), scale: f64) -> (u32, u32) {
    let (w, h) = source;
    let sw = (f64::from(w) * scale) as u32;
    let sh = (f64::from(h) * scale) as u32;
    (sw.max(1), sh.max(1))
}

/// Like [`scale_dimensions`] but without the one-pixel floor. May return
/// zero on either axis; callers decide whether that is an error.
pub fn scale_dimensions_raw(source: (u32, u32), scale: f64) -> (u32, u32) {
    let (w, h) = source;
    ((f64::from(w) * scale) as u32, (f64::from(h) * scale) as u32)
}

/// Offset that centers `inner` inside `outer`; zero when `inner` is larger.
pub fn centered_offset(outer: u32, inner: u32) -> u32 {
    outer.saturating_sub(inner) / 2
}

/// Matte padding on one axis: `trunc(canvas * pct / 100)`.
pub fn matte_padding(canvas: u32, padding_percent: f64) -> u32 {
    (f64::from(canvas) * padding_percent / 100.0) as u32
}

/// Content box left after removing padding from both sides of each axis.
///
/// Signed so that an over-padded canvas shows up as a non-positive size.
pub fn content_box(canvas: (u32, u32), pad: (u32, u32)) -> (i64, i64) {
    (
        i64::from(canvas.0) - 2 * i64::from(pad.0),
        i64::from(canvas.1) - 2 * i64::from(pad.1),
    )
}

/// Fit a `source` image into `content` preserving aspect ratio.
///
/// The image's limiting axis matches the content box exactly; the other is
/// `trunc`ated. Both results are clamped to `[1, canvas]`.
pub fn matte_fit(source: (u32, u32), content: (u32, u32), canvas: (u32, u32)) -> (u32, u32) {
    let input_ratio = f64::from(source.0) / f64::from(source.1);
    let content_ratio = f64::from(content.0) / f64::from(content.1);

    let (w, h) = if input_ratio > content_ratio {
        // Wider than the content box: width is the limiting axis
        (content.0, (f64::from(content.0) / input_ratio) as u32)
    } else {
        // Taller (or same shape): height is the limiting axis
        ((f64::from(content.1) * input_ratio) as u32, content.1)
    };

    (w.clamp(1, canvas.0), h.clamp(1, canvas.1))
}

#[cfg(test)]
mod tests {
    use super::*;

    // =========================================================================
    // Sampling stripes
    // =========================================================================

    #[test]
    fn stripes_on_large_image_use_maximums() {
        let (top, bottom) = sampling_stripes(800, 600);
        assert_eq!(
            top,
            Rect {
                x: 360,
                y: 0,
                width: 81,
                height: 20
            }
        );
        assert_eq!(bottom.y, 580);
        assert_eq!(bottom.x, top.x);
    }

    #[test]
    fn stripes_shrink_to_edges_on_narrow_image() {
        // cx = 10, distance to edges 9 → 19 columns from x=1
        let (top, _) = sampling_stripes(20, 100);
        assert_eq!(top.x, 1);
        assert_eq!(top.width, 19);
        assert_eq!(top.height, 10);
    }

    #[test]
    fn stripes_on_tiny_image_stay_in_bounds() {
        for (w, h) in [(1, 1), (2, 3), (3, 9), (5, 5)] {
            let (top, bottom) = sampling_stripes(w, h);
            assert!(top.fits_within(w, h), "{w}x{h}: {top:?}");
            assert!(bottom.fits_within(w, h), "{w}x{h}: {bottom:?}");
        }
    }

    // =========================================================================
    // Threshold clamp
    // =========================================================================

    #[test]
    fn threshold_clamps_low() {
        assert_eq!(threshold_from_means(0.0, 0.0), 180);
        assert_eq!(threshold_from_means(184.4, 255.0), 180);
    }

    #[test]
    fn threshold_clamps_high() {
        assert_eq!(threshold_from_means(255.0, 255.0), 250);
    }

    #[test]
    fn threshold_uses_darker_stripe() {
        assert_eq!(threshold_from_means(240.0, 230.0), 225);
    }

    #[test]
    fn threshold_rounds_mean_before_cushion() {
        assert_eq!(threshold_from_means(229.5, 240.0), 225);
        assert_eq!(threshold_from_means(229.49, 240.0), 224);
    }

    // =========================================================================
    // Extension arithmetic (round half up)
    // =========================================================================

    #[test]
    fn subject_padding_rounds_half_up() {
        assert_eq!(subject_padding(100, 0.05), 5);
        assert_eq!(subject_padding(10, 0.05), 1); // 0.5 → 1
        assert_eq!(subject_padding(9, 0.05), 0); // 0.45 → 0
        assert_eq!(subject_padding(30, 0.05), 2); // 1.5 → 2
    }

    #[test]
    fn subject_padding_zero_pct() {
        assert_eq!(subject_padding(123, 0.0), 0);
    }

    #[test]
    fn subject_region_clamps_to_image() {
        assert_eq!(subject_region(250, 349, 5, 600), (245, 354));
        assert_eq!(subject_region(3, 597, 10, 600), (0, 599));
    }

    #[test]
    fn center_crop_offset_floors() {
        assert_eq!(center_crop_offset(110, 110), 0);
        assert_eq!(center_crop_offset(111, 110), 0);
        assert_eq!(center_crop_offset(112, 110), 1);
    }

    #[test]
    fn filler_split_bottom_takes_remainder() {
        assert_eq!(filler_split(490), (245, 245));
        assert_eq!(filler_split(491), (245, 246));
        assert_eq!(filler_split(1), (0, 1));
        assert_eq!(filler_split(0), (0, 0));
    }

    #[test]
    fn letterbox_fit_truncates() {
        // 800x600 into 400x400 → 0.5 → 400x300
        assert_eq!(letterbox_fit((800, 600), (400, 400)), (400, 300));
        // 2x8 into 2x2 → 0.25 → 0.5 x 2 → width floored at 1
        assert_eq!(letterbox_fit((2, 8), (2, 2)), (1, 2));
        // 100x400 into 50x50 → 0.125 → 12.5 x 50 → 12 x 50
        assert_eq!(letterbox_fit((100, 400), (50, 50)), (12, 50));
    }

    #[test]
    fn letterbox_fit_upscales_to_box() {
        assert_eq!(letterbox_fit((100, 50), (400, 400)), (400, 200));
    }

    // =========================================================================
    // Crop arithmetic (truncation)
    // =========================================================================

    #[test]
    fn scale_dimensions_truncates() {
        assert_eq!(scale_dimensions_raw((101, 99), 0.5), (50, 49));
        assert_eq!(scale_dimensions_raw((3, 3), 0.1), (0, 0));
        assert_eq!(scale_dimensions((3, 3), 0.1), (1, 1));
    }

    #[test]
    fn centered_offset_floors_and_clamps() {
        assert_eq!(centered_offset(1080, 500), 290);
        assert_eq!(centered_offset(1080, 501), 289);
        assert_eq!(centered_offset(10, 20), 0);
    }

    // =========================================================================
    // Matte arithmetic (truncation)
    // =========================================================================

    #[test]
    fn matte_padding_truncates() {
        assert_eq!(matte_padding(1920, 10.0), 192);
        assert_eq!(matte_padding(1080, 2.5), 27);
        assert_eq!(matte_padding(99, 1.0), 0); // 0.99 → 0
        assert_eq!(matte_padding(150, 1.0), 1); // 1.5 → 1
    }

    #[test]
    fn content_box_goes_non_positive() {
        assert_eq!(content_box((100, 100), (10, 10)), (80, 80));
        assert_eq!(content_box((3, 100), (2, 10)), (-1, 80));
    }

    #[test]
    fn matte_fit_wide_image_matches_width() {
        // 400x100 (4:1) into 1536x864 → width limits: 1536 x 384
        assert_eq!(matte_fit((400, 100), (1536, 864), (1920, 1080)), (1536, 384));
    }

    #[test]
    fn matte_fit_tall_image_matches_height() {
        // 300x600 (1:2) into 1920x1080 → height limits: 540 x 1080
        assert_eq!(matte_fit((300, 600), (1920, 1080), (1920, 1080)), (540, 1080));
    }

    #[test]
    fn matte_fit_truncates_other_axis() {
        // 3:2 source into 100x100: width limits, 100 / 1.5 = 66.67 → 66
        assert_eq!(matte_fit((300, 200), (100, 100), (100, 100)), (100, 66));
    }

    #[test]
    fn matte_fit_never_below_one_pixel() {
        assert_eq!(matte_fit((10_000, 1), (10, 10), (10, 10)), (10, 1));
    }
}
