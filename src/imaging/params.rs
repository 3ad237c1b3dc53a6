//! Parameter types for canvas operations.
//!
//! These structs describe *what* to do, not *how* to do it. Each operation has
//! two shapes:
//!
//! - a **request** ([`ExtendRequest`], [`CropRequest`], [`MatteRequest`]) holding
//!   raw, optional values exactly as a caller supplied them (CLI flags, a batch
//!   job, config defaults). Signed and optional so nothing is lost before
//!   validation.
//! - validated **params** ([`ExtendParams`], [`CropParams`], [`MatteParams`])
//!   produced by `validate()`. Everything that can be checked without pixels is
//!   checked here, so invalid combinations never reach the decoder.
//!
//! Output encoding is described separately by [`Encoding`] since it applies to
//! every operation alike.

use super::backend::BackendError;
use super::error::{RequestedRect, ValidationError};
use super::calculations::{content_box, matte_padding};
use super::raster::Rect;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

pub const DEFAULT_SUBJECT_PADDING: f64 = 0.05;
pub const DEFAULT_CROP_OUTPUT: (u32, u32) = (1080, 1920);
pub const DEFAULT_MATTE_CANVAS: (u32, u32) = (1920, 1080);
pub const DEFAULT_MATTE_COLOR: &str = "#000000";

/// Quality setting for lossy image encoding (1-100).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Quality(pub u32);

impl Quality {
    pub fn new(value: u32) -> Self {
        Self(value.clamp(1, 100))
    }

    pub fn value(self) -> u32 {
        self.0
    }
}

impl Default for Quality {
    fn default() -> Self {
        Self(95)
    }
}

/// Container format of a written image, chosen by file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Jpeg,
    Png,
    Tiff,
    WebP,
    Avif,
}

impl OutputFormat {
    pub fn from_path(path: &Path) -> Result<Self, BackendError> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_lowercase();
        match ext.as_str() {
            "jpg" | "jpeg" => Ok(Self::Jpeg),
            "png" => Ok(Self::Png),
            "tif" | "tiff" => Ok(Self::Tiff),
            "webp" => Ok(Self::WebP),
            "avif" => Ok(Self::Avif),
            _ => Err(BackendError::UnsupportedFormat(ext)),
        }
    }
}

/// How to encode an output image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Encoding {
    pub format: OutputFormat,
    pub quality: Quality,
}

impl Encoding {
    pub fn for_path(path: &Path, quality: Quality) -> Result<Self, BackendError> {
        Ok(Self {
            format: OutputFormat::from_path(path)?,
            quality,
        })
    }
}

/// Where the background/foreground cutoff comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThresholdChoice {
    /// Derive from the sampled stripes.
    Auto,
    /// Use this value as-is.
    Fixed(u8),
}

impl ThresholdChoice {
    /// Interpret a raw override. Anything outside `0..=255` (conventionally
    /// `-1`) means automatic.
    pub fn from_raw(raw: Option<i64>) -> Self {
        match raw {
            Some(v) if (0..=255).contains(&v) => Self::Fixed(v as u8),
            Some(-1) | None => Self::Auto,
            Some(v) => {
                log::warn!("threshold {v} is outside 0-255, using automatic threshold");
                Self::Auto
            }
        }
    }
}

/// Solid background color, parsed from a hex triplet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BackgroundColor(pub [u8; 3]);

impl BackgroundColor {
    pub const WHITE: Self = Self([255, 255, 255]);
    pub const BLACK: Self = Self([0, 0, 0]);

    /// Parse `#rrggbb` or `rrggbb` (case-insensitive).
    pub fn parse(text: &str) -> Result<Self, ValidationError> {
        let hex = text.trim();
        let hex = hex.strip_prefix('#').unwrap_or(hex);
        if hex.len() != 6 || !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(ValidationError::Color(text.to_string()));
        }
        let channel = |i: usize| {
            u8::from_str_radix(&hex[i..i + 2], 16)
                .map_err(|_| ValidationError::Color(text.to_string()))
        };
        Ok(Self([channel(0)?, channel(2)?, channel(4)?]))
    }
}

impl fmt::Display for BackgroundColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [r, g, b] = self.0;
        write!(f, "#{r:02x}{g:02x}{b:02x}")
    }
}

fn positive_dimensions(
    what: &'static str,
    width: i64,
    height: i64,
) -> Result<(u32, u32), ValidationError> {
    let err = || ValidationError::NonPositiveDimensions {
        what,
        width,
        height,
    };
    let w = u32::try_from(width).ok().filter(|&w| w > 0).ok_or_else(err)?;
    let h = u32::try_from(height).ok().filter(|&h| h > 0).ok_or_else(err)?;
    Ok((w, h))
}

// =============================================================================
// Extend
// =============================================================================

/// Raw canvas-extension request.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExtendRequest {
    pub desired_height: i64,
    /// Fraction of the subject height added above and below it.
    pub padding_pct: Option<f64>,
    /// Explicit threshold; `None` or out of range selects automatic.
    pub threshold: Option<i64>,
    pub requested_width: Option<i64>,
    pub requested_height: Option<i64>,
}

/// Validated canvas-extension parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct ExtendParams {
    pub desired_height: u32,
    pub padding_pct: f64,
    pub threshold: ThresholdChoice,
    /// Final letterbox box, present only when both requested sides are positive.
    pub final_fit: Option<(u32, u32)>,
}

impl ExtendRequest {
    pub fn validate(self) -> Result<ExtendParams, ValidationError> {
        let desired_height = u32::try_from(self.desired_height)
            .ok()
            .filter(|&h| h > 0)
            .ok_or(ValidationError::DesiredHeight(self.desired_height))?;

        let padding_pct = self.padding_pct.unwrap_or(DEFAULT_SUBJECT_PADDING);
        if !padding_pct.is_finite() || padding_pct < 0.0 {
            return Err(ValidationError::SubjectPadding(padding_pct));
        }

        let final_fit = match (self.requested_width, self.requested_height) {
            (Some(w), Some(h)) if w > 0 && h > 0 => {
                Some(positive_dimensions("requested", w, h)?)
            }
            (None, None) => None,
            (w, h) => {
                log::debug!("final fit skipped: requested size {w:?}x{h:?} is not fully positive");
                None
            }
        };

        Ok(ExtendParams {
            desired_height,
            padding_pct,
            threshold: ThresholdChoice::from_raw(self.threshold),
            final_fit,
        })
    }
}

// =============================================================================
// Crop
// =============================================================================

/// Raw crop-scale-center request.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CropRequest {
    pub crop_x: Option<i64>,
    pub crop_y: Option<i64>,
    /// Zero or negative means the full image width.
    pub crop_width: Option<i64>,
    /// Zero or negative means the full image height.
    pub crop_height: Option<i64>,
    pub output_width: Option<i64>,
    pub output_height: Option<i64>,
    pub scale: Option<f64>,
}

/// Validated crop-scale-center parameters.
///
/// The crop rectangle can only be bounds-checked once the image is decoded;
/// see [`CropParams::resolve_rect`].
#[derive(Debug, Clone, PartialEq)]
pub struct CropParams {
    pub crop: RequestedRect,
    pub output: (u32, u32),
    pub scale: f64,
}

impl CropRequest {
    pub fn validate(self) -> Result<CropParams, ValidationError> {
        let (dw, dh) = DEFAULT_CROP_OUTPUT;
        let output = positive_dimensions(
            "output",
            self.output_width.unwrap_or(i64::from(dw)),
            self.output_height.unwrap_or(i64::from(dh)),
        )?;

        let scale = self.scale.unwrap_or(1.0);
        if !scale.is_finite() || scale <= 0.0 {
            return Err(ValidationError::Scale(scale));
        }

        Ok(CropParams {
            crop: RequestedRect {
                x: self.crop_x.unwrap_or(0),
                y: self.crop_y.unwrap_or(0),
                width: self.crop_width.unwrap_or(0),
                height: self.crop_height.unwrap_or(0),
            },
            output,
            scale,
        })
    }
}

impl CropParams {
    /// Resolve the requested rectangle against a decoded image.
    ///
    /// Zero or negative width/height mean the full image side. The result
    /// must lie entirely inside the image; nothing is clamped.
    pub fn resolve_rect(&self, image_width: u32, image_height: u32) -> Result<Rect, ValidationError> {
        let full = |side: i64, image_side: u32| if side > 0 { side } else { i64::from(image_side) };
        let rect = RequestedRect {
            width: full(self.crop.width, image_width),
            height: full(self.crop.height, image_height),
            ..self.crop
        };
        let out_of_bounds = || ValidationError::CropOutOfBounds {
            rect,
            image_width,
            image_height,
        };

        let inside = rect.x >= 0
            && rect.y >= 0
            && rect.x.saturating_add(rect.width) <= i64::from(image_width)
            && rect.y.saturating_add(rect.height) <= i64::from(image_height);
        if !inside {
            return Err(out_of_bounds());
        }
        // Every field is now within 0..=u32::MAX.
        let narrow = |v: i64| u32::try_from(v).map_err(|_| out_of_bounds());
        Ok(Rect {
            x: narrow(rect.x)?,
            y: narrow(rect.y)?,
            width: narrow(rect.width)?,
            height: narrow(rect.height)?,
        })
    }
}

// =============================================================================
// Matte
// =============================================================================

/// Raw matte request.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MatteRequest {
    pub width: Option<i64>,
    pub height: Option<i64>,
    /// Percent of each canvas side used as margin, `0 <= padding < 50`.
    pub padding: Option<f64>,
    pub color: Option<String>,
}

/// Validated matte parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct MatteParams {
    pub canvas: (u32, u32),
    pub padding_percent: f64,
    pub color: BackgroundColor,
}

impl MatteRequest {
    pub fn validate(self) -> Result<MatteParams, ValidationError> {
        let (dw, dh) = DEFAULT_MATTE_CANVAS;
        let canvas = positive_dimensions(
            "canvas",
            self.width.unwrap_or(i64::from(dw)),
            self.height.unwrap_or(i64::from(dh)),
        )?;

        let padding_percent = self.padding.unwrap_or(0.0);
        if !(0.0..50.0).contains(&padding_percent) {
            return Err(ValidationError::MattePadding(padding_percent));
        }

        let pad = (
            matte_padding(canvas.0, padding_percent),
            matte_padding(canvas.1, padding_percent),
        );
        let (content_width, content_height) = content_box(canvas, pad);
        if content_width <= 0 || content_height <= 0 {
            return Err(ValidationError::EmptyContentBox {
                canvas_width: canvas.0,
                canvas_height: canvas.1,
                padding: padding_percent,
                content_width,
                content_height,
            });
        }

        let color = BackgroundColor::parse(self.color.as_deref().unwrap_or(DEFAULT_MATTE_COLOR))?;

        Ok(MatteParams {
            canvas,
            padding_percent,
            color,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quality_clamps_to_valid_range() {
        assert_eq!(Quality::new(0).value(), 1);
        assert_eq!(Quality::new(50).value(), 50);
        assert_eq!(Quality::new(150).value(), 100);
    }

    #[test]
    fn quality_default_is_95() {
        assert_eq!(Quality::default().value(), 95);
    }

    #[test]
    fn output_format_from_extension() {
        assert_eq!(OutputFormat::from_path(Path::new("a.JPG")).unwrap(), OutputFormat::Jpeg);
        assert_eq!(OutputFormat::from_path(Path::new("a.jpeg")).unwrap(), OutputFormat::Jpeg);
        assert_eq!(OutputFormat::from_path(Path::new("a.png")).unwrap(), OutputFormat::Png);
        assert_eq!(OutputFormat::from_path(Path::new("a.tif")).unwrap(), OutputFormat::Tiff);
        assert_eq!(OutputFormat::from_path(Path::new("a.webp")).unwrap(), OutputFormat::WebP);
        assert_eq!(OutputFormat::from_path(Path::new("a.avif")).unwrap(), OutputFormat::Avif);
        assert!(OutputFormat::from_path(Path::new("a.gif")).is_err());
        assert!(OutputFormat::from_path(Path::new("noext")).is_err());
    }

    #[test]
    fn threshold_choice_from_raw() {
        assert_eq!(ThresholdChoice::from_raw(None), ThresholdChoice::Auto);
        assert_eq!(ThresholdChoice::from_raw(Some(-1)), ThresholdChoice::Auto);
        assert_eq!(ThresholdChoice::from_raw(Some(0)), ThresholdChoice::Fixed(0));
        assert_eq!(ThresholdChoice::from_raw(Some(255)), ThresholdChoice::Fixed(255));
        assert_eq!(ThresholdChoice::from_raw(Some(256)), ThresholdChoice::Auto);
    }

    #[test]
    fn color_parses_with_and_without_hash() {
        assert_eq!(BackgroundColor::parse("#1A2b3c").unwrap().0, [0x1a, 0x2b, 0x3c]);
        assert_eq!(BackgroundColor::parse("ffffff").unwrap(), BackgroundColor::WHITE);
        assert_eq!(BackgroundColor::parse("#000000").unwrap(), BackgroundColor::BLACK);
    }

    #[test]
    fn color_rejects_malformed() {
        for bad in ["", "#", "#fff", "#12345g", "1234567", "#ééé", "red"] {
            assert!(
                matches!(BackgroundColor::parse(bad), Err(ValidationError::Color(_))),
                "{bad:?} should be rejected"
            );
        }
    }

    #[test]
    fn color_display_roundtrips() {
        let c = BackgroundColor([0x0a, 0xbc, 0xff]);
        assert_eq!(c.to_string(), "#0abcff");
        assert_eq!(BackgroundColor::parse(&c.to_string()).unwrap(), c);
    }

    // =========================================================================
    // Extend validation
    // =========================================================================

    #[test]
    fn extend_defaults() {
        let params = ExtendRequest {
            desired_height: 600,
            ..Default::default()
        }
        .validate()
        .unwrap();
        assert_eq!(params.desired_height, 600);
        assert_eq!(params.padding_pct, DEFAULT_SUBJECT_PADDING);
        assert_eq!(params.threshold, ThresholdChoice::Auto);
        assert_eq!(params.final_fit, None);
    }

    #[test]
    fn extend_rejects_non_positive_height() {
        for h in [0, -10] {
            let err = ExtendRequest {
                desired_height: h,
                ..Default::default()
            }
            .validate()
            .unwrap_err();
            assert_eq!(err, ValidationError::DesiredHeight(h));
        }
    }

    #[test]
    fn extend_rejects_negative_or_nan_padding() {
        for pct in [-0.1, f64::NAN, f64::INFINITY] {
            let result = ExtendRequest {
                desired_height: 10,
                padding_pct: Some(pct),
                ..Default::default()
            }
            .validate();
            assert!(matches!(result, Err(ValidationError::SubjectPadding(_))));
        }
    }

    #[test]
    fn extend_final_fit_needs_both_sides() {
        let with = |w, h| {
            ExtendRequest {
                desired_height: 10,
                requested_width: w,
                requested_height: h,
                ..Default::default()
            }
            .validate()
            .unwrap()
            .final_fit
        };
        assert_eq!(with(Some(400), Some(500)), Some((400, 500)));
        assert_eq!(with(Some(400), None), None);
        assert_eq!(with(Some(-1), Some(-1)), None);
        assert_eq!(with(Some(400), Some(0)), None);
    }

    // =========================================================================
    // Crop validation
    // =========================================================================

    #[test]
    fn crop_defaults() {
        let params = CropRequest::default().validate().unwrap();
        assert_eq!(params.output, (1080, 1920));
        assert_eq!(params.scale, 1.0);
        assert_eq!(
            params.crop,
            RequestedRect {
                x: 0,
                y: 0,
                width: 0,
                height: 0
            }
        );
    }

    #[test]
    fn crop_rejects_bad_scale() {
        for scale in [0.0, -1.0, f64::NAN] {
            let result = CropRequest {
                scale: Some(scale),
                ..Default::default()
            }
            .validate();
            assert!(matches!(result, Err(ValidationError::Scale(_))));
        }
    }

    #[test]
    fn crop_rejects_non_positive_output() {
        let result = CropRequest {
            output_width: Some(0),
            ..Default::default()
        }
        .validate();
        assert!(matches!(
            result,
            Err(ValidationError::NonPositiveDimensions { what: "output", .. })
        ));
    }

    fn crop_at(x: i64, y: i64, width: i64, height: i64) -> CropParams {
        CropRequest {
            crop_x: Some(x),
            crop_y: Some(y),
            crop_width: Some(width),
            crop_height: Some(height),
            ..Default::default()
        }
        .validate()
        .unwrap()
    }

    #[test]
    fn crop_rect_defaults_to_full_image() {
        let rect = crop_at(0, 0, 0, -1).resolve_rect(800, 600).unwrap();
        assert_eq!(rect, Rect { x: 0, y: 0, width: 800, height: 600 });
    }

    #[test]
    fn crop_rect_touching_edges_is_valid() {
        let rect = crop_at(600, 500, 200, 100).resolve_rect(800, 600).unwrap();
        assert_eq!(
            rect,
            Rect {
                x: 600,
                y: 500,
                width: 200,
                height: 100
            }
        );
    }

    #[test]
    fn crop_rect_past_right_edge_reports_sizes() {
        let err = crop_at(700, 0, 200, 100).resolve_rect(800, 600).unwrap_err();
        assert_eq!(
            err,
            ValidationError::CropOutOfBounds {
                rect: RequestedRect {
                    x: 700,
                    y: 0,
                    width: 200,
                    height: 100
                },
                image_width: 800,
                image_height: 600,
            }
        );
    }

    #[test]
    fn crop_rect_rejects_negative_origin() {
        assert!(crop_at(-1, 0, 10, 10).resolve_rect(800, 600).is_err());
        assert!(crop_at(0, -1, 10, 10).resolve_rect(800, 600).is_err());
    }

    #[test]
    fn crop_rect_full_width_default_with_offset_overflows() {
        // Default width is the whole image, so any x > 0 leaves the image.
        assert!(crop_at(10, 0, 0, 100).resolve_rect(800, 600).is_err());
    }

    #[test]
    fn crop_rect_huge_values_do_not_overflow() {
        assert!(crop_at(i64::MAX, 0, i64::MAX, 1).resolve_rect(800, 600).is_err());
    }

    // =========================================================================
    // Matte validation
    // =========================================================================

    #[test]
    fn matte_defaults() {
        let params = MatteRequest::default().validate().unwrap();
        assert_eq!(params.canvas, (1920, 1080));
        assert_eq!(params.padding_percent, 0.0);
        assert_eq!(params.color, BackgroundColor::BLACK);
    }

    #[test]
    fn matte_padding_of_fifty_is_invalid() {
        let err = MatteRequest {
            padding: Some(50.0),
            ..Default::default()
        }
        .validate()
        .unwrap_err();
        assert!(
            err.to_string()
                .starts_with("padding percent must be between 0 and 50")
        );
    }

    #[test]
    fn matte_padding_just_below_fifty_is_valid() {
        let params = MatteRequest {
            padding: Some(49.9),
            ..Default::default()
        }
        .validate()
        .unwrap();
        assert_eq!(params.padding_percent, 49.9);
    }

    #[test]
    fn matte_rejects_negative_padding() {
        let result = MatteRequest {
            padding: Some(-0.5),
            ..Default::default()
        }
        .validate();
        assert!(matches!(result, Err(ValidationError::MattePadding(_))));
    }

    #[test]
    fn matte_content_box_survives_padding_just_below_fifty() {
        // Truncated padding is always < half the side, so even 49.99% on a
        // tiny canvas leaves at least one pixel of content.
        for (w, h) in [(3, 3), (4, 100), (100, 100), (1, 1)] {
            let result = MatteRequest {
                width: Some(w),
                height: Some(h),
                padding: Some(49.99),
                ..Default::default()
            }
            .validate();
            assert!(result.is_ok(), "{w}x{h}: {result:?}");
        }
    }

    #[test]
    fn matte_rejects_bad_color() {
        let result = MatteRequest {
            color: Some("#12".into()),
            ..Default::default()
        }
        .validate();
        assert!(matches!(result, Err(ValidationError::Color(_))));
    }
}
