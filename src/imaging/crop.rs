//! Crop, scale and center onto a fixed black canvas.

use super::calculations::{centered_offset, letterbox_fit, scale_dimensions_raw};
use super::error::{CanvasError, ProcessingError, RequestedRect, ValidationError};
use super::params::{BackgroundColor, CropParams};
use super::raster::{RasterImage, Rect, Resample};

#[derive(Debug, Clone, PartialEq)]
pub struct CropReport {
    pub original: (u32, u32),
    pub crop: Rect,
    pub scale: f64,
    /// Size after the user scale, before any safeguard.
    pub scaled: (u32, u32),
    /// Size after shrinking to fit the canvas, when that was needed.
    pub safeguard: Option<(u32, u32)>,
    pub output: (u32, u32),
    pub offset: (u32, u32),
}

#[derive(Debug, Clone)]
pub struct Cropped {
    pub image: RasterImage,
    pub report: CropReport,
}

/// Extract the crop rectangle, apply the scale factor, shrink to fit the
/// output canvas if needed, then center on black.
///
/// Output is always exactly `params.output`.
pub fn crop_scale_center(image: &RasterImage, params: &CropParams) -> Result<Cropped, CanvasError> {
    let original = image.dimensions();
    let rect = params.resolve_rect(original.0, original.1)?;
    let region = image.crop(rect).ok_or(ValidationError::CropOutOfBounds {
        rect: params.crop,
        image_width: original.0,
        image_height: original.1,
    })?;

    let mut current = region;
    if params.scale != 1.0 {
        let (w, h) = scale_dimensions_raw(current.dimensions(), params.scale);
        if w == 0 || h == 0 {
            return Err(ValidationError::ScaledToNothing {
                rect: RequestedRect {
                    x: i64::from(rect.x),
                    y: i64::from(rect.y),
                    width: i64::from(rect.width),
                    height: i64::from(rect.height),
                },
                scale: params.scale,
                width: w,
                height: h,
            }
            .into());
        }
        log::debug!("scaling crop {}x{} by {} to {w}x{h}", rect.width, rect.height, params.scale);
        current = current.resize(w, h, Resample::Lanczos3);
    }
    let scaled = current.dimensions();

    let (out_w, out_h) = params.output;
    let mut safeguard = None;
    if scaled.0 > out_w || scaled.1 > out_h {
        let (w, h) = letterbox_fit(scaled, params.output);
        log::debug!("{}x{} exceeds {out_w}x{out_h} canvas, shrinking to {w}x{h}", scaled.0, scaled.1);
        current = current.resize(w, h, Resample::Lanczos3);
        safeguard = Some((w, h));
    }

    let (cur_w, cur_h) = current.dimensions();
    let x = centered_offset(out_w, cur_w);
    let y = centered_offset(out_h, cur_h);
    let canvas = RasterImage::solid(out_w, out_h, BackgroundColor::BLACK.0);
    let composed = current
        .paste_onto(&canvas, x, y)
        .ok_or(ProcessingError::Placement {
            width: cur_w,
            height: cur_h,
            canvas_width: out_w,
            canvas_height: out_h,
            x,
            y,
        })?;

    Ok(Cropped {
        image: composed,
        report: CropReport {
            original,
            crop: rect,
            scale: params.scale,
            scaled,
            safeguard,
            output: params.output,
            offset: (x, y),
        },
    })
}
