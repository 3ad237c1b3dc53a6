//! Matte compositor: fit an image inside a padded, solid-colored frame.

use super::calculations::{centered_offset, content_box, matte_fit, matte_padding};
use super::error::ProcessingError;
use super::params::{BackgroundColor, MatteParams};
use super::raster::{RasterImage, Resample};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MatteReport {
    pub canvas: (u32, u32),
    pub padding: (u32, u32),
    pub content: (u32, u32),
    pub fitted: (u32, u32),
    pub offset: (u32, u32),
    pub color: BackgroundColor,
}

#[derive(Debug, Clone)]
pub struct Matte {
    pub image: RasterImage,
    pub report: MatteReport,
}

/// Compose `image` centered on a `params.canvas` frame of `params.color`.
pub fn compose_matte(image: &RasterImage, params: &MatteParams) -> Result<Matte, ProcessingError> {
    let canvas = params.canvas;
    let padding = (
        matte_padding(canvas.0, params.padding_percent),
        matte_padding(canvas.1, params.padding_percent),
    );
    let (content_w, content_h) = content_box(canvas, padding);
    // Validated params always leave a positive content box.
    let content = (
        u32::try_from(content_w).unwrap_or(1).max(1),
        u32::try_from(content_h).unwrap_or(1).max(1),
    );

    let fitted = matte_fit(image.dimensions(), content, canvas);
    let resized = image.resize(fitted.0, fitted.1, Resample::Area);
    let x = centered_offset(canvas.0, fitted.0);
    let y = centered_offset(canvas.1, fitted.1);
    log::debug!(
        "matte {}x{} content {}x{} fit {}x{} at {x},{y}",
        canvas.0,
        canvas.1,
        content.0,
        content.1,
        fitted.0,
        fitted.1
    );

    let background = RasterImage::solid(canvas.0, canvas.1, params.color.0);
    let composed = resized
        .paste_onto(&background, x, y)
        .ok_or(ProcessingError::Placement {
            width: fitted.0,
            height: fitted.1,
            canvas_width: canvas.0,
            canvas_height: canvas.1,
            x,
            y,
        })?;

    Ok(Matte {
        image: composed,
        report: MatteReport {
            canvas,
            padding,
            content,
            fitted,
            offset: (x, y),
            color: params.color,
        },
    })
}
