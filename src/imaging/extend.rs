//! Canvas extension: reframe a product shot to a fixed height.
//!
//! The subject (foreground rows plus a proportional margin) is kept at its
//! original scale. A tall subject region is center-cropped to the desired
//! height; a short one is grown by stretching the real backdrop above and
//! below it, so the photo's own lighting gradient carries into the filler.
//! Optionally the result is letterboxed onto a white canvas of a requested
//! size.

use super::bounds::{ForegroundBounds, find_foreground_bounds};
use super::calculations::{
    center_crop_offset, centered_offset, filler_split, letterbox_fit, subject_padding,
    subject_region,
};
use super::error::ProcessingError;
use super::params::{BackgroundColor, ExtendParams};
use super::raster::{RasterImage, Resample};
use super::threshold::{ResolvedThreshold, resolve_threshold};

/// How the subject region was brought to the desired height.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Layout {
    /// Region was at least as tall as desired and was center-cropped.
    Cropped { offset: u32 },
    /// Region was shorter; filler strips were added above and below.
    Filled { top: Filler, bottom: Filler },
}

/// One synthesized filler strip.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Filler {
    pub height: u32,
    pub source: FillerSource,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FillerSource {
    /// Real edge rows, area-resampled to the filler height.
    Edge { rows: u32 },
    /// No edge rows existed on this side.
    White,
    /// Zero-height filler; nothing was drawn.
    Empty,
}

/// Result of the optional final letterbox step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FinalFit {
    /// Resized to `width`×`height` and centered at (`x`, `y`) on white.
    Centered { width: u32, height: u32, x: u32, y: u32 },
    /// Centered placement did not fit; stretched to the requested size.
    Stretched,
}

/// Everything the extension decided, for summaries and tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExtendReport {
    pub threshold: ResolvedThreshold,
    pub bounds: ForegroundBounds,
    pub pad: u32,
    /// Inclusive row range of the padded subject region.
    pub region: (u32, u32),
    pub layout: Layout,
    pub final_fit: Option<FinalFit>,
}

#[derive(Debug, Clone)]
pub struct Extension {
    pub image: RasterImage,
    pub report: ExtendReport,
}

fn rows(image: &RasterImage, start: u32, end: u32) -> Result<RasterImage, ProcessingError> {
    image
        .rows(start, end)
        .ok_or(ProcessingError::RowRange {
            start,
            end,
            width: image.width(),
            height: image.height(),
        })
}

/// Build a `height`-row filler from the source rows `start..end`.
fn make_filler(
    image: &RasterImage,
    start: u32,
    end: u32,
    height: u32,
) -> Result<(Option<RasterImage>, Filler), ProcessingError> {
    if height == 0 {
        let filler = Filler {
            height,
            source: FillerSource::Empty,
        };
        return Ok((None, filler));
    }
    let width = image.width();
    if end > start {
        let edge = rows(image, start, end)?;
        let stretched = edge.resize(width, height, Resample::Area);
        let filler = Filler {
            height,
            source: FillerSource::Edge { rows: end - start },
        };
        Ok((Some(stretched), filler))
    } else {
        let blank = RasterImage::solid(width, height, BackgroundColor::WHITE.0);
        let filler = Filler {
            height,
            source: FillerSource::White,
        };
        Ok((Some(blank), filler))
    }
}

/// Letterbox `image` onto a white `width`×`height` canvas.
fn fit_onto_white(image: &RasterImage, size: (u32, u32)) -> (RasterImage, FinalFit) {
    let fit = letterbox_fit(image.dimensions(), size);
    place_on_white(image, fit, size)
}

/// Resize `image` to `fit` and center it on a white `width`×`height`
/// canvas. When `fit` cannot be placed inside the canvas the image is
/// stretched to the canvas size instead.
fn place_on_white(
    image: &RasterImage,
    (fit_w, fit_h): (u32, u32),
    (width, height): (u32, u32),
) -> (RasterImage, FinalFit) {
    let x = centered_offset(width, fit_w);
    let y = centered_offset(height, fit_h);
    if fit_w > width || fit_h > height {
        log::warn!(
            "{fit_w}x{fit_h} at {x},{y} does not fit {width}x{height}, stretching instead"
        );
        return (image.resize(width, height, Resample::Lanczos3), FinalFit::Stretched);
    }

    let resized = image.resize(fit_w, fit_h, Resample::Lanczos3);
    let canvas = RasterImage::solid(width, height, BackgroundColor::WHITE.0);
    match resized.paste_onto(&canvas, x, y) {
        Some(out) => {
            let fit = FinalFit::Centered {
                width: fit_w,
                height: fit_h,
                x,
                y,
            };
            (out, fit)
        }
        None => (image.resize(width, height, Resample::Lanczos3), FinalFit::Stretched),
    }
}

/// Extend (or crop) `image` vertically to `params.desired_height`, then apply
/// the optional final fit.
///
/// Output height is exactly `desired_height` without a final fit, or exactly
/// the requested size with one.
pub fn extend_canvas(
    image: &RasterImage,
    params: &ExtendParams,
) -> Result<Extension, ProcessingError> {
    let threshold = resolve_threshold(image, params.threshold);
    let bounds = find_foreground_bounds(image, threshold.value)?;

    let pad = subject_padding(bounds.height(), params.padding_pct);
    let (crop_top, crop_bottom) = subject_region(bounds.top, bounds.bottom, pad, image.height());
    let region_height = crop_bottom - crop_top + 1;
    let desired = params.desired_height;
    log::debug!(
        "subject rows {}..={} pad {pad} region {crop_top}..={crop_bottom} ({region_height} rows)",
        bounds.top,
        bounds.bottom,
    );

    let (extended, layout) = if region_height >= desired {
        let offset = center_crop_offset(region_height, desired);
        let start = crop_top + offset;
        (rows(image, start, start + desired)?, Layout::Cropped { offset })
    } else {
        let (top_fill, bottom_fill) = filler_split(desired - region_height);
        let subject = rows(image, crop_top, crop_bottom + 1)?;
        let (top_img, top) = make_filler(image, 0, crop_top, top_fill)?;
        let (bottom_img, bottom) =
            make_filler(image, crop_bottom + 1, image.height(), bottom_fill)?;
        log::debug!("filling {top_fill} rows above ({top:?}) and {bottom_fill} below ({bottom:?})");

        let parts: Vec<&RasterImage> = [top_img.as_ref(), Some(&subject), bottom_img.as_ref()]
            .into_iter()
            .flatten()
            .collect();
        let stacked = RasterImage::stack_vertically(&parts).ok_or(ProcessingError::RowRange {
            start: crop_top,
            end: crop_bottom + 1,
            width: image.width(),
            height: image.height(),
        })?;
        (stacked, Layout::Filled { top, bottom })
    };

    let (image, final_fit) = match params.final_fit {
        Some(size) => {
            let (fitted, fit) = fit_onto_white(&extended, size);
            (fitted, Some(fit))
        }
        None => (extended, None),
    };

    Ok(Extension {
        image,
        report: ExtendReport {
            threshold,
            bounds,
            pad,
            region: (crop_top, crop_bottom),
            layout,
            final_fit,
        },
    })
}
