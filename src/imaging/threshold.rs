//! Adaptive background threshold.
//!
//! Product shots sit on a near-white backdrop whose brightness varies from
//! studio to studio. Sampling the top and bottom edges in the middle of the
//! frame gives a cutoff tailored to each photo: anything at least that bright
//! on every channel counts as backdrop.

use super::calculations::{sampling_stripes, threshold_from_means};
use super::params::ThresholdChoice;
use super::raster::{RasterImage, Rect};
use std::fmt;

/// Where a resolved threshold came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThresholdSource {
    Auto,
    Explicit,
}

impl fmt::Display for ThresholdSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Auto => f.write_str("auto"),
            Self::Explicit => f.write_str("explicit"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedThreshold {
    pub value: u8,
    pub source: ThresholdSource,
}

/// BT.601 luma of one pixel, rounded to the nearest integer.
pub fn luma([r, g, b]: [u8; 3]) -> u8 {
    let y = 0.299 * f64::from(r) + 0.587 * f64::from(g) + 0.114 * f64::from(b);
    y.round().min(255.0) as u8
}

/// Mean luma over a rectangle. The rectangle must lie inside the image.
fn mean_luma(image: &RasterImage, rect: Rect) -> f64 {
    let count = u64::from(rect.width) * u64::from(rect.height);
    if count == 0 {
        return 0.0;
    }
    let start = rect.x as usize * RasterImage::CHANNELS;
    let end = start + rect.width as usize * RasterImage::CHANNELS;
    let sum: u64 = (rect.y..rect.y + rect.height)
        .flat_map(|y| image.row(y)[start..end].chunks_exact(RasterImage::CHANNELS))
        .map(|px| u64::from(luma([px[0], px[1], px[2]])))
        .sum();
    sum as f64 / count as f64
}

/// Derive a threshold from the image's top and bottom center stripes.
///
/// Returns a value in `180..=250`. Identical pixels always give the same
/// value.
pub fn estimate_threshold(image: &RasterImage) -> u8 {
    let (top, bottom) = sampling_stripes(image.width(), image.height());
    let top_mean = mean_luma(image, top);
    let bottom_mean = mean_luma(image, bottom);
    let threshold = threshold_from_means(top_mean, bottom_mean);
    log::debug!(
        "stripe means top={top_mean:.2} bottom={bottom_mean:.2} -> threshold {threshold}"
    );
    threshold
}

/// Apply a [`ThresholdChoice`]: an explicit value is used untouched and
/// skips sampling entirely.
pub fn resolve_threshold(image: &RasterImage, choice: ThresholdChoice) -> ResolvedThreshold {
    match choice {
        ThresholdChoice::Fixed(value) => ResolvedThreshold {
            value,
            source: ThresholdSource::Explicit,
        },
        ThresholdChoice::Auto => ResolvedThreshold {
            value: estimate_threshold(image),
            source: ThresholdSource::Auto,
        },
    }
}
