//! High-level canvas operations.
//!
//! These functions glue the pieces together: pick the output encoding, decode
//! through the backend, run one pure algorithm, encode the result. Errors are
//! tagged with the side they came from so a caller can tell a bad source from
//! a bad destination.
//!
//! The encoding is resolved before anything is decoded, so an unsupported
//! output extension fails without touching pixels.

use super::backend::ImageBackend;
use super::bounds::{ForegroundBounds, find_foreground_bounds};
use super::crop::{CropReport, crop_scale_center};
use super::error::{CanvasError, ProcessingError};
use super::extend::{ExtendReport, extend_canvas};
use super::matte::{MatteReport, compose_matte};
use super::params::{CropParams, Encoding, ExtendParams, MatteParams, Quality, ThresholdChoice};
use super::raster::RasterImage;
use super::threshold::{ResolvedThreshold, resolve_threshold};
use std::path::Path;

/// Result type for canvas operations.
pub type Result<T> = std::result::Result<T, CanvasError>;

/// One validated operation, ready to run against any input.
#[derive(Debug, Clone, PartialEq)]
pub enum CanvasOp {
    Extend(ExtendParams),
    Crop(CropParams),
    Matte(MatteParams),
}

impl CanvasOp {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Extend(_) => "extend",
            Self::Crop(_) => "crop",
            Self::Matte(_) => "matte",
        }
    }
}

/// What a completed operation decided.
#[derive(Debug, Clone, PartialEq)]
pub enum OpReport {
    Extend(ExtendReport),
    Crop(CropReport),
    Matte(MatteReport),
}

fn load(backend: &impl ImageBackend, input: &Path) -> Result<RasterImage> {
    backend.load(input).map_err(|source| CanvasError::Input {
        path: input.to_path_buf(),
        source,
    })
}

fn encoding_for(output: &Path, quality: Quality) -> Result<Encoding> {
    Encoding::for_path(output, quality).map_err(|source| CanvasError::Output {
        path: output.to_path_buf(),
        source,
    })
}

fn save(
    backend: &impl ImageBackend,
    image: &RasterImage,
    output: &Path,
    encoding: Encoding,
) -> Result<()> {
    backend
        .save(image, output, encoding)
        .map_err(|source| CanvasError::Output {
            path: output.to_path_buf(),
            source,
        })
}

/// Decode `input`, run `op`, and write the result to `output`.
///
/// Nothing is written unless the whole operation succeeds.
pub fn run(
    backend: &impl ImageBackend,
    input: &Path,
    output: &Path,
    op: &CanvasOp,
    quality: Quality,
) -> Result<OpReport> {
    let encoding = encoding_for(output, quality)?;
    let source = load(backend, input)?;
    log::debug!(
        "{} {} ({}x{}) -> {}",
        op.name(),
        input.display(),
        source.width(),
        source.height(),
        output.display()
    );

    let (image, report) = match op {
        CanvasOp::Extend(params) => {
            let ext = extend_canvas(&source, params)?;
            (ext.image, OpReport::Extend(ext.report))
        }
        CanvasOp::Crop(params) => {
            let cropped = crop_scale_center(&source, params)?;
            (cropped.image, OpReport::Crop(cropped.report))
        }
        CanvasOp::Matte(params) => {
            let matte = compose_matte(&source, params)?;
            (matte.image, OpReport::Matte(matte.report))
        }
    };

    save(backend, &image, output, encoding)?;
    Ok(report)
}

/// Diagnostic view of how an image would be segmented.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProbeReport {
    pub dimensions: (u32, u32),
    pub threshold: ResolvedThreshold,
    /// `None` when every row is background at this threshold.
    pub bounds: Option<ForegroundBounds>,
}

/// Resolve the threshold and foreground rows of `input` without writing
/// anything. A missing foreground is a finding here, not an error.
pub fn probe(
    backend: &impl ImageBackend,
    input: &Path,
    threshold: ThresholdChoice,
) -> Result<ProbeReport> {
    let image = load(backend, input)?;
    let threshold = resolve_threshold(&image, threshold);
    let bounds = match find_foreground_bounds(&image, threshold.value) {
        Ok(bounds) => Some(bounds),
        Err(ProcessingError::ForegroundNotFound { .. }) => None,
        Err(e) => return Err(e.into()),
    };
    Ok(ProbeReport {
        dimensions: image.dimensions(),
        threshold,
        bounds,
    })
}
