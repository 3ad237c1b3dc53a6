//! Error taxonomy for canvas operations.
//!
//! Every operation fails with a [`CanvasError`], which mirrors the four ways a
//! single invocation can go wrong:
//!
//! | Variant | Cause |
//! |---|---|
//! | `Input` | source image missing or undecodable |
//! | `Validation` | parameters rejected before (or while) touching pixels |
//! | `Processing` | the algorithm itself gave up (no foreground, placement failure) |
//! | `Output` | destination unwritable or format unsupported |
//!
//! None of these are retried or downgraded. Each variant carries the numbers a
//! caller needs to build an actionable message (image size, requested rect,
//! resolved threshold).

use super::backend::BackendError;
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CanvasError {
    #[error("could not read input image {}: {source}", path.display())]
    Input {
        path: PathBuf,
        #[source]
        source: BackendError,
    },
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Processing(#[from] ProcessingError),
    #[error("could not write output image {}: {source}", path.display())]
    Output {
        path: PathBuf,
        #[source]
        source: BackendError,
    },
}

/// A rectangle exactly as the caller requested it, before bounds checking.
///
/// Signed so that negative origins survive into the error message instead of
/// wrapping around.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestedRect {
    pub x: i64,
    pub y: i64,
    pub width: i64,
    pub height: i64,
}

impl fmt::Display for RequestedRect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{} {}x{}", self.x, self.y, self.width, self.height)
    }
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("{what} dimensions must be positive (got {width}x{height})")]
    NonPositiveDimensions {
        what: &'static str,
        width: i64,
        height: i64,
    },
    #[error("desired height must be positive (got {0})")]
    DesiredHeight(i64),
    #[error("padding fraction must be a finite value >= 0 (got {0})")]
    SubjectPadding(f64),
    #[error("padding percent must be between 0 and 50 (got {0})")]
    MattePadding(f64),
    #[error(
        "padding too large for canvas size {canvas_width}x{canvas_height}: \
         {padding}% leaves a {content_width}x{content_height} content box"
    )]
    EmptyContentBox {
        canvas_width: u32,
        canvas_height: u32,
        padding: f64,
        content_width: i64,
        content_height: i64,
    },
    #[error("scale factor must be positive (got {0})")]
    Scale(f64),
    #[error(
        "crop area {rect} exceeds image boundaries (image size: {image_width}x{image_height})"
    )]
    CropOutOfBounds {
        rect: RequestedRect,
        image_width: u32,
        image_height: u32,
    },
    #[error("crop area {rect} scaled by {scale} collapses to {width}x{height}")]
    ScaledToNothing {
        rect: RequestedRect,
        scale: f64,
        width: u32,
        height: u32,
    },
    #[error("invalid color {0:?}: expected a hex triplet such as #1a2b3c")]
    Color(String),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProcessingError {
    #[error(
        "foreground not found in {width}x{height} image with threshold {threshold} \
         (try lowering threshold)"
    )]
    ForegroundNotFound {
        threshold: u8,
        width: u32,
        height: u32,
    },
    #[error(
        "{width}x{height} image exceeds {canvas_width}x{canvas_height} output canvas \
         at offset {x},{y}"
    )]
    Placement {
        width: u32,
        height: u32,
        canvas_width: u32,
        canvas_height: u32,
        x: u32,
        y: u32,
    },
    #[error("rows {start}..{end} fall outside {width}x{height} image")]
    RowRange {
        start: u32,
        end: u32,
        width: u32,
        height: u32,
    },
}
