//! Image I/O backend trait and shared types.
//!
//! The [`ImageBackend`] trait is the only place pixels cross the filesystem
//! boundary: decode a source into a [`RasterImage`], encode one back out. The
//! canvas algorithms never see a path.
//!
//! The production implementation is
//! [`RustBackend`](super::rust_backend::RustBackend), built on the `image`
//! crate. Tests use the in-memory `MockBackend` below.

use super::params::Encoding;
use super::raster::RasterImage;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BackendError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("decode failed: {0}")]
    Decode(String),
    #[error("encode failed: {0}")]
    Encode(String),
    #[error("unsupported output format {0:?} (expected jpg, png, tif, webp or avif)")]
    UnsupportedFormat(String),
}

/// Trait for image I/O backends.
///
/// `Sync` so one backend can serve every worker of a parallel batch.
pub trait ImageBackend: Sync {
    /// Decode an image to RGB8.
    fn load(&self, path: &Path) -> Result<RasterImage, BackendError>;

    /// Encode and write an image. Must not leave a partial file behind on
    /// failure.
    fn save(&self, image: &RasterImage, path: &Path, encoding: Encoding)
    -> Result<(), BackendError>;
}
