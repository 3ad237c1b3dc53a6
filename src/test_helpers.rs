//! Shared test utilities: synthetic product shots and on-disk fixtures.
//!
//! # Usage
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let image = gray_band(800, 600, 250, 350);
//! let tmp = TempDir::new().unwrap();
//! let path = write_png(&tmp, "shot.png", &image);
//! ```

use crate::imaging::RasterImage;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Gray level used for the synthetic subject.
pub const SUBJECT_GRAY: [u8; 3] = [128, 128, 128];

/// White `width`×`height` image with full-width gray rows `start..end`.
///
/// Stands in for a product shot on a seamless white backdrop.
pub fn gray_band(width: u32, height: u32, start: u32, end: u32) -> RasterImage {
    RasterImage::from_fn(width, height, |_, y| {
        if (start..end).contains(&y) {
            SUBJECT_GRAY
        } else {
            [255; 3]
        }
    })
}

/// White image with a gray box at (`x`, `y`) of `w`×`h`.
pub fn gray_box(width: u32, height: u32, x: u32, y: u32, w: u32, h: u32) -> RasterImage {
    RasterImage::from_fn(width, height, |px, py| {
        if (x..x + w).contains(&px) && (y..y + h).contains(&py) {
            SUBJECT_GRAY
        } else {
            [255; 3]
        }
    })
}

/// Encode `image` as PNG into `dir` and return its path.
pub fn write_png(dir: &TempDir, name: &str, image: &RasterImage) -> PathBuf {
    let path = dir.path().join(name);
    image.as_rgb().save(&path).unwrap();
    path
}

/// Decode an image written by a test, panicking with the path on failure.
pub fn read_image(path: &Path) -> RasterImage {
    let decoded = image::open(path)
        .unwrap_or_else(|e| panic!("failed to open {}: {e}", path.display()));
    RasterImage::from_dynamic(decoded)
}
