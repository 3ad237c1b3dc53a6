//! Owned RGB raster buffer with pure, allocation-returning operations.
//!
//! [`RasterImage`] wraps an `image::RgbImage` and never hands out a mutable
//! view of itself: cropping, resizing, pasting and stacking all return a new
//! buffer. That keeps every read and write region disjoint by construction,
//! which matters for the extension pipeline where the subject region and the
//! filler sources are slices of the same decoded photo.

use fast_image_resize as fr;
use image::imageops::{self, FilterType};
use image::{DynamicImage, Rgb, RgbImage};

/// Axis-aligned rectangle in pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl Rect {
    /// True when the rectangle is non-empty and lies entirely inside a
    /// `width`×`height` image.
    pub fn fits_within(&self, width: u32, height: u32) -> bool {
        let right = self.x.checked_add(self.width);
        let bottom = self.y.checked_add(self.height);
        self.width > 0
            && self.height > 0
            && right.is_some_and(|r| r <= width)
            && bottom.is_some_and(|b| b <= height)
    }
}

/// Resampling policy used when changing an image's size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resample {
    /// Windowed sinc; used where the tools promise "high quality" scaling.
    Lanczos3,
    /// Box (pixel-area) averaging when shrinking, bilinear otherwise.
    Area,
}

/// Decoded image: `width × height` pixels, three channels, RGB order.
///
/// Invariant: `as_raw().len() == width * height * 3`, guaranteed by the
/// wrapped `RgbImage`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RasterImage {
    pixels: RgbImage,
}

impl RasterImage {
    pub const CHANNELS: usize = 3;

    pub fn new(pixels: RgbImage) -> Self {
        Self { pixels }
    }

    /// Convert any decoded image to RGB8, dropping alpha.
    pub fn from_dynamic(image: DynamicImage) -> Self {
        Self::new(image.into_rgb8())
    }

    pub fn from_fn(width: u32, height: u32, mut f: impl FnMut(u32, u32) -> [u8; 3]) -> Self {
        Self::new(RgbImage::from_fn(width, height, |x, y| Rgb(f(x, y))))
    }

    /// A `width`×`height` image filled with one color.
    pub fn solid(width: u32, height: u32, color: [u8; 3]) -> Self {
        Self::new(RgbImage::from_pixel(width, height, Rgb(color)))
    }

    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    pub fn height(&self) -> u32 {
        self.pixels.height()
    }

    pub fn dimensions(&self) -> (u32, u32) {
        self.pixels.dimensions()
    }

    pub fn pixel(&self, x: u32, y: u32) -> [u8; 3] {
        self.pixels.get_pixel(x, y).0
    }

    /// Interleaved RGB bytes of row `y`.
    pub fn row(&self, y: u32) -> &[u8] {
        let stride = self.width() as usize * Self::CHANNELS;
        let start = y as usize * stride;
        &self.pixels.as_raw()[start..start + stride]
    }

    pub fn as_raw(&self) -> &[u8] {
        self.pixels.as_raw()
    }

    pub fn as_rgb(&self) -> &RgbImage {
        &self.pixels
    }

    pub fn into_rgb(self) -> RgbImage {
        self.pixels
    }

    /// Copy out a sub-region. Returns `None` if `rect` is empty or leaves the
    /// image; nothing is clamped.
    pub fn crop(&self, rect: Rect) -> Option<RasterImage> {
        if !rect.fits_within(self.width(), self.height()) {
            return None;
        }
        let view = imageops::crop_imm(&self.pixels, rect.x, rect.y, rect.width, rect.height);
        Some(Self::new(view.to_image()))
    }

    /// Copy out the half-open row range `start..end` at full width.
    pub fn rows(&self, start: u32, end: u32) -> Option<RasterImage> {
        let height = end.checked_sub(start)?;
        self.crop(Rect {
            x: 0,
            y: start,
            width: self.width(),
            height,
        })
    }

    /// Resample to exactly `width`×`height`. Both must be non-zero.
    pub fn resize(&self, width: u32, height: u32, method: Resample) -> RasterImage {
        debug_assert!(width > 0 && height > 0, "resize target must be non-empty");
        if (width, height) == self.dimensions() {
            return self.clone();
        }
        let pixels = match method {
            Resample::Lanczos3 => imageops::resize(&self.pixels, width, height, FilterType::Lanczos3),
            Resample::Area => {
                let shrinking = width <= self.width() && height <= self.height();
                let filter = if shrinking {
                    fr::FilterType::Box
                } else {
                    fr::FilterType::Bilinear
                };
                convolve(&self.pixels, width, height, filter).unwrap_or_else(|e| {
                    log::warn!("area resize to {width}x{height} failed ({e}), using triangle filter");
                    imageops::resize(&self.pixels, width, height, FilterType::Triangle)
                })
            }
        };
        Self::new(pixels)
    }

    /// Return a copy of `canvas` with `self` pasted at (`x`, `y`).
    ///
    /// Returns `None` if any part of `self` would fall outside the canvas.
    pub fn paste_onto(&self, canvas: &RasterImage, x: u32, y: u32) -> Option<RasterImage> {
        let placement = Rect {
            x,
            y,
            width: self.width(),
            height: self.height(),
        };
        if !placement.fits_within(canvas.width(), canvas.height()) {
            return None;
        }
        let mut out = canvas.pixels.clone();
        imageops::replace(&mut out, &self.pixels, i64::from(x), i64::from(y));
        Some(Self::new(out))
    }

    /// Stack images top to bottom. All parts must share one width; empty
    /// parts (zero height) are skipped.
    pub fn stack_vertically(parts: &[&RasterImage]) -> Option<RasterImage> {
        let width = parts.first()?.width();
        if parts.iter().any(|p| p.width() != width) {
            return None;
        }
        let height: u32 = parts.iter().map(|p| p.height()).sum();
        let mut raw = Vec::with_capacity(width as usize * height as usize * Self::CHANNELS);
        for part in parts {
            // Rows of equal width are contiguous, so stacking is concatenation.
            raw.extend_from_slice(part.as_raw());
        }
        RgbImage::from_raw(width, height, raw).map(Self::new)
    }
}

/// Convolution resize through `fast_image_resize`.
fn convolve(
    src: &RgbImage,
    width: u32,
    height: u32,
    filter: fr::FilterType,
) -> Result<RgbImage, String> {
    let (src_w, src_h) = src.dimensions();
    let src_view = fr::images::ImageRef::new(src_w, src_h, src.as_raw(), fr::PixelType::U8x3)
        .map_err(|e| e.to_string())?;
    let mut dst = fr::images::Image::new(width, height, fr::PixelType::U8x3);
    let options = fr::ResizeOptions::new().resize_alg(fr::ResizeAlg::Convolution(filter));
    fr::Resizer::new()
        .resize(&src_view, &mut dst, Some(&options))
        .map_err(|e| e.to_string())?;
    RgbImage::from_raw(width, height, dst.into_vec())
        .ok_or_else(|| format!("resized buffer does not hold {width}x{height} RGB pixels"))
}
