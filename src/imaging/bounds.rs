//! Vertical foreground bounds.

use super::error::ProcessingError;
use super::raster::RasterImage;

/// Inclusive row range holding every non-background pixel.
///
/// Invariant: `top <= bottom`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ForegroundBounds {
    pub top: u32,
    pub bottom: u32,
}

impl ForegroundBounds {
    pub fn height(&self) -> u32 {
        self.bottom - self.top + 1
    }
}

/// A pixel is background when every channel is at least `threshold`.
fn is_background(px: &[u8], threshold: u8) -> bool {
    px.iter().all(|&c| c >= threshold)
}

fn is_foreground_row(row: &[u8], threshold: u8) -> bool {
    row.chunks_exact(RasterImage::CHANNELS)
        .any(|px| !is_background(px, threshold))
}

/// Find the first and last rows containing at least one non-background
/// pixel.
///
/// There is no fallback: when every row is background the caller gets
/// [`ProcessingError::ForegroundNotFound`] and decides what to do.
pub fn find_foreground_bounds(
    image: &RasterImage,
    threshold: u8,
) -> Result<ForegroundBounds, ProcessingError> {
    let (width, height) = image.dimensions();
    let not_found = ProcessingError::ForegroundNotFound {
        threshold,
        width,
        height,
    };

    let top = (0..height)
        .find(|&y| is_foreground_row(image.row(y), threshold))
        .ok_or(not_found)?;
    // A foreground row exists, so the reverse scan stops at `top` at the latest.
    let bottom = (top..height)
        .rev()
        .find(|&y| is_foreground_row(image.row(y), threshold))
        .unwrap_or(top);

    log::debug!("foreground rows {top}..={bottom} at threshold {threshold}");
    Ok(ForegroundBounds { top, bottom })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn band(width: u32, height: u32, rows: std::ops::Range<u32>, color: [u8; 3]) -> RasterImage {
        RasterImage::from_fn(width, height, |_, y| {
            if rows.contains(&y) { color } else { [255; 3] }
        })
    }

    #[test]
    fn finds_full_width_band() {
        let image = band(800, 600, 250..350, [128; 3]);
        let bounds = find_foreground_bounds(&image, 250).unwrap();
        assert_eq!(bounds, ForegroundBounds { top: 250, bottom: 349 });
        assert_eq!(bounds.height(), 100);
    }

    #[test]
    fn single_dark_pixel_marks_its_row() {
        let image = RasterImage::from_fn(50, 40, |x, y| {
            if (x, y) == (49, 17) { [255, 255, 10] } else { [255; 3] }
        });
        let bounds = find_foreground_bounds(&image, 200).unwrap();
        assert_eq!(bounds, ForegroundBounds { top: 17, bottom: 17 });
    }

    #[test]
    fn pixel_equal_to_threshold_is_background() {
        let image = RasterImage::solid(10, 10, [240; 3]);
        let err = find_foreground_bounds(&image, 240).unwrap_err();
        assert_eq!(
            err,
            ProcessingError::ForegroundNotFound {
                threshold: 240,
                width: 10,
                height: 10
            }
        );
        assert!(find_foreground_bounds(&image, 241).is_ok());
    }

    #[test]
    fn one_dark_channel_is_enough() {
        let image = band(10, 10, 3..4, [255, 239, 255]);
        let bounds = find_foreground_bounds(&image, 240).unwrap();
        assert_eq!((bounds.top, bounds.bottom), (3, 3));
    }

    #[test]
    fn all_white_is_not_found() {
        let image = RasterImage::solid(100, 100, [255; 3]);
        let err = find_foreground_bounds(&image, 250).unwrap_err();
        assert!(err.to_string().contains("try lowering threshold"));
    }

    #[test]
    fn threshold_zero_never_finds_foreground() {
        let image = RasterImage::solid(5, 5, [0; 3]);
        assert!(find_foreground_bounds(&image, 0).is_err());
    }

    #[test]
    fn foreground_touching_edges() {
        let image = RasterImage::solid(4, 6, [0; 3]);
        let bounds = find_foreground_bounds(&image, 128).unwrap();
        assert_eq!(bounds, ForegroundBounds { top: 0, bottom: 5 });
    }
}
