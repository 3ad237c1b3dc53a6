//! Pure Rust image backend built on the `image` crate.
//!
//! ## Crate mapping
//!
//! | Operation | Crate / function |
//! |---|---|
//! | Decode (JPEG, PNG, TIFF, WebP) | `image::ImageReader`, content-sniffed, converted to RGB8 |
//! | Encode → JPEG | `image::codecs::jpeg::JpegEncoder` with configured quality |
//! | Encode → PNG / TIFF | `image::ImageBuffer::write_to` |
//! | Encode → WebP | `image::codecs::webp::WebPEncoder` (lossless) |
//! | Encode → AVIF | `image::codecs::avif::AvifEncoder` (rav1e, speed 6) |
//! | Atomic write | `tempfile::NamedTempFile` in the destination directory, then `persist` |
//!
//! Encoding happens entirely in memory before the destination is touched, and
//! the bytes land via rename, so a failed run never leaves a truncated file.

use super::backend::{BackendError, ImageBackend};
use super::params::{Encoding, OutputFormat};
use super::raster::RasterImage;
use image::codecs::avif::AvifEncoder;
use image::codecs::jpeg::JpegEncoder;
use image::codecs::webp::WebPEncoder;
use image::{ImageError, ImageFormat, ImageReader};
use std::io::{Cursor, Write};
use std::path::Path;
use tempfile::NamedTempFile;

const AVIF_SPEED: u8 = 6;

/// Production backend. Stateless, so one instance can be shared by any
/// number of threads.
#[derive(Debug, Clone, Copy, Default)]
pub struct RustBackend;

impl RustBackend {
    pub fn new() -> Self {
        Self
    }
}

fn map_image_error(path: &Path, err: ImageError) -> BackendError {
    match err {
        ImageError::IoError(e) => BackendError::Io(e),
        other => BackendError::Decode(format!("{}: {other}", path.display())),
    }
}

/// Encode into an in-memory buffer.
fn encode(image: &RasterImage, encoding: Encoding) -> Result<Vec<u8>, BackendError> {
    let rgb = image.as_rgb();
    let quality = encoding.quality.value() as u8;
    let mut buf = Cursor::new(Vec::new());

    let result = match encoding.format {
        OutputFormat::Jpeg => rgb.write_with_encoder(JpegEncoder::new_with_quality(&mut buf, quality)),
        OutputFormat::Png => rgb.write_to(&mut buf, ImageFormat::Png),
        OutputFormat::Tiff => rgb.write_to(&mut buf, ImageFormat::Tiff),
        OutputFormat::WebP => rgb.write_with_encoder(WebPEncoder::new_lossless(&mut buf)),
        OutputFormat::Avif => rgb.write_with_encoder(AvifEncoder::new_with_speed_quality(
            &mut buf, AVIF_SPEED, quality,
        )),
    };
    result.map_err(|e| BackendError::Encode(format!("{:?}: {e}", encoding.format)))?;
    Ok(buf.into_inner())
}

/// Write `bytes` to `path` through a sibling temp file and an atomic rename.
fn write_atomically(path: &Path, bytes: &[u8]) -> Result<(), BackendError> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(bytes)?;
    tmp.as_file().sync_all()?;
    tmp.persist(path).map_err(|e| BackendError::Io(e.error))?;
    Ok(())
}

impl ImageBackend for RustBackend {
    fn load(&self, path: &Path) -> Result<RasterImage, BackendError> {
        let image = ImageReader::open(path)?
            .with_guessed_format()?
            .decode()
            .map_err(|e| map_image_error(path, e))?;
        Ok(RasterImage::from_dynamic(image))
    }

    fn save(
        &self,
        image: &RasterImage,
        path: &Path,
        encoding: Encoding,
    ) -> Result<(), BackendError> {
        let bytes = encode(image, encoding)?;
        write_atomically(path, &bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::imaging::params::Quality;
    use tempfile::TempDir;

    fn sample() -> RasterImage {
        RasterImage::from_fn(64, 48, |x, y| [(x * 4) as u8, (y * 5) as u8, 128])
    }

    fn encoding(format: OutputFormat) -> Encoding {
        Encoding {
            format,
            quality: Quality::default(),
        }
    }

    #[test]
    fn png_roundtrip_is_lossless() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("out.png");
        let backend = RustBackend::new();

        backend.save(&sample(), &path, encoding(OutputFormat::Png)).unwrap();
        let loaded = backend.load(&path).unwrap();
        assert_eq!(loaded, sample());
    }

    #[test]
    fn every_output_format_decodes_back_to_same_size() {
        let tmp = TempDir::new().unwrap();
        let backend = RustBackend::new();
        for (name, format) in [
            ("out.jpg", OutputFormat::Jpeg),
            ("out.tif", OutputFormat::Tiff),
            ("out.webp", OutputFormat::WebP),
        ] {
            let path = tmp.path().join(name);
            backend.save(&sample(), &path, encoding(format)).unwrap();
            let loaded = backend.load(&path).unwrap();
            assert_eq!(loaded.dimensions(), (64, 48), "{name}");
        }
    }

    #[test]
    fn avif_output_is_written() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("out.avif");
        RustBackend::new()
            .save(&sample(), &path, encoding(OutputFormat::Avif))
            .unwrap();
        assert!(std::fs::metadata(&path).unwrap().len() > 0);
    }

    #[test]
    fn load_nonexistent_file_is_io_error() {
        let err = RustBackend::new()
            .load(Path::new("/nonexistent/image.png"))
            .unwrap_err();
        assert!(matches!(err, BackendError::Io(_)));
    }

    #[test]
    fn load_garbage_is_decode_error() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("junk.png");
        std::fs::write(&path, b"definitely not a png").unwrap();
        let err = RustBackend::new().load(&path).unwrap_err();
        assert!(matches!(err, BackendError::Decode(_)), "{err:?}");
    }

    #[test]
    fn load_drops_alpha() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("rgba.png");
        image::RgbaImage::from_pixel(3, 2, image::Rgba([10, 20, 30, 0]))
            .save(&path)
            .unwrap();
        let loaded = RustBackend::new().load(&path).unwrap();
        assert_eq!(loaded.dimensions(), (3, 2));
        assert_eq!(loaded.pixel(0, 0), [10, 20, 30]);
    }

    #[test]
    fn save_into_missing_directory_fails_without_output() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("missing").join("out.png");
        let result = RustBackend::new().save(&sample(), &path, encoding(OutputFormat::Png));
        assert!(result.is_err());
        assert!(!path.exists());
    }

    #[test]
    fn save_leaves_no_temp_files() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("out.png");
        RustBackend::new()
            .save(&sample(), &path, encoding(OutputFormat::Png))
            .unwrap();
        let entries: Vec<_> = std::fs::read_dir(tmp.path()).unwrap().collect();
        assert_eq!(entries.len(), 1);
    }

    #[test]
    fn save_replaces_existing_file() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("out.png");
        std::fs::write(&path, b"old").unwrap();
        RustBackend::new()
            .save(&sample(), &path, encoding(OutputFormat::Png))
            .unwrap();
        assert_eq!(RustBackend::new().load(&path).unwrap(), sample());
    }
}
