//! Logo upload handling
//!
//! Uploaded files are decoded, shrunk so the longest side fits
//! `max_dimension`, and re-encoded as PNG before they are stored in form
//! state. Only the normalised bytes are kept.

use crate::compose::{LogoOverlay, encode_png};
use crate::error::{Error, Result};
use image::imageops::FilterType;
use std::path::Path;

/// Longest logo side kept after upload
pub const DEFAULT_MAX_DIMENSION: u32 = 50;

/// Read an image file from disk and normalise it into a logo overlay.
pub async fn load(path: &Path, max_dimension: u32) -> Result<LogoOverlay> {
    let bytes = tokio::fs::read(path)
        .await
        .map_err(|e| Error::LogoUpload(format!("cannot read {}: {e}", path.display())))?;

    tracing::debug!(path = %path.display(), bytes = bytes.len(), "Read logo file");
    normalize(&bytes, max_dimension)
}

/// Decode, downscale and re-encode an uploaded image.
pub fn normalize(bytes: &[u8], max_dimension: u32) -> Result<LogoOverlay> {
    if max_dimension == 0 {
        return Err(Error::LogoUpload("maximum logo dimension must be non-zero".to_string()));
    }

    let image = image::load_from_memory(bytes)
        .map_err(|e| Error::LogoUpload(format!("unsupported or corrupt image: {e}")))?;

    let image = if image.width().max(image.height()) > max_dimension {
        image.resize(max_dimension, max_dimension, FilterType::Triangle)
    } else {
        image
    };

    let png = encode_png(image.to_rgba8()).map_err(|e| Error::LogoUpload(e.to_string()))?;
    tracing::debug!(
        width = image.width(),
        height = image.height(),
        bytes = png.len(),
        "Normalised logo"
    );

    Ok(LogoOverlay::from_bytes(png))
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{GenericImageView, Rgba, RgbaImage};

    fn png(width: u32, height: u32) -> Vec<u8> {
        encode_png(RgbaImage::from_pixel(width, height, Rgba([0, 128, 255, 255]))).unwrap()
    }

    #[test]
    fn test_large_logo_is_downscaled() {
        let logo = normalize(&png(400, 200), DEFAULT_MAX_DIMENSION).unwrap();
        let decoded = image::load_from_memory(logo.as_bytes()).unwrap();
        assert_eq!(decoded.dimensions(), (50, 25));
    }

    #[test]
    fn test_small_logo_kept() {
        let logo = normalize(&png(20, 30), DEFAULT_MAX_DIMENSION).unwrap();
        let decoded = image::load_from_memory(logo.as_bytes()).unwrap();
        assert_eq!(decoded.dimensions(), (20, 30));
    }

    #[test]
    fn test_corrupt_upload_rejected() {
        assert!(matches!(
            normalize(b"GIF89a-but-not-really", DEFAULT_MAX_DIMENSION),
            Err(Error::LogoUpload(_))
        ));
    }

    #[tokio::test]
    async fn test_missing_file() {
        let err = load(Path::new("/nonexistent/qrexport/logo.png"), 50)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::LogoUpload(_)));
    }
}
