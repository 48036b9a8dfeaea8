//! QR code decoder using rqrr

use crate::error::{Error, Result};
use crate::payload::QrPayload;
use image::{DynamicImage, GrayImage};

/// QR code decoder, used to verify exported images
pub struct QrDecoder {}

impl QrDecoder {
    /// Create a new QR decoder with default settings
    pub fn new() -> Self {
        Self {}
    }

    /// Decode a QR code from an image
    pub fn decode(&self, img: &DynamicImage) -> Result<QrPayload> {
        let gray = img.to_luma8();

        self.decode_gray(gray)
    }

    /// Decode a QR code from a grayscale image
    pub fn decode_gray(&self, img: GrayImage) -> Result<QrPayload> {
        let mut prepared = rqrr::PreparedImage::prepare(img);

        let grids = prepared.detect_grids();

        // Take the first detected QR code
        let grid = grids.first().ok_or(Error::NoQrCodeFound)?;

        match grid.decode() {
            Ok((meta, content)) => {
                tracing::debug!(
                    "Decoded QR: version={:?}, ecc_level={:?}, length={}",
                    meta.version,
                    meta.ecc_level,
                    content.len()
                );

                Ok(QrPayload::from_string(content))
            }
            Err(e) => Err(Error::QrDecode(format!("Decode failed: {:?}", e))),
        }
    }

    /// Decode a PNG (or any supported format) from memory
    pub fn decode_encoded(&self, bytes: &[u8]) -> Result<QrPayload> {
        let img = image::load_from_memory(bytes)?;
        self.decode(&img)
    }
}

impl Default for QrDecoder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Luma, Rgba, RgbaImage};

    #[test]
    fn test_blank_image_has_no_code() {
        let decoder = QrDecoder::new();
        let blank = GrayImage::from_pixel(64, 64, Luma([255]));
        assert!(matches!(
            decoder.decode_gray(blank),
            Err(Error::NoQrCodeFound)
        ));
    }

    #[test]
    fn test_garbage_bytes_rejected() {
        let decoder = QrDecoder::new();
        assert!(matches!(
            decoder.decode_encoded(b"definitely not a png"),
            Err(Error::Image(_))
        ));
    }

    #[test]
    fn test_decode_rgba_source() {
        let decoder = QrDecoder::new();
        let img = DynamicImage::ImageRgba8(RgbaImage::from_pixel(32, 32, Rgba([255, 255, 255, 255])));
        assert!(decoder.decode(&img).is_err());
    }
}
