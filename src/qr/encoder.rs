//! In-process QR code encoder

use crate::error::{Error, Result};
use crate::payload::QrPayload;
use crate::qr::{ECC_LEVEL, QrRenderer, RenderedAsset, check_size};
use async_trait::async_trait;
use image::{DynamicImage, Luma};
use qrcode::QrCode;

/// QR code encoder
pub struct QrEncoder {
    /// Error correction level
    ecc_level: qrcode::EcLevel,
}

impl QrEncoder {
    /// Create a new QR encoder with the logo-safe (High) error correction level
    pub fn new() -> Self {
        Self {
            ecc_level: ECC_LEVEL,
        }
    }

    /// Encode a payload into a `size` × `size` bitmap without a quiet zone.
    ///
    /// Modules are scaled with nearest-neighbour sampling so the symbol fills
    /// the requested size exactly.
    pub fn encode(&self, payload: &QrPayload, size: u32) -> Result<RenderedAsset> {
        check_size(size)?;

        let code = QrCode::with_error_correction_level(payload.as_bytes(), self.ecc_level)
            .map_err(|e| Error::QrEncode(format!("Failed to create QR code: {}", e)))?;

        let modules = code
            .render::<Luma<u8>>()
            .quiet_zone(false)
            .module_dimensions(1, 1)
            .build();

        tracing::debug!(
            version = ?code.version(),
            modules = code.width(),
            size,
            "Encoded QR symbol"
        );

        let rgba = DynamicImage::ImageLuma8(modules).to_rgba8();
        Ok(RenderedAsset::fit(rgba, size))
    }

    /// Encode a string into a QR bitmap
    pub fn encode_string(&self, data: &str, size: u32) -> Result<RenderedAsset> {
        self.encode(&QrPayload::from_string(data.to_string()), size)
    }
}

impl Default for QrEncoder {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl QrRenderer for QrEncoder {
    fn name(&self) -> &'static str {
        "local"
    }

    async fn render(&self, payload: &QrPayload, size: u32) -> Result<RenderedAsset> {
        self.encode(payload, size)
    }
}
