//! QR code rendering and decoding
//!
//! Rendering turns a [`QrPayload`] into a square bitmap of a requested pixel
//! size. Two strategies implement [`QrRenderer`]: [`QrEncoder`] encodes in
//! process, and (with the `remote` feature) [`RemoteRenderer`] asks an HTTP
//! QR image service. Both always use the highest error correction level so
//! the symbol survives a center logo.

mod decoder;
mod encoder;
#[cfg(feature = "remote")]
#[cfg_attr(docsrs, doc(cfg(feature = "remote")))]
mod remote;

pub use decoder::QrDecoder;
pub use encoder::QrEncoder;
#[cfg(feature = "remote")]
pub use remote::RemoteRenderer;

use crate::config::{RemoteOptions, RendererKind};
use crate::error::{Error, Result};
use crate::payload::QrPayload;
use async_trait::async_trait;
use image::RgbaImage;
use image::imageops::{self, FilterType};

/// Error correction level used for every rendered symbol
pub const ECC_LEVEL: qrcode::EcLevel = qrcode::EcLevel::H;

/// A rendered QR bitmap ready to be composed onto a canvas
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedAsset {
    /// Square RGBA bitmap
    pub image: RgbaImage,
    /// Edge length in pixels
    pub size: u32,
}

impl RenderedAsset {
    /// Wrap an image, rescaling it to `size` × `size` if needed.
    pub fn fit(image: RgbaImage, size: u32) -> Self {
        let image = if image.width() == size && image.height() == size {
            image
        } else {
            tracing::debug!(
                from_width = image.width(),
                from_height = image.height(),
                size,
                "Rescaling QR bitmap"
            );
            imageops::resize(&image, size, size, FilterType::Nearest)
        };

        Self { image, size }
    }
}

/// Strategy that turns a payload into a QR bitmap
#[async_trait]
pub trait QrRenderer: Send + Sync {
    /// Short label used in logs and reports
    fn name(&self) -> &'static str;

    /// Render `payload` into a `size` × `size` bitmap.
    async fn render(&self, payload: &QrPayload, size: u32) -> Result<RenderedAsset>;
}

/// Build the renderer selected by configuration.
pub fn renderer_for(kind: RendererKind, remote: &RemoteOptions) -> Result<Box<dyn QrRenderer>> {
    match kind {
        RendererKind::Local => Ok(Box::new(QrEncoder::new())),
        #[cfg(feature = "remote")]
        RendererKind::Remote => Ok(Box::new(RemoteRenderer::new(remote)?)),
        #[cfg(not(feature = "remote"))]
        RendererKind::Remote => {
            let _ = remote;
            Err(Error::Config(
                "remote renderer requires the `remote` feature".to_string(),
            ))
        }
    }
}

pub(crate) fn check_size(size: u32) -> Result<()> {
    if size == 0 {
        return Err(Error::InvalidInput("QR size must be non-zero".to_string()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    #[test]
    fn test_fit_keeps_matching_size() {
        let image = RgbaImage::from_pixel(8, 8, Rgba([0, 0, 0, 255]));
        let asset = RenderedAsset::fit(image.clone(), 8);
        assert_eq!(asset.image, image);
        assert_eq!(asset.size, 8);
    }

    #[test]
    fn test_fit_rescales() {
        let image = RgbaImage::from_pixel(10, 10, Rgba([0, 0, 0, 255]));
        let asset = RenderedAsset::fit(image, 30);
        assert_eq!(asset.image.dimensions(), (30, 30));
    }

    #[test]
    fn test_renderer_for_local() {
        let renderer = renderer_for(RendererKind::Local, &RemoteOptions::default()).unwrap();
        assert_eq!(renderer.name(), "local");
    }
}
