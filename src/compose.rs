//! Raster composition of the exported image
//!
//! The QR bitmap is centered on a larger white canvas to give it a border.
//! An optional logo is clipped to a circle at the canvas center and blended
//! on top, optionally over a white halo disc. Logos that cannot be decoded
//! are skipped with a warning rather than failing the export.

use crate::datauri;
use crate::error::{Error, Result};
use crate::qr::RenderedAsset;
use image::imageops::{self, FilterType};
use image::{DynamicImage, ImageFormat, Pixel, Rgba, RgbaImage};
use std::borrow::Cow;
use std::io::Cursor;

const WHITE: Rgba<u8> = Rgba([255, 255, 255, 255]);

static DEFAULT_LOGO: LogoOverlay = LogoOverlay {
    data: Cow::Borrowed(include_bytes!("../assets/smile.png")),
};

/// Encoded logo image to place at the center of the export
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogoOverlay {
    data: Cow<'static, [u8]>,
}

impl LogoOverlay {
    /// Wrap encoded image bytes (PNG, JPEG, ...). Decoding happens at compose time.
    pub fn from_bytes(data: Vec<u8>) -> Self {
        Self {
            data: Cow::Owned(data),
        }
    }

    /// Built-in smiley used until a logo is uploaded
    pub fn default_logo() -> &'static LogoOverlay {
        &DEFAULT_LOGO
    }

    /// Whether this is the built-in logo
    pub fn is_default(&self) -> bool {
        self == &DEFAULT_LOGO
    }

    /// Build an overlay from a base64 `data:` URI.
    pub fn from_data_uri(uri: &str) -> Result<Self> {
        Ok(Self::from_bytes(datauri::decode(uri)?.bytes))
    }

    /// Encoded image bytes
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    /// The overlay as a `data:` URI, assuming PNG content.
    pub fn to_data_uri(&self) -> String {
        datauri::encode_png(&self.data)
    }

    fn decode(&self) -> Result<RgbaImage> {
        Ok(image::load_from_memory(&self.data)?.to_rgba8())
    }
}

/// Fixed-geometry compositor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Compositor {
    canvas_size: u32,
    logo_size: u32,
    logo_halo: u32,
}

impl Default for Compositor {
    fn default() -> Self {
        Self {
            canvas_size: 400,
            logo_size: 64,
            logo_halo: 0,
        }
    }
}

impl Compositor {
    /// Create a compositor; `logo_size` is the diameter of the logo circle and
    /// `logo_halo` the width of the white ring drawn around it.
    pub fn new(canvas_size: u32, logo_size: u32, logo_halo: u32) -> Result<Self> {
        if canvas_size == 0 {
            return Err(Error::Config("canvas size must be non-zero".to_string()));
        }
        if logo_size == 0 {
            return Err(Error::Config("logo size must be non-zero".to_string()));
        }
        Ok(Self {
            canvas_size,
            logo_size,
            logo_halo,
        })
    }

    /// Output edge length in pixels
    pub fn canvas_size(&self) -> u32 {
        self.canvas_size
    }

    /// Radius around the canvas center that a logo overlay may touch.
    pub fn overlay_radius(&self) -> f32 {
        self.logo_size as f32 / 2.0 + self.logo_halo as f32
    }

    /// Flatten the QR bitmap and optional logo into one image.
    pub fn compose(&self, qr: &RenderedAsset, logo: Option<&LogoOverlay>) -> Result<RgbaImage> {
        let (qr_width, qr_height) = qr.image.dimensions();
        if qr_width > self.canvas_size || qr_height > self.canvas_size {
            return Err(Error::Export(format!(
                "QR image {qr_width}x{qr_height} does not fit a {size}x{size} canvas",
                size = self.canvas_size
            )));
        }

        let mut canvas = RgbaImage::from_pixel(self.canvas_size, self.canvas_size, WHITE);
        let x = (self.canvas_size - qr_width) / 2;
        let y = (self.canvas_size - qr_height) / 2;
        imageops::overlay(&mut canvas, &qr.image, i64::from(x), i64::from(y));

        if let Some(logo) = logo {
            match logo.decode() {
                Ok(image) => self.draw_logo(&mut canvas, &image),
                Err(err) => {
                    tracing::warn!("Skipping logo overlay, image could not be loaded: {err}");
                }
            }
        }

        Ok(canvas)
    }

    /// Compose and serialize to a PNG `data:` URI.
    pub fn compose_data_uri(
        &self,
        qr: &RenderedAsset,
        logo: Option<&LogoOverlay>,
    ) -> Result<String> {
        let canvas = self.compose(qr, logo)?;
        Ok(datauri::encode_png(&encode_png(canvas)?))
    }

    fn draw_logo(&self, canvas: &mut RgbaImage, logo: &RgbaImage) {
        let scaled = imageops::resize(logo, self.logo_size, self.logo_size, FilterType::Triangle);
        let center = self.canvas_size as f32 / 2.0;
        let radius = self.logo_size as f32 / 2.0;

        if self.logo_halo > 0 {
            fill_disc(canvas, center, radius + self.logo_halo as f32, WHITE);
        }

        // Logo occupies the square centered on the canvas; offset may be negative
        // when the logo is larger than the canvas.
        let origin = center - radius;
        for (lx, ly, pixel) in scaled.enumerate_pixels() {
            let cx = origin + lx as f32;
            let cy = origin + ly as f32;
            if cx < 0.0 || cy < 0.0 {
                continue;
            }
            let (px, py) = (cx as u32, cy as u32);
            if px >= canvas.width() || py >= canvas.height() {
                continue;
            }
            if inside_circle(px, py, center, radius) {
                canvas.get_pixel_mut(px, py).blend(pixel);
            }
        }
    }
}

fn inside_circle(x: u32, y: u32, center: f32, radius: f32) -> bool {
    let dx = x as f32 + 0.5 - center;
    let dy = y as f32 + 0.5 - center;
    dx * dx + dy * dy <= radius * radius
}

fn fill_disc(canvas: &mut RgbaImage, center: f32, radius: f32, color: Rgba<u8>) {
    let min = (center - radius).floor().max(0.0) as u32;
    let max = ((center + radius).ceil() as u32).min(canvas.width());
    for y in min..max {
        for x in min..max {
            if inside_circle(x, y, center, radius) {
                canvas.put_pixel(x, y, color);
            }
        }
    }
}

/// Serialize an image as PNG bytes.
pub fn encode_png(image: RgbaImage) -> Result<Vec<u8>> {
    let mut buffer = Cursor::new(Vec::new());
    DynamicImage::ImageRgba8(image)
        .write_to(&mut buffer, ImageFormat::Png)
        .map_err(|e| Error::Export(format!("PNG encoding failed: {e}")))?;
    Ok(buffer.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::qr::QrEncoder;

    fn qr() -> RenderedAsset {
        QrEncoder::new().encode_string("https://example.com", 256).unwrap()
    }

    fn red_logo() -> LogoOverlay {
        let logo = RgbaImage::from_pixel(50, 50, Rgba([255, 0, 0, 255]));
        LogoOverlay::from_bytes(encode_png(logo).unwrap())
    }

    fn distance_from_center(x: u32, y: u32, size: u32) -> f32 {
        let c = size as f32 / 2.0;
        let dx = x as f32 + 0.5 - c;
        let dy = y as f32 + 0.5 - c;
        (dx * dx + dy * dy).sqrt()
    }

    #[test]
    fn test_no_logo_is_centered_qr_on_white() {
        let qr = qr();
        let composed = Compositor::default().compose(&qr, None).unwrap();
        assert_eq!(composed.dimensions(), (400, 400));

        let mut expected = RgbaImage::from_pixel(400, 400, WHITE);
        for (x, y, pixel) in qr.image.enumerate_pixels() {
            expected.put_pixel(x + 72, y + 72, *pixel);
        }
        assert_eq!(composed, expected);
    }

    #[test]
    fn test_logo_changes_only_the_center() {
        let qr = qr();
        let compositor = Compositor::default();
        let plain = compositor.compose(&qr, None).unwrap();
        let with_logo = compositor.compose(&qr, Some(&red_logo())).unwrap();

        let radius = compositor.overlay_radius();
        for (x, y, pixel) in with_logo.enumerate_pixels() {
            if distance_from_center(x, y, 400) > radius {
                assert_eq!(pixel, plain.get_pixel(x, y), "pixel ({x}, {y}) changed");
            }
        }

        assert_eq!(with_logo.get_pixel(200, 200).0, [255, 0, 0, 255]);
        assert_ne!(with_logo, plain);
    }

    #[test]
    fn test_logo_is_clipped_to_circle() {
        let composed = Compositor::default()
            .compose(&qr(), Some(&red_logo()))
            .unwrap();
        // Corner of the logo square lies outside the circle
        assert_ne!(composed.get_pixel(168, 168).0, [255, 0, 0, 255]);
        assert_eq!(composed.get_pixel(168, 200).0, [255, 0, 0, 255]);
    }

    #[test]
    fn test_halo_is_white_ring() {
        let compositor = Compositor::new(400, 64, 6).unwrap();
        let transparent = RgbaImage::from_pixel(10, 10, Rgba([0, 0, 0, 0]));
        let logo = LogoOverlay::from_bytes(encode_png(transparent).unwrap());
        let composed = compositor.compose(&qr(), Some(&logo)).unwrap();

        for (x, y, pixel) in composed.enumerate_pixels() {
            if distance_from_center(x, y, 400) <= 37.0 {
                assert_eq!(*pixel, WHITE);
            }
        }
    }

    #[test]
    fn test_broken_logo_falls_back_to_plain() {
        let qr = qr();
        let compositor = Compositor::default();
        let broken = LogoOverlay::from_bytes(b"not an image".to_vec());
        assert_eq!(
            compositor.compose(&qr, Some(&broken)).unwrap(),
            compositor.compose(&qr, None).unwrap()
        );
    }

    #[test]
    fn test_qr_larger_than_canvas_rejected() {
        let compositor = Compositor::new(100, 20, 0).unwrap();
        assert!(matches!(
            compositor.compose(&qr(), None),
            Err(Error::Export(_))
        ));
    }

    #[test]
    fn test_data_uri_is_png() {
        let uri = Compositor::default().compose_data_uri(&qr(), None).unwrap();
        let decoded = datauri::decode(&uri).unwrap();
        assert_eq!(decoded.mime, "image/png");
        let image = image::load_from_memory_with_format(&decoded.bytes, ImageFormat::Png).unwrap();
        assert_eq!((image.width(), image.height()), (400, 400));
    }

    #[test]
    fn test_default_logo_decodes_and_marks_center() {
        let default = LogoOverlay::default_logo();
        assert!(default.is_default());
        assert!(!red_logo().is_default());
        assert!(default.decode().is_ok());

        let qr = qr();
        let compositor = Compositor::default();
        let plain = compositor.compose(&qr, None).unwrap();
        let with_default = compositor.compose(&qr, Some(default)).unwrap();
        assert_ne!(with_default.get_pixel(200, 200), plain.get_pixel(200, 200));
    }

    #[test]
    fn test_logo_data_uri() {
        let logo = red_logo();
        let parsed = LogoOverlay::from_data_uri(&logo.to_data_uri()).unwrap();
        assert_eq!(parsed, logo);
    }
}
