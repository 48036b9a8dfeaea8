//! Error types for qrexport operations

use thiserror::Error;

/// Result type alias using qrexport's Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for qrexport operations
#[derive(Error, Debug)]
pub enum Error {
    /// A required form field is missing or out of range
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// QR code encoding failed
    #[error("Failed to encode QR code: {0}")]
    QrEncode(String),

    /// QR code decoding failed
    #[error("Failed to decode QR code: {0}")]
    QrDecode(String),

    /// No QR code found in image
    #[error("No QR code found in image")]
    NoQrCodeFound,

    /// Remote QR image service failed or timed out
    #[error("Remote QR service error: {0}")]
    Remote(String),

    /// Uploaded logo could not be read or decoded
    #[error("Logo upload failed: {0}")]
    LogoUpload(String),

    /// Composition or PNG export failed
    #[error("Export failed: {0}")]
    Export(String),

    /// Download requested before a render completed
    #[error("No rendered QR code available; generate one first")]
    NotReady,

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Image processing error
    #[error("Image processing error: {0}")]
    Image(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

impl From<image::ImageError> for Error {
    fn from(e: image::ImageError) -> Self {
        Error::Image(e.to_string())
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Other(format!("JSON error: {}", e))
    }
}

impl From<base64::DecodeError> for Error {
    fn from(e: base64::DecodeError) -> Self {
        Error::Other(format!("Base64 decode error: {}", e))
    }
}

#[cfg(feature = "remote")]
impl From<reqwest::Error> for Error {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            Error::Remote(format!("request timed out: {}", e))
        } else {
            Error::Remote(e.to_string())
        }
    }
}
