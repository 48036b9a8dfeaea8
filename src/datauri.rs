//! `data:` URI helpers for base64 encoded images

use crate::error::{Error, Result};
use base64::{Engine as _, engine::general_purpose::STANDARD};

/// MIME type of exported images
pub const PNG_MIME: &str = "image/png";

/// Encode bytes as a base64 `data:` URI with the given MIME type.
pub fn encode(mime: &str, bytes: &[u8]) -> String {
    format!("data:{mime};base64,{}", STANDARD.encode(bytes))
}

/// Encode PNG bytes as a `data:image/png;base64,...` URI.
pub fn encode_png(bytes: &[u8]) -> String {
    encode(PNG_MIME, bytes)
}

/// A decoded `data:` URI
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataUri {
    /// Declared MIME type (may be empty)
    pub mime: String,
    /// Decoded body
    pub bytes: Vec<u8>,
}

/// Decode a base64 `data:` URI.
pub fn decode(uri: &str) -> Result<DataUri> {
    let rest = uri
        .strip_prefix("data:")
        .ok_or_else(|| Error::Other("not a data URI".to_string()))?;
    let (header, body) = rest
        .split_once(',')
        .ok_or_else(|| Error::Other("data URI has no body".to_string()))?;
    let mime = header
        .strip_suffix(";base64")
        .ok_or_else(|| Error::Other("only base64 data URIs are supported".to_string()))?;

    Ok(DataUri {
        mime: mime.to_string(),
        bytes: STANDARD.decode(body.trim())?,
    })
}
