//! Download artifacts and the file-save step

use crate::datauri::{self, PNG_MIME};
use crate::error::{Error, Result};
use std::path::{Path, PathBuf};

/// Filename used when no title is supplied
pub const DEFAULT_FILENAME: &str = "qrcode.png";

/// A composed PNG and the name it should be saved under
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadArtifact {
    /// `data:image/png;base64,...`
    pub png_data_uri: String,
    /// Target file name
    pub filename: String,
}

impl DownloadArtifact {
    /// Pair a PNG data URI with the filename derived from `title`.
    pub fn new(png_data_uri: String, title: Option<&str>) -> Self {
        Self {
            png_data_uri,
            filename: filename_for(title),
        }
    }

    /// Decode the PNG bytes carried by the data URI.
    pub fn png_bytes(&self) -> Result<Vec<u8>> {
        let decoded = datauri::decode(&self.png_data_uri)
            .map_err(|e| Error::Export(format!("invalid PNG data URI: {e}")))?;
        if decoded.mime != PNG_MIME {
            return Err(Error::Export(format!(
                "expected {PNG_MIME} data, got '{}'",
                decoded.mime
            )));
        }
        Ok(decoded.bytes)
    }

    /// Write the PNG into `dir`, returning the full path. Single attempt.
    pub async fn save_to(&self, dir: &Path) -> Result<PathBuf> {
        let bytes = self.png_bytes()?;

        tokio::fs::create_dir_all(dir).await.map_err(|e| {
            Error::Io(std::io::Error::new(
                e.kind(),
                format!("Failed to create directory {}: {e}", dir.display()),
            ))
        })?;

        let path = dir.join(&self.filename);
        tokio::fs::write(&path, &bytes).await.map_err(|e| {
            Error::Io(std::io::Error::new(
                e.kind(),
                format!("Failed to write {}: {e}", path.display()),
            ))
        })?;

        tracing::info!(path = %path.display(), bytes = bytes.len(), "Saved QR code");
        Ok(path)
    }
}

/// `<title>.png`, or [`DEFAULT_FILENAME`] when the title is missing or blank.
///
/// Path separators are replaced so the file always lands in the target directory.
pub fn filename_for(title: Option<&str>) -> String {
    let title = title.map(str::trim).unwrap_or_default();
    if title.is_empty() {
        return DEFAULT_FILENAME.to_string();
    }

    let safe: String = title
        .chars()
        .map(|c| match c {
            '/' | '\\' | '\0' => '_',
            c => c,
        })
        .collect();

    if safe == "." || safe == ".." {
        return DEFAULT_FILENAME.to_string();
    }

    format!("{safe}.png")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filename_defaults() {
        assert_eq!(filename_for(None), "qrcode.png");
        assert_eq!(filename_for(Some("")), "qrcode.png");
        assert_eq!(filename_for(Some("   ")), "qrcode.png");
        assert_eq!(filename_for(Some("..")), "qrcode.png");
    }

    #[test]
    fn test_filename_from_title() {
        assert_eq!(filename_for(Some("mycode")), "mycode.png");
        assert_eq!(filename_for(Some(" Event Ticket ")), "Event Ticket.png");
        assert_eq!(filename_for(Some("a/b\\c")), "a_b_c.png");
    }

    #[test]
    fn test_png_bytes_requires_png() {
        let artifact = DownloadArtifact::new(datauri::encode("image/jpeg", b"x"), None);
        assert!(matches!(artifact.png_bytes(), Err(Error::Export(_))));

        let artifact = DownloadArtifact::new(datauri::encode_png(b"png"), None);
        assert_eq!(artifact.png_bytes().unwrap(), b"png");
    }

    #[tokio::test]
    async fn test_save_to_writes_file() {
        let dir = std::env::temp_dir().join(format!("qrexport-download-{}", std::process::id()));
        let artifact = DownloadArtifact::new(datauri::encode_png(b"fake png"), Some("saved"));

        let path = artifact.save_to(&dir).await.unwrap();
        assert_eq!(path, dir.join("saved.png"));
        assert_eq!(tokio::fs::read(&path).await.unwrap(), b"fake png");

        let _ = tokio::fs::remove_dir_all(&dir).await;
    }
}
