//! qrexport - QR code generator with logo overlay and PNG export
//!
//! The crate follows one linear flow: form inputs are validated into a
//! [`QrRequest`], encoded into a [`QrPayload`] (plain text, or a JSON
//! `{url, expires}` document when an expiry is chosen), rendered into a QR
//! bitmap, composed onto a white canvas with an optional circular logo and
//! saved as a PNG.
//!
//! # Features
//!
//! - **Local rendering**: deterministic in-process encoding at ECC level H
//! - **Remote rendering**: optional HTTP QR image service (`remote` feature)
//! - **Logo overlay**: circular-clipped center logo with optional halo
//! - **Single in-flight request**: newer generations supersede older ones
//!
//! # Example
//!
//! ```no_run
//! use qrexport::{Compositor, QrEncoder, Session};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let mut session = Session::new(256);
//!     session.set_text("https://example.com");
//!
//!     let today = chrono::Utc::now().date_naive();
//!     session.generate(&QrEncoder::new(), today).await?;
//!
//!     let path = session
//!         .download(&Compositor::default(), std::path::Path::new("."))
//!         .await?;
//!     println!("Saved {}", path.display());
//!     Ok(())
//! }
//! ```

#![warn(missing_docs, rust_2024_compatibility)]
#![cfg_attr(docsrs, feature(doc_cfg))]

pub mod compose;
pub mod config;
pub mod datauri;
pub mod download;
pub mod error;
pub mod form;
pub mod logging;
pub mod logo;
pub mod output;
pub mod payload;
pub mod qr;
pub mod session;

// Re-exports for convenience
pub use error::{Error, Result};

pub use compose::{Compositor, LogoOverlay};
pub use config::{
    ExportOptions, LogRotation, LoggingOptions, QrexportConfig, RemoteOptions, RenderOptions,
    RendererKind,
};
pub use download::{DEFAULT_FILENAME, DownloadArtifact};
pub use form::{Expiry, FormState};
pub use payload::{PayloadContent, QrPayload, QrRequest};
#[cfg(feature = "remote")]
pub use qr::RemoteRenderer;
pub use qr::{QrDecoder, QrEncoder, QrRenderer, RenderedAsset};
pub use session::{FlowState, Generation, RenderedQr, Session};
