//! Generation session: form state plus the `Idle → Rendering → Ready` flow
//!
//! Every generation request takes a ticket. Starting another request, or
//! changing an input that affects the payload, supersedes the outstanding
//! ticket; a result is applied only if its ticket is still current. Title
//! and logo changes only affect the export and keep a ready render.

use crate::compose::Compositor;
use crate::download::DownloadArtifact;
use crate::error::{Error, Result};
use crate::form::{Expiry, FormState};
use crate::logo;
use crate::payload::{QrPayload, QrRequest};
use crate::qr::{QrRenderer, RenderedAsset};
use chrono::NaiveDate;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// A successful render and the request it was produced from
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedQr {
    /// Validated request
    pub request: QrRequest,
    /// Encoded payload
    pub payload: QrPayload,
    /// QR bitmap
    pub asset: RenderedAsset,
}

/// Where the session is in the generate/download flow
#[derive(Debug, Clone, PartialEq)]
pub enum FlowState {
    /// Nothing rendered for the current inputs
    Idle,
    /// A render for `ticket` is in flight
    Rendering {
        /// Ticket of the outstanding request
        ticket: u64,
        /// Render that was ready before this request, restored if it fails
        previous: Option<RenderedQr>,
    },
    /// A render is available for download
    Ready(RenderedQr),
    /// The last render failed with nothing to fall back to; behaves like `Idle`
    Failed {
        /// User-facing notice
        message: String,
    },
}

/// Handle for an in-flight generation
#[derive(Debug, Clone)]
pub struct Generation {
    ticket: u64,
    request: QrRequest,
    payload: QrPayload,
}

impl Generation {
    /// Ticket identifying this request
    pub fn ticket(&self) -> u64 {
        self.ticket
    }

    /// Payload to render
    pub fn payload(&self) -> &QrPayload {
        &self.payload
    }
}

/// Form inputs, flow state and the request guard
#[derive(Debug)]
pub struct Session {
    form: FormState,
    state: FlowState,
    next_ticket: u64,
    qr_size: u32,
    logo_max_dimension: u32,
}

impl Session {
    /// Create a session rendering `qr_size` pixel symbols.
    pub fn new(qr_size: u32) -> Self {
        Self {
            form: FormState::new(),
            state: FlowState::Idle,
            next_ticket: 0,
            qr_size,
            logo_max_dimension: logo::DEFAULT_MAX_DIMENSION,
        }
    }

    /// Override the longest side kept for uploaded logos.
    pub fn with_logo_max_dimension(mut self, max_dimension: u32) -> Self {
        self.logo_max_dimension = max_dimension;
        self
    }

    /// Current form inputs
    pub fn form(&self) -> &FormState {
        &self.form
    }

    /// Current flow state
    pub fn state(&self) -> &FlowState {
        &self.state
    }

    /// Render available for download, if any
    pub fn rendered(&self) -> Option<&RenderedQr> {
        match &self.state {
            FlowState::Ready(rendered) => Some(rendered),
            _ => None,
        }
    }

    /// Generate is enabled
    pub fn can_generate(&self) -> bool {
        self.form.can_generate()
    }

    /// Download is enabled
    pub fn can_download(&self) -> bool {
        matches!(self.state, FlowState::Ready(_))
    }

    /// Set the text or URL. Invalidates any render.
    pub fn set_text(&mut self, text: impl Into<String>) {
        let text = text.into();
        if text != self.form.text() {
            self.form.set_text(text);
            self.invalidate();
        }
    }

    /// Set the title used for the download filename.
    pub fn set_title(&mut self, title: impl Into<String>) {
        self.form.set_title(title);
    }

    /// Toggle "no expiry". Invalidates any render when the selection changes.
    pub fn set_no_expiry(&mut self, no_expiry: bool) {
        let before = self.form.expiry();
        self.form.set_no_expiry(no_expiry);
        if self.form.expiry() != before {
            self.invalidate();
        }
    }

    /// Pick (or clear) the expiry date.
    pub fn set_expiry_date(&mut self, date: Option<NaiveDate>, today: NaiveDate) -> Result<()> {
        let before = self.form.expiry();
        self.form.set_expiry_date(date, today)?;
        if self.form.expiry() != before {
            self.invalidate();
        }
        Ok(())
    }

    /// Toggle the center logo.
    pub fn set_show_logo(&mut self, show: bool) {
        self.form.set_show_logo(show);
    }

    /// Store an uploaded logo. On failure the error is logged and the previous
    /// logo is kept.
    pub fn upload_logo(&mut self, bytes: &[u8]) -> Result<()> {
        match logo::normalize(bytes, self.logo_max_dimension) {
            Ok(overlay) => {
                self.form.set_logo(overlay);
                Ok(())
            }
            Err(err) => {
                warn!("Logo upload failed, keeping previous logo: {err}");
                Err(err)
            }
        }
    }

    /// Read a logo from disk and store it; see [`Session::upload_logo`].
    pub async fn upload_logo_file(&mut self, path: &Path) -> Result<()> {
        match logo::load(path, self.logo_max_dimension).await {
            Ok(overlay) => {
                self.form.set_logo(overlay);
                Ok(())
            }
            Err(err) => {
                warn!("Logo upload failed, keeping previous logo: {err}");
                Err(err)
            }
        }
    }

    /// Validate the inputs and enter `Rendering`, superseding any outstanding request.
    pub fn begin_generation(&mut self, today: NaiveDate) -> Result<Generation> {
        if !self.form.can_generate() {
            let reason = if self.form.text().is_empty() {
                "text or URL is required"
            } else {
                "expiry is enabled but no date was chosen"
            };
            return Err(Error::InvalidInput(reason.to_string()));
        }

        let request = self.form.request(today)?;
        let payload = request.encode()?;

        self.next_ticket += 1;
        let ticket = self.next_ticket;
        let previous = match std::mem::replace(&mut self.state, FlowState::Idle) {
            FlowState::Ready(rendered) => Some(rendered),
            FlowState::Rendering {
                ticket: superseded,
                previous,
            } => {
                debug!(superseded, ticket, "Superseding in-flight generation");
                previous
            }
            FlowState::Idle | FlowState::Failed { .. } => None,
        };
        self.state = FlowState::Rendering { ticket, previous };

        Ok(Generation {
            ticket,
            request,
            payload,
        })
    }

    /// Apply the outcome of a render.
    ///
    /// Returns `Ok(true)` when the result became visible, `Ok(false)` when the
    /// generation had been superseded and was discarded. Failures of the
    /// current generation are returned; the session goes back to the render
    /// that was ready before, or to `Failed` if there was none.
    pub fn complete_generation(
        &mut self,
        generation: Generation,
        outcome: Result<RenderedAsset>,
    ) -> Result<bool> {
        let current = matches!(
            self.state,
            FlowState::Rendering { ticket, .. } if ticket == generation.ticket
        );
        if !current {
            debug!(ticket = generation.ticket, "Discarding superseded generation result");
            return Ok(false);
        }

        match outcome {
            Ok(asset) => {
                self.state = FlowState::Ready(RenderedQr {
                    request: generation.request,
                    payload: generation.payload,
                    asset,
                });
                Ok(true)
            }
            Err(err) => {
                let previous = match std::mem::replace(&mut self.state, FlowState::Idle) {
                    FlowState::Rendering { previous, .. } => previous,
                    _ => None,
                };
                self.state = match previous {
                    Some(rendered) => {
                        warn!("Render failed, keeping the previous code: {err}");
                        FlowState::Ready(rendered)
                    }
                    None => FlowState::Failed {
                        message: err.to_string(),
                    },
                };
                Err(err)
            }
        }
    }

    /// Run a full generation with `renderer`.
    pub async fn generate<R>(&mut self, renderer: &R, today: NaiveDate) -> Result<&RenderedQr>
    where
        R: QrRenderer + ?Sized,
    {
        let generation = self.begin_generation(today)?;
        debug!(
            renderer = renderer.name(),
            ticket = generation.ticket,
            payload_len = generation.payload.as_str().len(),
            "Rendering QR code"
        );

        let outcome = renderer.render(&generation.payload, self.qr_size).await;
        self.complete_generation(generation, outcome)?;

        self.rendered().ok_or(Error::NotReady)
    }

    /// Compose the ready render (with the logo, if enabled) into a download artifact.
    pub fn export(&self, compositor: &Compositor) -> Result<DownloadArtifact> {
        let rendered = self.rendered().ok_or(Error::NotReady)?;
        let uri = compositor.compose_data_uri(&rendered.asset, self.form.active_logo())?;
        Ok(DownloadArtifact::new(uri, self.form.title()))
    }

    /// Export and save into `dir`. The session stays `Ready`.
    pub async fn download(&self, compositor: &Compositor, dir: &Path) -> Result<PathBuf> {
        let artifact = self.export(compositor)?;
        let path = artifact.save_to(dir).await?;
        info!(filename = %artifact.filename, "Download complete");
        Ok(path)
    }

    /// Current expiry selection
    pub fn expiry(&self) -> Expiry {
        self.form.expiry()
    }

    fn invalidate(&mut self) {
        if !matches!(self.state, FlowState::Idle) {
            debug!("Inputs changed, discarding render state");
        }
        self.state = FlowState::Idle;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::qr::QrEncoder;
    use async_trait::async_trait;

    struct FailingRenderer;

    #[async_trait]
    impl QrRenderer for FailingRenderer {
        fn name(&self) -> &'static str {
            "failing"
        }

        async fn render(&self, _payload: &QrPayload, _size: u32) -> Result<RenderedAsset> {
            Err(Error::Remote("service unavailable".to_string()))
        }
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 19).unwrap()
    }

    fn asset() -> RenderedAsset {
        QrEncoder::new().encode_string("x", 32).unwrap()
    }

    #[tokio::test]
    async fn test_generate_then_download_enabled() {
        let mut session = Session::new(256);
        assert!(!session.can_download());

        session.set_text("https://example.com");
        let rendered = session.generate(&QrEncoder::new(), today()).await.unwrap();
        assert_eq!(rendered.payload.as_str(), "https://example.com");
        assert_eq!(rendered.asset.size, 256);
        assert!(session.can_download());
    }

    #[tokio::test]
    async fn test_input_change_disables_download() {
        let mut session = Session::new(64);
        session.set_text("first");
        session.generate(&QrEncoder::new(), today()).await.unwrap();

        session.set_title("title only");
        assert!(session.can_download());

        session.set_text("second");
        assert!(!session.can_download());
        assert_eq!(session.state(), &FlowState::Idle);
    }

    #[tokio::test]
    async fn test_expiry_change_disables_download() {
        let mut session = Session::new(64);
        session.set_text("first");
        session.generate(&QrEncoder::new(), today()).await.unwrap();

        session.set_no_expiry(false);
        assert!(!session.can_download());
        assert!(!session.can_generate());
    }

    #[tokio::test]
    async fn test_failure_returns_to_failed_without_partial_state() {
        let mut session = Session::new(64);
        session.set_text("x");
        let err = session.generate(&FailingRenderer, today()).await.unwrap_err();
        assert!(matches!(err, Error::Remote(_)));
        assert!(matches!(session.state(), FlowState::Failed { .. }));
        assert!(!session.can_download());
        assert!(session.can_generate());
    }

    #[tokio::test]
    async fn test_failed_rerender_keeps_ready_render() {
        let mut session = Session::new(64);
        session.set_text("x");
        session.generate(&QrEncoder::new(), today()).await.unwrap();
        let before = session.rendered().cloned();

        let err = session.generate(&FailingRenderer, today()).await.unwrap_err();
        assert!(matches!(err, Error::Remote(_)));
        assert!(session.can_download());
        assert_eq!(session.rendered().cloned(), before);
    }

    #[test]
    fn test_superseded_request_carries_previous_render() {
        let mut session = Session::new(32);
        session.set_text("x");
        let generation = session.begin_generation(today()).unwrap();
        session.complete_generation(generation, Ok(asset())).unwrap();

        let _first = session.begin_generation(today()).unwrap();
        assert!(!session.can_download());
        let second = session.begin_generation(today()).unwrap();
        let err = session
            .complete_generation(second, Err(Error::Remote("down".to_string())))
            .unwrap_err();
        assert!(matches!(err, Error::Remote(_)));
        assert!(session.can_download());
    }

    #[test]
    fn test_generation_refused_when_gated() {
        let mut session = Session::new(64);
        assert!(matches!(
            session.begin_generation(today()),
            Err(Error::InvalidInput(_))
        ));
        session.set_text("x");
        session.set_no_expiry(false);
        assert!(matches!(
            session.begin_generation(today()),
            Err(Error::InvalidInput(_))
        ));
        assert_eq!(session.state(), &FlowState::Idle);
    }

    #[test]
    fn test_newer_request_supersedes_older() {
        let mut session = Session::new(32);
        session.set_text("x");

        let first = session.begin_generation(today()).unwrap();
        let second = session.begin_generation(today()).unwrap();
        assert!(second.ticket() > first.ticket());

        assert!(!session.complete_generation(first, Ok(asset())).unwrap());
        assert!(!session.can_download());

        assert!(session.complete_generation(second, Ok(asset())).unwrap());
        assert!(session.can_download());
    }

    #[test]
    fn test_stale_failure_is_ignored() {
        let mut session = Session::new(32);
        session.set_text("x");
        let first = session.begin_generation(today()).unwrap();
        let second = session.begin_generation(today()).unwrap();
        session.complete_generation(second, Ok(asset())).unwrap();

        let applied = session
            .complete_generation(first, Err(Error::Remote("late".to_string())))
            .unwrap();
        assert!(!applied);
        assert!(session.can_download());
    }

    #[test]
    fn test_input_change_supersedes_in_flight() {
        let mut session = Session::new(32);
        session.set_text("x");
        let generation = session.begin_generation(today()).unwrap();
        session.set_text("y");
        assert!(!session.complete_generation(generation, Ok(asset())).unwrap());
        assert_eq!(session.state(), &FlowState::Idle);
    }

    #[test]
    fn test_export_requires_ready() {
        let session = Session::new(32);
        assert!(matches!(
            session.export(&Compositor::default()),
            Err(Error::NotReady)
        ));
    }

    #[test]
    fn test_failed_upload_keeps_previous_logo() {
        let mut session = Session::new(32);
        let png = crate::compose::encode_png(image::RgbaImage::from_pixel(
            4,
            4,
            image::Rgba([1, 2, 3, 255]),
        ))
        .unwrap();
        session.upload_logo(&png).unwrap();
        let before = session.form().logo().cloned();

        assert!(session.upload_logo(b"broken").is_err());
        assert_eq!(session.form().logo().cloned(), before);
    }
}
