//! QR rendering through a remote QR image service

use crate::config::RemoteOptions;
use crate::error::{Error, Result};
use crate::payload::QrPayload;
use crate::qr::{QrRenderer, RenderedAsset, check_size};
use async_trait::async_trait;
use bytes::Bytes;
use reqwest::Client;
use std::time::Duration;

/// Renderer that fetches a PNG from an HTTP QR image endpoint
///
/// The request is `GET <endpoint>?size=NxN&data=<payload>&format=png&ecc=H`.
pub struct RemoteRenderer {
    client: Client,
    endpoint: String,
}

impl RemoteRenderer {
    /// Build a renderer with the configured endpoint and timeout.
    pub fn new(options: &RemoteOptions) -> Result<Self> {
        if options.endpoint.trim().is_empty() {
            return Err(Error::Config("remote endpoint must not be empty".to_string()));
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(options.timeout_secs.max(1)))
            .build()?;

        Ok(Self {
            client,
            endpoint: options.endpoint.clone(),
        })
    }

    /// Endpoint the renderer talks to
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    async fn fetch(&self, payload: &QrPayload, size: u32) -> Result<Bytes> {
        let dimensions = format!("{size}x{size}");
        let response = self
            .client
            .get(&self.endpoint)
            .query(&[
                ("size", dimensions.as_str()),
                ("data", payload.as_str()),
                ("format", "png"),
                ("ecc", "H"),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::Remote(format!(
                "{} answered with status {status}",
                self.endpoint
            )));
        }

        Ok(response.bytes().await?)
    }
}

#[async_trait]
impl QrRenderer for RemoteRenderer {
    fn name(&self) -> &'static str {
        "remote"
    }

    async fn render(&self, payload: &QrPayload, size: u32) -> Result<RenderedAsset> {
        check_size(size)?;

        tracing::debug!(endpoint = %self.endpoint, size, "Requesting remote QR image");
        let body = self.fetch(payload, size).await?;

        let image = image::load_from_memory(&body)
            .map_err(|e| Error::Remote(format!("response is not a usable image: {e}")))?;

        Ok(RenderedAsset::fit(image.to_rgba8(), size))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_endpoint_rejected() {
        let options = RemoteOptions {
            endpoint: "  ".to_string(),
            ..RemoteOptions::default()
        };
        assert!(matches!(RemoteRenderer::new(&options), Err(Error::Config(_))));
    }

    #[test]
    fn test_default_endpoint() {
        let renderer = RemoteRenderer::new(&RemoteOptions::default()).unwrap();
        assert_eq!(renderer.endpoint(), RemoteOptions::default().endpoint);
        assert_eq!(renderer.name(), "remote");
    }
}
