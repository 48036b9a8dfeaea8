//! qrexport command-line entrypoint

use chrono::{NaiveDate, Utc};
use clap::Parser;
use qrexport::output::{ExportSummary, render_export};
use qrexport::{
    Error, QrDecoder, QrexportConfig, RendererKind, Result, Session, datauri, logging, qr,
};
use std::path::PathBuf;
use tracing::info;

#[derive(Parser, Debug)]
#[command(
    name = "qrexport",
    version,
    about = "Generate a QR code PNG with an optional center logo and expiry"
)]
struct Cli {
    /// Text or URL to encode
    text: String,

    /// Title used as the download filename (<TITLE>.png)
    #[arg(long)]
    title: Option<String>,

    /// Expiry date (YYYY-MM-DD); wraps the text in a {url, expires} JSON payload
    #[arg(long, value_name = "DATE", value_parser = parse_date)]
    expires: Option<NaiveDate>,

    /// Image file to place at the center of the code
    #[arg(long, value_name = "PATH", conflicts_with = "logo_uri")]
    logo: Option<PathBuf>,

    /// Base64 `data:` URI of the center logo
    #[arg(long, value_name = "URI")]
    logo_uri: Option<String>,

    /// Disable the center logo
    #[arg(long)]
    no_logo: bool,

    /// Renderer to use (`local` or `remote`)
    #[arg(long, value_name = "KIND")]
    renderer: Option<RendererKind>,

    /// Override the remote QR image endpoint
    #[arg(long, value_name = "URL")]
    endpoint: Option<String>,

    /// Directory the PNG is written into
    #[arg(long, value_name = "DIR")]
    out_dir: Option<PathBuf>,

    /// Optional configuration file (toml/yaml). Defaults to qrexport.{toml,yaml} in cwd/XDG config.
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Output results as formatted JSON instead of human-readable text
    #[arg(long)]
    json: bool,

    /// Decode the exported PNG and fail if it does not match the payload
    #[arg(long)]
    verify: bool,
}

fn parse_date(value: &str) -> std::result::Result<NaiveDate, String> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map_err(|e| format!("expected YYYY-MM-DD, got '{value}': {e}"))
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = QrexportConfig::load(cli.config.as_deref())?;

    if let Some(renderer) = cli.renderer {
        config.render.renderer = renderer;
    }
    if let Some(ref endpoint) = cli.endpoint {
        config.remote.endpoint = endpoint.clone();
    }
    if let Some(ref dir) = cli.out_dir {
        config.export.output_dir = dir.clone();
    }

    logging::init(&config.logging)?;

    let compositor = config.render.compositor()?;
    let renderer = qr::renderer_for(config.render.renderer, &config.remote)?;
    let today = Utc::now().date_naive();

    let mut session = Session::new(config.render.qr_size)
        .with_logo_max_dimension(config.render.upload_max_dimension);
    session.set_text(cli.text.clone());
    if let Some(ref title) = cli.title {
        session.set_title(title.clone());
    }
    if let Some(date) = cli.expires {
        session.set_no_expiry(false);
        session.set_expiry_date(Some(date), today)?;
    }
    session.set_show_logo(!cli.no_logo);

    // Upload failures are reported by the session and do not abort the export.
    if let Some(ref path) = cli.logo {
        let _ = session.upload_logo_file(path).await;
    } else if let Some(ref uri) = cli.logo_uri {
        match datauri::decode(uri) {
            Ok(decoded) => {
                let _ = session.upload_logo(&decoded.bytes);
            }
            Err(err) => tracing::warn!("Ignoring logo data URI: {err}"),
        }
    }

    info!(renderer = renderer.name(), "Generating QR code");
    session.generate(renderer.as_ref(), today).await?;

    let artifact = session.export(&compositor)?;
    let verified = if cli.verify {
        let decoded = QrDecoder::new().decode_encoded(&artifact.png_bytes()?)?;
        Some(decoded)
    } else {
        None
    };

    let saved_to = artifact.save_to(&config.export.output_dir).await?;

    let rendered = session.rendered().ok_or(Error::NotReady)?;
    let summary = ExportSummary {
        renderer: renderer.name(),
        title: session.form().title(),
        text: rendered.request.text(),
        payload: &rendered.payload,
        logo: session.form().active_logo().is_some(),
        saved_to: &saved_to,
        verified: verified.as_ref(),
    };
    let report = render_export(&summary);

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&report.json)?);
    } else {
        for line in &report.human {
            println!("{line}");
        }
    }

    if let Some(decoded) = verified {
        if decoded != rendered.payload {
            return Err(Error::QrDecode(format!(
                "exported image decodes to '{}' instead of the payload",
                decoded.as_str()
            )));
        }
    }

    Ok(())
}
