//! Generate QR codes and save them as PNG files
//!
//! Usage: cargo run --example generate_qr

use chrono::{NaiveDate, Utc};
use qrexport::{Compositor, QrEncoder, Session};
use std::path::Path;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt::init();

    let today = Utc::now().date_naive();
    let encoder = QrEncoder::new();
    let compositor = Compositor::new(400, 64, 4)?;

    // Plain URL, default filename
    let mut session = Session::new(256);
    session.set_text("https://example.com");
    session.generate(&encoder, today).await?;
    let path = session.download(&compositor, Path::new(".")).await?;
    println!("✓ QR code saved to {}", path.display());

    // Expiring payload with a title
    session.set_title("expiring");
    session.set_no_expiry(false);
    session.set_expiry_date(NaiveDate::from_ymd_opt(2099, 1, 1), today)?;
    let rendered = session.generate(&encoder, today).await?;
    println!("  Content: {}", rendered.payload.as_str());
    let path = session.download(&compositor, Path::new(".")).await?;
    println!("✓ Expiring QR code saved to {}", path.display());

    Ok(())
}
