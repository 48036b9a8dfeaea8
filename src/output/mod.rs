//! Helpers for rendering generation results for the terminal

use crate::payload::{PayloadContent, QrPayload, iso8601_millis};
use serde_json::{Map, Value, json};
use std::path::Path;

/// Everything worth reporting about one export
#[derive(Debug, Clone)]
pub struct ExportSummary<'a> {
    /// Renderer that produced the bitmap
    pub renderer: &'a str,
    /// Title entered by the user
    pub title: Option<&'a str>,
    /// Source text
    pub text: &'a str,
    /// Encoded payload
    pub payload: &'a QrPayload,
    /// Whether a logo was overlaid
    pub logo: bool,
    /// Where the PNG was written
    pub saved_to: &'a Path,
    /// Payload decoded back from the exported PNG, when verification ran
    pub verified: Option<&'a QrPayload>,
}

/// Combined structured and human-readable representation of an export
#[derive(Debug, Clone)]
pub struct RenderedExport {
    /// Structured JSON representation suitable for scripts
    pub json: Value,
    /// Human-readable lines for terminal presentation
    pub human: Vec<String>,
}

/// Render an export summary into both JSON and human-readable forms.
pub fn render_export(summary: &ExportSummary<'_>) -> RenderedExport {
    let json = export_value(summary);
    let mut human = Vec::new();

    human.push("QR code exported".to_string());
    if let Some(title) = summary.title {
        human.push(format!("  Title: {title}"));
    }
    human.push(format!("  Text: {}", summary.text));
    match summary.payload.interpret() {
        PayloadContent::Plain(_) => human.push("  Expires: never".to_string()),
        PayloadContent::Expiring { expires, .. } => {
            human.push(format!("  Expires: {}", expires.format("%Y-%m-%d")));
        }
    }
    human.push(format!("  Payload: {}", summary.payload.as_str()));
    human.push(format!("  Renderer: {}", summary.renderer));
    human.push(format!("  Logo: {}", if summary.logo { "yes" } else { "no" }));
    if let Some(verified) = summary.verified {
        human.push(format!("  Verified: {}", verified == summary.payload));
    }
    human.push(format!("  Saved to: {}", summary.saved_to.display()));

    RenderedExport { json, human }
}

fn export_value(summary: &ExportSummary<'_>) -> Value {
    let mut root = Map::new();
    root.insert("title".to_string(), json!(summary.title));
    root.insert("text".to_string(), Value::String(summary.text.to_string()));
    root.insert(
        "payload".to_string(),
        Value::String(summary.payload.as_str().to_string()),
    );
    root.insert(
        "expires".to_string(),
        match summary.payload.interpret() {
            PayloadContent::Plain(_) => Value::Null,
            PayloadContent::Expiring { expires, .. } => Value::String(iso8601_millis(expires)),
        },
    );
    root.insert(
        "renderer".to_string(),
        Value::String(summary.renderer.to_string()),
    );
    root.insert("logo".to_string(), Value::Bool(summary.logo));
    root.insert(
        "path".to_string(),
        Value::String(summary.saved_to.display().to_string()),
    );
    if let Some(verified) = summary.verified {
        root.insert(
            "verified".to_string(),
            Value::Bool(verified == summary.payload),
        );
    }

    Value::Object(root)
}
