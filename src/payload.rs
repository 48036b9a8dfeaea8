//! QR payload construction
//!
//! A [`QrRequest`] is the validated pair of input text and optional expiry.
//! [`QrPayload`] is the literal string that ends up inside the QR symbol:
//! either the text itself, or a small JSON document carrying the text as
//! `url` and the expiry as an ISO 8601 timestamp.

use crate::error::{Error, Result};
use chrono::{DateTime, NaiveDate, NaiveTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

/// Validated input for a single generation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QrRequest {
    text: String,
    expires_at: Option<DateTime<Utc>>,
}

impl QrRequest {
    /// Build a request, checking that `text` is non-empty and that the expiry
    /// (if any) does not precede `today`.
    pub fn new(
        text: impl Into<String>,
        expires_on: Option<NaiveDate>,
        today: NaiveDate,
    ) -> Result<Self> {
        let text = text.into();
        if text.is_empty() {
            return Err(Error::InvalidInput("text or URL is required".to_string()));
        }

        let expires_at = match expires_on {
            Some(date) if date < today => {
                return Err(Error::InvalidInput(format!(
                    "expiry date {date} is before today ({today})"
                )));
            }
            Some(date) => Some(start_of_day_utc(date)),
            None => None,
        };

        Ok(Self { text, expires_at })
    }

    /// The raw text entered by the user
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Expiry timestamp, if one was requested
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        self.expires_at
    }

    /// Produce the string that will be encoded into the QR symbol.
    pub fn encode(&self) -> Result<QrPayload> {
        match self.expires_at {
            None => Ok(QrPayload::from_string(self.text.clone())),
            Some(expires) => {
                let body = ExpiringBody {
                    url: self.text.clone(),
                    expires: iso8601_millis(expires),
                };
                Ok(QrPayload::from_string(serde_json::to_string(&body)?))
            }
        }
    }
}

/// Midnight UTC of the given calendar date.
pub fn start_of_day_utc(date: NaiveDate) -> DateTime<Utc> {
    date.and_time(NaiveTime::default()).and_utc()
}

/// Format a timestamp the way browsers do: millisecond precision with a `Z` suffix.
pub fn iso8601_millis(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Millis, true)
}

#[derive(Debug, Serialize, Deserialize)]
struct ExpiringBody {
    url: String,
    expires: String,
}

/// The string encoded into a QR symbol
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QrPayload {
    text: String,
}

impl QrPayload {
    /// Create a new QR payload from a string
    pub fn from_string(s: String) -> Self {
        Self { text: s }
    }

    /// Create a payload from decoded bytes, rejecting invalid UTF-8
    pub fn from_bytes(data: Vec<u8>) -> Result<Self> {
        String::from_utf8(data)
            .map(Self::from_string)
            .map_err(|e| Error::QrDecode(format!("payload is not UTF-8: {e}")))
    }

    /// Get the payload as a string
    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// Get the raw bytes
    pub fn as_bytes(&self) -> &[u8] {
        self.text.as_bytes()
    }

    /// Interpret the payload as either plain text or an expiring URL document.
    pub fn interpret(&self) -> PayloadContent {
        let Ok(body) = serde_json::from_str::<ExpiringBody>(&self.text) else {
            return PayloadContent::Plain(self.text.clone());
        };

        match DateTime::parse_from_rfc3339(&body.expires) {
            Ok(expires) => PayloadContent::Expiring {
                url: body.url,
                expires: expires.with_timezone(&Utc),
            },
            Err(_) => PayloadContent::Plain(self.text.clone()),
        }
    }
}

/// Structured view of a payload
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PayloadContent {
    /// Text encoded verbatim
    Plain(String),
    /// URL wrapped with an expiry timestamp
    Expiring {
        /// Original text or URL
        url: String,
        /// Expiry instant
        expires: DateTime<Utc>,
    },
}
