//! Form state: the inputs that drive one QR export

use crate::compose::LogoOverlay;
use crate::error::{Error, Result};
use crate::payload::QrRequest;
use chrono::NaiveDate;

/// Expiry selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Expiry {
    /// "No expiry" is checked
    #[default]
    Never,
    /// Expiry requested but no date picked yet
    Pending,
    /// Expires at the start of this (UTC) date
    On(NaiveDate),
}

/// Current form inputs
#[derive(Debug, Clone)]
pub struct FormState {
    text: String,
    title: String,
    expiry: Expiry,
    show_logo: bool,
    logo: Option<LogoOverlay>,
}

impl Default for FormState {
    fn default() -> Self {
        Self {
            text: String::new(),
            title: String::new(),
            expiry: Expiry::Never,
            show_logo: true,
            logo: None,
        }
    }
}

impl FormState {
    /// Empty form; logo overlay enabled, no expiry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Text or URL to encode
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Title used for the download filename
    pub fn title(&self) -> Option<&str> {
        if self.title.is_empty() {
            None
        } else {
            Some(&self.title)
        }
    }

    /// Current expiry selection
    pub fn expiry(&self) -> Expiry {
        self.expiry
    }

    /// Whether the center logo is enabled
    pub fn show_logo(&self) -> bool {
        self.show_logo
    }

    /// Logo to overlay at export time: the upload, else the built-in logo,
    /// or nothing when the toggle is off.
    pub fn active_logo(&self) -> Option<&LogoOverlay> {
        if !self.show_logo {
            return None;
        }
        Some(self.logo.as_ref().unwrap_or(LogoOverlay::default_logo()))
    }

    /// Uploaded logo regardless of the toggle
    pub fn logo(&self) -> Option<&LogoOverlay> {
        self.logo.as_ref()
    }

    pub(crate) fn set_text(&mut self, text: impl Into<String>) {
        self.text = text.into();
    }

    pub(crate) fn set_title(&mut self, title: impl Into<String>) {
        self.title = title.into();
    }

    /// Checking "no expiry" clears any chosen date; unchecking leaves the
    /// expiry pending until a date is picked.
    pub(crate) fn set_no_expiry(&mut self, no_expiry: bool) {
        self.expiry = match (no_expiry, self.expiry) {
            (true, _) => Expiry::Never,
            (false, Expiry::Never) => Expiry::Pending,
            (false, current) => current,
        };
    }

    /// Pick an expiry date. Dates before `today`, or any date while "no
    /// expiry" is checked, are refused and leave the selection unchanged.
    pub(crate) fn set_expiry_date(
        &mut self,
        date: Option<NaiveDate>,
        today: NaiveDate,
    ) -> Result<()> {
        match date {
            Some(_) if self.expiry == Expiry::Never => Err(Error::InvalidInput(
                "uncheck \"no expiry\" before picking a date".to_string(),
            )),
            Some(date) if date < today => Err(Error::InvalidInput(format!(
                "expiry date {date} is before today ({today})"
            ))),
            Some(date) => {
                self.expiry = Expiry::On(date);
                Ok(())
            }
            None => {
                if self.expiry != Expiry::Never {
                    self.expiry = Expiry::Pending;
                }
                Ok(())
            }
        }
    }

    pub(crate) fn set_show_logo(&mut self, show: bool) {
        self.show_logo = show;
    }

    pub(crate) fn set_logo(&mut self, logo: LogoOverlay) {
        self.logo = Some(logo);
    }

    /// Generation is allowed iff text is non-empty and a requested expiry has a date.
    pub fn can_generate(&self) -> bool {
        !self.text.is_empty() && self.expiry != Expiry::Pending
    }

    /// Build the validated request for the current inputs.
    pub fn request(&self, today: NaiveDate) -> Result<QrRequest> {
        if self.text.is_empty() {
            return Err(Error::InvalidInput("text or URL is required".to_string()));
        }
        let expires_on = match self.expiry {
            Expiry::Never => None,
            Expiry::Pending => {
                return Err(Error::InvalidInput(
                    "expiry is enabled but no date was chosen".to_string(),
                ));
            }
            Expiry::On(date) => Some(date),
        };
        QrRequest::new(self.text.clone(), expires_on, today)
    }
}
