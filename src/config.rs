//! qrexport runtime configuration handling

use crate::compose::Compositor;
use crate::error::{Error, Result};
use crate::logo;
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Top-level configuration structure loaded from disk or environment
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct QrexportConfig {
    /// Rendering and composition geometry
    pub render: RenderOptions,
    /// Remote QR image service
    pub remote: RemoteOptions,
    /// Where downloads are written
    pub export: ExportOptions,
    /// Logging configuration
    pub logging: LoggingOptions,
}

impl QrexportConfig {
    /// Load configuration from an explicit path or fall back to discovered defaults.
    pub fn load(explicit_path: Option<&Path>) -> Result<Self> {
        let mut config = if let Some(path) = explicit_path {
            Self::from_file(path)?
        } else if let Some(path) = Self::discover_file()? {
            tracing::info!("Using configuration file: {}", path.display());
            Self::from_file(&path)?
        } else {
            tracing::debug!("No qrexport.toml / qrexport.yaml found, using defaults");
            Self::default()
        };

        config.apply_env_overrides();
        Ok(config)
    }

    /// Attempt to locate a configuration file in common locations.
    fn discover_file() -> Result<Option<PathBuf>> {
        let cwd =
            env::current_dir().map_err(|e| Error::Config(format!("Failed to read cwd: {e}")))?;
        for candidate in ["qrexport.toml", "qrexport.yaml", "qrexport.yml"] {
            let path = cwd.join(candidate);
            if path.exists() {
                return Ok(Some(path));
            }
        }

        if let Some(xdg_config) = env::var_os("XDG_CONFIG_HOME") {
            let base = PathBuf::from(xdg_config).join("qrexport");
            for candidate in ["config.toml", "config.yaml"] {
                let path = base.join(candidate);
                if path.exists() {
                    return Ok(Some(path));
                }
            }
        }

        Ok(None)
    }

    /// Read configuration from a concrete file path.
    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("Failed to read {}: {e}", path.display())))?;

        match path
            .extension()
            .and_then(|ext| ext.to_str())
            .unwrap_or("")
            .to_ascii_lowercase()
            .as_str()
        {
            "toml" => toml::from_str(&contents).map_err(|e| {
                Error::Config(format!("Failed to parse TOML {}: {e}", path.display()))
            }),
            "yaml" | "yml" => serde_yaml::from_str(&contents).map_err(|e| {
                Error::Config(format!("Failed to parse YAML {}: {e}", path.display()))
            }),
            other => Err(Error::Config(format!(
                "Unsupported config format '{}', expected toml/yaml",
                other
            ))),
        }
    }

    /// Apply environment variable overrides after file/default loading.
    fn apply_env_overrides(&mut self) {
        self.render.apply_env_overrides();
        self.remote.apply_env_overrides();
        self.export.apply_env_overrides();
        self.logging.apply_env_overrides();
    }
}

/// Which QR renderer to use
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum RendererKind {
    /// Encode in process
    #[default]
    Local,
    /// Fetch from the remote QR image service
    Remote,
}

impl FromStr for RendererKind {
    type Err = String;

    fn from_str(value: &str) -> std::result::Result<Self, Self::Err> {
        match value.to_ascii_lowercase().as_str() {
            "local" => Ok(Self::Local),
            "remote" => Ok(Self::Remote),
            _ => Err(format!(
                "Unsupported renderer '{value}', expected 'local' or 'remote'"
            )),
        }
    }
}

/// Default logo diameter as a fraction of the QR edge
const LOGO_FRACTION: u32 = 4;

/// Rendering and composition geometry
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderOptions {
    /// Renderer strategy
    pub renderer: RendererKind,
    /// Edge length of the QR bitmap in pixels
    pub qr_size: u32,
    /// Edge length of the exported canvas in pixels
    pub canvas_size: u32,
    /// Diameter of the center logo circle in pixels; a quarter of `qr_size` when unset
    pub logo_size: Option<u32>,
    /// Width of the white ring drawn around the logo (0 disables it)
    pub logo_halo: u32,
    /// Longest side kept when a logo is uploaded
    pub upload_max_dimension: u32,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            renderer: RendererKind::Local,
            qr_size: 256,
            canvas_size: 400,
            logo_size: None,
            logo_halo: 0,
            upload_max_dimension: logo::DEFAULT_MAX_DIMENSION,
        }
    }
}

impl RenderOptions {
    pub(crate) fn apply_env_overrides(&mut self) {
        if let Ok(renderer) = env::var("QREXPORT_RENDERER") {
            if let Ok(parsed) = renderer.parse::<RendererKind>() {
                self.renderer = parsed;
            }
        }
        if let Ok(size) = env::var("QREXPORT_QR_SIZE") {
            if let Ok(parsed) = size.parse::<u32>() {
                self.qr_size = parsed;
            }
        }
        if let Ok(size) = env::var("QREXPORT_CANVAS_SIZE") {
            if let Ok(parsed) = size.parse::<u32>() {
                self.canvas_size = parsed;
            }
        }
        if let Ok(size) = env::var("QREXPORT_LOGO_SIZE") {
            if let Ok(parsed) = size.parse::<u32>() {
                self.logo_size = Some(parsed);
            }
        }
        if let Ok(halo) = env::var("QREXPORT_LOGO_HALO") {
            if let Ok(parsed) = halo.parse::<u32>() {
                self.logo_halo = parsed;
            }
        }
    }

    /// Logo circle diameter in effect
    pub fn logo_diameter(&self) -> u32 {
        self.logo_size
            .unwrap_or(self.qr_size / LOGO_FRACTION)
            .max(1)
    }

    /// Check the geometry and build the compositor for it.
    pub fn compositor(&self) -> Result<Compositor> {
        if self.qr_size == 0 {
            return Err(Error::Config("qr_size must be non-zero".to_string()));
        }
        if self.canvas_size < self.qr_size {
            return Err(Error::Config(format!(
                "canvas_size ({}) must be at least qr_size ({})",
                self.canvas_size, self.qr_size
            )));
        }
        let logo_size = self.logo_diameter();
        if logo_size > self.qr_size {
            return Err(Error::Config(format!(
                "logo_size ({logo_size}) must not exceed qr_size ({})",
                self.qr_size
            )));
        }
        Compositor::new(self.canvas_size, logo_size, self.logo_halo)
    }
}

/// Remote QR image service settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RemoteOptions {
    /// Endpoint accepting `size`, `data`, `format` and `ecc` query parameters
    pub endpoint: String,
    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for RemoteOptions {
    fn default() -> Self {
        Self {
            endpoint: "https://api.qrserver.com/v1/create-qr-code/".to_string(),
            timeout_secs: 10,
        }
    }
}

impl RemoteOptions {
    pub(crate) fn apply_env_overrides(&mut self) {
        if let Ok(endpoint) = env::var("QREXPORT_REMOTE_ENDPOINT") {
            self.endpoint = endpoint;
        }
        if let Ok(timeout) = env::var("QREXPORT_REMOTE_TIMEOUT") {
            if let Ok(value) = timeout.parse::<u64>() {
                self.timeout_secs = value.max(1);
            }
        }
    }
}

/// Download destination
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportOptions {
    /// Directory downloads are written into
    pub output_dir: PathBuf,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("."),
        }
    }
}

impl ExportOptions {
    pub(crate) fn apply_env_overrides(&mut self) {
        if let Ok(dir) = env::var("QREXPORT_OUTPUT_DIR") {
            if !dir.trim().is_empty() {
                self.output_dir = PathBuf::from(dir);
            }
        }
    }
}

/// Structured logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingOptions {
    /// Default log level (overridable via `QREXPORT_LOG_LEVEL`)
    pub level: String,
    /// Optional log file path for teeing structured logs
    pub file: Option<PathBuf>,
    /// Force ANSI colors in terminal logging
    pub color: bool,
    /// Optional log rotation strategy applied to `file`
    pub rotation: Option<LogRotation>,
}

impl Default for LoggingOptions {
    fn default() -> Self {
        Self {
            level: "warn".to_string(),
            file: None,
            color: true,
            rotation: None,
        }
    }
}

impl LoggingOptions {
    pub(crate) fn apply_env_overrides(&mut self) {
        if let Ok(level) = env::var("QREXPORT_LOG_LEVEL") {
            self.level = level;
        }
        if let Ok(file) = env::var("QREXPORT_LOG_FILE") {
            self.file = Some(PathBuf::from(file));
        }
        if let Ok(color) = env::var("QREXPORT_LOG_COLOR") {
            match color.to_ascii_lowercase().as_str() {
                "0" | "false" | "off" => self.color = false,
                "1" | "true" | "on" => self.color = true,
                _ => {}
            }
        }
        if let Ok(rotation) = env::var("QREXPORT_LOG_ROTATION") {
            if let Some(parsed) = LogRotation::from_str(&rotation) {
                self.rotation = Some(parsed);
            }
        }
    }
}

/// Supported log rotation policies for file sinks
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogRotation {
    /// Rotate log files once per hour
    Hourly,
    /// Rotate log files once per day
    Daily,
}

impl LogRotation {
    fn from_str(value: &str) -> Option<Self> {
        match value.to_ascii_lowercase().as_str() {
            "hourly" => Some(Self::Hourly),
            "daily" => Some(Self::Daily),
            _ => None,
        }
    }
}
