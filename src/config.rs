// Command line / environment configuration.

use crate::pdf::{RgbColor, WatermarkConfig};
use crate::storage::DEFAULT_DELETE_DELAY;
use clap::Parser;
use std::convert::Infallible;
use std::fmt::Display;
use std::path::PathBuf;
use std::time::Duration;
use tracing::Level;

/// Controls how much error detail leaves the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RunMode {
    Development,
    #[default]
    Production,
}

impl RunMode {
    /// Reads a `NODE_ENV`-style value. Only `development` (or `dev`) turns on
    /// development mode; `production`, `test`, `staging` and anything else
    /// keep error details private.
    pub fn from_env_value(value: &str) -> Result<Self, Infallible> {
        let value = value.trim();
        if value.eq_ignore_ascii_case("development") || value.eq_ignore_ascii_case("dev") {
            Ok(RunMode::Development)
        } else {
            Ok(RunMode::Production)
        }
    }

    /// What clients see instead of raw error text in production.
    pub const GENERIC_DETAIL: &'static str = "Please try again later";

    pub fn exposes_details(self) -> bool {
        self == RunMode::Development
    }

    /// `detail` in development, a generic hint otherwise.
    pub fn detail(self, detail: impl Display) -> String {
        if self.exposes_details() {
            detail.to_string()
        } else {
            Self::GENERIC_DETAIL.to_string()
        }
    }

    pub fn log_level(self) -> Level {
        match self {
            RunMode::Development => Level::DEBUG,
            RunMode::Production => Level::INFO,
        }
    }
}

/// Command line arguments for pdfstamp-server
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct AppConfig {
    /// Hostname/IP to bind the server to.
    /// "*" listens on all interfaces (IPv6 dual-stack, falling back to IPv4).
    #[arg(long, env = "PDFSTAMP_SERVER_HOST", default_value = "*")]
    pub host: String,

    /// Port number to listen on.
    #[arg(short, long, env = "PORT", default_value_t = 3000)]
    pub port: u16,

    /// Runtime mode. "development" exposes raw error details to clients;
    /// any other value is treated as production.
    #[arg(
        long,
        env = "NODE_ENV",
        value_parser = RunMode::from_env_value,
        default_value = "production"
    )]
    pub mode: RunMode,

    /// Directory holding files served once by /download/{filename}.
    #[arg(long, env = "PDFSTAMP_SERVER_SCRATCH_DIR", default_value = "compressed")]
    pub scratch_dir: PathBuf,

    /// Directory of static assets served for unmatched paths.
    #[arg(long, env = "PDFSTAMP_SERVER_PUBLIC_DIR", default_value = "public")]
    pub public_dir: PathBuf,

    /// Delay between a completed download and deletion of the file, in milliseconds.
    #[arg(
        long,
        env = "PDFSTAMP_SERVER_DELETE_DELAY_MS",
        default_value_t = DEFAULT_DELETE_DELAY.as_millis() as u64
    )]
    pub delete_delay_ms: u64,

    /// Text stamped on every page (printable ASCII).
    #[arg(long, env = "PDFSTAMP_WATERMARK_TEXT", default_value = "CONFIDENTIAL")]
    pub watermark_text: String,

    /// Watermark font size in points.
    #[arg(long, env = "PDFSTAMP_WATERMARK_FONT_SIZE", default_value_t = 48.0)]
    pub watermark_font_size: f32,

    /// Watermark fill opacity, greater than 0 and at most 1.
    #[arg(long, env = "PDFSTAMP_WATERMARK_OPACITY", default_value_t = 0.3)]
    pub watermark_opacity: f32,

    /// Counter-clockwise watermark rotation in degrees.
    #[arg(long, env = "PDFSTAMP_WATERMARK_ROTATION", default_value_t = 45.0, allow_negative_numbers = true)]
    pub watermark_rotation: f32,

    /// Watermark color as a hex triplet.
    #[arg(long, env = "PDFSTAMP_WATERMARK_COLOR", default_value = "#808080")]
    pub watermark_color: RgbColor,
}

impl AppConfig {
    pub fn delete_delay(&self) -> Duration {
        Duration::from_millis(self.delete_delay_ms)
    }

    /// Builds and validates the watermark settings.
    pub fn watermark_config(&self) -> Result<WatermarkConfig, String> {
        let config = WatermarkConfig {
            text: self.watermark_text.clone(),
            font_size: self.watermark_font_size,
            opacity: self.watermark_opacity,
            rotation_degrees: self.watermark_rotation,
            color: self.watermark_color,
        };
        config.validate()?;
        Ok(config)
    }
}
