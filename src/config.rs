//! Environment-driven settings.
//!
//! Everything here has a working default so `npp` runs without a `.env` file.
//! Values are read through a lookup function so tests never touch the process
//! environment.

use std::path::PathBuf;
use std::time::Duration;

use crate::error::{AppError, ErrorKind};

pub const DEFAULT_STOOQ_URL: &str = "https://stooq.com/q/d/l/";
const DEFAULT_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    /// Cached raw series and flat-file exports.
    pub data_dir: PathBuf,
    /// HTML chart output.
    pub image_dir: PathBuf,
    pub stooq_url: String,
    pub http_timeout: Duration,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data"),
            image_dir: PathBuf::from("images"),
            stooq_url: DEFAULT_STOOQ_URL.to_string(),
            http_timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

impl Settings {
    /// Load `.env` (if any) and read `NPP_*` variables.
    pub fn from_env() -> Result<Self, AppError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, AppError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut settings = Settings::default();
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        if let Some(dir) = get("NPP_DATA_DIR") {
            settings.data_dir = PathBuf::from(dir);
        }
        if let Some(dir) = get("NPP_IMAGE_DIR") {
            settings.image_dir = PathBuf::from(dir);
        }
        if let Some(url) = get("NPP_STOOQ_URL") {
            settings.stooq_url = url;
        }
        if let Some(raw) = get("NPP_HTTP_TIMEOUT_SECS") {
            let secs: u64 = raw.parse().map_err(|_| {
                AppError::new(
                    ErrorKind::InvalidParameters,
                    format!("NPP_HTTP_TIMEOUT_SECS must be a whole number of seconds, got '{raw}'."),
                )
            })?;
            if secs == 0 {
                return Err(AppError::new(
                    ErrorKind::InvalidParameters,
                    "NPP_HTTP_TIMEOUT_SECS must be > 0.",
                ));
            }
            settings.http_timeout = Duration::from_secs(secs);
        }

        Ok(settings)
    }
}
