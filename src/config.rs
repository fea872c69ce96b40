//! Global configuration parsing and validation.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::{AppError, Result};

/// Overdue sweep settings.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub struct OverdueConfig {
    /// Whether the sweep runs at all.
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Seconds between sweep ticks.
    #[serde(default = "default_sweep_interval")]
    pub sweep_interval_seconds: u64,
}

impl Default for OverdueConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            sweep_interval_seconds: default_sweep_interval(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_sweep_interval() -> u64 {
    300
}

fn default_http_port() -> u16 {
    8080
}

fn default_db_path() -> PathBuf {
    PathBuf::from("data/internhub.db")
}

fn default_blob_root() -> PathBuf {
    PathBuf::from("data/blobs")
}

fn default_chat_poll_seconds() -> u64 {
    5
}

/// Global configuration parsed from `config.toml`.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub struct GlobalConfig {
    /// HTTP port the API binds on.
    #[serde(default = "default_http_port")]
    pub http_port: u16,
    /// `SQLite` database file path.
    #[serde(default = "default_db_path")]
    pub db_path: PathBuf,
    /// Root directory for stored attachment blobs.
    #[serde(default = "default_blob_root")]
    pub blob_root: PathBuf,
    /// Interval clients are told to re-fetch conversations at.
    #[serde(default = "default_chat_poll_seconds")]
    pub chat_poll_seconds: u64,
    /// Overdue sweep settings.
    #[serde(default)]
    pub overdue: OverdueConfig,
}

impl GlobalConfig {
    /// Load and validate configuration from a TOML file path.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if the file cannot be read or contains
    /// invalid TOML, or if validation fails.
    pub fn load_from_path(path: impl AsRef<Path>) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .map_err(|err| AppError::Config(format!("failed to read config: {err}")))?;
        Self::from_toml_str(&raw)
    }

    /// Parse configuration from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if parsing or validation fails.
    pub fn from_toml_str(raw: &str) -> Result<Self> {
        let config: Self = toml::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.chat_poll_seconds == 0 {
            return Err(AppError::Config(
                "chat_poll_seconds must be greater than zero".into(),
            ));
        }
        if self.overdue.sweep_interval_seconds == 0 {
            return Err(AppError::Config(
                "overdue.sweep_interval_seconds must be greater than zero".into(),
            ));
        }
        if self.db_path.as_os_str().is_empty() {
            return Err(AppError::Config("db_path must not be empty".into()));
        }
        if self.blob_root.as_os_str().is_empty() {
            return Err(AppError::Config("blob_root must not be empty".into()));
        }
        Ok(())
    }
}
