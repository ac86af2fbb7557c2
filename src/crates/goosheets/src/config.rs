//! Client configuration.
//!
//! A [`SheetsConfig`] can be built in code, read from the environment, or
//! loaded from a YAML/JSON file:
//!
//! ```rust,ignore
//! use goosheets::SheetsConfig;
//!
//! let config = SheetsConfig::new("1BxiMVs0XRA5nFMdKvBdBZjgmUUqptlbs74OgvE2upms")
//!     .with_credentials_path("service-account.json")
//!     .with_max_retries(3);
//!
//! let from_env = SheetsConfig::from_env()?;
//! let from_file = SheetsConfig::from_file("sheets.yaml")?;
//! ```

use crate::error::{Result, SheetsError};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Default Sheets v4 REST endpoint.
pub const DEFAULT_BASE_URL: &str = "https://sheets.googleapis.com/v4";

/// OAuth scope granting read/write access to spreadsheets.
pub const SPREADSHEETS_SCOPE: &str = "https://www.googleapis.com/auth/spreadsheets";

/// Environment variable holding the spreadsheet identifier.
pub const ENV_SPREADSHEET_ID: &str = "SPREADSHEET_ID";

/// Environment variable holding the service-account key path.
pub const ENV_CREDENTIALS: &str = "GOOGLE_APPLICATION_CREDENTIALS";

/// Environment variable overriding the retry budget.
pub const ENV_MAX_RETRIES: &str = "SHEETS_MAX_RETRIES";

/// Environment variable overriding the API base URL.
pub const ENV_BASE_URL: &str = "SHEETS_BASE_URL";

/// Configuration for a [`SheetClient`](crate::SheetClient).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SheetsConfig {
    /// Identifier of the spreadsheet, as found in its URL.
    pub spreadsheet_id: String,

    /// Path to the service-account JSON key.
    #[serde(default)]
    pub credentials_path: Option<PathBuf>,

    /// Base URL for the API.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Request timeout applied by the default HTTP client.
    #[serde(default = "default_timeout")]
    pub timeout: Duration,

    /// Maximum number of physical attempts while rate limited.
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
}

impl SheetsConfig {
    /// Create a configuration for the given spreadsheet with defaults.
    pub fn new(spreadsheet_id: impl Into<String>) -> Self {
        Self {
            spreadsheet_id: spreadsheet_id.into(),
            credentials_path: None,
            base_url: default_base_url(),
            timeout: default_timeout(),
            max_retries: default_max_retries(),
        }
    }

    /// Create configuration from environment variables.
    ///
    /// `SPREADSHEET_ID` is required. `GOOGLE_APPLICATION_CREDENTIALS`,
    /// `SHEETS_MAX_RETRIES` and `SHEETS_BASE_URL` are optional.
    pub fn from_env() -> Result<Self> {
        let spreadsheet_id = get_env(ENV_SPREADSHEET_ID)?;
        let mut config = Self::new(spreadsheet_id);

        if let Ok(path) = std::env::var(ENV_CREDENTIALS) {
            config = config.with_credentials_path(path);
        }

        if let Ok(value) = std::env::var(ENV_MAX_RETRIES) {
            let max_retries = value.parse::<u32>().map_err(|e| {
                SheetsError::ConfigError(format!(
                    "Failed to parse environment variable '{}': {}",
                    ENV_MAX_RETRIES, e
                ))
            })?;
            config = config.with_max_retries(max_retries);
        }

        if let Ok(base_url) = std::env::var(ENV_BASE_URL) {
            config = config.with_base_url(base_url);
        }

        Ok(config)
    }

    /// Load configuration from a YAML or JSON file (detected by extension).
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .ok_or_else(|| {
                SheetsError::ConfigError(format!(
                    "Unable to determine file extension for {:?}",
                    path
                ))
            })?;

        let content = std::fs::read_to_string(path)?;
        let config: Self = match extension.to_lowercase().as_str() {
            "yaml" | "yml" => serde_yaml::from_str(&content).map_err(|e| {
                SheetsError::ConfigError(format!(
                    "Failed to parse YAML config from {:?}: {}",
                    path, e
                ))
            })?,
            "json" => serde_json::from_str(&content).map_err(|e| {
                SheetsError::ConfigError(format!(
                    "Failed to parse JSON config from {:?}: {}",
                    path, e
                ))
            })?,
            other => {
                return Err(SheetsError::ConfigError(format!(
                    "Unsupported config file extension: {}",
                    other
                )))
            }
        };

        config.validate()?;
        Ok(config)
    }

    /// Set the service-account key path.
    pub fn with_credentials_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.credentials_path = Some(path.into());
        self
    }

    /// Set the API base URL.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Set the request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the maximum number of attempts while rate limited.
    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    /// Check that required fields are present.
    pub fn validate(&self) -> Result<()> {
        if self.spreadsheet_id.trim().is_empty() {
            return Err(SheetsError::ConfigError(
                "spreadsheet_id must not be empty".to_string(),
            ));
        }
        if self.base_url.trim().is_empty() {
            return Err(SheetsError::ConfigError(
                "base_url must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}

fn get_env(key: &str) -> Result<String> {
    std::env::var(key).map_err(|e| {
        SheetsError::ConfigError(format!("Environment variable '{}' not found: {}", key, e))
    })
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_timeout() -> Duration {
    Duration::from_secs(30)
}

fn default_max_retries() -> u32 {
    5
}
