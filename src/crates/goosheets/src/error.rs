//! Error types for spreadsheet operations.

use std::time::Duration;
use thiserror::Error;

/// Result type for spreadsheet operations.
pub type Result<T> = std::result::Result<T, SheetsError>;

/// Errors that can occur when talking to the Sheets API.
#[derive(Debug, Error)]
pub enum SheetsError {
    /// Network-level failure reported by the HTTP client.
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    /// The API answered with a non-success status other than 429.
    #[error("API error ({status}): {message}")]
    ApiError {
        /// HTTP status code.
        status: u16,
        /// Response body, as returned by the server.
        message: String,
    },

    /// No usable bearer token could be obtained.
    #[error("Authentication failed: {0}")]
    AuthenticationError(String),

    /// The server kept answering 429 until the retry budget ran out.
    #[error("Too many requests{}", format_retry_after(.retry_after))]
    RateLimitExceeded {
        /// Last wait hint seen: the `Retry-After` value, or the computed backoff.
        retry_after: Option<Duration>,
    },

    /// A requested resource (e.g. a sheet index) does not exist.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Failed to serialize/deserialize a payload.
    #[error("Serialization error: {0}")]
    SerializationError(String),

    /// Invalid or missing configuration.
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// I/O error while reading configuration.
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
}

fn format_retry_after(retry_after: &Option<Duration>) -> String {
    match retry_after {
        Some(wait) => format!(", retry after {:.3}s", wait.as_secs_f64()),
        None => String::new(),
    }
}

impl SheetsError {
    /// Check if this error is the exhausted rate-limit failure.
    pub fn is_rate_limited(&self) -> bool {
        matches!(self, SheetsError::RateLimitExceeded { .. })
    }

    /// The retry hint carried by a rate-limit failure, if any.
    pub fn retry_after(&self) -> Option<Duration> {
        match self {
            SheetsError::RateLimitExceeded { retry_after } => *retry_after,
            _ => None,
        }
    }

    /// Check if this error is due to authentication.
    pub fn is_auth_error(&self) -> bool {
        matches!(self, SheetsError::AuthenticationError(_))
    }

    /// Check if this error came from the transport or a non-success status.
    pub fn is_transport_error(&self) -> bool {
        matches!(self, SheetsError::HttpError(_) | SheetsError::ApiError { .. })
    }
}

impl From<serde_json::Error> for SheetsError {
    fn from(err: serde_json::Error) -> Self {
        SheetsError::SerializationError(err.to_string())
    }
}

#[cfg(feature = "service-account")]
impl From<gcp_auth::Error> for SheetsError {
    fn from(err: gcp_auth::Error) -> Self {
        SheetsError::AuthenticationError(err.to_string())
    }
}
