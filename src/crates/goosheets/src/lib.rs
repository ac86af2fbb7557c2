//! Minimal Google Sheets client.
//!
//! Reads and writes cell ranges through the Sheets v4 REST API, authenticating
//! with a service-account key and backing off when the API answers
//! `429 Too Many Requests`.
//!
//! # Layers
//!
//! - [`RequestExecutor`] attaches a fresh bearer token to every attempt and
//!   retries rate-limited calls with capped exponential backoff plus jitter,
//!   honouring `Retry-After` when the server sends it.
//! - [`SheetClient`] maps range reads/writes and a few helpers (single cells,
//!   sheet titles, populated rows) onto the REST endpoints.
//!
//! Both external collaborators sit behind traits: [`TokenProvider`] for
//! credentials and [`HttpTransport`] for the wire, with `reqwest::Client` as
//! the default transport.
//!
//! # Example
//!
//! ```rust,ignore
//! use goosheets::{SheetClient, SheetsConfig, SheetsError};
//! use serde_json::json;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = SheetsConfig::new("YOUR_SPREADSHEET_ID")
//!         .with_credentials_path("service-account.json");
//!     let client = SheetClient::from_config(config)?;
//!
//!     match client.get_first_sheet_title().await {
//!         Ok(title) => {
//!             let cell = client.read_cell(&title, "A1").await?;
//!             println!("A1 = {:?}", cell);
//!
//!             client.write_cell(&title, "A1", json!("Hello World")).await?;
//!             println!("{:?}", client.get_populated_range(&title).await?);
//!         }
//!         Err(SheetsError::RateLimitExceeded { retry_after }) => {
//!             eprintln!("Too many requests. Retry after {:?}", retry_after);
//!         }
//!         Err(e) => return Err(e.into()),
//!     }
//!
//!     Ok(())
//! }
//! ```
//!
//! # Features
//!
//! - `service-account` - Load credentials from a service-account JSON key via
//!   `gcp_auth` (enabled by default)

pub mod auth;
pub mod config;
pub mod error;
pub mod executor;
pub mod sheets;
pub mod transport;

// Re-export commonly used types
pub use auth::{bearer_token, StaticTokenProvider, TokenProvider};
#[cfg(feature = "service-account")]
pub use auth::ServiceAccountTokenProvider;
pub use config::SheetsConfig;
pub use error::{Result, SheetsError};
pub use executor::{RequestExecutor, RetryPolicy};
pub use sheets::{a1_range, CellValue, RangeResult, Row, SheetClient};
pub use transport::{HttpRequest, HttpResponse, HttpTransport};
