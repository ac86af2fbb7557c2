//! Range reads and writes against a single spreadsheet.
//!
//! # Example
//!
//! ```rust,ignore
//! use goosheets::{SheetClient, SheetsConfig};
//! use serde_json::json;
//!
//! let config = SheetsConfig::from_env()?;
//! let client = SheetClient::from_config(config)?;
//!
//! let title = client.get_first_sheet_title().await?;
//! client.write_cell(&title, "A1", json!("Hello World")).await?;
//! let rows = client.get_populated_range(&title).await?;
//! ```

use crate::auth::TokenProvider;
use crate::config::SheetsConfig;
use crate::error::{Result, SheetsError};
use crate::executor::{RequestExecutor, RetryPolicy};
use crate::transport::HttpTransport;
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use reqwest::{Client, Method};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use tracing::debug;

/// A single cell: null, string, number or boolean.
pub type CellValue = Value;

/// Cells of one row, in column order.
pub type Row = Vec<CellValue>;

/// Rows of a range, in row order.
pub type RangeResult = Vec<Row>;

/// Everything except RFC 3986 unreserved characters.
const RANGE_ENCODE_SET: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

const VALUE_INPUT_OPTION: &str = "USER_ENTERED";
const TITLE_FIELDS: &str = "sheets(properties(title))";

/// Build an A1 range reference such as `Sheet1!B2`.
pub fn a1_range(sheet: &str, address: &str) -> String {
    format!("{}!{}", sheet, address)
}

/// Whether a cell counts as populated (neither null nor an empty string).
pub fn is_populated(cell: &CellValue) -> bool {
    match cell {
        Value::Null => false,
        Value::String(s) => !s.is_empty(),
        _ => true,
    }
}

/// Keep rows with at least one populated cell, preserving order.
pub fn populated_rows(rows: RangeResult) -> RangeResult {
    rows.into_iter()
        .filter(|row| row.iter().any(is_populated))
        .collect()
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct ValueRange {
    #[serde(default)]
    values: Option<RangeResult>,
}

#[derive(Debug, Default, Deserialize)]
struct SpreadsheetMetadata {
    #[serde(default)]
    sheets: Option<Vec<Option<SheetEntry>>>,
}

#[derive(Debug, Default, Deserialize)]
struct SheetEntry {
    #[serde(default)]
    properties: Option<SheetProperties>,
}

#[derive(Debug, Default, Deserialize)]
struct SheetProperties {
    #[serde(default)]
    title: Option<String>,
}

impl SpreadsheetMetadata {
    fn from_json(value: Value) -> Result<Self> {
        if value.is_null() {
            return Ok(Self::default());
        }
        Ok(serde_json::from_value(value)?)
    }

    fn title(&self, index: usize) -> Option<&str> {
        self.sheets
            .as_ref()
            .and_then(|sheets| sheets.get(index))
            .and_then(|sheet| sheet.as_ref())
            .and_then(|sheet| sheet.properties.as_ref())
            .and_then(|props| props.title.as_deref())
    }

    fn into_titles(self) -> Vec<String> {
        self.sheets
            .unwrap_or_default()
            .into_iter()
            .flatten()
            .filter_map(|sheet| sheet.properties.and_then(|props| props.title))
            .collect()
    }
}

/// Client for one spreadsheet.
#[derive(Clone)]
pub struct SheetClient {
    spreadsheet_id: String,
    base_url: String,
    executor: RequestExecutor,
}

impl SheetClient {
    /// Create a client over an explicit transport and token provider.
    pub fn new(
        config: SheetsConfig,
        transport: Arc<dyn HttpTransport>,
        tokens: Arc<dyn TokenProvider>,
    ) -> Result<Self> {
        config.validate()?;
        let executor =
            RequestExecutor::new(transport, tokens, RetryPolicy::new(config.max_retries));

        Ok(Self {
            spreadsheet_id: config.spreadsheet_id,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            executor,
        })
    }

    /// Create a client using an injected `reqwest::Client`.
    pub fn with_http_client(
        config: SheetsConfig,
        http_client: Client,
        tokens: Arc<dyn TokenProvider>,
    ) -> Result<Self> {
        Self::new(config, Arc::new(http_client), tokens)
    }

    /// Create a client from configuration, loading the service-account key
    /// from `credentials_path`.
    #[cfg(feature = "service-account")]
    pub fn from_config(config: SheetsConfig) -> Result<Self> {
        let http_client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| SheetsError::ConfigError(e.to_string()))?;

        Self::from_config_with_client(config, http_client)
    }

    /// Like [`from_config`](Self::from_config), but sends requests through
    /// the given `reqwest::Client`.
    #[cfg(feature = "service-account")]
    pub fn from_config_with_client(config: SheetsConfig, http_client: Client) -> Result<Self> {
        use crate::auth::ServiceAccountTokenProvider;

        config.validate()?;
        let path = config.credentials_path.clone().ok_or_else(|| {
            SheetsError::ConfigError("credentials_path is required".to_string())
        })?;
        let tokens = ServiceAccountTokenProvider::from_file(path)?;

        Self::with_http_client(config, http_client, Arc::new(tokens))
    }

    /// The spreadsheet this client targets.
    pub fn spreadsheet_id(&self) -> &str {
        &self.spreadsheet_id
    }

    fn values_url(&self, range: &str) -> String {
        format!(
            "{}/spreadsheets/{}/values/{}",
            self.base_url,
            self.spreadsheet_id,
            utf8_percent_encode(range, RANGE_ENCODE_SET)
        )
    }

    fn metadata_url(&self) -> String {
        format!(
            "{}/spreadsheets/{}?fields={}",
            self.base_url,
            self.spreadsheet_id,
            utf8_percent_encode(TITLE_FIELDS, RANGE_ENCODE_SET)
        )
    }

    /// Read a range. Missing `values` yields an empty result.
    pub async fn read_range(&self, range: &str) -> Result<RangeResult> {
        let url = self.values_url(range);
        let response = self.executor.execute(Method::GET, &url, None).await?;

        let body = response.json()?;
        if body.is_null() {
            return Ok(Vec::new());
        }
        let parsed: ValueRange = serde_json::from_value(body)?;
        let values = parsed.values.unwrap_or_default();
        debug!(range = %range, rows = values.len(), "Read range");
        Ok(values)
    }

    /// Overwrite a range, letting the server parse values as if typed by a user.
    pub async fn write_range(&self, range: &str, values: RangeResult) -> Result<()> {
        let url = format!(
            "{}?valueInputOption={}",
            self.values_url(range),
            VALUE_INPUT_OPTION
        );
        let rows = values.len();
        let body = serde_json::to_value(ValueRange {
            values: Some(values),
        })?;

        self.executor.execute(Method::PUT, &url, Some(body)).await?;
        debug!(range = %range, rows = rows, "Wrote range");
        Ok(())
    }

    /// Write a single cell.
    pub async fn write_cell(&self, sheet: &str, address: &str, value: CellValue) -> Result<()> {
        self.write_range(&a1_range(sheet, address), vec![vec![value]])
            .await
    }

    /// Read a single cell; `None` when the cell is empty.
    pub async fn read_cell(&self, sheet: &str, address: &str) -> Result<Option<CellValue>> {
        let values = self.read_range(&a1_range(sheet, address)).await?;
        Ok(values
            .into_iter()
            .next()
            .and_then(|row| row.into_iter().next()))
    }

    /// Read a whole sheet, dropping rows with no populated cell.
    pub async fn get_populated_range(&self, sheet: &str) -> Result<RangeResult> {
        let values = self.read_range(sheet).await?;
        Ok(populated_rows(values))
    }

    async fn fetch_metadata(&self) -> Result<SpreadsheetMetadata> {
        let url = self.metadata_url();
        let response = self.executor.execute(Method::GET, &url, None).await?;
        SpreadsheetMetadata::from_json(response.json()?)
    }

    /// Title of the sheet at a zero-based index.
    pub async fn get_sheet_title(&self, index: usize) -> Result<String> {
        let metadata = self.fetch_metadata().await?;
        metadata
            .title(index)
            .map(str::to_string)
            .ok_or_else(|| {
                SheetsError::NotFound(format!("Sheet title not found at index {}", index))
            })
    }

    /// Title of the first sheet.
    pub async fn get_first_sheet_title(&self) -> Result<String> {
        self.get_sheet_title(0).await
    }

    /// Titles of all sheets, in order. Sheets without a title are skipped.
    pub async fn get_sheet_titles(&self) -> Result<Vec<String>> {
        let metadata = self.fetch_metadata().await?;
        Ok(metadata.into_titles())
    }
}
