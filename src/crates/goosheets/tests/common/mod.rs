//! Shared test doubles for goosheets integration tests.

#![allow(dead_code)]

use async_trait::async_trait;
use goosheets::{
    HttpRequest, HttpResponse, HttpTransport, RangeResult, Result, SheetClient, SheetsConfig,
    SheetsError, TokenProvider,
};
use percent_encoding::percent_decode_str;
use reqwest::{Method, StatusCode};
use serde_json::{json, Value};
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

pub const BASE_URL: &str = "https://sheets.test/v4";
pub const SPREADSHEET_ID: &str = "spreadsheet-1";

/// Replays canned responses in order and records every request.
#[derive(Default)]
pub struct ScriptedTransport {
    responses: Mutex<VecDeque<Result<HttpResponse>>>,
    requests: Mutex<Vec<HttpRequest>>,
}

impl ScriptedTransport {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn push(&self, response: HttpResponse) {
        self.responses.lock().unwrap().push_back(Ok(response));
    }

    pub fn push_error(&self, error: SheetsError) {
        self.responses.lock().unwrap().push_back(Err(error));
    }

    pub fn push_json(&self, body: Value) {
        self.push(HttpResponse::new(StatusCode::OK, body.to_string()));
    }

    pub fn push_rate_limited(&self, times: usize) {
        for _ in 0..times {
            self.push(HttpResponse::new(StatusCode::TOO_MANY_REQUESTS, ""));
        }
    }

    pub fn requests(&self) -> Vec<HttpRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn request_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

#[async_trait]
impl HttpTransport for ScriptedTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse> {
        self.requests.lock().unwrap().push(request);
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| {
                Ok(HttpResponse::new(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "script exhausted",
                ))
            })
    }
}

/// Keeps written ranges in memory and serves them back on read.
#[derive(Default)]
pub struct InMemorySheets {
    ranges: Mutex<HashMap<String, RangeResult>>,
}

impl InMemorySheets {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    fn range_from_url(url: &str) -> Option<String> {
        let (_, encoded) = url.split_once("/values/")?;
        let encoded = encoded.split('?').next()?;
        Some(percent_decode_str(encoded).decode_utf8().ok()?.into_owned())
    }
}

#[async_trait]
impl HttpTransport for InMemorySheets {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse> {
        let Some(range) = Self::range_from_url(&request.url) else {
            return Ok(HttpResponse::new(StatusCode::NOT_FOUND, "unknown endpoint"));
        };

        let mut ranges = self.ranges.lock().unwrap();
        if request.method == Method::PUT {
            let values: RangeResult = request
                .body
                .as_ref()
                .and_then(|body| body.get("values").cloned())
                .map(serde_json::from_value)
                .transpose()?
                .unwrap_or_default();
            ranges.insert(range, values);
            Ok(HttpResponse::new(StatusCode::OK, "{}"))
        } else {
            let body = match ranges.get(&range) {
                Some(values) => json!({ "range": range, "values": values }),
                None => json!({ "range": range }),
            };
            Ok(HttpResponse::new(StatusCode::OK, body.to_string()))
        }
    }
}

/// Hands out numbered tokens and counts how often it was asked.
#[derive(Default)]
pub struct CountingTokens {
    calls: AtomicUsize,
}

impl CountingTokens {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TokenProvider for CountingTokens {
    async fn access_token(&self) -> Result<String> {
        let n = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        Ok(format!("token-{}", n))
    }
}

/// Always fails, as a credential source with a broken key would.
pub struct FailingTokens;

#[async_trait]
impl TokenProvider for FailingTokens {
    async fn access_token(&self) -> Result<String> {
        Err(SheetsError::AuthenticationError("invalid_grant".to_string()))
    }
}

pub fn test_config() -> SheetsConfig {
    SheetsConfig::new(SPREADSHEET_ID).with_base_url(BASE_URL)
}

pub fn client_with(
    transport: Arc<dyn HttpTransport>,
    tokens: Arc<dyn TokenProvider>,
) -> SheetClient {
    SheetClient::new(test_config(), transport, tokens).unwrap()
}
