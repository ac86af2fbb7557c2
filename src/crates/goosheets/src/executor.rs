//! Authenticated request execution with rate-limit backoff.
//!
//! Each logical call runs its own retry loop:
//!
//! ```text
//! ATTEMPTING -> SUCCESS          (2xx)
//!            -> OTHER_ERROR      (transport failure, non-429 status)
//!            -> RATE_LIMITED     (429)
//! RATE_LIMITED -> ATTEMPTING     (attempt < max_retries, after sleep)
//!              -> EXHAUSTED      (attempt == max_retries)
//! ```

use crate::auth::{bearer_token, fetch_token, TokenProvider};
use crate::error::{Result, SheetsError};
use crate::transport::{HttpRequest, HttpResponse, HttpTransport};
use rand::Rng;
use reqwest::{Method, StatusCode};
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, warn};

/// Upper bound of the exponential part of the backoff, in seconds.
pub const MAX_BACKOFF_SECS: u64 = 64;

/// Retry budget for rate-limited requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Maximum number of physical attempts while the server answers 429.
    pub max_retries: u32,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self { max_retries: 5 }
    }
}

impl RetryPolicy {
    /// Create a policy with the given budget.
    pub fn new(max_retries: u32) -> Self {
        Self { max_retries }
    }

    /// Exponential part of the backoff for a 0-indexed attempt: `min(64, 2^attempt)`.
    pub fn backoff_base(attempt: u32) -> Duration {
        let secs = if attempt >= 6 {
            MAX_BACKOFF_SECS
        } else {
            (1u64 << attempt).min(MAX_BACKOFF_SECS)
        };
        Duration::from_secs(secs)
    }

    /// Backoff for a 0-indexed attempt with up to one second of jitter.
    pub fn backoff_delay(attempt: u32) -> Duration {
        let jitter_ms: u64 = rand::thread_rng().gen_range(0..=1000);
        Self::backoff_base(attempt) + Duration::from_millis(jitter_ms)
    }
}

/// Parse a `Retry-After` header given in whole seconds.
///
/// HTTP-date values and garbage yield `None`.
pub fn parse_retry_after(value: &str) -> Option<Duration> {
    value.trim().parse::<u64>().ok().map(Duration::from_secs)
}

/// Issues authenticated requests and retries on HTTP 429.
#[derive(Clone)]
pub struct RequestExecutor {
    transport: Arc<dyn HttpTransport>,
    tokens: Arc<dyn TokenProvider>,
    policy: RetryPolicy,
}

impl RequestExecutor {
    /// Create an executor over the given transport and token source.
    pub fn new(
        transport: Arc<dyn HttpTransport>,
        tokens: Arc<dyn TokenProvider>,
        policy: RetryPolicy,
    ) -> Self {
        Self {
            transport,
            tokens,
            policy,
        }
    }

    /// The retry policy in effect.
    pub fn policy(&self) -> RetryPolicy {
        self.policy
    }

    /// Perform one logical request.
    ///
    /// Returns the first 2xx response. A 429 is retried until the budget is
    /// spent, then surfaces as [`SheetsError::RateLimitExceeded`]. Anything
    /// else fails immediately.
    pub async fn execute(
        &self,
        method: Method,
        url: &str,
        body: Option<Value>,
    ) -> Result<HttpResponse> {
        let mut attempt: u32 = 0;

        loop {
            // Tokens are fetched per attempt; long backoffs can outlive them.
            let token = fetch_token(self.tokens.as_ref()).await?;

            let mut request =
                HttpRequest::new(method.clone(), url).with_authorization(bearer_token(&token));
            if let Some(body) = &body {
                request = request.with_body(body.clone());
            }

            debug!(method = %method, url = %url, attempt = attempt, "Sending request");
            let response = self.transport.send(request).await?;

            if response.status.is_success() {
                return Ok(response);
            }

            if response.status != StatusCode::TOO_MANY_REQUESTS {
                return Err(SheetsError::ApiError {
                    status: response.status.as_u16(),
                    message: response.body,
                });
            }

            let header_wait = response.retry_after.as_deref().and_then(parse_retry_after);
            let wait = header_wait.unwrap_or_else(|| RetryPolicy::backoff_delay(attempt));

            warn!(
                url = %url,
                attempt = attempt + 1,
                max_retries = self.policy.max_retries,
                wait_secs = wait.as_secs_f64(),
                from_retry_after = header_wait.is_some(),
                "429 received"
            );

            attempt += 1;
            if attempt >= self.policy.max_retries {
                return Err(SheetsError::RateLimitExceeded {
                    retry_after: Some(wait),
                });
            }

            sleep(wait).await;
        }
    }
}
