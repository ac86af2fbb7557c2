//! HTTP transport seam.
//!
//! [`HttpTransport`] performs exactly one physical exchange and reports the
//! status, `Retry-After` header and body. Status classification and retries
//! belong to the executor. `reqwest::Client` is the default implementation.

use crate::error::Result;
use async_trait::async_trait;
use reqwest::header::{AUTHORIZATION, RETRY_AFTER};
use reqwest::{Client, Method, StatusCode};
use serde_json::Value;

/// An outbound request.
#[derive(Debug, Clone)]
pub struct HttpRequest {
    /// HTTP method.
    pub method: Method,
    /// Absolute target URL.
    pub url: String,
    /// Value for the `Authorization` header.
    pub authorization: Option<String>,
    /// JSON body, if any.
    pub body: Option<Value>,
}

impl HttpRequest {
    /// Create a request without body or credentials.
    pub fn new(method: Method, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            authorization: None,
            body: None,
        }
    }

    /// Attach a JSON body.
    pub fn with_body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    /// Attach an `Authorization` header value.
    pub fn with_authorization(mut self, value: impl Into<String>) -> Self {
        self.authorization = Some(value.into());
        self
    }
}

/// A response as seen by the executor.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    /// Status code.
    pub status: StatusCode,
    /// Raw `Retry-After` header, when the server sent one.
    pub retry_after: Option<String>,
    /// Response body text.
    pub body: String,
}

impl HttpResponse {
    /// Create a response with the given status and body.
    pub fn new(status: StatusCode, body: impl Into<String>) -> Self {
        Self {
            status,
            retry_after: None,
            body: body.into(),
        }
    }

    /// Set the `Retry-After` header.
    pub fn with_retry_after(mut self, value: impl Into<String>) -> Self {
        self.retry_after = Some(value.into());
        self
    }

    /// Parse the body as JSON. An empty body yields `Value::Null`.
    pub fn json(&self) -> Result<Value> {
        if self.body.trim().is_empty() {
            return Ok(Value::Null);
        }
        Ok(serde_json::from_str(&self.body)?)
    }
}

/// Performs a single HTTP exchange.
#[async_trait]
pub trait HttpTransport: Send + Sync {
    /// Send the request. Non-success statuses are returned, not raised.
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse>;
}

#[async_trait]
impl HttpTransport for Client {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse> {
        let mut builder = self.request(request.method, &request.url);

        if let Some(authorization) = &request.authorization {
            builder = builder.header(AUTHORIZATION, authorization);
        }

        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let response = builder.send().await?;
        let status = response.status();
        let retry_after = response
            .headers()
            .get(RETRY_AFTER)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let body = response.text().await?;

        Ok(HttpResponse {
            status,
            retry_after,
            body,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_request_builder() {
        let request = HttpRequest::new(Method::PUT, "https://example.com/values/A1")
            .with_authorization("Bearer t")
            .with_body(json!({"values": [[1]]}));

        assert_eq!(request.method, Method::PUT);
        assert_eq!(request.authorization.as_deref(), Some("Bearer t"));
        assert_eq!(request.body, Some(json!({"values": [[1]]})));
    }

    #[test]
    fn test_response_json_empty_body() {
        let response = HttpResponse::new(StatusCode::OK, "");
        assert_eq!(response.json().unwrap(), Value::Null);
    }

    #[test]
    fn test_response_json_invalid_body() {
        let response = HttpResponse::new(StatusCode::OK, "<html>");
        assert!(response.json().is_err());
    }

    #[tokio::test]
    async fn test_reqwest_transport_invalid_url() {
        let client = Client::new();
        let result = client.send(HttpRequest::new(Method::GET, "not-a-valid-url")).await;
        assert!(result.unwrap_err().is_transport_error());
    }
}
