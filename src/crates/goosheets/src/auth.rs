//! Bearer-token providers.
//!
//! The executor asks its [`TokenProvider`] for a fresh token before every
//! physical attempt. Providers that need caching do it themselves.

use crate::error::{Result, SheetsError};
use async_trait::async_trait;

/// Something that yields a bearer token on demand.
#[async_trait]
pub trait TokenProvider: Send + Sync {
    /// Fetch an access token. An empty token is treated as an authentication failure.
    async fn access_token(&self) -> Result<String>;
}

/// Format a bearer authorization header value.
pub fn bearer_token(token: &str) -> String {
    format!("Bearer {}", token)
}

/// A provider that always returns the same token.
///
/// Useful for tokens minted elsewhere and for tests.
#[derive(Debug, Clone)]
pub struct StaticTokenProvider {
    token: String,
}

impl StaticTokenProvider {
    /// Create a provider for a pre-fetched token.
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
        }
    }
}

#[async_trait]
impl TokenProvider for StaticTokenProvider {
    async fn access_token(&self) -> Result<String> {
        Ok(self.token.clone())
    }
}

#[cfg(feature = "service-account")]
pub use service_account::ServiceAccountTokenProvider;

#[cfg(feature = "service-account")]
mod service_account {
    use super::TokenProvider;
    use crate::config::SPREADSHEETS_SCOPE;
    use crate::error::{Result, SheetsError};
    use async_trait::async_trait;
    use gcp_auth::{CustomServiceAccount, TokenProvider as _};
    use std::path::Path;

    /// Tokens minted from a service-account JSON key, scoped to spreadsheets.
    pub struct ServiceAccountTokenProvider {
        account: CustomServiceAccount,
        scopes: Vec<String>,
    }

    impl ServiceAccountTokenProvider {
        /// Load the service-account key from disk.
        pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
            let path = path.as_ref();
            let account = CustomServiceAccount::from_file(path).map_err(|e| {
                SheetsError::AuthenticationError(format!(
                    "Failed to load service account from {:?}: {}",
                    path, e
                ))
            })?;

            Ok(Self {
                account,
                scopes: vec![SPREADSHEETS_SCOPE.to_string()],
            })
        }

        /// Parse a service-account key from its JSON text.
        pub fn from_json(json: &str) -> Result<Self> {
            let account = CustomServiceAccount::from_json(json)?;
            Ok(Self {
                account,
                scopes: vec![SPREADSHEETS_SCOPE.to_string()],
            })
        }

        /// Replace the requested OAuth scopes.
        pub fn with_scopes<I, S>(mut self, scopes: I) -> Self
        where
            I: IntoIterator<Item = S>,
            S: Into<String>,
        {
            self.scopes = scopes.into_iter().map(Into::into).collect();
            self
        }
    }

    #[async_trait]
    impl TokenProvider for ServiceAccountTokenProvider {
        async fn access_token(&self) -> Result<String> {
            let scopes: Vec<&str> = self.scopes.iter().map(String::as_str).collect();
            let token = self.account.token(&scopes).await?;
            Ok(token.as_str().to_string())
        }
    }
}

/// Fetch a token and reject empty ones.
pub(crate) async fn fetch_token(provider: &dyn TokenProvider) -> Result<String> {
    let token = provider.access_token().await?;
    if token.trim().is_empty() {
        return Err(SheetsError::AuthenticationError(
            "Failed to retrieve access token".to_string(),
        ));
    }
    Ok(token)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bearer_token_formatting() {
        let header = bearer_token("ya29.a0AfH6SMB");
        assert_eq!(header, "Bearer ya29.a0AfH6SMB");
    }

    #[tokio::test]
    async fn test_static_provider() {
        let provider = StaticTokenProvider::new("abc");
        assert_eq!(provider.access_token().await.unwrap(), "abc");
    }

    #[tokio::test]
    async fn test_fetch_token_rejects_empty() {
        let provider = StaticTokenProvider::new("");
        let err = fetch_token(&provider).await.unwrap_err();
        assert!(err.is_auth_error());
    }

    #[cfg(feature = "service-account")]
    #[test]
    fn test_service_account_missing_file() {
        let err = ServiceAccountTokenProvider::from_file("/nonexistent/sa.json")
            .err()
            .unwrap();
        assert!(err.is_auth_error());
    }
}
