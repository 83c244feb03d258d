use async_trait::async_trait;

#[derive(Debug, Clone, thiserror::Error)]
#[error("{message}")]
pub struct TokenError {
    message: String,
}

impl TokenError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Source of credentials for backend calls.
#[async_trait]
pub trait TokenProvider: Send + Sync {
    /// Obtains an OAuth token when the inbound request carried none.
    async fn get_token(&self) -> Result<String, TokenError>;

    /// Exchanges an OAuth token for a backend access token, reusing a cached
    /// one when it is still valid.
    async fn token_wish_cache(&self, oauth_token: &str) -> Result<String, TokenError>;
}

/// Uses a configured token as-is and forwards inbound tokens unchanged.
#[derive(Debug, Clone, Default)]
pub struct PassthroughTokens {
    token: Option<String>,
}

impl PassthroughTokens {
    pub fn new(token: Option<String>) -> Self {
        Self { token }
    }
}

#[async_trait]
impl TokenProvider for PassthroughTokens {
    async fn get_token(&self) -> Result<String, TokenError> {
        self.token
            .clone()
            .ok_or_else(|| TokenError::new("no token configured and no bearer token supplied"))
    }

    async fn token_wish_cache(&self, oauth_token: &str) -> Result<String, TokenError> {
        Ok(oauth_token.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn passthrough_without_token_fails_get_token() {
        let tokens = PassthroughTokens::default();
        let err = tokens.get_token().await.unwrap_err();
        assert!(err.to_string().contains("no token configured"));
        assert_eq!(tokens.token_wish_cache("abc").await.unwrap(), "abc");
    }

    #[tokio::test]
    async fn passthrough_returns_configured_token() {
        let tokens = PassthroughTokens::new(Some("gho_123".to_string()));
        assert_eq!(tokens.get_token().await.unwrap(), "gho_123");
    }
}
