use axum::http::{HeaderMap, header};

use crate::GatewayState;
use crate::tokens::TokenError;

/// Resolves the backend access token for an inbound request: the bearer token
/// if present, else the provider's own token, then exchanged.
pub(crate) async fn resolve_backend_token(
    state: &GatewayState,
    headers: &HeaderMap,
) -> Result<String, TokenError> {
    let oauth_token = match bearer_token(headers) {
        Some(token) => token,
        None => state.tokens.get_token().await?,
    };
    state.tokens.token_wish_cache(&oauth_token).await
}

fn bearer_token(headers: &HeaderMap) -> Option<String> {
    let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let value = value.trim();
    let prefix = "Bearer ";
    if value.len() > prefix.len() && value[..prefix.len()].eq_ignore_ascii_case(prefix) {
        let token = value[prefix.len()..].trim();
        if !token.is_empty() {
            return Some(token.to_string());
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers_with(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, HeaderValue::from_str(value).unwrap());
        headers
    }

    #[test]
    fn extracts_bearer_token() {
        assert_eq!(
            bearer_token(&headers_with("Bearer gho_abc")).as_deref(),
            Some("gho_abc")
        );
        assert_eq!(
            bearer_token(&headers_with("bearer  gho_abc ")).as_deref(),
            Some("gho_abc")
        );
    }

    #[test]
    fn missing_or_empty_bearer_is_none() {
        assert!(bearer_token(&HeaderMap::new()).is_none());
        assert!(bearer_token(&headers_with("Bearer ")).is_none());
        assert!(bearer_token(&headers_with("Basic dXNlcjpwYXNz")).is_none());
    }
}
