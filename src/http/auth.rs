//! API token handling
//!
//! Validates the user-supplied token and attaches it to requests.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::client::{ApiRequest, TOKEN_PARAM};
use crate::error::{ProbeError, Result};

/// Where the token is placed on outgoing requests
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AuthMode {
    /// `api_token` query parameter
    Query,
    /// `Authorization: Bearer` header
    Header,
    /// Both, for plans that accept either
    #[default]
    Both,
}

impl AuthMode {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "query" => Some(AuthMode::Query),
            "header" => Some(AuthMode::Header),
            "both" => Some(AuthMode::Both),
            _ => None,
        }
    }

    /// Attach `token` to `request`
    pub fn apply(self, request: ApiRequest, token: &ApiToken) -> ApiRequest {
        match self {
            AuthMode::Query => request.query(TOKEN_PARAM, token.expose()),
            AuthMode::Header => request.header("Authorization", token.bearer()),
            AuthMode::Both => request
                .query(TOKEN_PARAM, token.expose())
                .header("Authorization", token.bearer()),
        }
    }
}

/// A validated, non-empty API token. `Debug` and `Display` never print it.
#[derive(Clone, PartialEq, Eq)]
pub struct ApiToken(String);

impl ApiToken {
    /// Reject empty, blank or whitespace/control-containing tokens
    pub fn parse(raw: &str) -> Result<Self> {
        let token = raw.trim();
        if token.is_empty() {
            return Err(ProbeError::InvalidCredential(
                "API token is empty".to_string(),
            ));
        }
        if token.chars().any(|c| c.is_whitespace() || c.is_control()) {
            return Err(ProbeError::InvalidCredential(
                "API token contains whitespace or control characters".to_string(),
            ));
        }
        Ok(Self(token.to_string()))
    }

    pub fn expose(&self) -> &str {
        &self.0
    }

    /// `Authorization` header value
    pub fn bearer(&self) -> String {
        format!("Bearer {}", self.0)
    }
}

impl fmt::Debug for ApiToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ApiToken(***)")
    }
}

impl fmt::Display for ApiToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "***")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_parse() {
        assert_eq!(ApiToken::parse("  abc123 ").unwrap().expose(), "abc123");
        assert!(matches!(
            ApiToken::parse(""),
            Err(ProbeError::InvalidCredential(_))
        ));
        assert!(matches!(
            ApiToken::parse("   \t"),
            Err(ProbeError::InvalidCredential(_))
        ));
        assert!(matches!(
            ApiToken::parse("abc def"),
            Err(ProbeError::InvalidCredential(_))
        ));
    }

    #[test]
    fn test_token_redacted() {
        let token = ApiToken::parse("secret").unwrap();
        assert_eq!(format!("{token:?}"), "ApiToken(***)");
        assert_eq!(token.to_string(), "***");
    }

    #[test]
    fn test_auth_modes() {
        let token = ApiToken::parse("secret").unwrap();

        let req = AuthMode::Query.apply(ApiRequest::get("u"), &token);
        assert_eq!(req.query, vec![(TOKEN_PARAM.to_string(), "secret".to_string())]);
        assert!(req.headers.is_empty());

        let req = AuthMode::Header.apply(ApiRequest::get("u"), &token);
        assert!(req.query.is_empty());
        assert_eq!(
            req.headers,
            vec![("Authorization".to_string(), "Bearer secret".to_string())]
        );

        let req = AuthMode::default().apply(ApiRequest::get("u"), &token);
        assert_eq!(req.query.len(), 1);
        assert_eq!(req.headers.len(), 1);
        assert_eq!(AuthMode::from_str("HEADER"), Some(AuthMode::Header));
    }
}
