//! HTTP client for SportMonks API requests
//!
//! Wraps reqwest behind the [`Transport`] trait so the requester can be
//! driven by a scripted transport in tests.

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::{
    header::{HeaderMap, HeaderName, HeaderValue},
    Client,
};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

/// Query parameter that carries the API token
pub const TOKEN_PARAM: &str = "api_token";

/// HTTP client errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum HttpError {
    #[error("Request failed: {0}")]
    RequestFailed(String),

    #[error("Timeout after {0} seconds")]
    Timeout(u64),

    #[error("Connection refused to {0}")]
    ConnectionRefused(String),

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
}

/// Sends GET requests and returns whatever response arrives.
///
/// Implementations only fail when no response was received; non-2xx
/// statuses are returned as responses.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn get(&self, request: &ApiRequest) -> std::result::Result<HttpResponse, HttpError>;
}

/// HTTP client backed by reqwest
#[derive(Clone)]
pub struct HttpClient {
    client: Client,
    default_headers: HeaderMap,
    timeout_secs: u64,
}

impl HttpClient {
    /// Create client with custom timeout
    pub fn with_timeout(timeout_secs: u64, user_agent: &str) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .user_agent(user_agent)
            .build()
            .context("Failed to create HTTP client")?;

        let mut default_headers = HeaderMap::new();
        default_headers.insert(
            reqwest::header::ACCEPT,
            HeaderValue::from_static("application/json"),
        );

        Ok(Self {
            client,
            default_headers,
            timeout_secs,
        })
    }

    pub fn timeout_secs(&self) -> u64 {
        self.timeout_secs
    }

    /// Map a reqwest error onto [`HttpError`]. The request URL carries the
    /// token, so it is stripped before the error is rendered.
    fn classify(&self, err: reqwest::Error, url: &str) -> HttpError {
        if err.is_timeout() {
            HttpError::Timeout(self.timeout_secs)
        } else if err.is_connect() {
            HttpError::ConnectionRefused(url.to_string())
        } else if err.is_builder() {
            HttpError::InvalidUrl(url.to_string())
        } else {
            HttpError::RequestFailed(err.without_url().to_string())
        }
    }
}

#[async_trait]
impl Transport for HttpClient {
    async fn get(&self, request: &ApiRequest) -> std::result::Result<HttpResponse, HttpError> {
        let display_url = request.display_url();
        debug!("Sending GET request to {}", display_url);

        let mut req_builder = self
            .client
            .get(&request.url)
            .headers(self.default_headers.clone())
            .query(&request.query);

        for (key, value) in &request.headers {
            let name = HeaderName::from_bytes(key.as_bytes())
                .map_err(|e| HttpError::RequestFailed(format!("Invalid header name: {e}")))?;
            let value = HeaderValue::from_str(value)
                .map_err(|e| HttpError::RequestFailed(format!("Invalid header value: {e}")))?;
            req_builder = req_builder.header(name, value);
        }

        let response = req_builder
            .send()
            .await
            .map_err(|e| self.classify(e, &display_url))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| self.classify(e, &display_url))?;

        debug!(
            "Response: {} {}",
            status.as_u16(),
            status.canonical_reason().unwrap_or("")
        );

        Ok(HttpResponse::new(status.as_u16(), body))
    }
}

/// GET request description
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ApiRequest {
    pub url: String,
    pub query: Vec<(String, String)>,
    pub headers: Vec<(String, String)>,
}

impl ApiRequest {
    pub fn get(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            query: Vec::new(),
            headers: Vec::new(),
        }
    }

    pub fn query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((key.into(), value.into()));
        self
    }

    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((key.into(), value.into()));
        self
    }

    /// URL with query string, leaving out the token parameter
    pub fn display_url(&self) -> String {
        let visible: Vec<String> = self
            .query
            .iter()
            .filter(|(k, _)| k != TOKEN_PARAM)
            .map(|(k, v)| format!("{k}={v}"))
            .collect();
        if visible.is_empty() {
            self.url.clone()
        } else {
            format!("{}?{}", self.url, visible.join("&"))
        }
    }
}

/// HTTP response
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct HttpResponse {
    pub status_code: u16,
    pub body: String,
}

impl HttpResponse {
    pub fn new(status_code: u16, body: impl Into<String>) -> Self {
        Self {
            status_code,
            body: body.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status_code)
    }

    /// Number of items under the top-level `data` key: array length,
    /// 1 for an object, 0 otherwise or when the body is not JSON
    pub fn data_count(&self) -> usize {
        match serde_json::from_str::<serde_json::Value>(&self.body) {
            Ok(serde_json::Value::Object(map)) => match map.get("data") {
                Some(serde_json::Value::Array(items)) => items.len(),
                Some(serde_json::Value::Object(_)) => 1,
                _ => 0,
            },
            _ => 0,
        }
    }

    /// Body cut to at most `max_chars` characters
    pub fn preview(&self, max_chars: usize) -> String {
        match self.body.char_indices().nth(max_chars) {
            Some((idx, _)) => format!("{}…", &self.body[..idx]),
            None => self.body.clone(),
        }
    }
}
