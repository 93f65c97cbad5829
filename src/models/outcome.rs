//! Endpoint outcome models
//!
//! Records the result of invoking one endpoint during a run.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::endpoint::{Category, EndpointDescriptor};

/// Outcome classification
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutcomeKind {
    Success,
    HttpError,
    NetworkFailure,
}

impl OutcomeKind {
    pub fn symbol(&self) -> &'static str {
        match self {
            OutcomeKind::Success => "✓",
            OutcomeKind::HttpError => "✗",
            OutcomeKind::NetworkFailure => "!",
        }
    }
}

/// Result of invoking a single endpoint
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TestOutcome {
    pub endpoint: String,
    pub category: Category,
    /// Request URL without credentials
    pub url: String,
    /// Absent when no response was received
    pub status_code: Option<u16>,
    pub latency_ms: u64,
    pub success: bool,
    pub error: Option<String>,
    /// Items under the response's `data` key
    pub data_count: usize,
    /// Truncated response body
    pub payload: Option<String>,
}

impl TestOutcome {
    /// Outcome for a response that arrived, whatever its status
    pub fn from_status(
        endpoint: &EndpointDescriptor,
        url: impl Into<String>,
        status_code: u16,
        latency_ms: u64,
    ) -> Self {
        let success = (200..300).contains(&status_code);
        Self {
            endpoint: endpoint.name.to_string(),
            category: endpoint.category,
            url: url.into(),
            status_code: Some(status_code),
            latency_ms,
            success,
            error: if success {
                None
            } else {
                Some(http_error_message(status_code))
            },
            data_count: 0,
            payload: None,
        }
    }

    /// Outcome for a request that never produced a response
    pub fn network_failure(
        endpoint: &EndpointDescriptor,
        url: impl Into<String>,
        latency_ms: u64,
        error: impl Into<String>,
    ) -> Self {
        Self {
            endpoint: endpoint.name.to_string(),
            category: endpoint.category,
            url: url.into(),
            status_code: None,
            latency_ms,
            success: false,
            error: Some(error.into()),
            data_count: 0,
            payload: None,
        }
    }

    pub fn with_data_count(mut self, data_count: usize) -> Self {
        self.data_count = data_count;
        self
    }

    pub fn with_payload(mut self, payload: impl Into<String>) -> Self {
        self.payload = Some(payload.into());
        self
    }

    pub fn kind(&self) -> OutcomeKind {
        match (self.success, self.status_code) {
            (true, _) => OutcomeKind::Success,
            (false, Some(_)) => OutcomeKind::HttpError,
            (false, None) => OutcomeKind::NetworkFailure,
        }
    }

    /// Status code, or the error message when there is none
    pub fn status_or_error(&self) -> String {
        match self.status_code {
            Some(code) => code.to_string(),
            None => self.error.clone().unwrap_or_default(),
        }
    }
}

impl fmt::Display for TestOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} [{}ms]",
            self.kind().symbol(),
            self.endpoint,
            self.latency_ms
        )?;
        if let Some(code) = self.status_code {
            write!(f, " {code}")?;
        }
        if let Some(err) = &self.error {
            write!(f, " - {err}")?;
        }
        Ok(())
    }
}

fn http_error_message(status_code: u16) -> String {
    let reason = reqwest::StatusCode::from_u16(status_code)
        .ok()
        .and_then(|s| s.canonical_reason())
        .unwrap_or("Unknown Status");
    match status_hint(status_code) {
        Some(hint) => format!("HTTP {status_code} {reason} ({hint})"),
        None => format!("HTTP {status_code} {reason}"),
    }
}

/// Provider-specific explanation for common failure statuses
pub fn status_hint(status_code: u16) -> Option<&'static str> {
    match status_code {
        401 => Some("token rejected"),
        403 => Some("endpoint not included in subscription"),
        404 => Some("endpoint or resource not found"),
        422 => Some("invalid parameters or includes"),
        429 => Some("rate limit exceeded"),
        _ => None,
    }
}
