//! HTTP client module
//!
//! Provides the transport used to reach the SportMonks API and token handling.

mod auth;
mod client;

pub use auth::{ApiToken, AuthMode};
pub use client::{ApiRequest, HttpClient, Transport};
#[cfg(test)]
pub use client::{HttpError, HttpResponse, TOKEN_PARAM};
