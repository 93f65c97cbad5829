//! Rate-limited requester
//!
//! Issues one GET per endpoint, spacing consecutive calls by a minimum
//! interval, and turns every response or failure into a [`TestOutcome`].

use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, error, warn};

use crate::config::AppConfig;
use crate::error::Result;
use crate::http::{ApiRequest, ApiToken, AuthMode, Transport};
use crate::models::{status_hint, EndpointDescriptor, TemplateContext, TestOutcome};
use crate::utils::{Clock, SystemClock};

/// Default spacing between requests: 3000 requests per hour
pub const DEFAULT_INTERVAL: Duration = Duration::from_millis(1200);

/// Default length of stored response previews
pub const DEFAULT_PREVIEW_CHARS: usize = 300;

/// Sends endpoint requests one at a time under a client-side rate limit
pub struct RateLimitedRequester {
    transport: Arc<dyn Transport>,
    clock: Arc<dyn Clock>,
    base_url: String,
    min_interval: Duration,
    auth: AuthMode,
    context: TemplateContext,
    preview_chars: usize,
    last_returned: Option<Instant>,
}

impl RateLimitedRequester {
    /// Create a requester with default interval, auth mode and system clock
    pub fn new(transport: Arc<dyn Transport>, base_url: impl Into<String>) -> Self {
        Self {
            transport,
            clock: Arc::new(SystemClock),
            base_url: base_url.into(),
            min_interval: DEFAULT_INTERVAL,
            auth: AuthMode::default(),
            context: TemplateContext::today(),
            preview_chars: DEFAULT_PREVIEW_CHARS,
            last_returned: None,
        }
    }

    /// Create a requester from application settings
    pub fn from_config(transport: Arc<dyn Transport>, config: &AppConfig) -> Self {
        Self::new(transport, config.base_url.clone())
            .min_interval(Duration::from_millis(config.rate_limit_interval_ms))
            .auth_mode(config.auth)
            .preview_chars(config.payload_preview_chars)
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn min_interval(mut self, interval: Duration) -> Self {
        self.min_interval = interval;
        self
    }

    pub fn auth_mode(mut self, auth: AuthMode) -> Self {
        self.auth = auth;
        self
    }

    pub fn context(mut self, context: TemplateContext) -> Self {
        self.context = context;
        self
    }

    pub fn preview_chars(mut self, chars: usize) -> Self {
        self.preview_chars = chars;
        self
    }

    pub fn interval(&self) -> Duration {
        self.min_interval
    }

    /// Request `descriptor` with a raw token.
    ///
    /// Fails only with `InvalidCredential`, before any wait or network call.
    pub async fn request(
        &mut self,
        descriptor: &EndpointDescriptor,
        token: &str,
    ) -> Result<TestOutcome> {
        let token = ApiToken::parse(token)?;
        Ok(self.request_with(descriptor, &token).await)
    }

    async fn request_with(
        &mut self,
        descriptor: &EndpointDescriptor,
        token: &ApiToken,
    ) -> TestOutcome {
        let request = match self.build_request(descriptor, token) {
            Ok(request) => request,
            Err(e) => {
                error!("Cannot build request for {}: {}", descriptor.name, e);
                return TestOutcome::network_failure(descriptor, descriptor.path, 0, e.to_string());
            }
        };
        let display_url = request.display_url();

        self.wait_for_slot().await;

        debug!("GET {}", display_url);
        let start = self.clock.now();
        let result = self.transport.get(&request).await;
        let finished = self.clock.now();
        self.last_returned = Some(finished);
        let latency_ms = finished.saturating_duration_since(start).as_millis() as u64;

        match result {
            Ok(response) => {
                let outcome = TestOutcome::from_status(
                    descriptor,
                    &display_url,
                    response.status_code,
                    latency_ms,
                );
                if response.is_success() {
                    debug!(
                        "{} -> {} ({} items, {}ms)",
                        descriptor.name,
                        response.status_code,
                        response.data_count(),
                        latency_ms
                    );
                    outcome
                        .with_data_count(response.data_count())
                        .with_payload(response.preview(self.preview_chars))
                } else {
                    warn!(
                        "{} -> HTTP {}{}",
                        descriptor.name,
                        response.status_code,
                        status_hint(response.status_code)
                            .map(|h| format!(" ({h})"))
                            .unwrap_or_default()
                    );
                    outcome.with_payload(response.preview(self.preview_chars))
                }
            }
            Err(e) => {
                error!("{} request failed: {}", descriptor.name, e);
                TestOutcome::network_failure(descriptor, &display_url, latency_ms, e.to_string())
            }
        }
    }

    fn build_request(
        &self,
        descriptor: &EndpointDescriptor,
        token: &ApiToken,
    ) -> Result<ApiRequest> {
        let path = descriptor.render_path(&self.context)?;
        let url = format!("{}/{}", self.base_url.trim_end_matches('/'), path);

        let request = descriptor
            .params
            .iter()
            .fold(ApiRequest::get(url), |req, (k, v)| req.query(*k, *v));

        Ok(self.auth.apply(request, token))
    }

    /// Suspend until `min_interval` has passed since the previous call returned
    async fn wait_for_slot(&self) {
        let Some(last) = self.last_returned else {
            return;
        };
        let elapsed = self.clock.now().saturating_duration_since(last);
        if elapsed < self.min_interval {
            let wait = self.min_interval - elapsed;
            debug!("Rate limit: waiting {}ms", wait.as_millis());
            self.clock.sleep(wait).await;
        }
    }
}
