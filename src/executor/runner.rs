//! Test execution runner
//!
//! Sweeps the endpoint catalog as an explicit state machine
//! (`idle -> running -> completed | aborted`). Each [`TestRunner::step`]
//! performs at most one request and yields a snapshot of the run.

use chrono::Utc;
use futures::Stream;
use tokio::sync::watch;
use tracing::{error, info, warn};

use super::{CancelHandle, RateLimitedRequester};
use crate::error::{ProbeError, Result};
use crate::http::ApiToken;
use crate::models::{EndpointDescriptor, RunState, RunStatus};

/// Sequential runner for one sweep.
///
/// The runner is the only owner of the mutable [`RunState`]; observers get
/// clones through [`TestRunner::subscribe`] or from the snapshot stream.
pub struct TestRunner {
    catalog: Vec<EndpointDescriptor>,
    requester: RateLimitedRequester,
    state: RunState,
    next_index: usize,
    token: Option<ApiToken>,
    cancel: CancelHandle,
    publisher: watch::Sender<RunState>,
}

impl TestRunner {
    /// Create an idle runner over `catalog`
    pub fn new(
        catalog: Vec<EndpointDescriptor>,
        requester: RateLimitedRequester,
        run_id: impl Into<String>,
    ) -> Self {
        let state = RunState::new(run_id, catalog.len());
        let (publisher, _) = watch::channel(state.clone());
        Self {
            catalog,
            requester,
            state,
            next_index: 0,
            token: None,
            cancel: CancelHandle::new(),
            publisher,
        }
    }

    /// Use an externally owned cancellation flag
    pub fn with_cancel_handle(mut self, cancel: CancelHandle) -> Self {
        self.cancel = cancel;
        self
    }

    /// Receiver of read-only snapshots, updated on every state change
    pub fn subscribe(&self) -> watch::Receiver<RunState> {
        self.publisher.subscribe()
    }

    #[cfg(test)]
    pub fn state(&self) -> &RunState {
        &self.state
    }

    /// Validate the token and move to `running`.
    ///
    /// A rejected token moves the run straight to `aborted` with no outcomes.
    pub fn start(&mut self, token: &str) -> Result<RunState> {
        if self.state.status != RunStatus::Idle {
            return Err(ProbeError::AlreadyStarted(self.state.status));
        }

        let token = match ApiToken::parse(token) {
            Ok(token) => token,
            Err(e) => {
                warn!("Run {} rejected: {}", self.state.run_id, e);
                self.finish(RunStatus::Aborted);
                return Err(e);
            }
        };

        self.state.begin(Utc::now())?;
        self.token = Some(token);
        self.next_index = 0;
        info!(
            "Starting run {} over {} endpoints (interval {}ms)",
            self.state.run_id,
            self.state.total,
            self.requester.interval().as_millis()
        );
        self.publish();
        Ok(self.state.clone())
    }

    /// Advance the run by one transition.
    ///
    /// Returns `None` once the run is terminal (or was never started).
    pub async fn step(&mut self) -> Option<RunState> {
        if self.state.status != RunStatus::Running {
            return None;
        }
        let token = self.token.clone()?;

        let Some(descriptor) = self.catalog.get(self.next_index).copied() else {
            let summary = self.state.summary();
            info!("Run {} completed - {}", self.state.run_id, summary);
            self.finish(RunStatus::Completed);
            return Some(self.state.clone());
        };

        if self.cancel.is_cancelled() {
            info!(
                "Run {} cancelled after {}/{} endpoints",
                self.state.run_id, self.state.completed, self.state.total
            );
            self.finish(RunStatus::Aborted);
            return Some(self.state.clone());
        }

        self.state.current_endpoint = Some(descriptor.name.to_string());
        self.publish();

        let outcome = match self.requester.request(&descriptor, token.expose()).await {
            Ok(outcome) => outcome,
            Err(e) => {
                error!("Run {}: {}", self.state.run_id, e);
                self.finish(RunStatus::Aborted);
                return Some(self.state.clone());
            }
        };
        info!("  {}", outcome);

        self.state.record(outcome);
        self.next_index += 1;
        self.publish();
        Some(self.state.clone())
    }

    /// Lazy, finite stream of snapshots: one per endpoint plus the final one
    pub fn into_snapshots(self) -> impl Stream<Item = RunState> {
        futures::stream::unfold(self, |mut runner| async move {
            runner.step().await.map(|snapshot| (snapshot, runner))
        })
    }

    /// Start the run and return its snapshot stream
    pub fn run(mut self, token: &str) -> Result<impl Stream<Item = RunState>> {
        self.start(token)?;
        Ok(self.into_snapshots())
    }

    fn finish(&mut self, status: RunStatus) {
        if let Err(e) = self.state.finish(status, Utc::now()) {
            error!("Run {}: {}", self.state.run_id, e);
        }
        self.token = None;
        self.publish();
    }

    fn publish(&self) {
        self.publisher.send_replace(self.state.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::executor::fakes::{FakeTransport, Scripted};
    use crate::models::Category;
    use crate::utils::ManualClock;
    use futures::StreamExt;
    use std::sync::Arc;
    use std::time::Duration;

    const A: EndpointDescriptor = EndpointDescriptor::new("A", "a", Category::Fixtures);
    const B: EndpointDescriptor = EndpointDescriptor::new("B", "b", Category::Odds);

    fn catalog(n: usize) -> Vec<EndpointDescriptor> {
        const NAMES: [&str; 5] = ["e0", "e1", "e2", "e3", "e4"];
        NAMES[..n]
            .iter()
            .map(|&name| EndpointDescriptor::new(name, name, Category::Teams))
            .collect()
    }

    fn runner_with(
        catalog: Vec<EndpointDescriptor>,
        transport: FakeTransport,
        clock: Arc<ManualClock>,
    ) -> (TestRunner, Arc<FakeTransport>) {
        let transport = Arc::new(transport);
        let requester = RateLimitedRequester::new(transport.clone(), "https://api.test")
            .with_clock(clock)
            .min_interval(Duration::from_millis(500));
        (TestRunner::new(catalog, requester, "test-run"), transport)
    }

    async fn drain(runner: TestRunner, token: &str) -> Vec<RunState> {
        runner.run(token).unwrap().collect().await
    }

    #[tokio::test]
    async fn test_both_succeed() {
        let clock = Arc::new(ManualClock::new());
        let transport = FakeTransport::new(clock.clone())
            .respond("/a", Scripted::status(200, "{}"))
            .respond("/b", Scripted::status(200, "{}"));
        let (runner, _) = runner_with(vec![A, B], transport, clock);

        let snapshots = drain(runner, "tok").await;
        let last = snapshots.last().unwrap();

        assert_eq!(last.status, RunStatus::Completed);
        assert_eq!(last.completed, 2);
        let got: Vec<_> = last
            .outcomes
            .iter()
            .map(|o| (o.endpoint.as_str(), o.success, o.status_code))
            .collect();
        assert_eq!(got, vec![("A", true, Some(200)), ("B", true, Some(200))]);
    }

    #[tokio::test]
    async fn test_failure_does_not_abort_run() {
        let clock = Arc::new(ManualClock::new());
        let transport = FakeTransport::new(clock.clone())
            .respond("/a", Scripted::status(500, "boom"))
            .respond("/b", Scripted::status(200, "{}"));
        let (runner, _) = runner_with(vec![A, B], transport, clock);

        let last = drain(runner, "tok").await.pop().unwrap();

        assert_eq!(last.status, RunStatus::Completed);
        let got: Vec<_> = last
            .outcomes
            .iter()
            .map(|o| (o.endpoint.as_str(), o.success, o.status_code))
            .collect();
        assert_eq!(got, vec![("A", false, Some(500)), ("B", true, Some(200))]);
        assert_eq!(last.failed_count(), 1);
    }

    #[tokio::test]
    async fn test_blank_token_aborts_immediately() {
        let clock = Arc::new(ManualClock::new());
        let (mut runner, transport) =
            runner_with(vec![A, B], FakeTransport::new(clock.clone()), clock);
        let observer = runner.subscribe();

        let err = runner.start("  ").unwrap_err();

        assert!(matches!(err, ProbeError::InvalidCredential(_)));
        assert_eq!(runner.state().status, RunStatus::Aborted);
        assert!(runner.state().outcomes.is_empty());
        assert_eq!(observer.borrow().status, RunStatus::Aborted);
        assert_eq!(transport.call_count(), 0);
        assert_eq!(runner.step().await, None);
    }

    #[tokio::test]
    async fn test_run_fails_with_invalid_credential() {
        let clock = Arc::new(ManualClock::new());
        let (runner, _) = runner_with(vec![A], FakeTransport::new(clock.clone()), clock);
        let observer = runner.subscribe();

        assert!(matches!(
            runner.run(""),
            Err(ProbeError::InvalidCredential(_))
        ));
        let state = observer.borrow().clone();
        assert_eq!(state.status, RunStatus::Aborted);
        assert!(state.outcomes.is_empty());
    }

    #[tokio::test]
    async fn test_all_endpoints_complete_in_catalog_order() {
        for n in 0..=5 {
            let clock = Arc::new(ManualClock::new());
            let entries = catalog(n);
            let (runner, transport) =
                runner_with(entries.clone(), FakeTransport::new(clock.clone()), clock);

            let snapshots = drain(runner, "tok").await;
            let last = snapshots.last().unwrap();

            assert_eq!(snapshots.len(), n + 1);
            assert_eq!(last.status, RunStatus::Completed);
            assert_eq!(last.completed, n);
            let names: Vec<_> = last.outcomes.iter().map(|o| o.endpoint.clone()).collect();
            let expected: Vec<_> = entries.iter().map(|e| e.name.to_string()).collect();
            assert_eq!(names, expected);
            assert_eq!(transport.call_count(), n);
        }
    }

    #[tokio::test]
    async fn test_snapshots_keep_invariants() {
        let clock = Arc::new(ManualClock::new());
        let (runner, _) = runner_with(catalog(4), FakeTransport::new(clock.clone()), clock);

        for (i, snapshot) in drain(runner, "tok").await.iter().enumerate() {
            assert!(snapshot.completed <= snapshot.total);
            assert_eq!(snapshot.outcomes.len(), snapshot.completed);
            if i < 4 {
                assert_eq!(snapshot.status, RunStatus::Running);
                assert_eq!(snapshot.completed, i + 1);
            }
        }
    }

    #[tokio::test]
    async fn test_cancel_after_k() {
        const N: usize = 5;
        for k in 0..=N {
            let clock = Arc::new(ManualClock::new());
            let cancel = CancelHandle::new();
            let transport = FakeTransport::new(clock.clone()).cancel_after(k, cancel.clone());
            let (runner, transport) = runner_with(catalog(N), transport, clock);
            let runner = runner.with_cancel_handle(cancel.clone());
            if k == 0 {
                cancel.cancel();
            }

            let last = drain(runner, "tok").await.pop().unwrap();

            let expected = if k < N {
                RunStatus::Aborted
            } else {
                RunStatus::Completed
            };
            assert_eq!(last.status, expected, "k = {k}");
            assert_eq!(last.outcomes.len(), k, "k = {k}");
            assert_eq!(last.completed, k);
            assert_eq!(transport.call_count(), k);
        }
    }

    #[tokio::test]
    async fn test_start_twice_rejected() {
        let clock = Arc::new(ManualClock::new());
        let (mut runner, _) = runner_with(vec![A], FakeTransport::new(clock.clone()), clock);

        runner.start("tok").unwrap();
        assert_eq!(
            runner.start("tok").unwrap_err(),
            ProbeError::AlreadyStarted(RunStatus::Running)
        );
    }

    #[tokio::test]
    async fn test_step_before_start_is_none() {
        let clock = Arc::new(ManualClock::new());
        let (mut runner, transport) =
            runner_with(vec![A], FakeTransport::new(clock.clone()), clock);

        assert_eq!(runner.step().await, None);
        assert_eq!(runner.state().status, RunStatus::Idle);
        assert_eq!(transport.call_count(), 0);
    }

    #[tokio::test]
    async fn test_observer_sees_final_state() {
        let clock = Arc::new(ManualClock::new());
        let (mut runner, _) = runner_with(vec![A, B], FakeTransport::new(clock.clone()), clock);
        let observer = runner.subscribe();

        runner.start("tok").unwrap();
        assert_eq!(observer.borrow().status, RunStatus::Running);
        while runner.step().await.is_some() {}

        let seen = observer.borrow().clone();
        assert_eq!(seen, *runner.state());
        assert_eq!(seen.status, RunStatus::Completed);
        assert!(seen.finished_at.is_some());
    }

    #[tokio::test]
    async fn test_run_respects_rate_limit() {
        let clock = Arc::new(ManualClock::new());
        let transport = FakeTransport::new(clock.clone()).latency(Duration::from_millis(100));
        let (runner, transport) = runner_with(catalog(3), transport, clock.clone());

        drain(runner, "tok").await;

        let calls = transport.calls();
        for pair in calls.windows(2) {
            assert!(pair[1].issued_at - pair[0].returned_at >= Duration::from_millis(500));
        }
        assert_eq!(clock.sleeps().len(), 2);
    }
}
