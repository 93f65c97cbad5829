//! Test doubles for the executor: a scripted transport on a manual clock.

use async_trait::async_trait;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use super::CancelHandle;
use crate::http::{ApiRequest, HttpError, HttpResponse, Transport};
use crate::utils::ManualClock;

/// Scripted reply for requests whose URL ends with a given suffix
#[derive(Clone, Debug)]
pub enum Scripted {
    Reply(HttpResponse),
    Fail(HttpError),
}

impl Scripted {
    pub fn status(status_code: u16, body: &str) -> Self {
        Scripted::Reply(HttpResponse::new(status_code, body))
    }
}

#[derive(Clone, Debug)]
pub struct RecordedCall {
    pub request: ApiRequest,
    /// Clock offsets when the call was issued and when it returned
    pub issued_at: Duration,
    pub returned_at: Duration,
}

pub struct FakeTransport {
    clock: Arc<ManualClock>,
    latency: Duration,
    script: Vec<(String, Scripted)>,
    calls: Mutex<Vec<RecordedCall>>,
    cancel_after: Option<(usize, CancelHandle)>,
}

impl FakeTransport {
    /// Replies `200 {"data":[]}` to anything not scripted
    pub fn new(clock: Arc<ManualClock>) -> Self {
        Self {
            clock,
            latency: Duration::ZERO,
            script: Vec::new(),
            calls: Mutex::new(Vec::new()),
            cancel_after: None,
        }
    }

    pub fn latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    pub fn respond(mut self, url_suffix: &str, reply: Scripted) -> Self {
        self.script.push((url_suffix.to_string(), reply));
        self
    }

    /// Trip `handle` while the `calls`-th request is in flight
    pub fn cancel_after(mut self, calls: usize, handle: CancelHandle) -> Self {
        self.cancel_after = Some((calls, handle));
        self
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[async_trait]
impl Transport for FakeTransport {
    async fn get(&self, request: &ApiRequest) -> Result<HttpResponse, HttpError> {
        let issued_at = self.clock.elapsed();
        self.clock.advance(self.latency);
        let returned_at = self.clock.elapsed();

        let count = {
            let mut calls = self.calls.lock().unwrap();
            calls.push(RecordedCall {
                request: request.clone(),
                issued_at,
                returned_at,
            });
            calls.len()
        };
        if let Some((after, handle)) = &self.cancel_after {
            if count == *after {
                handle.cancel();
            }
        }

        let reply = self
            .script
            .iter()
            .find(|(suffix, _)| request.url.ends_with(suffix.as_str()))
            .map(|(_, reply)| reply.clone())
            .unwrap_or_else(|| Scripted::status(200, r#"{"data":[]}"#));

        match reply {
            Scripted::Reply(response) => Ok(response),
            Scripted::Fail(err) => Err(err),
        }
    }
}
