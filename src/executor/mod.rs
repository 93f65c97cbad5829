//! Test execution engine
//!
//! Rate-limited requests and the sequential sweep runner.

mod cancel;
#[cfg(test)]
pub(crate) mod fakes;
mod requester;
mod runner;

pub use cancel::CancelHandle;
pub use requester::RateLimitedRequester;
pub use runner::TestRunner;
