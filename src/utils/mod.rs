//! Shared utilities
//!
//! Logging setup and the clock abstraction.

mod clock;
pub mod logger;

#[cfg(test)]
pub use clock::ManualClock;
pub use clock::{Clock, SystemClock};
