//! Transport retry and backoff policy.
//!
//! Classifies transport failures (timeouts, throttling, connection errors) and
//! decides whether one candidate is worth another attempt before the
//! orchestrator gives up on it and moves to the next source.

mod classify;
mod error;
mod policy;
mod run;

pub use classify::{classify, classify_curl_error, classify_http_status};
pub use error::TransferError;
pub use policy::{ErrorKind, RetryDecision, RetryPolicy};
pub use run::run_with_retry;
