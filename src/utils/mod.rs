// Utility functions

pub mod guardrails;
pub mod retry;

pub use retry::{with_retry, with_retry_blocking, ClassifyFailure, FailureKind, RetryError, RetryPolicy};
