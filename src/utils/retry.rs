//! Bounded exponential-backoff retry for fallible network operations.
//!
//! Every external API call in the agents goes through [`with_retry`] (or its
//! blocking twin). Failures are classified via [`ClassifyFailure`]; a policy
//! may restrict retries to an allow-list of [`FailureKind`]s so that
//! non-transient failures (bad request, auth) fail fast instead of burning
//! the retry budget.

use rand::Rng;
use std::fmt::Display;
use std::future::Future;
use std::time::Duration;
use thiserror::Error;
use tracing::{error, warn};

/// Coarse failure categories used by retry allow-lists.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    Timeout,
    Connection,
    RateLimited,
    Http,
    Parse,
    Auth,
    Other,
}

/// Implemented by error types that can be handed to the retry executor.
pub trait ClassifyFailure {
    fn kind(&self) -> FailureKind;
}

/// Retry policy: attempt bound, backoff shape, and which failures qualify.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub base_delay: Duration,
    pub max_delay: Duration,
    pub factor: f64,
    pub jitter: bool,
    /// When set, only failures of these kinds are retried; everything else
    /// aborts immediately.
    pub retry_on: Option<Vec<FailureKind>>,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            base_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(60),
            factor: 2.0,
            jitter: true,
            retry_on: None,
        }
    }
}

impl RetryPolicy {
    pub fn new(max_retries: u32) -> Self {
        Self {
            max_retries,
            ..Self::default()
        }
    }

    pub fn base_delay(mut self, delay: Duration) -> Self {
        self.base_delay = delay;
        self
    }

    pub fn max_delay(mut self, delay: Duration) -> Self {
        self.max_delay = delay;
        self
    }

    pub fn jitter(mut self, enabled: bool) -> Self {
        self.jitter = enabled;
        self
    }

    pub fn retry_on(mut self, kinds: Vec<FailureKind>) -> Self {
        self.retry_on = Some(kinds);
        self
    }

    /// Delay before the retry following failed attempt number `attempt`
    /// (zero-based): `min(base * factor^attempt, max)`, optionally scaled by
    /// a uniform factor in [0.5, 1.0] to avoid synchronized retries.
    fn delay_for_attempt(&self, attempt: u32) -> Duration {
        let raw = self.base_delay.as_secs_f64() * self.factor.powi(attempt as i32);
        let mut secs = raw.min(self.max_delay.as_secs_f64());
        if self.jitter {
            secs *= 0.5 + rand::thread_rng().gen::<f64>() * 0.5;
        }
        Duration::from_secs_f64(secs)
    }

    fn is_retryable(&self, kind: FailureKind) -> bool {
        match &self.retry_on {
            Some(kinds) => kinds.contains(&kind),
            None => true,
        }
    }
}

/// Terminal outcome of a retried operation that never succeeded.
#[derive(Debug, Error)]
pub enum RetryError<E: Display + std::fmt::Debug> {
    /// The budget ran out. `attempts` counts every invocation, including the
    /// initial one.
    #[error("all {attempts} attempts failed, last error: {last}")]
    Exhausted { last: E, attempts: u32 },

    /// The failure's category was outside the policy's allow-list; the work
    /// was invoked exactly once.
    #[error("non-retryable failure: {0}")]
    Aborted(E),
}

impl<E: Display + std::fmt::Debug> RetryError<E> {
    pub fn last_error(&self) -> &E {
        match self {
            RetryError::Exhausted { last, .. } => last,
            RetryError::Aborted(e) => e,
        }
    }
}

/// Run `work` under `policy`, suspending between attempts.
///
/// The backoff sleep is a real suspension point (`tokio::time::sleep`), so
/// sibling tasks keep running while this one waits.
pub async fn with_retry<T, E, F, Fut>(policy: &RetryPolicy, mut work: F) -> Result<T, RetryError<E>>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: ClassifyFailure + Display + std::fmt::Debug,
{
    let mut attempt = 0;
    loop {
        match work().await {
            Ok(value) => return Ok(value),
            Err(e) => {
                let delay = next_delay(policy, attempt, e)?;
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
        }
    }
}

/// Blocking variant of [`with_retry`] with identical retry/backoff semantics;
/// the delay is a thread sleep.
pub fn with_retry_blocking<T, E, F>(policy: &RetryPolicy, mut work: F) -> Result<T, RetryError<E>>
where
    F: FnMut() -> Result<T, E>,
    E: ClassifyFailure + Display + std::fmt::Debug,
{
    let mut attempt = 0;
    loop {
        match work() {
            Ok(value) => return Ok(value),
            Err(e) => {
                let delay = next_delay(policy, attempt, e)?;
                std::thread::sleep(delay);
                attempt += 1;
            }
        }
    }
}

/// Shared decision step: classify the failure, log it, and either produce the
/// next backoff delay or a terminal [`RetryError`].
fn next_delay<E>(policy: &RetryPolicy, attempt: u32, e: E) -> Result<Duration, RetryError<E>>
where
    E: ClassifyFailure + Display + std::fmt::Debug,
{
    if !policy.is_retryable(e.kind()) {
        warn!(kind = ?e.kind(), error = %e, "not retrying non-retryable failure");
        return Err(RetryError::Aborted(e));
    }

    if attempt >= policy.max_retries {
        error!(error = %e, "all retry attempts exhausted");
        return Err(RetryError::Exhausted {
            last: e,
            attempts: attempt + 1,
        });
    }

    let delay = policy.delay_for_attempt(attempt);
    warn!(
        attempt = attempt + 1,
        max_attempts = policy.max_retries + 1,
        delay_ms = delay.as_millis() as u64,
        error = %e,
        "attempt failed, retrying after backoff"
    );
    Ok(delay)
}
