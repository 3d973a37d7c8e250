//! Retry policy for remote API calls.
//!
//! The remote API occasionally answers with transient server errors. Calls go
//! through [`with_retry`], which re-runs the operation while the error is
//! classified as retryable and the policy still has attempts left.

use std::future::Future;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;

use backon::{ExponentialBuilder, Retryable};

/// Total attempts (first call included) made by the default policy.
pub const DEFAULT_MAX_ATTEMPTS: usize = 2;

/// HTTP statuses retried by the default policy.
pub const DEFAULT_RETRYABLE_STATUSES: &[u16] = &[500];

/// Initial delay between attempts in milliseconds.
pub const DEFAULT_MIN_DELAY_MS: u64 = 250;

/// Upper bound on the delay between attempts in milliseconds.
pub const DEFAULT_MAX_DELAY_MS: u64 = 4_000;

/// When and how often a failed call is repeated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total number of attempts, including the first one. `0` and `1` both mean
    /// "never retry".
    pub max_attempts: usize,
    /// HTTP statuses that count as transient.
    pub retryable_statuses: Vec<u16>,
    /// Delay before the first retry.
    pub min_delay: Duration,
    /// Delay cap for later retries.
    pub max_delay: Duration,
    /// Whether to add jitter to delays.
    pub with_jitter: bool,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            retryable_statuses: DEFAULT_RETRYABLE_STATUSES.to_vec(),
            min_delay: Duration::from_millis(DEFAULT_MIN_DELAY_MS),
            max_delay: Duration::from_millis(DEFAULT_MAX_DELAY_MS),
            with_jitter: false,
        }
    }
}

impl RetryPolicy {
    /// A policy that makes exactly one attempt.
    #[must_use]
    pub fn never() -> Self {
        Self {
            max_attempts: 1,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_max_attempts(mut self, max_attempts: usize) -> Self {
        self.max_attempts = max_attempts;
        self
    }

    #[must_use]
    pub fn with_retryable_statuses(mut self, statuses: impl Into<Vec<u16>>) -> Self {
        self.retryable_statuses = statuses.into();
        self
    }

    #[must_use]
    pub fn with_delays(mut self, min_delay: Duration, max_delay: Duration) -> Self {
        self.min_delay = min_delay;
        self.max_delay = max_delay.max(min_delay);
        self
    }

    #[must_use]
    pub fn with_jitter(mut self, jitter: bool) -> Self {
        self.with_jitter = jitter;
        self
    }

    /// Whether an HTTP status is listed as transient.
    #[must_use]
    pub fn is_retryable_status(&self, status: u16) -> bool {
        self.retryable_statuses.contains(&status)
    }

    /// Number of retries after the first attempt.
    #[must_use]
    pub fn max_retries(&self) -> usize {
        self.max_attempts.saturating_sub(1)
    }

    /// Build an exponential backoff strategy from this policy.
    #[must_use]
    pub fn to_backoff(&self) -> ExponentialBuilder {
        let builder = ExponentialBuilder::default()
            .with_min_delay(self.min_delay)
            .with_max_delay(self.max_delay)
            .with_max_times(self.max_retries());

        if self.with_jitter {
            builder.with_jitter()
        } else {
            builder
        }
    }
}

/// Run `operation`, repeating it while `is_retryable` accepts the error and
/// the policy allows another attempt. The last error is returned unchanged.
pub async fn with_retry<T, E, F, Fut, IsRetryable>(
    mut operation: F,
    policy: &RetryPolicy,
    is_retryable: IsRetryable,
    label: &str,
) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: std::fmt::Display,
    IsRetryable: Fn(&E) -> bool,
{
    let attempt = AtomicU32::new(0);

    let retry_op = || {
        attempt.fetch_add(1, Ordering::SeqCst);
        operation()
    };

    retry_op
        .retry(policy.to_backoff())
        .notify(|err, dur| {
            tracing::debug!(
                resource = label,
                attempt = attempt.load(Ordering::SeqCst),
                retry_in_ms = dur.as_millis() as u64,
                error = %err,
                "Transient failure, retrying"
            );
        })
        .when(|e| is_retryable(e))
        .await
}
