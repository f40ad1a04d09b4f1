//! Retry wrapper for unreliable network operations
//!
//! Every failure is retried the same way: a fixed delay, then the same
//! request again. There is no backoff growth, no jitter and no error
//! classification.

use std::fmt::Display;
use std::future::Future;
use std::time::Duration;
use thiserror::Error;

/// Retry budget and delay for one call site
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Retries after the first attempt
    pub retries: u32,

    /// Fixed wait before each retry
    pub delay: Duration,
}

impl RetryPolicy {
    pub fn new(retries: u32, delay: Duration) -> Self {
        Self { retries, delay }
    }

    /// Total attempts this policy allows
    pub fn max_attempts(&self) -> u32 {
        self.retries + 1
    }
}

/// Returned when an operation still fails after its last retry
#[derive(Debug, Error)]
#[error("gave up after {attempts} attempts: {last_error}")]
pub struct ExhaustedRetries<E> {
    /// How many times the operation ran
    pub attempts: u32,

    /// Error from the final attempt
    #[source]
    pub last_error: E,
}

/// Runs `op` until it succeeds or the policy's retries are used up
///
/// `op` is called once per attempt and must rebuild the same request each
/// time. A warning naming `label` is logged before every sleep.
///
/// # Example
///
/// ```no_run
/// use dataset_mirror::crawler::{retry, RetryPolicy};
/// use std::time::Duration;
///
/// # async fn run(client: reqwest::Client) {
/// let policy = RetryPolicy::new(3, Duration::from_millis(2000));
/// let response = retry(&policy, "https://example.com/", || {
///     client.get("https://example.com/").send()
/// })
/// .await;
/// # }
/// ```
pub async fn retry<T, E, F, Fut>(
    policy: &RetryPolicy,
    label: &str,
    mut op: F,
) -> Result<T, ExhaustedRetries<E>>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: Display,
{
    let mut remaining = policy.retries;
    let mut attempts = 0;

    loop {
        attempts += 1;
        match op().await {
            Ok(value) => return Ok(value),
            Err(e) if remaining > 0 => {
                tracing::warn!(
                    "Retrying {} in {:?} ({} left): {}",
                    label,
                    policy.delay,
                    remaining,
                    e
                );
                tokio::time::sleep(policy.delay).await;
                remaining -= 1;
            }
            Err(e) => {
                return Err(ExhaustedRetries {
                    attempts,
                    last_error: e,
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use tokio::time::Instant;

    const DELAY: Duration = Duration::from_millis(2000);

    #[tokio::test(start_paused = true)]
    async fn test_always_failing_runs_retries_plus_one() {
        let calls = Cell::new(0u32);
        let policy = RetryPolicy::new(3, DELAY);

        let result: Result<(), _> = retry(&policy, "always-fails", || {
            calls.set(calls.get() + 1);
            async { Err::<(), _>("boom") }
        })
        .await;

        let err = result.unwrap_err();
        assert_eq!(calls.get(), 4);
        assert_eq!(err.attempts, 4);
        assert_eq!(err.last_error, "boom");
    }

    #[tokio::test(start_paused = true)]
    async fn test_zero_retries_attempts_once() {
        let calls = Cell::new(0u32);
        let policy = RetryPolicy::new(0, DELAY);
        let start = Instant::now();

        let result: Result<(), _> = retry(&policy, "once", || {
            calls.set(calls.get() + 1);
            async { Err::<(), _>("nope") }
        })
        .await;

        assert!(result.is_err());
        assert_eq!(calls.get(), 1);
        assert_eq!(start.elapsed(), Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn test_success_after_failures_sleeps_once_per_failure() {
        let calls = Cell::new(0u32);
        let policy = RetryPolicy::new(5, DELAY);
        let start = Instant::now();

        let result = retry(&policy, "flaky", || {
            let attempt = calls.get() + 1;
            calls.set(attempt);
            async move {
                if attempt <= 2 {
                    Err(format!("failure {}", attempt))
                } else {
                    Ok(attempt * 10)
                }
            }
        })
        .await;

        assert_eq!(result.unwrap(), 30);
        assert_eq!(calls.get(), 3);
        // Two failures, two fixed sleeps
        let elapsed = start.elapsed();
        assert!(elapsed >= DELAY * 2, "elapsed {:?}", elapsed);
        assert!(elapsed < DELAY * 3, "elapsed {:?}", elapsed);
    }

    #[tokio::test(start_paused = true)]
    async fn test_last_error_is_reported() {
        let calls = Cell::new(0u32);
        let policy = RetryPolicy::new(2, DELAY);

        let err = retry(&policy, "changing", || {
            let attempt = calls.get() + 1;
            calls.set(attempt);
            async move { Err::<(), _>(format!("error {}", attempt)) }
        })
        .await
        .unwrap_err();

        assert_eq!(err.last_error, "error 3");
        assert_eq!(err.to_string(), "gave up after 3 attempts: error 3");
    }

    #[test]
    fn test_max_attempts() {
        assert_eq!(RetryPolicy::new(5, DELAY).max_attempts(), 6);
    }
}
