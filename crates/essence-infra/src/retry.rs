//! Bounded retry with linear backoff.
//!
//! The first attempt runs immediately; retry `n` waits `n * base_interval`
//! before running. After `max_retries` retries the last error is returned.

use std::fmt::Display;
use std::future::Future;
use std::time::Duration;

/// Retry policy: up to `max_retries` retries, waiting `n * base_interval` before retry `n`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LinearBackoff {
    pub base_interval: Duration,
    pub max_retries: u32,
}

/// Returned when every attempt failed.
#[derive(Debug)]
pub struct RetryExhausted<E> {
    pub attempts: u32,
    pub last_error: E,
}

impl<E: Display> Display for RetryExhausted<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "gave up after {} attempts: {}",
            self.attempts, self.last_error
        )
    }
}

impl<E: std::fmt::Debug + Display> std::error::Error for RetryExhausted<E> {}

impl Default for LinearBackoff {
    fn default() -> Self {
        Self {
            base_interval: Duration::from_secs(60),
            max_retries: 10,
        }
    }
}

impl LinearBackoff {
    pub fn new(base_interval: Duration, max_retries: u32) -> Self {
        Self {
            base_interval,
            max_retries,
        }
    }

    /// Delay before retry number `retry` (1-based).
    pub fn delay_for(&self, retry: u32) -> Duration {
        self.base_interval.saturating_mul(retry)
    }

    /// Run `operation` until it succeeds or the retry ceiling is reached.
    ///
    /// `operation` receives the 0-based attempt number.
    pub async fn run<T, E, F, Fut>(
        &self,
        operation_name: &str,
        mut operation: F,
    ) -> Result<T, RetryExhausted<E>>
    where
        F: FnMut(u32) -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: Display,
    {
        let mut attempt = 0;
        loop {
            match operation(attempt).await {
                Ok(value) => {
                    if attempt > 0 {
                        tracing::info!(
                            operation = operation_name,
                            retry = attempt,
                            "Operation succeeded after retry"
                        );
                    }
                    return Ok(value);
                }
                Err(e) if attempt < self.max_retries => {
                    attempt += 1;
                    let delay = self.delay_for(attempt);
                    tracing::warn!(
                        operation = operation_name,
                        error = %e,
                        retry = attempt,
                        max_retries = self.max_retries,
                        delay_secs = delay.as_secs_f64(),
                        "Operation failed, retrying"
                    );
                    tokio::time::sleep(delay).await;
                }
                Err(e) => {
                    return Err(RetryExhausted {
                        attempts: attempt + 1,
                        last_error: e,
                    });
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[test]
    fn test_defaults() {
        let policy = LinearBackoff::default();
        assert_eq!(policy.base_interval, Duration::from_secs(60));
        assert_eq!(policy.max_retries, 10);
    }

    #[test]
    fn test_delay_is_linear() {
        let policy = LinearBackoff::new(Duration::from_secs(60), 10);
        assert_eq!(policy.delay_for(1), Duration::from_secs(60));
        assert_eq!(policy.delay_for(2), Duration::from_secs(120));
        assert_eq!(policy.delay_for(10), Duration::from_secs(600));
    }

    #[tokio::test]
    async fn test_gives_up_after_ceiling() {
        let policy = LinearBackoff::new(Duration::ZERO, 10);
        let calls = AtomicU32::new(0);

        let result: Result<(), _> = policy
            .run("test", |_| {
                calls.fetch_add(1, Ordering::SeqCst);
                async { Err::<(), _>("connection refused") }
            })
            .await;

        let err = result.unwrap_err();
        assert_eq!(err.attempts, 11);
        assert_eq!(err.last_error, "connection refused");
        assert_eq!(calls.load(Ordering::SeqCst), 11);
    }

    #[tokio::test]
    async fn test_succeeds_after_transient_failures() {
        let policy = LinearBackoff::new(Duration::ZERO, 3);

        let result = policy
            .run("test", |attempt| async move {
                if attempt < 2 {
                    Err("not yet")
                } else {
                    Ok(attempt)
                }
            })
            .await;

        assert_eq!(result.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_first_success_does_not_retry() {
        let policy = LinearBackoff::new(Duration::from_secs(3600), 5);
        let calls = AtomicU32::new(0);

        let result = policy
            .run("test", |_| {
                calls.fetch_add(1, Ordering::SeqCst);
                async { Ok::<_, String>("done") }
            })
            .await;

        assert_eq!(result.unwrap(), "done");
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
