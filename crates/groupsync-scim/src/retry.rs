//! Backoff for throttled SCIM reads.
//!
//! Applies to GET requests only. The membership PATCH is never repeated.

use crate::error::{ScimClientError, ScimClientResult};
use std::time::Duration;
use tracing::{debug, warn};

/// Retry policy configuration.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Maximum number of retry attempts (0 = no retries).
    pub max_retries: u32,
    /// Base delay in milliseconds for exponential backoff.
    pub base_delay_ms: u64,
    /// Maximum delay cap in milliseconds.
    pub max_delay_ms: u64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 5,
            base_delay_ms: 1_000,
            max_delay_ms: 60_000,
        }
    }
}

impl RetryPolicy {
    /// Create a policy with the given retry budget and base delay.
    /// The cap stays at 60 seconds.
    #[must_use]
    pub fn new(max_retries: u32, base_delay_ms: u64) -> Self {
        Self {
            max_retries,
            base_delay_ms,
            max_delay_ms: 60_000,
        }
    }

    /// No waiting between attempts.
    #[must_use]
    pub fn immediate(max_retries: u32) -> Self {
        Self {
            max_retries,
            base_delay_ms: 0,
            max_delay_ms: 0,
        }
    }

    #[must_use]
    pub fn should_retry(&self, attempt: u32, error: &ScimClientError) -> bool {
        attempt < self.max_retries && error.is_retryable()
    }

    /// Delay before the next attempt.
    ///
    /// A `Retry-After` value on [`ScimClientError::RateLimited`] wins (capped at
    /// `max_delay_ms`); otherwise `base_delay_ms * 2^attempt`, capped.
    #[must_use]
    pub fn delay_for(&self, attempt: u32, error: &ScimClientError) -> Duration {
        let ms = if let ScimClientError::RateLimited {
            retry_after_secs: Some(retry_after),
        } = error
        {
            retry_after.saturating_mul(1_000).min(self.max_delay_ms)
        } else {
            self.base_delay_ms
                .saturating_mul(2u64.saturating_pow(attempt))
                .min(self.max_delay_ms)
        };
        Duration::from_millis(ms)
    }

    /// Run `f` until it succeeds, fails with a non-retryable error, or the
    /// retry budget runs out.
    pub async fn execute<F, Fut, T>(&self, operation_name: &str, mut f: F) -> ScimClientResult<T>
    where
        F: FnMut() -> Fut,
        Fut: std::future::Future<Output = ScimClientResult<T>>,
    {
        let mut attempt: u32 = 0;
        loop {
            match f().await {
                Ok(value) => {
                    if attempt > 0 {
                        debug!(
                            operation = operation_name,
                            attempt = attempt + 1,
                            "Request succeeded after backoff"
                        );
                    }
                    return Ok(value);
                }
                Err(error) if !error.is_retryable() => return Err(error),
                Err(error) if !self.should_retry(attempt, &error) => {
                    warn!(
                        operation = operation_name,
                        attempts = attempt + 1,
                        error = %error,
                        "Giving up after repeated throttling"
                    );
                    return Err(ScimClientError::MaxRetriesExceeded {
                        attempts: attempt + 1,
                        message: format!("{operation_name}: {error}"),
                    });
                }
                Err(error) => {
                    let delay = self.delay_for(attempt, &error);
                    warn!(
                        operation = operation_name,
                        attempt = attempt + 1,
                        max_retries = self.max_retries,
                        delay_ms = delay.as_millis() as u64,
                        error = %error,
                        "Backing off"
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

    fn throttled(secs: Option<u64>) -> ScimClientError {
        ScimClientError::RateLimited {
            retry_after_secs: secs,
        }
    }

    #[test]
    fn test_default_policy() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.max_retries, 5);
        assert_eq!(policy.base_delay_ms, 1_000);
        assert_eq!(policy.max_delay_ms, 60_000);
    }

    #[test]
    fn test_should_retry_respects_budget() {
        let policy = RetryPolicy::new(3, 1);
        assert!(policy.should_retry(0, &throttled(None)));
        assert!(policy.should_retry(2, &throttled(None)));
        assert!(!policy.should_retry(3, &throttled(None)));
    }

    #[test]
    fn test_client_errors_are_not_retried() {
        let policy = RetryPolicy::new(3, 1);
        assert!(!policy.should_retry(0, &ScimClientError::NotFound("g".into())));
        assert!(!policy.should_retry(
            0,
            &ScimClientError::ScimError {
                status: 400,
                detail: "bad filter".into()
            }
        ));
        assert!(!policy.should_retry(0, &ScimClientError::AuthError("token".into())));
    }

    #[test]
    fn test_delay_exponential_and_capped() {
        let policy = RetryPolicy {
            max_retries: 10,
            base_delay_ms: 1_000,
            max_delay_ms: 10_000,
        };
        let err = throttled(None);
        assert_eq!(policy.delay_for(0, &err), Duration::from_secs(1));
        assert_eq!(policy.delay_for(2, &err), Duration::from_secs(4));
        assert_eq!(policy.delay_for(6, &err), Duration::from_secs(10));
    }

    #[test]
    fn test_delay_honours_retry_after() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.delay_for(3, &throttled(Some(7))), Duration::from_secs(7));
        assert_eq!(
            policy.delay_for(0, &throttled(Some(600))),
            Duration::from_secs(60)
        );
    }

    #[tokio::test]
    async fn test_execute_recovers_from_throttling() {
        let policy = RetryPolicy::immediate(3);
        let counter = Arc::new(AtomicU32::new(0));
        let seen = counter.clone();

        let result = policy
            .execute("list_groups", move || {
                let counter = seen.clone();
                async move {
                    if counter.fetch_add(1, Ordering::SeqCst) < 2 {
                        Err(throttled(Some(0)))
                    } else {
                        Ok(7)
                    }
                }
            })
            .await;

        assert_eq!(result.unwrap(), 7);
        assert_eq!(counter.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_execute_non_retryable_fails_immediately() {
        let policy = RetryPolicy::immediate(3);
        let counter = Arc::new(AtomicU32::new(0));
        let seen = counter.clone();

        let result: ScimClientResult<()> = policy
            .execute("list_groups", move || {
                let counter = seen.clone();
                async move {
                    counter.fetch_add(1, Ordering::SeqCst);
                    Err(ScimClientError::Unreachable("host".into()))
                }
            })
            .await;

        assert!(matches!(result, Err(ScimClientError::Unreachable(_))));
        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_execute_gives_up() {
        let policy = RetryPolicy::immediate(2);
        let result: ScimClientResult<()> = policy
            .execute("list_groups", || async { Err(throttled(None)) })
            .await;

        match result {
            Err(ScimClientError::MaxRetriesExceeded { attempts, .. }) => assert_eq!(attempts, 3),
            other => panic!("expected MaxRetriesExceeded, got {other:?}"),
        }
    }
}
