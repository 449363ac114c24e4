//! Backoff policy for rate-limited calls and the combinator that applies it.

use std::future::Future;
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use crate::constants::{RATE_LIMIT_BASE_DELAY_MS, RATE_LIMIT_MAX_RETRIES};

/// Errors the retry combinator knows how to inspect.
pub trait RetryableError {
    /// Whether the remote side asked us to slow down
    fn is_rate_limited(&self) -> bool;

    /// The error to return when the caller cancels during a backoff wait
    fn cancelled() -> Self;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryDecision {
    pub retry: bool,
    pub wait: Duration,
}

/// Exponential backoff: `base_delay * 2^(attempt-1)` for attempts
/// `1..=max_retries`, then give up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: RATE_LIMIT_MAX_RETRIES,
            base_delay: Duration::from_millis(RATE_LIMIT_BASE_DELAY_MS),
        }
    }
}

impl RetryPolicy {
    /// Decide whether retry number `attempt` (1-based) may happen.
    pub fn should_retry(&self, attempt: u32) -> RetryDecision {
        if attempt == 0 || attempt > self.max_retries {
            return RetryDecision {
                retry: false,
                wait: Duration::ZERO,
            };
        }

        let factor = 1u32.checked_shl(attempt - 1).unwrap_or(u32::MAX);
        RetryDecision {
            retry: true,
            wait: self.base_delay.saturating_mul(factor),
        }
    }
}

/// Run `op`, re-invoking it after a backoff wait whenever it fails with a
/// rate-limit error, until the policy gives up.
///
/// Other errors are returned immediately. Once retries are exhausted the last
/// rate-limit error is returned as-is. Cancellation is checked before every
/// attempt and during waits.
pub async fn with_rate_limit_retry<T, E, F, Fut>(
    policy: &RetryPolicy,
    cancel: &CancellationToken,
    label: &str,
    mut op: F,
) -> Result<T, E>
where
    E: RetryableError + std::fmt::Display,
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
{
    let mut retries = 0u32;

    loop {
        if cancel.is_cancelled() {
            return Err(E::cancelled());
        }

        let err = match op().await {
            Ok(value) => return Ok(value),
            Err(e) if e.is_rate_limited() => e,
            Err(e) => return Err(e),
        };

        retries += 1;
        let decision = policy.should_retry(retries);
        if !decision.retry {
            tracing::warn!("{}: still rate limited after {} retries: {}", label, retries - 1, err);
            return Err(err);
        }

        tracing::warn!(
            "{}: rate limited ({}), retry {}/{} in {:?}",
            label,
            err,
            retries,
            policy.max_retries,
            decision.wait
        );

        tokio::select! {
            _ = cancel.cancelled() => return Err(E::cancelled()),
            _ = tokio::time::sleep(decision.wait) => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use tokio::time::Instant;

    #[derive(Debug, PartialEq)]
    enum TestError {
        RateLimited,
        Fatal,
        Cancelled,
    }

    impl std::fmt::Display for TestError {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            write!(f, "{:?}", self)
        }
    }

    impl RetryableError for TestError {
        fn is_rate_limited(&self) -> bool {
            *self == TestError::RateLimited
        }

        fn cancelled() -> Self {
            TestError::Cancelled
        }
    }

    #[test]
    fn test_backoff_schedule() {
        let policy = RetryPolicy::default();
        let waits: Vec<_> = (1..=3).map(|n| policy.should_retry(n)).collect();
        assert!(waits.iter().all(|d| d.retry));
        assert_eq!(waits[0].wait, Duration::from_millis(2000));
        assert_eq!(waits[1].wait, Duration::from_millis(4000));
        assert_eq!(waits[2].wait, Duration::from_millis(8000));

        assert!(!policy.should_retry(4).retry);
        assert!(!policy.should_retry(0).retry);
    }

    #[tokio::test(start_paused = true)]
    async fn test_recovers_after_rate_limits() {
        let calls = AtomicU32::new(0);
        let started = Instant::now();

        let result = with_rate_limit_retry(
            &RetryPolicy::default(),
            &CancellationToken::new(),
            "test",
            || async {
                let n = calls.fetch_add(1, Ordering::SeqCst);
                if n < 2 {
                    Err(TestError::RateLimited)
                } else {
                    Ok(n)
                }
            },
        )
        .await;

        assert_eq!(result, Ok(2));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
        assert!(started.elapsed() >= Duration::from_secs(6));
        assert!(started.elapsed() < Duration::from_secs(7));
    }

    #[tokio::test(start_paused = true)]
    async fn test_gives_up_after_three_retries() {
        let calls = AtomicU32::new(0);
        let started = Instant::now();

        let result: Result<(), _> = with_rate_limit_retry(
            &RetryPolicy::default(),
            &CancellationToken::new(),
            "test",
            || async {
                calls.fetch_add(1, Ordering::SeqCst);
                Err(TestError::RateLimited)
            },
        )
        .await;

        assert_eq!(result, Err(TestError::RateLimited));
        assert_eq!(calls.load(Ordering::SeqCst), 4);
        assert!(started.elapsed() >= Duration::from_secs(14));
        assert!(started.elapsed() < Duration::from_secs(15));
    }

    #[tokio::test]
    async fn test_other_errors_are_not_retried() {
        let calls = AtomicU32::new(0);
        let result: Result<(), _> = with_rate_limit_retry(
            &RetryPolicy::default(),
            &CancellationToken::new(),
            "test",
            || async {
                calls.fetch_add(1, Ordering::SeqCst);
                Err(TestError::Fatal)
            },
        )
        .await;

        assert_eq!(result, Err(TestError::Fatal));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_during_backoff() {
        let cancel = CancellationToken::new();
        let calls = AtomicU32::new(0);

        let result: Result<(), _> = with_rate_limit_retry(
            &RetryPolicy::default(),
            &cancel,
            "test",
            || async {
                calls.fetch_add(1, Ordering::SeqCst);
                cancel.cancel();
                Err(TestError::RateLimited)
            },
        )
        .await;

        assert_eq!(result, Err(TestError::Cancelled));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
