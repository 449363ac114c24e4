use std::time::Duration;

use tokio_util::sync::CancellationToken;

use super::api::{ApiError, AssistantApi, RunInfo, RATE_LIMIT_CODE};
use super::retry::{with_rate_limit_retry, RetryPolicy, RetryableError};
use crate::constants::{RUN_POLL_INTERVAL_MS, RUN_POLL_MAX_ATTEMPTS};
use crate::models::RunStatus;

/// Why a run did not produce a reply.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RunError {
    #[error("Run failed ({code}): {message}")]
    Failed { code: String, message: String },
    #[error("Run expired")]
    Expired,
    #[error("Run still not finished after {attempts} status checks")]
    TimedOut { attempts: u32 },
    #[error("Cancelled")]
    Cancelled,
    #[error(transparent)]
    Api(ApiError),
}

impl From<ApiError> for RunError {
    fn from(err: ApiError) -> Self {
        match err {
            ApiError::Cancelled => RunError::Cancelled,
            other => RunError::Api(other),
        }
    }
}

impl RetryableError for RunError {
    /// Only a run that the service failed for rate limiting is worth starting
    /// again. Rate-limited API calls were already retried where they were made.
    fn is_rate_limited(&self) -> bool {
        matches!(self, RunError::Failed { code, .. } if code == RATE_LIMIT_CODE)
    }

    fn cancelled() -> Self {
        RunError::Cancelled
    }
}

fn failure(run: &RunInfo) -> RunError {
    match &run.last_error {
        Some(last_error) => RunError::Failed {
            code: last_error.code.clone(),
            message: last_error.message.clone(),
        },
        None => RunError::Failed {
            code: run.status.as_str().to_string(),
            message: format!("run ended with status {}", run.status),
        },
    }
}

/// Turns an asynchronous remote run into a terminal result by re-querying
/// its status at a fixed interval, up to a fixed number of queries.
#[derive(Debug, Clone)]
pub struct RunPoller {
    pub interval: Duration,
    pub max_attempts: u32,
    /// Applied to each individual status query
    pub retry: RetryPolicy,
}

impl Default for RunPoller {
    fn default() -> Self {
        Self {
            interval: Duration::from_millis(RUN_POLL_INTERVAL_MS),
            max_attempts: RUN_POLL_MAX_ATTEMPTS,
            retry: RetryPolicy::default(),
        }
    }
}

impl RunPoller {
    pub fn new(interval: Duration, max_attempts: u32) -> Self {
        Self {
            interval,
            max_attempts,
            retry: RetryPolicy::default(),
        }
    }

    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Query the run until it completes, fails or expires.
    ///
    /// Every query counts as one attempt. There is no wait after the last
    /// attempt, so a run that never finishes yields `TimedOut` right after
    /// the `max_attempts`-th query.
    pub async fn poll_until_terminal<A: AssistantApi + ?Sized>(
        &self,
        api: &A,
        thread_id: &str,
        run_id: &str,
        cancel: &CancellationToken,
    ) -> Result<RunInfo, RunError> {
        let mut warned = false;

        for attempt in 1..=self.max_attempts {
            if cancel.is_cancelled() {
                return Err(RunError::Cancelled);
            }

            let run = with_rate_limit_retry(&self.retry, cancel, "retrieve_run", || {
                api.retrieve_run(thread_id, run_id)
            })
            .await?;

            tracing::debug!(
                "poller: run {} is {} (attempt {}/{})",
                run_id,
                run.status,
                attempt,
                self.max_attempts
            );

            match &run.status {
                RunStatus::Completed => return Ok(run),
                RunStatus::Expired => return Err(RunError::Expired),
                RunStatus::Failed | RunStatus::Cancelled | RunStatus::Incomplete => {
                    return Err(failure(&run));
                }
                RunStatus::RequiresAction | RunStatus::Unknown(_) => {
                    if !warned {
                        tracing::warn!(
                            "poller: run {} reported {}, which is not handled; waiting for it to change",
                            run_id,
                            run.status
                        );
                        warned = true;
                    }
                }
                RunStatus::Queued | RunStatus::InProgress | RunStatus::Cancelling => {}
            }

            if attempt < self.max_attempts {
                tokio::select! {
                    _ = cancel.cancelled() => return Err(RunError::Cancelled),
                    _ = tokio::time::sleep(self.interval) => {}
                }
            }
        }

        tracing::warn!("poller: run {} timed out after {} attempts", run_id, self.max_attempts);
        Err(RunError::TimedOut {
            attempts: self.max_attempts,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assistant::fake::FakeAssistant;
    use tokio::time::Instant;

    #[tokio::test(start_paused = true)]
    async fn test_times_out_after_exactly_max_attempts() {
        let api = FakeAssistant::new().with_fallback_status(RunStatus::InProgress);
        let started = Instant::now();

        let result = RunPoller::default()
            .poll_until_terminal(&api, "thread_1", "run_1", &CancellationToken::new())
            .await;

        assert_eq!(result, Err(RunError::TimedOut { attempts: 30 }));
        assert_eq!(api.calls().retrieve_run, 30);
        // 29 waits between 30 queries
        assert!(started.elapsed() >= Duration::from_secs(29));
        assert!(started.elapsed() < Duration::from_secs(30));
    }

    #[tokio::test(start_paused = true)]
    async fn test_completes_on_third_query() {
        let api = FakeAssistant::new().with_statuses([
            RunStatus::Queued,
            RunStatus::InProgress,
            RunStatus::Completed,
        ]);

        let run = RunPoller::default()
            .poll_until_terminal(&api, "thread_1", "run_1", &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(run.status, RunStatus::Completed);
        assert_eq!(api.calls().retrieve_run, 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_run_carries_last_error() {
        let api = FakeAssistant::new()
            .with_statuses([RunStatus::InProgress, RunStatus::Failed])
            .with_run_error("server_error", "Something went wrong");

        let err = RunPoller::default()
            .poll_until_terminal(&api, "thread_1", "run_1", &CancellationToken::new())
            .await
            .unwrap_err();

        assert_eq!(
            err,
            RunError::Failed {
                code: "server_error".to_string(),
                message: "Something went wrong".to_string()
            }
        );
        assert!(!err.is_rate_limited());
    }

    #[tokio::test(start_paused = true)]
    async fn test_rate_limited_failure_is_retryable() {
        let api = FakeAssistant::new()
            .with_fallback_status(RunStatus::Failed)
            .with_run_error(RATE_LIMIT_CODE, "Rate limit reached");

        let err = RunPoller::default()
            .poll_until_terminal(&api, "thread_1", "run_1", &CancellationToken::new())
            .await
            .unwrap_err();

        assert!(err.is_rate_limited());
    }

    #[tokio::test(start_paused = true)]
    async fn test_expired() {
        let api = FakeAssistant::new().with_statuses([RunStatus::Queued, RunStatus::Expired]);
        let result = RunPoller::default()
            .poll_until_terminal(&api, "thread_1", "run_1", &CancellationToken::new())
            .await;
        assert_eq!(result, Err(RunError::Expired));
    }

    #[tokio::test(start_paused = true)]
    async fn test_requires_action_is_not_terminal() {
        let api = FakeAssistant::new().with_statuses([
            RunStatus::RequiresAction,
            RunStatus::RequiresAction,
            RunStatus::Completed,
        ]);
        let run = RunPoller::default()
            .poll_until_terminal(&api, "thread_1", "run_1", &CancellationToken::new())
            .await
            .unwrap();
        assert_eq!(run.status, RunStatus::Completed);
        assert_eq!(api.calls().retrieve_run, 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_rate_limited_status_query_is_retried() {
        let api = FakeAssistant::new()
            .with_retrieve_errors([ApiError::RateLimited {
                message: "slow down".to_string(),
            }])
            .with_statuses([RunStatus::Completed]);
        let started = Instant::now();

        let run = RunPoller::default()
            .poll_until_terminal(&api, "thread_1", "run_1", &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(run.status, RunStatus::Completed);
        assert_eq!(api.calls().retrieve_run, 2);
        assert!(started.elapsed() >= Duration::from_secs(2));
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_stops_polling() {
        let api = FakeAssistant::new().with_fallback_status(RunStatus::InProgress);
        let cancel = CancellationToken::new();

        let poller = RunPoller::default();
        let poll = poller.poll_until_terminal(&api, "thread_1", "run_1", &cancel);
        let canceller = async {
            tokio::time::sleep(Duration::from_millis(2500)).await;
            cancel.cancel();
        };
        let (result, _) = tokio::join!(poll, canceller);

        assert_eq!(result, Err(RunError::Cancelled));
        assert_eq!(api.calls().retrieve_run, 3);
    }

    #[test]
    fn test_api_cancel_maps_to_run_cancel() {
        assert_eq!(RunError::from(ApiError::Cancelled), RunError::Cancelled);
        assert!(matches!(
            RunError::from(ApiError::Network("reset".into())),
            RunError::Api(ApiError::Network(_))
        ));
    }
}
