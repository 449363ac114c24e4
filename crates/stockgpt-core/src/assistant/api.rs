use async_trait::async_trait;
use chrono::{DateTime, Utc};

use super::retry::RetryableError;
use crate::models::{Message, RunStatus};

/// Error code the assistant service uses for rate limiting
pub const RATE_LIMIT_CODE: &str = "rate_limit_exceeded";

/// Errors from a single call to the assistant service.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ApiError {
    #[error("Rate limited: {message}")]
    RateLimited { message: String },
    #[error("Assistant API error ({status}): {message}")]
    Http { status: u16, message: String },
    #[error("Network error: {0}")]
    Network(String),
    #[error("Failed to decode assistant response: {0}")]
    Decode(String),
    #[error("Missing credentials: {0}")]
    MissingCredentials(&'static str),
    #[error("Cancelled")]
    Cancelled,
}

impl RetryableError for ApiError {
    fn is_rate_limited(&self) -> bool {
        matches!(self, ApiError::RateLimited { .. })
    }

    fn cancelled() -> Self {
        ApiError::Cancelled
    }
}

/// `last_error` of a failed run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunLastError {
    pub code: String,
    pub message: String,
}

impl RunLastError {
    pub fn is_rate_limited(&self) -> bool {
        self.code == RATE_LIMIT_CODE
    }
}

/// Snapshot of a run as returned by create/retrieve
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunInfo {
    pub id: String,
    pub status: RunStatus,
    pub last_error: Option<RunLastError>,
}

/// A message stored on a remote thread
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteMessage {
    pub id: String,
    pub role: String,
    /// Concatenated text parts of the message content
    pub text: String,
    /// Unix seconds
    pub created_at: i64,
}

impl RemoteMessage {
    pub fn is_assistant(&self) -> bool {
        self.role == "assistant"
    }

    pub fn into_message(self) -> Message {
        let created_at = DateTime::<Utc>::from_timestamp(self.created_at, 0).unwrap_or_else(Utc::now);
        if self.is_assistant() {
            Message::assistant(self.id, self.text, created_at)
        } else {
            Message {
                id: self.id,
                text: self.text,
                is_user: true,
                created_at,
                links: Vec::new(),
            }
        }
    }
}

/// Operations consumed from the hosted assistant service.
///
/// Implementations make exactly one remote call per method; retrying on rate
/// limits is the caller's job (see [`super::retry::with_rate_limit_retry`]).
#[async_trait]
pub trait AssistantApi: Send + Sync {
    /// Create an empty thread and return its id
    async fn create_thread(&self) -> Result<String, ApiError>;

    /// Append a user message to a thread
    async fn create_message(&self, thread_id: &str, text: &str) -> Result<RemoteMessage, ApiError>;

    /// Start the configured assistant on a thread
    async fn create_run(&self, thread_id: &str) -> Result<RunInfo, ApiError>;

    async fn retrieve_run(&self, thread_id: &str, run_id: &str) -> Result<RunInfo, ApiError>;

    /// Messages on a thread, newest first
    async fn list_messages(&self, thread_id: &str, limit: u32) -> Result<Vec<RemoteMessage>, ApiError>;

    async fn delete_thread(&self, thread_id: &str) -> Result<(), ApiError>;
}
