//! Conversation with the hosted assistant: remote API, rate-limit retry,
//! run polling and the session-level orchestration on top of them.

pub mod api;
pub mod client;
pub mod poller;
pub mod retry;
pub mod session;

#[cfg(test)]
pub(crate) mod fake;

pub use api::{ApiError, AssistantApi, RemoteMessage, RunInfo, RunLastError};
pub use client::AssistantClient;
pub use poller::{RunError, RunPoller};
pub use retry::{with_rate_limit_retry, RetryDecision, RetryPolicy, RetryableError};
pub use session::{AssistantReply, ChatSession, ChatStatus, Conversation, ConversationError};
