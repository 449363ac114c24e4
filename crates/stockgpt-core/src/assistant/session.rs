//! Conversation orchestration.
//!
//! A [`Conversation`] drives request/response cycles against the assistant
//! service and keeps the [`ThreadStore`] current. All UI-visible state lives
//! in an explicit [`ChatSession`] that the caller owns and passes in.

use tokio_util::sync::CancellationToken;

use super::api::{ApiError, AssistantApi, RATE_LIMIT_CODE};
use super::poller::{RunError, RunPoller};
use super::retry::{with_rate_limit_retry, RetryPolicy};
use crate::constants::{ERROR_REPLY_TEXT, HISTORY_FETCH_LIMIT, RATE_LIMIT_REPLY_TEXT};
use crate::models::{ConversationThread, Message};
use crate::store::{StorageError, ThreadStore};

/// How many recent messages to scan for the reply after a run completes
const REPLY_FETCH_LIMIT: u32 = 10;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ChatStatus {
    #[default]
    Idle,
    AwaitingReply,
}

/// In-memory state of the chat screen.
#[derive(Debug, Clone, Default)]
pub struct ChatSession {
    pub active_thread_id: Option<String>,
    /// Oldest first
    pub messages: Vec<Message>,
    pub status: ChatStatus,
}

impl ChatSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_awaiting_reply(&self) -> bool {
        self.status == ChatStatus::AwaitingReply
    }

    fn reset_to(&mut self, thread_id: String, messages: Vec<Message>) {
        self.active_thread_id = Some(thread_id);
        self.messages = messages;
        self.status = ChatStatus::Idle;
    }
}

/// A completed exchange
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssistantReply {
    pub thread_id: String,
    pub run_id: String,
    pub message: Message,
}

#[derive(Debug, thiserror::Error)]
pub enum ConversationError {
    #[error("Network error: {0}")]
    Network(String),
    #[error("Rate limit exceeded: {0}")]
    RateLimitExceeded(String),
    #[error("Run failed: {0}")]
    RunFailed(String),
    #[error("Run expired")]
    RunExpired,
    #[error("No reply after {0} status checks")]
    RunTimedOut(u32),
    #[error("Thread not found: {0}")]
    ThreadNotFound(String),
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error("Cancelled")]
    Cancelled,
    #[error("Missing credentials: {0}")]
    MissingCredentials(&'static str),
}

impl ConversationError {
    /// Text shown in the chat in place of a reply
    pub fn user_message(&self) -> &'static str {
        match self {
            ConversationError::RateLimitExceeded(_) => RATE_LIMIT_REPLY_TEXT,
            _ => ERROR_REPLY_TEXT,
        }
    }
}

impl From<ApiError> for ConversationError {
    fn from(err: ApiError) -> Self {
        match err {
            ApiError::RateLimited { message } => ConversationError::RateLimitExceeded(message),
            ApiError::MissingCredentials(what) => ConversationError::MissingCredentials(what),
            ApiError::Cancelled => ConversationError::Cancelled,
            other @ (ApiError::Http { .. } | ApiError::Network(_) | ApiError::Decode(_)) => {
                ConversationError::Network(other.to_string())
            }
        }
    }
}

impl From<RunError> for ConversationError {
    fn from(err: RunError) -> Self {
        match err {
            RunError::Failed { code, message } if code == RATE_LIMIT_CODE => {
                ConversationError::RateLimitExceeded(message)
            }
            RunError::Failed { code, message } => {
                ConversationError::RunFailed(format!("{}: {}", code, message))
            }
            RunError::Expired => ConversationError::RunExpired,
            RunError::TimedOut { attempts } => ConversationError::RunTimedOut(attempts),
            RunError::Cancelled => ConversationError::Cancelled,
            RunError::Api(err) => err.into(),
        }
    }
}

pub struct Conversation<A: AssistantApi> {
    api: A,
    store: ThreadStore,
    poller: RunPoller,
    retry: RetryPolicy,
}

impl<A: AssistantApi> Conversation<A> {
    pub fn new(api: A, store: ThreadStore) -> Self {
        Self {
            api,
            store,
            poller: RunPoller::default(),
            retry: RetryPolicy::default(),
        }
    }

    pub fn with_poller(mut self, poller: RunPoller) -> Self {
        self.poller = poller;
        self
    }

    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.poller.retry = retry;
        self.retry = retry;
        self
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    pub fn store(&self) -> &ThreadStore {
        &self.store
    }

    /// Stored threads, most recent first
    pub fn threads(&self) -> Vec<ConversationThread> {
        self.store.load()
    }

    /// Restore the most recent thread, or start one when nothing is stored.
    ///
    /// A thread whose history cannot be fetched still becomes active with an
    /// empty message list.
    pub async fn initialize(&self, session: &mut ChatSession) -> Result<(), ConversationError> {
        let latest = self.store.load().into_iter().next();
        match latest {
            Some(thread) => {
                let history = match self.fetch_history(&thread.id).await {
                    Ok(history) => history,
                    Err(e) => {
                        tracing::warn!("session: could not load history for {}: {}", thread.id, e);
                        Vec::new()
                    }
                };
                tracing::info!("session: resumed thread {} ({} messages)", thread.id, history.len());
                session.reset_to(thread.id, history);
                Ok(())
            }
            None => {
                self.new_conversation(session).await?;
                Ok(())
            }
        }
    }

    /// Create a remote thread, store it untitled at the front and make it active.
    pub async fn new_conversation(&self, session: &mut ChatSession) -> Result<String, ConversationError> {
        let thread_id = self.create_remote_thread(&CancellationToken::new()).await?;
        self.save_front(ConversationThread::new(thread_id.clone()));
        session.reset_to(thread_id.clone(), Vec::new());
        Ok(thread_id)
    }

    /// Make a stored thread active and restore its history.
    pub async fn select_thread(&self, session: &mut ChatSession, thread_id: &str) -> Result<(), ConversationError> {
        if self.store.get(thread_id).is_none() {
            return Err(ConversationError::ThreadNotFound(thread_id.to_string()));
        }

        let history = self.fetch_history(thread_id).await?;
        tracing::info!("session: opened thread {} ({} messages)", thread_id, history.len());
        session.reset_to(thread_id.to_string(), history);
        Ok(())
    }

    /// Send `text` on the active thread (creating one if needed) and wait for
    /// the assistant's reply.
    ///
    /// Returns `Ok(None)` without side effects for blank text or while a reply
    /// is already pending. On failure a synthetic error message is appended to
    /// the session, except when the exchange was cancelled.
    pub async fn send_message(
        &self,
        session: &mut ChatSession,
        text: &str,
        cancel: &CancellationToken,
    ) -> Result<Option<AssistantReply>, ConversationError> {
        let text = text.trim();
        if text.is_empty() {
            return Ok(None);
        }
        if session.is_awaiting_reply() {
            tracing::debug!("session: ignoring send while a reply is pending");
            return Ok(None);
        }

        session.messages.push(Message::user(text));
        session.status = ChatStatus::AwaitingReply;

        let result = self.exchange(session, text, cancel).await;
        session.status = ChatStatus::Idle;

        match result {
            Ok(reply) => {
                session.messages.push(reply.message.clone());
                Ok(Some(reply))
            }
            Err(ConversationError::Cancelled) => {
                tracing::info!("session: exchange cancelled");
                Err(ConversationError::Cancelled)
            }
            Err(e) => {
                tracing::warn!("session: no reply: {}", e);
                session.messages.push(Message::error(e.user_message()));
                Err(e)
            }
        }
    }

    /// Forget a thread. Only deleting the active thread changes the session:
    /// the next most recent thread is opened, or a new one is started.
    pub async fn delete_thread(&self, session: &mut ChatSession, thread_id: &str) -> Result<(), ConversationError> {
        let remaining = self.store.remove(thread_id)?;

        let api = &self.api;
        if let Err(e) = with_rate_limit_retry(&self.retry, &CancellationToken::new(), "delete_thread", || {
            api.delete_thread(thread_id)
        })
        .await
        {
            tracing::warn!("session: remote delete of {} failed: {}", thread_id, e);
        }
        tracing::info!("session: deleted thread {}", thread_id);

        if session.active_thread_id.as_deref() != Some(thread_id) {
            return Ok(());
        }

        match remaining.into_iter().next() {
            Some(next) => {
                let history = match self.fetch_history(&next.id).await {
                    Ok(history) => history,
                    Err(e) => {
                        tracing::warn!("session: could not load history for {}: {}", next.id, e);
                        Vec::new()
                    }
                };
                session.reset_to(next.id, history);
            }
            None => {
                self.new_conversation(session).await?;
            }
        }
        Ok(())
    }

    async fn exchange(
        &self,
        session: &mut ChatSession,
        text: &str,
        cancel: &CancellationToken,
    ) -> Result<AssistantReply, ConversationError> {
        let thread_id = match session.active_thread_id.clone() {
            Some(id) => id,
            None => {
                let id = self.create_remote_thread(cancel).await?;
                session.active_thread_id = Some(id.clone());
                id
            }
        };

        let mut thread = self
            .store
            .get(&thread_id)
            .unwrap_or_else(|| ConversationThread::new(thread_id.clone()));
        thread.record_user_message(text);
        self.save_front(thread);

        let api = &self.api;
        let thread_ref = thread_id.as_str();
        let posted = with_rate_limit_retry(&self.retry, cancel, "create_message", || {
            api.create_message(thread_ref, text)
        })
        .await?;

        // A run the service fails for rate limiting is started over as a whole
        let poller = &self.poller;
        let retry = &self.retry;
        let run = with_rate_limit_retry(retry, cancel, "run", || async move {
            let run = with_rate_limit_retry(retry, cancel, "create_run", || api.create_run(thread_ref)).await?;
            poller.poll_until_terminal(api, thread_ref, &run.id, cancel).await
        })
        .await?;

        let message = self.fetch_reply(thread_ref, &posted.id, cancel).await?;
        tracing::info!("session: reply {} on thread {}", message.id, thread_id);

        Ok(AssistantReply {
            thread_id,
            run_id: run.id,
            message,
        })
    }

    async fn create_remote_thread(&self, cancel: &CancellationToken) -> Result<String, ConversationError> {
        let api = &self.api;
        let thread_id = with_rate_limit_retry(&self.retry, cancel, "create_thread", || api.create_thread()).await?;
        tracing::info!("session: new thread {}", thread_id);
        Ok(thread_id)
    }

    /// Newest assistant message posted after `user_message_id`
    async fn fetch_reply(
        &self,
        thread_id: &str,
        user_message_id: &str,
        cancel: &CancellationToken,
    ) -> Result<Message, ConversationError> {
        let api = &self.api;
        let messages = with_rate_limit_retry(&self.retry, cancel, "list_messages", || {
            api.list_messages(thread_id, REPLY_FETCH_LIMIT)
        })
        .await?;

        // Newest first: anything at or past the user's message belongs to an earlier exchange
        messages
            .into_iter()
            .take_while(|m| m.id != user_message_id)
            .find(|m| m.is_assistant())
            .map(|m| m.into_message())
            .ok_or_else(|| ConversationError::RunFailed("run completed without a reply".to_string()))
    }

    /// Thread history, oldest first
    async fn fetch_history(&self, thread_id: &str) -> Result<Vec<Message>, ConversationError> {
        let api = &self.api;
        let mut messages = with_rate_limit_retry(&self.retry, &CancellationToken::new(), "list_messages", || {
            api.list_messages(thread_id, HISTORY_FETCH_LIMIT)
        })
        .await?;
        messages.reverse();
        Ok(messages.into_iter().map(|m| m.into_message()).collect())
    }

    fn save_front(&self, thread: ConversationThread) {
        if let Err(e) = self.store.upsert_front(thread) {
            tracing::warn!("session: {}", e);
        }
    }
}
