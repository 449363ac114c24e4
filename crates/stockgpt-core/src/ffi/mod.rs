//! UniFFI bridge for the Swift/Kotlin front-ends.
//!
//! Every exported method is synchronous; async core operations are driven on
//! a shared Tokio runtime. Chat operations that touch the session are
//! serialized: while one is running, others report `Busy` (a second send is a
//! no-op, matching the disabled send button).

mod chat_api;
mod market_api;
mod settings_api;

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, OnceLock};

use parking_lot::{Mutex, RwLock};
use tokio_util::sync::CancellationToken;

use crate::assistant::{AssistantClient, ChatSession, Conversation, ConversationError};
use crate::config::CoreConfig;
use crate::models::{CalendarEvent, ConversationThread, Message, MessageLink, NewsCategory, NewsItem};
use crate::news::{NewsClient, NewsError, NewsPage};
use crate::store::ThreadStore;

/// Shared Tokio runtime for async operations in FFI
static TOKIO_RUNTIME: OnceLock<tokio::runtime::Runtime> = OnceLock::new();

fn get_tokio_runtime() -> &'static tokio::runtime::Runtime {
    TOKIO_RUNTIME.get_or_init(|| tokio::runtime::Runtime::new().expect("Failed to create Tokio runtime"))
}

#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiThread {
    pub id: String,
    pub title: String,
    /// Unix seconds
    pub created_at: i64,
    pub last_message: Option<String>,
}

impl From<ConversationThread> for FfiThread {
    fn from(thread: ConversationThread) -> Self {
        Self {
            id: thread.id,
            title: thread.title,
            created_at: thread.created_at.timestamp(),
            last_message: thread.last_message,
        }
    }
}

#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiLink {
    pub text: String,
    pub url: String,
}

impl From<MessageLink> for FfiLink {
    fn from(link: MessageLink) -> Self {
        Self {
            text: link.text,
            url: link.url,
        }
    }
}

#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiMessage {
    pub id: String,
    pub text: String,
    pub is_user: bool,
    /// Unix seconds
    pub created_at: i64,
    pub links: Vec<FfiLink>,
}

impl From<Message> for FfiMessage {
    fn from(message: Message) -> Self {
        Self {
            id: message.id,
            text: message.text,
            is_user: message.is_user,
            created_at: message.created_at.timestamp(),
            links: message.links.into_iter().map(FfiLink::from).collect(),
        }
    }
}

#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiCalendarEvent {
    /// `YYYY-MM-DD`
    pub date: String,
    pub title: String,
    pub description: String,
    /// `FOMC`, `earnings`, `economic` or `other`
    pub event_type: String,
}

impl From<&CalendarEvent> for FfiCalendarEvent {
    fn from(event: &CalendarEvent) -> Self {
        Self {
            date: event.date.format("%Y-%m-%d").to_string(),
            title: event.title.to_string(),
            description: event.description.to_string(),
            event_type: event.event_type.as_str().to_string(),
        }
    }
}

#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiNewsCategory {
    pub id: String,
    pub label: String,
}

impl From<NewsCategory> for FfiNewsCategory {
    fn from(category: NewsCategory) -> Self {
        Self {
            id: category.id().to_string(),
            label: category.label().to_string(),
        }
    }
}

#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiNewsItem {
    pub id: String,
    pub title: String,
    pub summary: String,
    pub source: String,
    pub date: String,
    pub image_url: String,
    /// Category id
    pub category: String,
    pub url: String,
}

impl From<NewsItem> for FfiNewsItem {
    fn from(item: NewsItem) -> Self {
        Self {
            id: item.id,
            title: item.title,
            summary: item.summary,
            source: item.source,
            date: item.date,
            image_url: item.image_url,
            category: item.category.id().to_string(),
            url: item.url,
        }
    }
}

#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiNewsPage {
    pub items: Vec<FfiNewsItem>,
    pub next_page: Option<u32>,
}

impl From<NewsPage> for FfiNewsPage {
    fn from(page: NewsPage) -> Self {
        Self {
            items: page.items.into_iter().map(FfiNewsItem::from).collect(),
            next_page: page.next_page,
        }
    }
}

/// Errors surfaced to the mobile front-end.
#[derive(Debug, thiserror::Error, uniffi::Error)]
pub enum StockGptError {
    #[error("Core not initialized")]
    CoreNotInitialized,
    #[error("Another chat operation is in progress")]
    Busy,
    #[error("Invalid argument: {message}")]
    InvalidArgument { message: String },
    #[error("Missing configuration: {message}")]
    MissingConfiguration { message: String },
    #[error("Rate limit exceeded: {message}")]
    RateLimited { message: String },
    #[error("Thread not found: {thread_id}")]
    ThreadNotFound { thread_id: String },
    #[error("No reply: {message}")]
    NoReply { message: String },
    #[error("{message}")]
    NewsNotFound { message: String },
    #[error("Network error: {message}")]
    Network { message: String },
    #[error("Cancelled")]
    Cancelled,
    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl From<ConversationError> for StockGptError {
    fn from(err: ConversationError) -> Self {
        match err {
            ConversationError::Network(message) => StockGptError::Network { message },
            ConversationError::RateLimitExceeded(message) => StockGptError::RateLimited { message },
            ConversationError::ThreadNotFound(thread_id) => StockGptError::ThreadNotFound { thread_id },
            ConversationError::Cancelled => StockGptError::Cancelled,
            ConversationError::MissingCredentials(what) => StockGptError::MissingConfiguration {
                message: what.to_string(),
            },
            ConversationError::Storage(e) => StockGptError::Internal { message: e.to_string() },
            e @ (ConversationError::RunFailed(_)
            | ConversationError::RunExpired
            | ConversationError::RunTimedOut(_)) => StockGptError::NoReply { message: e.to_string() },
        }
    }
}

impl From<NewsError> for StockGptError {
    fn from(err: NewsError) -> Self {
        match err {
            NewsError::NotFound => StockGptError::NewsNotFound { message: err.to_string() },
            NewsError::MissingApiKey => StockGptError::MissingConfiguration { message: err.to_string() },
            e @ (NewsError::Network(_) | NewsError::Http { .. } | NewsError::Decode(_)) => {
                StockGptError::Network { message: e.to_string() }
            }
        }
    }
}

/// Core Stock GPT functionality exposed to foreign languages.
///
/// UniFFI objects are shared behind `Arc`, so all state uses interior
/// mutability.
#[derive(uniffi::Object)]
pub struct StockGptCore {
    initialized: AtomicBool,
    /// Settings the clients were last built from
    config: RwLock<Option<CoreConfig>>,
    conversation: RwLock<Option<Arc<Conversation<AssistantClient>>>>,
    news: RwLock<Option<Arc<NewsClient>>>,
    /// What the chat screen renders
    session: Mutex<ChatSession>,
    /// Held for the duration of any chat operation
    chat_lock: Mutex<()>,
    /// Token of the in-flight send, if any
    pending: Mutex<Option<CancellationToken>>,
}

#[uniffi::export]
impl StockGptCore {
    #[uniffi::constructor]
    pub fn new() -> Self {
        Self {
            initialized: AtomicBool::new(false),
            config: RwLock::new(None),
            conversation: RwLock::new(None),
            news: RwLock::new(None),
            session: Mutex::new(ChatSession::new()),
            chat_lock: Mutex::new(()),
            pending: Mutex::new(None),
        }
    }

    /// Initialize the core with the app's data directory.
    ///
    /// Credentials come from `STOCKGPT_*` environment variables or the OS
    /// keychain. The most recent conversation is restored (or a new one
    /// started); if that fails the core still initializes and the first send
    /// starts a conversation. Calling this again is a no-op.
    pub fn init(&self, data_dir: String) -> Result<(), StockGptError> {
        if self.initialized.load(Ordering::SeqCst) {
            return Ok(());
        }

        crate::tracing_setup::init_tracing();

        let data_dir = PathBuf::from(data_dir);
        std::fs::create_dir_all(&data_dir).map_err(|e| StockGptError::Internal {
            message: format!("Failed to create data directory {}: {}", data_dir.display(), e),
        })?;

        self.start(CoreConfig::from_env(&data_dir));
        Ok(())
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized.load(Ordering::SeqCst)
    }
}

impl Default for StockGptCore {
    fn default() -> Self {
        Self::new()
    }
}

impl StockGptCore {
    fn start(&self, config: CoreConfig) {
        let conversation = self.install_clients(&config);

        let mut session = ChatSession::new();
        if let Err(e) = get_tokio_runtime().block_on(conversation.initialize(&mut session)) {
            tracing::warn!("ffi: could not restore a conversation: {}", e);
        }

        *self.session.lock() = session;
        tracing::info!("ffi: initialized with data dir {}", config.data_dir.display());
        *self.config.write() = Some(config);
        self.initialized.store(true, Ordering::SeqCst);
    }

    /// Build fresh service clients. An operation already running keeps the
    /// clients it started with.
    fn install_clients(&self, config: &CoreConfig) -> Arc<Conversation<AssistantClient>> {
        let conversation = Arc::new(Conversation::new(
            AssistantClient::new(&config.assistant),
            ThreadStore::new(&config.data_dir),
        ));
        *self.conversation.write() = Some(conversation.clone());
        *self.news.write() = Some(Arc::new(NewsClient::new(&config.news)));
        conversation
    }

    fn conversation(&self) -> Result<Arc<Conversation<AssistantClient>>, StockGptError> {
        self.conversation
            .read()
            .clone()
            .ok_or(StockGptError::CoreNotInitialized)
    }

    fn news_client(&self) -> Result<Arc<NewsClient>, StockGptError> {
        self.news.read().clone().ok_or(StockGptError::CoreNotInitialized)
    }
}

#[cfg(test)]
fn test_config(api_base: &str, data_dir: &std::path::Path, api_key: Option<&str>) -> CoreConfig {
    let mut config = CoreConfig::new(data_dir);
    config.assistant.api_base = api_base.to_string();
    config.assistant.api_key = api_key.map(str::to_string);
    config.assistant.assistant_id = Some("asst_stock".to_string());
    config
}
