//! Application-wide constants
//!
//! Centralized location for endpoints, storage keys and user-facing copy
//! that are used across multiple modules.

/// Default Assistants API base URL
pub const ASSISTANT_API_BASE: &str = "https://api.openai.com/v1";

/// Default news search API base URL
pub const NEWS_API_BASE: &str = "https://newsapi.org/v2";

/// Language filter passed to the news search API
pub const NEWS_LANGUAGE: &str = "ko";

/// File name (storage key) of the persisted conversation thread list
pub const THREAD_STORE_FILE: &str = "conversation_threads.json";

// Thread defaults
/// Maximum number of characters kept when deriving a thread title from a message
pub const THREAD_TITLE_MAX_CHARS: usize = 30;

/// Number of messages fetched when restoring a thread's history
pub const HISTORY_FETCH_LIMIT: u32 = 100;

// Run polling
pub const RUN_POLL_INTERVAL_MS: u64 = 1000;
pub const RUN_POLL_MAX_ATTEMPTS: u32 = 30;

// Rate-limit backoff
pub const RATE_LIMIT_MAX_RETRIES: u32 = 3;
pub const RATE_LIMIT_BASE_DELAY_MS: u64 = 2000;

// News feed
pub const NEWS_PAGE_SIZE: u32 = 10;
/// Page size used per category when the "all" feed fans out across categories
pub const NEWS_ALL_PAGE_SIZE: u32 = 2;
/// Feed data older than this is refetched on the next view (5 minutes)
pub const NEWS_STALE_SECS: i64 = 5 * 60;
pub const NEWS_FALLBACK_SUMMARY: &str = "내용 없음";
pub const NEWS_FALLBACK_IMAGE_URL: &str = "https://picsum.photos/200/200";

// User-facing copy
pub const ERROR_REPLY_TEXT: &str = "죄송합니다. 응답을 받지 못했습니다. 잠시 후 다시 시도해 주세요.";
pub const RATE_LIMIT_REPLY_TEXT: &str =
    "요청이 너무 많습니다. 잠시 후 다시 시도해 주세요.";
pub const NEWS_NOT_FOUND_TEXT: &str = "뉴스를 찾을 수 없습니다";
