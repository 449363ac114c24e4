use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::constants::THREAD_TITLE_MAX_CHARS;

/// A conversation with the assistant, as remembered on this device.
///
/// The id is issued by the assistant service and treated as opaque. The
/// message history itself lives on the service; only the metadata needed to
/// list and reopen conversations is persisted locally.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationThread {
    pub id: String,
    /// Empty until the first message is sent
    pub title: String,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_message: Option<String>,
}

impl ConversationThread {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: String::new(),
            created_at: Utc::now(),
            last_message: None,
        }
    }

    pub fn has_title(&self) -> bool {
        !self.title.trim().is_empty()
    }

    /// Record a user message: sets the title on first use and the preview text.
    pub fn record_user_message(&mut self, text: &str) {
        if !self.has_title() {
            self.title = derive_title(text);
        }
        self.last_message = Some(text.to_string());
    }
}

/// Derive a thread title from message text (first line, truncated)
pub fn derive_title(text: &str) -> String {
    text.lines()
        .map(str::trim)
        .find(|line| !line.is_empty())
        .unwrap_or("")
        .chars()
        .take(THREAD_TITLE_MAX_CHARS)
        .collect::<String>()
        .trim()
        .to_string()
}
