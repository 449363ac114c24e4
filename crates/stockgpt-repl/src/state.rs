use stockgpt_core::assistant::{AssistantClient, ChatSession, Conversation};
use stockgpt_core::models::NewsCategory;
use stockgpt_core::news::{NewsClient, NewsFeed};

pub(crate) struct ReplState {
    pub conversation: Conversation<AssistantClient>,
    pub news: NewsClient,
    pub session: ChatSession,
    pub feed: NewsFeed,
}

impl ReplState {
    pub fn new(conversation: Conversation<AssistantClient>, news: NewsClient) -> Self {
        Self {
            conversation,
            news,
            session: ChatSession::new(),
            feed: NewsFeed::new(NewsCategory::All),
        }
    }

    /// 1-based index into the stored thread list
    pub fn thread_id_at(&self, index: usize) -> Option<String> {
        index
            .checked_sub(1)
            .and_then(|i| self.conversation.threads().into_iter().nth(i))
            .map(|t| t.id)
    }
}
