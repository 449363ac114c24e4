use std::collections::HashSet;

use chrono::{DateTime, Duration, Utc};

use super::{fetch_news_page, NewsError, NewsPage, NewsSource};
use crate::constants::NEWS_STALE_SECS;
use crate::models::{NewsCategory, NewsItem};

/// Pages loaded so far for one category, as an infinite-scroll list.
#[derive(Debug, Clone)]
pub struct NewsFeed {
    category: NewsCategory,
    pages: Vec<NewsPage>,
    loaded_at: Option<DateTime<Utc>>,
}

impl NewsFeed {
    pub fn new(category: NewsCategory) -> Self {
        Self {
            category,
            pages: Vec::new(),
            loaded_at: None,
        }
    }

    pub fn category(&self) -> NewsCategory {
        self.category
    }

    /// Switch tabs. Loaded pages are dropped when the category changes.
    pub fn set_category(&mut self, category: NewsCategory) {
        if self.category != category {
            self.category = category;
            self.pages.clear();
            self.loaded_at = None;
        }
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// All loaded items in page order, first occurrence of each url only
    pub fn items(&self) -> Vec<NewsItem> {
        let mut seen = HashSet::new();
        self.pages
            .iter()
            .flat_map(|p| p.items.iter())
            .filter(|item| seen.insert(item.url.as_str()))
            .cloned()
            .collect()
    }

    pub fn has_more(&self) -> bool {
        self.next_page().is_some()
    }

    fn next_page(&self) -> Option<u32> {
        self.pages.last().and_then(|p| p.next_page)
    }

    /// Whether the first page should be fetched again
    pub fn is_stale(&self, now: DateTime<Utc>) -> bool {
        match self.loaded_at {
            Some(loaded_at) => now - loaded_at >= Duration::seconds(NEWS_STALE_SECS),
            None => true,
        }
    }

    /// Fetch page 1, replacing whatever was loaded.
    pub async fn load_first<S: NewsSource + ?Sized>(&mut self, source: &S) -> Result<(), NewsError> {
        let page = fetch_news_page(source, self.category, 1).await?;
        self.pages = vec![page];
        self.loaded_at = Some(Utc::now());
        Ok(())
    }

    /// Append the next page. Returns `false` when there is nothing more to load.
    pub async fn load_more<S: NewsSource + ?Sized>(&mut self, source: &S) -> Result<bool, NewsError> {
        if self.pages.is_empty() {
            self.load_first(source).await?;
            return Ok(true);
        }

        let Some(next) = self.next_page() else {
            return Ok(false);
        };

        let page = fetch_news_page(source, self.category, next).await?;
        tracing::debug!("news: {} page {} added {} items", self.category, next, page.items.len());
        self.pages.push(page);
        Ok(true)
    }

    pub async fn refresh<S: NewsSource + ?Sized>(&mut self, source: &S) -> Result<(), NewsError> {
        self.load_first(source).await
    }
}
