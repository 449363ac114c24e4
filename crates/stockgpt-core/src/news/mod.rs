//! Paginated market news by category.

pub mod client;
pub mod feed;
pub mod query;

use std::collections::HashSet;

use chrono::Utc;

pub use client::{Article, ArticleSource, NewsClient, NewsSource};
pub use feed::NewsFeed;
pub use query::category_query;

use crate::constants::{
    NEWS_ALL_PAGE_SIZE, NEWS_FALLBACK_IMAGE_URL, NEWS_FALLBACK_SUMMARY, NEWS_NOT_FOUND_TEXT, NEWS_PAGE_SIZE,
};
use crate::models::{NewsCategory, NewsItem};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum NewsError {
    #[error("Network error: {0}")]
    Network(String),
    #[error("News API error ({status}): {message}")]
    Http { status: u16, message: String },
    #[error("Failed to decode news response: {0}")]
    Decode(String),
    #[error("{}", NEWS_NOT_FOUND_TEXT)]
    NotFound,
    #[error("News API key is not configured")]
    MissingApiKey,
}

/// One fetched page of a category
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewsPage {
    pub items: Vec<NewsItem>,
    pub next_page: Option<u32>,
}

/// Fetch page `page` (1-based) of `category`.
///
/// The `All` tab takes a couple of articles from each concrete category.
/// A category whose search fails is skipped there unless every category
/// failed, and an empty result simply ends pagination. Concrete categories
/// report `NotFound` when the service has nothing for the page.
pub async fn fetch_news_page<S: NewsSource + ?Sized>(
    source: &S,
    category: NewsCategory,
    page: u32,
) -> Result<NewsPage, NewsError> {
    let mut seen = HashSet::new();

    if category == NewsCategory::All {
        let mut items = Vec::new();
        let mut last_error = None;
        let mut failures = 0;

        for concrete in NewsCategory::CONCRETE {
            match source
                .search(category_query(concrete), page, NEWS_ALL_PAGE_SIZE)
                .await
            {
                Ok(articles) => items.extend(to_items(articles, concrete, &mut seen)),
                Err(e) => {
                    tracing::warn!("news: {} page {} failed: {}", concrete, page, e);
                    failures += 1;
                    last_error = Some(e);
                }
            }
        }

        if failures == NewsCategory::CONCRETE.len() {
            if let Some(e) = last_error {
                return Err(e);
            }
        }

        let next_page = (!items.is_empty()).then(|| page + 1);
        return Ok(NewsPage { items, next_page });
    }

    let articles = source
        .search(category_query(category), page, NEWS_PAGE_SIZE)
        .await?;
    if articles.is_empty() {
        return Err(NewsError::NotFound);
    }

    let items = to_items(articles, category, &mut seen);
    let next_page = (items.len() == NEWS_PAGE_SIZE as usize).then(|| page + 1);
    Ok(NewsPage { items, next_page })
}

fn to_items(articles: Vec<Article>, category: NewsCategory, seen: &mut HashSet<String>) -> Vec<NewsItem> {
    articles
        .into_iter()
        .filter(|a| seen.insert(a.url.clone()))
        .map(|a| to_item(a, category))
        .collect()
}

fn to_item(article: Article, category: NewsCategory) -> NewsItem {
    let slug = article
        .url
        .rsplit('/')
        .next()
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| Utc::now().timestamp_millis().to_string());

    let date = article
        .published_at
        .as_deref()
        .and_then(|p| p.split('T').next())
        .unwrap_or_default()
        .to_string();

    NewsItem {
        id: format!("{}-{}", category.id(), slug),
        title: article.title.unwrap_or_default(),
        summary: article
            .description
            .filter(|d| !d.is_empty())
            .unwrap_or_else(|| NEWS_FALLBACK_SUMMARY.to_string()),
        source: article.source.name.unwrap_or_default(),
        date,
        image_url: article
            .url_to_image
            .filter(|u| !u.is_empty())
            .unwrap_or_else(|| NEWS_FALLBACK_IMAGE_URL.to_string()),
        category,
        url: article.url,
    }
}

#[cfg(test)]
pub(crate) mod fake {
    use std::collections::HashMap;

    use async_trait::async_trait;
    use parking_lot::Mutex;

    use super::*;

    /// Serves canned articles per (query, page)
    #[derive(Default)]
    pub struct FakeNews {
        pages: Mutex<HashMap<(String, u32), Result<Vec<Article>, NewsError>>>,
        pub calls: Mutex<Vec<(String, u32, u32)>>,
    }

    impl FakeNews {
        pub fn with_page(self, category: NewsCategory, page: u32, articles: Vec<Article>) -> Self {
            self.pages
                .lock()
                .insert((category_query(category).to_string(), page), Ok(articles));
            self
        }

        pub fn with_error(self, category: NewsCategory, page: u32, err: NewsError) -> Self {
            self.pages
                .lock()
                .insert((category_query(category).to_string(), page), Err(err));
            self
        }

        pub fn call_count(&self) -> usize {
            self.calls.lock().len()
        }
    }

    #[async_trait]
    impl NewsSource for FakeNews {
        async fn search(&self, query: &str, page: u32, page_size: u32) -> Result<Vec<Article>, NewsError> {
            self.calls.lock().push((query.to_string(), page, page_size));
            self.pages
                .lock()
                .get(&(query.to_string(), page))
                .cloned()
                .unwrap_or_else(|| Ok(Vec::new()))
        }
    }

    pub fn article(url: &str) -> Article {
        Article {
            title: Some(format!("기사 {}", url)),
            description: Some("요약".to_string()),
            source: ArticleSource {
                name: Some("한국경제".to_string()),
            },
            published_at: Some("2025-03-04T07:15:00Z".to_string()),
            url_to_image: Some("https://img.example.com/a.jpg".to_string()),
            url: url.to_string(),
        }
    }

    pub fn articles(prefix: &str, count: usize) -> Vec<Article> {
        (0..count)
            .map(|i| article(&format!("https://news.example.com/{}/{}", prefix, i)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::fake::{article, articles, FakeNews};
    use super::*;

    #[tokio::test]
    async fn test_full_page_has_next_page() {
        let source = FakeNews::default().with_page(NewsCategory::UsTech, 1, articles("tech", 10));

        let page = fetch_news_page(&source, NewsCategory::UsTech, 1).await.unwrap();

        assert_eq!(page.items.len(), 10);
        assert_eq!(page.next_page, Some(2));
        assert_eq!(source.calls.lock()[0].2, 10);
    }

    #[tokio::test]
    async fn test_duplicate_urls_shorten_page() {
        let mut list = articles("kospi", 9);
        list.push(article("https://news.example.com/kospi/0"));
        let source = FakeNews::default().with_page(NewsCategory::KrKospi, 1, list);

        let page = fetch_news_page(&source, NewsCategory::KrKospi, 1).await.unwrap();

        assert_eq!(page.items.len(), 9);
        assert_eq!(page.next_page, None);
    }

    #[tokio::test]
    async fn test_empty_category_is_not_found() {
        let source = FakeNews::default();
        let err = fetch_news_page(&source, NewsCategory::KrKosdaq, 3).await.unwrap_err();
        assert_eq!(err, NewsError::NotFound);
        assert_eq!(err.to_string(), "뉴스를 찾을 수 없습니다");
    }

    #[tokio::test]
    async fn test_all_fans_out_over_concrete_categories() {
        let source = FakeNews::default()
            .with_page(NewsCategory::UsMarket, 1, articles("market", 2))
            .with_page(NewsCategory::CryptoBitcoin, 1, vec![
                article("https://news.example.com/market/0"),
                article("https://news.example.com/btc/1"),
            ]);

        let page = fetch_news_page(&source, NewsCategory::All, 1).await.unwrap();

        assert_eq!(source.call_count(), 6);
        assert!(source.calls.lock().iter().all(|(_, page, size)| *page == 1 && *size == 2));
        assert_eq!(page.items.len(), 3);
        assert_eq!(page.items[2].category, NewsCategory::CryptoBitcoin);
        assert_eq!(page.next_page, Some(2));
    }

    #[tokio::test]
    async fn test_all_with_no_items_ends_pagination() {
        let source = FakeNews::default();
        let page = fetch_news_page(&source, NewsCategory::All, 4).await.unwrap();
        assert!(page.items.is_empty());
        assert_eq!(page.next_page, None);
    }

    #[tokio::test]
    async fn test_all_skips_failing_category() {
        let source = FakeNews::default()
            .with_error(NewsCategory::UsMarket, 1, NewsError::Network("reset".to_string()))
            .with_page(NewsCategory::UsTech, 1, articles("tech", 2));

        let page = fetch_news_page(&source, NewsCategory::All, 1).await.unwrap();
        assert_eq!(page.items.len(), 2);
    }

    #[tokio::test]
    async fn test_all_fails_when_every_category_fails() {
        let mut source = FakeNews::default();
        for category in NewsCategory::CONCRETE {
            source = source.with_error(category, 1, NewsError::MissingApiKey);
        }
        let err = fetch_news_page(&source, NewsCategory::All, 1).await.unwrap_err();
        assert_eq!(err, NewsError::MissingApiKey);
    }

    #[test]
    fn test_article_mapping_and_fallbacks() {
        let item = to_item(
            Article {
                title: Some("에코프로 급등".to_string()),
                description: None,
                source: ArticleSource {
                    name: Some("매일경제".to_string()),
                },
                published_at: Some("2025-02-28T23:59:00Z".to_string()),
                url_to_image: None,
                url: "https://www.mk.co.kr/news/stock/11234567".to_string(),
            },
            NewsCategory::KrKosdaq,
        );

        assert_eq!(item.id, "kr_kosdaq-11234567");
        assert_eq!(item.summary, "내용 없음");
        assert_eq!(item.image_url, "https://picsum.photos/200/200");
        assert_eq!(item.date, "2025-02-28");
        assert_eq!(item.source, "매일경제");
    }

    #[test]
    fn test_trailing_slash_url_gets_generated_id() {
        let item = to_item(article("https://news.example.com/story/"), NewsCategory::UsMarket);
        let suffix = item.id.strip_prefix("us_market-").unwrap();
        assert!(suffix.parse::<i64>().is_ok());
    }
}
