use async_trait::async_trait;
use serde::Deserialize;

use super::NewsError;
use crate::config::NewsConfig;

/// Publisher of an article
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ArticleSource {
    pub name: Option<String>,
}

/// An article as returned by the news search service
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Article {
    pub title: Option<String>,
    pub description: Option<String>,
    #[serde(default)]
    pub source: ArticleSource,
    pub published_at: Option<String>,
    pub url_to_image: Option<String>,
    pub url: String,
}

/// Response envelope from the news search service
#[derive(Debug, Deserialize)]
struct SearchResponse {
    status: String,
    #[serde(default)]
    articles: Vec<Article>,
    code: Option<String>,
    message: Option<String>,
}

impl SearchResponse {
    fn error_message(&self) -> String {
        match (&self.code, &self.message) {
            (Some(code), Some(message)) => format!("{}: {}", code, message),
            (None, Some(message)) => message.clone(),
            (Some(code), None) => code.clone(),
            (None, None) => format!("status {}", self.status),
        }
    }
}

/// Keyword search over news articles.
#[async_trait]
pub trait NewsSource: Send + Sync {
    /// One page of articles matching `query`, newest first
    async fn search(&self, query: &str, page: u32, page_size: u32) -> Result<Vec<Article>, NewsError>;
}

/// News search HTTP client
pub struct NewsClient {
    api_base: String,
    api_key: Option<String>,
    language: String,
    client: reqwest::Client,
}

impl NewsClient {
    pub fn new(config: &NewsConfig) -> Self {
        Self {
            api_base: config.api_base.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            language: config.language.clone(),
            client: reqwest::Client::new(),
        }
    }
}

#[async_trait]
impl NewsSource for NewsClient {
    async fn search(&self, query: &str, page: u32, page_size: u32) -> Result<Vec<Article>, NewsError> {
        let api_key = self.api_key.as_deref().ok_or(NewsError::MissingApiKey)?;
        let url = format!("{}/everything", self.api_base);

        tracing::debug!("news: search page {} (size {}) for {}", page, page_size, query);

        let response = self
            .client
            .get(&url)
            .query(&[
                ("q", query),
                ("language", self.language.as_str()),
                ("sortBy", "publishedAt"),
                ("page", page.to_string().as_str()),
                ("pageSize", page_size.to_string().as_str()),
                ("apiKey", api_key),
            ])
            .send()
            .await
            .map_err(|e| NewsError::Network(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| NewsError::Network(e.to_string()))?;

        let parsed: SearchResponse = match serde_json::from_str(&body) {
            Ok(parsed) => parsed,
            Err(_) if !status.is_success() => {
                return Err(NewsError::Http {
                    status: status.as_u16(),
                    message: body.trim().to_string(),
                });
            }
            Err(e) => return Err(NewsError::Decode(e.to_string())),
        };

        if parsed.status != "ok" {
            return Err(NewsError::Http {
                status: status.as_u16(),
                message: parsed.error_message(),
            });
        }

        Ok(parsed.articles)
    }
}
