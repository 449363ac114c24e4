use std::path::{Path, PathBuf};

use crate::constants::{ASSISTANT_API_BASE, NEWS_API_BASE, NEWS_LANGUAGE};
use crate::secure_storage::{SecureKey, SecureStorage};

/// Connection settings for the hosted assistant service.
#[derive(Debug, Clone)]
pub struct AssistantConfig {
    pub api_base: String,
    pub api_key: Option<String>,
    pub assistant_id: Option<String>,
}

impl Default for AssistantConfig {
    fn default() -> Self {
        Self {
            api_base: ASSISTANT_API_BASE.to_string(),
            api_key: None,
            assistant_id: None,
        }
    }
}

/// Connection settings for the news search service.
#[derive(Debug, Clone)]
pub struct NewsConfig {
    pub api_base: String,
    pub api_key: Option<String>,
    pub language: String,
}

impl Default for NewsConfig {
    fn default() -> Self {
        Self {
            api_base: NEWS_API_BASE.to_string(),
            api_key: None,
            language: NEWS_LANGUAGE.to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct CoreConfig {
    pub data_dir: PathBuf,
    pub assistant: AssistantConfig,
    pub news: NewsConfig,
}

impl CoreConfig {
    pub fn new<P: AsRef<Path>>(data_dir: P) -> Self {
        Self {
            data_dir: data_dir.as_ref().to_path_buf(),
            assistant: AssistantConfig::default(),
            news: NewsConfig::default(),
        }
    }

    /// Build a config from `STOCKGPT_*` environment variables.
    ///
    /// API keys that are not set in the environment are looked up in the OS
    /// secure storage. Missing keys are left as `None`; the client that needs
    /// them reports the problem when it is first used.
    pub fn from_env<P: AsRef<Path>>(data_dir: P) -> Self {
        let mut config = Self::new(data_dir);

        if let Some(base) = env_var("STOCKGPT_OPENAI_API_BASE") {
            config.assistant.api_base = base;
        }
        if let Some(base) = env_var("STOCKGPT_NEWS_API_BASE") {
            config.news.api_base = base;
        }

        for key in [SecureKey::OpenAiApiKey, SecureKey::AssistantId, SecureKey::NewsApiKey] {
            let value = env_var(credential_env_var(key)).or_else(|| stored_secret(key));
            *config.credential_mut(key) = value;
        }

        config
    }

    /// Replace one credential. `None` falls back to its environment variable.
    pub fn set_credential(&mut self, key: SecureKey, value: Option<String>) {
        let value = value
            .filter(|v| !v.trim().is_empty())
            .or_else(|| env_var(credential_env_var(key)));
        *self.credential_mut(key) = value;
    }

    pub fn credential(&self, key: SecureKey) -> Option<&str> {
        match key {
            SecureKey::OpenAiApiKey => self.assistant.api_key.as_deref(),
            SecureKey::AssistantId => self.assistant.assistant_id.as_deref(),
            SecureKey::NewsApiKey => self.news.api_key.as_deref(),
        }
    }

    fn credential_mut(&mut self, key: SecureKey) -> &mut Option<String> {
        match key {
            SecureKey::OpenAiApiKey => &mut self.assistant.api_key,
            SecureKey::AssistantId => &mut self.assistant.assistant_id,
            SecureKey::NewsApiKey => &mut self.news.api_key,
        }
    }

    /// Path of the persisted conversation thread list.
    pub fn thread_store_path(&self) -> PathBuf {
        self.data_dir.join(crate::constants::THREAD_STORE_FILE)
    }
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self::new(default_data_dir())
    }
}

/// Get the data directory for persisted app state
pub fn default_data_dir() -> PathBuf {
    if let Some(base_dir) = env_var("STOCKGPT_BASE_DIR") {
        return PathBuf::from(base_dir);
    }
    let base = dirs::data_dir().unwrap_or_else(|| PathBuf::from("."));
    base.join("stockgpt")
}

fn env_var(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

fn credential_env_var(key: SecureKey) -> &'static str {
    match key {
        SecureKey::OpenAiApiKey => "STOCKGPT_OPENAI_API_KEY",
        SecureKey::AssistantId => "STOCKGPT_ASSISTANT_ID",
        SecureKey::NewsApiKey => "STOCKGPT_NEWS_API_KEY",
    }
}

fn stored_secret(key: SecureKey) -> Option<String> {
    match SecureStorage::get(key) {
        Ok(value) => Some(value),
        Err(e) => {
            tracing::debug!("secure storage lookup for {} failed: {}", key, e);
            None
        }
    }
}
