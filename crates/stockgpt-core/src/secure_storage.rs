/// Secure storage for API credentials
///
/// Uses OS-backed secure storage:
/// - macOS/iOS: Keychain
/// - Linux: Secret Service API (gnome-keyring, KWallet, etc.)
/// - Windows: Credential Manager
use keyring::Entry;
use std::fmt;

const SERVICE_NAME: &str = "com.stockgpt.app";

#[derive(Debug, Clone, Copy, PartialEq, Eq, uniffi::Enum)]
pub enum SecureKey {
    OpenAiApiKey,
    AssistantId,
    NewsApiKey,
}

impl SecureKey {
    fn key_name(&self) -> &'static str {
        match self {
            SecureKey::OpenAiApiKey => "openai_api_key",
            SecureKey::AssistantId => "assistant_id",
            SecureKey::NewsApiKey => "news_api_key",
        }
    }
}

impl fmt::Display for SecureKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.key_name())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum SecureStorageError {
    #[error("Keyring error: {0}")]
    Keyring(#[from] keyring::Error),

    #[error("Key not found: {0}")]
    KeyNotFound(SecureKey),
}

pub struct SecureStorage;

impl SecureStorage {
    /// Store a secret value in secure storage
    pub fn set(key: SecureKey, value: &str) -> Result<(), SecureStorageError> {
        let entry = Entry::new(SERVICE_NAME, key.key_name())?;
        entry.set_password(value)?;
        Ok(())
    }

    /// Retrieve a secret value from secure storage
    pub fn get(key: SecureKey) -> Result<String, SecureStorageError> {
        let entry = Entry::new(SERVICE_NAME, key.key_name())?;
        match entry.get_password() {
            Ok(value) => Ok(value),
            Err(keyring::Error::NoEntry) => Err(SecureStorageError::KeyNotFound(key)),
            Err(e) => Err(SecureStorageError::Keyring(e)),
        }
    }

    /// Delete a secret value from secure storage
    pub fn delete(key: SecureKey) -> Result<(), SecureStorageError> {
        let entry = Entry::new(SERVICE_NAME, key.key_name())?;
        match entry.delete_credential() {
            Ok(()) => Ok(()),
            Err(keyring::Error::NoEntry) => Ok(()), // Already deleted is success
            Err(e) => Err(SecureStorageError::Keyring(e)),
        }
    }

    /// Check if a key exists in secure storage
    pub fn exists(key: SecureKey) -> bool {
        Self::get(key).is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_names_are_distinct() {
        let names = [
            SecureKey::OpenAiApiKey.to_string(),
            SecureKey::AssistantId.to_string(),
            SecureKey::NewsApiKey.to_string(),
        ];
        assert_eq!(names[0], "openai_api_key");
        assert_eq!(names[1], "assistant_id");
        assert_eq!(names[2], "news_api_key");
    }

    #[test]
    fn test_key_not_found_message() {
        let err = SecureStorageError::KeyNotFound(SecureKey::NewsApiKey);
        assert_eq!(err.to_string(), "Key not found: news_api_key");
    }

    #[test]
    #[ignore] // Requires an OS keyring
    fn test_secure_storage_roundtrip() {
        let test_key = SecureKey::NewsApiKey;
        let _ = SecureStorage::delete(test_key);
        assert!(!SecureStorage::exists(test_key));

        SecureStorage::set(test_key, "test_news_key").expect("Failed to set value");
        assert_eq!(
            SecureStorage::get(test_key).expect("Failed to get value"),
            "test_news_key"
        );

        SecureStorage::delete(test_key).expect("Failed to delete value");
        assert!(!SecureStorage::exists(test_key));
    }
}
