use super::*;

use crate::secure_storage::{SecureKey, SecureStorage};

#[uniffi::export]
impl StockGptCore {
    /// Store a credential in the OS keychain and use it from now on.
    pub fn set_credential(&self, key: SecureKey, value: String) -> Result<(), StockGptError> {
        if !self.is_initialized() {
            return Err(StockGptError::CoreNotInitialized);
        }
        let value = value.trim();
        if value.is_empty() {
            return Err(StockGptError::InvalidArgument {
                message: format!("{} must not be empty", key),
            });
        }

        SecureStorage::set(key, value).map_err(|e| StockGptError::Internal {
            message: format!("Failed to store {}: {}", key, e),
        })?;
        self.apply_credential(key, Some(value.to_string()))
    }

    /// Remove a stored credential. Its environment variable, if set, applies again.
    pub fn clear_credential(&self, key: SecureKey) -> Result<(), StockGptError> {
        if !self.is_initialized() {
            return Err(StockGptError::CoreNotInitialized);
        }

        SecureStorage::delete(key).map_err(|e| StockGptError::Internal {
            message: format!("Failed to delete {}: {}", key, e),
        })?;
        self.apply_credential(key, None)
    }

    pub fn has_credential(&self, key: SecureKey) -> bool {
        self.config
            .read()
            .as_ref()
            .is_some_and(|config| config.credential(key).is_some())
    }
}

impl StockGptCore {
    fn apply_credential(&self, key: SecureKey, value: Option<String>) -> Result<(), StockGptError> {
        let config = {
            let mut guard = self.config.write();
            let config = guard.as_mut().ok_or(StockGptError::CoreNotInitialized)?;
            config.set_credential(key, value);
            config.clone()
        };
        self.install_clients(&config);
        tracing::info!("ffi: {} updated", key);
        Ok(())
    }
}
