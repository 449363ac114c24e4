//! Persisted list of conversation threads.
//!
//! The whole list is one JSON blob under a fixed file name in the data
//! directory, ordered most-recent-first. Losing it only loses the thread
//! list (the conversations themselves live on the assistant service), so
//! reads degrade to an empty list instead of failing.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::constants::THREAD_STORE_FILE;
use crate::models::ConversationThread;

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("Failed to read threads: {0}")]
    Read(String),
    #[error("Failed to parse threads: {0}")]
    Parse(String),
    #[error("Failed to save threads: {0}")]
    Write(String),
}

#[derive(Debug, Clone)]
pub struct ThreadStore {
    path: PathBuf,
}

impl ThreadStore {
    pub fn new(data_dir: &Path) -> Self {
        Self {
            path: data_dir.join(THREAD_STORE_FILE),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the thread list, most recent first.
    ///
    /// A missing file is an empty list. Read or parse failures are logged
    /// and also yield an empty list.
    pub fn load(&self) -> Vec<ConversationThread> {
        match self.try_load() {
            Ok(threads) => threads,
            Err(e) => {
                tracing::warn!("thread_store: {} ({}), starting empty", e, self.path.display());
                Vec::new()
            }
        }
    }

    /// Like [`load`](Self::load) but reports why the list could not be read.
    pub fn try_load(&self) -> Result<Vec<ConversationThread>, StorageError> {
        let contents = match fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(StorageError::Read(e.to_string())),
        };

        serde_json::from_str(&contents).map_err(|e| StorageError::Parse(e.to_string()))
    }

    /// Replace the stored list.
    ///
    /// Writes to a temp file and renames it over the old one so an
    /// interrupted write never leaves a truncated list behind.
    pub fn save(&self, threads: &[ConversationThread]) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|e| StorageError::Write(e.to_string()))?;
        }

        let json = serde_json::to_string_pretty(threads)
            .map_err(|e| StorageError::Write(e.to_string()))?;

        let temp_file = self.path.with_extension("json.tmp");
        fs::write(&temp_file, json).map_err(|e| StorageError::Write(e.to_string()))?;
        fs::rename(&temp_file, &self.path).map_err(|e| StorageError::Write(e.to_string()))?;

        Ok(())
    }

    pub fn get(&self, id: &str) -> Option<ConversationThread> {
        self.load().into_iter().find(|t| t.id == id)
    }

    /// Insert or replace `thread` and move it to the front of the list.
    pub fn upsert_front(&self, thread: ConversationThread) -> Result<Vec<ConversationThread>, StorageError> {
        let mut threads = self.load();
        threads.retain(|t| t.id != thread.id);
        threads.insert(0, thread);
        self.save(&threads)?;
        Ok(threads)
    }

    /// Remove a thread by id. Returns the remaining list; removing an unknown
    /// id leaves the file untouched.
    pub fn remove(&self, id: &str) -> Result<Vec<ConversationThread>, StorageError> {
        let mut threads = self.load();
        let before = threads.len();
        threads.retain(|t| t.id != id);
        if threads.len() != before {
            self.save(&threads)?;
        }
        Ok(threads)
    }
}
