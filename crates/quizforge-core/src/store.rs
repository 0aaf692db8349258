//! Durable key-value storage.
//!
//! Everything the system persists lives under one of three typed keys;
//! there is no string-keyed ambient storage. A key that was never written
//! reads as `None`, which callers treat as the valid initial state.

use std::collections::HashMap;
use std::fmt;
use std::fs;
use std::io;
use std::path::PathBuf;
use std::sync::Mutex;

use thiserror::Error;

/// The three storage slots quizforge persists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StoreKey {
    /// Completed-quiz summaries, most recent first.
    QuizHistory,
    /// Per-topic completed-quiz counts.
    CoveredTopics,
    /// User preferences.
    Preferences,
}

impl StoreKey {
    /// File name used by [`JsonFileStore`].
    pub fn file_name(&self) -> &'static str {
        match self {
            StoreKey::QuizHistory => "quiz_history.json",
            StoreKey::CoveredTopics => "covered_topics.json",
            StoreKey::Preferences => "preferences.json",
        }
    }
}

impl fmt::Display for StoreKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreKey::QuizHistory => write!(f, "quiz_history"),
            StoreKey::CoveredTopics => write!(f, "covered_topics"),
            StoreKey::Preferences => write!(f, "preferences"),
        }
    }
}

/// Errors from the durable store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Reading a key failed for a reason other than absence.
    #[error("failed to read {key}: {source}")]
    Read {
        key: StoreKey,
        source: io::Error,
    },

    /// Writing a key failed.
    #[error("failed to write {key}: {source}")]
    Write {
        key: StoreKey,
        source: io::Error,
    },

    /// A value could not be serialized to JSON.
    #[error("failed to encode {0}: {1}")]
    Encode(String, #[source] serde_json::Error),

    /// An imported document failed validation; nothing was applied.
    #[error("import rejected: {0}")]
    ImportRejected(String),
}

/// The durable get/set contract the history layer builds on.
pub trait KeyValueStore: Send + Sync {
    /// Read the raw JSON payload stored under `key`, if any.
    fn get(&self, key: StoreKey) -> Result<Option<String>, StoreError>;

    /// Replace the payload stored under `key`.
    fn set(&self, key: StoreKey, value: &str) -> Result<(), StoreError>;

    /// Delete the payload stored under `key`. Deleting an absent key is
    /// not an error.
    fn remove(&self, key: StoreKey) -> Result<(), StoreError>;
}

/// File-backed store: one JSON file per key under a data directory.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    data_dir: PathBuf,
}

impl JsonFileStore {
    /// Store rooted at `data_dir`. The directory is created on the first
    /// write, not here.
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    fn path_for(&self, key: StoreKey) -> PathBuf {
        self.data_dir.join(key.file_name())
    }
}

impl KeyValueStore for JsonFileStore {
    fn get(&self, key: StoreKey) -> Result<Option<String>, StoreError> {
        match fs::read_to_string(self.path_for(key)) {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(StoreError::Read { key, source: e }),
        }
    }

    fn set(&self, key: StoreKey, value: &str) -> Result<(), StoreError> {
        fs::create_dir_all(&self.data_dir).map_err(|e| StoreError::Write { key, source: e })?;
        fs::write(self.path_for(key), value).map_err(|e| StoreError::Write { key, source: e })
    }

    fn remove(&self, key: StoreKey) -> Result<(), StoreError> {
        match fs::remove_file(self.path_for(key)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(StoreError::Write { key, source: e }),
        }
    }
}

/// In-memory store for tests.
#[derive(Debug, Default)]
pub struct MemoryStore {
    data: Mutex<HashMap<StoreKey, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: StoreKey) -> Result<Option<String>, StoreError> {
        Ok(self.data.lock().unwrap().get(&key).cloned())
    }

    fn set(&self, key: StoreKey, value: &str) -> Result<(), StoreError> {
        self.data.lock().unwrap().insert(key, value.to_string());
        Ok(())
    }

    fn remove(&self, key: StoreKey) -> Result<(), StoreError> {
        self.data.lock().unwrap().remove(&key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_store_missing_key_reads_none() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path());
        assert!(store.get(StoreKey::QuizHistory).unwrap().is_none());
    }

    #[test]
    fn file_store_set_get_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path());

        store.set(StoreKey::Preferences, r#"{"theme":"dark"}"#).unwrap();
        assert_eq!(
            store.get(StoreKey::Preferences).unwrap().as_deref(),
            Some(r#"{"theme":"dark"}"#)
        );
        assert!(dir.path().join("preferences.json").exists());
    }

    #[test]
    fn file_store_creates_data_dir_on_write() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("a").join("b");
        let store = JsonFileStore::new(&nested);

        store.set(StoreKey::CoveredTopics, "{}").unwrap();
        assert!(nested.join("covered_topics.json").exists());
    }

    #[test]
    fn file_store_remove_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path());

        store.set(StoreKey::QuizHistory, "[]").unwrap();
        store.remove(StoreKey::QuizHistory).unwrap();
        store.remove(StoreKey::QuizHistory).unwrap();
        assert!(store.get(StoreKey::QuizHistory).unwrap().is_none());
    }

    #[test]
    fn memory_store_roundtrip() {
        let store = MemoryStore::new();
        assert!(store.get(StoreKey::QuizHistory).unwrap().is_none());

        store.set(StoreKey::QuizHistory, "[]").unwrap();
        assert_eq!(store.get(StoreKey::QuizHistory).unwrap().as_deref(), Some("[]"));

        store.remove(StoreKey::QuizHistory).unwrap();
        assert!(store.get(StoreKey::QuizHistory).unwrap().is_none());
    }

    #[test]
    fn keys_map_to_distinct_files() {
        let names: std::collections::HashSet<_> = [
            StoreKey::QuizHistory,
            StoreKey::CoveredTopics,
            StoreKey::Preferences,
        ]
        .iter()
        .map(|k| k.file_name())
        .collect();
        assert_eq!(names.len(), 3);
    }
}
