//! Subcommand implementations.

use std::path::PathBuf;

use quizforge_core::history::HistoryStore;
use quizforge_core::store::JsonFileStore;
use quizforge_providers::QuizforgeConfig;

pub mod export;
pub mod history;
pub mod import;
pub mod init;
pub mod reset;
pub mod retry;
pub mod session;
pub mod start;

/// Open the on-disk history store, honoring a `--data-dir` override.
fn open_store(config: &QuizforgeConfig, data_dir: Option<PathBuf>) -> HistoryStore {
    let data_dir = data_dir.unwrap_or_else(|| config.data_dir.clone());
    tracing::debug!(data_dir = %data_dir.display(), "opening data directory");
    HistoryStore::new(Box::new(JsonFileStore::new(data_dir)))
}
