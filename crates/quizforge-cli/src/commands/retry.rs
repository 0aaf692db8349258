//! The `quizforge retry` command: retake a past quiz.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{ensure, Result};

use quizforge_core::engine::{retry_settings, QuizEngine};
use quizforge_providers::{create_service, load_config_from};

use super::{open_store, session};

pub async fn execute(
    entry: usize,
    config_path: Option<PathBuf>,
    data_dir: Option<PathBuf>,
) -> Result<()> {
    let config = load_config_from(config_path.as_deref())?;
    let history = open_store(&config, data_dir);

    let entries = history.list();
    ensure!(!entries.is_empty(), "history is empty; nothing to retry");
    ensure!(
        (1..=entries.len()).contains(&entry),
        "history entry {entry} is out of range (1..={})",
        entries.len()
    );

    let summary = &entries[entry - 1];
    let settings = retry_settings(summary);
    println!(
        "Retaking the quiz from {}: {} questions on {}",
        summary.date.format("%Y-%m-%d %H:%M"),
        settings.question_count,
        settings.topics.join(", ")
    );

    let service = create_service(&config)?;
    let mut engine = QuizEngine::new(Arc::from(service), history);

    println!("Generating questions...");
    engine.start_quiz(settings).await?;
    session::run_quiz(&mut engine).await
}
