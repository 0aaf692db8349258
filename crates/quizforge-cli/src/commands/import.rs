//! The `quizforge import` command: restore user data from an export file.

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};

use super::open_store;
use quizforge_providers::load_config_from;

pub fn execute(
    input: PathBuf,
    config_path: Option<PathBuf>,
    data_dir: Option<PathBuf>,
) -> Result<()> {
    let config = load_config_from(config_path.as_deref())?;
    let history = open_store(&config, data_dir);

    let json = fs::read_to_string(&input)
        .with_context(|| format!("failed to read {}", input.display()))?;
    let data = history.import_user_data(&json)?;
    println!(
        "Imported {} history entries and {} covered topics; preferences replaced.",
        data.history.len(),
        data.covered_topics.len()
    );

    Ok(())
}
