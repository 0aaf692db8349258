//! The `quizforge export` command: write user data to a JSON file.

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};

use super::open_store;
use quizforge_providers::load_config_from;

pub fn execute(
    output: Option<PathBuf>,
    config_path: Option<PathBuf>,
    data_dir: Option<PathBuf>,
) -> Result<()> {
    let config = load_config_from(config_path.as_deref())?;
    let history = open_store(&config, data_dir);

    let json = history.export_user_data()?;
    let path = output.unwrap_or_else(|| {
        PathBuf::from(format!(
            "quizforge-export-{}.json",
            chrono::Utc::now().format("%Y-%m-%d")
        ))
    });
    fs::write(&path, &json).with_context(|| format!("failed to write {}", path.display()))?;
    println!("Exported user data to {}", path.display());

    Ok(())
}
