//! The `quizforge reset` command: delete all stored user data.

use std::path::PathBuf;

use anyhow::{bail, Result};

use super::open_store;
use quizforge_providers::load_config_from;

pub fn execute(yes: bool, config_path: Option<PathBuf>, data_dir: Option<PathBuf>) -> Result<()> {
    if !yes {
        bail!("this deletes all history, topic coverage, and preferences; rerun with --yes to confirm");
    }

    let config = load_config_from(config_path.as_deref())?;
    let history = open_store(&config, data_dir);

    history.clear_all()?;
    println!("Cleared quiz history, covered topics, and preferences.");

    Ok(())
}
