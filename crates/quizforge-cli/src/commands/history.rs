//! The `quizforge history` command: list past quizzes and progress.

use std::path::PathBuf;

use anyhow::Result;
use comfy_table::{Cell, Table};

use quizforge_core::stats::{percentage, ProgressStats};

use super::open_store;
use quizforge_providers::load_config_from;

pub fn execute(config_path: Option<PathBuf>, data_dir: Option<PathBuf>) -> Result<()> {
    let config = load_config_from(config_path.as_deref())?;
    let history = open_store(&config, data_dir);

    let entries = history.list();
    if entries.is_empty() {
        println!("No quiz history yet. Run `quizforge start` to take your first quiz.");
        return Ok(());
    }

    let mut table = Table::new();
    table.set_header(vec!["#", "Date", "Topics", "Types", "Score", "Time"]);
    for (index, summary) in entries.iter().enumerate() {
        let types = summary
            .question_types
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(", ");
        table.add_row(vec![
            Cell::new(index + 1),
            Cell::new(summary.date.format("%Y-%m-%d %H:%M")),
            Cell::new(summary.topics.join(", ")),
            Cell::new(types),
            Cell::new(format!(
                "{}/{} ({}%)",
                summary.score,
                summary.total_questions,
                percentage(summary)
            )),
            Cell::new(format_time(summary.time_taken_ms)),
        ]);
    }
    println!("{table}");

    let stats = ProgressStats::from_history(&entries);
    println!(
        "\nCompleted: {}   Average: {}%   Best: {}%   Trend: {}",
        stats.completed,
        stats.average_pct,
        stats.highest_pct,
        stats.trend.label()
    );

    Ok(())
}

fn format_time(ms: u64) -> String {
    let secs = ms / 1000;
    format!("{}m {:02}s", secs / 60, secs % 60)
}
