//! The `quizforge start` command.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{anyhow, ensure, Result};

use quizforge_core::engine::QuizEngine;
use quizforge_core::model::{QuestionKind, QuizSettings};
use quizforge_providers::{create_service, load_config_from};

use super::{open_store, session};

pub async fn execute(
    topics: String,
    types: String,
    count: Option<u32>,
    time_limit: Option<u32>,
    config_path: Option<PathBuf>,
    data_dir: Option<PathBuf>,
) -> Result<()> {
    let config = load_config_from(config_path.as_deref())?;
    let history = open_store(&config, data_dir);

    let topics = parse_topics(&topics);
    let question_types = parse_question_types(&types)?;
    let question_count = count.unwrap_or(config.default_question_count);
    let minutes = time_limit.unwrap_or_else(|| history.preferences().default_time_limit_minutes);
    ensure!(minutes >= 1, "time limit must be at least one minute");

    let settings = QuizSettings {
        topics,
        question_types,
        question_count,
        time_limit: Duration::from_secs(u64::from(minutes) * 60),
    };
    tracing::debug!(
        count = settings.question_count,
        minutes,
        "resolved quiz settings"
    );

    let service = create_service(&config)?;
    let mut engine = QuizEngine::new(Arc::from(service), history);

    println!("Generating questions...");
    engine.start_quiz(settings).await?;
    session::run_quiz(&mut engine).await
}

/// Split a comma-separated topic list, dropping empty segments.
pub(super) fn parse_topics(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|part| part.trim().to_string())
        .filter(|part| !part.is_empty())
        .collect()
}

/// Parse a comma-separated question-type list ("mcq,coding,theory").
pub(super) fn parse_question_types(raw: &str) -> Result<Vec<QuestionKind>> {
    raw.split(',')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(|part| part.parse::<QuestionKind>().map_err(|e| anyhow!(e)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn topics_are_split_and_trimmed() {
        assert_eq!(
            parse_topics("dsa, javascript ,,react"),
            vec!["dsa", "javascript", "react"]
        );
        assert!(parse_topics(" , ").is_empty());
    }

    #[test]
    fn question_types_parse_with_aliases() {
        let kinds = parse_question_types("mcq, coding, open-ended").unwrap();
        assert_eq!(
            kinds,
            vec![
                QuestionKind::MultipleChoice,
                QuestionKind::Coding,
                QuestionKind::OpenEnded
            ]
        );
    }

    #[test]
    fn unknown_question_type_is_rejected() {
        let err = parse_question_types("mcq,riddle").unwrap_err();
        assert!(err.to_string().contains("riddle"));
    }
}
