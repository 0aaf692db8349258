//! Interactive quiz session loop shared by `start` and `retry`.
//!
//! Reads answers and navigation commands from stdin while a countdown
//! task watches the clock; whichever finishes first submits the quiz.

use std::time::Duration;

use anyhow::{anyhow, Result};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;

use quizforge_core::countdown::Countdown;
use quizforge_core::engine::QuizEngine;
use quizforge_core::model::{QuestionPayload, QuizOutcome};
use quizforge_core::session::QuizSession;

/// Drive one quiz from the first question to the results table.
///
/// Returns without grading when the user quits; every other exit path
/// (explicit `submit`, end of input, timer expiry) submits the session.
pub async fn run_quiz(engine: &mut QuizEngine) -> Result<()> {
    let (session_id, remaining) = {
        let session = active(engine)?;
        print_intro(session);
        print_question(session);
        (session.id, session.remaining_time())
    };

    let (expiry_tx, mut expiry_rx) = mpsc::channel(1);
    let _countdown = Countdown::start(session_id, remaining, expiry_tx);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    let outcome = loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else {
                    // End of input submits whatever has been answered.
                    println!();
                    break engine.submit().await?;
                };
                match line.trim() {
                    "" => {}
                    "n" | "next" => {
                        if engine.advance()?.is_some() {
                            print_question(active(engine)?);
                        } else {
                            println!("Already at the last question.");
                        }
                    }
                    "p" | "prev" => {
                        if engine.retreat()?.is_some() {
                            print_question(active(engine)?);
                        } else {
                            println!("Already at the first question.");
                        }
                    }
                    "time" => {
                        let remaining = active(engine)?.remaining_time();
                        println!("Time remaining: {}", format_duration(remaining));
                    }
                    "help" => print_help(),
                    "submit" => break engine.submit().await?,
                    "quit" => {
                        println!("Quiz abandoned; nothing was recorded.");
                        return Ok(());
                    }
                    answer => {
                        engine.answer_current(answer)?;
                        if engine.advance()?.is_some() {
                            println!("Answer recorded.");
                            print_question(active(engine)?);
                        } else {
                            println!(
                                "Answer recorded. This was the last question; type `submit` to finish."
                            );
                        }
                    }
                }
            }
            Some(expired) = expiry_rx.recv() => {
                if expired == session_id {
                    println!("\nTime is up! Submitting your quiz.");
                    break engine.submit().await?;
                }
            }
        }
    };

    print_results(active(engine)?, &outcome);
    Ok(())
}

fn active(engine: &QuizEngine) -> Result<&QuizSession> {
    engine
        .session()
        .ok_or_else(|| anyhow!("no active quiz session"))
}

fn print_intro(session: &QuizSession) {
    let settings = &session.settings;
    println!(
        "Starting quiz: {} questions on {} ({} minute limit)",
        session.questions().len(),
        settings.topics.join(", "),
        settings.time_limit.as_secs() / 60,
    );
    println!("Type an answer to record it and move on, or a command:");
    println!("  n(ext), p(rev), time, submit, quit, help");
    println!();
}

fn print_question(session: &QuizSession) {
    let index = session.cursor();
    let question = session.current_question();
    println!(
        "[{}/{}] ({}) {}",
        index + 1,
        session.questions().len(),
        question.kind().label(),
        question.prompt
    );
    match &question.payload {
        QuestionPayload::MultipleChoice { options, .. } => {
            for option in options {
                println!("  {}. {}", option.label, option.text);
            }
            println!("Answer with the option letter.");
        }
        QuestionPayload::Coding {
            starter_code,
            sample_cases,
        } => {
            if !starter_code.is_empty() {
                println!("Starter code:");
                println!("{starter_code}");
            }
            for case in sample_cases {
                println!("  example: input {} -> output {}", case.input, case.output);
            }
        }
        QuestionPayload::OpenEnded { .. } => {}
    }
    if let Some(answer) = &session.answers()[index] {
        println!("(current answer: {answer})");
    }
    println!();
}

fn print_help() {
    println!("Commands:");
    println!("  n, next   move to the next question");
    println!("  p, prev   move back to the previous question");
    println!("  time      show remaining time");
    println!("  submit    finish the quiz and grade the answers");
    println!("  quit      abandon the quiz without grading");
    println!("  help      show this message");
    println!("Any other input is recorded as the answer to the current question.");
}

fn print_results(session: &QuizSession, outcome: &QuizOutcome) {
    use comfy_table::{Cell, Table};

    let mut table = Table::new();
    table.set_header(vec!["#", "Topic", "Type", "Your Answer", "Result"]);

    for (index, question) in session.questions().iter().enumerate() {
        let answer = session.answers()[index].as_deref().unwrap_or("-");
        let result = match &outcome.evaluations[index] {
            None => "Skipped",
            Some(v) if v.needs_review() => "Needs review",
            Some(v) if v.correct == Some(true) => "Correct",
            Some(_) => "Incorrect",
        };
        table.add_row(vec![
            Cell::new(index + 1),
            Cell::new(&question.topic),
            Cell::new(question.kind().label()),
            Cell::new(truncate(answer, 40)),
            Cell::new(result),
        ]);
    }

    println!("{table}");

    let pct = if outcome.total_questions > 0 {
        (f64::from(outcome.score) / f64::from(outcome.total_questions) * 100.0).round() as u32
    } else {
        0
    };
    println!(
        "Score: {}/{} ({pct}%), {} answered, finished in {}",
        outcome.score,
        outcome.total_questions,
        outcome.questions_answered,
        format_duration(outcome.elapsed),
    );
    if outcome.needs_review > 0 {
        println!(
            "{} answer(s) could not be graded automatically and need manual review.",
            outcome.needs_review
        );
    }

    let mut header_shown = false;
    for (index, evaluation) in outcome.evaluations.iter().enumerate() {
        let Some(verdict) = evaluation else { continue };
        if verdict.correct == Some(true) || verdict.explanation.is_empty() {
            continue;
        }
        if !header_shown {
            println!("\nReview:");
            header_shown = true;
        }
        println!("  {}. {}", index + 1, session.questions()[index].prompt);
        println!("     {}", verdict.explanation);
    }
}

fn format_duration(duration: Duration) -> String {
    let secs = duration.as_secs();
    format!("{}m {:02}s", secs / 60, secs % 60)
}

fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        text.to_string()
    } else {
        let kept: String = text.chars().take(max).collect();
        format!("{kept}...")
    }
}
