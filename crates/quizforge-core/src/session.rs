//! Quiz session state.
//!
//! A session is a single-owner mutable value held by the engine. It moves
//! through active → completed exactly once and is never persisted; only
//! its history summary survives it.

use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::error::QuizError;
use crate::model::{Question, QuizSettings, Verdict};

/// One quiz attempt: questions, answers, verdicts, cursor, and timing.
///
/// Invariants: `evaluations[i]` is only ever set for an answered index, an
/// answered index never reverts to `None`, and the cursor always points at
/// a valid question (sessions are created with at least one).
#[derive(Debug, Clone)]
pub struct QuizSession {
    /// Session identity; ties countdown expiry to the right attempt.
    pub id: Uuid,
    /// The settings this attempt was started with.
    pub settings: QuizSettings,
    questions: Vec<Question>,
    answers: Vec<Option<String>>,
    evaluations: Vec<Option<Verdict>>,
    cursor: usize,
    started_at: DateTime<Utc>,
    started: Instant,
    ended_at: Option<DateTime<Utc>>,
    elapsed: Option<Duration>,
    completed: bool,
}

impl QuizSession {
    /// Callers go through `QuizEngine::start_quiz`, which guarantees a
    /// non-empty batch.
    pub(crate) fn new(settings: QuizSettings, questions: Vec<Question>) -> Self {
        let len = questions.len();
        Self {
            id: Uuid::new_v4(),
            settings,
            questions,
            answers: vec![None; len],
            evaluations: vec![None; len],
            cursor: 0,
            started_at: Utc::now(),
            started: Instant::now(),
            ended_at: None,
            elapsed: None,
            completed: false,
        }
    }

    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    pub fn answers(&self) -> &[Option<String>] {
        &self.answers
    }

    pub fn evaluations(&self) -> &[Option<Verdict>] {
        &self.evaluations
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    pub fn ended_at(&self) -> Option<DateTime<Utc>> {
        self.ended_at
    }

    pub fn is_completed(&self) -> bool {
        self.completed
    }

    /// The question under the cursor.
    pub fn current_question(&self) -> &Question {
        &self.questions[self.cursor]
    }

    /// Record an answer. Overwrite-set: answering the same index again
    /// replaces the previous value, last write wins.
    pub fn submit_answer(
        &mut self,
        index: usize,
        answer: impl Into<String>,
    ) -> Result<(), QuizError> {
        if index >= self.questions.len() {
            return Err(QuizError::InvalidIndex {
                index,
                len: self.questions.len(),
            });
        }
        if self.completed {
            return Err(QuizError::SessionCompleted);
        }
        self.answers[index] = Some(answer.into());
        Ok(())
    }

    /// Answer the question under the cursor.
    pub fn answer_current(&mut self, answer: impl Into<String>) -> Result<(), QuizError> {
        self.submit_answer(self.cursor, answer)
    }

    /// Move to the next question. At the last question this is a no-op
    /// returning `None`; boundaries are normal, not errors. Navigation
    /// stays available after completion so results can be reviewed.
    pub fn advance(&mut self) -> Option<&Question> {
        if self.cursor + 1 >= self.questions.len() {
            return None;
        }
        self.cursor += 1;
        Some(&self.questions[self.cursor])
    }

    /// Move to the previous question; `None` at the first.
    pub fn retreat(&mut self) -> Option<&Question> {
        if self.cursor == 0 {
            return None;
        }
        self.cursor -= 1;
        Some(&self.questions[self.cursor])
    }

    /// Close the session: flip `completed`, stamp `ended_at`, and fix the
    /// elapsed wall-clock time from the monotonic start. Idempotent; a
    /// second call returns the recorded elapsed without touching state.
    pub fn finalize(&mut self) -> Duration {
        if let Some(elapsed) = self.elapsed {
            return elapsed;
        }
        let elapsed = self.started.elapsed();
        self.elapsed = Some(elapsed);
        self.ended_at = Some(Utc::now());
        self.completed = true;
        elapsed
    }

    /// Time left before the limit expires; zero once past it.
    pub fn remaining_time(&self) -> Duration {
        self.settings.time_limit.saturating_sub(self.started.elapsed())
    }

    pub(crate) fn record_verdict(&mut self, index: usize, verdict: Verdict) {
        debug_assert!(self.answers[index].is_some(), "verdict for unanswered index");
        self.evaluations[index] = Some(verdict);
    }
}
