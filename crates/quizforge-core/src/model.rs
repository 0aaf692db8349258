//! Core data model types for quizforge.
//!
//! These are the fundamental types that the entire quizforge system uses
//! to represent questions, quiz settings, verdicts, and history records.
//!
//! Serde field names follow the wire/persistence format (camelCase, MCQ
//! options keyed `letter`, elapsed time persisted as `timeTaken`
//! milliseconds), so exported data stays readable by older tooling.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Default number of questions in a generated batch.
pub const DEFAULT_QUESTION_COUNT: u32 = 25;

/// Default wall-clock limit for a quiz attempt.
pub const DEFAULT_TIME_LIMIT: Duration = Duration::from_secs(45 * 60);

/// A single interview question received from the question service.
///
/// Immutable once received; a session never rewrites question content.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Question {
    /// Identifier unique within one generated batch.
    pub id: u32,
    /// The topic this question covers.
    pub topic: String,
    /// The question text shown to the user.
    #[serde(rename = "question")]
    pub prompt: String,
    /// Explanation of the expected answer.
    #[serde(default)]
    pub explanation: String,
    /// Type-specific fields, dispatched on the `type` tag.
    #[serde(flatten)]
    pub payload: QuestionPayload,
}

impl Question {
    /// The fieldless discriminant of this question's payload.
    pub fn kind(&self) -> QuestionKind {
        match self.payload {
            QuestionPayload::MultipleChoice { .. } => QuestionKind::MultipleChoice,
            QuestionPayload::Coding { .. } => QuestionKind::Coding,
            QuestionPayload::OpenEnded { .. } => QuestionKind::OpenEnded,
        }
    }
}

/// Type-specific question fields.
///
/// The tag decides the variant; consumers dispatch on it and never sniff
/// field presence.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum QuestionPayload {
    /// Four-option single-answer question, graded locally.
    #[serde(rename = "mcq")]
    MultipleChoice {
        options: Vec<McqOption>,
        #[serde(rename = "correctAnswer")]
        correct_label: String,
    },
    /// Free-form coding exercise, graded by the external service.
    #[serde(rename = "coding")]
    Coding {
        #[serde(rename = "starterCode", default)]
        starter_code: String,
        #[serde(rename = "sampleCases", default)]
        sample_cases: Vec<SampleCase>,
    },
    /// Open-ended theory question, graded by the external service.
    #[serde(rename = "theory", alias = "open-ended")]
    OpenEnded {
        #[serde(rename = "keyPoints", default)]
        key_points: Vec<String>,
    },
}

/// One selectable option of a multiple-choice question.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct McqOption {
    /// Option label ("A".."D").
    #[serde(rename = "letter")]
    pub label: String,
    /// Option text.
    pub text: String,
}

/// An input/output example attached to a coding question.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SampleCase {
    pub input: String,
    pub output: String,
}

/// Supported question types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum QuestionKind {
    #[serde(rename = "mcq")]
    MultipleChoice,
    #[serde(rename = "coding")]
    Coding,
    #[serde(rename = "theory", alias = "open-ended")]
    OpenEnded,
}

impl QuestionKind {
    /// Human-readable label for result tables.
    pub fn label(&self) -> &'static str {
        match self {
            QuestionKind::MultipleChoice => "Multiple Choice",
            QuestionKind::Coding => "Coding Challenge",
            QuestionKind::OpenEnded => "Theory Question",
        }
    }
}

impl fmt::Display for QuestionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QuestionKind::MultipleChoice => write!(f, "mcq"),
            QuestionKind::Coding => write!(f, "coding"),
            QuestionKind::OpenEnded => write!(f, "theory"),
        }
    }
}

impl FromStr for QuestionKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "mcq" | "multiple-choice" => Ok(QuestionKind::MultipleChoice),
            "coding" => Ok(QuestionKind::Coding),
            "theory" | "open-ended" | "open" => Ok(QuestionKind::OpenEnded),
            other => Err(format!("unknown question type: {other}")),
        }
    }
}

/// Settings for one quiz attempt.
#[derive(Debug, Clone)]
pub struct QuizSettings {
    /// Topics to draw questions from (at least one).
    pub topics: Vec<String>,
    /// Question types to include (at least one).
    pub question_types: Vec<QuestionKind>,
    /// How many questions to request.
    pub question_count: u32,
    /// Wall-clock limit for the attempt.
    pub time_limit: Duration,
}

impl QuizSettings {
    /// Settings with the stock question count and time limit.
    pub fn new(topics: Vec<String>, question_types: Vec<QuestionKind>) -> Self {
        Self {
            topics,
            question_types,
            question_count: DEFAULT_QUESTION_COUNT,
            time_limit: DEFAULT_TIME_LIMIT,
        }
    }
}

/// The grading verdict for a single answered question.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Verdict {
    /// `Some(true)`/`Some(false)` for a definite judgement; `None` means
    /// the answer needs manual review and awards no points automatically.
    pub correct: Option<bool>,
    /// Partial-credit score in [0, 1].
    #[serde(default)]
    pub score: f64,
    /// What was right and what could be improved.
    #[serde(default)]
    pub explanation: String,
}

impl Verdict {
    /// Verdict substituted when a grading task fails, so one bad grade
    /// never sinks the rest of the batch.
    pub fn grading_failed() -> Self {
        Self {
            correct: Some(false),
            score: 0.0,
            explanation: "There was an error evaluating this answer.".to_string(),
        }
    }

    /// True when the grader could not reach a definite judgement.
    pub fn needs_review(&self) -> bool {
        self.correct.is_none()
    }
}

/// Aggregate result of a submitted quiz.
#[derive(Debug, Clone)]
pub struct QuizOutcome {
    /// Count of answers judged definitely correct.
    pub score: u32,
    /// Total questions in the session, answered or not.
    pub total_questions: u32,
    /// Count of questions that had an answer at submission time.
    pub questions_answered: u32,
    /// Count of verdicts flagged for manual review (no points awarded).
    pub needs_review: u32,
    /// Wall-clock time from session start to finalization.
    pub elapsed: Duration,
    /// Per-question verdicts, index-aligned with the session's questions.
    pub evaluations: Vec<Option<Verdict>>,
}

/// Compact record of one completed quiz, kept in the history list.
///
/// Append-only; carries no back-reference to the session it came from.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistorySummary {
    /// When the quiz was started.
    pub date: DateTime<Utc>,
    /// Topics the quiz covered.
    pub topics: Vec<String>,
    /// Question types the quiz included.
    pub question_types: Vec<QuestionKind>,
    /// Confirmed-correct answer count.
    pub score: u32,
    /// Total questions in the quiz.
    pub total_questions: u32,
    /// Time taken in milliseconds.
    #[serde(rename = "timeTaken")]
    pub time_taken_ms: u64,
}

/// Per-topic completed-quiz counts, keyed by topic name.
pub type TopicFrequencyMap = HashMap<String, u32>;

/// User preferences. Last write wins; unknown fields are ignored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserPreferences {
    /// UI theme name ("light" or "dark").
    #[serde(default = "default_theme")]
    pub theme: String,
    /// Default quiz time limit in minutes.
    #[serde(rename = "defaultTimeLimit", default = "default_time_limit_minutes")]
    pub default_time_limit_minutes: u32,
}

fn default_theme() -> String {
    "light".to_string()
}

fn default_time_limit_minutes() -> u32 {
    45
}

impl Default for UserPreferences {
    fn default() -> Self {
        Self {
            theme: default_theme(),
            default_time_limit_minutes: default_time_limit_minutes(),
        }
    }
}

/// Everything a user can take with them, as one JSON document.
///
/// The three data fields are required on import; a document missing any of
/// them is rejected before anything is written.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserDataExport {
    pub history: Vec<HistorySummary>,
    pub covered_topics: TopicFrequencyMap,
    pub preferences: UserPreferences,
    #[serde(default = "Utc::now")]
    pub export_date: DateTime<Utc>,
}
