//! Error taxonomy for quiz operations.

use thiserror::Error;

use crate::store::StoreError;

/// Errors surfaced by the quiz engine.
///
/// Per-question grading failures are deliberately absent: they are
/// downgraded to a fallback verdict so a submission always completes.
#[derive(Debug, Error)]
pub enum QuizError {
    /// Settings were rejected before any work happened.
    #[error("invalid quiz settings: {0}")]
    Configuration(String),

    /// The question service failed to produce a usable batch.
    #[error("quiz generation failed: {message}")]
    Generation { message: String },

    /// An operation that needs a session was called before one existed.
    #[error("no active quiz session")]
    NoActiveSession,

    /// A question index outside the session's range.
    #[error("question index {index} out of range (session has {len} questions)")]
    InvalidIndex { index: usize, len: usize },

    /// The session was already submitted.
    #[error("quiz session already completed")]
    SessionCompleted,

    /// Persistence failed.
    #[error(transparent)]
    Store(#[from] StoreError),
}
