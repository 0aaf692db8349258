//! The question-service boundary.
//!
//! This async trait is implemented by the `quizforge-providers` crate; the
//! engine only ever talks to it, so tests can script the service and real
//! deployments can swap backends.

use std::collections::HashMap;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::model::{Question, QuestionKind, Verdict};

/// Trait for external services that generate and grade interview questions.
#[async_trait]
pub trait QuestionService: Send + Sync {
    /// Human-readable service name (e.g. "gemini").
    fn name(&self) -> &str;

    /// Generate a batch of questions for the given request.
    async fn generate(&self, request: &GenerationRequest) -> anyhow::Result<Vec<Question>>;

    /// Grade a free-form answer to a coding or theory question.
    ///
    /// Never invoked for multiple-choice questions; those are graded
    /// locally. A verdict with `correct: None` means the service could not
    /// reach a definite judgement and the answer needs manual review.
    async fn grade(&self, question: &Question, answer: &str) -> anyhow::Result<Verdict>;
}

impl std::fmt::Debug for dyn QuestionService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QuestionService")
            .field("name", &self.name())
            .finish()
    }
}

/// Request for a batch of questions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationRequest {
    /// Topics to draw from.
    pub topics: Vec<String>,
    /// Question types to include.
    pub question_types: Vec<QuestionKind>,
    /// How many questions to produce.
    pub count: u32,
    /// Advisory per-topic emphasis, normalized to sum to 1. How it is
    /// honored is the service's business; batch balance stays with the
    /// service, not the caller.
    #[serde(default)]
    pub topic_weights: HashMap<String, f64>,
}
