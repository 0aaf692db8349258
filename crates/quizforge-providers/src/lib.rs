//! quizforge-providers — Question service integrations.
//!
//! Implements the `QuestionService` trait for Google Gemini, plus the
//! configuration layer and a scriptable mock for tests.

pub mod config;
pub mod error;
pub mod gemini;
pub mod mock;

pub use config::{create_service, load_config, load_config_from, GeminiConfig, QuizforgeConfig};
pub use error::ProviderError;
