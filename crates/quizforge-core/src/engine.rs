//! Central quiz engine orchestrator.
//!
//! Owns the single active session, talks to the question service through
//! its trait, and folds completed attempts into history.

use std::collections::HashSet;
use std::sync::Arc;

use crate::error::QuizError;
use crate::grading::grade_session;
use crate::history::HistoryStore;
use crate::model::{HistorySummary, Question, QuizOutcome, QuizSettings, DEFAULT_TIME_LIMIT};
use crate::service::{GenerationRequest, QuestionService};
use crate::session::QuizSession;
use crate::stats::ProgressStats;
use crate::weights::compute_topic_weights;

/// Drives quiz attempts against a question service and a history store.
///
/// At most one session exists at a time; starting a new quiz replaces the
/// old session only after generation succeeds.
pub struct QuizEngine {
    service: Arc<dyn QuestionService>,
    history: HistoryStore,
    session: Option<QuizSession>,
}

impl QuizEngine {
    pub fn new(service: Arc<dyn QuestionService>, history: HistoryStore) -> Self {
        Self {
            service,
            history,
            session: None,
        }
    }

    /// The active session, if any. Stays available after submission so
    /// results can be browsed.
    pub fn session(&self) -> Option<&QuizSession> {
        self.session.as_ref()
    }

    /// Typed access to persisted history.
    pub fn history(&self) -> &HistoryStore {
        &self.history
    }

    /// Validate settings, request a fresh batch, and install a new session.
    ///
    /// All-or-nothing: bad settings and failed generation both leave any
    /// previous session exactly as it was.
    pub async fn start_quiz(&mut self, settings: QuizSettings) -> Result<&QuizSession, QuizError> {
        let settings = validate_settings(settings)?;

        let weights = compute_topic_weights(&settings.topics, &self.history.frequencies());
        let request = GenerationRequest {
            topics: settings.topics.clone(),
            question_types: settings.question_types.clone(),
            count: settings.question_count,
            topic_weights: weights,
        };

        tracing::info!(
            service = self.service.name(),
            topics = ?settings.topics,
            count = settings.question_count,
            "requesting question batch"
        );

        let questions = self
            .service
            .generate(&request)
            .await
            .map_err(|e| QuizError::Generation {
                message: format!("{e:#}"),
            })?;

        if questions.is_empty() {
            return Err(QuizError::Generation {
                message: "service returned an empty question batch".to_string(),
            });
        }
        if questions.len() as u32 != settings.question_count {
            tracing::warn!(
                requested = settings.question_count,
                received = questions.len(),
                "question batch size differs from request"
            );
        }

        Ok(self.session.insert(QuizSession::new(settings, questions)))
    }

    /// The question under the session cursor.
    pub fn current_question(&self) -> Result<&Question, QuizError> {
        Ok(self.active()?.current_question())
    }

    /// Record an answer for an arbitrary question index.
    pub fn submit_answer(
        &mut self,
        index: usize,
        answer: impl Into<String>,
    ) -> Result<(), QuizError> {
        self.active_mut()?.submit_answer(index, answer)
    }

    /// Record an answer for the question under the cursor.
    pub fn answer_current(&mut self, answer: impl Into<String>) -> Result<(), QuizError> {
        self.active_mut()?.answer_current(answer)
    }

    /// Move the cursor forward; `None` at the last question.
    pub fn advance(&mut self) -> Result<Option<&Question>, QuizError> {
        Ok(self.active_mut()?.advance())
    }

    /// Move the cursor back; `None` at the first question.
    pub fn retreat(&mut self) -> Result<Option<&Question>, QuizError> {
        Ok(self.active_mut()?.retreat())
    }

    /// Finalize the session, grade outstanding answers, and fold the
    /// result into history. The session stays around for review.
    pub async fn submit(&mut self) -> Result<QuizOutcome, QuizError> {
        let service = Arc::clone(&self.service);
        let session = self.session.as_mut().ok_or(QuizError::NoActiveSession)?;
        if session.is_completed() {
            return Err(QuizError::SessionCompleted);
        }

        let outcome = grade_session(session, service.as_ref()).await;
        self.history.record_completion(session, &outcome)?;

        tracing::info!(
            score = outcome.score,
            total = outcome.total_questions,
            answered = outcome.questions_answered,
            "quiz submitted"
        );

        Ok(outcome)
    }

    /// Progress statistics over the stored history.
    pub fn progress(&self) -> ProgressStats {
        ProgressStats::from_history(&self.history.list())
    }

    fn active(&self) -> Result<&QuizSession, QuizError> {
        self.session.as_ref().ok_or(QuizError::NoActiveSession)
    }

    fn active_mut(&mut self) -> Result<&mut QuizSession, QuizError> {
        self.session.as_mut().ok_or(QuizError::NoActiveSession)
    }
}

/// Settings for re-attempting a past quiz: same topics and question
/// types, question count matching the original attempt, and the stock
/// time limit (the original limit is not kept in history).
pub fn retry_settings(summary: &HistorySummary) -> QuizSettings {
    QuizSettings {
        topics: summary.topics.clone(),
        question_types: summary.question_types.clone(),
        question_count: summary.total_questions.max(1),
        time_limit: DEFAULT_TIME_LIMIT,
    }
}

/// Normalize and validate settings. Topics are trimmed and deduplicated
/// (first occurrence wins), question types deduplicated; empties and zero
/// limits are configuration errors and nothing gets created.
fn validate_settings(mut settings: QuizSettings) -> Result<QuizSettings, QuizError> {
    let mut seen = HashSet::new();
    settings.topics = settings
        .topics
        .iter()
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty() && seen.insert(t.clone()))
        .collect();

    let mut seen_kinds = HashSet::new();
    settings.question_types.retain(|k| seen_kinds.insert(*k));

    if settings.topics.is_empty() {
        return Err(QuizError::Configuration(
            "at least one topic is required".into(),
        ));
    }
    if settings.question_types.is_empty() {
        return Err(QuizError::Configuration(
            "at least one question type is required".into(),
        ));
    }
    if settings.question_count == 0 {
        return Err(QuizError::Configuration(
            "question count must be positive".into(),
        ));
    }
    if settings.time_limit.is_zero() {
        return Err(QuizError::Configuration(
            "time limit must be positive".into(),
        ));
    }
    Ok(settings)
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Mutex;

    use async_trait::async_trait;
    use chrono::Utc;

    use super::*;
    use crate::model::{McqOption, QuestionKind, QuestionPayload, Verdict};
    use crate::store::MemoryStore;

    /// Returns a fixed batch; failure is togglable so one engine can see
    /// both good and bad generations.
    struct StubService {
        questions: Vec<Question>,
        fail_generation: AtomicBool,
        last_request: Mutex<Option<GenerationRequest>>,
    }

    impl StubService {
        fn new(questions: Vec<Question>) -> Self {
            Self {
                questions,
                fail_generation: AtomicBool::new(false),
                last_request: Mutex::new(None),
            }
        }

        fn last_request(&self) -> Option<GenerationRequest> {
            self.last_request.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl QuestionService for StubService {
        fn name(&self) -> &str {
            "stub"
        }

        async fn generate(&self, request: &GenerationRequest) -> anyhow::Result<Vec<Question>> {
            *self.last_request.lock().unwrap() = Some(request.clone());
            if self.fail_generation.load(Ordering::Relaxed) {
                anyhow::bail!("stub generation failure");
            }
            Ok(self.questions.clone())
        }

        async fn grade(&self, _question: &Question, answer: &str) -> anyhow::Result<Verdict> {
            let correct = answer == "right";
            Ok(Verdict {
                correct: Some(correct),
                score: if correct { 1.0 } else { 0.0 },
                explanation: String::new(),
            })
        }
    }

    fn mcq(id: u32, correct: &str) -> Question {
        Question {
            id,
            topic: "dsa".into(),
            prompt: format!("question {id}"),
            explanation: String::new(),
            payload: QuestionPayload::MultipleChoice {
                options: vec![
                    McqOption {
                        label: "A".into(),
                        text: "first".into(),
                    },
                    McqOption {
                        label: "B".into(),
                        text: "second".into(),
                    },
                ],
                correct_label: correct.into(),
            },
        }
    }

    fn settings(topics: &[&str]) -> QuizSettings {
        let mut settings = QuizSettings::new(
            topics.iter().map(|s| s.to_string()).collect(),
            vec![QuestionKind::MultipleChoice],
        );
        settings.question_count = 3;
        settings
    }

    fn engine_with(service: Arc<StubService>) -> QuizEngine {
        QuizEngine::new(service, HistoryStore::new(Box::new(MemoryStore::new())))
    }

    fn three_mcqs() -> Vec<Question> {
        vec![mcq(1, "A"), mcq(2, "A"), mcq(3, "A")]
    }

    #[tokio::test]
    async fn empty_topics_is_a_configuration_error() {
        let service = Arc::new(StubService::new(three_mcqs()));
        let mut engine = engine_with(Arc::clone(&service));

        let err = engine.start_quiz(settings(&[])).await.unwrap_err();
        assert!(matches!(err, QuizError::Configuration(_)));
        assert!(engine.session().is_none());
        assert!(service.last_request().is_none());
    }

    #[tokio::test]
    async fn blank_and_duplicate_topics_are_normalized() {
        let service = Arc::new(StubService::new(three_mcqs()));
        let mut engine = engine_with(Arc::clone(&service));

        engine
            .start_quiz(settings(&["dsa", " dsa ", "", "javascript"]))
            .await
            .unwrap();

        let request = service.last_request().unwrap();
        assert_eq!(request.topics, vec!["dsa", "javascript"]);
    }

    #[tokio::test]
    async fn zero_count_is_a_configuration_error() {
        let service = Arc::new(StubService::new(three_mcqs()));
        let mut engine = engine_with(service);

        let mut bad = settings(&["dsa"]);
        bad.question_count = 0;
        assert!(matches!(
            engine.start_quiz(bad).await,
            Err(QuizError::Configuration(_))
        ));
    }

    #[tokio::test]
    async fn failed_generation_keeps_the_previous_session() {
        let service = Arc::new(StubService::new(three_mcqs()));
        let mut engine = engine_with(Arc::clone(&service));

        let first_id = engine.start_quiz(settings(&["dsa"])).await.unwrap().id;

        service.fail_generation.store(true, Ordering::Relaxed);
        let err = engine.start_quiz(settings(&["javascript"])).await.unwrap_err();
        assert!(matches!(err, QuizError::Generation { .. }));
        assert_eq!(engine.session().unwrap().id, first_id);
    }

    #[tokio::test]
    async fn empty_batch_is_a_generation_error() {
        let service = Arc::new(StubService::new(Vec::new()));
        let mut engine = engine_with(service);

        let err = engine.start_quiz(settings(&["dsa"])).await.unwrap_err();
        assert!(matches!(err, QuizError::Generation { .. }));
        assert!(engine.session().is_none());
    }

    #[tokio::test]
    async fn session_calls_without_a_session_fail_uniformly() {
        let service = Arc::new(StubService::new(three_mcqs()));
        let mut engine = engine_with(service);

        assert!(matches!(
            engine.current_question(),
            Err(QuizError::NoActiveSession)
        ));
        assert!(matches!(
            engine.submit_answer(0, "A"),
            Err(QuizError::NoActiveSession)
        ));
        assert!(matches!(engine.advance(), Err(QuizError::NoActiveSession)));
        assert!(matches!(engine.submit().await, Err(QuizError::NoActiveSession)));
    }

    #[tokio::test]
    async fn submit_scores_and_records_history() {
        let service = Arc::new(StubService::new(three_mcqs()));
        let mut engine = engine_with(service);

        engine.start_quiz(settings(&["dsa", "javascript"])).await.unwrap();
        engine.submit_answer(0, "A").unwrap();
        engine.submit_answer(2, "B").unwrap();

        let outcome = engine.submit().await.unwrap();
        assert_eq!(outcome.score, 1);
        assert_eq!(outcome.questions_answered, 2);
        assert_eq!(outcome.total_questions, 3);

        let history = engine.history().list();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].score, 1);
        assert_eq!(history[0].total_questions, 3);

        let frequencies = engine.history().frequencies();
        assert_eq!(frequencies["dsa"], 1);
        assert_eq!(frequencies["javascript"], 1);
    }

    #[tokio::test]
    async fn double_submit_is_rejected() {
        let service = Arc::new(StubService::new(three_mcqs()));
        let mut engine = engine_with(service);

        engine.start_quiz(settings(&["dsa"])).await.unwrap();
        engine.submit().await.unwrap();
        assert!(matches!(
            engine.submit().await,
            Err(QuizError::SessionCompleted)
        ));
        // Only one history entry despite two submit calls.
        assert_eq!(engine.history().list().len(), 1);
    }

    #[tokio::test]
    async fn completed_quizzes_shift_weights_toward_fresh_topics() {
        let service = Arc::new(StubService::new(three_mcqs()));
        let mut engine = engine_with(Arc::clone(&service));

        // Two completed attempts on "dsa" alone.
        for _ in 0..2 {
            engine.start_quiz(settings(&["dsa"])).await.unwrap();
            engine.submit().await.unwrap();
        }

        engine
            .start_quiz(settings(&["dsa", "javascript"]))
            .await
            .unwrap();

        let request = service.last_request().unwrap();
        let weights = &request.topic_weights;
        assert!(weights["javascript"] > weights["dsa"]);
        let sum: f64 = weights.values().sum();
        assert!((sum - 1.0).abs() < 1e-9);
    }

    #[tokio::test]
    async fn navigation_round_trip() {
        let service = Arc::new(StubService::new(three_mcqs()));
        let mut engine = engine_with(service);

        engine.start_quiz(settings(&["dsa"])).await.unwrap();
        assert_eq!(engine.current_question().unwrap().id, 1);
        assert_eq!(engine.advance().unwrap().unwrap().id, 2);
        assert_eq!(engine.advance().unwrap().unwrap().id, 3);
        assert!(engine.advance().unwrap().is_none());
        assert_eq!(engine.retreat().unwrap().unwrap().id, 2);
    }

    #[test]
    fn retry_settings_reuses_the_attempt_shape() {
        let summary = HistorySummary {
            date: Utc::now(),
            topics: vec!["dsa".into(), "sql".into()],
            question_types: vec![QuestionKind::Coding, QuestionKind::OpenEnded],
            score: 4,
            total_questions: 10,
            time_taken_ms: 1_000,
        };

        let settings = retry_settings(&summary);
        assert_eq!(settings.topics, summary.topics);
        assert_eq!(settings.question_types, summary.question_types);
        assert_eq!(settings.question_count, 10);
        assert_eq!(settings.time_limit, DEFAULT_TIME_LIMIT);
    }
}
