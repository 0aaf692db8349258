//! Mock question service for testing.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use quizforge_core::model::{McqOption, Question, QuestionPayload, SampleCase, Verdict};
use quizforge_core::service::{GenerationRequest, QuestionService};

/// A mock question service for exercising the quiz engine without real
/// API calls.
///
/// Returns a scripted question batch and per-question verdicts.
pub struct MockQuestionService {
    /// Questions returned by every `generate` call.
    questions: Vec<Question>,
    /// Scripted verdicts keyed by question id.
    verdicts: HashMap<u32, Verdict>,
    /// Question ids whose grading calls error out.
    failing_grades: HashSet<u32>,
    /// When true, `generate` errors out.
    fail_generation: bool,
    /// Number of generate calls made.
    generate_calls: AtomicU32,
    /// Number of grade calls made.
    grade_calls: AtomicU32,
    /// Last generation request received.
    last_request: Mutex<Option<GenerationRequest>>,
}

impl MockQuestionService {
    /// Create a mock that returns the given batch from every `generate`.
    pub fn new(questions: Vec<Question>) -> Self {
        Self {
            questions,
            verdicts: HashMap::new(),
            failing_grades: HashSet::new(),
            fail_generation: false,
            generate_calls: AtomicU32::new(0),
            grade_calls: AtomicU32::new(0),
            last_request: Mutex::new(None),
        }
    }

    /// Create a mock whose `generate` always fails.
    pub fn failing_generation() -> Self {
        let mut mock = Self::new(Vec::new());
        mock.fail_generation = true;
        mock
    }

    /// Script the verdict returned when grading question `id`.
    pub fn with_verdict(mut self, id: u32, verdict: Verdict) -> Self {
        self.verdicts.insert(id, verdict);
        self
    }

    /// Make grading question `id` return an error.
    pub fn with_failing_grade(mut self, id: u32) -> Self {
        self.failing_grades.insert(id);
        self
    }

    /// Number of generate calls made to this service.
    pub fn generate_calls(&self) -> u32 {
        self.generate_calls.load(Ordering::Relaxed)
    }

    /// Number of grade calls made to this service.
    pub fn grade_calls(&self) -> u32 {
        self.grade_calls.load(Ordering::Relaxed)
    }

    /// The last generation request received.
    pub fn last_request(&self) -> Option<GenerationRequest> {
        self.last_request.lock().unwrap().clone()
    }
}

#[async_trait]
impl QuestionService for MockQuestionService {
    fn name(&self) -> &str {
        "mock"
    }

    async fn generate(&self, request: &GenerationRequest) -> anyhow::Result<Vec<Question>> {
        self.generate_calls.fetch_add(1, Ordering::Relaxed);
        *self.last_request.lock().unwrap() = Some(request.clone());

        if self.fail_generation {
            anyhow::bail!("mock generation failure");
        }
        Ok(self.questions.clone())
    }

    async fn grade(&self, question: &Question, _answer: &str) -> anyhow::Result<Verdict> {
        self.grade_calls.fetch_add(1, Ordering::Relaxed);

        if self.failing_grades.contains(&question.id) {
            anyhow::bail!("mock grading failure for question {}", question.id);
        }
        Ok(self
            .verdicts
            .get(&question.id)
            .cloned()
            .unwrap_or_else(|| Verdict {
                correct: Some(true),
                score: 1.0,
                explanation: String::new(),
            }))
    }
}

/// A canned four-option multiple-choice question keyed on `correct`.
pub fn mcq_question(id: u32, topic: &str, correct: &str) -> Question {
    Question {
        id,
        topic: topic.to_string(),
        prompt: format!("Multiple choice question {id} on {topic}?"),
        explanation: format!("Option {correct} is right because of {topic}."),
        payload: QuestionPayload::MultipleChoice {
            options: ["A", "B", "C", "D"]
                .iter()
                .map(|label| McqOption {
                    label: (*label).to_string(),
                    text: format!("answer {label}"),
                })
                .collect(),
            correct_label: correct.to_string(),
        },
    }
}

/// A canned coding question with one sample case.
pub fn coding_question(id: u32, topic: &str) -> Question {
    Question {
        id,
        topic: topic.to_string(),
        prompt: format!("Coding question {id}: sum an array of {topic} scores."),
        explanation: "Iterate and accumulate.".to_string(),
        payload: QuestionPayload::Coding {
            starter_code: "function solution(arr) {\n  // Your code here\n}".to_string(),
            sample_cases: vec![SampleCase {
                input: "[1, 2, 3]".to_string(),
                output: "6".to_string(),
            }],
        },
    }
}

/// A canned theory question with two key points.
pub fn open_question(id: u32, topic: &str) -> Question {
    Question {
        id,
        topic: topic.to_string(),
        prompt: format!("Theory question {id}: explain {topic}."),
        explanation: format!("A strong answer covers the basics of {topic}."),
        payload: QuestionPayload::OpenEnded {
            key_points: vec!["definition".to_string(), "trade-offs".to_string()],
        },
    }
}
