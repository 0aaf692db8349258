//! Google Gemini question service implementation.

use std::time::Instant;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::instrument;

use quizforge_core::model::{Question, QuestionPayload, Verdict};
use quizforge_core::service::{GenerationRequest, QuestionService};

use crate::error::ProviderError;

const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";
const DEFAULT_MODEL: &str = "gemini-2.0-flash";
const DEFAULT_TIMEOUT_SECS: u64 = 120;

const MANUAL_REVIEW_EXPLANATION: &str =
    "We couldn't automatically evaluate this answer. Please compare with the explanation.";

/// Google Gemini question service.
pub struct GeminiService {
    api_key: String,
    base_url: String,
    model: String,
    client: reqwest::Client,
}

impl GeminiService {
    pub fn new(api_key: &str, base_url: Option<String>, model: Option<String>) -> Self {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(DEFAULT_TIMEOUT_SECS))
            .build()
            .expect("failed to build HTTP client");

        Self {
            api_key: api_key.to_string(),
            base_url: base_url.unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            model: model.unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            client,
        }
    }

    /// POST a single-turn prompt and return the first candidate's text.
    async fn request_text(&self, prompt: String) -> Result<String, ProviderError> {
        let body = GeminiRequest {
            contents: vec![RequestContent {
                parts: vec![RequestPart { text: prompt }],
            }],
        };

        let response = self
            .client
            .post(format!(
                "{}/v1beta/models/{}:generateContent",
                self.base_url, self.model
            ))
            .query(&[("key", self.api_key.as_str())])
            .header("content-type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    ProviderError::Timeout(DEFAULT_TIMEOUT_SECS)
                } else {
                    ProviderError::NetworkError(e.to_string())
                }
            })?;

        let status = response.status().as_u16();
        if status == 429 {
            let retry_after = response
                .headers()
                .get("retry-after")
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.parse::<u64>().ok())
                .unwrap_or(5)
                * 1000;
            return Err(ProviderError::RateLimited {
                retry_after_ms: retry_after,
            });
        }
        if status == 401 || status == 403 {
            let body = response.text().await.unwrap_or_default();
            return Err(ProviderError::AuthenticationFailed(body));
        }
        if status == 404 {
            return Err(ProviderError::ModelNotFound(self.model.clone()));
        }
        if status >= 400 {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<GeminiError>(&body)
                .map(|e| e.error.message)
                .unwrap_or(body);
            return Err(ProviderError::ApiError { status, message });
        }

        let api_response: GeminiResponse =
            response.json().await.map_err(|e| ProviderError::ApiError {
                status: 0,
                message: format!("failed to parse response: {e}"),
            })?;

        let text = api_response
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content.parts.into_iter().next())
            .map(|p| p.text)
            .unwrap_or_default();

        Ok(text)
    }
}

#[derive(Serialize)]
struct GeminiRequest {
    contents: Vec<RequestContent>,
}

#[derive(Serialize)]
struct RequestContent {
    parts: Vec<RequestPart>,
}

#[derive(Serialize)]
struct RequestPart {
    text: String,
}

#[derive(Deserialize)]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
}

#[derive(Deserialize)]
struct GeminiCandidate {
    content: CandidateContent,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Deserialize)]
struct CandidatePart {
    #[serde(default)]
    text: String,
}

#[derive(Deserialize)]
struct GeminiError {
    error: GeminiErrorBody,
}

#[derive(Deserialize)]
struct GeminiErrorBody {
    message: String,
}

/// The JSON envelope the generation prompt asks the model to emit.
#[derive(Deserialize)]
struct QuestionBatch {
    questions: Vec<Question>,
}

#[async_trait]
impl QuestionService for GeminiService {
    fn name(&self) -> &str {
        "gemini"
    }

    #[instrument(skip(self, request), fields(count = request.count))]
    async fn generate(&self, request: &GenerationRequest) -> anyhow::Result<Vec<Question>> {
        let start = Instant::now();

        let prompt = build_generation_prompt(request);
        let text = self.request_text(prompt).await?;

        let json = extract_json_object(&text).ok_or_else(|| {
            ProviderError::UnparseableResponse(
                "could not locate a JSON object in the model reply".into(),
            )
        })?;
        let batch: QuestionBatch = serde_json::from_str(json)
            .map_err(|e| ProviderError::UnparseableResponse(format!("bad question batch: {e}")))?;

        tracing::debug!(
            latency_ms = start.elapsed().as_millis() as u64,
            questions = batch.questions.len(),
            "generated quiz batch"
        );
        Ok(batch.questions)
    }

    #[instrument(skip(self, question, answer), fields(question_id = question.id))]
    async fn grade(&self, question: &Question, answer: &str) -> anyhow::Result<Verdict> {
        // Multiple choice never needs the API; compare against the key.
        if let QuestionPayload::MultipleChoice { correct_label, .. } = &question.payload {
            let correct = answer == correct_label;
            return Ok(Verdict {
                correct: Some(correct),
                score: if correct { 1.0 } else { 0.0 },
                explanation: question.explanation.clone(),
            });
        }

        let prompt = build_grading_prompt(question, answer);
        let text = match self.request_text(prompt).await {
            Ok(text) => text,
            Err(e) => {
                tracing::warn!(error = %e, "grading request failed, flagging for manual review");
                return Ok(manual_review_verdict());
            }
        };

        let Some(json) = extract_json_object(&text) else {
            tracing::warn!("grading reply held no JSON object, flagging for manual review");
            return Ok(manual_review_verdict());
        };
        match serde_json::from_str::<Verdict>(json) {
            Ok(verdict) => Ok(verdict),
            Err(e) => {
                tracing::warn!(error = %e, "grading reply did not parse, flagging for manual review");
                Ok(manual_review_verdict())
            }
        }
    }
}

/// Verdict returned when the service cannot complete a grading call.
///
/// `correct: None` marks the answer for manual review; it awards no
/// points but is surfaced separately from a wrong answer.
fn manual_review_verdict() -> Verdict {
    Verdict {
        correct: None,
        score: 0.0,
        explanation: MANUAL_REVIEW_EXPLANATION.to_string(),
    }
}

/// Extract the outermost JSON object from a model reply.
///
/// Replies usually wrap the payload in prose or markdown fences, so this
/// takes everything from the first `{` through the last `}`.
pub fn extract_json_object(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    if end < start {
        return None;
    }
    Some(&text[start..=end])
}

fn build_generation_prompt(request: &GenerationRequest) -> String {
    let topics = request.topics.join(", ");
    let kinds = request
        .question_types
        .iter()
        .map(|k| k.to_string())
        .collect::<Vec<_>>()
        .join(", ");

    let mut prompt = format!(
        "Generate {count} interview questions for a technical software engineering \
         interview quiz, with the following characteristics:\n\n\
         Topics: {topics}\n\
         Question Types: {kinds}\n",
        count = request.count,
    );

    if !request.topic_weights.is_empty() {
        let mut weights: Vec<_> = request.topic_weights.iter().collect();
        weights.sort_by(|a, b| a.0.cmp(b.0));
        let emphasis = weights
            .iter()
            .map(|(topic, weight)| format!("{topic}: {weight:.2}"))
            .collect::<Vec<_>>()
            .join(", ");
        prompt.push_str(&format!(
            "Topic emphasis (approximate share of questions per topic): {emphasis}\n"
        ));
    }

    prompt.push_str(&format!(
        "\nFor each question, provide:\n\
         1. A unique ID (number from 1 to {count})\n\
         2. The question type (one of: {kinds})\n\
         3. The topic (one of: {topics})\n\
         4. The question text\n\
         5. For MCQs: 4 options with letters (A, B, C, D) and only one correct answer\n\
         6. For coding questions: a skeleton code, expected output, and test cases\n\
         7. For theory questions: key points that should be included in the answer\n\n\
         For all questions, include an explanation of the answer.\n\n",
        count = request.count,
    ));

    prompt.push_str(GENERATION_FORMAT);
    prompt
}

const GENERATION_FORMAT: &str = r#"Return the response as a valid JSON object with this structure:
{
  "questions": [
    {
      "id": 1,
      "type": "mcq",
      "topic": "dsa",
      "question": "What is the time complexity of...",
      "options": [
        {"letter": "A", "text": "O(1)"},
        {"letter": "B", "text": "O(n)"},
        {"letter": "C", "text": "O(log n)"},
        {"letter": "D", "text": "O(n²)"}
      ],
      "correctAnswer": "B",
      "explanation": "The time complexity is O(n) because..."
    },
    {
      "id": 2,
      "type": "coding",
      "topic": "javascript",
      "question": "Write a function that...",
      "starterCode": "function solution(arr) {\n  // Your code here\n}",
      "sampleCases": [
        {"input": "[1, 2, 3]", "output": "6"}
      ],
      "explanation": "This question tests knowledge of..."
    },
    {
      "id": 3,
      "type": "theory",
      "topic": "system design",
      "question": "Explain the difference between...",
      "keyPoints": ["first key point", "second key point"],
      "explanation": "A strong answer covers..."
    }
  ]
}"#;

fn build_grading_prompt(question: &Question, answer: &str) -> String {
    let mut prompt = format!(
        "Evaluate the following {kind} answer for a technical interview question.\n\n\
         Question: {text}\n\n",
        kind = question.kind(),
        text = question.prompt,
    );

    match &question.payload {
        QuestionPayload::Coding { sample_cases, .. } => {
            let cases = serde_json::to_string(sample_cases).unwrap_or_default();
            prompt.push_str(&format!(
                "Sample Test Cases:\n{cases}\n\nUser's Solution:\n```\n{answer}\n```\n"
            ));
        }
        QuestionPayload::OpenEnded { key_points } => {
            let points = if key_points.is_empty() {
                "Not provided".to_string()
            } else {
                key_points.join(", ")
            };
            prompt.push_str(&format!(
                "Expected Key Points:\n{points}\n\nUser's Answer:\n{answer}\n"
            ));
        }
        QuestionPayload::MultipleChoice { .. } => {
            prompt.push_str(&format!("User's Answer:\n{answer}\n"));
        }
    }

    prompt.push_str(GRADING_FORMAT);
    prompt
}

const GRADING_FORMAT: &str = r#"
Evaluate the answer and provide:
1. Is it correct? (true/false)
2. Score (0-1, with 1 being perfect)
3. A detailed explanation of what is correct and what could be improved
4. For coding questions, check if the solution works for the test cases and has good time/space complexity

Return the response as a JSON object with this structure:
{
  "correct": true/false,
  "score": 0.8,
  "explanation": "The answer is mostly correct, but..."
}"#;
