//! Evaluation fan-out and score aggregation.
//!
//! Submitting a quiz grades every outstanding answer: multiple-choice
//! locally and deterministically, coding/theory through the question
//! service. Remote grades run concurrently, each tagged with its question
//! index, and are individually fault-isolated.

use futures::stream::{FuturesUnordered, StreamExt};

use crate::model::{QuestionPayload, QuizOutcome, Verdict};
use crate::service::QuestionService;
use crate::session::QuizSession;

/// Finalize the session (if the caller has not already) and grade every
/// answered, not-yet-graded question.
///
/// Always produces an outcome: a failed grading task yields the fallback
/// verdict for that index only, and the batch still completes. The fan-in
/// waits for every task; there are no partial results.
pub async fn grade_session(
    session: &mut QuizSession,
    service: &dyn QuestionService,
) -> QuizOutcome {
    let elapsed = session.finalize();

    let mut local = Vec::new();
    let mut remote = FuturesUnordered::new();

    for (index, question) in session.questions().iter().enumerate() {
        if session.evaluations()[index].is_some() {
            continue;
        }
        let Some(answer) = session.answers()[index].clone() else {
            continue;
        };

        match &question.payload {
            QuestionPayload::MultipleChoice { correct_label, .. } => {
                let correct = answer == *correct_label;
                local.push((
                    index,
                    Verdict {
                        correct: Some(correct),
                        score: if correct { 1.0 } else { 0.0 },
                        explanation: question.explanation.clone(),
                    },
                ));
            }
            QuestionPayload::Coding { .. } | QuestionPayload::OpenEnded { .. } => {
                let question = question.clone();
                remote.push(async move { (index, service.grade(&question, &answer).await) });
            }
        }
    }

    for (index, verdict) in local {
        session.record_verdict(index, verdict);
    }

    while let Some((index, result)) = remote.next().await {
        let verdict = match result {
            Ok(verdict) => verdict,
            Err(e) => {
                tracing::warn!("grading failed for question index {index}: {e:#}");
                Verdict::grading_failed()
            }
        };
        session.record_verdict(index, verdict);
    }

    let score = session
        .evaluations()
        .iter()
        .flatten()
        .filter(|v| v.correct == Some(true))
        .count() as u32;
    let needs_review = session
        .evaluations()
        .iter()
        .flatten()
        .filter(|v| v.needs_review())
        .count() as u32;
    let questions_answered = session.answers().iter().flatten().count() as u32;

    QuizOutcome {
        score,
        total_questions: session.questions().len() as u32,
        questions_answered,
        needs_review,
        elapsed,
        evaluations: session.evaluations().to_vec(),
    }
}
