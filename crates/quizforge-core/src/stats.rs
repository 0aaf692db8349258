//! Progress statistics derived from quiz history.
//!
//! Pure data derivation over the stored summaries; `quizforge history`
//! renders these numbers.

use serde::{Deserialize, Serialize};

use crate::model::HistorySummary;

/// Direction of recent score movement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScoreTrend {
    Improving,
    Declining,
    Steady,
    /// Fewer than three completed quizzes.
    InsufficientData,
}

impl ScoreTrend {
    /// Display string for result panels.
    pub fn label(&self) -> &'static str {
        match self {
            ScoreTrend::Improving => "Improving",
            ScoreTrend::Declining => "Declining",
            ScoreTrend::Steady => "Steady",
            ScoreTrend::InsufficientData => "Insufficient Data",
        }
    }
}

/// Aggregate numbers over the stored history.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProgressStats {
    /// Completed quiz count (bounded by the history cap).
    pub completed: usize,
    /// Mean per-quiz percentage, rounded.
    pub average_pct: u32,
    /// Best per-quiz percentage.
    pub highest_pct: u32,
    /// Newest attempt compared against the third newest.
    pub trend: ScoreTrend,
}

impl ProgressStats {
    /// Derive stats from summaries ordered most recent first (the order
    /// [`crate::history::HistoryStore::list`] returns).
    pub fn from_history(history: &[HistorySummary]) -> Self {
        let percentages: Vec<u32> = history.iter().map(percentage).collect();

        let completed = percentages.len();
        let average_pct = if percentages.is_empty() {
            0
        } else {
            let sum: u32 = percentages.iter().sum();
            (sum as f64 / completed as f64).round() as u32
        };
        let highest_pct = percentages.iter().copied().max().unwrap_or(0);

        let trend = if completed < 3 {
            ScoreTrend::InsufficientData
        } else if percentages[0] > percentages[2] {
            ScoreTrend::Improving
        } else if percentages[0] < percentages[2] {
            ScoreTrend::Declining
        } else {
            ScoreTrend::Steady
        };

        Self {
            completed,
            average_pct,
            highest_pct,
            trend,
        }
    }
}

/// Rounded per-quiz percentage; a zero-question quiz counts as 0%.
pub fn percentage(summary: &HistorySummary) -> u32 {
    if summary.total_questions == 0 {
        return 0;
    }
    ((summary.score as f64 / summary.total_questions as f64) * 100.0).round() as u32
}
