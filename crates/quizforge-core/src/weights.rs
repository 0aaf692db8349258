//! Topic weighting from history frequencies.
//!
//! Topics practiced less often get proportionally more emphasis in the
//! next generation request: raw weight `1 / (frequency + 1)`, normalized
//! over the requested set.

use std::collections::HashMap;

use crate::model::TopicFrequencyMap;

/// Compute normalized emphasis weights for the requested topics.
///
/// An unseen topic weighs 1.0 before normalization; a heavily practiced
/// one approaches but never reaches zero, so every requested topic keeps a
/// positive share. The weights sum to 1.0; an empty topic list yields an
/// empty map. Pure function, no failure mode.
pub fn compute_topic_weights(
    topics: &[String],
    frequencies: &TopicFrequencyMap,
) -> HashMap<String, f64> {
    if topics.is_empty() {
        return HashMap::new();
    }

    let raw: Vec<(String, f64)> = topics
        .iter()
        .map(|topic| {
            let freq = frequencies.get(topic).copied().unwrap_or(0);
            (topic.clone(), 1.0 / (freq as f64 + 1.0))
        })
        .collect();

    let total: f64 = raw.iter().map(|(_, w)| w).sum();

    raw.into_iter().map(|(t, w)| (t, w / total)).collect()
}
