//! History persistence: quiz summaries, topic frequencies, preferences,
//! and user-data export/import.
//!
//! Reads degrade to documented defaults (with a warning) so a missing or
//! corrupt record never blocks starting a quiz; write failures are always
//! reported.

use chrono::Utc;
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::model::{
    HistorySummary, QuizOutcome, TopicFrequencyMap, UserDataExport, UserPreferences,
};
use crate::session::QuizSession;
use crate::store::{KeyValueStore, StoreError, StoreKey};

/// At most this many summaries are retained, most recent first.
pub const HISTORY_CAP: usize = 20;

/// Typed access to everything quizforge persists.
pub struct HistoryStore {
    store: Box<dyn KeyValueStore>,
}

impl HistoryStore {
    pub fn new(store: Box<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// Completed-quiz summaries, most recent first. Missing or unparseable
    /// history reads as empty.
    pub fn list(&self) -> Vec<HistorySummary> {
        self.read_or_default(StoreKey::QuizHistory)
    }

    /// Per-topic completed-quiz counts. Missing or unparseable map reads
    /// as empty.
    pub fn frequencies(&self) -> TopicFrequencyMap {
        self.read_or_default(StoreKey::CoveredTopics)
    }

    /// Stored preferences, or the defaults.
    pub fn preferences(&self) -> UserPreferences {
        self.read_or_default(StoreKey::Preferences)
    }

    /// Insert a summary at the head and truncate to [`HISTORY_CAP`], so
    /// the oldest entry falls off first.
    pub fn append(&self, summary: HistorySummary) -> Result<(), StoreError> {
        let mut history = self.list();
        history.insert(0, summary);
        history.truncate(HISTORY_CAP);
        self.write(StoreKey::QuizHistory, &history)
    }

    /// Replace the frequency map wholesale (last writer wins).
    pub fn set_frequencies(&self, map: &TopicFrequencyMap) -> Result<(), StoreError> {
        self.write(StoreKey::CoveredTopics, map)
    }

    /// Replace stored preferences wholesale.
    pub fn set_preferences(&self, prefs: &UserPreferences) -> Result<(), StoreError> {
        self.write(StoreKey::Preferences, prefs)
    }

    /// Fold a completed session into history: append its summary, then
    /// bump every settings topic's frequency by one. This is the only
    /// place frequencies change, so weighting reflects completed attempts
    /// only, never abandoned ones.
    pub fn record_completion(
        &self,
        session: &QuizSession,
        outcome: &QuizOutcome,
    ) -> Result<(), StoreError> {
        self.append(HistorySummary {
            date: session.started_at(),
            topics: session.settings.topics.clone(),
            question_types: session.settings.question_types.clone(),
            score: outcome.score,
            total_questions: outcome.total_questions,
            time_taken_ms: outcome.elapsed.as_millis() as u64,
        })?;

        let mut frequencies = self.frequencies();
        for topic in &session.settings.topics {
            *frequencies.entry(topic.clone()).or_insert(0) += 1;
        }
        self.set_frequencies(&frequencies)
    }

    /// Bundle everything into one pretty-printed JSON document.
    pub fn export_user_data(&self) -> Result<String, StoreError> {
        let export = UserDataExport {
            history: self.list(),
            covered_topics: self.frequencies(),
            preferences: self.preferences(),
            export_date: Utc::now(),
        };
        serde_json::to_string_pretty(&export)
            .map_err(|e| StoreError::Encode("user data export".into(), e))
    }

    /// Replace all stored data from an exported document.
    ///
    /// The document is validated in full before anything is written: a
    /// missing `history`, `coveredTopics`, or `preferences` field rejects
    /// the import with no partial application. History is stored as
    /// imported; the cap applies again on the next append.
    pub fn import_user_data(&self, json: &str) -> Result<UserDataExport, StoreError> {
        let import: UserDataExport =
            serde_json::from_str(json).map_err(|e| StoreError::ImportRejected(e.to_string()))?;

        self.write(StoreKey::QuizHistory, &import.history)?;
        self.write(StoreKey::CoveredTopics, &import.covered_topics)?;
        self.write(StoreKey::Preferences, &import.preferences)?;
        Ok(import)
    }

    /// Remove everything; subsequent reads see the initial defaults.
    pub fn clear_all(&self) -> Result<(), StoreError> {
        self.store.remove(StoreKey::QuizHistory)?;
        self.store.remove(StoreKey::CoveredTopics)?;
        self.store.remove(StoreKey::Preferences)
    }

    fn read_or_default<T: DeserializeOwned + Default>(&self, key: StoreKey) -> T {
        let raw = match self.store.get(key) {
            Ok(raw) => raw,
            Err(e) => {
                tracing::warn!("reading {key} failed, using default: {e}");
                return T::default();
            }
        };
        match raw {
            Some(raw) => serde_json::from_str(&raw).unwrap_or_else(|e| {
                tracing::warn!("stored {key} is unparseable, using default: {e}");
                T::default()
            }),
            None => T::default(),
        }
    }

    fn write<T: Serialize>(&self, key: StoreKey, value: &T) -> Result<(), StoreError> {
        let json =
            serde_json::to_string(value).map_err(|e| StoreError::Encode(key.to_string(), e))?;
        self.store.set(key, &json)
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration as ChronoDuration, Utc};

    use super::*;
    use crate::model::QuestionKind;
    use crate::store::MemoryStore;

    fn make_summary(score: u32) -> HistorySummary {
        HistorySummary {
            date: Utc::now() - ChronoDuration::minutes(score as i64),
            topics: vec!["dsa".into(), "javascript".into()],
            question_types: vec![QuestionKind::MultipleChoice],
            score,
            total_questions: 10,
            time_taken_ms: 600_000,
        }
    }

    fn memory_history() -> HistoryStore {
        HistoryStore::new(Box::new(MemoryStore::new()))
    }

    #[test]
    fn missing_history_reads_empty() {
        let history = memory_history();
        assert!(history.list().is_empty());
        assert!(history.frequencies().is_empty());
    }

    #[test]
    fn corrupt_history_reads_empty() {
        let store = MemoryStore::new();
        store.set(StoreKey::QuizHistory, "not json at all").unwrap();
        let history = HistoryStore::new(Box::new(store));
        assert!(history.list().is_empty());
    }

    #[test]
    fn append_is_most_recent_first_and_capped() {
        let history = memory_history();
        for score in 0..25 {
            history.append(make_summary(score)).unwrap();
        }

        let list = history.list();
        assert_eq!(list.len(), HISTORY_CAP);
        assert_eq!(list[0].score, 24);
        assert_eq!(list[HISTORY_CAP - 1].score, 5);
    }

    #[test]
    fn preferences_default_when_absent() {
        let history = memory_history();
        let prefs = history.preferences();
        assert_eq!(prefs.theme, "light");
        assert_eq!(prefs.default_time_limit_minutes, 45);
    }

    #[test]
    fn set_preferences_roundtrip() {
        let history = memory_history();
        let prefs = UserPreferences {
            theme: "dark".into(),
            default_time_limit_minutes: 30,
        };
        history.set_preferences(&prefs).unwrap();
        assert_eq!(history.preferences(), prefs);
    }

    #[test]
    fn export_import_round_trip() {
        let history = memory_history();
        history.append(make_summary(8)).unwrap();
        history
            .set_frequencies(&TopicFrequencyMap::from([("dsa".to_string(), 3)]))
            .unwrap();

        let exported = history.export_user_data().unwrap();
        history.clear_all().unwrap();
        assert!(history.list().is_empty());

        let imported = history.import_user_data(&exported).unwrap();
        assert_eq!(imported.history.len(), 1);
        assert_eq!(history.list()[0].score, 8);
        assert_eq!(history.frequencies()["dsa"], 3);
    }

    #[test]
    fn import_rejects_missing_fields_without_partial_writes() {
        let history = memory_history();
        history.append(make_summary(4)).unwrap();

        let incomplete = r#"{"history": [], "coveredTopics": {}}"#;
        let err = history.import_user_data(incomplete).unwrap_err();
        assert!(matches!(err, StoreError::ImportRejected(_)));

        // Existing data untouched.
        assert_eq!(history.list().len(), 1);
        assert_eq!(history.list()[0].score, 4);
    }

    #[test]
    fn import_preserves_oversized_history_until_next_append() {
        let history = memory_history();
        let big: Vec<HistorySummary> = (0..30).map(make_summary).collect();
        let doc = serde_json::json!({
            "history": big,
            "coveredTopics": {},
            "preferences": {"theme": "light", "defaultTimeLimit": 45},
        });

        history.import_user_data(&doc.to_string()).unwrap();
        assert_eq!(history.list().len(), 30);

        history.append(make_summary(99)).unwrap();
        assert_eq!(history.list().len(), HISTORY_CAP);
        assert_eq!(history.list()[0].score, 99);
    }

    #[test]
    fn clear_all_resets_everything() {
        let history = memory_history();
        history.append(make_summary(1)).unwrap();
        history
            .set_preferences(&UserPreferences {
                theme: "dark".into(),
                default_time_limit_minutes: 10,
            })
            .unwrap();

        history.clear_all().unwrap();
        assert!(history.list().is_empty());
        assert_eq!(history.preferences().theme, "light");
    }
}
