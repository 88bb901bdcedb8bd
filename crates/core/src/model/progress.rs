use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::model::card::QuestionAnswerPair;
use crate::model::ids::QuestionId;
use crate::model::tag::TagName;

//
// ─── RECORD ────────────────────────────────────────────────────────────────────
//

/// Cumulative statistics and tags for one question.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ProgressRecord {
    correct: u32,
    incorrect: u32,
    tags: Vec<TagName>,
}

impl ProgressRecord {
    #[must_use]
    pub fn new(correct: u32, incorrect: u32, tags: Vec<TagName>) -> Self {
        let mut record = Self {
            correct,
            incorrect,
            tags: Vec::new(),
        };
        record.set_tags(tags);
        record
    }

    #[must_use]
    pub fn correct(&self) -> u32 {
        self.correct
    }

    #[must_use]
    pub fn incorrect(&self) -> u32 {
        self.incorrect
    }

    #[must_use]
    pub fn tags(&self) -> &[TagName] {
        &self.tags
    }

    #[must_use]
    pub fn has_tag(&self, tag: &TagName) -> bool {
        self.tags.contains(tag)
    }

    /// Total number of times this question was marked either way.
    #[must_use]
    pub fn attempts(&self) -> u64 {
        u64::from(self.correct) + u64::from(self.incorrect)
    }

    /// Share of correct marks, or `None` before the first attempt.
    #[must_use]
    pub fn accuracy(&self) -> Option<f64> {
        let attempts = self.attempts();
        if attempts == 0 {
            return None;
        }
        #[allow(clippy::cast_precision_loss)]
        let attempts = attempts as f64;
        Some(f64::from(self.correct) / attempts)
    }

    pub fn record_correct(&mut self) {
        self.correct = self.correct.saturating_add(1);
    }

    pub fn record_incorrect(&mut self) {
        self.incorrect = self.incorrect.saturating_add(1);
    }

    /// Replace the tag set. Duplicates collapse, first occurrence wins.
    pub fn set_tags(&mut self, tags: impl IntoIterator<Item = TagName>) {
        self.tags.clear();
        for tag in tags {
            if !self.tags.contains(&tag) {
                self.tags.push(tag);
            }
        }
    }
}

//
// ─── MODULE PROGRESS ───────────────────────────────────────────────────────────
//

/// Progress of every question in a module, keyed by question id.
///
/// Serializes as a plain JSON object: `{ "<id>": { "correct", "incorrect", "tags" } }`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ModuleProgress {
    records: BTreeMap<QuestionId, ProgressRecord>,
}

impl ModuleProgress {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    #[must_use]
    pub fn contains(&self, id: &QuestionId) -> bool {
        self.records.contains_key(id)
    }

    #[must_use]
    pub fn get(&self, id: &QuestionId) -> Option<&ProgressRecord> {
        self.records.get(id)
    }

    pub fn get_mut(&mut self, id: &QuestionId) -> Option<&mut ProgressRecord> {
        self.records.get_mut(id)
    }

    pub fn insert(&mut self, id: QuestionId, record: ProgressRecord) -> Option<ProgressRecord> {
        self.records.insert(id, record)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&QuestionId, &ProgressRecord)> {
        self.records.iter()
    }

    /// Tags of a question, empty when it has no record.
    #[must_use]
    pub fn tags_of(&self, id: &QuestionId) -> &[TagName] {
        self.records
            .get(id)
            .map(ProgressRecord::tags)
            .unwrap_or_default()
    }

    /// Insert a zeroed record for every pair that has none yet.
    ///
    /// Existing records keep their counts and tags, so merging twice is a no-op.
    /// Returns the number of records inserted.
    pub fn merge_questions<'a>(
        &mut self,
        pairs: impl IntoIterator<Item = &'a QuestionAnswerPair>,
    ) -> usize {
        let mut inserted = 0;
        for pair in pairs {
            if !self.records.contains_key(pair.id()) {
                self.records
                    .insert(pair.id().clone(), ProgressRecord::default());
                inserted += 1;
            }
        }
        inserted
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;

    fn tag(name: &str) -> TagName {
        TagName::new(name).unwrap()
    }

    fn pair(index: usize) -> QuestionAnswerPair {
        QuestionAnswerPair::new(QuestionId::from_index(index), format!("Q{index}"), "A")
    }

    #[test]
    fn counters_are_cumulative() {
        let mut record = ProgressRecord::default();
        record.record_correct();
        record.record_correct();
        record.record_incorrect();
        assert_eq!(record.correct(), 2);
        assert_eq!(record.incorrect(), 1);
        assert_eq!(record.attempts(), 3);
    }

    #[test]
    fn accuracy_is_none_before_first_attempt() {
        let mut record = ProgressRecord::default();
        assert_eq!(record.accuracy(), None);
        record.record_correct();
        record.record_incorrect();
        assert_eq!(record.accuracy(), Some(0.5));
    }

    #[test]
    fn set_tags_replaces_and_dedupes() {
        let mut record = ProgressRecord::new(0, 0, vec![tag("Important")]);
        record.set_tags(vec![tag("Review Later"), tag("Review Later"), tag("Very Important")]);
        assert_eq!(record.tags(), &[tag("Review Later"), tag("Very Important")]);
        assert!(!record.has_tag(&tag("Important")));
    }

    #[test]
    fn merge_inserts_fresh_records_keyed_by_position() {
        let pairs = vec![pair(0), pair(1)];
        let mut progress = ModuleProgress::new();
        let inserted = progress.merge_questions(&pairs);

        assert_eq!(inserted, 2);
        assert_eq!(progress.len(), 2);
        for p in &pairs {
            assert_eq!(progress.get(p.id()), Some(&ProgressRecord::default()));
        }
    }

    #[test]
    fn merge_keeps_existing_records() {
        let pairs = vec![pair(0), pair(1)];
        let mut progress = ModuleProgress::new();
        progress.insert(
            QuestionId::from_index(0),
            ProgressRecord::new(3, 1, vec![tag("Important")]),
        );

        assert_eq!(progress.merge_questions(&pairs), 1);
        let after_first = progress.clone();
        assert_eq!(progress.merge_questions(&pairs), 0);
        assert_eq!(progress, after_first);

        let kept = progress.get(&QuestionId::from_index(0)).unwrap();
        assert_eq!(kept.correct(), 3);
        assert_eq!(kept.tags(), &[tag("Important")]);
    }

    #[test]
    fn serializes_as_flat_object() {
        let mut progress = ModuleProgress::new();
        let mut record = ProgressRecord::default();
        record.record_correct();
        progress.insert(QuestionId::from_index(0), record);

        let json = serde_json::to_value(&progress).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"0": {"correct": 1, "incorrect": 0, "tags": []}})
        );
    }

    #[test]
    fn rejects_negative_counts() {
        let parsed: Result<ModuleProgress, _> =
            serde_json::from_str(r#"{"0": {"correct": -1, "incorrect": 0, "tags": []}}"#);
        assert!(parsed.is_err());
    }

    #[test]
    fn tags_of_missing_record_is_empty() {
        let progress = ModuleProgress::new();
        assert!(progress.tags_of(&QuestionId::from_index(7)).is_empty());
    }
}
