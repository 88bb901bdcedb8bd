use flashcard_core::model::{ModuleName, TagName, default_vocabulary};

use crate::module_service::ModuleSelection;

/// Counter totals and tag usage of one module's current questions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleStats {
    pub module: ModuleName,
    pub questions: usize,
    pub attempted: usize,
    pub correct: u64,
    pub incorrect: u64,
    /// Vocabulary tags first, in vocabulary order, then any other tag found in the file.
    pub tag_counts: Vec<(TagName, usize)>,
}

impl ModuleStats {
    /// Stats over the questions of `selection`. Records whose ids no longer match a
    /// question in the document are left out.
    #[must_use]
    pub fn from_selection(selection: &ModuleSelection) -> Self {
        let mut stats = Self {
            module: selection.module().clone(),
            questions: selection.questions().len(),
            attempted: 0,
            correct: 0,
            incorrect: 0,
            tag_counts: default_vocabulary().into_iter().map(|t| (t, 0)).collect(),
        };

        for record in selection.questions().iter().filter_map(|q| selection.record(q)) {
            if record.attempts() > 0 {
                stats.attempted += 1;
            }
            stats.correct += u64::from(record.correct());
            stats.incorrect += u64::from(record.incorrect());
            for tag in record.tags() {
                let existing = stats.tag_counts.iter().position(|(t, _)| t == tag);
                match existing {
                    Some(index) => stats.tag_counts[index].1 += 1,
                    None => stats.tag_counts.push((tag.clone(), 1)),
                }
            }
        }
        stats
    }

    /// Share of correct marks over all attempts, `None` before any attempt.
    #[must_use]
    pub fn accuracy(&self) -> Option<f64> {
        let total = self.correct + self.incorrect;
        if total == 0 {
            return None;
        }
        #[allow(clippy::cast_precision_loss)]
        let ratio = self.correct as f64 / total as f64;
        Some(ratio)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use flashcard_core::model::{ModuleProgress, ProgressRecord, QuestionAnswerPair, QuestionId};

    fn tag(name: &str) -> TagName {
        TagName::new(name).unwrap()
    }

    #[test]
    fn sums_counters_of_current_questions() {
        let pairs = (0..3)
            .map(|i| QuestionAnswerPair::new(QuestionId::from_index(i), "Q", "A"))
            .collect();
        let mut progress = ModuleProgress::new();
        progress.insert(
            QuestionId::from_index(0),
            ProgressRecord::new(3, 1, vec![tag("Important")]),
        );
        progress.insert(
            QuestionId::from_index(2),
            ProgressRecord::new(0, 2, vec![tag("Important"), tag("Exam")]),
        );
        // Stale record beyond the end of the document.
        progress.insert(QuestionId::from_index(9), ProgressRecord::new(50, 0, Vec::new()));

        let selection =
            ModuleSelection::new(ModuleName::new("math").unwrap(), pairs, progress);
        let stats = ModuleStats::from_selection(&selection);

        assert_eq!(stats.questions, 3);
        assert_eq!(stats.attempted, 2);
        assert_eq!((stats.correct, stats.incorrect), (3, 3));
        assert_eq!(stats.accuracy(), Some(0.5));
        assert_eq!(
            stats.tag_counts,
            vec![
                (tag("Important"), 2),
                (tag("Very Important"), 0),
                (tag("Review Later"), 0),
                (tag("Exam"), 1),
            ]
        );
    }

    #[test]
    fn fresh_module_has_no_accuracy() {
        let selection = ModuleSelection::new(
            ModuleName::new("math").unwrap(),
            Vec::new(),
            ModuleProgress::new(),
        );
        let stats = ModuleStats::from_selection(&selection);
        assert_eq!(stats.accuracy(), None);
        assert_eq!(stats.attempted, 0);
    }
}
