use rand::Rng;
use rand::seq::IndexedRandom;

use flashcard_core::model::{ModuleProgress, QuestionAnswerPair, TagFilter};

use crate::error::SessionError;
use crate::module_service::ModuleSelection;

/// Upper bound offered by the question count selector.
pub const MAX_SESSION_QUESTIONS: usize = 50;

/// Count requested when the user does not pick one.
pub const DEFAULT_SESSION_QUESTIONS: usize = 10;

/// Keep pairs whose progress record passes `filter`. `TagFilter::All` keeps everything.
#[must_use]
pub fn filter_by_tag(
    pairs: &[QuestionAnswerPair],
    progress: &ModuleProgress,
    filter: &TagFilter,
) -> Vec<QuestionAnswerPair> {
    pairs
        .iter()
        .filter(|pair| filter.matches(progress.tags_of(pair.id())))
        .cloned()
        .collect()
}

/// Draw `min(count, pairs.len())` distinct pairs uniformly at random.
#[must_use]
pub fn sample<R: Rng + ?Sized>(
    pairs: &[QuestionAnswerPair],
    count: usize,
    rng: &mut R,
) -> Vec<QuestionAnswerPair> {
    pairs
        .choose_multiple(rng, count.min(pairs.len()))
        .cloned()
        .collect()
}

/// Inclusive range `1..=max` of question counts a session may request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CountBounds {
    max: usize,
}

impl CountBounds {
    /// Bounds for `available` questions, capped at `cap`. `None` when nothing is available.
    #[must_use]
    pub fn for_available(available: usize, cap: usize) -> Option<Self> {
        let max = available.min(cap);
        (max > 0).then_some(Self { max })
    }

    #[must_use]
    pub fn min(&self) -> usize {
        1
    }

    #[must_use]
    pub fn max(&self) -> usize {
        self.max
    }

    #[must_use]
    pub fn clamp(&self, requested: usize) -> usize {
        requested.clamp(self.min(), self.max)
    }

    /// Default selector position.
    #[must_use]
    pub fn default_count(&self) -> usize {
        self.clamp(DEFAULT_SESSION_QUESTIONS)
    }
}

/// Selection result for a session build.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionPlan {
    pub cards: Vec<QuestionAnswerPair>,
    pub available: usize,
    pub requested: usize,
}

/// Builds the active set: filter by tag, clamp the count, sample.
pub struct SessionBuilder<'a> {
    selection: &'a ModuleSelection,
    filter: TagFilter,
    count: usize,
    cap: usize,
}

impl<'a> SessionBuilder<'a> {
    #[must_use]
    pub fn new(selection: &'a ModuleSelection) -> Self {
        Self {
            selection,
            filter: TagFilter::All,
            count: DEFAULT_SESSION_QUESTIONS,
            cap: MAX_SESSION_QUESTIONS,
        }
    }

    #[must_use]
    pub fn with_filter(mut self, filter: TagFilter) -> Self {
        self.filter = filter;
        self
    }

    #[must_use]
    pub fn with_count(mut self, count: usize) -> Self {
        self.count = count;
        self
    }

    #[must_use]
    pub fn with_cap(mut self, cap: usize) -> Self {
        self.cap = cap;
        self
    }

    /// # Errors
    ///
    /// Returns `SessionError::Empty` if no question passes the filter.
    pub fn build<R: Rng + ?Sized>(self, rng: &mut R) -> Result<SessionPlan, SessionError> {
        let pool = self.selection.available(&self.filter);
        let bounds =
            CountBounds::for_available(pool.len(), self.cap).ok_or(SessionError::Empty)?;
        let requested = bounds.clamp(self.count);
        let cards = sample(&pool, requested, rng);

        Ok(SessionPlan {
            cards,
            available: pool.len(),
            requested,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use flashcard_core::model::{ModuleName, ProgressRecord, QuestionId, TagName};
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use std::collections::HashSet;

    fn pairs(n: usize) -> Vec<QuestionAnswerPair> {
        (0..n)
            .map(|i| QuestionAnswerPair::new(QuestionId::from_index(i), format!("Q{i}"), "A"))
            .collect()
    }

    fn tag(name: &str) -> TagName {
        TagName::new(name).unwrap()
    }

    #[test]
    fn filter_all_is_pass_through() {
        let input = pairs(3);
        let progress = ModuleProgress::new();
        assert_eq!(filter_by_tag(&input, &progress, &TagFilter::All), input);
    }

    #[test]
    fn filter_keeps_exactly_tagged_pairs() {
        let input = pairs(1);
        let mut progress = ModuleProgress::new();
        progress.insert(
            QuestionId::from_index(0),
            ProgressRecord::new(3, 1, vec![tag("Important")]),
        );

        let important = filter_by_tag(&input, &progress, &TagFilter::Tag(tag("Important")));
        assert_eq!(important, input);

        let later = filter_by_tag(&input, &progress, &TagFilter::Tag(tag("Review Later")));
        assert!(later.is_empty());
    }

    #[test]
    fn sample_never_exceeds_request_or_input() {
        let input = pairs(5);
        let mut rng = StdRng::seed_from_u64(7);

        assert_eq!(sample(&input, 3, &mut rng).len(), 3);
        assert_eq!(sample(&input, 50, &mut rng).len(), 5);
        assert!(sample(&input, 0, &mut rng).is_empty());
        assert!(sample(&[], 4, &mut rng).is_empty());
    }

    #[test]
    fn sample_draws_distinct_members_of_input() {
        let input = pairs(20);
        let mut rng = StdRng::seed_from_u64(42);
        for _ in 0..25 {
            let drawn = sample(&input, 8, &mut rng);
            let ids: HashSet<_> = drawn.iter().map(|p| p.id().clone()).collect();
            assert_eq!(ids.len(), drawn.len());
            assert!(drawn.iter().all(|p| input.contains(p)));
        }
    }

    #[test]
    fn count_bounds_are_capped() {
        assert!(CountBounds::for_available(0, 50).is_none());
        let bounds = CountBounds::for_available(80, 50).unwrap();
        assert_eq!((bounds.min(), bounds.max()), (1, 50));
        assert_eq!(bounds.clamp(0), 1);
        assert_eq!(bounds.clamp(99), 50);
        assert_eq!(CountBounds::for_available(4, 50).unwrap().default_count(), 4);
    }

    #[test]
    fn builder_rejects_empty_pool() {
        let selection = ModuleSelection::new(
            ModuleName::new("math").unwrap(),
            pairs(2),
            ModuleProgress::new(),
        );
        let mut rng = StdRng::seed_from_u64(1);
        let err = SessionBuilder::new(&selection)
            .with_filter(TagFilter::Tag(tag("Important")))
            .build(&mut rng)
            .unwrap_err();
        assert!(matches!(err, SessionError::Empty));
    }

    #[test]
    fn builder_clamps_requested_count() {
        let selection = ModuleSelection::new(
            ModuleName::new("math").unwrap(),
            pairs(12),
            ModuleProgress::new(),
        );
        let mut rng = StdRng::seed_from_u64(3);
        let plan = SessionBuilder::new(&selection)
            .with_count(500)
            .with_cap(5)
            .build(&mut rng)
            .unwrap();
        assert_eq!(plan.requested, 5);
        assert_eq!(plan.available, 12);
        assert_eq!(plan.cards.len(), 5);
    }
}
