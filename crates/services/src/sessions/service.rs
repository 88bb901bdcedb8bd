use chrono::{DateTime, Utc};

use flashcard_core::model::{
    ModuleName, ProgressRecord, QuestionAnswerPair, QuestionId, TagFilter, TagName,
};

use super::progress::SessionProgress;
use crate::error::SessionError;
use crate::module_service::ModuleSelection;

//
// ─── CARD ──────────────────────────────────────────────────────────────────────
//

/// Whether the answer of a card is shown. There is no way back to `Hidden`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CardFace {
    #[default]
    Hidden,
    Revealed,
}

/// A question of the active set with its per-session state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionCard {
    pair: QuestionAnswerPair,
    face: CardFace,
    marked_correct: u32,
    marked_incorrect: u32,
}

impl SessionCard {
    fn new(pair: QuestionAnswerPair) -> Self {
        Self {
            pair,
            face: CardFace::Hidden,
            marked_correct: 0,
            marked_incorrect: 0,
        }
    }

    #[must_use]
    pub fn id(&self) -> &QuestionId {
        self.pair.id()
    }

    #[must_use]
    pub fn pair(&self) -> &QuestionAnswerPair {
        &self.pair
    }

    #[must_use]
    pub fn face(&self) -> CardFace {
        self.face
    }

    #[must_use]
    pub fn is_revealed(&self) -> bool {
        self.face == CardFace::Revealed
    }

    /// Answer text, only once revealed.
    #[must_use]
    pub fn visible_answer(&self) -> Option<&str> {
        self.is_revealed().then(|| self.pair.answer())
    }

    /// Correct marks given during this session.
    #[must_use]
    pub fn marked_correct(&self) -> u32 {
        self.marked_correct
    }

    /// Incorrect marks given during this session.
    #[must_use]
    pub fn marked_incorrect(&self) -> u32 {
        self.marked_incorrect
    }
}

//
// ─── SESSION ───────────────────────────────────────────────────────────────────
//

/// Session-scoped review context.
///
/// Owns the merged module progress and the sampled active set. Every front-end
/// handler receives this explicitly; nothing is kept in globals.
#[derive(Debug, Clone)]
pub struct ReviewSession {
    selection: ModuleSelection,
    filter: TagFilter,
    cards: Vec<SessionCard>,
    started_at: DateTime<Utc>,
    dirty: bool,
}

impl ReviewSession {
    /// Create a session over `cards`, which must belong to `selection`.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Empty` if no cards are provided.
    /// Returns `SessionError::UnknownQuestion` if a card has no progress record.
    pub fn new(
        selection: ModuleSelection,
        filter: TagFilter,
        cards: Vec<QuestionAnswerPair>,
        started_at: DateTime<Utc>,
    ) -> Result<Self, SessionError> {
        if cards.is_empty() {
            return Err(SessionError::Empty);
        }
        if let Some(stray) = cards.iter().find(|c| !selection.progress().contains(c.id())) {
            return Err(SessionError::UnknownQuestion(stray.id().clone()));
        }

        Ok(Self {
            selection,
            filter,
            cards: cards.into_iter().map(SessionCard::new).collect(),
            started_at,
            dirty: false,
        })
    }

    #[must_use]
    pub fn module(&self) -> &ModuleName {
        self.selection.module()
    }

    #[must_use]
    pub fn filter(&self) -> &TagFilter {
        &self.filter
    }

    #[must_use]
    pub fn selection(&self) -> &ModuleSelection {
        &self.selection
    }

    /// Give back the module selection, with every change made in this session,
    /// so a new active set can be drawn.
    #[must_use]
    pub fn into_selection(self) -> ModuleSelection {
        self.selection
    }

    #[must_use]
    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    #[must_use]
    pub fn cards(&self) -> &[SessionCard] {
        &self.cards
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.cards.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    #[must_use]
    pub fn card(&self, id: &QuestionId) -> Option<&SessionCard> {
        self.cards.iter().find(|c| c.id() == id)
    }

    /// Stored statistics of a question in the active set.
    #[must_use]
    pub fn record(&self, id: &QuestionId) -> Option<&ProgressRecord> {
        self.card(id)?;
        self.selection.progress().get(id)
    }

    /// True when the last save failed and in-memory progress is ahead of storage.
    #[must_use]
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Show the answer of a card. Revealing twice changes nothing.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::UnknownQuestion` if `id` is not in the active set.
    pub fn reveal(&mut self, id: &QuestionId) -> Result<&SessionCard, SessionError> {
        let card = self.card_mut(id)?;
        card.face = CardFace::Revealed;
        Ok(&*card)
    }

    #[must_use]
    pub fn progress(&self) -> SessionProgress {
        let revealed = self.cards.iter().filter(|c| c.is_revealed()).count();
        let untouched = self
            .cards
            .iter()
            .filter(|c| !c.is_revealed() && c.marked_correct == 0 && c.marked_incorrect == 0)
            .count();
        SessionProgress {
            total: self.cards.len(),
            revealed,
            marked_correct: self.cards.iter().map(|c| c.marked_correct).sum(),
            marked_incorrect: self.cards.iter().map(|c| c.marked_incorrect).sum(),
            untouched,
        }
    }

    pub(crate) fn apply_correct(
        &mut self,
        id: &QuestionId,
    ) -> Result<&ProgressRecord, SessionError> {
        let card = self.card_mut(id)?;
        card.marked_correct = card.marked_correct.saturating_add(1);
        let record = self.record_mut(id)?;
        record.record_correct();
        Ok(&*record)
    }

    pub(crate) fn apply_incorrect(
        &mut self,
        id: &QuestionId,
    ) -> Result<&ProgressRecord, SessionError> {
        let card = self.card_mut(id)?;
        card.marked_incorrect = card.marked_incorrect.saturating_add(1);
        let record = self.record_mut(id)?;
        record.record_incorrect();
        Ok(&*record)
    }

    pub(crate) fn apply_tags(
        &mut self,
        id: &QuestionId,
        tags: Vec<TagName>,
    ) -> Result<&ProgressRecord, SessionError> {
        self.card_mut(id)?;
        let record = self.record_mut(id)?;
        record.set_tags(tags);
        Ok(&*record)
    }

    pub(crate) fn set_dirty(&mut self, dirty: bool) {
        self.dirty = dirty;
    }

    fn card_mut(&mut self, id: &QuestionId) -> Result<&mut SessionCard, SessionError> {
        self.cards
            .iter_mut()
            .find(|c| c.id() == id)
            .ok_or_else(|| SessionError::UnknownQuestion(id.clone()))
    }

    fn record_mut(&mut self, id: &QuestionId) -> Result<&mut ProgressRecord, SessionError> {
        self.selection
            .progress_mut()
            .get_mut(id)
            .ok_or_else(|| SessionError::UnknownQuestion(id.clone()))
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
