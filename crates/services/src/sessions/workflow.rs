use std::sync::Arc;

use flashcard_core::Clock;
use flashcard_core::model::{ProgressRecord, QuestionId, TagFilter, TagName};
use rand::Rng;
use storage::repository::ProgressRepository;
use tracing::{debug, info, warn};

use super::plan::{MAX_SESSION_QUESTIONS, SessionBuilder};
use super::service::ReviewSession;
use crate::error::SessionError;
use crate::module_service::ModuleSelection;

/// Orchestrates session start and persisted review actions.
///
/// Every mutating action updates the session in memory, then rewrites the
/// module's whole progress file.
#[derive(Clone)]
pub struct SessionLoopService {
    clock: Clock,
    progress: Arc<dyn ProgressRepository>,
}

impl SessionLoopService {
    #[must_use]
    pub fn new(clock: Clock, progress: Arc<dyn ProgressRepository>) -> Self {
        Self { clock, progress }
    }

    /// Draw an active set of up to `count` questions passing `filter`.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Empty` if no question passes the filter.
    pub fn start_session(
        &self,
        selection: ModuleSelection,
        filter: TagFilter,
        count: usize,
    ) -> Result<ReviewSession, SessionError> {
        self.start_session_with_rng(selection, filter, count, &mut rand::rng())
    }

    /// Same as [`SessionLoopService::start_session`] with a caller-provided RNG.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Empty` if no question passes the filter.
    pub fn start_session_with_rng<R: Rng + ?Sized>(
        &self,
        selection: ModuleSelection,
        filter: TagFilter,
        count: usize,
        rng: &mut R,
    ) -> Result<ReviewSession, SessionError> {
        let plan = SessionBuilder::new(&selection)
            .with_filter(filter.clone())
            .with_count(count)
            .with_cap(MAX_SESSION_QUESTIONS)
            .build(rng)?;
        info!(
            module = %selection.module(),
            filter = %filter,
            available = plan.available,
            drawn = plan.cards.len(),
            "started session"
        );
        ReviewSession::new(selection, filter, plan.cards, self.clock.now())
    }

    /// Increment the correct counter of a question and save.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::UnknownQuestion` if `id` is not in the active set.
    /// Returns `SessionError::Unsaved` if the change could not be persisted; the
    /// in-memory session keeps it.
    pub fn mark_correct(
        &self,
        session: &mut ReviewSession,
        id: &QuestionId,
    ) -> Result<ProgressRecord, SessionError> {
        let record = session.apply_correct(id)?.clone();
        self.persist(session)?;
        Ok(record)
    }

    /// Increment the incorrect counter of a question and save.
    ///
    /// # Errors
    ///
    /// Same as [`SessionLoopService::mark_correct`].
    pub fn mark_incorrect(
        &self,
        session: &mut ReviewSession,
        id: &QuestionId,
    ) -> Result<ProgressRecord, SessionError> {
        let record = session.apply_incorrect(id)?.clone();
        self.persist(session)?;
        Ok(record)
    }

    /// Replace the tags of a question and save.
    ///
    /// # Errors
    ///
    /// Same as [`SessionLoopService::mark_correct`].
    pub fn set_tags(
        &self,
        session: &mut ReviewSession,
        id: &QuestionId,
        tags: Vec<TagName>,
    ) -> Result<ProgressRecord, SessionError> {
        let record = session.apply_tags(id, tags)?.clone();
        self.persist(session)?;
        Ok(record)
    }

    /// Retry saving after a failed action. Does nothing for a clean session.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Unsaved` if persistence fails again.
    pub fn flush(&self, session: &mut ReviewSession) -> Result<(), SessionError> {
        if !session.is_dirty() {
            return Ok(());
        }
        self.persist(session)
    }

    fn persist(&self, session: &mut ReviewSession) -> Result<(), SessionError> {
        let module = session.module().clone();
        match self.progress.save(&module, session.selection().progress()) {
            Ok(()) => {
                session.set_dirty(false);
                debug!(module = %module, "progress saved");
                Ok(())
            }
            Err(source) => {
                session.set_dirty(true);
                warn!(
                    module = %module,
                    error = %source,
                    "progress not saved; keeping session state"
                );
                Err(SessionError::Unsaved { module, source })
            }
        }
    }
}
