use std::sync::Arc;

use flashcard_core::model::{
    ModuleName, ModuleProgress, ProgressRecord, QuestionAnswerPair, TagFilter,
};
use storage::repository::{ModuleSource, ProgressRepository, StorageError};
use tracing::{debug, info};

use crate::error::ModuleError;
use crate::sessions::plan::{CountBounds, MAX_SESSION_QUESTIONS, filter_by_tag};
use crate::stats::ModuleStats;

/// A module's questions merged with its stored progress.
///
/// Every parsed question has a progress record once this is built.
#[derive(Debug, Clone, PartialEq)]
pub struct ModuleSelection {
    module: ModuleName,
    questions: Vec<QuestionAnswerPair>,
    progress: ModuleProgress,
    newly_tracked: usize,
}

impl ModuleSelection {
    /// Merge `progress` with `questions`, adding zeroed records where missing.
    #[must_use]
    pub fn new(
        module: ModuleName,
        questions: Vec<QuestionAnswerPair>,
        mut progress: ModuleProgress,
    ) -> Self {
        let newly_tracked = progress.merge_questions(&questions);
        Self {
            module,
            questions,
            progress,
            newly_tracked,
        }
    }

    #[must_use]
    pub fn module(&self) -> &ModuleName {
        &self.module
    }

    #[must_use]
    pub fn questions(&self) -> &[QuestionAnswerPair] {
        &self.questions
    }

    #[must_use]
    pub fn progress(&self) -> &ModuleProgress {
        &self.progress
    }

    pub(crate) fn progress_mut(&mut self) -> &mut ModuleProgress {
        &mut self.progress
    }

    /// Number of records created by the merge that built this selection.
    #[must_use]
    pub fn newly_tracked(&self) -> usize {
        self.newly_tracked
    }

    #[must_use]
    pub fn record(&self, question: &QuestionAnswerPair) -> Option<&ProgressRecord> {
        self.progress.get(question.id())
    }

    /// Questions that pass `filter`, in document order.
    #[must_use]
    pub fn available(&self, filter: &TagFilter) -> Vec<QuestionAnswerPair> {
        filter_by_tag(&self.questions, &self.progress, filter)
    }

    /// Valid question counts for a session under `filter`.
    #[must_use]
    pub fn count_bounds(&self, filter: &TagFilter) -> Option<CountBounds> {
        CountBounds::for_available(self.available(filter).len(), MAX_SESSION_QUESTIONS)
    }
}

/// Orchestrates module discovery and loading.
#[derive(Clone)]
pub struct ModuleService {
    modules: Arc<dyn ModuleSource>,
    progress: Arc<dyn ProgressRepository>,
}

impl ModuleService {
    #[must_use]
    pub fn new(modules: Arc<dyn ModuleSource>, progress: Arc<dyn ProgressRepository>) -> Self {
        Self { modules, progress }
    }

    /// List modules sorted by name.
    ///
    /// # Errors
    ///
    /// Returns `ModuleError::NoModules` if the module folder is missing or empty.
    /// Returns `ModuleError::Storage` for other repository failures.
    pub fn list_modules(&self) -> Result<Vec<ModuleName>, ModuleError> {
        let modules = match self.modules.list_modules() {
            Ok(modules) => modules,
            Err(StorageError::NotFound(location)) => {
                return Err(ModuleError::NoModules { location });
            }
            Err(err) => return Err(err.into()),
        };
        if modules.is_empty() {
            return Err(ModuleError::NoModules {
                location: "the modules folder".to_string(),
            });
        }
        Ok(modules)
    }

    /// Parse a module, load its progress and merge the two.
    ///
    /// Nothing is written; the merged records reach disk with the first saved action.
    ///
    /// # Errors
    ///
    /// Returns `ModuleError::Storage` if the document cannot be read or the stored
    /// progress is malformed.
    pub fn open_module(&self, module: &ModuleName) -> Result<ModuleSelection, ModuleError> {
        let questions = self.modules.load_questions(module)?;
        let progress = self.progress.load(module)?;
        let selection = ModuleSelection::new(module.clone(), questions, progress);
        info!(
            module = %module,
            questions = selection.questions().len(),
            newly_tracked = selection.newly_tracked(),
            "opened module"
        );
        Ok(selection)
    }

    /// Counters and tag usage for one module.
    ///
    /// # Errors
    ///
    /// Same as [`ModuleService::open_module`].
    pub fn module_stats(&self, module: &ModuleName) -> Result<ModuleStats, ModuleError> {
        let selection = self.open_module(module)?;
        let stats = ModuleStats::from_selection(&selection);
        debug!(module = %module, attempted = stats.attempted, "computed module stats");
        Ok(stats)
    }
}
