use flashcard_core::model::{ModuleName, ModuleProgress, QuestionAnswerPair};
use flashcard_core::parser::parse_paragraphs;
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};
use thiserror::Error;

/// Errors surfaced by storage adapters.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StorageError {
    #[error("not found: {0}")]
    NotFound(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("progress for module `{module}` is not valid JSON: {source}")]
    Parse {
        module: ModuleName,
        #[source]
        source: serde_json::Error,
    },

    #[error("unreadable document for module `{module}`: {reason}")]
    Document { module: ModuleName, reason: String },

    #[error("connection error: {0}")]
    Connection(String),
}

/// Repository contract for per-module progress.
pub trait ProgressRepository: Send + Sync {
    /// Load the progress mapping of a module. A module with no stored progress
    /// yields an empty mapping.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Parse` if stored progress is malformed, or other
    /// storage errors.
    fn load(&self, module: &ModuleName) -> Result<ModuleProgress, StorageError>;

    /// Replace the stored progress of a module with `progress`.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the progress cannot be written.
    fn save(&self, module: &ModuleName, progress: &ModuleProgress) -> Result<(), StorageError>;
}

/// Repository contract for module documents.
pub trait ModuleSource: Send + Sync {
    /// List available modules sorted by name.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::NotFound` if the module location does not exist.
    fn list_modules(&self) -> Result<Vec<ModuleName>, StorageError>;

    /// Parse the question/answer pairs of a module in document order.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::NotFound` if the module is missing, or
    /// `StorageError::Io`/`StorageError::Document` if it cannot be read.
    fn load_questions(&self, module: &ModuleName) -> Result<Vec<QuestionAnswerPair>, StorageError>;
}

/// Simple in-memory repository implementation for testing and prototyping.
///
/// Documents are stored as paragraph lists and run through the same parser as
/// files on disk.
#[derive(Clone, Default)]
pub struct InMemoryRepository {
    documents: Arc<Mutex<BTreeMap<ModuleName, Vec<String>>>>,
    progress: Arc<Mutex<BTreeMap<ModuleName, ModuleProgress>>>,
}

impl InMemoryRepository {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a module document as a list of paragraphs.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Connection` if the store lock is poisoned.
    pub fn insert_document<I, S>(&self, module: ModuleName, paragraphs: I) -> Result<(), StorageError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut guard = self
            .documents
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        guard.insert(module, paragraphs.into_iter().map(Into::into).collect());
        Ok(())
    }
}

impl ProgressRepository for InMemoryRepository {
    fn load(&self, module: &ModuleName) -> Result<ModuleProgress, StorageError> {
        let guard = self
            .progress
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        Ok(guard.get(module).cloned().unwrap_or_default())
    }

    fn save(&self, module: &ModuleName, progress: &ModuleProgress) -> Result<(), StorageError> {
        let mut guard = self
            .progress
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        guard.insert(module.clone(), progress.clone());
        Ok(())
    }
}

impl ModuleSource for InMemoryRepository {
    fn list_modules(&self) -> Result<Vec<ModuleName>, StorageError> {
        let guard = self
            .documents
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        Ok(guard.keys().cloned().collect())
    }

    fn load_questions(&self, module: &ModuleName) -> Result<Vec<QuestionAnswerPair>, StorageError> {
        let guard = self
            .documents
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        let paragraphs = guard
            .get(module)
            .ok_or_else(|| StorageError::NotFound(module.to_string()))?;
        Ok(parse_paragraphs(paragraphs))
    }
}

/// Aggregates module and progress repositories behind trait objects for easy backend swapping.
#[derive(Clone)]
pub struct Storage {
    pub modules: Arc<dyn ModuleSource>,
    pub progress: Arc<dyn ProgressRepository>,
}

impl Storage {
    #[must_use]
    pub fn from_in_memory(repo: InMemoryRepository) -> Self {
        let modules: Arc<dyn ModuleSource> = Arc::new(repo.clone());
        let progress: Arc<dyn ProgressRepository> = Arc::new(repo);
        Self { modules, progress }
    }
}
