//! Shared error types for the services crate.

use thiserror::Error;

use flashcard_core::model::{ModuleName, QuestionId};
use storage::repository::StorageError;

/// Errors emitted by `ModuleService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ModuleError {
    #[error("no modules found in {location}; add .docx or .txt files there")]
    NoModules { location: String },
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted by session services.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SessionError {
    #[error("no questions available for session")]
    Empty,
    #[error("question {0} is not part of the active session")]
    UnknownQuestion(QuestionId),
    /// The change is kept in memory but could not be written.
    #[error("progress for module `{module}` was not saved: {source}")]
    Unsaved {
        module: ModuleName,
        #[source]
        source: StorageError,
    },
    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl SessionError {
    /// Returns true when the in-memory session is still consistent and only
    /// persistence failed.
    #[must_use]
    pub fn is_unsaved(&self) -> bool {
        matches!(self, SessionError::Unsaved { .. })
    }
}
