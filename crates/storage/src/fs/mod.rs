use std::path::PathBuf;
use std::sync::Arc;

use crate::repository::{ModuleSource, ProgressRepository, Storage};

mod document_repo;
mod progress_repo;

pub use document_repo::{DocumentFolder, DocumentKind};
pub use progress_repo::JsonProgressStore;

impl Storage {
    /// Build a `Storage` reading module documents from `modules_dir` and keeping
    /// one JSON progress file per module in `progress_dir`.
    #[must_use]
    pub fn filesystem(modules_dir: impl Into<PathBuf>, progress_dir: impl Into<PathBuf>) -> Self {
        let modules: Arc<dyn ModuleSource> = Arc::new(DocumentFolder::new(modules_dir));
        let progress: Arc<dyn ProgressRepository> = Arc::new(JsonProgressStore::new(progress_dir));
        Self { modules, progress }
    }
}
