use std::fs;
use std::io::{BufWriter, ErrorKind, Write};
use std::path::PathBuf;

use flashcard_core::model::{ModuleName, ModuleProgress};
use tempfile::NamedTempFile;
use tracing::debug;

use crate::repository::{ProgressRepository, StorageError};

/// Progress store keeping `<dir>/<module>.json` per module.
#[derive(Debug, Clone)]
pub struct JsonProgressStore {
    dir: PathBuf,
}

impl JsonProgressStore {
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    #[must_use]
    pub fn path_for(&self, module: &ModuleName) -> PathBuf {
        self.dir.join(module.progress_file_name())
    }
}

impl ProgressRepository for JsonProgressStore {
    fn load(&self, module: &ModuleName) -> Result<ModuleProgress, StorageError> {
        let path = self.path_for(module);
        let raw = match fs::read_to_string(&path) {
            Ok(raw) => raw,
            Err(err) if err.kind() == ErrorKind::NotFound => {
                debug!(module = %module, "no stored progress");
                return Ok(ModuleProgress::new());
            }
            Err(err) => return Err(err.into()),
        };

        let progress: ModuleProgress =
            serde_json::from_str(&raw).map_err(|source| StorageError::Parse {
                module: module.clone(),
                source,
            })?;
        debug!(module = %module, records = progress.len(), "loaded progress");
        Ok(progress)
    }

    fn save(&self, module: &ModuleName, progress: &ModuleProgress) -> Result<(), StorageError> {
        // Temp file lives next to the target so the rename stays on one filesystem.
        let tmp = NamedTempFile::new_in(&self.dir)?;
        let mut writer = BufWriter::new(tmp);
        serde_json::to_writer_pretty(&mut writer, progress)
            .map_err(|e| StorageError::Io(e.into()))?;
        writer.flush()?;
        let tmp = writer.into_inner().map_err(|e| e.into_error())?;
        tmp.as_file().sync_all()?;

        let path = self.path_for(module);
        tmp.persist(&path).map_err(|e| e.error)?;
        debug!(module = %module, records = progress.len(), path = %path.display(), "saved progress");
        Ok(())
    }
}
