use thiserror::Error;

use crate::model::{ModuleNameError, TagError};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum Error {
    #[error(transparent)]
    Tag(#[from] TagError),
    #[error(transparent)]
    ModuleName(#[from] ModuleNameError),
}
