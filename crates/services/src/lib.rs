#![forbid(unsafe_code)]

pub mod error;
pub mod module_service;
pub mod sessions;
pub mod stats;

pub use flashcard_core::Clock;
pub use sessions as session;

pub use error::{ModuleError, SessionError};
pub use module_service::{ModuleSelection, ModuleService};
pub use stats::ModuleStats;

pub use sessions::{
    CardFace, CountBounds, ReviewSession, SessionCard, SessionLoopService, SessionProgress,
};
