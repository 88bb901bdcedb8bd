pub mod plan;
mod progress;
mod service;
mod workflow;

// Public API of the session subsystem.
pub use crate::error::SessionError;
pub use plan::{
    CountBounds, DEFAULT_SESSION_QUESTIONS, MAX_SESSION_QUESTIONS, SessionBuilder, SessionPlan,
    filter_by_tag, sample,
};
pub use progress::SessionProgress;
pub use service::{CardFace, ReviewSession, SessionCard};
pub use workflow::SessionLoopService;
