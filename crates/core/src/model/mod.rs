mod card;
mod ids;
mod progress;
mod tag;

pub use ids::{ModuleName, ModuleNameError, QuestionId};

pub use card::QuestionAnswerPair;
pub use progress::{ModuleProgress, ProgressRecord};
pub use tag::{ALL_FILTER_LABEL, DEFAULT_TAGS, TagError, TagFilter, TagName, default_vocabulary};
