use serde::{Deserialize, Serialize};
use std::str::FromStr;
use thiserror::Error;

/// Tags offered by the review front end.
pub const DEFAULT_TAGS: [&str; 3] = ["Important", "Very Important", "Review Later"];

/// Label used by front ends for the pass-through filter.
pub const ALL_FILTER_LABEL: &str = "All";

/// Validated tag name (trimmed, non-empty).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TagName(String);

impl TagName {
    /// Create a validated tag name.
    ///
    /// Surrounding whitespace is trimmed, also when deserializing, so a stored
    /// `" Important"` loads as `"Important"` and is saved back in that form.
    ///
    /// # Errors
    ///
    /// Returns `TagError::EmptyName` if the name is empty after trimming.
    pub fn new(value: impl Into<String>) -> Result<Self, TagError> {
        let raw = value.into();
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(TagError::EmptyName);
        }
        Ok(Self(trimmed.to_string()))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for TagName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<String> for TagName {
    type Error = TagError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<TagName> for String {
    fn from(value: TagName) -> Self {
        value.0
    }
}

/// The fixed tag vocabulary as validated names.
#[must_use]
pub fn default_vocabulary() -> Vec<TagName> {
    DEFAULT_TAGS.iter().map(|t| TagName(t.to_string())).collect()
}

/// Tag filter chosen before sampling a session.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum TagFilter {
    #[default]
    All,
    Tag(TagName),
}

impl TagFilter {
    /// Returns true if a record carrying `tags` passes this filter.
    #[must_use]
    pub fn matches(&self, tags: &[TagName]) -> bool {
        match self {
            TagFilter::All => true,
            TagFilter::Tag(wanted) => tags.contains(wanted),
        }
    }
}

impl FromStr for TagFilter {
    type Err = TagError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().eq_ignore_ascii_case(ALL_FILTER_LABEL) {
            return Ok(TagFilter::All);
        }
        TagName::new(s).map(TagFilter::Tag)
    }
}

impl std::fmt::Display for TagFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TagFilter::All => f.write_str(ALL_FILTER_LABEL),
            TagFilter::Tag(tag) => write!(f, "{tag}"),
        }
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum TagError {
    #[error("tag name cannot be empty")]
    EmptyName,
}
