//! Error types for the lemmata library.

use thiserror::Error;

/// Main error type for annotation operations.
#[derive(Debug, Error)]
pub enum AnnotationError {
    /// Malformed entry tree. Fatal to the entry only; the corpus run
    /// continues and the failure is surfaced as a review flag.
    #[error("structural error in entry '{entry_id}': {message}")]
    Structure { entry_id: String, message: String },

    /// Invalid pipeline configuration.
    #[error("configuration error: {0}")]
    Config(String),

    /// Invalid pattern supplied for a configurable rule table.
    #[error("regex error: {0}")]
    Regex(#[from] regex::Error),
}

impl AnnotationError {
    /// Build a structural error for an entry.
    pub fn structure(entry_id: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Structure {
            entry_id: entry_id.into(),
            message: message.into(),
        }
    }
}

/// Result type alias for annotation operations.
pub type Result<T> = std::result::Result<T, AnnotationError>;
