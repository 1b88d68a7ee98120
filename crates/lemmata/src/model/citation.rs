//! Citation records attached to senses and blocks.

use serde::{Deserialize, Serialize};

use super::Markup;

/// A quotation supporting a sense, with its author attribution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Citation {
    /// Quoted text, markup preserved.
    pub quote: Markup,
    /// Raw author token as printed in the source. `ID.` means "same
    /// author as the previous citation".
    pub author: String,
    /// Bibliographic reference (work, act/scene, page).
    #[serde(default)]
    pub reference: String,
    /// Canonicalized concrete author, filled by resolution. `None` after
    /// resolution means the attribution could not be established and a
    /// flag was raised; it is never guessed.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub resolved_author: Option<String>,
}

impl Citation {
    /// Create an unresolved citation.
    pub fn new(
        quote: impl Into<Markup>,
        author: impl Into<String>,
        reference: impl Into<String>,
    ) -> Self {
        Self {
            quote: quote.into(),
            author: author.into(),
            reference: reference.into(),
            resolved_author: None,
        }
    }
}
