//! Context handed to classification rules.

use crate::model::Role;

/// Neighborhood of one block during classification: its sibling position,
/// the role already resolved for the previous sibling, and the enclosing
/// entry's part-of-speech.
#[derive(Debug, Clone, Default)]
pub struct ClassifyContext {
    /// Position of the block among its siblings.
    pub position: usize,
    /// Role already resolved for the previous sibling, if any.
    pub prev_role: Option<Role>,
    /// Part-of-speech of the enclosing entry.
    pub entry_pos: String,
}

impl ClassifyContext {
    /// Whether the enclosing entry is a verb.
    pub fn is_verb_entry(&self) -> bool {
        self.entry_pos.trim_start().to_lowercase().starts_with("v.")
    }
}
