//! Transition scope resolution.
//!
//! A trailing, citation-free voice transition governs the sibling senses
//! that follow it, up to the next such transition or the end of the list.
//! Resolution restructures the flat sibling list: a transition announcing
//! a new form with its own part-of-speech opens a nested sub-entry, a
//! register-only shift opens a flat usage group. Planning is separated
//! from rebuilding so the spans are fixed before anything moves.

mod apply;
mod plan;

pub use apply::{apply_scopes, group_blocks};
pub use plan::{plan_scopes, ScopeAction, TransitionScope, TransitionTable};

use crate::model::{Entry, Sense};

/// Outcome counters for one entry's scope pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScopeStats {
    /// Sub-entry containers created.
    pub nested: usize,
    /// Usage-group containers created.
    pub grouped: usize,
    /// Blocks moved under intra-sense markers.
    pub intra_grouped: usize,
    /// Transitions with nothing to govern, left in place.
    pub zero_scope: usize,
}

/// Resolve transition scopes across one entry, top level first, then
/// recursively inside every container and child list.
pub fn resolve_entry(entry: &mut Entry, table: &TransitionTable) -> ScopeStats {
    let mut stats = ScopeStats::default();
    resolve_siblings(&mut entry.senses, table, &mut stats);
    stats
}

fn resolve_siblings(siblings: &mut Vec<Sense>, table: &TransitionTable, stats: &mut ScopeStats) {
    let mut owned = std::mem::take(siblings);

    // Intra-sense grouping first: a transition followed by more blocks in
    // the same sense governs those blocks, not the following senses.
    for sense in &mut owned {
        stats.intra_grouped += group_blocks(&mut sense.blocks);
    }

    let carriers = owned
        .iter()
        .filter(|s| s.trailing_transition().is_some())
        .count();
    let scopes = plan_scopes(&owned, table);
    stats.zero_scope += carriers - scopes.len();
    for scope in &scopes {
        match scope.action {
            ScopeAction::Nest { .. } => stats.nested += 1,
            ScopeAction::Group { .. } => stats.grouped += 1,
        }
    }

    let mut rebuilt = apply_scopes(owned, &scopes);
    for sense in &mut rebuilt {
        resolve_siblings(&mut sense.children, table, stats);
    }
    *siblings = rebuilt;
}
