//! Indent block classification.
//!
//! Assigns each flat sibling block a semantic role with a confidence tier
//! and an evidence trail naming the rule that matched. Classification is a
//! deterministic function of block content and already-resolved neighbor
//! context; it never reorders siblings and never blocks on uncertainty.

mod context;
mod rules;

pub use context::ClassifyContext;
pub use rules::Rule;

use crate::model::{Classification, Confidence, Entry, IndentBlock, Role, Sense};

/// The classification engine: an ordered cascade where the first matching
/// rule wins. The order is corpus-tuned and part of the contract.
pub struct Classifier {
    rules: Vec<Box<dyn Rule>>,
}

impl Classifier {
    /// Create a classifier with the contractual rule cascade.
    pub fn new() -> Self {
        Self {
            rules: rules::cascade(),
        }
    }

    /// Classify every block of an entry, in sibling order.
    pub fn classify_entry(&self, entry: &mut Entry) {
        let entry_pos = entry.pos.clone();
        for sense in &mut entry.senses {
            self.classify_sense(sense, &entry_pos);
        }
    }

    fn classify_sense(&self, sense: &mut Sense, entry_pos: &str) {
        self.classify_siblings(&mut sense.blocks, entry_pos);
        for child in &mut sense.children {
            self.classify_sense(child, entry_pos);
        }
    }

    fn classify_siblings(&self, blocks: &mut [IndentBlock], entry_pos: &str) {
        for i in 0..blocks.len() {
            let prev_role = if i > 0 { Some(blocks[i - 1].role()) } else { None };
            let ctx = ClassifyContext {
                position: blocks[i].position,
                prev_role,
                entry_pos: entry_pos.to_string(),
            };
            self.classify_block(&mut blocks[i], &ctx);
            self.classify_siblings(&mut blocks[i].children, entry_pos);
        }
    }

    /// Classify one block. Already-classified blocks are left untouched,
    /// so reapplying the cascade is a no-op.
    pub fn classify_block(&self, block: &mut IndentBlock, ctx: &ClassifyContext) {
        if block.classification.is_some() {
            return;
        }
        for rule in &self.rules {
            if let Some(classification) = rule.try_match(block, ctx) {
                block.classification = Some(classification);
                return;
            }
        }
        block.classification = Some(Classification::new(
            Role::Unclassified,
            Confidence::Low,
            "unmatched",
        ));
    }
}

impl Default for Classifier {
    fn default() -> Self {
        Self::new()
    }
}
