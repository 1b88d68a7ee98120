//! Canonical-form extraction for locution blocks.
//!
//! A locution block mixes the fixed phrase with its gloss ("Chemin
//! faisant, pendant le trajet"). Extraction pulls the head-phrase into
//! `canonical_form` and trims it out of the working definition text, so
//! the form never remains duplicated in the definition. Blocks that were
//! mistaken for locutions but actually open a reflexive sub-entry are
//! reclassified as voice transitions and handed to the scope resolver.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::model::{Classification, Confidence, Entry, IndentBlock, Role, Sense};

static REFLEXIVE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^S'[A-ZÉÈÊÀÂÎÏÔÙÛÜÇ].*,\s*v\.\s*réfl").expect("reflexive pattern")
});

/// Longest head accepted as a canonical form. Anything longer is gloss
/// prose with an incidental comma.
const MAX_FORM_LEN: usize = 60;

/// Outcome counters for one entry's extraction pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExtractionStats {
    pub extracted: usize,
    /// Reflexive sub-entry openers reclassified to voice transitions.
    pub reclassified: usize,
    /// Locutions with no extractable head; left null and flagged by the
    /// collector.
    pub skipped: usize,
}

/// Extract canonical forms across one entry.
pub fn extract_entry(entry: &mut Entry) -> ExtractionStats {
    let mut stats = ExtractionStats::default();
    for sense in &mut entry.senses {
        extract_sense(sense, &mut stats);
    }
    stats
}

fn extract_sense(sense: &mut Sense, stats: &mut ExtractionStats) {
    for block in &mut sense.blocks {
        extract_block_tree(block, stats);
    }
    for child in &mut sense.children {
        extract_sense(child, stats);
    }
}

fn extract_block_tree(block: &mut IndentBlock, stats: &mut ExtractionStats) {
    extract_block(block, stats);
    for child in &mut block.children {
        extract_block_tree(child, stats);
    }
}

/// Extract the canonical form of one locution block. Idempotent: a block
/// with a form already set is left untouched.
pub fn extract_block(block: &mut IndentBlock, stats: &mut ExtractionStats) {
    if block.role() != Role::Locution || block.canonical_form.is_some() {
        return;
    }

    // "S'ABAISSER, v. réfl." is a sub-entry opener, not a locution.
    if REFLEXIVE.is_match(&block.text) {
        block.classification = Some(Classification::new(
            Role::VoiceTransition,
            Confidence::High,
            "locution_reflexive_recovery",
        ));
        stats.reclassified += 1;
        return;
    }

    // An <exemple> span names the phrase outright.
    if let Some(form) = block.span("exemple").map(|s| s.text.trim().to_string()) {
        if !form.is_empty() {
            remove_once(&mut block.text, &form);
            block.canonical_form = Some(form);
            stats.extracted += 1;
            return;
        }
    }

    match split_head(&block.text) {
        Some((form, rest)) => {
            block.canonical_form = Some(form);
            block.text = rest;
            stats.extracted += 1;
        }
        None => stats.skipped += 1,
    }
}

/// Split the leading phrase off at the first comma. Returns `None` when
/// there is no comma or the head is too long to be a phrase.
fn split_head(text: &str) -> Option<(String, String)> {
    let idx = text.find(',')?;
    let form = text[..idx].trim();
    if form.is_empty() || form.chars().count() > MAX_FORM_LEN {
        return None;
    }
    let rest = text[idx + 1..].trim_start().to_string();
    Some((form.to_string(), rest))
}

/// Remove the first occurrence of `needle` from `text`, collapsing the
/// surrounding whitespace.
fn remove_once(text: &mut String, needle: &str) {
    if let Some(pos) = text.find(needle) {
        let mut next = String::with_capacity(text.len() - needle.len());
        next.push_str(text[..pos].trim_end());
        next.push(' ');
        next.push_str(text[pos + needle.len()..].trim_start());
        *text = next.trim().to_string();
    }
}
