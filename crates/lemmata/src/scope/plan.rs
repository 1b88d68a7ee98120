//! Pure planning pass: compute every governed span before any rebuild.

use std::ops::Range;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::{AnnotationError, Result};
use crate::model::{Sense, SenseKind};

/// Chosen restructuring action for one transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScopeAction {
    /// Wrap the governed span as children of a synthetic sub-entry sense.
    Nest { form: String, pos: String },
    /// Annotate the governed span as a flat labeled group.
    Group { label: String },
}

/// One planned transition scope: the carrier sense, the contiguous span
/// of governed sibling positions, and the action to take.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransitionScope {
    /// Sibling index of the sense whose trailing block is the transition.
    pub carrier: usize,
    /// Governed sibling indices; always starts at `carrier + 1`.
    pub span: Range<usize>,
    pub action: ScopeAction,
    /// Raw markup of the transition block, for the container's trace.
    pub transition_raw: String,
    /// Stripped transition text.
    pub transition_text: String,
}

static STRONG_TRANSITION: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(S'[A-ZÉÈÊÀÂÎÏÔÙÛÜÇ].+),\s+(v\.\s*.+)").expect("strong transition pattern")
});

static FORM_POS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        "^([A-ZÉÈÊÀÂÎÏÔÙÛÜÇ][A-ZÉÈÊÀÂÎÏÔÙÛÜÇ '-]+),\\s+\
         (v\\.\\s*(?:n|a|réfl)|s\\.\\s*[mf]|adj)\\b",
    )
    .expect("form/pos pattern")
});

/// Configured classification of transition kinds: transitions announcing
/// a new form with its own part-of-speech open a sub-entry (nest), the
/// rest only shift usage (group). The patterns are corpus-tuned, not
/// inferred ad hoc.
#[derive(Debug, Clone)]
pub struct TransitionTable {
    strong: Regex,
    form_pos: Regex,
}

impl Default for TransitionTable {
    fn default() -> Self {
        Self {
            strong: STRONG_TRANSITION.clone(),
            form_pos: FORM_POS.clone(),
        }
    }
}

impl TransitionTable {
    /// Build a table from custom patterns. Each pattern must expose two
    /// capture groups: the new form and its part-of-speech.
    pub fn from_patterns(strong: &str, form_pos: &str) -> Result<Self> {
        let strong = compile_transition_pattern(strong)?;
        let form_pos = compile_transition_pattern(form_pos)?;
        Ok(Self { strong, form_pos })
    }

    /// Parse a sub-entry opener ("S'ABAISSER, v. réfl. …") into its form
    /// and part-of-speech.
    pub fn parse_sub_entry(&self, text: &str) -> Option<(String, String)> {
        for pattern in [&self.strong, &self.form_pos] {
            if let Some(captures) = pattern.captures(text) {
                let form = captures.get(1)?.as_str().trim().to_string();
                let pos = captures.get(2)?.as_str().trim().to_string();
                return Some((form, pos));
            }
        }
        None
    }

    /// Decide the restructuring action for a transition text.
    pub fn action_for(&self, text: &str) -> ScopeAction {
        match self.parse_sub_entry(text) {
            Some((form, pos)) => ScopeAction::Nest { form, pos },
            None => ScopeAction::Group {
                label: text.trim().to_string(),
            },
        }
    }
}

/// Compile a custom transition pattern, requiring the form and
/// part-of-speech capture groups `parse_sub_entry` reads.
fn compile_transition_pattern(pattern: &str) -> Result<Regex> {
    let regex = Regex::new(pattern)?;
    // captures_len counts the implicit whole-match group.
    if regex.captures_len() < 3 {
        return Err(AnnotationError::Config(format!(
            "transition pattern '{pattern}' needs a form and a part-of-speech capture group"
        )));
    }
    Ok(regex)
}

/// Compute the governed span of every transition in a sibling list.
///
/// A span runs from the sibling after the carrier up to (excluding) the
/// next boundary: a transition carrier, an already-restructured
/// container, or the end of the list. Carriers are consumed left to
/// right and each span starts where the previous ended, so the spans
/// partition a subset of the siblings with no overlap. A carrier with
/// nothing to govern (terminal, or immediately followed by a boundary)
/// gets no scope and stays in place as an annotation; containers acting
/// as boundaries is what keeps a rerun from planning anything new.
pub fn plan_scopes(siblings: &[Sense], table: &TransitionTable) -> Vec<TransitionScope> {
    let mut scopes = Vec::new();
    let mut i = 0;

    while i < siblings.len() {
        let transition = match siblings[i].trailing_transition() {
            Some(block) => block,
            None => {
                i += 1;
                continue;
            }
        };

        let mut end = siblings.len();
        for (k, sense) in siblings.iter().enumerate().skip(i + 1) {
            if sense.trailing_transition().is_some() || sense.kind != SenseKind::Plain {
                end = k;
                break;
            }
        }

        if end == i + 1 {
            i += 1;
            continue;
        }

        scopes.push(TransitionScope {
            carrier: i,
            span: (i + 1)..end,
            action: table.action_for(&transition.text),
            transition_raw: transition.raw.clone(),
            transition_text: transition.text.clone(),
        });
        i = end;
    }

    scopes
}
