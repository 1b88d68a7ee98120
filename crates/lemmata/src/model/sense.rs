//! Sense nodes and the role tags restructuring assigns to them.

use serde::{Deserialize, Serialize};

use super::{Citation, IndentBlock, Markup, Role, strip_tags};

/// Role tag of a sense node. Scope resolution introduces the synthetic
/// container kinds; everything from the source starts as `Plain`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SenseKind {
    /// A sense taken directly from the source.
    Plain,
    /// Synthetic container: a strong grammatical transition opened a
    /// sub-entry with its own form and part-of-speech.
    SubEntry { form: String, pos: String },
    /// Synthetic container: a register-only shift groups the following
    /// senses under a flat label.
    UsageGroup { label: String },
}

impl Default for SenseKind {
    fn default() -> Self {
        SenseKind::Plain
    }
}

/// One sense of an entry, with its citations, flat sibling blocks, and
/// (after restructuring) nested children.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Sense {
    /// Ordinal within the parent sibling list, when numbered in the source.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub ordinal: Option<u32>,
    /// Working definition text, tags stripped.
    pub text: String,
    /// Raw markup fragment, kept verbatim for traceability.
    pub raw: Markup,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub citations: Vec<Citation>,
    /// Flat sibling units awaiting classification and restructuring.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub blocks: Vec<IndentBlock>,
    /// Nested senses or restructured groups.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<Sense>,
    #[serde(default)]
    pub kind: SenseKind,
}

impl Sense {
    /// Build a sense from its raw markup, deriving the working text.
    pub fn new(raw: impl Into<Markup>) -> Self {
        let raw = raw.into();
        let text = strip_tags(&raw);
        Self {
            ordinal: None,
            text,
            raw,
            citations: Vec::new(),
            blocks: Vec::new(),
            children: Vec::new(),
            kind: SenseKind::Plain,
        }
    }

    /// Build a numbered sense.
    pub fn numbered(ordinal: u32, raw: impl Into<Markup>) -> Self {
        let mut sense = Self::new(raw);
        sense.ordinal = Some(ordinal);
        sense
    }

    /// Attach a block (builder style).
    pub fn with_block(mut self, block: IndentBlock) -> Self {
        self.blocks.push(block);
        self
    }

    /// Attach a citation (builder style).
    pub fn with_citation(mut self, citation: Citation) -> Self {
        self.citations.push(citation);
        self
    }

    /// The trailing block, when it is a citation-free voice transition.
    /// Such a block announces forward scope over the following siblings.
    /// A transition that already grouped sibling blocks under itself has
    /// spent its scope and does not qualify.
    pub fn trailing_transition(&self) -> Option<&IndentBlock> {
        if self.kind != SenseKind::Plain {
            return None;
        }
        match self.blocks.last() {
            Some(block)
                if block.role() == Role::VoiceTransition
                    && block.citations.is_empty()
                    && block.children.is_empty() =>
            {
                Some(block)
            }
            _ => None,
        }
    }

    /// Whether this sense carries no content of its own.
    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
            && self.citations.is_empty()
            && self.blocks.is_empty()
            && self.children.is_empty()
    }
}
