//! Dictionary entry: the unit of annotation.

use serde::{Deserialize, Serialize};

use super::{Citation, IndentBlock, Markup, Sense};

/// A dictionary entry and the sense tree it exclusively owns.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Entry {
    /// The entry's canonical form (lemma).
    pub headword: String,
    /// Stable identifier, unique across the corpus.
    pub id: String,
    /// Part-of-speech string as printed in the source (`v. a.`, `s. m.`, …).
    #[serde(default)]
    pub pos: String,
    #[serde(default)]
    pub pronunciation: String,
    pub senses: Vec<Sense>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub etymology: Option<Markup>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub historical_note: Option<Markup>,
    /// Whether the entry comes from the supplement volume.
    #[serde(default)]
    pub supplement: bool,
    /// Source origin marker (volume letter).
    #[serde(default)]
    pub source: String,
}

impl Entry {
    /// Create an entry with no senses yet.
    pub fn new(headword: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            headword: headword.into(),
            id: id.into(),
            pos: String::new(),
            pronunciation: String::new(),
            senses: Vec::new(),
            etymology: None,
            historical_note: None,
            supplement: false,
            source: String::new(),
        }
    }

    /// Set the part-of-speech (builder style).
    pub fn with_pos(mut self, pos: impl Into<String>) -> Self {
        self.pos = pos.into();
        self
    }

    /// Attach a sense (builder style).
    pub fn with_sense(mut self, sense: Sense) -> Self {
        self.senses.push(sense);
        self
    }

    /// All citations in document order: for each sense, its own citations,
    /// then its blocks depth-first, then its children. This is the order
    /// the idem-resolution fold walks.
    pub fn citations(&self) -> Vec<&Citation> {
        let mut out = Vec::new();
        for sense in &self.senses {
            collect_sense(sense, &mut out);
        }
        out
    }

    /// Mutable variant of [`Entry::citations`], same order.
    pub fn citations_mut(&mut self) -> Vec<&mut Citation> {
        let mut out = Vec::new();
        for sense in &mut self.senses {
            collect_sense_mut(sense, &mut out);
        }
        out
    }
}

fn collect_sense<'a>(sense: &'a Sense, out: &mut Vec<&'a Citation>) {
    out.extend(sense.citations.iter());
    for block in &sense.blocks {
        collect_block(block, out);
    }
    for child in &sense.children {
        collect_sense(child, out);
    }
}

fn collect_block<'a>(block: &'a IndentBlock, out: &mut Vec<&'a Citation>) {
    out.extend(block.citations.iter());
    for child in &block.children {
        collect_block(child, out);
    }
}

fn collect_sense_mut<'a>(sense: &'a mut Sense, out: &mut Vec<&'a mut Citation>) {
    out.extend(sense.citations.iter_mut());
    for block in &mut sense.blocks {
        collect_block_mut(block, out);
    }
    for child in &mut sense.children {
        collect_sense_mut(child, out);
    }
}

fn collect_block_mut<'a>(block: &'a mut IndentBlock, out: &mut Vec<&'a mut Citation>) {
    out.extend(block.citations.iter_mut());
    for child in &mut block.children {
        collect_block_mut(child, out);
    }
}
