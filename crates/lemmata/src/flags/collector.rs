//! Post-hoc flag collection.
//!
//! Flags are a pure function of the annotated model: the collector scans
//! the frozen entry after every phase has run and raises one flag per
//! finding. Running the pipeline twice therefore yields the same flag
//! set, and the phases themselves never have to thread flag state.

use std::collections::BTreeMap;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::authors;
use crate::model::{Confidence, Entry, IndentBlock, Role, Sense, SenseKind};

use super::flag::{FlagCategory, FlagTarget, ReviewFlag};

/// Collector thresholds. The defaults are corpus-tuned.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct FlagConfig {
    /// A container governing more child senses than this is suspect.
    pub max_span: usize,
    /// A marker block grouping more sibling blocks than this is suspect.
    pub max_intra: usize,
    /// Calibration samples drawn per (role, confidence) bucket.
    pub calibration_per_bucket: usize,
    /// Seed for the calibration draw; fixed so reruns sample identically.
    pub calibration_seed: u64,
}

impl Default for FlagConfig {
    fn default() -> Self {
        Self {
            max_span: 15,
            max_intra: 5,
            calibration_per_bucket: 5,
            calibration_seed: 42,
        }
    }
}

/// Longest excerpt included in a flag context.
const EXCERPT_LEN: usize = 80;

/// Char-safe prefix of a text for flag contexts.
fn excerpt(text: &str) -> String {
    if text.chars().count() <= EXCERPT_LEN {
        return text.to_string();
    }
    let cut: String = text.chars().take(EXCERPT_LEN).collect();
    format!("{cut}…")
}

/// Scan one annotated entry and collect every flag it warrants.
pub fn collect_entry_flags(entry: &Entry, config: &FlagConfig) -> Vec<ReviewFlag> {
    let mut flags = Vec::new();
    let mut path = Vec::new();
    for (i, sense) in entry.senses.iter().enumerate() {
        path.push(i);
        scan_sense(entry, sense, &mut path, config, &mut flags);
        path.pop();
    }

    for (index, citation) in entry.citations().into_iter().enumerate() {
        if authors::is_idem(&citation.author) && citation.resolved_author.is_none() {
            flags.push(
                ReviewFlag::new(
                    FlagCategory::ResolutionUnresolved,
                    &entry.id,
                    &entry.headword,
                    FlagTarget::Citation { index },
                    "idem author token with no antecedent in this entry",
                )
                .with_context(json!({ "quote": excerpt(&citation.quote) })),
            );
        }
    }

    flags
}

fn scan_sense(
    entry: &Entry,
    sense: &Sense,
    path: &mut Vec<usize>,
    config: &FlagConfig,
    flags: &mut Vec<ReviewFlag>,
) {
    if sense.kind != SenseKind::Plain && sense.children.len() > config.max_span {
        flags.push(
            ReviewFlag::new(
                FlagCategory::LargeScopeTransition,
                &entry.id,
                &entry.headword,
                FlagTarget::Sense { path: path.clone() },
                format!(
                    "transition governs {} senses, above the threshold of {}",
                    sense.children.len(),
                    config.max_span
                ),
            )
            .with_context(json!({ "label": excerpt(&sense.text) })),
        );
    }

    for block in &sense.blocks {
        scan_block(entry, block, path, config, flags);
    }
    for (i, child) in sense.children.iter().enumerate() {
        path.push(i);
        scan_sense(entry, child, path, config, flags);
        path.pop();
    }
}

fn scan_block(
    entry: &Entry,
    block: &IndentBlock,
    path: &[usize],
    config: &FlagConfig,
    flags: &mut Vec<ReviewFlag>,
) {
    let target = FlagTarget::Block {
        path: path.to_vec(),
        position: block.position,
    };

    if let Some(classification) = &block.classification {
        if classification.role == Role::Unclassified {
            flags.push(
                ReviewFlag::new(
                    FlagCategory::ClassificationUnmatched,
                    &entry.id,
                    &entry.headword,
                    target.clone(),
                    "no classification rule matched",
                )
                .with_context(json!({ "text": excerpt(&block.text) })),
            );
        } else if classification.confidence < Confidence::High {
            flags.push(
                ReviewFlag::new(
                    FlagCategory::ClassificationAmbiguous,
                    &entry.id,
                    &entry.headword,
                    target.clone(),
                    format!(
                        "{} classified as {} at {} confidence",
                        classification.evidence,
                        classification.role.label(),
                        classification.confidence.label()
                    ),
                )
                .with_context(json!({
                    "text": excerpt(&block.text),
                    "evidence": classification.evidence,
                })),
            );
        }
    }

    if block.role() == Role::Locution && block.canonical_form.is_none() {
        flags.push(
            ReviewFlag::new(
                FlagCategory::ExtractionFailed,
                &entry.id,
                &entry.headword,
                target.clone(),
                "locution has no extractable canonical form",
            )
            .with_context(json!({ "text": excerpt(&block.text) })),
        );
    }

    if block.children.len() > config.max_intra {
        flags.push(
            ReviewFlag::new(
                FlagCategory::LargeScopeTransition,
                &entry.id,
                &entry.headword,
                target,
                format!(
                    "marker groups {} blocks, above the threshold of {}",
                    block.children.len(),
                    config.max_intra
                ),
            )
            .with_context(json!({ "text": excerpt(&block.text) })),
        );
    }

    for child in &block.children {
        scan_block(entry, child, path, config, flags);
    }
}

/// Draw a deterministic calibration sample across a corpus: up to
/// `calibration_per_bucket` blocks per (role, confidence) bucket, chosen
/// by a seeded shuffle so reruns pick the same blocks.
pub fn calibration_sample(entries: &[Entry], config: &FlagConfig) -> Vec<ReviewFlag> {
    let mut buckets: BTreeMap<(&'static str, &'static str), Vec<ReviewFlag>> = BTreeMap::new();
    for entry in entries {
        let mut path = Vec::new();
        for (i, sense) in entry.senses.iter().enumerate() {
            path.push(i);
            bucket_sense(entry, sense, &mut path, &mut buckets);
            path.pop();
        }
    }

    let mut rng = fastrand::Rng::with_seed(config.calibration_seed);
    let mut sample = Vec::new();
    for (_, mut candidates) in buckets {
        rng.shuffle(&mut candidates);
        candidates.truncate(config.calibration_per_bucket);
        sample.extend(candidates);
    }
    sample
}

fn bucket_sense(
    entry: &Entry,
    sense: &Sense,
    path: &mut Vec<usize>,
    buckets: &mut BTreeMap<(&'static str, &'static str), Vec<ReviewFlag>>,
) {
    for block in &sense.blocks {
        bucket_block(entry, block, path, buckets);
    }
    for (i, child) in sense.children.iter().enumerate() {
        path.push(i);
        bucket_sense(entry, child, path, buckets);
        path.pop();
    }
}

fn bucket_block(
    entry: &Entry,
    block: &IndentBlock,
    path: &[usize],
    buckets: &mut BTreeMap<(&'static str, &'static str), Vec<ReviewFlag>>,
) {
    if let Some(classification) = &block.classification {
        let key = (classification.role.label(), classification.confidence.label());
        buckets.entry(key).or_default().push(
            ReviewFlag::new(
                FlagCategory::CalibrationSample,
                &entry.id,
                &entry.headword,
                FlagTarget::Block {
                    path: path.to_vec(),
                    position: block.position,
                },
                format!(
                    "calibration sample for {} at {} confidence",
                    classification.role.label(),
                    classification.confidence.label()
                ),
            )
            .with_context(json!({
                "text": excerpt(&block.text),
                "evidence": classification.evidence,
            })),
        );
    }
    for child in &block.children {
        bucket_block(entry, child, path, buckets);
    }
}

/// The merged, canonically ordered flag output of a run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FlagSet {
    flags: Vec<ReviewFlag>,
}

impl FlagSet {
    /// Merge per-entry shards into one canonically sorted set. The sort
    /// key is (entry id, target, category), so the merged output is
    /// independent of how the work was sharded.
    pub fn from_shards(shards: Vec<Vec<ReviewFlag>>) -> Self {
        let mut flags: Vec<ReviewFlag> = shards.into_iter().flatten().collect();
        flags.sort_by(|a, b| {
            (&a.entry_id, &a.target, a.category).cmp(&(&b.entry_id, &b.target, b.category))
        });
        Self { flags }
    }

    pub fn iter(&self) -> impl Iterator<Item = &ReviewFlag> {
        self.flags.iter()
    }

    pub fn as_slice(&self) -> &[ReviewFlag] {
        &self.flags
    }

    pub fn len(&self) -> usize {
        self.flags.len()
    }

    pub fn is_empty(&self) -> bool {
        self.flags.is_empty()
    }

    /// Flags of one category, in canonical order.
    pub fn by_category(&self, category: FlagCategory) -> impl Iterator<Item = &ReviewFlag> {
        self.flags.iter().filter(move |f| f.category == category)
    }

    /// Flags of one entry, in canonical order.
    pub fn by_entry<'a>(&'a self, entry_id: &'a str) -> impl Iterator<Item = &'a ReviewFlag> {
        self.flags.iter().filter(move |f| f.entry_id == entry_id)
    }

    /// Flag counts per category label, in the category declaration order.
    pub fn counts_by_category(&self) -> IndexMap<&'static str, usize> {
        let mut counts = IndexMap::new();
        for flag in &self.flags {
            *counts.entry(flag.category.label()).or_insert(0) += 1;
        }
        counts
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Citation, Classification};

    fn ambiguous_block(position: usize, text: &str) -> IndentBlock {
        let mut block = IndentBlock::new(position, text);
        block.classification = Some(Classification::new(
            Role::RegisterLabel,
            Confidence::Medium,
            "register_opener",
        ));
        block
    }

    fn entry_with_block(block: IndentBlock) -> Entry {
        Entry::new("CÂBLE", "cable.1").with_sense(Sense::numbered(1, "…").with_block(block))
    }

    #[test]
    fn test_medium_confidence_is_flagged() {
        let entry = entry_with_block(ambiguous_block(0, "Populairement. Sans façon."));
        let flags = collect_entry_flags(&entry, &FlagConfig::default());
        assert_eq!(flags.len(), 1);
        assert_eq!(flags[0].category, FlagCategory::ClassificationAmbiguous);
        assert_eq!(
            flags[0].target,
            FlagTarget::Block {
                path: vec![0],
                position: 0,
            }
        );
    }

    #[test]
    fn test_high_confidence_is_not_flagged() {
        let mut block = IndentBlock::new(0, "Fig. Lien.");
        block.classification = Some(Classification::new(
            Role::FigurativeSense,
            Confidence::High,
            "figurative_abbrev",
        ));
        let entry = entry_with_block(block);
        assert!(collect_entry_flags(&entry, &FlagConfig::default()).is_empty());
    }

    #[test]
    fn test_unresolved_idem_flagged_by_document_index() {
        let mut entry = Entry::new("CÂBLE", "cable.1").with_sense(
            Sense::numbered(1, "…")
                .with_citation(Citation::new("…", "ID.", ""))
                .with_citation(Citation::new("…", "BOILEAU", "")),
        );
        crate::authors::resolve_entry(&mut entry);
        let flags = collect_entry_flags(&entry, &FlagConfig::default());
        assert_eq!(flags.len(), 1);
        assert_eq!(flags[0].category, FlagCategory::ResolutionUnresolved);
        assert_eq!(flags[0].target, FlagTarget::Citation { index: 0 });
    }

    #[test]
    fn test_collection_is_a_pure_function_of_the_model() {
        let entry = entry_with_block(ambiguous_block(0, "Populairement."));
        let config = FlagConfig::default();
        assert_eq!(
            collect_entry_flags(&entry, &config),
            collect_entry_flags(&entry, &config)
        );
    }

    #[test]
    fn test_large_scope_threshold() {
        let mut container = Sense::new("Substantivement.");
        container.kind = SenseKind::UsageGroup {
            label: "Substantivement.".to_string(),
        };
        for n in 0..16 {
            container.children.push(Sense::numbered(n + 1, "…"));
        }
        let mut entry = Entry::new("CÂBLE", "cable.1");
        entry.senses.push(container);
        let flags = collect_entry_flags(&entry, &FlagConfig::default());
        assert_eq!(flags.len(), 1);
        assert_eq!(flags[0].category, FlagCategory::LargeScopeTransition);
    }

    #[test]
    fn test_calibration_sample_is_deterministic_and_capped() {
        let mut entries = Vec::new();
        for i in 0..20 {
            let mut block = IndentBlock::new(0, format!("Fig. Sens {i}."));
            block.classification = Some(Classification::new(
                Role::FigurativeSense,
                Confidence::High,
                "figurative_abbrev",
            ));
            entries.push(
                Entry::new("CÂBLE", format!("cable.{i}"))
                    .with_sense(Sense::numbered(1, "…").with_block(block)),
            );
        }
        let config = FlagConfig::default();
        let first = calibration_sample(&entries, &config);
        let second = calibration_sample(&entries, &config);
        assert_eq!(first, second);
        assert_eq!(first.len(), config.calibration_per_bucket);
        assert!(first.iter().all(|f| f.category == FlagCategory::CalibrationSample));
    }

    #[test]
    fn test_merged_shards_sort_canonically() {
        let a = ReviewFlag::new(
            FlagCategory::ClassificationUnmatched,
            "zebre.1",
            "ZÈBRE",
            FlagTarget::Entry,
            "…",
        );
        let b = ReviewFlag::new(
            FlagCategory::ClassificationUnmatched,
            "cable.1",
            "CÂBLE",
            FlagTarget::Entry,
            "…",
        );
        let set = FlagSet::from_shards(vec![vec![a], vec![b]]);
        let ids: Vec<&str> = set.iter().map(|f| f.entry_id.as_str()).collect();
        assert_eq!(ids, vec!["cable.1", "zebre.1"]);
    }
}
