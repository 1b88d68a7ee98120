//! The annotation pipeline driver.
//!
//! Phases run in a fixed order per entry: structural validation,
//! classification, author resolution, locution extraction, scope
//! resolution, then flag collection over the frozen result. Entries are
//! independent; per-entry flag shards are merged canonically at the end,
//! so the output is the same however the entries were batched.

use indexmap::IndexMap;
use serde::Serialize;

use crate::authors::{self, ResolutionStats};
use crate::classify::Classifier;
use crate::flags::{
    calibration_sample, collect_entry_flags, FlagCategory, FlagConfig, FlagSet, FlagTarget,
    ReviewFlag,
};
use crate::locution::{self, ExtractionStats};
use crate::model::{validate_entry, Entry, IndentBlock, Role, Sense};
use crate::scope::{self, ScopeStats, TransitionTable};

/// Pipeline configuration.
#[derive(Debug, Clone, Default)]
pub struct AnnotatorConfig {
    pub flags: FlagConfig,
    pub transitions: TransitionTable,
}

/// Corpus-level counters reported after a run.
#[derive(Debug, Clone, Serialize)]
pub struct AnnotationSummary {
    pub total_entries: usize,
    /// Entries that failed structural validation and were left untouched.
    pub skipped_entries: usize,
    /// Block counts per role label, in role declaration order.
    pub role_counts: IndexMap<String, usize>,
    pub resolved_citations: usize,
    pub unresolved_citations: usize,
    pub canonical_forms: usize,
    pub sub_entries: usize,
    pub usage_groups: usize,
    pub total_flags: usize,
    pub flags_by_category: IndexMap<String, usize>,
}

/// Output of a corpus run: the merged flag set and the summary.
#[derive(Debug, Clone, Serialize)]
pub struct AnnotationResult {
    pub flags: FlagSet,
    pub summary: AnnotationSummary,
}

struct EntryOutcome {
    flags: Vec<ReviewFlag>,
    skipped: bool,
    resolution: ResolutionStats,
    extraction: ExtractionStats,
    scope: ScopeStats,
}

/// The pipeline itself. Cheap to build, reusable across corpora.
pub struct Annotator {
    config: AnnotatorConfig,
    classifier: Classifier,
}

impl Annotator {
    pub fn new() -> Self {
        Self::with_config(AnnotatorConfig::default())
    }

    pub fn with_config(config: AnnotatorConfig) -> Self {
        Self {
            config,
            classifier: Classifier::new(),
        }
    }

    /// Annotate one entry in place and return its flags. An entry that
    /// fails structural validation is left untouched and yields a single
    /// structural-error flag.
    pub fn annotate_entry(&self, entry: &mut Entry) -> Vec<ReviewFlag> {
        self.run_entry(entry).flags
    }

    fn run_entry(&self, entry: &mut Entry) -> EntryOutcome {
        if let Err(error) = validate_entry(entry) {
            return EntryOutcome {
                flags: vec![ReviewFlag::new(
                    FlagCategory::StructuralError,
                    &entry.id,
                    &entry.headword,
                    FlagTarget::Entry,
                    error.to_string(),
                )],
                skipped: true,
                resolution: ResolutionStats::default(),
                extraction: ExtractionStats::default(),
                scope: ScopeStats::default(),
            };
        }

        self.classifier.classify_entry(entry);
        let resolution = authors::resolve_entry(entry);
        let extraction = locution::extract_entry(entry);
        let scope = scope::resolve_entry(entry, &self.config.transitions);
        let flags = collect_entry_flags(entry, &self.config.flags);

        EntryOutcome {
            flags,
            skipped: false,
            resolution,
            extraction,
            scope,
        }
    }

    /// Annotate a corpus in place. Flags from every entry plus the
    /// calibration draw are merged into one canonically ordered set.
    pub fn annotate(&self, entries: &mut [Entry]) -> AnnotationResult {
        let mut shards = Vec::with_capacity(entries.len() + 1);
        let mut skipped_entries = 0;
        let mut resolved_citations = 0;
        let mut unresolved_citations = 0;
        let mut canonical_forms = 0;
        let mut sub_entries = 0;
        let mut usage_groups = 0;

        for entry in entries.iter_mut() {
            let outcome = self.run_entry(entry);
            if outcome.skipped {
                skipped_entries += 1;
            }
            resolved_citations += outcome.resolution.concrete + outcome.resolution.resolved_idem;
            unresolved_citations += outcome.resolution.unresolved;
            canonical_forms += outcome.extraction.extracted;
            sub_entries += outcome.scope.nested;
            usage_groups += outcome.scope.grouped;
            shards.push(outcome.flags);
        }

        shards.push(calibration_sample(entries, &self.config.flags));
        let flags = FlagSet::from_shards(shards);

        let mut role_counts = IndexMap::new();
        for role in Role::ALL {
            role_counts.insert(role.label().to_string(), 0);
        }
        for entry in entries.iter() {
            for sense in &entry.senses {
                count_sense_roles(sense, &mut role_counts);
            }
        }

        let flags_by_category = flags
            .counts_by_category()
            .into_iter()
            .map(|(label, n)| (label.to_string(), n))
            .collect();

        let summary = AnnotationSummary {
            total_entries: entries.len(),
            skipped_entries,
            role_counts,
            resolved_citations,
            unresolved_citations,
            canonical_forms,
            sub_entries,
            usage_groups,
            total_flags: flags.len(),
            flags_by_category,
        };

        AnnotationResult { flags, summary }
    }
}

impl Default for Annotator {
    fn default() -> Self {
        Self::new()
    }
}

fn count_sense_roles(sense: &Sense, counts: &mut IndexMap<String, usize>) {
    for block in &sense.blocks {
        count_block_roles(block, counts);
    }
    for child in &sense.children {
        count_sense_roles(child, counts);
    }
}

fn count_block_roles(block: &IndentBlock, counts: &mut IndexMap<String, usize>) {
    if let Some(classification) = &block.classification {
        *counts
            .entry(classification.role.label().to_string())
            .or_insert(0) += 1;
    }
    for child in &block.children {
        count_block_roles(child, counts);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Citation;

    fn small_entry() -> Entry {
        Entry::new("ABAISSER", "abaisser.1").with_pos("v. a.").with_sense(
            Sense::numbered(1, "Faire descendre.")
                .with_citation(Citation::new("q1", "BOILEAU", ""))
                .with_block(
                    IndentBlock::new(0, "Fig. S'humilier.")
                        .with_citation(Citation::new("q2", "ID.", "")),
                ),
        )
    }

    #[test]
    fn test_phases_run_in_order() {
        let annotator = Annotator::new();
        let mut entry = small_entry();
        annotator.annotate_entry(&mut entry);

        assert_eq!(entry.senses[0].blocks[0].role(), Role::FigurativeSense);
        let resolved: Vec<Option<String>> = entry
            .citations()
            .iter()
            .map(|c| c.resolved_author.clone())
            .collect();
        assert_eq!(
            resolved,
            vec![Some("BOILEAU".to_string()), Some("BOILEAU".to_string())]
        );
    }

    #[test]
    fn test_invalid_entry_is_skipped_with_one_flag() {
        let annotator = Annotator::new();
        let mut entry = Entry::new("", "broken.1").with_sense(Sense::numbered(1, "…"));
        let flags = annotator.annotate_entry(&mut entry);

        assert_eq!(flags.len(), 1);
        assert_eq!(flags[0].category, FlagCategory::StructuralError);
        // Untouched: no classification happened.
        assert!(entry.senses[0].blocks.is_empty());
    }

    #[test]
    fn test_corpus_summary_counts() {
        let annotator = Annotator::new();
        let mut entries = vec![
            small_entry(),
            Entry::new("", "broken.1").with_sense(Sense::numbered(1, "…")),
        ];
        let result = annotator.annotate(&mut entries);

        assert_eq!(result.summary.total_entries, 2);
        assert_eq!(result.summary.skipped_entries, 1);
        assert_eq!(result.summary.resolved_citations, 2);
        assert_eq!(result.summary.unresolved_citations, 0);
        assert_eq!(result.summary.role_counts["figurative-sense"], 1);
        assert_eq!(result.summary.total_flags, result.flags.len());
    }
}
