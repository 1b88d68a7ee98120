//! Property-based tests for the annotation pipeline.
//!
//! These tests use proptest to generate random inputs and verify that
//! the phases hold their invariants under all conditions: no panics,
//! determinism, order preservation, and idempotence.

use proptest::prelude::*;

use lemmata::authors;
use lemmata::classify::Classifier;
use lemmata::model::{Citation, Entry, IndentBlock, Sense};
use lemmata::scope::{self, TransitionTable};
use lemmata::Annotator;

// =============================================================================
// Test Strategies
// =============================================================================

/// Arbitrary block content, biased toward French-looking prose.
fn block_text() -> impl Strategy<Value = String> {
    prop_oneof![
        "[a-zA-Zéèàçê ,\\.']{0,120}",
        Just("Fig. Abaisser l'orgueil.".to_string()),
        Just("Substantivement. Le manger.".to_string()),
        Just("Prov. Qui terre a, guerre a.".to_string()),
        Just("Terme de marine. Grosse corde.".to_string()),
        Just("Chemin faisant, pendant le trajet.".to_string()),
    ]
}

/// Author tokens: concrete names mixed with the idem placeholder.
fn author_token() -> impl Strategy<Value = String> {
    prop_oneof![
        3 => "[A-Z]{2,12}",
        2 => Just("ID.".to_string()),
        1 => Just("".to_string()),
    ]
}

/// A sibling sense list mixing plain senses and transition carriers.
fn sense_list() -> impl Strategy<Value = Vec<Sense>> {
    prop::collection::vec(any::<bool>(), 0..12).prop_map(|shape| {
        shape
            .into_iter()
            .enumerate()
            .map(|(i, is_transition)| {
                if is_transition {
                    Sense::new("").with_block(IndentBlock::new(0, "Substantivement."))
                } else {
                    Sense::numbered(i as u32 + 1, format!("Sens numéro {i}."))
                }
            })
            .collect()
    })
}

/// Ordinals of every plain sense in a tree, in traversal order.
fn plain_ordinals(senses: &[Sense]) -> Vec<u32> {
    let mut out = Vec::new();
    for sense in senses {
        if let Some(n) = sense.ordinal {
            out.push(n);
        }
        out.extend(plain_ordinals(&sense.children));
    }
    out
}

// =============================================================================
// Classifier Properties
// =============================================================================

proptest! {
    /// The classifier never panics and always assigns a classification.
    #[test]
    fn prop_classifier_total(text in block_text()) {
        let classifier = Classifier::new();
        let mut entry = Entry::new("MOT", "mot.1")
            .with_sense(Sense::numbered(1, "…").with_block(IndentBlock::new(0, text)));
        classifier.classify_entry(&mut entry);
        prop_assert!(entry.senses[0].blocks[0].classification.is_some());
    }

    /// Same input, same outcome.
    #[test]
    fn prop_classifier_deterministic(text in block_text()) {
        let classifier = Classifier::new();
        let mut a = Entry::new("MOT", "mot.1")
            .with_sense(Sense::numbered(1, "…").with_block(IndentBlock::new(0, text.clone())));
        let mut b = Entry::new("MOT", "mot.1")
            .with_sense(Sense::numbered(1, "…").with_block(IndentBlock::new(0, text)));
        classifier.classify_entry(&mut a);
        classifier.classify_entry(&mut b);
        prop_assert_eq!(
            &a.senses[0].blocks[0].classification,
            &b.senses[0].blocks[0].classification
        );
    }
}

// =============================================================================
// Author Resolution Properties
// =============================================================================

proptest! {
    /// Every idem citation resolves to the nearest preceding concrete
    /// author, or stays null when there is none.
    #[test]
    fn prop_idem_resolves_to_nearest_antecedent(tokens in prop::collection::vec(author_token(), 0..20)) {
        let mut sense = Sense::numbered(1, "…");
        for token in &tokens {
            sense.citations.push(Citation::new("…", token.clone(), ""));
        }
        let mut entry = Entry::new("MOT", "mot.1").with_sense(sense);
        authors::resolve_entry(&mut entry);

        let mut last_concrete: Option<String> = None;
        for (citation, token) in entry.citations().iter().zip(&tokens) {
            let token = token.trim();
            if token.is_empty() {
                continue;
            }
            if authors::is_idem(token) {
                prop_assert_eq!(&citation.resolved_author, &last_concrete);
            } else {
                let canonical = authors::canonical_author(token);
                prop_assert_eq!(citation.resolved_author.as_deref(), Some(canonical.as_str()));
                last_concrete = Some(canonical);
            }
        }
    }

    /// Resolving twice changes nothing.
    #[test]
    fn prop_resolution_idempotent(tokens in prop::collection::vec(author_token(), 0..20)) {
        let mut sense = Sense::numbered(1, "…");
        for token in tokens {
            sense.citations.push(Citation::new("…", token, ""));
        }
        let mut entry = Entry::new("MOT", "mot.1").with_sense(sense);
        authors::resolve_entry(&mut entry);
        let first: Vec<Option<String>> = entry
            .citations()
            .iter()
            .map(|c| c.resolved_author.clone())
            .collect();
        authors::resolve_entry(&mut entry);
        let second: Vec<Option<String>> = entry
            .citations()
            .iter()
            .map(|c| c.resolved_author.clone())
            .collect();
        prop_assert_eq!(first, second);
    }
}

// =============================================================================
// Scope Resolution Properties
// =============================================================================

proptest! {
    /// Restructuring never loses, duplicates, or reorders plain senses.
    #[test]
    fn prop_scopes_preserve_senses(senses in sense_list()) {
        let before = plain_ordinals(&senses);
        let mut entry = Entry::new("MOT", "mot.1");
        let classifier = Classifier::new();
        entry.senses = senses;
        classifier.classify_entry(&mut entry);
        scope::resolve_entry(&mut entry, &TransitionTable::default());
        prop_assert_eq!(plain_ordinals(&entry.senses), before);
    }

    /// Resolving scopes twice changes nothing.
    #[test]
    fn prop_scope_resolution_idempotent(senses in sense_list()) {
        let mut entry = Entry::new("MOT", "mot.1");
        let classifier = Classifier::new();
        entry.senses = senses;
        classifier.classify_entry(&mut entry);
        let table = TransitionTable::default();
        scope::resolve_entry(&mut entry, &table);
        let snapshot = serde_json::to_value(&entry).unwrap();
        scope::resolve_entry(&mut entry, &table);
        prop_assert_eq!(serde_json::to_value(&entry).unwrap(), snapshot);
    }
}

// =============================================================================
// Pipeline Properties
// =============================================================================

proptest! {
    /// The full pipeline is idempotent: model and flags are unchanged by
    /// a second run.
    #[test]
    fn prop_pipeline_idempotent(
        texts in prop::collection::vec(block_text(), 0..6),
        tokens in prop::collection::vec(author_token(), 0..6),
    ) {
        let mut sense = Sense::numbered(1, "Premier sens.");
        for (i, text) in texts.into_iter().enumerate() {
            sense.blocks.push(IndentBlock::new(i, text));
        }
        for token in tokens {
            sense.citations.push(Citation::new("…", token, ""));
        }
        let mut entries = vec![Entry::new("MOT", "mot.1").with_sense(sense)];

        let annotator = Annotator::new();
        let first = annotator.annotate(&mut entries);
        let snapshot = serde_json::to_value(&entries).unwrap();
        let second = annotator.annotate(&mut entries);

        prop_assert_eq!(serde_json::to_value(&entries).unwrap(), snapshot);
        prop_assert_eq!(
            serde_json::to_value(first.flags.as_slice()).unwrap(),
            serde_json::to_value(second.flags.as_slice()).unwrap()
        );
    }

    /// The pipeline never panics on arbitrary block content.
    #[test]
    fn prop_pipeline_total(text in "\\PC{0,200}") {
        let mut entry = Entry::new("MOT", "mot.1")
            .with_sense(Sense::numbered(1, "…").with_block(IndentBlock::new(0, text)));
        let annotator = Annotator::new();
        let flags = annotator.annotate_entry(&mut entry);
        prop_assert!(entry.senses[0].blocks.iter().all(|b| b.classification.is_some()));
        prop_assert!(flags.len() <= 4);
    }
}
