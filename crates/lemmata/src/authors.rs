//! Author resolution for chained idem citations.
//!
//! The source abbreviates repeated attributions: a citation whose author
//! token is `ID.` means "same author as the previous citation". Resolution
//! is a pure left-to-right fold over an entry's citations in document
//! order, with the last concrete author as the accumulator. The fold is
//! scoped strictly per entry; apparent cross-entry chains are left
//! unresolved and flagged rather than resolved against another entry.

use crate::model::{Citation, Entry};

/// Placeholder token meaning "same author as the previous citation".
const IDEM_TOKEN: &str = "ID.";

/// Outcome counters for one entry's resolution pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ResolutionStats {
    /// Idem citations resolved against a concrete antecedent.
    pub resolved_idem: usize,
    /// Citations carrying a concrete author token.
    pub concrete: usize,
    /// Idem citations with no antecedent in the entry; left null and
    /// flagged by the collector.
    pub unresolved: usize,
}

/// Whether a raw author token is the idem placeholder.
pub fn is_idem(token: &str) -> bool {
    token.trim().eq_ignore_ascii_case(IDEM_TOKEN)
}

/// Canonical single-case form of a concrete author token.
pub fn canonical_author(token: &str) -> String {
    token
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_uppercase()
}

/// Resolve every citation of one entry, in document order. Idempotent:
/// an already-resolved citation is never overwritten.
pub fn resolve_entry(entry: &mut Entry) -> ResolutionStats {
    let mut state: Option<String> = None;
    let mut stats = ResolutionStats::default();
    for citation in entry.citations_mut() {
        resolve_citation(citation, &mut state, &mut stats);
    }
    stats
}

fn resolve_citation(
    citation: &mut Citation,
    state: &mut Option<String>,
    stats: &mut ResolutionStats,
) {
    let token = citation.author.trim();
    if token.is_empty() {
        return;
    }

    if is_idem(token) {
        match (&citation.resolved_author, state.as_ref()) {
            (Some(_), _) => {}
            (None, Some(author)) => {
                citation.resolved_author = Some(author.clone());
                stats.resolved_idem += 1;
            }
            // No antecedent in scope: explicitly null, never guessed.
            (None, None) => stats.unresolved += 1,
        }
        return;
    }

    let canonical = canonical_author(token);
    if citation.resolved_author.is_none() {
        citation.resolved_author = Some(canonical.clone());
    }
    *state = Some(canonical);
    stats.concrete += 1;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Sense;

    fn entry_with_authors(tokens: &[&str]) -> Entry {
        let mut sense = Sense::numbered(1, "…");
        for token in tokens {
            sense.citations.push(Citation::new("…", *token, ""));
        }
        Entry::new("ABAISSER", "abaisser.1").with_sense(sense)
    }

    fn resolved(entry: &Entry) -> Vec<Option<String>> {
        entry
            .citations()
            .iter()
            .map(|c| c.resolved_author.clone())
            .collect()
    }

    #[test]
    fn test_idem_chain_resolution() {
        let mut entry = entry_with_authors(&["BOILEAU", "ID.", "ID.", "MOLIÈRE", "ID."]);
        let stats = resolve_entry(&mut entry);

        assert_eq!(
            resolved(&entry),
            vec![
                Some("BOILEAU".to_string()),
                Some("BOILEAU".to_string()),
                Some("BOILEAU".to_string()),
                Some("MOLIÈRE".to_string()),
                Some("MOLIÈRE".to_string()),
            ]
        );
        assert_eq!(stats.resolved_idem, 3);
        assert_eq!(stats.concrete, 2);
        assert_eq!(stats.unresolved, 0);
    }

    #[test]
    fn test_leading_idem_is_unresolved() {
        let mut entry = entry_with_authors(&["ID.", "CORNEILLE", "ID."]);
        let stats = resolve_entry(&mut entry);

        assert_eq!(
            resolved(&entry),
            vec![
                None,
                Some("CORNEILLE".to_string()),
                Some("CORNEILLE".to_string()),
            ]
        );
        assert_eq!(stats.unresolved, 1);
    }

    #[test]
    fn test_resolution_is_idempotent() {
        let mut entry = entry_with_authors(&["ID.", "RACINE", "id.", "ID."]);
        resolve_entry(&mut entry);
        let first = resolved(&entry);
        let stats = resolve_entry(&mut entry);

        assert_eq!(resolved(&entry), first);
        assert_eq!(stats.resolved_idem, 0);
        assert_eq!(stats.unresolved, 1);
    }

    #[test]
    fn test_concrete_author_is_canonicalized() {
        let mut entry = entry_with_authors(&["  la  fontaine ", "ID."]);
        resolve_entry(&mut entry);
        assert_eq!(
            resolved(&entry),
            vec![
                Some("LA FONTAINE".to_string()),
                Some("LA FONTAINE".to_string()),
            ]
        );
    }

    #[test]
    fn test_no_cross_entry_carryover() {
        let mut first = entry_with_authors(&["BOSSUET"]);
        let mut second = entry_with_authors(&["ID."]);
        resolve_entry(&mut first);
        let stats = resolve_entry(&mut second);

        assert_eq!(resolved(&second), vec![None]);
        assert_eq!(stats.unresolved, 1);
    }
}
