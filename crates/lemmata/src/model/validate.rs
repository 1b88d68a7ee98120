//! Structural validation run when entries are handed to the pipeline.
//!
//! A failure here is the only condition fatal to an entry: the entry is
//! skipped, flagged, and the corpus run continues.

use crate::error::{AnnotationError, Result};

use super::{Entry, IndentBlock, Sense};

/// Maximum nesting depth accepted for sense and block trees. The corpus
/// never nests deeper than three; the cap guards against parser loops.
const MAX_DEPTH: usize = 8;

/// Check that an entry forms a well-ordered tree: non-empty identifiers,
/// sibling positions and ordinals in strictly increasing source order,
/// bounded nesting.
pub fn validate_entry(entry: &Entry) -> Result<()> {
    if entry.id.trim().is_empty() {
        return Err(AnnotationError::structure(&entry.id, "missing entry id"));
    }
    if entry.headword.trim().is_empty() {
        return Err(AnnotationError::structure(&entry.id, "missing headword"));
    }
    check_sense_list(entry, &entry.senses, 0)
}

fn check_sense_list(entry: &Entry, senses: &[Sense], depth: usize) -> Result<()> {
    if depth > MAX_DEPTH {
        return Err(AnnotationError::structure(
            &entry.id,
            format!("sense nesting exceeds depth {MAX_DEPTH}"),
        ));
    }

    let mut last_ordinal: Option<u32> = None;
    for sense in senses {
        if let Some(n) = sense.ordinal {
            if let Some(prev) = last_ordinal {
                if n <= prev {
                    return Err(AnnotationError::structure(
                        &entry.id,
                        format!("sense ordinal {n} out of order after {prev}"),
                    ));
                }
            }
            last_ordinal = Some(n);
        }
        check_block_list(entry, &sense.blocks, 0)?;
        check_sense_list(entry, &sense.children, depth + 1)?;
    }
    Ok(())
}

fn check_block_list(entry: &Entry, blocks: &[IndentBlock], depth: usize) -> Result<()> {
    if depth > MAX_DEPTH {
        return Err(AnnotationError::structure(
            &entry.id,
            format!("block nesting exceeds depth {MAX_DEPTH}"),
        ));
    }

    let mut last_position: Option<usize> = None;
    for block in blocks {
        if let Some(prev) = last_position {
            if block.position <= prev {
                return Err(AnnotationError::structure(
                    &entry.id,
                    format!("block position {} out of order after {prev}", block.position),
                ));
            }
        }
        last_position = Some(block.position);
        check_block_list(entry, &block.children, depth + 1)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::IndentBlock;

    #[test]
    fn test_valid_entry() {
        let entry = Entry::new("ABAISSER", "abaisser.1").with_sense(
            Sense::numbered(1, "Faire descendre.")
                .with_block(IndentBlock::new(0, "Fig. …"))
                .with_block(IndentBlock::new(1, "Populairement. …")),
        );
        assert!(validate_entry(&entry).is_ok());
    }

    #[test]
    fn test_missing_id() {
        let entry = Entry::new("ABAISSER", "  ");
        assert!(matches!(
            validate_entry(&entry),
            Err(AnnotationError::Structure { .. })
        ));
    }

    #[test]
    fn test_block_positions_out_of_order() {
        let entry = Entry::new("ABAISSER", "abaisser.1").with_sense(
            Sense::numbered(1, "Faire descendre.")
                .with_block(IndentBlock::new(2, "a"))
                .with_block(IndentBlock::new(1, "b")),
        );
        assert!(validate_entry(&entry).is_err());
    }

    #[test]
    fn test_ordinals_out_of_order() {
        let entry = Entry::new("ABAISSER", "abaisser.1")
            .with_sense(Sense::numbered(2, "a"))
            .with_sense(Sense::numbered(1, "b"));
        assert!(validate_entry(&entry).is_err());
    }

    #[test]
    fn test_restructured_positions_accepted() {
        // After scope resolution, sibling lists keep increasing positions
        // but are no longer dense.
        let mut transition = IndentBlock::new(1, "Substantivement.");
        transition.children.push(IndentBlock::new(3, "c"));
        let entry = Entry::new("ABAISSER", "abaisser.1").with_sense(
            Sense::numbered(1, "Faire descendre.")
                .with_block(IndentBlock::new(0, "a"))
                .with_block(transition),
        );
        assert!(validate_entry(&entry).is_ok());
    }
}
