//! Document model for dictionary entries.
//!
//! The upstream parser hands this crate a sequence of [`Entry`] values whose
//! sibling [`IndentBlock`]s are semantically flat: the source format reuses
//! one indent element for senses, labels, locutions, proverbs and
//! cross-references alike. The annotation phases mutate the model in place;
//! after scope resolution it is frozen and consumed read-only by the
//! emitters and the review tool.

mod block;
mod citation;
mod entry;
mod sense;
mod validate;

pub use block::{Classification, Confidence, IndentBlock, InlineSpan, Role, strip_tags};
pub use citation::Citation;
pub use entry::Entry;
pub use sense::{Sense, SenseKind};
pub use validate::validate_entry;

/// A lightly normalized markup fragment. Inline tags are preserved
/// (`<i>`, `<semantique>`, `<a>`, `<exemple>`); each emitter interprets
/// them for its own output format.
pub type Markup = String;
