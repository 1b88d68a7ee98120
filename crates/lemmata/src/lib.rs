//! Semantic annotation for digitized dictionary entries.
//!
//! The source digitization reduces every entry to a flat list of indent
//! blocks, losing the typographic cues that told a reader what each block
//! was. This crate recovers that structure: it classifies blocks into
//! semantic roles, resolves chained idem author attributions, extracts
//! canonical forms from locutions, restructures transition scopes into
//! nested sub-entries and usage groups, and queues everything uncertain
//! as review flags for human annotators.
//!
//! The [`Annotator`] drives the phases in order; each phase is also
//! usable on its own through its module.

pub mod authors;
pub mod classify;
pub mod error;
pub mod flags;
pub mod locution;
pub mod model;
pub mod scope;

mod pipeline;

pub use error::{AnnotationError, Result};
pub use flags::{FlagCategory, FlagConfig, FlagSet, FlagTarget, ReviewFlag};
pub use model::{Citation, Classification, Confidence, Entry, IndentBlock, Role, Sense, SenseKind};
pub use pipeline::{AnnotationResult, AnnotationSummary, Annotator, AnnotatorConfig};
