//! Review flag records queued for human annotators.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Why a flag was raised. Closed vocabulary, mirrored by the review
/// tooling's filter menu.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "kebab-case")]
pub enum FlagCategory {
    /// A rule matched but only at medium or low confidence.
    ClassificationAmbiguous,
    /// No cascade rule matched the block at all.
    ClassificationUnmatched,
    /// An idem author token with no concrete antecedent in the entry.
    ResolutionUnresolved,
    /// A locution block whose canonical form could not be extracted.
    ExtractionFailed,
    /// A transition governing more material than a single shift plausibly
    /// covers.
    LargeScopeTransition,
    /// The entry failed structural validation and was skipped whole.
    StructuralError,
    /// Randomly sampled for calibration review, not suspected of error.
    CalibrationSample,
}

impl FlagCategory {
    /// The value the review tooling filters on.
    pub fn label(&self) -> &'static str {
        match self {
            FlagCategory::ClassificationAmbiguous => "classification-ambiguous",
            FlagCategory::ClassificationUnmatched => "classification-unmatched",
            FlagCategory::ResolutionUnresolved => "resolution-unresolved",
            FlagCategory::ExtractionFailed => "extraction-failed",
            FlagCategory::LargeScopeTransition => "large-scope-transition",
            FlagCategory::StructuralError => "structural-error",
            FlagCategory::CalibrationSample => "calibration-sample",
        }
    }
}

/// What a flag points at inside an entry. Paths are sibling indices from
/// the entry's sense list down; block targets add the block's immutable
/// position, which survives restructuring.
#[derive(
    Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(tag = "target", rename_all = "snake_case")]
pub enum FlagTarget {
    Entry,
    Sense { path: Vec<usize> },
    Block { path: Vec<usize>, position: usize },
    Citation { index: usize },
}

/// One review flag. Self-contained: carries enough context for an
/// annotator to act without reopening the source document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewFlag {
    pub category: FlagCategory,
    pub entry_id: String,
    pub headword: String,
    pub target: FlagTarget,
    /// One-line reason, in the reviewer's vocabulary.
    pub rationale: String,
    /// Structured payload: text excerpts, evidence names, counters.
    #[serde(default, skip_serializing_if = "Value::is_null")]
    pub context: Value,
}

impl ReviewFlag {
    pub fn new(
        category: FlagCategory,
        entry_id: impl Into<String>,
        headword: impl Into<String>,
        target: FlagTarget,
        rationale: impl Into<String>,
    ) -> Self {
        Self {
            category,
            entry_id: entry_id.into(),
            headword: headword.into(),
            target,
            rationale: rationale.into(),
            context: Value::Null,
        }
    }

    /// Attach a structured context payload.
    pub fn with_context(mut self, context: Value) -> Self {
        self.context = context;
        self
    }
}
