//! The overloaded indent block and its classification result.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use super::{Citation, Markup};

/// Semantic role of an indent block. Closed vocabulary: the downstream
/// emitters map these labels directly to output attribute values, so
/// extending it requires updating every mapping table in lockstep.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Role {
    OrdinarySense,
    FigurativeSense,
    DomainLabel,
    RegisterLabel,
    Locution,
    Proverb,
    CrossReference,
    NatureLabel,
    VoiceTransition,
    Unclassified,
}

impl Role {
    /// Every role, in the order the emitters list them.
    pub const ALL: [Role; 10] = [
        Role::OrdinarySense,
        Role::FigurativeSense,
        Role::DomainLabel,
        Role::RegisterLabel,
        Role::Locution,
        Role::Proverb,
        Role::CrossReference,
        Role::NatureLabel,
        Role::VoiceTransition,
        Role::Unclassified,
    ];

    /// The attribute value the emitters write for this role.
    pub fn label(&self) -> &'static str {
        match self {
            Role::OrdinarySense => "ordinary-sense",
            Role::FigurativeSense => "figurative-sense",
            Role::DomainLabel => "domain-label",
            Role::RegisterLabel => "register-label",
            Role::Locution => "locution",
            Role::Proverb => "proverb",
            Role::CrossReference => "cross-reference",
            Role::NatureLabel => "nature-label",
            Role::VoiceTransition => "voice-transition",
            Role::Unclassified => "unclassified",
        }
    }

    /// Roles that carry forward scope over following siblings.
    pub fn is_transition(&self) -> bool {
        matches!(self, Role::VoiceTransition | Role::NatureLabel)
    }
}

/// Confidence tier of a classification outcome. Medium and low outcomes
/// keep their best-effort role and are queued for review.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Confidence {
    Low,
    Medium,
    High,
}

impl Confidence {
    /// Human-readable label.
    pub fn label(&self) -> &'static str {
        match self {
            Confidence::Low => "low",
            Confidence::Medium => "medium",
            Confidence::High => "high",
        }
    }
}

/// Outcome of running the rule cascade over one block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Classification {
    /// Assigned role.
    pub role: Role,
    /// Confidence tier of the matching rule.
    pub confidence: Confidence,
    /// Name of the cascade rule that matched.
    pub evidence: String,
    /// Normalized label text for domain and register labels.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub label: Option<String>,
}

impl Classification {
    /// Create a classification produced by the named rule.
    pub fn new(role: Role, confidence: Confidence, evidence: impl Into<String>) -> Self {
        Self {
            role,
            confidence,
            evidence: evidence.into(),
            label: None,
        }
    }

    /// Attach a normalized label.
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }
}

/// One inline markup span inside a block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InlineSpan {
    /// Tag name (`semantique`, `nature`, `exemple`, `a`, `i`).
    pub tag: String,
    /// Value of the source `type` attribute, when present.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub kind: Option<String>,
    /// Text content of the span, tags stripped.
    pub text: String,
}

/// A flat sibling unit inside an entry or sense, before classification.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndentBlock {
    /// Position among the original siblings, assigned by the upstream
    /// parser. Never reassigned; restructured children keep theirs.
    pub position: usize,
    /// Raw markup fragment, kept verbatim for traceability.
    pub raw: Markup,
    /// Working definition text with tags stripped. Locution extraction
    /// trims the canonical form out of it.
    pub text: String,
    /// Inline markup spans found in the raw fragment.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub spans: Vec<InlineSpan>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub citations: Vec<Citation>,
    /// Sibling blocks grouped under this one by scope resolution.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<IndentBlock>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub classification: Option<Classification>,
    /// Canonical head-phrase for locution blocks.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub canonical_form: Option<String>,
}

impl IndentBlock {
    /// Build a block from its raw markup, deriving the working text and
    /// the inline spans.
    pub fn new(position: usize, raw: impl Into<Markup>) -> Self {
        let raw = raw.into();
        let text = strip_tags(&raw);
        let spans = scan_spans(&raw);
        Self {
            position,
            raw,
            text,
            spans,
            citations: Vec::new(),
            children: Vec::new(),
            classification: None,
            canonical_form: None,
        }
    }

    /// Attach a citation (builder style, for the upstream parser and tests).
    pub fn with_citation(mut self, citation: Citation) -> Self {
        self.citations.push(citation);
        self
    }

    /// The assigned role, or [`Role::Unclassified`] before classification.
    pub fn role(&self) -> Role {
        self.classification
            .as_ref()
            .map(|c| c.role)
            .unwrap_or(Role::Unclassified)
    }

    /// First inline span with the given tag name.
    pub fn span(&self, tag: &str) -> Option<&InlineSpan> {
        self.spans.iter().find(|s| s.tag == tag)
    }

    /// First inline span with the given tag and `type` attribute.
    pub fn span_with_kind(&self, tag: &str, kind: &str) -> Option<&InlineSpan> {
        self.spans
            .iter()
            .find(|s| s.tag == tag && s.kind.as_deref() == Some(kind))
    }

    /// Whether any span with the given tag is present.
    pub fn has_span(&self, tag: &str) -> bool {
        self.span(tag).is_some()
    }
}

static TAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^>]+>").expect("tag pattern"));

static TYPE_ATTR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"type="([^"]*)""#).expect("type attribute pattern"));

/// Inline tags preserved by the upstream normalization pass.
const INLINE_TAGS: [&str; 5] = ["semantique", "nature", "exemple", "a", "i"];

static SPAN_PATTERNS: Lazy<Vec<(&'static str, Regex)>> = Lazy::new(|| {
    INLINE_TAGS
        .iter()
        .map(|tag| {
            let pattern = format!("<{tag}(\\s[^>]*)?>(.*?)</{tag}>");
            (*tag, Regex::new(&pattern).expect("inline span pattern"))
        })
        .collect()
});

/// Strip all markup tags and trim the result.
pub fn strip_tags(markup: &str) -> String {
    TAG.replace_all(markup, "").trim().to_string()
}

/// Scan the raw fragment for known inline spans, in text order.
fn scan_spans(raw: &str) -> Vec<InlineSpan> {
    let mut spans: Vec<(usize, InlineSpan)> = Vec::new();
    for (tag, pattern) in SPAN_PATTERNS.iter() {
        for captures in pattern.captures_iter(raw) {
            let whole = match captures.get(0) {
                Some(m) => m,
                None => continue,
            };
            let attrs = captures.get(1).map(|m| m.as_str()).unwrap_or("");
            let kind = TYPE_ATTR
                .captures(attrs)
                .and_then(|c| c.get(1))
                .map(|m| m.as_str().to_string());
            let text = captures
                .get(2)
                .map(|m| strip_tags(m.as_str()))
                .unwrap_or_default();
            spans.push((
                whole.start(),
                InlineSpan {
                    tag: (*tag).to_string(),
                    kind,
                    text,
                },
            ));
        }
    }
    spans.sort_by_key(|(start, _)| *start);
    spans.into_iter().map(|(_, span)| span).collect()
}
