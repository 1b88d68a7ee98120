//! The ordered rule cascade.
//!
//! Rule order is corpus-tuned and contractual: the first matching rule
//! wins, and several later rules only behave correctly because earlier
//! ones have already consumed their lookalikes. Do not reorder.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::model::{Classification, Confidence, IndentBlock, Role};

use super::context::ClassifyContext;

/// One rule of the cascade.
pub trait Rule {
    /// Stable rule name, recorded as classification evidence.
    fn name(&self) -> &'static str;

    /// Attempt to classify the block. `None` passes to the next rule.
    fn try_match(&self, block: &IndentBlock, ctx: &ClassifyContext) -> Option<Classification>;
}

/// Build the cascade in its contractual order.
pub fn cascade() -> Vec<Box<dyn Rule>> {
    vec![
        Box::new(FigurativeTag),
        Box::new(DomainTag),
        Box::new(NatureTag),
        Box::new(CrossReferenceTag),
        Box::new(ProverbOpener),
        Box::new(RegisterOpener),
        Box::new(VoiceTransitionOpener),
        Box::new(LocutionIntro),
        Box::new(CrossReferenceProse),
        Box::new(DefinitionOpener),
        Box::new(FigurativeAbbrev),
        Box::new(ShortPhraseLocution),
        Box::new(VerbEntryLeadingVoice),
        Box::new(ProverbContinuation),
        Box::new(CitationFallback),
        Box::new(ProseFallback),
    ]
}

static CROSS_REF_LEAD: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^(voy\.|V\.|voyez)").expect("cross-ref lead pattern"));

static CROSS_REF_TRAIL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r",\s*voy\.\s*$").expect("cross-ref trail pattern"));

static PROVERB: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^(Prov\.|Proverbe|Proverbialement)").expect("proverb pattern"));

static REGISTER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        "(?i)^(Populaire|Familière|Familièrement|Vulgaire|Vulgairement|\
         Triviale|Trivialement|Bas|Ironiquement|Plaisamment|Burlesque|\
         Poétiquement|Par euphémisme|Par exagération|Par ironie|\
         Par dérision|Par extension|Par analogie|Par métaphore|\
         Par plaisanterie|Par antiphrase|Néologisme)",
    )
    .expect("register pattern")
});

static VOICE_TRANSITION: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        "^(V\\.\\s*(n|a|réfl)|Se\\s+conjugue|Absolument|\
         Substantivement|Adverbialement|Adjectivement|\
         Intransitivement|Neutralement|Impersonnellement|\
         Activement|Au\\s+pluriel|Au\\s+féminin|Au\\s+singulier|\
         Au\\s+masc|Au\\s+fém|Avec\\s+un\\s+nom\\s+de)",
    )
    .expect("voice transition pattern")
});

static LOCUTION_INTRO: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^(Loc\.\s|Locution)").expect("locution intro pattern"));

static DEFINITION_OPENER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        "(?i)^(Se dit|Il se dit|On dit|On appelle|Se disait|\
         Qui se dit|Il s'est dit|Celui qui|Celle qui|\
         Ce qui|Chose qui|Action de|État de|Qualité de|\
         Nom (donné|que l'on donne)|Terme (de|d')|\
         En termes? (de|d'))",
    )
    .expect("definition opener pattern")
});

static CROSS_REF_PROSE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(Il est|C'est|On dit|Se dit).{0,40}<a ref=").expect("cross-ref prose pattern")
});

static FIG_PREFIX: Lazy<Regex> = Lazy::new(|| Regex::new(r"^Fig\.").expect("fig prefix pattern"));

static UPPERCASE_START: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-ZÉÈÊÀÂÎÏÔÙÛÜÇ]").expect("uppercase start pattern"));

static SENTENCE_OPENER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(Il|On|Se|C'|Qui|Que|Ce|La|Le|Les|Un|Une|Des) ").expect("sentence opener pattern")
});

static VOICE_LEAD: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(Se\s|S')").expect("voice lead pattern"));

/// `<semantique type="indicateur">Fig.</semantique>` marks a figurative
/// sub-sense explicitly.
struct FigurativeTag;

impl Rule for FigurativeTag {
    fn name(&self) -> &'static str {
        "figurative_tag"
    }

    fn try_match(&self, block: &IndentBlock, _ctx: &ClassifyContext) -> Option<Classification> {
        let span = block.span_with_kind("semantique", "indicateur")?;
        if span.text.starts_with("Fig.") {
            Some(Classification::new(
                Role::FigurativeSense,
                Confidence::High,
                self.name(),
            ))
        } else {
            None
        }
    }
}

/// `<semantique type="domaine">` carries an explicit subject-domain label.
struct DomainTag;

impl Rule for DomainTag {
    fn name(&self) -> &'static str {
        "domain_tag"
    }

    fn try_match(&self, block: &IndentBlock, _ctx: &ClassifyContext) -> Option<Classification> {
        let span = block.span_with_kind("semantique", "domaine")?;
        Some(
            Classification::new(Role::DomainLabel, Confidence::High, self.name())
                .with_label(span.text.trim().to_lowercase()),
        )
    }
}

/// `<nature>` carries an explicit part-of-speech label.
struct NatureTag;

impl Rule for NatureTag {
    fn name(&self) -> &'static str {
        "nature_tag"
    }

    fn try_match(&self, block: &IndentBlock, _ctx: &ClassifyContext) -> Option<Classification> {
        if block.has_span("nature") {
            Some(Classification::new(
                Role::NatureLabel,
                Confidence::High,
                self.name(),
            ))
        } else {
            None
        }
    }
}

/// A short block containing a link and reading "voy. …" is a
/// cross-reference to another entry.
struct CrossReferenceTag;

impl Rule for CrossReferenceTag {
    fn name(&self) -> &'static str {
        "cross_reference_tag"
    }

    fn try_match(&self, block: &IndentBlock, _ctx: &ClassifyContext) -> Option<Classification> {
        if !block.raw.contains("<a ref=") || block.text.chars().count() >= 120 {
            return None;
        }
        if CROSS_REF_LEAD.is_match(&block.text) || CROSS_REF_TRAIL.is_match(&block.text) {
            Some(Classification::new(
                Role::CrossReference,
                Confidence::High,
                self.name(),
            ))
        } else {
            None
        }
    }
}

struct ProverbOpener;

impl Rule for ProverbOpener {
    fn name(&self) -> &'static str {
        "proverb_opener"
    }

    fn try_match(&self, block: &IndentBlock, _ctx: &ClassifyContext) -> Option<Classification> {
        if PROVERB.is_match(&block.text) {
            Some(Classification::new(
                Role::Proverb,
                Confidence::High,
                self.name(),
            ))
        } else {
            None
        }
    }
}

/// Closed vocabulary of register and rhetorical-shift openers.
struct RegisterOpener;

impl Rule for RegisterOpener {
    fn name(&self) -> &'static str {
        "register_opener"
    }

    fn try_match(&self, block: &IndentBlock, _ctx: &ClassifyContext) -> Option<Classification> {
        let matched = REGISTER.find(&block.text)?;
        Some(
            Classification::new(Role::RegisterLabel, Confidence::Medium, self.name())
                .with_label(matched.as_str().to_lowercase()),
        )
    }
}

/// Closed vocabulary of grammatical-transition openers
/// ("Substantivement", "V. réfl", "Au pluriel", …).
struct VoiceTransitionOpener;

impl Rule for VoiceTransitionOpener {
    fn name(&self) -> &'static str {
        "voice_transition_opener"
    }

    fn try_match(&self, block: &IndentBlock, _ctx: &ClassifyContext) -> Option<Classification> {
        if VOICE_TRANSITION.is_match(&block.text) {
            Some(Classification::new(
                Role::VoiceTransition,
                Confidence::Medium,
                self.name(),
            ))
        } else {
            None
        }
    }
}

/// An `<exemple>` span or a "Loc." opener introduces a locution.
struct LocutionIntro;

impl Rule for LocutionIntro {
    fn name(&self) -> &'static str {
        "locution_intro"
    }

    fn try_match(&self, block: &IndentBlock, _ctx: &ClassifyContext) -> Option<Classification> {
        if block.has_span("exemple") || LOCUTION_INTRO.is_match(&block.text) {
            Some(Classification::new(
                Role::Locution,
                Confidence::Medium,
                self.name(),
            ))
        } else {
            None
        }
    }
}

/// Prose leading straight into a link ("Il est … <a ref=…>") is a
/// cross-reference phrased as a sentence.
struct CrossReferenceProse;

impl Rule for CrossReferenceProse {
    fn name(&self) -> &'static str {
        "cross_reference_prose"
    }

    fn try_match(&self, block: &IndentBlock, _ctx: &ClassifyContext) -> Option<Classification> {
        if block.raw.contains("<a ref=") && CROSS_REF_PROSE.is_match(&block.raw) {
            Some(Classification::new(
                Role::CrossReference,
                Confidence::Medium,
                self.name(),
            ))
        } else {
            None
        }
    }
}

/// Definitional prose ("Se dit…", "Celui qui…", "Terme de…") is an
/// ordinary sub-sense, not a label.
struct DefinitionOpener;

impl Rule for DefinitionOpener {
    fn name(&self) -> &'static str {
        "definition_opener"
    }

    fn try_match(&self, block: &IndentBlock, _ctx: &ClassifyContext) -> Option<Classification> {
        if DEFINITION_OPENER.is_match(&block.text) {
            Some(Classification::new(
                Role::OrdinarySense,
                Confidence::Low,
                self.name(),
            ))
        } else {
            None
        }
    }
}

/// Plain-text "Fig." prefix without the explicit indicator tag.
struct FigurativeAbbrev;

impl Rule for FigurativeAbbrev {
    fn name(&self) -> &'static str {
        "figurative_abbrev"
    }

    fn try_match(&self, block: &IndentBlock, _ctx: &ClassifyContext) -> Option<Classification> {
        if FIG_PREFIX.is_match(&block.text) {
            Some(Classification::new(
                Role::FigurativeSense,
                Confidence::High,
                self.name(),
            ))
        } else {
            None
        }
    }
}

/// A short capitalized phrase with a comma and no citations reads as a
/// locution head ("Chemin faisant, …").
struct ShortPhraseLocution;

impl Rule for ShortPhraseLocution {
    fn name(&self) -> &'static str {
        "short_phrase_locution"
    }

    fn try_match(&self, block: &IndentBlock, _ctx: &ClassifyContext) -> Option<Classification> {
        let text = &block.text;
        if text.chars().count() < 100
            && block.citations.is_empty()
            && text.contains(',')
            && UPPERCASE_START.is_match(text)
            && !SENTENCE_OPENER.is_match(text)
        {
            Some(Classification::new(
                Role::Locution,
                Confidence::Low,
                self.name(),
            ))
        } else {
            None
        }
    }
}

/// Positional heuristic: the first block under a verb entry often carries
/// its voice label ("Se dit aussi…", "S'emploie…").
struct VerbEntryLeadingVoice;

impl Rule for VerbEntryLeadingVoice {
    fn name(&self) -> &'static str {
        "verb_entry_leading_voice"
    }

    fn try_match(&self, block: &IndentBlock, ctx: &ClassifyContext) -> Option<Classification> {
        if ctx.position == 0
            && ctx.is_verb_entry()
            && block.text.chars().count() < 40
            && VOICE_LEAD.is_match(&block.text)
        {
            Some(Classification::new(
                Role::VoiceTransition,
                Confidence::Medium,
                self.name(),
            ))
        } else {
            None
        }
    }
}

/// A short cited block right after a proverb continues the proverb run.
struct ProverbContinuation;

impl Rule for ProverbContinuation {
    fn name(&self) -> &'static str {
        "proverb_continuation"
    }

    fn try_match(&self, block: &IndentBlock, ctx: &ClassifyContext) -> Option<Classification> {
        if ctx.prev_role == Some(Role::Proverb)
            && !block.citations.is_empty()
            && block.text.chars().count() < 120
        {
            Some(Classification::new(
                Role::Proverb,
                Confidence::Low,
                self.name(),
            ))
        } else {
            None
        }
    }
}

/// Cited content without a recognizable opener is an ordinary sub-sense.
struct CitationFallback;

impl Rule for CitationFallback {
    fn name(&self) -> &'static str {
        "citation_fallback"
    }

    fn try_match(&self, block: &IndentBlock, _ctx: &ClassifyContext) -> Option<Classification> {
        if !block.citations.is_empty() {
            Some(Classification::new(
                Role::OrdinarySense,
                Confidence::Low,
                self.name(),
            ))
        } else {
            None
        }
    }
}

/// Remaining prose of any substance is an ordinary sub-sense.
struct ProseFallback;

impl Rule for ProseFallback {
    fn name(&self) -> &'static str {
        "prose_fallback"
    }

    fn try_match(&self, block: &IndentBlock, _ctx: &ClassifyContext) -> Option<Classification> {
        if block.text.chars().count() > 20 {
            Some(Classification::new(
                Role::OrdinarySense,
                Confidence::Low,
                self.name(),
            ))
        } else {
            None
        }
    }
}
