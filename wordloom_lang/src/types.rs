// Core Wordloom vocabulary: phoneme classes, feature bundles, patterns,
// syllables, and generation warnings.
//
// These types are shared by every stage of the pipeline:
// - `PhonemeClass` — the fixed classification grid (nasal, plosive-voiced, …)
// - `FeatureBundle` — a phoneme's feature-name → value mapping
// - `PhonemePattern` — a feature predicate expressed as plain data, so that
//   syllable slots, affix conditions, and sound-change rules all serialize
//   into the same structured-document form
// - `SlotKind` / `SyllablePhoneme` / `Syllable` — a generated syllable with
//   each phoneme tagged by the slot it filled
// - `LengthRange` — the syllable-count distribution for a word
// - `GenerationWarning` — non-fatal notices carried on a generated word
//
// **Critical constraint: determinism.** These types are read during
// generation and must not introduce any non-deterministic behavior: all
// mappings are `BTreeMap` (never `HashMap`), and iteration order is always
// the registration or key order.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::inventory::Phoneme;

/// A phoneme's feature mapping: feature name → value.
pub type FeatureBundle = BTreeMap<String, String>;

/// The fixed classification of a phoneme, derived from its feature bundle
/// at registration time and stored for fast filtering.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PhonemeClass {
    Nasal,
    PlosiveVoiced,
    PlosiveVoiceless,
    FricativeVoiced,
    FricativeVoiceless,
    Approximant,
    Vowel,
}

/// Which structural slot of a syllable a phoneme fills.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SlotKind {
    Onset,
    Nucleus,
    Coda,
}

impl fmt::Display for SlotKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            SlotKind::Onset => "onset",
            SlotKind::Nucleus => "nucleus",
            SlotKind::Coda => "coda",
        };
        f.write_str(text)
    }
}

/// A predicate over phonemes, expressed as data so definitions stay
/// expressible as a plain structured document.
///
/// One pattern can match a single phoneme (`Symbol`), a whole class
/// (`Class`), or any phoneme sharing specific feature values (`Features`,
/// a subset match against the bundle).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PhonemePattern {
    /// Match exactly this inventory symbol.
    Symbol(String),
    /// Match any phoneme of this class.
    Class(PhonemeClass),
    /// Match any phoneme whose bundle contains all listed feature values.
    Features(FeatureBundle),
}

impl PhonemePattern {
    /// Test this pattern against a phoneme.
    pub fn matches(&self, phoneme: &Phoneme) -> bool {
        match self {
            PhonemePattern::Symbol(symbol) => phoneme.symbol == *symbol,
            PhonemePattern::Class(class) => phoneme.class == *class,
            PhonemePattern::Features(required) => required
                .iter()
                .all(|(name, value)| phoneme.features.get(name) == Some(value)),
        }
    }
}

/// One phoneme of a generated syllable, tagged with the slot it filled.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SyllablePhoneme {
    pub slot: SlotKind,
    pub symbol: String,
}

/// A generated syllable: the chosen phonemes of the non-skipped slots, in
/// slot order. Immutable once built.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Syllable {
    pub phonemes: SmallVec<[SyllablePhoneme; 4]>,
}

impl Syllable {
    pub fn len(&self) -> usize {
        self.phonemes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.phonemes.is_empty()
    }
}

/// Inclusive range of syllables per generated word.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LengthRange {
    pub min: usize,
    pub max: usize,
}

impl Default for LengthRange {
    fn default() -> Self {
        LengthRange { min: 1, max: 3 }
    }
}

/// A non-fatal notice recorded during generation and carried on the word.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GenerationWarning {
    /// An affix's condition was never satisfied and the skip policy applied.
    AffixSkipped { affix: String },
    /// A feature transform produced a bundle no inventory phoneme realizes;
    /// the matched phoneme was kept unchanged.
    UnrealizedTransform { rule: String, symbol: String },
}

impl fmt::Display for GenerationWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GenerationWarning::AffixSkipped { affix } => {
                write!(f, "affix '{affix}' skipped: condition never satisfied")
            }
            GenerationWarning::UnrealizedTransform { rule, symbol } => {
                write!(
                    f,
                    "rule '{rule}': no phoneme realizes the transform of '{symbol}'"
                )
            }
        }
    }
}
