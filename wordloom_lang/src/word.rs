// Word assembly: flatten syllables into a phoneme sequence and attach
// affixes.
//
// `assemble` concatenates syllables while tracking interior syllable
// boundaries, then applies each affix in registration order. Prefix and
// suffix conditions are tested against the current word-initial and
// word-final phoneme; an infix is inserted at the first interior boundary
// whose right-hand phoneme satisfies its condition. Boundary indices are
// maintained through every insertion.
//
// A failed condition follows the `AffixPolicy`: `Skip` (default) records an
// `AffixSkipped` warning on the result and continues, `Abort` fails the
// whole generation with `AffixConditionUnsatisfied`.

use serde::{Deserialize, Serialize};

use crate::error::LanguageError;
use crate::inventory::Inventory;
use crate::types::{GenerationWarning, PhonemePattern, Syllable};

/// Where an affix attaches.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AffixKind {
    Prefix,
    Suffix,
    /// Inserted at the first interior syllable boundary whose right-hand
    /// phoneme satisfies the condition.
    Infix,
}

/// What to do when an affix condition is never satisfied.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AffixPolicy {
    /// Record a warning and generate without the affix.
    #[default]
    Skip,
    /// Abort the generation with `AffixConditionUnsatisfied`.
    Abort,
}

/// A bound morpheme attached to every generated word whose condition holds.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Affix {
    pub label: String,
    /// Phoneme symbols to insert, in order. Validated against the inventory
    /// at registration time.
    pub form: Vec<String>,
    pub kind: AffixKind,
    /// Context test; `None` means the affix always applies.
    #[serde(default)]
    pub condition: Option<PhonemePattern>,
}

/// A word skeleton between assembly and rule application.
#[derive(Clone, Debug, PartialEq)]
pub struct AssembledWord {
    /// Flattened phoneme symbols, affixes included.
    pub symbols: Vec<String>,
    /// Indices into `symbols` where an interior syllable boundary falls.
    pub boundaries: Vec<usize>,
    pub warnings: Vec<GenerationWarning>,
}

/// A fully generated word with every derivation stage preserved.
///
/// Rule passes never mutate a stage in place; each pass produces a fresh
/// sequence so callers can inspect how the surface form was derived.
#[derive(Clone, Debug, PartialEq)]
pub struct GeneratedWord {
    /// The syllables as built, before affixation.
    pub syllables: Vec<Syllable>,
    /// Flattened symbols after affixation, before any rule pass.
    pub assembled: Vec<String>,
    /// Symbols after the word-internal rule pass.
    pub after_internal: Vec<String>,
    /// Final symbols after the word-edge rule pass.
    pub surface: Vec<String>,
    /// Grapheme rendering of `surface`.
    pub spelling: String,
    pub warnings: Vec<GenerationWarning>,
}

impl GeneratedWord {
    /// The phonemic surface form.
    pub fn phonemic(&self) -> &[String] {
        &self.surface
    }

    /// The graphemic surface form.
    pub fn graphemic(&self) -> &str {
        &self.spelling
    }
}

/// Concatenate syllables and apply affixes in registration order.
pub fn assemble(
    syllables: &[Syllable],
    affixes: &[Affix],
    inventory: &Inventory,
    policy: AffixPolicy,
) -> Result<AssembledWord, LanguageError> {
    let mut symbols: Vec<String> = Vec::new();
    let mut boundaries: Vec<usize> = Vec::new();
    for (i, syllable) in syllables.iter().enumerate() {
        if i > 0 {
            boundaries.push(symbols.len());
        }
        symbols.extend(syllable.phonemes.iter().map(|p| p.symbol.clone()));
    }

    let mut warnings = Vec::new();
    for affix in affixes {
        if try_attach(affix, &mut symbols, &mut boundaries, inventory) {
            continue;
        }
        match policy {
            AffixPolicy::Skip => warnings.push(GenerationWarning::AffixSkipped {
                affix: affix.label.clone(),
            }),
            AffixPolicy::Abort => {
                return Err(LanguageError::AffixConditionUnsatisfied {
                    affix: affix.label.clone(),
                });
            }
        }
    }

    Ok(AssembledWord {
        symbols,
        boundaries,
        warnings,
    })
}

/// Attach one affix if its condition holds. Returns false when the
/// condition was never satisfied.
fn try_attach(
    affix: &Affix,
    symbols: &mut Vec<String>,
    boundaries: &mut [usize],
    inventory: &Inventory,
) -> bool {
    match affix.kind {
        AffixKind::Prefix => {
            if let Some(condition) = &affix.condition {
                if !matches_at(symbols, 0, condition, inventory) {
                    return false;
                }
            }
            symbols.splice(0..0, affix.form.iter().cloned());
            for boundary in boundaries.iter_mut() {
                *boundary += affix.form.len();
            }
            true
        }
        AffixKind::Suffix => {
            if let Some(condition) = &affix.condition {
                let last = symbols.len().wrapping_sub(1);
                if symbols.is_empty() || !matches_at(symbols, last, condition, inventory) {
                    return false;
                }
            }
            symbols.extend(affix.form.iter().cloned());
            true
        }
        AffixKind::Infix => {
            let spot = boundaries.iter().position(|&b| match &affix.condition {
                None => true,
                Some(condition) => matches_at(symbols, b, condition, inventory),
            });
            let Some(spot) = spot else {
                return false;
            };
            let at = boundaries[spot];
            symbols.splice(at..at, affix.form.iter().cloned());
            for boundary in boundaries.iter_mut() {
                if *boundary > at {
                    *boundary += affix.form.len();
                }
            }
            true
        }
    }
}

fn matches_at(
    symbols: &[String],
    index: usize,
    pattern: &PhonemePattern,
    inventory: &Inventory,
) -> bool {
    symbols
        .get(index)
        .and_then(|s| inventory.get(s))
        .is_some_and(|p| pattern.matches(p))
}
