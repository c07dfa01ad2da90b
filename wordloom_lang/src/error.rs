// Typed errors for definition construction and word generation.
//
// Two classes of failure flow through `LanguageError`:
// - Registration errors (`DuplicateFeature`, `EmptyDomain`, `DuplicateSymbol`,
//   `InvalidFeatureBundle`, `UnknownSymbol`, `MalformedRule`) — always fatal
//   to the operation that raised them. A rejected registration is never
//   silently dropped.
// - Generation errors (`NoMatchingPhoneme`, `NoSyllableShapes`,
//   `AffixConditionUnsatisfied`) — abort the in-progress generation call.
//   `AffixConditionUnsatisfied` is only raised under `AffixPolicy::Abort`;
//   the default policy downgrades it to a `GenerationWarning` on the word.
//
// There are no automatic retries: retrying with a different random draw is
// the caller's call, not this crate's.

use std::fmt;

use crate::types::SlotKind;

/// Everything that can go wrong while building a language definition or
/// generating a word from one.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LanguageError {
    /// A feature with this name is already registered.
    DuplicateFeature { name: String },
    /// A feature was declared with no values in its domain.
    EmptyDomain { feature: String },
    /// A phoneme with this symbol is already in the inventory.
    DuplicateSymbol { symbol: String },
    /// A feature bundle references an unregistered feature, an out-of-domain
    /// value, or cannot be classified into a phoneme class.
    InvalidFeatureBundle { context: String, reason: String },
    /// A registration referenced a phoneme symbol the inventory does not have.
    UnknownSymbol { context: String, symbol: String },
    /// No inventory phoneme satisfies a syllable slot's constraint. The
    /// shape/inventory combination is infeasible; generation is aborted
    /// rather than the slot silently skipped.
    NoMatchingPhoneme {
        shape: String,
        slot: SlotKind,
        position: usize,
    },
    /// Generation was requested from a definition with no syllable shapes.
    NoSyllableShapes,
    /// An affix condition was never satisfied and the affix policy is
    /// `Abort`.
    AffixConditionUnsatisfied { affix: String },
    /// A sound-change rule failed validation at registration time.
    MalformedRule { rule: String, reason: String },
}

impl fmt::Display for LanguageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LanguageError::DuplicateFeature { name } => {
                write!(f, "feature '{name}' is already defined")
            }
            LanguageError::EmptyDomain { feature } => {
                write!(f, "feature '{feature}' has an empty value domain")
            }
            LanguageError::DuplicateSymbol { symbol } => {
                write!(f, "phoneme '{symbol}' is already in the inventory")
            }
            LanguageError::InvalidFeatureBundle { context, reason } => {
                write!(f, "invalid feature bundle for {context}: {reason}")
            }
            LanguageError::UnknownSymbol { context, symbol } => {
                write!(f, "{context} references unknown phoneme '{symbol}'")
            }
            LanguageError::NoMatchingPhoneme {
                shape,
                slot,
                position,
            } => {
                write!(
                    f,
                    "no phoneme matches {slot} slot {position} of shape '{shape}'"
                )
            }
            LanguageError::NoSyllableShapes => {
                write!(f, "cannot generate: no syllable shapes are registered")
            }
            LanguageError::AffixConditionUnsatisfied { affix } => {
                write!(f, "condition of affix '{affix}' was never satisfied")
            }
            LanguageError::MalformedRule { rule, reason } => {
                write!(f, "malformed rule '{rule}': {reason}")
            }
        }
    }
}

impl std::error::Error for LanguageError {}
