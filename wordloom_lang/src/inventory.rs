// Phoneme inventory: the language's sound set, partitioned by class.
//
// A `Phoneme` couples a symbol (unique key), a grapheme (surface spelling),
// a feature bundle, a class derived from the bundle, and a sampling weight.
// The inventory owns the phonemes in registration order plus a class
// partition for fast filtering; it is mutated only through `add_phoneme`
// and never auto-derives sounds.
//
// Classification is the fixed mapping documented on `classify_bundle`. The
// class is derivable from the bundle but stored on each phoneme so matching
// and sampling never re-derive it.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::LanguageError;
use crate::features::FeatureSpace;
use crate::types::{FeatureBundle, PhonemeClass, PhonemePattern};

pub(crate) fn default_weight() -> u32 {
    1
}

/// One sound of the language.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Phoneme {
    /// Unique identifier within the inventory.
    pub symbol: String,
    /// Surface spelling used when rendering a word.
    pub grapheme: String,
    /// Feature-name → value mapping, validated against the `FeatureSpace`.
    pub features: FeatureBundle,
    /// Class derived from the bundle at registration time.
    pub class: PhonemeClass,
    /// Relative sampling frequency. 0 is treated as 1 when sampling.
    #[serde(default = "default_weight")]
    pub weight: u32,
}

/// Derive a phoneme class from a feature bundle.
///
/// The mapping is fixed and reads the canonical features `manner` and
/// `voicing`:
///
/// | `manner`      | `voicing`   | class                |
/// |---------------|-------------|----------------------|
/// | `vowel`       | —           | `vowel`              |
/// | `nasal`       | —           | `nasal`              |
/// | `stop`        | `voiced`    | `plosive-voiced`     |
/// | `stop`        | `voiceless` | `plosive-voiceless`  |
/// | `fricative`   | `voiced`    | `fricative-voiced`   |
/// | `fricative`   | `voiceless` | `fricative-voiceless`|
/// | `approximant` | —           | `approximant`        |
///
/// Any other combination (including a stop or fricative without a voicing
/// value) is unclassifiable and returns `None`.
pub fn classify_bundle(bundle: &FeatureBundle) -> Option<PhonemeClass> {
    let manner = bundle.get("manner")?;
    let voicing = bundle.get("voicing").map(String::as_str);
    match (manner.as_str(), voicing) {
        ("vowel", _) => Some(PhonemeClass::Vowel),
        ("nasal", _) => Some(PhonemeClass::Nasal),
        ("stop", Some("voiced")) => Some(PhonemeClass::PlosiveVoiced),
        ("stop", Some("voiceless")) => Some(PhonemeClass::PlosiveVoiceless),
        ("fricative", Some("voiced")) => Some(PhonemeClass::FricativeVoiced),
        ("fricative", Some("voiceless")) => Some(PhonemeClass::FricativeVoiceless),
        ("approximant", _) => Some(PhonemeClass::Approximant),
        _ => None,
    }
}

/// The language's phoneme set.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Inventory {
    phonemes: Vec<Phoneme>,
    index: BTreeMap<String, usize>,
    by_class: BTreeMap<PhonemeClass, Vec<usize>>,
}

impl Inventory {
    pub fn new() -> Self {
        Inventory::default()
    }

    /// Register a phoneme.
    ///
    /// Fails with `DuplicateSymbol` if the symbol exists, or
    /// `InvalidFeatureBundle` if the feature space rejects the bundle or
    /// the bundle cannot be classified.
    pub fn add_phoneme(
        &mut self,
        space: &FeatureSpace,
        symbol: &str,
        grapheme: &str,
        features: FeatureBundle,
        weight: u32,
    ) -> Result<(), LanguageError> {
        if self.index.contains_key(symbol) {
            return Err(LanguageError::DuplicateSymbol {
                symbol: symbol.to_string(),
            });
        }
        if let Err(reason) = space.validate_bundle(&features) {
            return Err(LanguageError::InvalidFeatureBundle {
                context: format!("phoneme '{symbol}'"),
                reason,
            });
        }
        let class = classify_bundle(&features).ok_or_else(|| LanguageError::InvalidFeatureBundle {
            context: format!("phoneme '{symbol}'"),
            reason: "bundle does not map to any phoneme class".to_string(),
        })?;

        let position = self.phonemes.len();
        self.phonemes.push(Phoneme {
            symbol: symbol.to_string(),
            grapheme: grapheme.to_string(),
            features,
            class,
            weight,
        });
        self.index.insert(symbol.to_string(), position);
        self.by_class.entry(class).or_default().push(position);
        Ok(())
    }

    pub fn get(&self, symbol: &str) -> Option<&Phoneme> {
        self.index.get(symbol).map(|&i| &self.phonemes[i])
    }

    pub fn contains(&self, symbol: &str) -> bool {
        self.index.contains_key(symbol)
    }

    /// All phonemes in registration order.
    pub fn phonemes(&self) -> &[Phoneme] {
        &self.phonemes
    }

    /// All phonemes of one class, in registration order.
    pub fn of_class(&self, class: PhonemeClass) -> impl Iterator<Item = &Phoneme> {
        self.by_class
            .get(&class)
            .into_iter()
            .flatten()
            .map(|&i| &self.phonemes[i])
    }

    /// Lazy, restartable sequence of phonemes matching a pattern, in
    /// registration order. Used by both syllable sampling and the rule
    /// engine.
    pub fn phonemes_matching<'a>(
        &'a self,
        pattern: &'a PhonemePattern,
    ) -> impl Iterator<Item = &'a Phoneme> {
        self.phonemes.iter().filter(move |p| pattern.matches(p))
    }

    pub fn len(&self) -> usize {
        self.phonemes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.phonemes.is_empty()
    }
}
