// Wordloom constructed-language crate.
//
// Defines a language — sound inventory, feature system, syllable shapes,
// affixes, sound-change rules — and procedurally generates words and proper
// names that are internally consistent with that definition.
//
// Architecture:
// - `types.rs`: Core vocabulary — `PhonemeClass`, `PhonemePattern`,
//   `Syllable`, `GenerationWarning`
// - `features.rs`: `FeatureSpace` — feature name/domain registry
// - `inventory.rs`: `Phoneme` + `Inventory` — the sound set, class-partitioned
// - `syllable.rs`: `SyllableShape` + `build_syllable` — constrained sampling
// - `word.rs`: affix application and the `GeneratedWord` result
// - `rules.rs`: two-pass ordered sound-change transducer
// - `names.rs`: capitalized proper names on top of `generate`
// - `lib.rs` (this file): `LanguageDefinition` — the construction API, the
//   generation entry point, and the plain-document serialization contract
//
// A definition is built once through the `add_*`/`define_*` methods (each
// registration is validated and rejected loudly) and is read-only during
// generation. `LanguageDocument` is the serde-facing mirror of a definition
// (`from_json()` follows the same pattern as the sim crate's `GameConfig`:
// JSON string in, typed struct out); reloading a document replays the
// construction API so a loaded definition passes every check.
//
// Determinism constraint: generation must be reproducible from a seed. All
// RNG goes through `wordloom_prng::LoomRng`, all definition maps are
// ordered, and `generate` takes the rng explicitly — the definition holds
// no random state.

pub mod error;
pub mod features;
pub mod inventory;
pub mod names;
pub mod rules;
pub mod syllable;
pub mod types;
pub mod word;

use serde::{Deserialize, Serialize};

use wordloom_prng::LoomRng;

// Re-export key types at crate root for convenience.
pub use error::LanguageError;
pub use features::FeatureSpace;
pub use inventory::{Inventory, Phoneme, classify_bundle};
pub use names::{GeneratedName, generate_name};
pub use rules::{ContextSpec, Replacement, RulePass, SoundChangeRule};
pub use syllable::{SlotSpec, SyllableShape, build_syllable};
pub use types::{
    FeatureBundle, GenerationWarning, LengthRange, PhonemeClass, PhonemePattern, SlotKind,
    Syllable, SyllablePhoneme,
};
pub use word::{Affix, AffixKind, AffixPolicy, AssembledWord, GeneratedWord};

use rules::PatternProblem;
use word::assemble;

/// A complete language definition: everything the generation pipeline needs,
/// built once and read-only afterwards.
#[derive(Clone, Debug, Default)]
pub struct LanguageDefinition {
    name: String,
    feature_space: FeatureSpace,
    inventory: Inventory,
    shapes: Vec<SyllableShape>,
    affixes: Vec<Affix>,
    rules: Vec<SoundChangeRule>,
    word_length: LengthRange,
    affix_policy: AffixPolicy,
}

impl LanguageDefinition {
    pub fn new(name: &str) -> Self {
        LanguageDefinition {
            name: name.to_string(),
            ..LanguageDefinition::default()
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn feature_space(&self) -> &FeatureSpace {
        &self.feature_space
    }

    pub fn inventory(&self) -> &Inventory {
        &self.inventory
    }

    /// Register a feature with its value domain.
    pub fn define_feature<S: AsRef<str>>(
        &mut self,
        name: &str,
        domain: &[S],
    ) -> Result<(), LanguageError> {
        self.feature_space.define_feature(name, domain)
    }

    /// Register a phoneme with sampling weight 1.
    pub fn add_phoneme(
        &mut self,
        symbol: &str,
        grapheme: &str,
        features: &[(&str, &str)],
    ) -> Result<(), LanguageError> {
        self.add_phoneme_weighted(symbol, grapheme, features, 1)
    }

    /// Register a phoneme with an explicit sampling weight.
    pub fn add_phoneme_weighted(
        &mut self,
        symbol: &str,
        grapheme: &str,
        features: &[(&str, &str)],
        weight: u32,
    ) -> Result<(), LanguageError> {
        let bundle: FeatureBundle = features
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        self.inventory
            .add_phoneme(&self.feature_space, symbol, grapheme, bundle, weight)
    }

    /// Register a syllable shape. Every slot constraint is validated against
    /// the feature space and inventory.
    pub fn add_shape(&mut self, shape: SyllableShape) -> Result<(), LanguageError> {
        for slot in &shape.slots {
            self.check_pattern(&slot.constraint, &format!("shape '{}'", shape.label))?;
        }
        self.shapes.push(shape);
        Ok(())
    }

    /// Register an affix. Every form symbol and the condition are validated.
    pub fn add_affix(&mut self, affix: Affix) -> Result<(), LanguageError> {
        let context = format!("affix '{}'", affix.label);
        for symbol in &affix.form {
            if !self.inventory.contains(symbol) {
                return Err(LanguageError::UnknownSymbol {
                    context,
                    symbol: symbol.clone(),
                });
            }
        }
        if let Some(condition) = &affix.condition {
            self.check_pattern(condition, &context)?;
        }
        self.affixes.push(affix);
        Ok(())
    }

    /// Register a sound-change rule. Registration order is application
    /// order within each pass.
    pub fn add_rule(&mut self, rule: SoundChangeRule) -> Result<(), LanguageError> {
        rules::validate_rule(&rule, &self.feature_space, &self.inventory)?;
        self.rules.push(rule);
        Ok(())
    }

    /// Set the syllables-per-word range (inclusive). Default is 1..=3.
    ///
    /// Panics if `min` is 0 or greater than `max`.
    pub fn set_word_length(&mut self, min: usize, max: usize) {
        assert!(min >= 1, "set_word_length: min must be at least 1");
        assert!(min <= max, "set_word_length: min must be <= max");
        self.word_length = LengthRange { min, max };
    }

    /// Set what happens when an affix condition is never satisfied.
    pub fn set_affix_policy(&mut self, policy: AffixPolicy) {
        self.affix_policy = policy;
    }

    /// Generate one word.
    ///
    /// Picks the syllable count, builds each syllable from a weighted shape
    /// choice, assembles the word with affixes, runs the internal then the
    /// edge rule pass, and renders the spelling. Fail-fast: any component
    /// error propagates unchanged — a malformed definition should be fixed,
    /// not papered over.
    pub fn generate(&self, rng: &mut LoomRng) -> Result<GeneratedWord, LanguageError> {
        if self.shapes.is_empty() {
            return Err(LanguageError::NoSyllableShapes);
        }
        let count = rng.range_usize_inclusive(self.word_length.min, self.word_length.max);
        let shape_weights: Vec<u64> = self
            .shapes
            .iter()
            .map(|shape| u64::from(shape.weight))
            .collect();

        let mut syllables = Vec::with_capacity(count);
        for _ in 0..count {
            let shape = &self.shapes[syllable::weighted_index(rng, &shape_weights)];
            syllables.push(build_syllable(shape, &self.inventory, rng)?);
        }

        let AssembledWord {
            symbols: assembled,
            boundaries: _,
            mut warnings,
        } = assemble(&syllables, &self.affixes, &self.inventory, self.affix_policy)?;

        let after_internal = rules::apply_pass(
            &self.rules,
            RulePass::Internal,
            &assembled,
            &self.inventory,
            &mut warnings,
        );
        let surface = rules::apply_pass(
            &self.rules,
            RulePass::Edge,
            &after_internal,
            &self.inventory,
            &mut warnings,
        );
        let spelling = self.spell(&surface);

        Ok(GeneratedWord {
            syllables,
            assembled,
            after_internal,
            surface,
            spelling,
            warnings,
        })
    }

    /// Generate one word from a fresh rng seeded with `seed`.
    pub fn generate_with_seed(&self, seed: u64) -> Result<GeneratedWord, LanguageError> {
        let mut rng = LoomRng::new(seed);
        self.generate(&mut rng)
    }

    /// Render a symbol sequence as graphemes. Every symbol in a generated
    /// word is inventory-backed (enforced at registration), so this is
    /// total in practice.
    fn spell(&self, symbols: &[String]) -> String {
        symbols
            .iter()
            .filter_map(|s| self.inventory.get(s))
            .map(|p| p.grapheme.as_str())
            .collect()
    }

    fn check_pattern(
        &self,
        pattern: &PhonemePattern,
        context: &str,
    ) -> Result<(), LanguageError> {
        match rules::pattern_problem(pattern, &self.feature_space, &self.inventory) {
            None => Ok(()),
            Some(PatternProblem::Feature(reason)) => Err(LanguageError::InvalidFeatureBundle {
                context: context.to_string(),
                reason,
            }),
            Some(PatternProblem::Symbol(symbol)) => Err(LanguageError::UnknownSymbol {
                context: context.to_string(),
                symbol,
            }),
        }
    }

    /// Express this definition as a plain structured document.
    pub fn to_document(&self) -> LanguageDocument {
        LanguageDocument {
            name: self.name.clone(),
            features: self
                .feature_space
                .iter()
                .map(|(name, domain)| FeatureDef {
                    name: name.to_string(),
                    domain: domain.iter().cloned().collect(),
                })
                .collect(),
            phonemes: self
                .inventory
                .phonemes()
                .iter()
                .map(|p| PhonemeDef {
                    symbol: p.symbol.clone(),
                    grapheme: p.grapheme.clone(),
                    features: p.features.clone(),
                    weight: p.weight,
                })
                .collect(),
            shapes: self.shapes.clone(),
            affixes: self.affixes.clone(),
            rules: self.rules.clone(),
            word_length: self.word_length,
            affix_policy: self.affix_policy,
        }
    }

    /// Rebuild a definition from a document by replaying the construction
    /// API, so every registration check runs again on load.
    pub fn from_document(doc: &LanguageDocument) -> Result<Self, LanguageError> {
        let mut def = LanguageDefinition::new(&doc.name);
        for feature in &doc.features {
            def.feature_space
                .define_feature(&feature.name, &feature.domain)?;
        }
        for phoneme in &doc.phonemes {
            def.inventory.add_phoneme(
                &def.feature_space,
                &phoneme.symbol,
                &phoneme.grapheme,
                phoneme.features.clone(),
                phoneme.weight,
            )?;
        }
        for shape in &doc.shapes {
            def.add_shape(shape.clone())?;
        }
        for affix in &doc.affixes {
            def.add_affix(affix.clone())?;
        }
        for rule in &doc.rules {
            def.add_rule(rule.clone())?;
        }
        def.word_length = doc.word_length;
        def.affix_policy = doc.affix_policy;
        Ok(def)
    }

    /// Serialize the definition document as JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(&self.to_document())
    }

    /// Load a definition from a JSON document.
    pub fn from_json(json: &str) -> Result<Self, Box<dyn std::error::Error>> {
        let doc: LanguageDocument = serde_json::from_str(json)?;
        Ok(LanguageDefinition::from_document(&doc)?)
    }
}

/// One feature table row of a `LanguageDocument`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FeatureDef {
    pub name: String,
    pub domain: Vec<String>,
}

/// One phoneme table row of a `LanguageDocument`. The class is not stored —
/// it is re-derived from the bundle on load.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PhonemeDef {
    pub symbol: String,
    pub grapheme: String,
    pub features: FeatureBundle,
    #[serde(default = "crate::inventory::default_weight")]
    pub weight: u32,
}

/// The plain structured document form of a language definition: nested
/// mappings and sequences of primitives, loadable from any structured file
/// format. The core depends on serde only; JSON is one possible carrier.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LanguageDocument {
    pub name: String,
    pub features: Vec<FeatureDef>,
    pub phonemes: Vec<PhonemeDef>,
    #[serde(default)]
    pub shapes: Vec<SyllableShape>,
    #[serde(default)]
    pub affixes: Vec<Affix>,
    #[serde(default)]
    pub rules: Vec<SoundChangeRule>,
    #[serde(default)]
    pub word_length: LengthRange,
    #[serde(default)]
    pub affix_policy: AffixPolicy,
}
