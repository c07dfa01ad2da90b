// Syllable shapes and the constrained random syllable builder.
//
// A `SyllableShape` is an ordered list of slot specifications (onset,
// nucleus, coda — each with a phoneme constraint and an optional flag);
// `build_syllable` samples a concrete syllable from an inventory. This
// replaces template strings like "CVC" with structured slots so the
// constraint can be any `PhonemePattern`, not just consonant/vowel.
//
// Sampling discipline: one `random_bool` draw per optional slot (drawn
// before the slot is filled), then one weighted draw per filled slot. Given
// a seeded `LoomRng` the same call sequence reproduces the same syllable.

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use wordloom_prng::LoomRng;

use crate::error::LanguageError;
use crate::inventory::{Inventory, Phoneme};
use crate::types::{PhonemePattern, SlotKind, Syllable, SyllablePhoneme};

fn default_inclusion_chance() -> f64 {
    0.5
}

fn default_shape_weight() -> u32 {
    1
}

/// One slot of a syllable shape.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SlotSpec {
    pub kind: SlotKind,
    /// Optional slots are filled with probability `inclusion_chance`.
    #[serde(default)]
    pub optional: bool,
    #[serde(default = "default_inclusion_chance")]
    pub inclusion_chance: f64,
    /// Predicate a phoneme must satisfy to fill this slot.
    pub constraint: PhonemePattern,
}

/// An ordered slot template for one syllable, with a selection weight used
/// when a language registers several shapes.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SyllableShape {
    pub label: String,
    #[serde(default)]
    pub slots: Vec<SlotSpec>,
    #[serde(default = "default_shape_weight")]
    pub weight: u32,
}

impl SyllableShape {
    pub fn new(label: &str) -> Self {
        SyllableShape {
            label: label.to_string(),
            slots: Vec::new(),
            weight: 1,
        }
    }

    pub fn weighted(label: &str, weight: u32) -> Self {
        SyllableShape {
            label: label.to_string(),
            slots: Vec::new(),
            weight,
        }
    }

    /// Append a slot. Optional slots use the default 50% inclusion chance.
    pub fn add_slot(
        &mut self,
        kind: SlotKind,
        optional: bool,
        constraint: PhonemePattern,
    ) -> &mut Self {
        self.slots.push(SlotSpec {
            kind,
            optional,
            inclusion_chance: default_inclusion_chance(),
            constraint,
        });
        self
    }

    /// Append an optional slot with an explicit inclusion chance.
    pub fn add_slot_with_chance(
        &mut self,
        kind: SlotKind,
        inclusion_chance: f64,
        constraint: PhonemePattern,
    ) -> &mut Self {
        self.slots.push(SlotSpec {
            kind,
            optional: true,
            inclusion_chance,
            constraint,
        });
        self
    }
}

/// Pick an index from a non-empty weight list; weights of 0 count as 1.
pub(crate) fn weighted_index(rng: &mut LoomRng, weights: &[u64]) -> usize {
    let total: u64 = weights.iter().map(|w| (*w).max(1)).sum();
    let mut pick = rng.range_u64(0, total);
    for (i, w) in weights.iter().enumerate() {
        let w = (*w).max(1);
        if pick < w {
            return i;
        }
        pick -= w;
    }
    weights.len() - 1
}

/// Sample one concrete syllable matching `shape` from `inventory`.
///
/// Slots are visited in order. An optional slot is included with its
/// inclusion chance; an included slot with no matching phoneme fails with
/// `NoMatchingPhoneme` — the shape/inventory combination is infeasible and
/// silently skipping the slot would corrupt the syllable structure.
pub fn build_syllable(
    shape: &SyllableShape,
    inventory: &Inventory,
    rng: &mut LoomRng,
) -> Result<Syllable, LanguageError> {
    let mut phonemes: SmallVec<[SyllablePhoneme; 4]> = SmallVec::new();
    for (position, slot) in shape.slots.iter().enumerate() {
        if slot.optional && !rng.random_bool(slot.inclusion_chance) {
            continue;
        }
        let candidates: Vec<&Phoneme> = inventory.phonemes_matching(&slot.constraint).collect();
        if candidates.is_empty() {
            return Err(LanguageError::NoMatchingPhoneme {
                shape: shape.label.clone(),
                slot: slot.kind,
                position,
            });
        }
        let weights: Vec<u64> = candidates.iter().map(|p| u64::from(p.weight)).collect();
        let chosen = candidates[weighted_index(rng, &weights)];
        phonemes.push(SyllablePhoneme {
            slot: slot.kind,
            symbol: chosen.symbol.clone(),
        });
    }
    Ok(Syllable { phonemes })
}
