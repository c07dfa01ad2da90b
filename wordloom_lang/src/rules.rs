// Sound-change rules: a deterministic, ordered rewriting transducer over
// phoneme sequences.
//
// A rule is a pattern / replacement / environment triple over feature
// predicates rather than literal symbols, so one rule can cover a natural
// class ("voiceless stop between vowels becomes voiced"). Rules run in two
// ordered passes — `internal` first, then `edge` — and within a pass in
// registration order.
//
// Sweep semantics, per rule:
// - left-to-right, leftmost-match-first, non-overlapping; the scan advances
//   past each replacement
// - pattern and environment are tested against the sweep's input sequence
//   (snapshot), never the partially rewritten output
// - `boundary` in an environment matches only the word edge sentinel
// - zero replacements across a pass is a normal outcome, not an error
//
// All structural validation happens at registration time (`validate_rule`),
// so the sweep itself can assume well-formed rules.

use serde::{Deserialize, Serialize};

use crate::error::LanguageError;
use crate::features::FeatureSpace;
use crate::inventory::Inventory;
use crate::types::{FeatureBundle, GenerationWarning, PhonemePattern};

/// Which of the two ordered passes a rule belongs to. The internal pass
/// always runs before the edge pass: fix internal structure first, then
/// trim the edges.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RulePass {
    Internal,
    Edge,
}

/// One side of a rule's environment.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContextSpec {
    /// The word edge (`#` in conventional rule notation).
    Boundary,
    /// A phoneme matching this pattern.
    Phoneme(PhonemePattern),
}

/// One element of a rule's replacement sequence.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Replacement {
    /// Emit this concrete inventory phoneme.
    Symbol(String),
    /// Copy the phoneme matched at the same pattern position, overriding
    /// the listed feature values (e.g. flip voicing, keep place and
    /// manner), then resolve the result to an inventory phoneme.
    Transform(FeatureBundle),
}

/// A conditioned rewrite of a phoneme sequence.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SoundChangeRule {
    pub label: String,
    /// Window to match, one pattern per phoneme.
    pub pattern: Vec<PhonemePattern>,
    /// What the window becomes. May be shorter or longer than the pattern;
    /// an empty replacement deletes the window.
    pub replacement: Vec<Replacement>,
    /// Context immediately left of the window.
    #[serde(default)]
    pub left: Option<ContextSpec>,
    /// Context immediately right of the window.
    #[serde(default)]
    pub right: Option<ContextSpec>,
    pub pass: RulePass,
}

/// What is wrong with a `PhonemePattern`, if anything. Shared by rule
/// validation (which reports `MalformedRule`) and shape/affix registration
/// (which report `InvalidFeatureBundle`/`UnknownSymbol`).
pub(crate) enum PatternProblem {
    Feature(String),
    Symbol(String),
}

pub(crate) fn pattern_problem(
    pattern: &PhonemePattern,
    space: &FeatureSpace,
    inventory: &Inventory,
) -> Option<PatternProblem> {
    match pattern {
        PhonemePattern::Symbol(symbol) => {
            if inventory.contains(symbol) {
                None
            } else {
                Some(PatternProblem::Symbol(symbol.clone()))
            }
        }
        PhonemePattern::Class(_) => None,
        PhonemePattern::Features(required) => feature_problem(required, space),
    }
}

fn feature_problem(bundle: &FeatureBundle, space: &FeatureSpace) -> Option<PatternProblem> {
    for (name, value) in bundle {
        let Some(domain) = space.domain(name) else {
            return Some(PatternProblem::Feature(format!(
                "feature '{name}' is not defined"
            )));
        };
        if !domain.contains(value) {
            return Some(PatternProblem::Feature(format!(
                "value '{value}' is not in the domain of feature '{name}'"
            )));
        }
    }
    None
}

/// Validate a rule at registration time. Fails with `MalformedRule` when the
/// pattern, replacement, or environment references an undefined feature or
/// unknown symbol, when a transform has no matched phoneme to start from,
/// or when an edge-pass rule references no boundary.
pub(crate) fn validate_rule(
    rule: &SoundChangeRule,
    space: &FeatureSpace,
    inventory: &Inventory,
) -> Result<(), LanguageError> {
    let malformed = |reason: String| LanguageError::MalformedRule {
        rule: rule.label.clone(),
        reason,
    };

    if rule.pattern.is_empty() {
        return Err(malformed("pattern is empty".to_string()));
    }
    for pattern in &rule.pattern {
        if let Some(problem) = pattern_problem(pattern, space, inventory) {
            return Err(malformed(problem_text("pattern", problem)));
        }
    }
    for context in [&rule.left, &rule.right].into_iter().flatten() {
        if let ContextSpec::Phoneme(pattern) = context {
            if let Some(problem) = pattern_problem(pattern, space, inventory) {
                return Err(malformed(problem_text("environment", problem)));
            }
        }
    }
    for (position, replacement) in rule.replacement.iter().enumerate() {
        match replacement {
            Replacement::Symbol(symbol) => {
                if !inventory.contains(symbol) {
                    return Err(malformed(format!(
                        "replacement references unknown phoneme '{symbol}'"
                    )));
                }
            }
            Replacement::Transform(overrides) => {
                if position >= rule.pattern.len() {
                    return Err(malformed(format!(
                        "transform at position {position} has no matched phoneme"
                    )));
                }
                if let Some(problem) = feature_problem(overrides, space) {
                    return Err(malformed(problem_text("transform", problem)));
                }
            }
        }
    }
    if rule.pass == RulePass::Edge
        && !matches!(rule.left, Some(ContextSpec::Boundary))
        && !matches!(rule.right, Some(ContextSpec::Boundary))
    {
        return Err(malformed(
            "edge-pass rule must reference a word boundary".to_string(),
        ));
    }
    Ok(())
}

fn problem_text(where_: &str, problem: PatternProblem) -> String {
    match problem {
        PatternProblem::Feature(reason) => format!("{where_}: {reason}"),
        PatternProblem::Symbol(symbol) => {
            format!("{where_} references unknown phoneme '{symbol}'")
        }
    }
}

/// Apply every rule of one pass, in registration order, to a symbol
/// sequence. Returns the rewritten sequence; the input is left untouched.
pub fn apply_pass(
    rules: &[SoundChangeRule],
    pass: RulePass,
    symbols: &[String],
    inventory: &Inventory,
    warnings: &mut Vec<GenerationWarning>,
) -> Vec<String> {
    let mut current = symbols.to_vec();
    for rule in rules.iter().filter(|r| r.pass == pass) {
        current = sweep(rule, &current, inventory, warnings);
    }
    current
}

/// One left-to-right sweep of a single rule.
fn sweep(
    rule: &SoundChangeRule,
    input: &[String],
    inventory: &Inventory,
    warnings: &mut Vec<GenerationWarning>,
) -> Vec<String> {
    let mut output = Vec::with_capacity(input.len());
    let mut at = 0;
    while at < input.len() {
        if window_matches(rule, input, at, inventory) {
            emit_replacement(rule, input, at, inventory, warnings, &mut output);
            at += rule.pattern.len();
        } else {
            output.push(input[at].clone());
            at += 1;
        }
    }
    output
}

fn window_matches(
    rule: &SoundChangeRule,
    input: &[String],
    start: usize,
    inventory: &Inventory,
) -> bool {
    let end = start + rule.pattern.len();
    if end > input.len() {
        return false;
    }
    for (offset, pattern) in rule.pattern.iter().enumerate() {
        let Some(phoneme) = inventory.get(&input[start + offset]) else {
            return false;
        };
        if !pattern.matches(phoneme) {
            return false;
        }
    }
    let left_position = start.checked_sub(1);
    let right_position = if end < input.len() { Some(end) } else { None };
    context_matches(rule.left.as_ref(), input, left_position, inventory)
        && context_matches(rule.right.as_ref(), input, right_position, inventory)
}

/// Test one environment side. `position` is `None` at the word edge.
fn context_matches(
    context: Option<&ContextSpec>,
    input: &[String],
    position: Option<usize>,
    inventory: &Inventory,
) -> bool {
    match context {
        None => true,
        Some(ContextSpec::Boundary) => position.is_none(),
        Some(ContextSpec::Phoneme(pattern)) => match position {
            Some(p) => inventory
                .get(&input[p])
                .is_some_and(|phoneme| pattern.matches(phoneme)),
            None => false,
        },
    }
}

fn emit_replacement(
    rule: &SoundChangeRule,
    input: &[String],
    start: usize,
    inventory: &Inventory,
    warnings: &mut Vec<GenerationWarning>,
    output: &mut Vec<String>,
) {
    for (offset, replacement) in rule.replacement.iter().enumerate() {
        match replacement {
            Replacement::Symbol(symbol) => output.push(symbol.clone()),
            Replacement::Transform(overrides) => {
                // Validation guarantees offset < pattern.len().
                let matched = &input[start + offset];
                match transform_symbol(matched, overrides, inventory) {
                    Some(symbol) => output.push(symbol),
                    None => {
                        warnings.push(GenerationWarning::UnrealizedTransform {
                            rule: rule.label.clone(),
                            symbol: matched.clone(),
                        });
                        output.push(matched.clone());
                    }
                }
            }
        }
    }
}

/// Apply feature overrides to a phoneme's bundle and resolve the result to
/// the inventory phoneme with exactly that bundle.
fn transform_symbol(
    symbol: &str,
    overrides: &FeatureBundle,
    inventory: &Inventory,
) -> Option<String> {
    let phoneme = inventory.get(symbol)?;
    let mut target = phoneme.features.clone();
    for (name, value) in overrides {
        target.insert(name.clone(), value.clone());
    }
    inventory
        .phonemes()
        .iter()
        .find(|candidate| candidate.features == target)
        .map(|candidate| candidate.symbol.clone())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::PhonemeClass;
    use std::collections::BTreeMap;

    fn bundle(pairs: &[(&str, &str)]) -> FeatureBundle {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn test_space() -> FeatureSpace {
        let mut space = FeatureSpace::new();
        space
            .define_feature("manner", &["vowel", "stop", "nasal"])
            .unwrap();
        space
            .define_feature("voicing", &["voiced", "voiceless"])
            .unwrap();
        space
            .define_feature("place", &["bilabial", "alveolar", "velar"])
            .unwrap();
        space
    }

    /// Vowels a, i; voiceless stops p, t, k with voiced partners b, d, g;
    /// nasal m (no voiceless partner).
    fn test_inventory(space: &FeatureSpace) -> Inventory {
        let mut inv = Inventory::new();
        for v in ["a", "i"] {
            inv.add_phoneme(space, v, v, bundle(&[("manner", "vowel")]), 1)
                .unwrap();
        }
        let stops = [
            ("p", "b", "bilabial"),
            ("t", "d", "alveolar"),
            ("k", "g", "velar"),
        ];
        for (voiceless, voiced, place) in stops {
            inv.add_phoneme(
                space,
                voiceless,
                voiceless,
                bundle(&[("manner", "stop"), ("voicing", "voiceless"), ("place", place)]),
                1,
            )
            .unwrap();
            inv.add_phoneme(
                space,
                voiced,
                voiced,
                bundle(&[("manner", "stop"), ("voicing", "voiced"), ("place", place)]),
                1,
            )
            .unwrap();
        }
        inv.add_phoneme(
            space,
            "m",
            "m",
            bundle(&[("manner", "nasal"), ("voicing", "voiced"), ("place", "bilabial")]),
            1,
        )
        .unwrap();
        inv
    }

    fn symbols(parts: &[&str]) -> Vec<String> {
        parts.iter().map(|s| s.to_string()).collect()
    }

    fn intervocalic_voicing() -> SoundChangeRule {
        SoundChangeRule {
            label: "intervocalic voicing".to_string(),
            pattern: vec![PhonemePattern::Class(PhonemeClass::PlosiveVoiceless)],
            replacement: vec![Replacement::Transform(bundle(&[("voicing", "voiced")]))],
            left: Some(ContextSpec::Phoneme(PhonemePattern::Class(
                PhonemeClass::Vowel,
            ))),
            right: Some(ContextSpec::Phoneme(PhonemePattern::Class(
                PhonemeClass::Vowel,
            ))),
            pass: RulePass::Internal,
        }
    }

    #[test]
    fn intervocalic_voicing_spares_the_edge() {
        let space = test_space();
        let inv = test_inventory(&space);
        let rules = vec![intervocalic_voicing()];
        let mut warnings = Vec::new();
        let out = apply_pass(
            &rules,
            RulePass::Internal,
            &symbols(&["p", "a", "t", "a"]),
            &inv,
            &mut warnings,
        );
        // The initial p has no left vowel context; the medial t voices.
        assert_eq!(out, symbols(&["p", "a", "d", "a"]));
        assert!(warnings.is_empty());
    }

    #[test]
    fn never_matching_environment_is_a_no_op() {
        let space = test_space();
        let inv = test_inventory(&space);
        let rule = SoundChangeRule {
            label: "after m only".to_string(),
            pattern: vec![PhonemePattern::Class(PhonemeClass::PlosiveVoiceless)],
            replacement: vec![Replacement::Transform(bundle(&[("voicing", "voiced")]))],
            left: Some(ContextSpec::Phoneme(PhonemePattern::Symbol("m".to_string()))),
            right: None,
            pass: RulePass::Internal,
        };
        let input = symbols(&["p", "a", "t", "a"]);
        let mut warnings = Vec::new();
        let out = apply_pass(&[rule], RulePass::Internal, &input, &inv, &mut warnings);
        assert_eq!(out, input);
        assert!(warnings.is_empty());
    }

    #[test]
    fn final_devoicing_via_boundary_context() {
        let space = test_space();
        let inv = test_inventory(&space);
        let rule = SoundChangeRule {
            label: "final devoicing".to_string(),
            pattern: vec![PhonemePattern::Class(PhonemeClass::PlosiveVoiced)],
            replacement: vec![Replacement::Transform(bundle(&[("voicing", "voiceless")]))],
            left: None,
            right: Some(ContextSpec::Boundary),
            pass: RulePass::Edge,
        };
        let mut warnings = Vec::new();
        let out = apply_pass(
            &[rule],
            RulePass::Edge,
            &symbols(&["b", "a", "d"]),
            &inv,
            &mut warnings,
        );
        // Only the word-final d devoices; the initial b is not at the right
        // boundary.
        assert_eq!(out, symbols(&["b", "a", "t"]));
    }

    #[test]
    fn multi_symbol_window_replaces_and_advances() {
        let space = test_space();
        let inv = test_inventory(&space);
        let rule = SoundChangeRule {
            label: "degemination".to_string(),
            pattern: vec![
                PhonemePattern::Symbol("t".to_string()),
                PhonemePattern::Symbol("t".to_string()),
            ],
            replacement: vec![Replacement::Symbol("t".to_string())],
            left: None,
            right: None,
            pass: RulePass::Internal,
        };
        let mut warnings = Vec::new();
        let out = apply_pass(
            &[rule],
            RulePass::Internal,
            &symbols(&["a", "t", "t", "a", "t", "t", "t", "a"]),
            &inv,
            &mut warnings,
        );
        // Leftmost-first, non-overlapping: [t,t]→t, then [t,t]→t, the
        // leftover third t passes through.
        assert_eq!(out, symbols(&["a", "t", "a", "t", "t", "a"]));
    }

    #[test]
    fn empty_replacement_deletes_the_window() {
        let space = test_space();
        let inv = test_inventory(&space);
        let rule = SoundChangeRule {
            label: "elision".to_string(),
            pattern: vec![PhonemePattern::Symbol("i".to_string())],
            replacement: vec![],
            left: Some(ContextSpec::Phoneme(PhonemePattern::Class(
                PhonemeClass::Vowel,
            ))),
            right: None,
            pass: RulePass::Internal,
        };
        let mut warnings = Vec::new();
        let out = apply_pass(
            &[rule],
            RulePass::Internal,
            &symbols(&["a", "i", "t", "i"]),
            &inv,
            &mut warnings,
        );
        assert_eq!(out, symbols(&["a", "t", "i"]));
    }

    #[test]
    fn unrealized_transform_warns_and_keeps_the_phoneme() {
        let space = test_space();
        let inv = test_inventory(&space);
        // m has no voiceless partner in the inventory.
        let rule = SoundChangeRule {
            label: "nasal devoicing".to_string(),
            pattern: vec![PhonemePattern::Class(PhonemeClass::Nasal)],
            replacement: vec![Replacement::Transform(bundle(&[("voicing", "voiceless")]))],
            left: None,
            right: None,
            pass: RulePass::Internal,
        };
        let mut warnings = Vec::new();
        let out = apply_pass(
            &[rule],
            RulePass::Internal,
            &symbols(&["a", "m", "a"]),
            &inv,
            &mut warnings,
        );
        assert_eq!(out, symbols(&["a", "m", "a"]));
        assert_eq!(
            warnings,
            vec![GenerationWarning::UnrealizedTransform {
                rule: "nasal devoicing".to_string(),
                symbol: "m".to_string(),
            }]
        );
    }

    #[test]
    fn rules_apply_in_registration_order() {
        let space = test_space();
        let inv = test_inventory(&space);
        // First voice the medial t, then the voiced-stop rule sees the d.
        let voicing = intervocalic_voicing();
        let spirantize_label = "voiced stop to m".to_string();
        let second = SoundChangeRule {
            label: spirantize_label,
            pattern: vec![PhonemePattern::Class(PhonemeClass::PlosiveVoiced)],
            replacement: vec![Replacement::Symbol("m".to_string())],
            left: None,
            right: None,
            pass: RulePass::Internal,
        };
        let mut warnings = Vec::new();
        let out = apply_pass(
            &[voicing, second],
            RulePass::Internal,
            &symbols(&["a", "t", "a"]),
            &inv,
            &mut warnings,
        );
        assert_eq!(out, symbols(&["a", "m", "a"]));
    }

    #[test]
    fn validation_rejects_malformed_rules() {
        let space = test_space();
        let inv = test_inventory(&space);

        let empty_pattern = SoundChangeRule {
            label: "empty".to_string(),
            pattern: vec![],
            replacement: vec![],
            left: None,
            right: None,
            pass: RulePass::Internal,
        };
        assert!(matches!(
            validate_rule(&empty_pattern, &space, &inv),
            Err(LanguageError::MalformedRule { .. })
        ));

        let unknown_feature = SoundChangeRule {
            label: "unknown feature".to_string(),
            pattern: vec![PhonemePattern::Features(bundle(&[("tone", "high")]))],
            replacement: vec![Replacement::Symbol("a".to_string())],
            left: None,
            right: None,
            pass: RulePass::Internal,
        };
        assert!(matches!(
            validate_rule(&unknown_feature, &space, &inv),
            Err(LanguageError::MalformedRule { .. })
        ));

        let unknown_symbol = SoundChangeRule {
            label: "unknown symbol".to_string(),
            pattern: vec![PhonemePattern::Symbol("x".to_string())],
            replacement: vec![Replacement::Symbol("a".to_string())],
            left: None,
            right: None,
            pass: RulePass::Internal,
        };
        assert!(matches!(
            validate_rule(&unknown_symbol, &space, &inv),
            Err(LanguageError::MalformedRule { .. })
        ));

        let dangling_transform = SoundChangeRule {
            label: "dangling transform".to_string(),
            pattern: vec![PhonemePattern::Class(PhonemeClass::Vowel)],
            replacement: vec![
                Replacement::Transform(bundle(&[("voicing", "voiced")])),
                Replacement::Transform(bundle(&[("voicing", "voiced")])),
            ],
            left: None,
            right: None,
            pass: RulePass::Internal,
        };
        assert!(matches!(
            validate_rule(&dangling_transform, &space, &inv),
            Err(LanguageError::MalformedRule { .. })
        ));

        let edge_without_boundary = SoundChangeRule {
            label: "edge without boundary".to_string(),
            pattern: vec![PhonemePattern::Class(PhonemeClass::Vowel)],
            replacement: vec![Replacement::Symbol("a".to_string())],
            left: None,
            right: None,
            pass: RulePass::Edge,
        };
        assert!(matches!(
            validate_rule(&edge_without_boundary, &space, &inv),
            Err(LanguageError::MalformedRule { .. })
        ));
    }

    #[test]
    fn well_formed_rule_passes_validation() {
        let space = test_space();
        let inv = test_inventory(&space);
        assert!(validate_rule(&intervocalic_voicing(), &space, &inv).is_ok());
    }

    #[test]
    fn transform_resolution_prefers_exact_bundle() {
        let space = test_space();
        let inv = test_inventory(&space);
        let out = transform_symbol("p", &bundle(&[("voicing", "voiced")]), &inv);
        assert_eq!(out, Some("b".to_string()));
        // Identity transform maps a phoneme to itself.
        let out = transform_symbol("p", &BTreeMap::new(), &inv);
        assert_eq!(out, Some("p".to_string()));
    }
}
