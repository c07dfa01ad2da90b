// Proper-name generation on top of the word pipeline.
//
// A name is a generated word with its spelling capitalized. The generator
// takes `&mut LoomRng` for deterministic output, so callers naming many
// things from one seed get a reproducible stream of names.

use wordloom_prng::LoomRng;

use crate::LanguageDefinition;
use crate::error::LanguageError;
use crate::word::GeneratedWord;

/// A generated proper name with the underlying word.
#[derive(Clone, Debug)]
pub struct GeneratedName {
    /// Capitalized spelling.
    pub name: String,
    /// The word it was derived from, with all derivation stages.
    pub word: GeneratedWord,
}

/// Generate a proper name: one word, spelling capitalized.
pub fn generate_name(
    definition: &LanguageDefinition,
    rng: &mut LoomRng,
) -> Result<GeneratedName, LanguageError> {
    let word = definition.generate(rng)?;
    let name = capitalize(&word.spelling);
    Ok(GeneratedName { name, word })
}

/// Capitalize the first character of a string.
fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        None => String::new(),
        Some(c) => {
            let upper: String = c.to_uppercase().collect();
            format!("{}{}", upper, chars.as_str())
        }
    }
}
