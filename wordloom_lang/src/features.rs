// Feature registry: names and enumerated value domains.
//
// `FeatureSpace` is the leaf of the pipeline — every other component checks
// feature references against it. A feature is a named categorical attribute
// (place, manner, voicing, height, …) with a closed set of values; a
// phoneme's bundle maps feature names to values drawn from these domains.
//
// The space is built once at language-definition time and is read-only
// during generation.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::error::LanguageError;
use crate::types::FeatureBundle;

/// Registry of feature names and their value domains.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct FeatureSpace {
    features: BTreeMap<String, BTreeSet<String>>,
}

impl FeatureSpace {
    pub fn new() -> Self {
        FeatureSpace {
            features: BTreeMap::new(),
        }
    }

    /// Register a feature with its value domain.
    ///
    /// Fails with `DuplicateFeature` if the name is already registered and
    /// `EmptyDomain` if the domain has no values.
    pub fn define_feature<S: AsRef<str>>(
        &mut self,
        name: &str,
        domain: &[S],
    ) -> Result<(), LanguageError> {
        if self.features.contains_key(name) {
            return Err(LanguageError::DuplicateFeature {
                name: name.to_string(),
            });
        }
        if domain.is_empty() {
            return Err(LanguageError::EmptyDomain {
                feature: name.to_string(),
            });
        }
        let values = domain.iter().map(|v| v.as_ref().to_string()).collect();
        self.features.insert(name.to_string(), values);
        Ok(())
    }

    pub fn has_feature(&self, name: &str) -> bool {
        self.features.contains_key(name)
    }

    /// The value domain of a feature, if registered.
    pub fn domain(&self, name: &str) -> Option<&BTreeSet<String>> {
        self.features.get(name)
    }

    /// Check that every feature name in the bundle is registered and every
    /// value lies in that feature's domain. Returns the first violation as
    /// a human-readable reason.
    pub fn validate_bundle(&self, bundle: &FeatureBundle) -> Result<(), String> {
        for (name, value) in bundle {
            let Some(domain) = self.features.get(name) else {
                return Err(format!("feature '{name}' is not defined"));
            };
            if !domain.contains(value) {
                return Err(format!(
                    "value '{value}' is not in the domain of feature '{name}'"
                ));
            }
        }
        Ok(())
    }

    pub fn is_valid_bundle(&self, bundle: &FeatureBundle) -> bool {
        self.validate_bundle(bundle).is_ok()
    }

    /// All registered features with their domains, in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &BTreeSet<String>)> {
        self.features.iter().map(|(name, dom)| (name.as_str(), dom))
    }
}
