//! Attribute score maps returned by the classifier.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Names of the risk attributes requested from the classifier.
pub mod attributes {
    /// Severe toxicity score.
    pub const SEVERE_TOXICITY: &str = "SEVERE_TOXICITY";
    /// Profanity score.
    pub const PROFANITY: &str = "PROFANITY";
    /// Identity attack score.
    pub const IDENTITY_ATTACK: &str = "IDENTITY_ATTACK";
    /// Threat score.
    pub const THREAT: &str = "THREAT";
    /// General toxicity score.
    pub const TOXICITY: &str = "TOXICITY";
    /// Flirtation score, compared against its own threshold.
    pub const FLIRTATION: &str = "FLIRTATION";

    /// All attributes requested on every analyze call.
    pub const REQUESTED: [&str; 6] = [
        SEVERE_TOXICITY,
        PROFANITY,
        IDENTITY_ATTACK,
        THREAT,
        TOXICITY,
        FLIRTATION,
    ];
}

/// A mapping of named risk attributes to scores in `[0, 1]`.
///
/// Responses may carry attributes beyond the requested set; extras are kept
/// so the moderator summary can show the full breakdown.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AttributeScores(HashMap<String, f64>);

impl AttributeScores {
    /// Create an empty score map.
    #[must_use]
    pub fn new() -> Self {
        Self(HashMap::new())
    }

    /// Insert a score for an attribute.
    pub fn insert(&mut self, attribute: impl Into<String>, score: f64) {
        self.0.insert(attribute.into(), score);
    }

    /// Get the score for an attribute, if present.
    #[must_use]
    pub fn get(&self, attribute: &str) -> Option<f64> {
        self.0.get(attribute).copied()
    }

    /// Whether the map contains the named attribute.
    #[must_use]
    pub fn contains(&self, attribute: &str) -> bool {
        self.0.contains_key(attribute)
    }

    /// The highest score among all attributes except the named one.
    ///
    /// Returns `None` when no other attribute is present.
    #[must_use]
    pub fn max_excluding(&self, excluded: &str) -> Option<f64> {
        self.0
            .iter()
            .filter(|(name, _)| name.as_str() != excluded)
            .map(|(_, score)| *score)
            .fold(None, |acc, s| Some(acc.map_or(s, |m: f64| m.max(s))))
    }

    /// Number of attributes in the map.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the map is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Pretty-printed JSON of the full breakdown, sorted by attribute name.
    #[must_use]
    pub fn to_pretty_json(&self) -> String {
        let sorted: std::collections::BTreeMap<&str, f64> =
            self.0.iter().map(|(k, v)| (k.as_str(), *v)).collect();
        serde_json::to_string_pretty(&sorted).unwrap_or_else(|_| "{}".to_string())
    }
}

impl FromIterator<(String, f64)> for AttributeScores {
    fn from_iter<I: IntoIterator<Item = (String, f64)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn sample() -> AttributeScores {
        let mut scores = AttributeScores::new();
        scores.insert(attributes::TOXICITY, 0.9);
        scores.insert(attributes::THREAT, 0.2);
        scores.insert(attributes::FLIRTATION, 0.1);
        scores
    }

    #[test]
    fn test_get_and_contains() {
        let scores = sample();
        assert_eq!(scores.get(attributes::TOXICITY), Some(0.9));
        assert_eq!(scores.get(attributes::PROFANITY), None);
        assert!(scores.contains(attributes::FLIRTATION));
    }

    #[test]
    fn test_max_excluding_skips_named_attribute() {
        let scores = sample();
        assert_eq!(scores.max_excluding(attributes::FLIRTATION), Some(0.9));

        let mut only_flirt = AttributeScores::new();
        only_flirt.insert(attributes::FLIRTATION, 0.99);
        assert_eq!(only_flirt.max_excluding(attributes::FLIRTATION), None);
    }

    #[test]
    fn test_pretty_json_is_sorted() {
        let scores = sample();
        let json = scores.to_pretty_json();
        let flirt = json.find("FLIRTATION").unwrap();
        let tox = json.find("TOXICITY").unwrap();
        assert!(flirt < tox);
    }
}
