//! Relevance scoring module
//!
//! Scores a parsed page against a structured recipe query. The final score is
//! a fixed weighted sum of three components, each in `[0, 1]`:
//! - title match (exact substring, else TF-IDF cosine)
//! - ingredient overlap
//! - TF-IDF similarity between the query and the page's main content

mod matcher;

pub use matcher::{content_match, ingredients_match, score, title_match};

use serde::{Deserialize, Serialize};

/// Weight of the title component
pub const TITLE_WEIGHT: f64 = 0.3;

/// Weight of the ingredients component
pub const INGREDIENTS_WEIGHT: f64 = 0.4;

/// Weight of the content component
pub const CONTENT_WEIGHT: f64 = 0.3;

/// Default acceptance threshold for the final score
pub const DEFAULT_THRESHOLD: f64 = 0.4;

/// A structured recipe query
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchQuery {
    /// Target recipe title
    #[serde(default)]
    pub title: String,

    /// Ingredients the recipe should use
    #[serde(default)]
    pub ingredients: Vec<String>,
}

impl SearchQuery {
    /// Creates a query from a title and a list of ingredients
    pub fn new(title: impl Into<String>, ingredients: Vec<String>) -> Self {
        Self {
            title: title.into(),
            ingredients,
        }
    }
}

/// Per-component and final relevance score
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MatchScore {
    pub title_match: f64,
    pub ingredients_match: f64,
    pub content_match: f64,
    #[serde(rename = "final")]
    pub final_score: f64,
}

impl MatchScore {
    /// Combines the three components with the fixed weights
    ///
    /// Components are clamped to `[0, 1]` first.
    pub fn from_components(title_match: f64, ingredients_match: f64, content_match: f64) -> Self {
        let title_match = clamp_unit(title_match);
        let ingredients_match = clamp_unit(ingredients_match);
        let content_match = clamp_unit(content_match);

        let final_score = TITLE_WEIGHT * title_match
            + INGREDIENTS_WEIGHT * ingredients_match
            + CONTENT_WEIGHT * content_match;

        Self {
            title_match,
            ingredients_match,
            content_match,
            final_score: clamp_unit(final_score),
        }
    }

    /// Returns true if the final score reaches `threshold`
    pub fn matches(&self, threshold: f64) -> bool {
        self.final_score >= threshold
    }
}

fn clamp_unit(value: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_weights_sum_to_one() {
        assert!((TITLE_WEIGHT + INGREDIENTS_WEIGHT + CONTENT_WEIGHT - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_final_is_weighted_sum() {
        let score = MatchScore::from_components(1.0, 0.5, 0.25);
        let expected = 0.3 * 1.0 + 0.4 * 0.5 + 0.3 * 0.25;
        assert!((score.final_score - expected).abs() < 1e-12);
    }

    #[test]
    fn test_components_are_clamped() {
        let score = MatchScore::from_components(1.0000001, -0.1, f64::NAN);
        assert_eq!(score.title_match, 1.0);
        assert_eq!(score.ingredients_match, 0.0);
        assert_eq!(score.content_match, 0.0);
        assert!((score.final_score - 0.3).abs() < 1e-12);
    }

    #[test]
    fn test_matches_threshold() {
        let score = MatchScore::from_components(1.0, 1.0, 0.0);
        assert!(score.matches(DEFAULT_THRESHOLD));
        assert!(score.matches(0.7));
        assert!(!score.matches(0.71));
    }

    #[test]
    fn test_serializes_final_field() {
        let score = MatchScore::from_components(0.0, 0.0, 0.0);
        let json = serde_json::to_value(score).unwrap();
        assert!(json.get("final").is_some());
        assert!(json.get("title_match").is_some());
    }
}
