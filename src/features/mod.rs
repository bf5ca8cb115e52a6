//! Feature extraction module
//!
//! Turns a parsed page into the fixed 19-column numeric summary consumed by the
//! recipe classifier and persisted as training rows.
//!
//! # Example
//!
//! ```
//! use recipe_ripple::document::PageDocument;
//! use recipe_ripple::features::{extract_features, FeatureVector};
//! use url::Url;
//!
//! let url = Url::parse("https://example.com/soup").unwrap();
//! let page = PageDocument::parse(url, "<p>Simmer for 20 minutes.</p>").unwrap();
//! let features = extract_features(&page);
//! assert_eq!(features.time_mentions, 1);
//! assert_eq!(features.to_row().len(), FeatureVector::COLUMNS.len());
//! ```

mod extractor;
pub mod lexicon;

pub use extractor::extract_features;

use serde::Serialize;

/// Number of feature columns
pub const FEATURE_COUNT: usize = 19;

/// Fixed-schema feature vector for one page
///
/// Field order matches [`FeatureVector::COLUMNS`] and must not change: the
/// classifier artifact is trained against exactly this column order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeatureVector {
    pub url: String,
    pub cooking_verb_count: u64,
    pub measurement_term_count: u64,
    pub nutrition_term_count: u64,
    pub number_count: u64,
    pub time_mentions: u64,
    pub temperature_mentions: u64,
    pub list_count: u64,
    pub image_count: u64,
    pub total_text_length: u64,
    pub has_schema_recipe: u8,
    pub recipe_class_indicators: u64,
    pub list_text_ratio: f64,
    pub has_print_button: u8,
    pub has_servings: u8,
    pub title_contains_recipe: u8,
    pub meta_description_contains_recipe: u8,
    pub category_mentions: u64,
    pub link_to_text_ratio: f64,
    pub url_is_generic: u8,
}

impl FeatureVector {
    /// Column names in classifier order (the `url` key is not a column)
    pub const COLUMNS: [&'static str; FEATURE_COUNT] = [
        "cooking_verb_count",
        "measurement_term_count",
        "nutrition_term_count",
        "number_count",
        "time_mentions",
        "temperature_mentions",
        "list_count",
        "image_count",
        "total_text_length",
        "has_schema_recipe",
        "recipe_class_indicators",
        "list_text_ratio",
        "has_print_button",
        "has_servings",
        "title_contains_recipe",
        "meta_description_contains_recipe",
        "category_mentions",
        "link_to_text_ratio",
        "url_is_generic",
    ];

    /// Shapes the vector into a numeric row in [`FeatureVector::COLUMNS`] order
    pub fn to_row(&self) -> [f64; FEATURE_COUNT] {
        [
            self.cooking_verb_count as f64,
            self.measurement_term_count as f64,
            self.nutrition_term_count as f64,
            self.number_count as f64,
            self.time_mentions as f64,
            self.temperature_mentions as f64,
            self.list_count as f64,
            self.image_count as f64,
            self.total_text_length as f64,
            f64::from(self.has_schema_recipe),
            self.recipe_class_indicators as f64,
            self.list_text_ratio,
            f64::from(self.has_print_button),
            f64::from(self.has_servings),
            f64::from(self.title_contains_recipe),
            f64::from(self.meta_description_contains_recipe),
            self.category_mentions as f64,
            self.link_to_text_ratio,
            f64::from(self.url_is_generic),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_columns_are_unique() {
        let mut names = FeatureVector::COLUMNS.to_vec();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), FEATURE_COUNT);
    }

    #[test]
    fn test_row_follows_column_order() {
        let vector = FeatureVector {
            url: "https://example.com/".to_string(),
            cooking_verb_count: 1,
            measurement_term_count: 2,
            nutrition_term_count: 3,
            number_count: 4,
            time_mentions: 5,
            temperature_mentions: 6,
            list_count: 7,
            image_count: 8,
            total_text_length: 9,
            has_schema_recipe: 1,
            recipe_class_indicators: 11,
            list_text_ratio: 0.12,
            has_print_button: 0,
            has_servings: 1,
            title_contains_recipe: 0,
            meta_description_contains_recipe: 1,
            category_mentions: 17,
            link_to_text_ratio: 0.18,
            url_is_generic: 1,
        };

        let row = vector.to_row();
        assert_eq!(row[0], 1.0);
        assert_eq!(row[8], 9.0);
        assert_eq!(row[11], 0.12);
        assert_eq!(row[16], 17.0);
        assert_eq!(row[17], 0.18);
        assert_eq!(row[18], 1.0);
    }
}
