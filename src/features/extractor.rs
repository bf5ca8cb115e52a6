use crate::document::PageDocument;
use crate::features::lexicon::{
    count_occurrences, COOKING_VERBS, MEASUREMENT_TERMS, NUTRITION_TERMS,
};
use crate::features::FeatureVector;
use once_cell::sync::Lazy;
use regex::Regex;

static NUMBER: Lazy<Regex> = Lazy::new(|| Regex::new(r"\d+(?:\.\d+)?").expect("valid pattern"));

static TIME: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\d+\s*(?:minute|hour|min|hr)").expect("valid pattern"));

static TEMPERATURE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\d+\s*(?:degrees?|°|fahrenheit|celsius|f\b|c\b)").expect("valid pattern")
});

static RECIPE_CLASS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"recipe|ingredient|instruction|method|direction").expect("valid pattern")
});

static PRINT_OR_SAVE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)print|save").expect("valid pattern"));

static SERVINGS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"serves?|servings?|yield").expect("valid pattern"));

static CATEGORY: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"dessert|appetizer|main course|breakfast|dinner").expect("valid pattern")
});

fn flag(value: bool) -> u8 {
    u8::from(value)
}

/// Extracts the feature vector of a parsed page
///
/// Deterministic and total: every ratio guards its denominator, so a page with
/// no text yields zeros rather than an error.
pub fn extract_features(document: &PageDocument) -> FeatureVector {
    let dom = document.dom();
    let text = document.text().to_lowercase();
    let total_text_length = text.chars().count() as u64;

    let list_items_text = dom
        .find_by_tag(&["li"])
        .iter()
        .map(|li| li.text.trim().to_string())
        .collect::<Vec<_>>()
        .join(" ");

    let anchors = dom.anchors();
    let anchors_with_href = anchors.iter().filter(|a| a.href.is_some()).count();

    let meta_description_contains_recipe = dom
        .find_by_tag(&["meta"])
        .iter()
        .filter(|meta| meta.attr("name").map_or(false, |n| n.eq_ignore_ascii_case("description")))
        .filter_map(|meta| meta.attr("content"))
        .next()
        .map_or(false, |content| content.to_lowercase().contains("recipe"));

    let has_schema_recipe = dom
        .find_by_tag(&["script"])
        .iter()
        .any(|script| script.attr("type") == Some("application/ld+json"));

    let class_and_ids = dom.class_and_id_values().join(" ").to_lowercase();

    FeatureVector {
        url: document.url().to_string(),
        cooking_verb_count: count_occurrences(&text, COOKING_VERBS),
        measurement_term_count: count_occurrences(&text, MEASUREMENT_TERMS),
        nutrition_term_count: count_occurrences(&text, NUTRITION_TERMS),
        number_count: NUMBER.find_iter(&text).count() as u64,
        time_mentions: TIME.find_iter(&text).count() as u64,
        temperature_mentions: TEMPERATURE.find_iter(&text).count() as u64,
        list_count: dom.find_by_tag(&["ul", "ol"]).len() as u64,
        image_count: dom.find_by_tag(&["img"]).len() as u64,
        total_text_length,
        has_schema_recipe: flag(has_schema_recipe),
        recipe_class_indicators: RECIPE_CLASS.find_iter(&class_and_ids).count() as u64,
        list_text_ratio: list_items_text.chars().count() as f64
            / total_text_length.max(1) as f64,
        has_print_button: flag(anchors.iter().any(|a| PRINT_OR_SAVE.is_match(&a.text))),
        has_servings: flag(SERVINGS.is_match(&text)),
        title_contains_recipe: flag(
            document
                .page_title()
                .map_or(false, |t| t.to_lowercase().contains("recipe")),
        ),
        meta_description_contains_recipe: flag(meta_description_contains_recipe),
        category_mentions: CATEGORY.find_iter(&text).count() as u64,
        link_to_text_ratio: anchors_with_href as f64 / (total_text_length + 1) as f64,
        url_is_generic: flag(is_generic_path(document.url().path())),
    }
}

/// Hub pages: home pages, category listings, and recipe index pages
fn is_generic_path(path: &str) -> bool {
    let lowered = path.to_lowercase();
    lowered.contains("/home")
        || lowered.contains("/categories")
        || lowered.trim_end_matches('/').ends_with("/recipes")
}
