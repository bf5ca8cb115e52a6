/// Verbs that show up in recipe instructions
pub const COOKING_VERBS: &[&str] = &[
    "bake", "boil", "broil", "chop", "cook", "dice", "fry", "grate", "grill", "mince", "mix",
    "peel", "roast", "simmer", "slice", "stir", "whisk",
];

/// Units of measure
pub const MEASUREMENT_TERMS: &[&str] = &[
    "cup", "tablespoon", "teaspoon", "gram", "ounce", "pound", "ml", "g", "kg", "oz", "lb",
    "pinch", "dash",
];

/// Nutrition facts vocabulary
pub const NUTRITION_TERMS: &[&str] = &[
    "calories",
    "protein",
    "fat",
    "carbohydrates",
    "fiber",
    "sugar",
    "sodium",
];

/// Sums non-overlapping substring occurrences of every lexicon term in `text`
///
/// Matching is plain substring matching, so "g" also counts inside "grill".
pub fn count_occurrences(text: &str, lexicon: &[&str]) -> u64 {
    lexicon
        .iter()
        .map(|term| text.matches(term).count() as u64)
        .sum()
}
