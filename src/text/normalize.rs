use once_cell::sync::Lazy;
use regex::Regex;

/// Anything that is neither a word character nor whitespace
static NON_WORD: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^\w\s]").expect("non-word pattern is valid"));

/// Normalizes free text for matching
///
/// # Normalization Steps
///
/// 1. Lowercase the input
/// 2. Replace every character that is not alphanumeric or whitespace with a space
/// 3. Collapse whitespace runs to a single space and trim both ends
///
/// Empty input yields an empty string. The function is idempotent.
///
/// # Examples
///
/// ```
/// use recipe_ripple::text::normalize;
///
/// assert_eq!(normalize("  Best Chocolate-Chip  Cookies!! "), "best chocolate chip cookies");
/// assert_eq!(normalize(""), "");
/// ```
pub fn normalize(text: &str) -> String {
    if text.is_empty() {
        return String::new();
    }

    let lowered = text.to_lowercase();
    let replaced = NON_WORD.replace_all(&lowered, " ");

    replaced.split_whitespace().collect::<Vec<_>>().join(" ")
}
