use crate::document::PageDocument;
use crate::scoring::{MatchScore, SearchQuery};
use crate::text::{normalize, TfidfVectorizer};

/// Scores a page against a query
///
/// Missing query fields degrade the affected component to zero instead of
/// failing the call. The vectorizer is fit freshly for every comparison.
///
/// # Example
///
/// ```
/// use recipe_ripple::document::PageDocument;
/// use recipe_ripple::scoring::{score, SearchQuery};
/// use url::Url;
///
/// let url = Url::parse("https://example.com/cookies").unwrap();
/// let page = PageDocument::parse(url, "<h1>Best Chocolate Chip Cookies</h1>").unwrap();
/// let query = SearchQuery::new("chocolate chip cookies", vec![]);
/// assert_eq!(score(&page, &query).title_match, 1.0);
/// ```
pub fn score(document: &PageDocument, query: &SearchQuery) -> MatchScore {
    let vectorizer = TfidfVectorizer::default();

    let title = title_match(&vectorizer, &query.title, document.title());
    let ingredients = ingredients_match(&query.ingredients, document.ingredients());
    let content = content_match(&vectorizer, query, document.main_content());

    tracing::trace!(
        "Scored {}: title={:.3} ingredients={:.3} content={:.3}",
        document.url(),
        title,
        ingredients,
        content
    );

    MatchScore::from_components(title, ingredients, content)
}

/// 1.0 when the normalized query title is contained in the page title,
/// otherwise the TF-IDF cosine similarity of the two titles
pub fn title_match(vectorizer: &TfidfVectorizer, query_title: &str, page_title: &str) -> f64 {
    let query_title = normalize(query_title);
    let page_title = normalize(page_title);

    if query_title.is_empty() || page_title.is_empty() {
        return 0.0;
    }

    if page_title.contains(&query_title) {
        return 1.0;
    }

    vectorizer.similarity(&query_title, &page_title)
}

/// Fraction of query ingredients found inside at least one page ingredient entry
pub fn ingredients_match(query_ingredients: &[String], page_ingredients: &[String]) -> f64 {
    if query_ingredients.is_empty() {
        return 0.0;
    }

    let page_ingredients: Vec<String> = page_ingredients.iter().map(|i| normalize(i)).collect();

    let found = query_ingredients
        .iter()
        .map(|ingredient| normalize(ingredient))
        // An ingredient that normalizes to nothing never counts as found,
        // although it still counts in the denominator
        .filter(|ingredient| !ingredient.is_empty())
        .filter(|ingredient| page_ingredients.iter().any(|entry| entry.contains(ingredient.as_str())))
        .count();

    found as f64 / query_ingredients.len() as f64
}

/// TF-IDF cosine similarity between the whole query and the page's main content
pub fn content_match(vectorizer: &TfidfVectorizer, query: &SearchQuery, main_content: &str) -> f64 {
    let query_terms = std::iter::once(query.title.as_str())
        .chain(query.ingredients.iter().map(String::as_str))
        .map(normalize)
        .filter(|term| !term.is_empty())
        .collect::<Vec<_>>()
        .join(" ");

    let main_content = normalize(main_content);

    if query_terms.is_empty() || main_content.is_empty() {
        return 0.0;
    }

    vectorizer.similarity(&query_terms, &main_content)
}
