//! Link extraction for parsed pages
//!
//! **Include:** `<a href="...">` anywhere in the document, `rel="nofollow"` included
//!
//! **Exclude:**
//! - `<a href="..." download>`
//! - `javascript:`, `mailto:`, `tel:` links and data URIs
//! - Fragment-only links
//! - Anything that is not HTTP(S) after resolution

use crate::document::StructuredDocument;
use crate::url::resolve_link;
use std::collections::HashSet;
use url::Url;

/// Extracts the normalized, absolute links of a page in document order
///
/// Each link appears once even if the page repeats it.
///
/// # Example
///
/// ```
/// use recipe_ripple::crawler::extract_links;
/// use recipe_ripple::document::HtmlDocument;
/// use url::Url;
///
/// let html = r#"<a href="/pie#top">Pie</a><a href="mailto:chef@example.com">Mail</a>"#;
/// let base = Url::parse("https://example.com/recipes/").unwrap();
/// let links = extract_links(&HtmlDocument::parse(html), &base);
/// assert_eq!(links.len(), 1);
/// assert_eq!(links[0].as_str(), "https://example.com/pie");
/// ```
pub fn extract_links(document: &dyn StructuredDocument, base_url: &Url) -> Vec<Url> {
    let mut seen = HashSet::new();

    document
        .anchors()
        .into_iter()
        .filter(|anchor| !anchor.download)
        .filter_map(|anchor| anchor.href)
        .filter_map(|href| resolve_link(&href, base_url))
        .filter(|url| seen.insert(url.as_str().to_string()))
        .collect()
}
