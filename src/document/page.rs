//! Per-URL page view consumed by feature extraction and scoring

use crate::document::{HtmlDocument, StructuredDocument};
use crate::text::normalize;
use crate::RippleError;
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashSet;
use url::Url;

static INGREDIENT_CONTAINER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)ingredient").expect("ingredient pattern is valid"));

static MAIN_CONTENT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)(content|recipe)").expect("content pattern is valid"));

const INGREDIENT_ITEM_TAGS: &[&str] = &["li", "p", "span"];
const MAIN_CONTENT_TAGS: &[&str] = &["article", "main", "div"];

/// A fetched and parsed page
///
/// Built once per URL and never mutated afterwards.
pub struct PageDocument {
    url: Url,
    dom: Box<dyn StructuredDocument>,
    text: String,
    page_title: Option<String>,
    title: String,
    ingredients: Vec<String>,
    main_content: String,
}

impl PageDocument {
    /// Parses a response body into a page document
    ///
    /// # Returns
    ///
    /// * `Ok(PageDocument)` - Successfully parsed page
    /// * `Err(RippleError::Parse)` - The body has no content to parse
    ///
    /// # Example
    ///
    /// ```
    /// use recipe_ripple::document::PageDocument;
    /// use url::Url;
    ///
    /// let url = Url::parse("https://example.com/pie").unwrap();
    /// let page = PageDocument::parse(url, "<h1>Apple Pie!</h1>").unwrap();
    /// assert_eq!(page.title(), "apple pie");
    /// ```
    pub fn parse(url: Url, body: &str) -> Result<Self, RippleError> {
        if body.trim().is_empty() {
            return Err(RippleError::Parse {
                url: url.to_string(),
                message: "empty response body".to_string(),
            });
        }

        Ok(Self::from_structured(url, Box::new(HtmlDocument::parse(body))))
    }

    /// Builds a page document from any structured document implementation
    pub fn from_structured(url: Url, dom: Box<dyn StructuredDocument>) -> Self {
        let text = dom.text();
        let page_title = dom.title();
        let title = extract_recipe_title(dom.as_ref());
        let ingredients = extract_ingredients(dom.as_ref());
        let main_content = extract_main_content(dom.as_ref());

        Self {
            url,
            dom,
            text,
            page_title,
            title,
            ingredients,
            main_content,
        }
    }

    /// The URL this page was fetched from
    pub fn url(&self) -> &Url {
        &self.url
    }

    /// Underlying DOM queries
    pub fn dom(&self) -> &dyn StructuredDocument {
        self.dom.as_ref()
    }

    /// Full visible text, original case
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Raw `<title>` text, if any
    pub fn page_title(&self) -> Option<&str> {
        self.page_title.as_deref()
    }

    /// Normalized recipe title (h1, then og:title, then meta title, then `<title>`)
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Normalized, de-duplicated ingredient entries in document order
    pub fn ingredients(&self) -> &[String] {
        &self.ingredients
    }

    /// Normalized text of the main content blocks
    pub fn main_content(&self) -> &str {
        &self.main_content
    }

    /// Number of whitespace-separated words in the visible text
    pub fn word_count(&self) -> usize {
        self.text.split_whitespace().count()
    }

    /// Number of anchor elements on the page
    pub fn anchor_count(&self) -> usize {
        self.dom.anchors().len()
    }

    /// Ratio of anchors to words; a page with no words counts its anchors against one word
    pub fn anchor_to_word_ratio(&self) -> f64 {
        self.anchor_count() as f64 / self.word_count().max(1) as f64
    }
}

/// Picks the first non-empty title candidate
fn extract_recipe_title(dom: &dyn StructuredDocument) -> String {
    let metas = dom.find_by_tag(&["meta"]);
    let meta_content = |key: &str, value: &str| {
        metas
            .iter()
            .find(|m| m.attr(key) == Some(value))
            .and_then(|m| m.attr("content"))
            .map(str::to_string)
    };

    let candidates = [
        dom.find_by_tag(&["h1"]).into_iter().next().map(|h| h.text),
        meta_content("property", "og:title"),
        meta_content("name", "title"),
        dom.title(),
    ];

    candidates
        .into_iter()
        .flatten()
        .map(|candidate| normalize(&candidate))
        .find(|cleaned| !cleaned.is_empty())
        .unwrap_or_default()
}

fn extract_ingredients(dom: &dyn StructuredDocument) -> Vec<String> {
    let mut seen = HashSet::new();

    dom.find_within(&INGREDIENT_CONTAINER, INGREDIENT_ITEM_TAGS)
        .into_iter()
        .map(|item| normalize(&item.text))
        .filter(|cleaned| !cleaned.is_empty())
        .filter(|cleaned| seen.insert(cleaned.clone()))
        .collect()
}

fn extract_main_content(dom: &dyn StructuredDocument) -> String {
    dom.find_by_class_or_id(&MAIN_CONTENT, Some(MAIN_CONTENT_TAGS))
        .into_iter()
        .filter(|section| section.attr("class").map_or(false, |c| MAIN_CONTENT.is_match(c)))
        .map(|section| normalize(&section.text))
        .filter(|cleaned| !cleaned.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}
