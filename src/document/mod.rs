//! Document module for parsed pages
//!
//! This module wraps the HTML parser behind a small capability interface so the
//! feature extractor and the relevance scorer never touch DOM internals:
//! - `StructuredDocument`: tag, class/id and anchor queries over a parsed page
//! - `HtmlDocument`: the scraper-backed implementation
//! - `PageDocument`: the per-URL view (text, titles, ingredients, main content)

mod html;
mod page;

pub use html::HtmlDocument;
pub use page::PageDocument;

use regex::Regex;

/// Snapshot of a single DOM element
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    /// Lowercase tag name
    pub tag: String,

    /// Attribute name/value pairs in document order
    pub attributes: Vec<(String, String)>,

    /// Concatenated text of all descendant text nodes, untrimmed
    pub text: String,
}

impl Element {
    /// Looks up an attribute value by (case-sensitive) name
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }
}

/// An anchor element and its link target
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Anchor {
    /// Raw href attribute, if present
    pub href: Option<String>,

    /// Anchor text, trimmed
    pub text: String,

    /// True if the anchor carries a `download` attribute
    pub download: bool,
}

/// Capability interface over a parsed page
///
/// Implemented by the parse layer. Query results are owned snapshots so
/// callers never hold references into the parser's tree.
pub trait StructuredDocument {
    /// Visible text: every text node outside script/style, trimmed and joined by single spaces
    fn text(&self) -> String;

    /// Text of the `<title>` element, trimmed; `None` when missing or empty
    fn title(&self) -> Option<String>;

    /// All elements whose tag is one of `tags`
    fn find_by_tag(&self, tags: &[&str]) -> Vec<Element>;

    /// Elements whose `class` or `id` attribute matches `pattern`,
    /// optionally restricted to `tags`
    fn find_by_class_or_id(&self, pattern: &Regex, tags: Option<&[&str]>) -> Vec<Element>;

    /// Descendants with one of `item_tags` inside every element whose
    /// `class` or `id` matches `container_pattern`
    fn find_within(&self, container_pattern: &Regex, item_tags: &[&str]) -> Vec<Element>;

    /// All anchor (`<a>`) elements
    fn anchors(&self) -> Vec<Anchor>;

    /// Every `class` and `id` attribute value in the document, in document order
    fn class_and_id_values(&self) -> Vec<String>;
}
