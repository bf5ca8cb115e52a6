//! scraper-backed structured document

use crate::document::{Anchor, Element, StructuredDocument};
use regex::Regex;
use scraper::{ElementRef, Html, Selector};

/// Elements whose text is never rendered
const HIDDEN_TAGS: &[&str] = &["script", "style", "noscript", "template"];

/// A parsed HTML page
pub struct HtmlDocument {
    html: Html,
}

impl HtmlDocument {
    /// Parses an HTML document
    ///
    /// html5ever recovers from any malformed markup, so parsing itself cannot fail.
    ///
    /// # Example
    ///
    /// ```
    /// use recipe_ripple::document::{HtmlDocument, StructuredDocument};
    ///
    /// let doc = HtmlDocument::parse("<html><head><title> Pie </title></head></html>");
    /// assert_eq!(doc.title(), Some("Pie".to_string()));
    /// ```
    pub fn parse(html: &str) -> Self {
        Self {
            html: Html::parse_document(html),
        }
    }

    fn all_elements(&self) -> impl Iterator<Item = ElementRef<'_>> {
        self.html
            .root_element()
            .descendants()
            .filter_map(ElementRef::wrap)
    }
}

fn snapshot(element: ElementRef<'_>) -> Element {
    let value = element.value();
    Element {
        tag: value.name().to_string(),
        attributes: value
            .attrs()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect(),
        text: element.text().collect::<String>(),
    }
}

fn class_or_id_matches(element: &ElementRef<'_>, pattern: &Regex) -> bool {
    let value = element.value();
    value.attr("class").map_or(false, |c| pattern.is_match(c))
        || value.attr("id").map_or(false, |i| pattern.is_match(i))
}

fn tag_selector(tags: &[&str]) -> Option<Selector> {
    if tags.is_empty() {
        return None;
    }
    Selector::parse(&tags.join(", ")).ok()
}

impl StructuredDocument for HtmlDocument {
    fn text(&self) -> String {
        let mut parts = Vec::new();

        for node in self.html.root_element().descendants() {
            let Some(text) = node.value().as_text() else {
                continue;
            };

            let hidden = node.ancestors().any(|ancestor| {
                ancestor
                    .value()
                    .as_element()
                    .map_or(false, |e| HIDDEN_TAGS.contains(&e.name()))
            });
            if hidden {
                continue;
            }

            let trimmed = text.trim();
            if !trimmed.is_empty() {
                parts.push(trimmed);
            }
        }

        parts.join(" ")
    }

    fn title(&self) -> Option<String> {
        let title_selector = Selector::parse("title").ok()?;

        self.html
            .select(&title_selector)
            .next()
            .map(|element| element.text().collect::<String>().trim().to_string())
            .filter(|s| !s.is_empty())
    }

    fn find_by_tag(&self, tags: &[&str]) -> Vec<Element> {
        match tag_selector(tags) {
            Some(selector) => self.html.select(&selector).map(snapshot).collect(),
            None => Vec::new(),
        }
    }

    fn find_by_class_or_id(&self, pattern: &Regex, tags: Option<&[&str]>) -> Vec<Element> {
        self.all_elements()
            .filter(|element| match tags {
                Some(tags) => tags.contains(&element.value().name()),
                None => true,
            })
            .filter(|element| class_or_id_matches(element, pattern))
            .map(snapshot)
            .collect()
    }

    fn find_within(&self, container_pattern: &Regex, item_tags: &[&str]) -> Vec<Element> {
        let Some(item_selector) = tag_selector(item_tags) else {
            return Vec::new();
        };

        self.all_elements()
            .filter(|element| class_or_id_matches(element, container_pattern))
            .flat_map(|container| container.select(&item_selector).map(snapshot).collect::<Vec<_>>())
            .collect()
    }

    fn anchors(&self) -> Vec<Anchor> {
        let Ok(selector) = Selector::parse("a") else {
            return Vec::new();
        };

        self.html
            .select(&selector)
            .map(|element| Anchor {
                href: element.value().attr("href").map(str::to_string),
                text: element.text().collect::<String>().trim().to_string(),
                download: element.value().attr("download").is_some(),
            })
            .collect()
    }

    fn class_and_id_values(&self) -> Vec<String> {
        let mut values = Vec::new();
        for element in self.all_elements() {
            if let Some(class) = element.value().attr("class") {
                values.push(class.to_string());
            }
            if let Some(id) = element.value().attr("id") {
                values.push(id.to_string());
            }
        }
        values
    }
}
