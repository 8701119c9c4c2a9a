//! Helpers shared by the HTML-scraping engines

use scraper::{ElementRef, Selector};

/// Compile a constant CSS selector
pub(crate) fn css(selector: &str) -> Selector {
    Selector::parse(selector).unwrap_or_else(|e| panic!("invalid selector {}: {:?}", selector, e))
}

/// All text under every match of `selector`, each text node trimmed and
/// joined with a space
pub(crate) fn text(element: ElementRef<'_>, selector: &Selector) -> String {
    element
        .select(selector)
        .flat_map(|e| e.text())
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Same as [`text`] but for the last match only
pub(crate) fn last_text(element: ElementRef<'_>, selector: &Selector) -> String {
    element
        .select(selector)
        .last()
        .map(own_text)
        .unwrap_or_default()
}

/// Attribute of the first match of `selector`
pub(crate) fn attr(element: ElementRef<'_>, selector: &Selector, name: &str) -> String {
    element
        .select(selector)
        .find_map(|e| e.value().attr(name))
        .unwrap_or_default()
        .to_string()
}

/// Direct children with the given tag name
pub(crate) fn children<'a>(
    element: ElementRef<'a>,
    tag: &'a str,
) -> impl Iterator<Item = ElementRef<'a>> + 'a {
    element
        .children()
        .filter_map(ElementRef::wrap)
        .filter(move |child| child.value().name() == tag)
}

/// Attribute of the first direct child with the given tag
pub(crate) fn child_attr(element: ElementRef<'_>, tag: &str, name: &str) -> String {
    children(element, tag)
        .find_map(|c| c.value().attr(name))
        .unwrap_or_default()
        .to_string()
}

/// Text of an element, text nodes trimmed and joined with a space
pub(crate) fn own_text(element: ElementRef<'_>) -> String {
    element
        .text()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}
