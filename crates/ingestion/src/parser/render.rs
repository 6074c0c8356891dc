//! Text rendering
//!
//! Turns the mixed content of `Text` elements into display strings:
//! whitespace runs collapse to single spaces and internal cross-references
//! are rewritten as navigable anchors. The anchor target is the referenced
//! section label, taken from the reference's `link` attribute when present
//! and otherwise scraped from the reference text.

use crate::dom::{Element, Node};
use regex_lite::Regex;
use std::sync::OnceLock;

/// Section-label pattern inside reference text, e.g. "section 5",
/// "subsection 12(1)", "paragraph 3(1)(a)"
fn label_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"(\d+(?:\.\d+)*(?:\([0-9a-zA-Z.]+\))*)").expect("valid pattern")
    })
}

/// Extract the target section label from reference text
pub fn scrape_label(text: &str) -> Option<String> {
    label_pattern()
        .find(text)
        .map(|m| m.as_str().to_string())
}

/// Target label of a cross-reference element
pub fn xref_target(xref: &Element) -> Option<String> {
    if let Some(link) = xref.attr("link") {
        return Some(link.to_string());
    }
    scrape_label(&xref.text())
}

/// Render an element's content with cross-references as anchors.
pub fn render(element: &Element) -> String {
    let mut out = String::new();
    render_into(element, &mut out);
    normalize(&out)
}

/// Render an element's content, skipping the named child elements.
///
/// Used for section bodies, where structural children (labels, marginal
/// notes, nested numbered units) render as their own sections.
pub fn render_excluding(element: &Element, skip: &[&str]) -> String {
    let mut out = String::new();
    for child in &element.children {
        match child {
            Node::Text(t) => out.push_str(t),
            Node::Element(e) if skip.contains(&e.name.as_str()) => {}
            Node::Element(e) => {
                render_element_into(e, &mut out);
                out.push(' ');
            }
        }
    }
    normalize(&out)
}

fn render_into(element: &Element, out: &mut String) {
    for child in &element.children {
        match child {
            Node::Text(t) => out.push_str(t),
            Node::Element(e) => {
                render_element_into(e, out);
                out.push(' ');
            }
        }
    }
}

fn render_element_into(element: &Element, out: &mut String) {
    if element.name == "XRefInternal" {
        let text = element.text();
        match xref_target(element) {
            Some(target) => {
                out.push_str(&format!(r##"<a href="#section-{}">{}</a>"##, target, text));
            }
            None => out.push_str(&text),
        }
    } else {
        render_into(element, out);
    }
}

/// Collapse whitespace runs to single spaces and trim, keeping anchor
/// markup intact
fn normalize(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::parse_tree;

    #[test]
    fn test_scrape_label_variants() {
        assert_eq!(scrape_label("section 5").as_deref(), Some("5"));
        assert_eq!(scrape_label("subsection 12(1)").as_deref(), Some("12(1)"));
        assert_eq!(scrape_label("paragraph 3(1)(a)").as_deref(), Some("3(1)(a)"));
        assert_eq!(scrape_label("l'article 4.1").as_deref(), Some("4.1"));
        assert_eq!(scrape_label("the Act"), None);
    }

    #[test]
    fn test_xref_link_attribute_wins() {
        let el = parse_tree(r#"<XRefInternal link="7">section 5</XRefInternal>"#).unwrap();
        assert_eq!(xref_target(&el).as_deref(), Some("7"));
    }

    #[test]
    fn test_render_rewrites_xrefs_as_anchors() {
        let el = parse_tree(
            "<Text>subject to <XRefInternal>section 5</XRefInternal>, every one</Text>",
        )
        .unwrap();
        assert_eq!(
            render(&el),
            r##"subject to <a href="#section-5">section 5</a> , every one"##
        );
    }

    #[test]
    fn test_render_normalizes_whitespace() {
        let el = parse_tree("<Text>  every   one\n\tcommits  </Text>").unwrap();
        assert_eq!(render(&el), "every one commits");
    }
}
