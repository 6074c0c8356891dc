//! Owned XML element tree
//!
//! The legislative markup is small enough per document to hold in memory,
//! and the parser needs ancestor context (schedules, Parts) that a pure
//! streaming walk makes awkward. This module reads quick-xml events into a
//! plain element tree that the parser then descends recursively.

use lexforge_common::errors::{AppError, Result};
use quick_xml::events::Event;
use quick_xml::Reader;

/// An element node with its attributes and ordered children
#[derive(Debug, Clone)]
pub struct Element {
    pub name: String,
    /// Attribute name/value pairs, source order, prefixes kept verbatim
    /// (e.g. `lims:fid`)
    pub attributes: Vec<(String, String)>,
    pub children: Vec<Node>,
}

/// A child of an element
#[derive(Debug, Clone)]
pub enum Node {
    Element(Element),
    Text(String),
}

impl Element {
    fn new(name: String, attributes: Vec<(String, String)>) -> Self {
        Self {
            name,
            attributes,
            children: Vec::new(),
        }
    }

    /// Value of an attribute, if present
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    /// First child element with the given name
    pub fn child(&self, name: &str) -> Option<&Element> {
        self.child_elements().find(|e| e.name == name)
    }

    /// All child elements, in order
    pub fn child_elements(&self) -> impl Iterator<Item = &Element> {
        self.children.iter().filter_map(|n| match n {
            Node::Element(e) => Some(e),
            Node::Text(_) => None,
        })
    }

    /// All child elements with the given name, in order
    pub fn children_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Element> {
        self.child_elements().filter(move |e| e.name == name)
    }

    /// First descendant element with the given name, depth-first
    pub fn descendant(&self, name: &str) -> Option<&Element> {
        for child in self.child_elements() {
            if child.name == name {
                return Some(child);
            }
            if let Some(found) = child.descendant(name) {
                return Some(found);
            }
        }
        None
    }

    /// Concatenated descendant text, whitespace-normalized
    pub fn text(&self) -> String {
        let mut out = String::new();
        self.collect_text(&mut out);
        out.split_whitespace().collect::<Vec<_>>().join(" ")
    }

    fn collect_text(&self, out: &mut String) {
        for child in &self.children {
            match child {
                Node::Text(t) => out.push_str(t),
                Node::Element(e) => {
                    e.collect_text(out);
                    // element boundaries separate words
                    out.push(' ');
                }
            }
        }
    }
}

/// Parse raw markup into its root element.
///
/// Fails with `AppError::Parse` on malformed XML or an empty document.
pub fn parse_tree(raw: &str) -> Result<Element> {
    let mut reader = Reader::from_str(raw);
    let mut stack: Vec<Element> = Vec::new();
    let mut root: Option<Element> = None;

    loop {
        match reader.read_event() {
            Ok(Event::Start(start)) => {
                let element = element_from_start(&start)?;
                stack.push(element);
            }
            Ok(Event::Empty(start)) => {
                let element = element_from_start(&start)?;
                attach(&mut stack, &mut root, element)?;
            }
            Ok(Event::End(_)) => {
                let element = stack.pop().ok_or_else(|| parse_error("unbalanced end tag"))?;
                attach(&mut stack, &mut root, element)?;
            }
            Ok(Event::Text(text)) => {
                let value = text
                    .unescape()
                    .map_err(|e| parse_error(&format!("bad text content: {}", e)))?;
                if let Some(parent) = stack.last_mut() {
                    parent.children.push(Node::Text(value.into_owned()));
                }
            }
            Ok(Event::CData(data)) => {
                if let Some(parent) = stack.last_mut() {
                    let value = String::from_utf8_lossy(&data).into_owned();
                    parent.children.push(Node::Text(value));
                }
            }
            Ok(Event::Eof) => break,
            Ok(_) => {} // declarations, comments, processing instructions
            Err(e) => return Err(parse_error(&format!("malformed XML: {}", e))),
        }
    }

    if !stack.is_empty() {
        return Err(parse_error("unexpected end of document"));
    }

    root.ok_or_else(|| parse_error("document has no root element"))
}

fn element_from_start(start: &quick_xml::events::BytesStart<'_>) -> Result<Element> {
    let name = String::from_utf8_lossy(start.name().as_ref()).into_owned();

    let mut attributes = Vec::new();
    for attr in start.attributes() {
        let attr = attr.map_err(|e| parse_error(&format!("bad attribute: {}", e)))?;
        let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
        let value = attr
            .unescape_value()
            .map_err(|e| parse_error(&format!("bad attribute value: {}", e)))?
            .into_owned();
        attributes.push((key, value));
    }

    Ok(Element::new(name, attributes))
}

fn attach(stack: &mut [Element], root: &mut Option<Element>, element: Element) -> Result<()> {
    match stack.last_mut() {
        Some(parent) => parent.children.push(Node::Element(element)),
        None => {
            if root.is_some() {
                return Err(parse_error("multiple root elements"));
            }
            *root = Some(element);
        }
    }
    Ok(())
}

fn parse_error(message: &str) -> AppError {
    AppError::Parse {
        document: "<input>".to_string(),
        message: message.to_string(),
    }
}
