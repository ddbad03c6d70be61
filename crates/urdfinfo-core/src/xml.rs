//! Minimal generic XML element tree
//!
//! Only element structure and attributes are kept; text, comments,
//! processing instructions and the DOCTYPE are dropped while reading.

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use std::collections::BTreeMap;

use crate::error::LoadError;

/// A single XML element with its attributes (in document order) and child elements
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Element {
    pub tag: String,
    pub attributes: Vec<(String, String)>,
    pub children: Vec<Element>,
}

impl Element {
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            attributes: Vec::new(),
            children: Vec::new(),
        }
    }

    /// Builder-style attribute setter
    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.push((key.into(), value.into()));
        self
    }

    /// Builder-style child append
    pub fn with_child(mut self, child: Element) -> Self {
        self.children.push(child);
        self
    }

    /// Look up an attribute value by name
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .rev()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// All attributes as a sorted map; a repeated key keeps its last value
    pub fn attribute_map(&self) -> BTreeMap<String, String> {
        self.attributes.iter().cloned().collect()
    }

    /// Direct child elements in document order
    pub fn children(&self) -> impl Iterator<Item = &Element> {
        self.children.iter()
    }

    /// Parse a complete XML document and return its root element
    pub fn parse(xml: &str) -> Result<Self, LoadError> {
        let mut reader = Reader::from_str(xml);
        reader.config_mut().trim_text(true);

        let mut open: Vec<Element> = Vec::new();
        let mut root: Option<Element> = None;

        loop {
            match reader.read_event() {
                Ok(Event::Start(ref e)) => open.push(Self::from_start(e)?),
                Ok(Event::Empty(ref e)) => {
                    let element = Self::from_start(e)?;
                    attach(&mut open, &mut root, element)?;
                }
                Ok(Event::End(_)) => {
                    let element = open
                        .pop()
                        .ok_or_else(|| LoadError::malformed("closing tag without an open element"))?;
                    attach(&mut open, &mut root, element)?;
                }
                Ok(Event::Text(ref t))
                    if open.is_empty() && !t.iter().all(u8::is_ascii_whitespace) =>
                {
                    return Err(LoadError::malformed("text outside the root element"));
                }
                Ok(Event::CData(_)) if open.is_empty() => {
                    return Err(LoadError::malformed("CDATA outside the root element"));
                }
                Ok(Event::Eof) => break,
                Ok(_) => {}
                Err(e) => {
                    return Err(LoadError::malformed(format!(
                        "{} (at byte {})",
                        e,
                        reader.error_position()
                    )))
                }
            }
        }

        if let Some(unclosed) = open.last() {
            return Err(LoadError::malformed(format!(
                "unexpected end of input inside <{}>",
                unclosed.tag
            )));
        }

        root.ok_or_else(|| LoadError::malformed("no root element"))
    }

    fn from_start(start: &BytesStart) -> Result<Self, LoadError> {
        let mut element = Self::new(decode(start.name().as_ref())?);
        for attr in start.attributes() {
            let attr = attr.map_err(|e| {
                LoadError::malformed(format!("bad attribute on <{}>: {}", element.tag, e))
            })?;
            let key = decode(attr.key.as_ref())?;
            let value = attr.unescape_value().map_err(|e| {
                LoadError::malformed(format!("bad value for '{}' on <{}>: {}", key, element.tag, e))
            })?;
            element.attributes.push((key, value.into_owned()));
        }
        Ok(element)
    }
}

/// Hand a finished element to its parent, or make it the document root
fn attach(
    open: &mut [Element],
    root: &mut Option<Element>,
    element: Element,
) -> Result<(), LoadError> {
    match open.last_mut() {
        Some(parent) => parent.children.push(element),
        None if root.is_none() => *root = Some(element),
        None => {
            return Err(LoadError::malformed(format!(
                "second root element <{}>",
                element.tag
            )))
        }
    }
    Ok(())
}

fn decode(bytes: &[u8]) -> Result<String, LoadError> {
    std::str::from_utf8(bytes)
        .map(str::to_string)
        .map_err(|e| LoadError::malformed(format!("invalid UTF-8 in name: {}", e)))
}
