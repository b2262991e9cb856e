//! Minimal owned XML element tree built with `quick-xml`.
//!
//! URDF queries are document-wide ("every `<joint>` anywhere"), so the
//! streaming reader output is materialised into a small tree that supports
//! pre-order traversal.

use std::fs;
use std::path::Path;

use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};

use crate::error::{AnalyzerError, Result};

/// An XML element with its attributes and child elements. Text content is
/// not kept; URDF carries its data in attributes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct XmlElement {
    pub name: String,
    pub attributes: Vec<(String, String)>,
    pub children: Vec<XmlElement>,
}

impl XmlElement {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Value of an attribute, if present.
    pub fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Pre-order traversal starting with `self`.
    pub fn descendants(&self) -> Descendants<'_> {
        Descendants { stack: vec![self] }
    }

    /// Every element named `tag` in document order, `self` included.
    pub fn iter<'a>(&'a self, tag: &'a str) -> impl Iterator<Item = &'a XmlElement> + 'a {
        self.descendants().filter(move |e| e.name == tag)
    }

    /// First element named `tag` in document order, `self` included.
    pub fn find(&self, tag: &str) -> Option<&XmlElement> {
        self.descendants().find(|e| e.name == tag)
    }
}

/// Iterator returned by [`XmlElement::descendants`].
pub struct Descendants<'a> {
    stack: Vec<&'a XmlElement>,
}

impl<'a> Iterator for Descendants<'a> {
    type Item = &'a XmlElement;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        self.stack.extend(node.children.iter().rev());
        Some(node)
    }
}

/// Read and parse an XML file, returning its root element.
pub fn read_file(path: &Path) -> Result<XmlElement> {
    let content = fs::read_to_string(path).map_err(|e| AnalyzerError::Parse {
        path: path.to_path_buf(),
        message: format!("failed to read file: {e}"),
    })?;
    parse_document(&content, path)
}

/// Parse an XML string held in memory.
pub fn parse_str(xml: &str) -> Result<XmlElement> {
    parse_document(xml, Path::new("<memory>"))
}

/// Parse an XML document; `origin` is only used for error reporting.
pub fn parse_document(xml: &str, origin: &Path) -> Result<XmlElement> {
    let fail = |message: String| AnalyzerError::Parse {
        path: origin.to_path_buf(),
        message,
    };

    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut open: Vec<XmlElement> = Vec::new();
    let mut root: Option<XmlElement> = None;

    loop {
        match reader.read_event() {
            Ok(Event::Start(ref e)) => open.push(element_from_start(e).map_err(fail)?),
            Ok(Event::Empty(ref e)) => {
                let element = element_from_start(e).map_err(fail)?;
                attach(&mut open, &mut root, element).map_err(fail)?;
            }
            Ok(Event::End(_)) => {
                let element = open
                    .pop()
                    .ok_or_else(|| fail("unexpected closing tag".into()))?;
                attach(&mut open, &mut root, element).map_err(fail)?;
            }
            Ok(Event::Text(ref t)) if open.is_empty() && t.iter().any(|b| !b.is_ascii_whitespace()) => {
                return Err(fail("text outside the root element".into()));
            }
            Ok(Event::Eof) => break,
            Ok(_) => {}
            Err(e) => {
                return Err(fail(format!(
                    "{e} (at byte {})",
                    reader.buffer_position()
                )));
            }
        }
    }

    if let Some(unclosed) = open.last() {
        return Err(fail(format!("unclosed element <{}>", unclosed.name)));
    }
    root.ok_or_else(|| fail("document has no root element".into()))
}

fn element_from_start(start: &BytesStart) -> std::result::Result<XmlElement, String> {
    let mut element = XmlElement::new(String::from_utf8_lossy(start.name().as_ref()));
    for attr in start.attributes() {
        let attr = attr.map_err(|e| format!("malformed attribute on <{}>: {e}", element.name))?;
        let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
        let value = attr
            .unescape_value()
            .map_err(|e| format!("bad attribute value for '{key}': {e}"))?
            .into_owned();
        element.attributes.push((key, value));
    }
    Ok(element)
}

fn attach(
    open: &mut [XmlElement],
    root: &mut Option<XmlElement>,
    element: XmlElement,
) -> std::result::Result<(), String> {
    match open.last_mut() {
        Some(parent) => parent.children.push(element),
        None if root.is_none() => *root = Some(element),
        None => return Err(format!("multiple root elements (<{}>)", element.name)),
    }
    Ok(())
}
