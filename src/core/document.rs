//! Structured source documents (UniProt XML entries).
//!
//! A reply from UniProt is a `<uniprot>` root wrapping one `<entry>`. The
//! entry is copied into an owned [`Element`] tree so the classifier does not
//! borrow from the raw XML text.

use std::fmt::Write as _;

use thiserror::Error;

/// Errors raised while reading a source document
#[derive(Debug, Error)]
pub enum DocumentError {
    #[error("Invalid XML: {0}")]
    Xml(#[from] roxmltree::Error),

    #[error("Document contains no entry element")]
    MissingEntry,

    #[error("Entry has no sequence")]
    MissingSequence,
}

/// An element with its local tag name, attributes, text and children
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Element {
    /// Local tag name (namespace stripped)
    pub tag: String,

    /// Attributes in document order
    pub attributes: Vec<(String, String)>,

    /// Text before the first child element, trimmed; `None` if blank
    pub text: Option<String>,

    /// Text after this element up to its next sibling element, trimmed
    pub tail: Option<String>,

    /// Child elements in document order
    pub children: Vec<Element>,
}

impl Element {
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            ..Default::default()
        }
    }

    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.push((name.into(), value.into()));
        self
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    pub fn with_tail(mut self, tail: impl Into<String>) -> Self {
        self.tail = Some(tail.into());
        self
    }

    pub fn with_child(mut self, child: Element) -> Self {
        self.children.push(child);
        self
    }

    /// Value of an attribute
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// Child element by position
    pub fn child(&self, index: usize) -> Option<&Element> {
        self.children.get(index)
    }

    /// First child element with the given tag
    pub fn find(&self, tag: &str) -> Option<&Element> {
        self.children.iter().find(|child| child.tag == tag)
    }

    /// Serialize the element and its descendants back to XML
    ///
    /// Every text node is kept in document order, including the tails of
    /// child elements. The element's own tail is not part of its markup.
    pub fn to_markup(&self) -> String {
        let mut out = String::new();
        self.write_markup(&mut out);
        out
    }

    fn write_markup(&self, out: &mut String) {
        let _ = write!(out, "<{}", self.tag);
        for (name, value) in &self.attributes {
            let _ = write!(out, " {}=\"{}\"", name, escape(value));
        }

        if self.text.is_none() && self.children.is_empty() {
            out.push_str("/>");
            return;
        }

        out.push('>');
        if let Some(text) = &self.text {
            out.push_str(&escape(text));
        }
        for child in &self.children {
            child.write_markup(out);
            if let Some(tail) = &child.tail {
                out.push_str(&escape(tail));
            }
        }
        let _ = write!(out, "</{}>", self.tag);
    }

    fn from_node(node: roxmltree::Node<'_, '_>) -> Self {
        let mut text = String::new();
        let mut children: Vec<(Element, String)> = Vec::new();

        for child in node.children() {
            if child.is_element() {
                children.push((Element::from_node(child), String::new()));
            } else if child.is_text() {
                let fragment = child.text().unwrap_or_default();
                match children.last_mut() {
                    Some((_, tail)) => tail.push_str(fragment),
                    None => text.push_str(fragment),
                }
            }
        }

        Self {
            tag: node.tag_name().name().to_string(),
            attributes: node
                .attributes()
                .map(|attr| (attr.name().to_string(), attr.value().to_string()))
                .collect(),
            text: trimmed(&text),
            tail: None,
            children: children
                .into_iter()
                .map(|(mut child, tail)| {
                    child.tail = trimmed(&tail);
                    child
                })
                .collect(),
        }
    }
}

fn trimmed(text: &str) -> Option<String> {
    Some(text.trim())
        .filter(|text| !text.is_empty())
        .map(str::to_string)
}

/// One UniProt entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    root: Element,
}

impl Document {
    /// Wrap an already-built entry element
    pub fn from_element(root: Element) -> Self {
        Self { root }
    }

    /// Parse a UniProt XML reply
    ///
    /// Accepts either a bare `<entry>` or a wrapper whose first child
    /// element is the entry.
    pub fn parse(xml: &str) -> Result<Self, DocumentError> {
        let parsed = roxmltree::Document::parse(xml)?;
        let root = parsed.root_element();

        let entry = if root.tag_name().name() == "entry" {
            root
        } else {
            root.children()
                .find(|child| child.is_element())
                .ok_or(DocumentError::MissingEntry)?
        };

        Ok(Self {
            root: Element::from_node(entry),
        })
    }

    /// The entry element
    pub fn root(&self) -> &Element {
        &self.root
    }

    /// Direct children of the entry in document order
    pub fn children(&self) -> &[Element] {
        &self.root.children
    }

    /// Amino-acid sequence with all whitespace removed
    pub fn sequence(&self) -> Result<String, DocumentError> {
        let sequence: String = self
            .root
            .find("sequence")
            .and_then(|elem| elem.text.as_deref())
            .unwrap_or_default()
            .chars()
            .filter(|c| !c.is_whitespace())
            .collect();

        if sequence.is_empty() {
            return Err(DocumentError::MissingSequence);
        }

        Ok(sequence)
    }
}

fn escape(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            _ => escaped.push(ch),
        }
    }
    escaped
}
