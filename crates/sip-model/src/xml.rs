//! Owned XML tree for embedded metadata documents.
//!
//! Metadata files inside an IP (`meta/dc.xml`, `meta/source_metadata.xml`,
//! ...) arrive in heterogeneous shapes and are re-embedded into generated
//! documents. This namespace-resolved tree is the common carrier between
//! the extractor and the synthesizers.

use serde::{Deserialize, Serialize};

/// An element with its resolved namespace, attributes, and children.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct XmlElement {
    /// Local element name, without prefix.
    pub name: String,
    /// Resolved namespace URI, when the element is bound to one.
    pub namespace: Option<String>,
    pub attributes: Vec<(String, String)>,
    pub children: Vec<XmlNode>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum XmlNode {
    Element(XmlElement),
    Text(String),
}

impl XmlElement {
    pub fn new(name: impl Into<String>, namespace: Option<String>) -> Self {
        Self {
            name: name.into(),
            namespace,
            attributes: Vec::new(),
            children: Vec::new(),
        }
    }

    /// Concatenated direct text content.
    pub fn text(&self) -> String {
        let mut out = String::new();
        for child in &self.children {
            if let XmlNode::Text(text) = child {
                out.push_str(text);
            }
        }
        out
    }

    /// First direct child element with the given local name.
    pub fn child(&self, name: &str) -> Option<&XmlElement> {
        self.children_named(name).next()
    }

    /// Direct child elements with the given local name.
    pub fn children_named<'a, 'b>(&'a self, name: &'b str) -> impl Iterator<Item = &'a XmlElement> {
        self.child_elements().filter(move |e| e.name == name)
    }

    /// All direct child elements.
    pub fn child_elements(&self) -> impl Iterator<Item = &XmlElement> {
        self.children.iter().filter_map(|node| match node {
            XmlNode::Element(element) => Some(element),
            XmlNode::Text(_) => None,
        })
    }

    pub fn has_element_children(&self) -> bool {
        self.child_elements().next().is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> XmlElement {
        let mut root = XmlElement::new("record", Some("urn:example".to_string()));
        let mut title = XmlElement::new("title", Some("urn:example".to_string()));
        title.children.push(XmlNode::Text("A title".to_string()));
        root.children.push(XmlNode::Element(title));
        root.children.push(XmlNode::Text("stray".to_string()));
        root
    }

    #[test]
    fn child_lookup_by_local_name() {
        let root = sample();
        assert_eq!(root.child("title").map(XmlElement::text).as_deref(), Some("A title"));
        assert!(root.child("missing").is_none());
    }

    #[test]
    fn text_joins_direct_text_nodes_only() {
        let root = sample();
        assert_eq!(root.text(), "stray");
        assert!(root.has_element_children());
    }
}
