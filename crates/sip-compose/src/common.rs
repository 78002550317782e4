//! Shared namespaces and writer helpers for document synthesis.

use std::io::Write;

use anyhow::Result;
use quick_xml::Writer;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};

use sip_model::{XmlElement, XmlNode};

/// OAI namespace.
pub const OAI_NS: &str = "http://www.openarchives.org/OAI/2.0/";

/// Rosetta METS namespace.
pub const METS_NS: &str = "http://www.exlibrisgroup.com/xsd/dps/rosettaMets";

/// Dublin Core element set namespace.
pub const DC_NS: &str = "http://purl.org/dc/elements/1.1/";

/// DCMI terms namespace.
pub const DCTERMS_NS: &str = "http://purl.org/dc/terms/";

/// Deposit-system namespace.
pub const ROSETTA_NS: &str = "http://www.exlibrisgroup.com/dps";

/// DNX (Rosetta metadata container) namespace.
pub const DNX_NS: &str = "http://www.exlibrisgroup.com/dps/dnx";

/// XLink namespace.
pub const XLINK_NS: &str = "http://www.w3.org/1999/xlink";

/// PREMIS v3 namespace.
pub const PREMIS_NS: &str = "http://www.loc.gov/premis/v3";

/// Canonical prefix for namespaces declared on generated document roots.
pub fn prefix_for(namespace: &str) -> Option<&'static str> {
    match namespace {
        DC_NS => Some("dc"),
        DCTERMS_NS => Some("dcterms"),
        ROSETTA_NS => Some("rosetta"),
        METS_NS => Some("mets"),
        OAI_NS => Some("oai"),
        XLINK_NS => Some("xlink"),
        _ => None,
    }
}

/// Indented document writer with the XML declaration already emitted.
pub fn new_document_writer() -> Result<Writer<Vec<u8>>> {
    let mut writer = Writer::new_with_indent(Vec::new(), b' ', 2);
    writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;
    Ok(writer)
}

/// Write a simple text element.
pub fn write_text_element<W: Write>(writer: &mut Writer<W>, name: &str, text: &str) -> Result<()> {
    writer.write_event(Event::Start(BytesStart::new(name)))?;
    writer.write_event(Event::Text(BytesText::new(text)))?;
    writer.write_event(Event::End(BytesEnd::new(name)))?;
    Ok(())
}

/// Write a DNX `<key id="..">value</key>` element.
pub fn write_key_element<W: Write>(writer: &mut Writer<W>, id: &str, value: &str) -> Result<()> {
    let mut key = BytesStart::new("key");
    key.push_attribute(("id", id));
    writer.write_event(Event::Start(key))?;
    writer.write_event(Event::Text(BytesText::new(value)))?;
    writer.write_event(Event::End(BytesEnd::new("key")))?;
    Ok(())
}

/// Embed an owned XML fragment into the output.
///
/// Elements in a namespace with a canonical prefix are written prefixed
/// (the prefix must be declared on the document root). Elements in any
/// other namespace are written unprefixed with a default-namespace
/// declaration wherever the namespace changes relative to the parent.
pub fn write_fragment<W: Write>(
    writer: &mut Writer<W>,
    element: &XmlElement,
    parent_ns: Option<&str>,
) -> Result<()> {
    let namespace = element.namespace.as_deref();
    let (tag, default_ns) = match namespace {
        Some(ns) => match prefix_for(ns) {
            Some(prefix) => (format!("{prefix}:{}", element.name), None),
            None => {
                let redeclare = parent_ns != Some(ns);
                (element.name.clone(), redeclare.then_some(ns))
            }
        },
        None => (element.name.clone(), None),
    };

    let mut start = BytesStart::new(tag.as_str());
    if let Some(ns) = default_ns {
        start.push_attribute(("xmlns", ns));
    }
    for (key, value) in &element.attributes {
        start.push_attribute((key.as_str(), value.as_str()));
    }

    if element.children.is_empty() {
        writer.write_event(Event::Empty(start))?;
        return Ok(());
    }
    writer.write_event(Event::Start(start))?;
    for child in &element.children {
        match child {
            XmlNode::Element(inner) => write_fragment(writer, inner, namespace)?,
            XmlNode::Text(text) => writer.write_event(Event::Text(BytesText::new(text)))?,
        }
    }
    writer.write_event(Event::End(BytesEnd::new(tag.as_str())))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render(element: &XmlElement) -> String {
        let mut writer = Writer::new(Vec::new());
        write_fragment(&mut writer, element, None).unwrap();
        String::from_utf8(writer.into_inner()).unwrap()
    }

    #[test]
    fn known_namespace_gets_canonical_prefix() {
        let mut element = XmlElement::new("title", Some(DC_NS.to_string()));
        element.children.push(XmlNode::Text("x".to_string()));
        assert_eq!(render(&element), "<dc:title>x</dc:title>");
    }

    #[test]
    fn unknown_namespace_declared_as_default() {
        let mut root = XmlElement::new("record", Some("urn:custom".to_string()));
        root.children.push(XmlNode::Element(XmlElement::new(
            "leaf",
            Some("urn:custom".to_string()),
        )));
        assert_eq!(
            render(&root),
            r#"<record xmlns="urn:custom"><leaf/></record>"#
        );
    }

    #[test]
    fn text_is_escaped() {
        let mut element = XmlElement::new("note", None);
        element.children.push(XmlNode::Text("a < b & c".to_string()));
        assert_eq!(render(&element), "<note>a &lt; b &amp; c</note>");
    }
}
