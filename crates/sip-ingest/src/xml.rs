//! Embedded metadata XML loading into the owned tree model.

use std::path::Path;

use quick_xml::events::{BytesStart, Event};
use quick_xml::name::ResolveResult;
use quick_xml::reader::NsReader;

use sip_model::{XmlElement, XmlNode};

use crate::error::{IngestError, Result};

/// Load and parse an XML file into an [`XmlElement`] tree with resolved
/// namespaces.
pub fn load_xml_file(path: &Path) -> Result<XmlElement> {
    let contents = std::fs::read_to_string(path).map_err(|source| IngestError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    parse_xml(&contents).map_err(|message| IngestError::MalformedXml {
        path: path.to_path_buf(),
        message,
    })
}

/// Parse an XML string into an element tree. Comments, processing
/// instructions, and whitespace-only text are dropped.
pub fn parse_xml(contents: &str) -> std::result::Result<XmlElement, String> {
    let mut reader = NsReader::from_str(contents);
    reader.config_mut().trim_text(true);

    let mut stack: Vec<XmlElement> = Vec::new();
    let mut root: Option<XmlElement> = None;

    loop {
        match reader.read_resolved_event() {
            Err(error) => return Err(error.to_string()),
            Ok((ns, Event::Start(start))) => {
                let element = element_from_start(&ns, &start)?;
                stack.push(element);
            }
            Ok((ns, Event::Empty(start))) => {
                let element = element_from_start(&ns, &start)?;
                attach(&mut stack, &mut root, element)?;
            }
            Ok((_, Event::End(_))) => {
                let element = stack.pop().ok_or_else(|| "unbalanced end tag".to_string())?;
                attach(&mut stack, &mut root, element)?;
            }
            Ok((_, Event::Text(text))) => {
                let value = text.xml_content().map_err(|e| e.to_string())?;
                if !value.trim().is_empty()
                    && let Some(parent) = stack.last_mut()
                {
                    parent.children.push(XmlNode::Text(value.into_owned()));
                }
            }
            Ok((_, Event::CData(data))) => {
                let value = String::from_utf8_lossy(data.as_ref()).into_owned();
                if let Some(parent) = stack.last_mut() {
                    parent.children.push(XmlNode::Text(value));
                }
            }
            Ok((_, Event::Eof)) => break,
            Ok(_) => {}
        }
    }

    if !stack.is_empty() {
        return Err("unexpected end of document".to_string());
    }
    root.ok_or_else(|| "document has no root element".to_string())
}

fn element_from_start(
    ns: &ResolveResult<'_>,
    start: &BytesStart<'_>,
) -> std::result::Result<XmlElement, String> {
    let name = String::from_utf8_lossy(start.local_name().as_ref()).into_owned();
    let namespace = match ns {
        ResolveResult::Bound(bound) => Some(String::from_utf8_lossy(bound.0).into_owned()),
        _ => None,
    };
    let mut element = XmlElement::new(name, namespace);
    for attr in start.attributes() {
        let attr = attr.map_err(|e| e.to_string())?;
        let key = attr.key.as_ref();
        if key == b"xmlns" || key.starts_with(b"xmlns:") {
            continue;
        }
        let key = String::from_utf8_lossy(key).into_owned();
        let value = attr
            .unescape_value()
            .map_err(|e| e.to_string())?
            .into_owned();
        element.attributes.push((key, value));
    }
    Ok(element)
}

fn attach(
    stack: &mut [XmlElement],
    root: &mut Option<XmlElement>,
    element: XmlElement,
) -> std::result::Result<(), String> {
    if let Some(parent) = stack.last_mut() {
        parent.children.push(XmlNode::Element(element));
        Ok(())
    } else if root.is_none() {
        *root = Some(element);
        Ok(())
    } else {
        Err("multiple root elements".to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_namespaced_tree() {
        let tree = parse_xml(
            r#"<?xml version="1.0"?>
            <dc:record xmlns:dc="http://purl.org/dc/elements/1.1/"
                       xmlns:dcterms="http://purl.org/dc/terms/">
                <dc:title>A Title</dc:title>
                <dcterms:identifier>id-1</dcterms:identifier>
            </dc:record>"#,
        )
        .unwrap();

        assert_eq!(tree.name, "record");
        assert_eq!(
            tree.namespace.as_deref(),
            Some("http://purl.org/dc/elements/1.1/")
        );
        let title = tree.child("title").unwrap();
        assert_eq!(title.text(), "A Title");
        assert_eq!(
            tree.child("identifier").unwrap().namespace.as_deref(),
            Some("http://purl.org/dc/terms/")
        );
    }

    #[test]
    fn keeps_attributes_but_not_namespace_declarations() {
        let tree = parse_xml(r#"<doc xmlns="urn:x" kind="test"><leaf/></doc>"#).unwrap();
        assert_eq!(tree.attributes, vec![("kind".to_string(), "test".to_string())]);
        assert!(tree.child("leaf").is_some());
    }

    #[test]
    fn rejects_malformed_documents() {
        assert!(parse_xml("<open><unclosed></open>").is_err());
        assert!(parse_xml("no xml here").is_err());
    }
}
