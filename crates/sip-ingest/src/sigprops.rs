//! PREMIS significant-properties extraction.

use sip_model::{SignificantProperty, XmlElement};

/// PREMIS v3 namespace used by `meta/significant_properties.xml`.
pub const PREMIS_NS: &str = "http://www.loc.gov/premis/v3";

/// Pull `(type, value)` pairs out of a parsed PREMIS document.
///
/// Entries missing a type or value are skipped. A document without an
/// `object` element, or with no entries, yields an empty list: the IP
/// explicitly declares that nothing is significant.
pub fn parse_significant_properties(tree: &XmlElement) -> Vec<SignificantProperty> {
    let Some(object) = tree
        .children_named("object")
        .find(|e| in_premis_namespace(e))
    else {
        return Vec::new();
    };

    let mut properties = Vec::new();
    for section in object
        .children_named("significantProperties")
        .filter(|e| in_premis_namespace(e))
    {
        let property_type = section
            .child("significantPropertiesType")
            .map(XmlElement::text);
        let value = section
            .child("significantPropertiesValue")
            .map(XmlElement::text);
        if let (Some(property_type), Some(value)) = (property_type, value) {
            properties.push(SignificantProperty {
                property_type,
                value,
            });
        }
    }
    properties
}

fn in_premis_namespace(element: &XmlElement) -> bool {
    element.namespace.as_deref() == Some(PREMIS_NS)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::xml::parse_xml;

    #[test]
    fn extracts_type_value_pairs() {
        let tree = parse_xml(
            r#"<premis xmlns="http://www.loc.gov/premis/v3">
                <object>
                    <significantProperties>
                        <significantPropertiesType>content</significantPropertiesType>
                        <significantPropertiesValue>text layer</significantPropertiesValue>
                    </significantProperties>
                    <significantProperties>
                        <significantPropertiesType>appearance</significantPropertiesType>
                        <significantPropertiesValue>color fidelity</significantPropertiesValue>
                    </significantProperties>
                    <significantProperties>
                        <significantPropertiesType>orphaned</significantPropertiesType>
                    </significantProperties>
                </object>
            </premis>"#,
        )
        .unwrap();

        let properties = parse_significant_properties(&tree);
        assert_eq!(properties.len(), 2);
        assert_eq!(properties[0].property_type, "content");
        assert_eq!(properties[1].value, "color fidelity");
    }

    #[test]
    fn document_without_object_yields_empty() {
        let tree = parse_xml(r#"<premis xmlns="http://www.loc.gov/premis/v3"/>"#).unwrap();
        assert!(parse_significant_properties(&tree).is_empty());
    }

    #[test]
    fn foreign_namespace_is_ignored() {
        let tree = parse_xml(
            r#"<premis xmlns="urn:not-premis">
                <object>
                    <significantProperties>
                        <significantPropertiesType>content</significantPropertiesType>
                        <significantPropertiesValue>text</significantPropertiesValue>
                    </significantProperties>
                </object>
            </premis>"#,
        )
        .unwrap();
        assert!(parse_significant_properties(&tree).is_empty());
    }
}
