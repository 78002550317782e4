//! Dublin Core record synthesis (`dc.xml`).

use anyhow::Result;
use quick_xml::events::{BytesEnd, BytesStart, Event};

use sip_model::{DocumentKind, GeneratedDocument, PreservationMetadata};

use crate::Synthesizer;
use crate::common::{DC_NS, DCTERMS_NS, ROSETTA_NS, new_document_writer, write_text_element};

/// `bag-info.txt` key -> qualified output element.
const BAG_INFO_DC_MAP: &[(&str, &str)] = &[
    ("DC-Title", "dc:title"),
    ("DC-Terms-Identifier", "dcterms:identifier"),
    ("Origin-System-Identifier", "rosetta:externalSystem"),
    ("External-Identifier", "rosetta:externalId"),
];

/// Maps `bag-info.txt` to the flat SIP-level `dc.xml` record. Absent
/// keys are skipped; the record itself is always produced.
pub struct DcSynthesizer;

impl Synthesizer for DcSynthesizer {
    fn kind(&self) -> DocumentKind {
        DocumentKind::DublinCore
    }

    fn synthesize(&self, metadata: &PreservationMetadata) -> Result<Option<GeneratedDocument>> {
        let mut writer = new_document_writer()?;

        let mut root = BytesStart::new("dc:record");
        root.push_attribute(("xmlns:dc", DC_NS));
        root.push_attribute(("xmlns:dcterms", DCTERMS_NS));
        root.push_attribute(("xmlns:rosetta", ROSETTA_NS));
        writer.write_event(Event::Start(root))?;

        for (key, element) in BAG_INFO_DC_MAP {
            for value in metadata.bag_info.all(key) {
                write_text_element(&mut writer, element, value)?;
            }
        }

        writer.write_event(Event::End(BytesEnd::new("dc:record")))?;
        tracing::debug!("synthesized dublin core record");
        Ok(Some(GeneratedDocument::new(
            DocumentKind::DublinCore,
            writer.into_inner(),
        )))
    }
}
