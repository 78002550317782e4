//! Significant-properties document synthesis
//! (`content/significant_properties.xml`).

use anyhow::Result;
use quick_xml::events::{BytesEnd, BytesStart, Event};

use sip_model::{DocumentKind, GeneratedDocument, PreservationMetadata};

use crate::Synthesizer;
use crate::common::{PREMIS_NS, new_document_writer, write_text_element};

/// Emits one PREMIS entry per significant technical characteristic.
///
/// An IP that carries significant-properties metadata naming nothing
/// still gets a valid empty document; an IP without that metadata gets
/// no document at all.
pub struct SigPropsSynthesizer;

impl Synthesizer for SigPropsSynthesizer {
    fn kind(&self) -> DocumentKind {
        DocumentKind::SignificantProperties
    }

    fn synthesize(&self, metadata: &PreservationMetadata) -> Result<Option<GeneratedDocument>> {
        let Some(properties) = metadata.significant_properties.as_ref() else {
            return Ok(None);
        };

        let mut writer = new_document_writer()?;
        let mut root = BytesStart::new("premis");
        root.push_attribute(("xmlns", PREMIS_NS));
        root.push_attribute(("version", "3.0"));
        writer.write_event(Event::Start(root))?;

        if properties.is_empty() {
            writer.write_event(Event::Empty(BytesStart::new("object")))?;
        } else {
            writer.write_event(Event::Start(BytesStart::new("object")))?;
            for property in properties {
                writer.write_event(Event::Start(BytesStart::new("significantProperties")))?;
                write_text_element(
                    &mut writer,
                    "significantPropertiesType",
                    &property.property_type,
                )?;
                write_text_element(
                    &mut writer,
                    "significantPropertiesValue",
                    &property.value,
                )?;
                writer.write_event(Event::End(BytesEnd::new("significantProperties")))?;
            }
            writer.write_event(Event::End(BytesEnd::new("object")))?;
        }

        writer.write_event(Event::End(BytesEnd::new("premis")))?;
        tracing::debug!(properties = properties.len(), "synthesized significant properties");
        Ok(Some(GeneratedDocument::new(
            DocumentKind::SignificantProperties,
            writer.into_inner(),
        )))
    }
}
