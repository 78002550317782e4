//! Preservation METS synthesis (`content/ie.xml`).
//!
//! Builds the deposit-system METS document: descriptive section, IE
//! administrative section, per-representation and per-file technical
//! sections, and the file section. Optional blocks with no backing data
//! are omitted entirely; some target schemas reject empty optional
//! elements.

use std::collections::HashSet;
use std::io::Write;

use anyhow::{Result, anyhow};
use quick_xml::Writer;
use quick_xml::events::{BytesEnd, BytesStart, Event};

use sip_model::{
    DocumentKind, GeneratedDocument, PreservationMetadata, Representation, XmlElement, XmlNode,
};

use crate::Synthesizer;
use crate::common::{
    DC_NS, DCTERMS_NS, DNX_NS, METS_NS, OAI_NS, ROSETTA_NS, XLINK_NS, new_document_writer,
    prefix_for, write_fragment, write_key_element,
};

/// `bag-info.txt` key -> descriptive record element.
const BAG_INFO_DMD_MAP: &[(&str, &str, &str)] = &[
    ("DC-Terms-Identifier", DCTERMS_NS, "identifier"),
    ("DC-Creator", DC_NS, "creator"),
    ("DC-Title", DC_NS, "title"),
    ("DC-Rights", DC_NS, "rights"),
    ("DC-Terms-Rights", DCTERMS_NS, "rights"),
    ("DC-Terms-License", DCTERMS_NS, "license"),
    ("DC-Terms-Access-Rights", DCTERMS_NS, "accessRights"),
    ("Embargo-Enddate", DCTERMS_NS, "available"),
    ("DC-Terms-Rights-Holder", DCTERMS_NS, "rightsHolder"),
];

/// Fixed ordering of the descriptive record; unlisted elements sort last.
const DMD_RECORD_ORDER: &[(&str, &str)] = &[
    (DCTERMS_NS, "identifier"),
    (DC_NS, "creator"),
    (DC_NS, "title"),
    (DC_NS, "rights"),
    (DCTERMS_NS, "rights"),
    (DCTERMS_NS, "license"),
    (DCTERMS_NS, "accessRights"),
    (DCTERMS_NS, "available"),
    (DCTERMS_NS, "rightsHolder"),
];

/// Bag keys that constitute rights data; the rights section is omitted
/// when none is present.
const RIGHTS_KEYS: &[&str] = &[
    "DC-Rights",
    "DC-Terms-Rights",
    "DC-Terms-License",
    "DC-Terms-Access-Rights",
    "DC-Terms-Rights-Holder",
];

pub struct MetsSynthesizer;

impl Synthesizer for MetsSynthesizer {
    fn kind(&self) -> DocumentKind {
        DocumentKind::PreservationMets
    }

    fn synthesize(&self, metadata: &PreservationMetadata) -> Result<Option<GeneratedDocument>> {
        let identifier = composite_identifier(metadata)?;

        let mut writer = new_document_writer()?;
        let mut root = BytesStart::new("mets:mets");
        root.push_attribute(("xmlns:mets", METS_NS));
        root.push_attribute(("xmlns:dc", DC_NS));
        root.push_attribute(("xmlns:dcterms", DCTERMS_NS));
        root.push_attribute(("xmlns:oai", OAI_NS));
        root.push_attribute(("xmlns:rosetta", ROSETTA_NS));
        root.push_attribute(("xmlns:xlink", XLINK_NS));
        writer.write_event(Event::Start(root))?;

        write_dmdsec(&mut writer, metadata, &identifier)?;
        write_ie_amdsec(&mut writer, metadata)?;
        write_rep_amdsecs(&mut writer, &metadata.representations)?;
        write_file_amdsecs(&mut writer, &metadata.representations)?;
        write_filesec(&mut writer, &metadata.representations)?;

        writer.write_event(Event::End(BytesEnd::new("mets:mets")))?;
        tracing::debug!(
            representations = metadata.representations.len(),
            "synthesized preservation mets"
        );
        Ok(Some(GeneratedDocument::new(
            DocumentKind::PreservationMets,
            writer.into_inner(),
        )))
    }
}

/// `dcm:{Source-Organization}@{Origin-System-Identifier}@{External-Identifier}`.
fn composite_identifier(metadata: &PreservationMetadata) -> Result<String> {
    let mut parts = Vec::with_capacity(3);
    for key in [
        "Source-Organization",
        "Origin-System-Identifier",
        "External-Identifier",
    ] {
        let value = metadata
            .bag_info
            .first(key)
            .ok_or_else(|| anyhow!("missing required metadata in 'bag-info.txt': '{key}'"))?;
        parts.push(value);
    }
    Ok(format!("dcm:{}@{}@{}", parts[0], parts[1], parts[2]))
}

fn write_dmdsec<W: Write>(
    writer: &mut Writer<W>,
    metadata: &PreservationMetadata,
    identifier: &str,
) -> Result<()> {
    let mut entries: Vec<XmlElement> = vec![text_entry(DCTERMS_NS, "identifier", identifier)];
    let mut seen: HashSet<(Option<String>, String, String)> = HashSet::new();

    // bag-info values take priority over dc.xml elements
    for (key, ns, name) in BAG_INFO_DMD_MAP {
        for value in metadata.bag_info.all(key) {
            seen.insert((
                Some((*ns).to_string()),
                (*name).to_string(),
                value.clone(),
            ));
            entries.push(text_entry(ns, name, value));
        }
    }
    if let Some(descriptive) = metadata.descriptive.as_ref() {
        for element in descriptive.child_elements() {
            let fingerprint = (
                element.namespace.clone(),
                element.name.clone(),
                element.text(),
            );
            if seen.contains(&fingerprint) {
                continue;
            }
            entries.push(element.clone());
        }
    }

    entries.sort_by(|a, b| {
        let key_a = sort_key(a);
        let key_b = sort_key(b);
        key_a.cmp(&key_b)
    });

    let mut dmdsec = BytesStart::new("mets:dmdSec");
    dmdsec.push_attribute(("ID", "ie-dmd"));
    writer.write_event(Event::Start(dmdsec))?;
    write_mdwrap_open(writer, &[("MDTYPE", "DC")])?;

    writer.write_event(Event::Start(BytesStart::new("dc:record")))?;
    for entry in &entries {
        write_fragment(writer, entry, None)?;
    }
    writer.write_event(Event::End(BytesEnd::new("dc:record")))?;

    write_mdwrap_close(writer)?;
    writer.write_event(Event::End(BytesEnd::new("mets:dmdSec")))?;
    Ok(())
}

fn sort_key(element: &XmlElement) -> (usize, String, String) {
    let ns = element.namespace.as_deref();
    let order = DMD_RECORD_ORDER
        .iter()
        .position(|(o_ns, o_name)| Some(*o_ns) == ns && *o_name == element.name)
        .unwrap_or(DMD_RECORD_ORDER.len());
    let qualified = match ns.and_then(prefix_for) {
        Some(prefix) => format!("{prefix}:{}", element.name),
        None => element.name.clone(),
    };
    (order, qualified, element.text())
}

fn write_ie_amdsec<W: Write>(writer: &mut Writer<W>, metadata: &PreservationMetadata) -> Result<()> {
    let mut amdsec = BytesStart::new("mets:amdSec");
    amdsec.push_attribute(("ID", "ie-amd"));
    writer.write_event(Event::Start(amdsec))?;

    write_ie_techmd(writer, metadata)?;

    let rights: Vec<&String> = RIGHTS_KEYS
        .iter()
        .flat_map(|key| metadata.bag_info.all(key))
        .collect();
    if !rights.is_empty() {
        write_ie_rightsmd(writer, &rights)?;
    }
    if let Some(source) = metadata.source_metadata.as_ref() {
        write_ie_sourcemd(writer, source)?;
    }
    if let Some(provenance) = metadata.provenance.as_ref() {
        write_ie_digiprovmd(writer, provenance)?;
    }

    writer.write_event(Event::End(BytesEnd::new("mets:amdSec")))?;
    Ok(())
}

fn write_ie_techmd<W: Write>(writer: &mut Writer<W>, metadata: &PreservationMetadata) -> Result<()> {
    let mut techmd = BytesStart::new("mets:techMD");
    techmd.push_attribute(("ID", "ie-amd-tech"));
    writer.write_event(Event::Start(techmd))?;
    write_mdwrap_open(writer, &[("MDTYPE", "OTHER"), ("OTHERMDTYPE", "dnx")])?;
    write_dnx_open(writer)?;

    if let Some(level) = metadata.preservation_level.as_deref() {
        write_section_open(writer, "preservationLevel")?;
        writer.write_event(Event::Start(BytesStart::new("record")))?;
        write_key_element(writer, "preservationLevelType", level)?;
        writer.write_event(Event::End(BytesEnd::new("record")))?;
        writer.write_event(Event::End(BytesEnd::new("section")))?;
    }

    if let Some(properties) = metadata
        .significant_properties
        .as_ref()
        .filter(|p| !p.is_empty())
    {
        write_section_open(writer, "significantProperties")?;
        for property in properties {
            writer.write_event(Event::Start(BytesStart::new("record")))?;
            write_key_element(writer, "significantPropertiesType", &property.property_type)?;
            write_key_element(writer, "significantPropertiesValue", &property.value)?;
            writer.write_event(Event::End(BytesEnd::new("record")))?;
        }
        writer.write_event(Event::End(BytesEnd::new("section")))?;
    }

    writer.write_event(Event::End(BytesEnd::new("dnx")))?;
    write_mdwrap_close(writer)?;
    writer.write_event(Event::End(BytesEnd::new("mets:techMD")))?;
    Ok(())
}

fn write_ie_rightsmd<W: Write>(writer: &mut Writer<W>, rights: &[&String]) -> Result<()> {
    let mut rightsmd = BytesStart::new("mets:rightsMD");
    rightsmd.push_attribute(("ID", "ie-amd-rights"));
    writer.write_event(Event::Start(rightsmd))?;
    write_mdwrap_open(writer, &[("MDTYPE", "OTHER"), ("OTHERMDTYPE", "dnx")])?;
    write_dnx_open(writer)?;

    write_section_open(writer, "accessRightsPolicy")?;
    for statement in rights {
        writer.write_event(Event::Start(BytesStart::new("record")))?;
        write_key_element(writer, "policyStatement", statement)?;
        writer.write_event(Event::End(BytesEnd::new("record")))?;
    }
    writer.write_event(Event::End(BytesEnd::new("section")))?;

    writer.write_event(Event::End(BytesEnd::new("dnx")))?;
    write_mdwrap_close(writer)?;
    writer.write_event(Event::End(BytesEnd::new("mets:rightsMD")))?;
    Ok(())
}

fn write_ie_sourcemd<W: Write>(writer: &mut Writer<W>, source: &XmlElement) -> Result<()> {
    let mut sourcemd = BytesStart::new("mets:sourceMD");
    sourcemd.push_attribute(("ID", "ie-amd-source-OTHER"));
    writer.write_event(Event::Start(sourcemd))?;
    write_mdwrap_open(writer, &[("MDTYPE", "OTHER"), ("OTHERMDTYPE", "Text")])?;
    write_fragment(writer, source, None)?;
    write_mdwrap_close(writer)?;
    writer.write_event(Event::End(BytesEnd::new("mets:sourceMD")))?;
    Ok(())
}

fn write_ie_digiprovmd<W: Write>(writer: &mut Writer<W>, provenance: &XmlElement) -> Result<()> {
    let mut digiprovmd = BytesStart::new("mets:digiprovMD");
    digiprovmd.push_attribute(("ID", "ie-amd-digiprov"));
    writer.write_event(Event::Start(digiprovmd))?;
    write_mdwrap_open(writer, &[("MDTYPE", "OTHER"), ("OTHERMDTYPE", "Text")])?;
    write_fragment(writer, provenance, None)?;
    write_mdwrap_close(writer)?;
    writer.write_event(Event::End(BytesEnd::new("mets:digiprovMD")))?;
    Ok(())
}

fn write_rep_amdsecs<W: Write>(
    writer: &mut Writer<W>,
    representations: &[Representation],
) -> Result<()> {
    for representation in representations {
        let amd_id = format!("rep{}-amd", representation.index);
        let tech_id = format!("rep{}-amd-tech", representation.index);

        let mut amdsec = BytesStart::new("mets:amdSec");
        amdsec.push_attribute(("ID", amd_id.as_str()));
        writer.write_event(Event::Start(amdsec))?;
        let mut techmd = BytesStart::new("mets:techMD");
        techmd.push_attribute(("ID", tech_id.as_str()));
        writer.write_event(Event::Start(techmd))?;
        write_mdwrap_open(writer, &[("MDTYPE", "OTHER"), ("OTHERMDTYPE", "dnx")])?;
        write_dnx_open(writer)?;

        write_section_open(writer, "generalRepCharacteristics")?;
        writer.write_event(Event::Start(BytesStart::new("record")))?;
        write_key_element(writer, "preservationType", &representation.preservation_type)?;
        write_key_element(writer, "usageType", &representation.usage_type)?;
        writer.write_event(Event::End(BytesEnd::new("record")))?;
        writer.write_event(Event::End(BytesEnd::new("section")))?;

        writer.write_event(Event::End(BytesEnd::new("dnx")))?;
        write_mdwrap_close(writer)?;
        writer.write_event(Event::End(BytesEnd::new("mets:techMD")))?;
        writer.write_event(Event::End(BytesEnd::new("mets:amdSec")))?;
    }
    Ok(())
}

fn write_file_amdsecs<W: Write>(
    writer: &mut Writer<W>,
    representations: &[Representation],
) -> Result<()> {
    for representation in representations {
        for file in &representation.files {
            let amd_id = format!("fid{}-{}-amd", representation.index, file.index);
            let tech_id = format!("fid{}-{}-amd-tech", representation.index, file.index);

            let mut amdsec = BytesStart::new("mets:amdSec");
            amdsec.push_attribute(("ID", amd_id.as_str()));
            writer.write_event(Event::Start(amdsec))?;
            let mut techmd = BytesStart::new("mets:techMD");
            techmd.push_attribute(("ID", tech_id.as_str()));
            writer.write_event(Event::Start(techmd))?;
            write_mdwrap_open(writer, &[("MDTYPE", "OTHER"), ("OTHERMDTYPE", "dnx")])?;
            write_dnx_open(writer)?;

            if !file.checksums.is_empty() {
                write_section_open(writer, "fileFixity")?;
                for (fixity_type, checksum) in &file.checksums {
                    writer.write_event(Event::Start(BytesStart::new("record")))?;
                    write_key_element(writer, "fixityType", fixity_type)?;
                    write_key_element(writer, "fixityValue", checksum)?;
                    writer.write_event(Event::End(BytesEnd::new("record")))?;
                }
                writer.write_event(Event::End(BytesEnd::new("section")))?;
            }

            writer.write_event(Event::End(BytesEnd::new("dnx")))?;
            write_mdwrap_close(writer)?;
            writer.write_event(Event::End(BytesEnd::new("mets:techMD")))?;
            writer.write_event(Event::End(BytesEnd::new("mets:amdSec")))?;
        }
    }
    Ok(())
}

fn write_filesec<W: Write>(
    writer: &mut Writer<W>,
    representations: &[Representation],
) -> Result<()> {
    writer.write_event(Event::Start(BytesStart::new("mets:fileSec")))?;
    for representation in representations {
        let grp_id = format!("rep{}", representation.index);
        let grp_adm = format!("rep{}-amd", representation.index);
        let mut filegrp = BytesStart::new("mets:fileGrp");
        filegrp.push_attribute(("USE", representation.usage_type.as_str()));
        filegrp.push_attribute(("ID", grp_id.as_str()));
        filegrp.push_attribute(("ADMID", grp_adm.as_str()));
        writer.write_event(Event::Start(filegrp))?;

        for file in &representation.files {
            let file_id = format!("fid{}-{}", representation.index, file.index);
            let file_adm = format!("fid{}-{}-amd", representation.index, file.index);
            let mut node = BytesStart::new("mets:file");
            node.push_attribute(("ID", file_id.as_str()));
            node.push_attribute(("ADMID", file_adm.as_str()));
            writer.write_event(Event::Start(node))?;

            let mut flocat = BytesStart::new("mets:FLocat");
            flocat.push_attribute(("LOCTYPE", file.loctype.as_str()));
            flocat.push_attribute(("xlink:href", strip_root_component(&file.href)));
            writer.write_event(Event::Empty(flocat))?;

            writer.write_event(Event::End(BytesEnd::new("mets:file")))?;
        }
        writer.write_event(Event::End(BytesEnd::new("mets:fileGrp")))?;
    }
    writer.write_event(Event::End(BytesEnd::new("mets:fileSec")))?;
    Ok(())
}

/// File hrefs are IP-relative; the SIP stores streams without the
/// leading payload directory.
fn strip_root_component(href: &str) -> &str {
    href.split_once('/').map(|(_, rest)| rest).unwrap_or(href)
}

fn write_mdwrap_open<W: Write>(writer: &mut Writer<W>, attrs: &[(&str, &str)]) -> Result<()> {
    let mut mdwrap = BytesStart::new("mets:mdWrap");
    for attr in attrs {
        mdwrap.push_attribute(*attr);
    }
    writer.write_event(Event::Start(mdwrap))?;
    writer.write_event(Event::Start(BytesStart::new("mets:xmlData")))?;
    Ok(())
}

fn write_mdwrap_close<W: Write>(writer: &mut Writer<W>) -> Result<()> {
    writer.write_event(Event::End(BytesEnd::new("mets:xmlData")))?;
    writer.write_event(Event::End(BytesEnd::new("mets:mdWrap")))?;
    Ok(())
}

fn write_dnx_open<W: Write>(writer: &mut Writer<W>) -> Result<()> {
    let mut dnx = BytesStart::new("dnx");
    dnx.push_attribute(("xmlns", DNX_NS));
    writer.write_event(Event::Start(dnx))?;
    Ok(())
}

fn write_section_open<W: Write>(writer: &mut Writer<W>, id: &str) -> Result<()> {
    let mut section = BytesStart::new("section");
    section.push_attribute(("id", id));
    writer.write_event(Event::Start(section))?;
    Ok(())
}

fn text_entry(ns: &str, name: &str, value: &str) -> XmlElement {
    let mut element = XmlElement::new(name, Some(ns.to_string()));
    element.children.push(XmlNode::Text(value.to_string()));
    element
}
