//! Normalized preservation metadata extracted from an IP.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::ip::BagInfo;
use crate::xml::XmlElement;

/// A single render-critical technical characteristic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignificantProperty {
    pub property_type: String,
    pub value: String,
}

/// One payload file within a representation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PayloadFile {
    /// 1-based position within the representation.
    pub index: usize,
    /// IP-relative location.
    pub href: String,
    /// Locator type identifier for the file section.
    pub loctype: String,
    /// Fixity algorithm (upper case) -> checksum. May be empty for files
    /// whose manifest entries were malformed.
    pub checksums: BTreeMap<String, String>,
    pub size: Option<u64>,
}

/// One representation of the intellectual entity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Representation {
    /// 1-based position within the IE.
    pub index: usize,
    /// `PRESERVATION_MASTER`, `MODIFIED_MASTER`, `MODIFIED_MASTER_02`, ...
    pub preservation_type: String,
    pub usage_type: String,
    pub files: Vec<PayloadFile>,
}

/// The common in-memory model all synthesizers consume.
///
/// Optional sections use `Option` as the explicit absent marker: `None`
/// means the IP carried no such metadata, which synthesizers translate
/// into omitted output sections. For significant properties the inner
/// vec may be empty, meaning the IP explicitly declares none.
#[derive(Debug, Clone, Default)]
pub struct PreservationMetadata {
    /// Verbatim bag metadata; descriptive key mapping happens per document.
    pub bag_info: BagInfo,
    /// Descriptive Dublin Core record from `meta/dc.xml`.
    pub descriptive: Option<XmlElement>,
    /// Source metadata tree to embed verbatim.
    pub source_metadata: Option<XmlElement>,
    pub significant_properties: Option<Vec<SignificantProperty>>,
    /// Provenance events tree from `meta/events.xml`.
    pub provenance: Option<XmlElement>,
    pub preservation_level: Option<String>,
    pub representations: Vec<Representation>,
}

impl PreservationMetadata {
    /// Total payload files across representations.
    pub fn file_count(&self) -> usize {
        self.representations.iter().map(|r| r.files.len()).sum()
    }
}
