//! The loaded, read-only view of an Information Package.

use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::metadata::SignificantProperty;
use crate::xml::XmlElement;

/// Parsed `bag-info.txt` metadata. Keys may repeat; repeated keys
/// accumulate values in file order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BagInfo {
    entries: BTreeMap<String, Vec<String>>,
}

impl BagInfo {
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.entries.entry(key.into()).or_default().push(value.into());
    }

    /// First value for a key, when present.
    pub fn first(&self, key: &str) -> Option<&str> {
        self.entries
            .get(key)
            .and_then(|values| values.first())
            .map(String::as_str)
    }

    /// All values for a key, possibly empty.
    pub fn all(&self, key: &str) -> &[String] {
        self.entries.get(key).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }
}

/// One fixity manifest (`manifest-<alg>.txt`): checksum per IP-relative path.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FixityManifest {
    pub algorithm: String,
    /// IP-relative path -> checksum.
    pub checksums: BTreeMap<String, String>,
}

/// Payload files discovered under `data/`, grouped by representation
/// category. Paths are IP-relative and sorted.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PayloadScan {
    pub preservation_master: Vec<String>,
    /// Representation directory name -> files, for modified masters.
    pub modified_master: BTreeMap<String, Vec<String>>,
    /// Representation directory name -> files, for derivative copies.
    pub derivative_copy: BTreeMap<String, Vec<String>>,
    /// File size per IP-relative path, when the file was stat-able.
    pub sizes: BTreeMap<String, u64>,
}

impl PayloadScan {
    pub fn file_count(&self) -> usize {
        self.preservation_master.len()
            + self.modified_master.values().map(Vec::len).sum::<usize>()
            + self.derivative_copy.values().map(Vec::len).sum::<usize>()
    }
}

/// A validated, loaded Information Package. Immutable once loaded;
/// this crate never writes into it.
#[derive(Debug, Clone)]
pub struct InformationPackage {
    /// Absolute or mount-relative path to the IP directory.
    pub path: PathBuf,
    pub bag_info: BagInfo,
    /// Fixity manifests keyed by algorithm name (lower case).
    pub manifests: BTreeMap<String, FixityManifest>,
    pub payload: PayloadScan,
    /// `meta/dc.xml`, when present and well-formed.
    pub descriptive: Option<XmlElement>,
    /// `meta/source_metadata.xml`, when present and well-formed.
    pub source_metadata: Option<XmlElement>,
    /// `meta/significant_properties.xml`, parsed. `None` means the file
    /// is absent; an empty vec means it names no properties.
    pub significant_properties: Option<Vec<SignificantProperty>>,
    /// `meta/events.xml` provenance events, when present.
    pub events: Option<XmlElement>,
}
