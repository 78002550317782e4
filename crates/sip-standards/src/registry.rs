//! Schema registry: document kind -> ordered schema references.

use std::collections::{BTreeMap, BTreeSet};

use sip_model::{DocumentKind, SchemaReference};

use crate::config::BuilderConfig;

/// Pure configuration lookup for the validator. Built once from the
/// startup configuration; no side effects.
#[derive(Debug, Clone)]
pub struct SchemaRegistry {
    entries: BTreeMap<DocumentKind, Vec<SchemaReference>>,
    mandatory: BTreeSet<DocumentKind>,
}

impl SchemaRegistry {
    pub fn from_config(config: &BuilderConfig) -> Self {
        let mut entries = BTreeMap::new();
        if config.mets.active {
            entries.insert(
                DocumentKind::PreservationMets,
                config.mets.references.clone(),
            );
        }
        if config.dcxml.active {
            entries.insert(DocumentKind::DublinCore, config.dcxml.references.clone());
        }
        // Significant properties have no schema configuration surface;
        // validation for that kind is always skipped.
        Self {
            entries,
            mandatory: config.mandatory.clone(),
        }
    }

    /// Ordered references for a kind, primary first. Empty when
    /// validation for the kind is deactivated or unconfigured.
    pub fn resolve(&self, kind: DocumentKind) -> &[SchemaReference] {
        self.entries.get(&kind).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Whether a failed document of this kind fails the whole build.
    pub fn is_mandatory(&self, kind: DocumentKind) -> bool {
        self.mandatory.contains(&kind)
    }

    /// All kinds with at least one configured reference.
    pub fn configured_kinds(&self) -> impl Iterator<Item = DocumentKind> + '_ {
        self.entries.keys().copied()
    }
}
