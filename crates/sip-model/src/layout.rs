//! Planned physical layout of a SIP directory.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::document::DocumentKind;

/// Where a layout entry's content comes from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum LayoutSource {
    /// Copy from a source file (payload content).
    Copy(PathBuf),
    /// Bytes of a generated document.
    Generated(DocumentKind),
}

/// One file in the SIP layout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayoutEntry {
    /// Path relative to the SIP root.
    pub relative: PathBuf,
    pub source: LayoutSource,
}

/// The full layout plan: target root plus every file to materialize.
/// Computed before any write so assembly failures leave an inspectable,
/// well-defined partial state.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SipLayout {
    pub root: PathBuf,
    pub entries: Vec<LayoutEntry>,
}

impl SipLayout {
    pub fn new(root: PathBuf) -> Self {
        Self {
            root,
            entries: Vec::new(),
        }
    }

    pub fn push_copy(&mut self, relative: impl Into<PathBuf>, source: impl Into<PathBuf>) {
        self.entries.push(LayoutEntry {
            relative: relative.into(),
            source: LayoutSource::Copy(source.into()),
        });
    }

    pub fn push_generated(&mut self, relative: impl Into<PathBuf>, kind: DocumentKind) {
        self.entries.push(LayoutEntry {
            relative: relative.into(),
            source: LayoutSource::Generated(kind),
        });
    }
}
