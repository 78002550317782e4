//! SIP layout planning, writing, and the fixity manifest.

use std::path::{Path, PathBuf};

use sha2::{Digest, Sha512};
use tracing::debug;

use sip_model::{GeneratedDocument, LayoutSource, PreservationMetadata, SipLayout};

use crate::error::AssembleError;

const STREAMS_DIR: &str = "content/streams";
const FIXITY_MANIFEST: &str = "manifest-sha512.txt";

/// Plan the full layout: every generated document at its fixed relative
/// path plus every payload file under `content/streams/` (with the
/// leading payload directory stripped, mirroring the file-section hrefs).
pub fn plan_layout(
    sip_root: &Path,
    ip_path: &Path,
    metadata: &PreservationMetadata,
    documents: &[GeneratedDocument],
) -> SipLayout {
    let mut layout = SipLayout::new(sip_root.to_path_buf());
    for document in documents {
        layout.push_generated(document.kind.sip_relative_path(), document.kind);
    }
    for representation in &metadata.representations {
        for file in &representation.files {
            let stripped = file
                .href
                .split_once('/')
                .map(|(_, rest)| rest)
                .unwrap_or(&file.href);
            layout.push_copy(
                Path::new(STREAMS_DIR).join(stripped),
                ip_path.join(&file.href),
            );
        }
    }
    layout
}

/// Materialize the layout. The target directory must not already exist.
/// On error the partially written layout is left in place.
pub fn write_layout(
    layout: &SipLayout,
    documents: &[GeneratedDocument],
) -> Result<usize, AssembleError> {
    if layout.root.exists() {
        return Err(AssembleError::TargetExists {
            path: layout.root.clone(),
        });
    }
    create_dir(&layout.root)?;

    for entry in &layout.entries {
        let target = layout.root.join(&entry.relative);
        if let Some(parent) = target.parent() {
            create_dir(parent)?;
        }
        match &entry.source {
            LayoutSource::Copy(source) => {
                std::fs::copy(source, &target).map_err(|error| AssembleError::Copy {
                    from: source.clone(),
                    to: target.clone(),
                    source: error,
                })?;
            }
            LayoutSource::Generated(kind) => {
                let document = documents.iter().find(|d| d.kind == *kind).ok_or_else(|| {
                    AssembleError::UnknownDocument {
                        kind: kind.to_string(),
                    }
                })?;
                std::fs::write(&target, &document.bytes).map_err(|error| {
                    AssembleError::Write {
                        path: target.clone(),
                        source: error,
                    }
                })?;
            }
        }
        debug!(path = %target.display(), "wrote SIP entry");
    }
    Ok(layout.entries.len())
}

/// Write `manifest-sha512.txt` over everything the layout materialized,
/// one `<hex> <sip-relative-path>` line per file, sorted by path.
pub fn write_fixity_manifest(layout: &SipLayout) -> Result<PathBuf, AssembleError> {
    let mut relatives: Vec<&PathBuf> = layout.entries.iter().map(|e| &e.relative).collect();
    relatives.sort();

    let mut lines = String::new();
    for relative in relatives {
        let path = layout.root.join(relative);
        let bytes = std::fs::read(&path).map_err(|error| AssembleError::Fixity {
            path: path.clone(),
            source: error,
        })?;
        let digest = Sha512::digest(&bytes);
        lines.push_str(&hex::encode(digest));
        lines.push(' ');
        lines.push_str(&relative.to_string_lossy().replace('\\', "/"));
        lines.push('\n');
    }

    let manifest_path = layout.root.join(FIXITY_MANIFEST);
    std::fs::write(&manifest_path, lines).map_err(|error| AssembleError::Write {
        path: manifest_path.clone(),
        source: error,
    })?;
    Ok(manifest_path)
}

fn create_dir(path: &Path) -> Result<(), AssembleError> {
    std::fs::create_dir_all(path).map_err(|error| AssembleError::CreateDir {
        path: path.to_path_buf(),
        source: error,
    })
}
