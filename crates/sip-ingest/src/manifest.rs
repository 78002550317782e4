//! Fixity manifest (`manifest-<alg>.txt`) loading.

use std::collections::BTreeMap;
use std::path::Path;

use sip_model::FixityManifest;

use crate::error::{IngestError, Result};

const MANIFEST_PREFIX: &str = "manifest-";
const MANIFEST_SUFFIX: &str = ".txt";

/// Result of scanning an IP for fixity manifests: the parsed manifests
/// keyed by algorithm, plus warnings for tolerated malformed entries.
#[derive(Debug, Default)]
pub struct ManifestScan {
    pub manifests: BTreeMap<String, FixityManifest>,
    pub warnings: Vec<String>,
}

/// Load every `manifest-<alg>.txt` in the IP root. At least one manifest
/// is required. Lines that cannot be split into checksum and path are
/// recorded as warnings, not errors.
pub fn load_manifests(ip_root: &Path) -> Result<ManifestScan> {
    let mut scan = ManifestScan::default();

    let entries = std::fs::read_dir(ip_root).map_err(|source| IngestError::Read {
        path: ip_root.to_path_buf(),
        source,
    })?;
    let mut paths: Vec<_> = entries
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| path.is_file())
        .filter(|path| {
            path.file_name()
                .and_then(|name| name.to_str())
                .is_some_and(|name| {
                    name.starts_with(MANIFEST_PREFIX) && name.ends_with(MANIFEST_SUFFIX)
                })
        })
        .collect();
    paths.sort();

    for path in paths {
        let name = path
            .file_name()
            .and_then(|name| name.to_str())
            .unwrap_or_default();
        let algorithm = name[MANIFEST_PREFIX.len()..name.len() - MANIFEST_SUFFIX.len()]
            .to_ascii_lowercase();
        if algorithm.is_empty() {
            continue;
        }
        let manifest = load_manifest_file(&path, &algorithm, &mut scan.warnings)?;
        scan.manifests.insert(algorithm, manifest);
    }

    if scan.manifests.is_empty() {
        return Err(IngestError::MissingManifest {
            path: ip_root.to_path_buf(),
        });
    }
    Ok(scan)
}

fn load_manifest_file(
    path: &Path,
    algorithm: &str,
    warnings: &mut Vec<String>,
) -> Result<FixityManifest> {
    let contents = std::fs::read_to_string(path).map_err(|source| IngestError::Read {
        path: path.to_path_buf(),
        source,
    })?;

    let mut checksums = BTreeMap::new();
    for (line_no, line) in contents.lines().enumerate() {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        match trimmed.split_once(char::is_whitespace) {
            Some((checksum, file)) if !checksum.is_empty() && !file.trim().is_empty() => {
                checksums.insert(file.trim().to_string(), checksum.to_string());
            }
            _ => {
                tracing::warn!(
                    manifest = %path.display(),
                    line = line_no + 1,
                    "skipping malformed manifest entry"
                );
                warnings.push(format!(
                    "malformed entry in {} line {}: '{}'",
                    path.display(),
                    line_no + 1,
                    trimmed
                ));
            }
        }
    }

    Ok(FixityManifest {
        algorithm: algorithm.to_string(),
        checksums,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write(dir: &Path, name: &str, contents: &str) {
        std::fs::write(dir.join(name), contents).unwrap();
    }

    #[test]
    fn loads_manifests_per_algorithm() {
        let dir = tempfile::tempdir().unwrap();
        write(
            dir.path(),
            "manifest-md5.txt",
            "d41d8cd98f data/preservation_master/a.tif\n",
        );
        write(
            dir.path(),
            "manifest-sha512.txt",
            "cf83e13 data/preservation_master/a.tif\n",
        );
        let scan = load_manifests(dir.path()).unwrap();
        assert_eq!(scan.manifests.len(), 2);
        assert_eq!(
            scan.manifests["md5"]
                .checksums
                .get("data/preservation_master/a.tif")
                .map(String::as_str),
            Some("d41d8cd98f")
        );
        assert!(scan.warnings.is_empty());
    }

    #[test]
    fn malformed_entries_warn_but_do_not_fail() {
        let dir = tempfile::tempdir().unwrap();
        write(
            dir.path(),
            "manifest-md5.txt",
            "abc123 data/preservation_master/a.tif\nnot-a-valid-entry\n",
        );
        let scan = load_manifests(dir.path()).unwrap();
        assert_eq!(scan.warnings.len(), 1);
        assert_eq!(scan.manifests["md5"].checksums.len(), 1);
    }

    #[test]
    fn no_manifest_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let error = load_manifests(dir.path()).unwrap_err();
        assert!(matches!(error, IngestError::MissingManifest { .. }));
    }
}
