//! Payload directory scanning.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use sip_model::PayloadScan;

use crate::error::{IngestError, Result};

const PAYLOAD_DIR: &str = "data";
const PRESERVATION_MASTER: &str = "preservation_master";

/// Scan `data/` for payload files, grouped by representation category.
///
/// `data/preservation_master` is required. `modified_master` and
/// `derivative_copy` hold one subdirectory per additional representation.
pub fn scan_payload(ip_root: &Path) -> Result<PayloadScan> {
    let payload_root = ip_root.join(PAYLOAD_DIR);
    let master_dir = payload_root.join(PRESERVATION_MASTER);
    if !master_dir.is_dir() {
        return Err(IngestError::MissingRequiredFile { path: master_dir });
    }

    let mut sizes = BTreeMap::new();
    let preservation_master = collect_files(ip_root, &master_dir, &mut sizes)?;
    let mut modified_master = BTreeMap::new();
    let mut derivative_copy = BTreeMap::new();

    for (category, target) in [
        ("modified_master", &mut modified_master),
        ("derivative_copy", &mut derivative_copy),
    ] {
        let category_dir = payload_root.join(category);
        if !category_dir.is_dir() {
            continue;
        }
        let mut reps: Vec<PathBuf> = read_dir(&category_dir)?
            .into_iter()
            .filter(|path| path.is_dir())
            .collect();
        reps.sort();
        for rep in reps {
            let rep_name = rep
                .file_name()
                .and_then(|name| name.to_str())
                .unwrap_or_default()
                .to_string();
            let files = collect_files(ip_root, &rep, &mut sizes)?;
            target.insert(rep_name, files);
        }
    }

    Ok(PayloadScan {
        preservation_master,
        modified_master,
        derivative_copy,
        sizes,
    })
}

/// Recursively collect IP-relative file paths under `dir`, sorted,
/// recording file sizes along the way.
fn collect_files(
    ip_root: &Path,
    dir: &Path,
    sizes: &mut BTreeMap<String, u64>,
) -> Result<Vec<String>> {
    let mut stack = vec![dir.to_path_buf()];
    let mut files = Vec::new();
    while let Some(current) = stack.pop() {
        for path in read_dir(&current)? {
            if path.is_dir() {
                stack.push(path);
            } else if path.is_file() {
                let relative = path
                    .strip_prefix(ip_root)
                    .unwrap_or(&path)
                    .to_string_lossy()
                    .replace('\\', "/");
                if let Ok(meta) = path.metadata() {
                    sizes.insert(relative.clone(), meta.len());
                }
                files.push(relative);
            }
        }
    }
    files.sort();
    Ok(files)
}

fn read_dir(dir: &Path) -> Result<Vec<PathBuf>> {
    let entries = std::fs::read_dir(dir).map_err(|source| IngestError::Read {
        path: dir.to_path_buf(),
        source,
    })?;
    let mut paths = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|source| IngestError::Read {
            path: dir.to_path_buf(),
            source,
        })?;
        paths.push(entry.path());
    }
    Ok(paths)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn touch(path: &Path) {
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, b"payload").unwrap();
    }

    #[test]
    fn scans_all_representation_categories() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        touch(&root.join("data/preservation_master/img/a.tif"));
        touch(&root.join("data/preservation_master/b.tif"));
        touch(&root.join("data/modified_master/rep1/a.jpg"));
        touch(&root.join("data/modified_master/rep2/a.jpg"));
        touch(&root.join("data/derivative_copy/thumbs/a.png"));

        let scan = scan_payload(root).unwrap();
        assert_eq!(
            scan.preservation_master,
            vec![
                "data/preservation_master/b.tif".to_string(),
                "data/preservation_master/img/a.tif".to_string(),
            ]
        );
        assert_eq!(scan.modified_master.len(), 2);
        assert_eq!(scan.derivative_copy.len(), 1);
        assert_eq!(scan.file_count(), 5);
        assert_eq!(
            scan.sizes.get("data/preservation_master/b.tif"),
            Some(&7u64)
        );
    }

    #[test]
    fn missing_preservation_master_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("data")).unwrap();
        let error = scan_payload(dir.path()).unwrap_err();
        assert!(matches!(error, IngestError::MissingRequiredFile { .. }));
    }
}
