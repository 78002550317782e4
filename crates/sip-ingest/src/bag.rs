//! `bag-info.txt` parsing.

use std::path::Path;

use sip_model::BagInfo;

use crate::error::{IngestError, Result};

/// Load `bag-info.txt`. The file is required; every `key: value` line is
/// kept, repeated keys accumulate, lines without a separator are ignored.
pub fn load_bag_info(path: &Path) -> Result<BagInfo> {
    let contents = std::fs::read_to_string(path).map_err(|source| {
        if source.kind() == std::io::ErrorKind::NotFound {
            IngestError::MissingRequiredFile {
                path: path.to_path_buf(),
            }
        } else {
            IngestError::Read {
                path: path.to_path_buf(),
                source,
            }
        }
    })?;

    let mut info = BagInfo::default();
    for line in contents.lines() {
        let Some((key, value)) = line.split_once(':') else {
            continue;
        };
        let key = key.trim();
        if key.is_empty() {
            continue;
        }
        info.insert(key, value.trim());
    }
    Ok(info)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_bag_info(contents: &str) -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        let mut file = std::fs::File::create(dir.path().join("bag-info.txt")).unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        dir
    }

    #[test]
    fn parses_keys_and_repeated_values() {
        let dir = write_bag_info(
            "DC-Title: A Collection\n\
             DC-Creator: First Author\n\
             DC-Creator: Second Author\n\
             not a metadata line\n\
             External-Identifier: id-1\n",
        );
        let info = load_bag_info(&dir.path().join("bag-info.txt")).unwrap();
        assert_eq!(info.first("DC-Title"), Some("A Collection"));
        assert_eq!(info.all("DC-Creator").len(), 2);
        assert_eq!(info.len(), 3);
    }

    #[test]
    fn missing_file_is_a_required_file_error() {
        let dir = tempfile::tempdir().unwrap();
        let error = load_bag_info(&dir.path().join("bag-info.txt")).unwrap_err();
        assert!(matches!(error, IngestError::MissingRequiredFile { .. }));
    }
}
