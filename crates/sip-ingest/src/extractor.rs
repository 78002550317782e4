//! IP loading and normalization into [`PreservationMetadata`].

use std::collections::BTreeMap;
use std::path::Path;

use sip_model::{
    FixityManifest, InformationPackage, PayloadFile, PayloadScan, PreservationMetadata,
    Representation,
};
use tracing::{debug, info};

use crate::bag::load_bag_info;
use crate::error::{IngestError, Result};
use crate::manifest::load_manifests;
use crate::payload::scan_payload;
use crate::sigprops::parse_significant_properties;
use crate::xml::load_xml_file;

const PATH_BAG_INFO: &str = "bag-info.txt";
const PATH_DC_XML: &str = "meta/dc.xml";
const PATH_SOURCE_METADATA: &str = "meta/source_metadata.xml";
const PATH_SIGNIFICANT_PROPERTIES: &str = "meta/significant_properties.xml";
const PATH_EVENTS: &str = "meta/events.xml";

const DEFAULT_USAGE_TYPE: &str = "VIEW";
const DEFAULT_LOCTYPE: &str = "URL";

/// Everything extraction produces: the loaded package, the normalized
/// metadata model, and warnings for tolerated irregularities.
#[derive(Debug)]
pub struct Extraction {
    pub package: InformationPackage,
    pub metadata: PreservationMetadata,
    pub warnings: Vec<String>,
}

/// Load and normalize an IP in one step.
pub fn extract(ip_path: &Path) -> Result<Extraction> {
    let (package, warnings) = load_ip(ip_path)?;
    let metadata = normalize(&package);
    info!(
        path = %ip_path.display(),
        files = metadata.file_count(),
        representations = metadata.representations.len(),
        "extracted preservation metadata"
    );
    Ok(Extraction {
        package,
        metadata,
        warnings,
    })
}

/// Load the structural and embedded metadata of an IP.
///
/// `bag-info.txt`, at least one fixity manifest, and the
/// `data/preservation_master` payload directory are required; everything
/// under `meta/` is optional. Unreadable optional metadata degrades to an
/// absent field with a warning.
pub fn load_ip(ip_path: &Path) -> Result<(InformationPackage, Vec<String>)> {
    if !ip_path.is_dir() {
        return Err(IngestError::PackageNotFound {
            path: ip_path.to_path_buf(),
        });
    }

    let bag_info = load_bag_info(&ip_path.join(PATH_BAG_INFO))?;
    let manifest_scan = load_manifests(ip_path)?;
    let payload = scan_payload(ip_path)?;

    let mut warnings = manifest_scan.warnings;
    let descriptive = load_optional_xml(ip_path, PATH_DC_XML, &mut warnings);
    let source_metadata = load_optional_xml(ip_path, PATH_SOURCE_METADATA, &mut warnings);
    let significant_properties =
        load_optional_xml(ip_path, PATH_SIGNIFICANT_PROPERTIES, &mut warnings)
            .map(|tree| parse_significant_properties(&tree));
    let events = load_optional_xml(ip_path, PATH_EVENTS, &mut warnings);

    debug!(
        path = %ip_path.display(),
        manifests = manifest_scan.manifests.len(),
        payload_files = payload.file_count(),
        "loaded information package"
    );

    Ok((
        InformationPackage {
            path: ip_path.to_path_buf(),
            bag_info,
            manifests: manifest_scan.manifests,
            payload,
            descriptive,
            source_metadata,
            significant_properties,
            events,
        },
        warnings,
    ))
}

fn load_optional_xml(
    ip_path: &Path,
    relative: &str,
    warnings: &mut Vec<String>,
) -> Option<sip_model::XmlElement> {
    let path = ip_path.join(relative);
    if !path.is_file() {
        return None;
    }
    match load_xml_file(&path) {
        Ok(tree) => Some(tree),
        Err(error) => {
            warnings.push(format!("ignoring unreadable metadata file: {error}"));
            None
        }
    }
}

/// Normalize a loaded package into the common metadata model.
fn normalize(package: &InformationPackage) -> PreservationMetadata {
    PreservationMetadata {
        bag_info: package.bag_info.clone(),
        descriptive: package.descriptive.clone(),
        source_metadata: package.source_metadata.clone(),
        significant_properties: package.significant_properties.clone(),
        provenance: package.events.clone(),
        preservation_level: package
            .bag_info
            .first("Preservation-Level")
            .map(str::to_string),
        representations: build_representations(&package.payload, &package.manifests),
    }
}

/// Number representations and attach per-file fixity from every manifest
/// algorithm. The preservation master always comes first; further
/// representations get `_NN` suffixes from the second onward.
fn build_representations(
    payload: &PayloadScan,
    manifests: &BTreeMap<String, FixityManifest>,
) -> Vec<Representation> {
    let mut representations = Vec::new();
    let mut index = 1usize;

    representations.push(Representation {
        index,
        preservation_type: "PRESERVATION_MASTER".to_string(),
        usage_type: DEFAULT_USAGE_TYPE.to_string(),
        files: build_files(&payload.preservation_master, payload, manifests),
    });

    for (category, base_name) in [
        (&payload.modified_master, "MODIFIED_MASTER"),
        (&payload.derivative_copy, "DERIVATIVE_COPY"),
    ] {
        for (rep_number, files) in category.values().enumerate() {
            index += 1;
            let preservation_type = if rep_number == 0 {
                base_name.to_string()
            } else {
                format!("{}_{:02}", base_name, rep_number + 1)
            };
            representations.push(Representation {
                index,
                preservation_type,
                usage_type: DEFAULT_USAGE_TYPE.to_string(),
                files: build_files(files, payload, manifests),
            });
        }
    }

    representations
}

fn build_files(
    hrefs: &[String],
    payload: &PayloadScan,
    manifests: &BTreeMap<String, FixityManifest>,
) -> Vec<PayloadFile> {
    hrefs
        .iter()
        .enumerate()
        .map(|(position, href)| {
            let mut checksums = BTreeMap::new();
            for manifest in manifests.values() {
                if let Some(checksum) = manifest.checksums.get(href) {
                    checksums.insert(manifest.algorithm.to_uppercase(), checksum.clone());
                }
            }
            PayloadFile {
                index: position + 1,
                href: href.clone(),
                loctype: DEFAULT_LOCTYPE.to_string(),
                checksums,
                size: payload.sizes.get(href).copied(),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn representation_numbering_adds_suffix_from_second() {
        let mut payload = PayloadScan::default();
        payload
            .preservation_master
            .push("data/preservation_master/a.tif".to_string());
        payload.modified_master.insert(
            "alpha".to_string(),
            vec!["data/modified_master/alpha/a.jpg".to_string()],
        );
        payload.modified_master.insert(
            "beta".to_string(),
            vec!["data/modified_master/beta/a.jpg".to_string()],
        );

        let reps = build_representations(&payload, &BTreeMap::new());
        let names: Vec<&str> = reps.iter().map(|r| r.preservation_type.as_str()).collect();
        assert_eq!(
            names,
            vec!["PRESERVATION_MASTER", "MODIFIED_MASTER", "MODIFIED_MASTER_02"]
        );
        assert_eq!(reps[2].index, 3);
    }

    #[test]
    fn files_carry_checksums_from_every_algorithm() {
        let mut payload = PayloadScan::default();
        let href = "data/preservation_master/a.tif".to_string();
        payload.preservation_master.push(href.clone());
        payload.sizes.insert(href.clone(), 42);

        let mut manifests = BTreeMap::new();
        for (alg, value) in [("md5", "aaa"), ("sha512", "bbb")] {
            manifests.insert(
                alg.to_string(),
                FixityManifest {
                    algorithm: alg.to_string(),
                    checksums: BTreeMap::from([(href.clone(), value.to_string())]),
                },
            );
        }

        let reps = build_representations(&payload, &manifests);
        let file = &reps[0].files[0];
        assert_eq!(file.checksums.get("MD5").map(String::as_str), Some("aaa"));
        assert_eq!(file.checksums.get("SHA512").map(String::as_str), Some("bbb"));
        assert_eq!(file.size, Some(42));
        assert_eq!(file.index, 1);
    }

    #[test]
    fn file_without_manifest_entry_has_no_checksums() {
        let mut payload = PayloadScan::default();
        payload
            .preservation_master
            .push("data/preservation_master/a.tif".to_string());
        let manifests = BTreeMap::from([(
            "md5".to_string(),
            FixityManifest {
                algorithm: "md5".to_string(),
                checksums: BTreeMap::new(),
            },
        )]);
        let reps = build_representations(&payload, &manifests);
        assert!(reps[0].files[0].checksums.is_empty());
    }
}
