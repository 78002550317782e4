//! Integration tests for IP loading and extraction.

use std::path::Path;

use sip_ingest::{IngestError, extract};

fn write(root: &Path, relative: &str, contents: &str) {
    let path = root.join(relative);
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(path, contents).unwrap();
}

fn fixture_ip(root: &Path) {
    write(
        root,
        "bag-info.txt",
        "Source-Organization: university-library\n\
         Origin-System-Identifier: repositorium\n\
         External-Identifier: obj-0001\n\
         DC-Title: Annual Report 1904\n\
         Preservation-Level: high\n",
    );
    write(
        root,
        "manifest-md5.txt",
        "0cc175b9c0f1b6a831c399e269772661 data/preservation_master/report.tif\n",
    );
    write(root, "data/preservation_master/report.tif", "image bytes");
    write(
        root,
        "meta/dc.xml",
        r#"<dc:record xmlns:dc="http://purl.org/dc/elements/1.1/">
            <dc:title>Annual Report 1904</dc:title>
        </dc:record>"#,
    );
    write(
        root,
        "meta/significant_properties.xml",
        r#"<premis xmlns="http://www.loc.gov/premis/v3">
            <object>
                <significantProperties>
                    <significantPropertiesType>content</significantPropertiesType>
                    <significantPropertiesValue>embedded text layer</significantPropertiesValue>
                </significantProperties>
            </object>
        </premis>"#,
    );
}

#[test]
fn extracts_complete_package() {
    let dir = tempfile::tempdir().unwrap();
    fixture_ip(dir.path());

    let extraction = extract(dir.path()).unwrap();
    assert!(extraction.warnings.is_empty());

    let metadata = &extraction.metadata;
    assert_eq!(metadata.preservation_level.as_deref(), Some("high"));
    assert_eq!(metadata.representations.len(), 1);
    let file = &metadata.representations[0].files[0];
    assert_eq!(file.href, "data/preservation_master/report.tif");
    assert_eq!(
        file.checksums.get("MD5").map(String::as_str),
        Some("0cc175b9c0f1b6a831c399e269772661")
    );
    assert!(metadata.descriptive.is_some());
    assert_eq!(
        metadata.significant_properties.as_ref().map(Vec::len),
        Some(1)
    );
    assert!(metadata.source_metadata.is_none());
    assert!(metadata.provenance.is_none());
}

#[test]
fn missing_bag_info_aborts_extraction() {
    let dir = tempfile::tempdir().unwrap();
    fixture_ip(dir.path());
    std::fs::remove_file(dir.path().join("bag-info.txt")).unwrap();

    let error = extract(dir.path()).unwrap_err();
    assert!(matches!(error, IngestError::MissingRequiredFile { .. }));
}

#[test]
fn missing_manifest_aborts_extraction() {
    let dir = tempfile::tempdir().unwrap();
    fixture_ip(dir.path());
    std::fs::remove_file(dir.path().join("manifest-md5.txt")).unwrap();

    let error = extract(dir.path()).unwrap_err();
    assert!(matches!(error, IngestError::MissingManifest { .. }));
}

#[test]
fn unreadable_optional_metadata_degrades_to_absent() {
    let dir = tempfile::tempdir().unwrap();
    fixture_ip(dir.path());
    write(dir.path(), "meta/dc.xml", "<broken><xml");

    let extraction = extract(dir.path()).unwrap();
    assert!(extraction.metadata.descriptive.is_none());
    assert_eq!(extraction.warnings.len(), 1);
    assert!(extraction.warnings[0].contains("meta/dc.xml"));
}

#[test]
fn empty_significant_properties_differ_from_absent() {
    let dir = tempfile::tempdir().unwrap();
    fixture_ip(dir.path());
    write(
        dir.path(),
        "meta/significant_properties.xml",
        r#"<premis xmlns="http://www.loc.gov/premis/v3"><object/></premis>"#,
    );

    let extraction = extract(dir.path()).unwrap();
    assert_eq!(
        extraction.metadata.significant_properties,
        Some(Vec::new())
    );

    std::fs::remove_file(dir.path().join("meta/significant_properties.xml")).unwrap();
    let extraction = extract(dir.path()).unwrap();
    assert!(extraction.metadata.significant_properties.is_none());
}
