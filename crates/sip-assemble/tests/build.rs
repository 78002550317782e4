//! End-to-end build tests: fixture IP in, SIP directory and frozen
//! report out.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use sip_assemble::Assembler;
use sip_model::{BuildState, DocumentKind, ValidationOutcome};
use sip_standards::BuilderConfig;
use sip_validate::SchemaCache;

fn write(root: &Path, relative: &str, contents: &str) {
    let path = root.join(relative);
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(path, contents).unwrap();
}

fn fixture_ip(root: &Path, external_id: &str) {
    write(
        root,
        "bag-info.txt",
        &format!(
            "Source-Organization: university-library\n\
             Origin-System-Identifier: repositorium\n\
             External-Identifier: {external_id}\n\
             DC-Title: Annual Report 1904\n",
        ),
    );
    write(
        root,
        "manifest-md5.txt",
        "0cc175b9c0f1b6a831c399e269772661 data/preservation_master/report.tif\n",
    );
    write(root, "data/preservation_master/report.tif", "image bytes");
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

fn bundled_dc_xsd() -> String {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("../sip-standards/static/dcxml/dc.xsd")
        .display()
        .to_string()
}

/// Permissive stand-in for the deposit-system METS schema.
const METS_STUB_XSD: &str = r###"<?xml version="1.0" encoding="UTF-8"?>
<xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema"
           targetNamespace="http://www.exlibrisgroup.com/xsd/dps/rosettaMets"
           elementFormDefault="qualified">
  <xs:element name="mets">
    <xs:complexType>
      <xs:sequence>
        <xs:any namespace="##any" processContents="skip" minOccurs="0" maxOccurs="unbounded"/>
      </xs:sequence>
      <xs:anyAttribute processContents="skip"/>
    </xs:complexType>
  </xs:element>
</xs:schema>
"###;

/// Schema the generated Dublin Core record can never satisfy.
const STRICT_DC_XSD: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema"
           targetNamespace="http://purl.org/dc/elements/1.1/"
           elementFormDefault="qualified">
  <xs:element name="record">
    <xs:complexType>
      <xs:sequence>
        <xs:element name="requiredField" type="xs:string"/>
      </xs:sequence>
    </xs:complexType>
  </xs:element>
</xs:schema>
"#;

fn config_from(map: BTreeMap<&str, String>) -> BuilderConfig {
    BuilderConfig::from_lookup(|key| map.get(key).cloned()).unwrap()
}

fn base_config() -> BuilderConfig {
    config_from(BTreeMap::from([
        ("VALIDATION_METS_ACTIVE", "0".to_string()),
        ("VALIDATION_DCXML_XSD", bundled_dc_xsd()),
    ]))
}

fn outcome_of(report: &sip_model::FrozenReport, kind: DocumentKind) -> ValidationOutcome {
    report
        .documents
        .iter()
        .find(|status| status.kind == kind)
        .and_then(|status| status.outcome.clone())
        .expect("document outcome")
}

#[test]
fn complete_build_succeeds() {
    let dir = tempfile::tempdir().unwrap();
    let ip = dir.path().join("jobs/abcde-12345");
    fixture_ip(&ip, "obj-0001");
    let output_root = dir.path().join("sip");

    let assembler = Assembler::new(&base_config(), Arc::new(SchemaCache::new())).unwrap();
    let report = assembler.build(&ip, &output_root);

    assert!(report.success, "entries: {:#?}", report.entries);
    assert_eq!(report.state, BuildState::Completed);

    let sip = output_root.join("abcde-12345");
    assert_eq!(report.output.as_deref(), Some(sip.as_path()));
    assert!(sip.join("dc.xml").is_file());
    assert!(sip.join("content/ie.xml").is_file());
    assert!(sip.join("content/significant_properties.xml").is_file());
    assert!(
        sip.join("content/streams/preservation_master/report.tif")
            .is_file()
    );
    assert!(sip.join("manifest-sha512.txt").is_file());

    // no rights statement in the IP -> no rights block in the METS
    let mets = std::fs::read_to_string(sip.join("content/ie.xml")).unwrap();
    assert!(!mets.contains("rightsMD"));

    match outcome_of(&report, DocumentKind::DublinCore) {
        ValidationOutcome::Valid { schema, fallback } => {
            assert!(schema.contains("dc.xml schema"));
            assert!(!fallback);
        }
        other => panic!("expected valid dublin core, got {other:?}"),
    }
    assert_eq!(
        outcome_of(&report, DocumentKind::PreservationMets),
        ValidationOutcome::Skipped
    );
}

#[test]
fn extraction_failure_writes_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let ip = dir.path().join("jobs/broken");
    fixture_ip(&ip, "obj-0002");
    std::fs::remove_file(ip.join("bag-info.txt")).unwrap();
    let output_root = dir.path().join("sip");

    let assembler = Assembler::new(&base_config(), Arc::new(SchemaCache::new())).unwrap();
    let report = assembler.build(&ip, &output_root);

    assert!(!report.success);
    assert_eq!(report.state, BuildState::Failed);
    assert!(report.documents.is_empty());
    assert!(!output_root.exists());
}

#[test]
fn fallback_schema_is_used_when_primary_unreachable() {
    let dir = tempfile::tempdir().unwrap();
    let ip = dir.path().join("jobs/fallback");
    fixture_ip(&ip, "obj-0003");
    let mets_stub = dir.path().join("mets_stub.xsd");
    std::fs::write(&mets_stub, METS_STUB_XSD).unwrap();

    let config = config_from(BTreeMap::from([
        ("VALIDATION_METS_XSD", "/no/such/mets.xsd".to_string()),
        (
            "VALIDATION_METS_XSD_FALLBACK",
            mets_stub.display().to_string(),
        ),
        ("VALIDATION_METS_XSD_FALLBACK_NAME", "METS mirror".to_string()),
        ("VALIDATION_DCXML_XSD", bundled_dc_xsd()),
    ]));
    let assembler = Assembler::new(&config, Arc::new(SchemaCache::new())).unwrap();
    let report = assembler.build(&ip, &dir.path().join("sip"));

    assert!(report.success, "entries: {:#?}", report.entries);
    assert_eq!(
        outcome_of(&report, DocumentKind::PreservationMets),
        ValidationOutcome::Valid {
            schema: "METS mirror".to_string(),
            fallback: true,
        }
    );
}

#[test]
fn unreachable_schemas_leave_document_unvalidated() {
    let dir = tempfile::tempdir().unwrap();
    let ip = dir.path().join("jobs/unvalidated");
    fixture_ip(&ip, "obj-0004");

    let config = config_from(BTreeMap::from([
        ("VALIDATION_METS_XSD", "/no/such/mets.xsd".to_string()),
        (
            "VALIDATION_METS_XSD_FALLBACK",
            "/no/such/fallback.xsd".to_string(),
        ),
        ("VALIDATION_DCXML_XSD", bundled_dc_xsd()),
    ]));
    let assembler = Assembler::new(&config, Arc::new(SchemaCache::new())).unwrap();
    let report = assembler.build(&ip, &dir.path().join("sip"));

    assert!(report.success);
    assert!(report.warning_count() > 0);
    assert_eq!(
        outcome_of(&report, DocumentKind::PreservationMets),
        ValidationOutcome::Unvalidated
    );
}

#[test]
fn invalid_mandatory_document_fails_build_but_keeps_partial_layout() {
    let dir = tempfile::tempdir().unwrap();
    let ip = dir.path().join("jobs/invalid");
    fixture_ip(&ip, "obj-0005");
    let strict = dir.path().join("strict_dc.xsd");
    std::fs::write(&strict, STRICT_DC_XSD).unwrap();

    let config = config_from(BTreeMap::from([
        ("VALIDATION_METS_ACTIVE", "0".to_string()),
        ("VALIDATION_DCXML_XSD", strict.display().to_string()),
    ]));
    let assembler = Assembler::new(&config, Arc::new(SchemaCache::new())).unwrap();
    let report = assembler.build(&ip, &dir.path().join("sip"));

    assert!(!report.success);
    assert_eq!(report.state, BuildState::Failed);
    assert!(matches!(
        outcome_of(&report, DocumentKind::DublinCore),
        ValidationOutcome::Invalid { .. }
    ));
    // partial layout preserved for diagnosis
    let sip = dir.path().join("sip/invalid");
    assert!(sip.join("dc.xml").is_file());
}

#[test]
fn existing_target_directory_fails_assembly() {
    let dir = tempfile::tempdir().unwrap();
    let ip = dir.path().join("jobs/collision");
    fixture_ip(&ip, "obj-0006");
    let output_root = dir.path().join("sip");
    std::fs::create_dir_all(output_root.join("collision")).unwrap();

    let assembler = Assembler::new(&base_config(), Arc::new(SchemaCache::new())).unwrap();
    let report = assembler.build(&ip, &output_root);

    assert!(!report.success);
    assert_eq!(report.state, BuildState::Failed);
    assert!(
        report
            .entries
            .iter()
            .any(|entry| entry.message.contains("already exists"))
    );
}

#[test]
fn concurrent_builds_share_one_cache() {
    let dir = tempfile::tempdir().unwrap();
    let ip_a = dir.path().join("jobs/conc-a");
    let ip_b = dir.path().join("jobs/conc-b");
    fixture_ip(&ip_a, "obj-a");
    fixture_ip(&ip_b, "obj-b");
    let output_root = dir.path().join("sip");

    let cache = Arc::new(SchemaCache::new());
    let assembler = Arc::new(Assembler::new(&base_config(), Arc::clone(&cache)).unwrap());

    let mut handles = Vec::new();
    for ip in [ip_a.clone(), ip_b.clone()] {
        let assembler = Arc::clone(&assembler);
        let output_root = output_root.clone();
        handles.push(std::thread::spawn(move || {
            assembler.build(&ip, &output_root)
        }));
    }
    let reports: Vec<_> = handles
        .into_iter()
        .map(|handle| handle.join().unwrap())
        .collect();

    for report in &reports {
        assert!(report.success, "entries: {:#?}", report.entries);
    }
    assert!(output_root.join("conc-a/dc.xml").is_file());
    assert!(output_root.join("conc-b/dc.xml").is_file());

    // one dc schema entry, fetched once and shared across both builds
    assert_eq!(cache.len(), 1);

    let dc_a = std::fs::read_to_string(output_root.join("conc-a/dc.xml")).unwrap();
    let dc_b = std::fs::read_to_string(output_root.join("conc-b/dc.xml")).unwrap();
    assert!(dc_a.contains("obj-a"));
    assert!(dc_b.contains("obj-b"));
}
