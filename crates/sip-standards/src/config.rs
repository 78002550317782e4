//! Process-start configuration.
//!
//! All keys are environment-style and read exactly once, at startup.
//! Unrecognized or absent keys fall back to the documented defaults;
//! unparseable values fail startup with a [`ConfigError`].

use std::collections::BTreeSet;
use std::path::PathBuf;
use std::time::Duration;

use sip_model::{DocumentKind, SchemaReference};

use crate::error::ConfigError;
use crate::paths::bundled_dc_xsd;

/// Default primary XSD for the preservation METS document.
pub const DEFAULT_METS_XSD: &str =
    "https://developers.exlibrisgroup.com/wp-content/uploads/2022/06/mets_rosetta.xsd";

const DEFAULT_METS_XSD_NAME: &str = "Ex Libris, Rosetta METS v7.3";
const DEFAULT_METS_FALLBACK_NAME: &str = "Rosetta METS (fallback)";
const DEFAULT_SCHEMA_VERSION: &str = "1.1";
const DEFAULT_OUTPUT_ROOT: &str = "sip";
const DEFAULT_FETCH_TIMEOUT_SECS: u64 = 30;

/// Validation settings for one document kind: the activation flag plus
/// the primary-then-fallback reference list.
#[derive(Debug, Clone)]
pub struct KindValidation {
    pub active: bool,
    pub references: Vec<SchemaReference>,
}

/// Full builder configuration.
#[derive(Debug, Clone)]
pub struct BuilderConfig {
    /// Root directory SIPs are written under (`SIP_OUTPUT`).
    pub output_root: PathBuf,
    pub mets: KindValidation,
    pub dcxml: KindValidation,
    /// Document kinds whose failure fails the whole build
    /// (`MANDATORY_DOCUMENTS`).
    pub mandatory: BTreeSet<DocumentKind>,
    /// Timeout for remote schema fetches (`SCHEMA_FETCH_TIMEOUT_SECS`).
    pub fetch_timeout: Duration,
}

impl BuilderConfig {
    /// Read configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read configuration through a lookup function. Tests use this to
    /// avoid mutating the process environment.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let output_root = PathBuf::from(
            non_empty(lookup("SIP_OUTPUT")).unwrap_or_else(|| DEFAULT_OUTPUT_ROOT.to_string()),
        );

        let mets_active = parse_flag(&lookup, "VALIDATION_METS_ACTIVE", true)?;
        let mut mets_references = vec![SchemaReference {
            location: non_empty(lookup("VALIDATION_METS_XSD"))
                .unwrap_or_else(|| DEFAULT_METS_XSD.to_string()),
            version: non_empty(lookup("VALIDATION_METS_XSD_VERSION"))
                .unwrap_or_else(|| DEFAULT_SCHEMA_VERSION.to_string()),
            name: non_empty(lookup("VALIDATION_METS_XSD_NAME"))
                .unwrap_or_else(|| DEFAULT_METS_XSD_NAME.to_string()),
            fallback: false,
        }];
        if let Some(location) = non_empty(lookup("VALIDATION_METS_XSD_FALLBACK")) {
            mets_references.push(SchemaReference {
                location,
                version: non_empty(lookup("VALIDATION_METS_XSD_FALLBACK_VERSION"))
                    .unwrap_or_else(|| DEFAULT_SCHEMA_VERSION.to_string()),
                name: non_empty(lookup("VALIDATION_METS_XSD_FALLBACK_NAME"))
                    .unwrap_or_else(|| DEFAULT_METS_FALLBACK_NAME.to_string()),
                fallback: true,
            });
        }

        let dcxml_active = parse_flag(&lookup, "VALIDATION_DCXML_ACTIVE", true)?;
        let dcxml_location = non_empty(lookup("VALIDATION_DCXML_XSD"))
            .unwrap_or_else(|| bundled_dc_xsd().display().to_string());
        let dcxml_references = vec![SchemaReference {
            location: dcxml_location,
            version: non_empty(lookup("VALIDATION_DCXML_XSD_VERSION"))
                .unwrap_or_else(|| DEFAULT_SCHEMA_VERSION.to_string()),
            name: non_empty(lookup("VALIDATION_DCXML_XSD_NAME"))
                .unwrap_or_else(|| format!("dc.xml schema v{}", env!("CARGO_PKG_VERSION"))),
            fallback: false,
        }];

        let mandatory = parse_mandatory(&lookup)?;

        let fetch_timeout = match non_empty(lookup("SCHEMA_FETCH_TIMEOUT_SECS")) {
            Some(value) => {
                let secs = value
                    .parse::<u64>()
                    .map_err(|_| ConfigError::InvalidNumber {
                        key: "SCHEMA_FETCH_TIMEOUT_SECS".to_string(),
                        value,
                    })?;
                Duration::from_secs(secs)
            }
            None => Duration::from_secs(DEFAULT_FETCH_TIMEOUT_SECS),
        };

        Ok(Self {
            output_root,
            mets: KindValidation {
                active: mets_active,
                references: mets_references,
            },
            dcxml: KindValidation {
                active: dcxml_active,
                references: dcxml_references,
            },
            mandatory,
            fetch_timeout,
        })
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

fn parse_flag(
    lookup: impl Fn(&str) -> Option<String>,
    key: &str,
    default: bool,
) -> Result<bool, ConfigError> {
    match non_empty(lookup(key)) {
        None => Ok(default),
        Some(value) => match value.trim() {
            "1" | "true" => Ok(true),
            "0" | "false" => Ok(false),
            _ => Err(ConfigError::InvalidFlag {
                key: key.to_string(),
                value,
            }),
        },
    }
}

fn parse_mandatory(
    lookup: impl Fn(&str) -> Option<String>,
) -> Result<BTreeSet<DocumentKind>, ConfigError> {
    let key = "MANDATORY_DOCUMENTS";
    let Some(raw) = non_empty(lookup(key)) else {
        return Ok(BTreeSet::from([
            DocumentKind::PreservationMets,
            DocumentKind::DublinCore,
        ]));
    };
    let mut kinds = BTreeSet::new();
    for part in raw.split(',').map(str::trim).filter(|p| !p.is_empty()) {
        let kind = DocumentKind::parse(part).ok_or_else(|| ConfigError::UnknownDocumentKind {
            key: key.to_string(),
            value: part.to_string(),
        })?;
        kinds.insert(kind);
    }
    Ok(kinds)
}
