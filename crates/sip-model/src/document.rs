//! Generated XML documents and their validation outcomes.

use serde::{Deserialize, Serialize};

/// The XML document kinds a SIP build can produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DocumentKind {
    PreservationMets,
    DublinCore,
    SignificantProperties,
}

impl DocumentKind {
    pub const ALL: [DocumentKind; 3] = [
        DocumentKind::PreservationMets,
        DocumentKind::DublinCore,
        DocumentKind::SignificantProperties,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            DocumentKind::PreservationMets => "preservation-mets",
            DocumentKind::DublinCore => "dublin-core",
            DocumentKind::SignificantProperties => "significant-properties",
        }
    }

    /// Fixed location of the document inside the SIP layout.
    pub fn sip_relative_path(self) -> &'static str {
        match self {
            DocumentKind::PreservationMets => "content/ie.xml",
            DocumentKind::DublinCore => "dc.xml",
            DocumentKind::SignificantProperties => "content/significant_properties.xml",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "preservation-mets" => Some(DocumentKind::PreservationMets),
            "dublin-core" => Some(DocumentKind::DublinCore),
            "significant-properties" => Some(DocumentKind::SignificantProperties),
            _ => None,
        }
    }
}

impl std::fmt::Display for DocumentKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single schema violation reported by the XML validator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchemaViolation {
    /// Human-readable message from the schema engine.
    pub message: String,
    /// Document-relative locator (element path) when the engine provides one.
    pub locator: Option<String>,
    /// Line in the serialized document, when known.
    pub line: Option<u32>,
}

/// Validation state of a generated document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "kebab-case")]
pub enum ValidationOutcome {
    /// Not yet validated.
    Pending,
    /// Validation for this kind is deactivated or has no configured schema.
    Skipped,
    /// Schema-valid against the named schema.
    Valid { schema: String, fallback: bool },
    /// Schema violations were found.
    Invalid {
        schema: String,
        fallback: bool,
        violations: Vec<SchemaViolation>,
    },
    /// No configured schema reference could be loaded.
    Unvalidated,
}

impl ValidationOutcome {
    /// True when the outcome does not block an otherwise successful build.
    pub fn is_acceptable(&self) -> bool {
        !matches!(
            self,
            ValidationOutcome::Invalid { .. } | ValidationOutcome::Pending
        )
    }

    /// Name of the schema actually used, when one was.
    pub fn schema_name(&self) -> Option<&str> {
        match self {
            ValidationOutcome::Valid { schema, .. }
            | ValidationOutcome::Invalid { schema, .. } => Some(schema),
            _ => None,
        }
    }
}

/// A named XML artifact produced by a synthesizer.
///
/// Created with a `Pending` outcome; the validator attaches the final
/// outcome exactly once.
#[derive(Debug, Clone)]
pub struct GeneratedDocument {
    pub kind: DocumentKind,
    pub bytes: Vec<u8>,
    outcome: ValidationOutcome,
}

impl GeneratedDocument {
    pub fn new(kind: DocumentKind, bytes: Vec<u8>) -> Self {
        Self {
            kind,
            bytes,
            outcome: ValidationOutcome::Pending,
        }
    }

    pub fn outcome(&self) -> &ValidationOutcome {
        &self.outcome
    }

    /// Attach the validation outcome. Only the first attachment takes
    /// effect; a document is never mutated after validation.
    pub fn attach_outcome(&mut self, outcome: ValidationOutcome) {
        if matches!(self.outcome, ValidationOutcome::Pending) {
            self.outcome = outcome;
        }
    }
}
