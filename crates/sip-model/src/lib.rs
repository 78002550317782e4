pub mod document;
pub mod ip;
pub mod layout;
pub mod metadata;
pub mod report;
pub mod schema;
pub mod xml;

pub use document::{DocumentKind, GeneratedDocument, SchemaViolation, ValidationOutcome};
pub use ip::{BagInfo, FixityManifest, InformationPackage, PayloadScan};
pub use layout::{LayoutEntry, LayoutSource, SipLayout};
pub use metadata::{PayloadFile, PreservationMetadata, Representation, SignificantProperty};
pub use report::{
    BuildReport, BuildStage, BuildState, DocumentStatus, FrozenReport, ReportEntry, Severity,
};
pub use schema::SchemaReference;
pub use xml::{XmlElement, XmlNode};
