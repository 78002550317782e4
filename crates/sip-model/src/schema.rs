//! Schema reference configuration values.

use serde::{Deserialize, Serialize};

/// One configured XSD reference for a document kind.
///
/// Loaded from configuration at process start and immutable afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaReference {
    /// URL or filesystem path of the XSD.
    pub location: String,
    /// XML Schema version label ("1.0" or "1.1").
    pub version: String,
    /// Human-readable name used in reports and logs.
    pub name: String,
    /// True for fallback references tried only after the primary fails
    /// to load.
    pub fallback: bool,
}

impl SchemaReference {
    pub fn is_remote(&self) -> bool {
        self.location.starts_with("http://") || self.location.starts_with("https://")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn remote_detection() {
        let mut reference = SchemaReference {
            location: "https://example.org/mets.xsd".to_string(),
            version: "1.1".to_string(),
            name: "METS".to_string(),
            fallback: false,
        };
        assert!(reference.is_remote());
        reference.location = "/srv/schemas/mets.xsd".to_string();
        assert!(!reference.is_remote());
    }
}
