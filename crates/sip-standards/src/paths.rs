//! Bundled schema path resolution.

use std::path::PathBuf;

/// Environment variable for overriding the bundled schema directory.
pub const SCHEMA_DIR_ENV_VAR: &str = "SIP_SCHEMA_DIR";

/// Root directory for schemas shipped with the builder.
///
/// Resolution order:
/// 1. `SIP_SCHEMA_DIR` environment variable
/// 2. `static/` directory bundled with this crate
pub fn schema_root() -> PathBuf {
    if let Ok(root) = std::env::var(SCHEMA_DIR_ENV_VAR) {
        return PathBuf::from(root);
    }
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("static")
}

/// Location of the bundled Dublin Core record schema.
pub fn bundled_dc_xsd() -> PathBuf {
    schema_root().join("dcxml/dc.xsd")
}
