pub mod config;
pub mod error;
pub mod paths;
pub mod registry;

pub use config::{BuilderConfig, KindValidation};
pub use error::ConfigError;
pub use paths::{SCHEMA_DIR_ENV_VAR, bundled_dc_xsd, schema_root};
pub use registry::SchemaRegistry;
