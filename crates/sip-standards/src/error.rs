use thiserror::Error;

/// Startup configuration failures. These abort process startup, never an
/// individual build.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value '{value}' for {key}: expected 0 or 1")]
    InvalidFlag { key: String, value: String },

    #[error("invalid value '{value}' for {key}: expected an integer")]
    InvalidNumber { key: String, value: String },

    #[error("unknown document kind '{value}' in {key}")]
    UnknownDocumentKind { key: String, value: String },
}
