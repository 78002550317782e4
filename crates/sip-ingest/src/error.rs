use std::path::PathBuf;

use thiserror::Error;

/// Extraction failures that abort a build before synthesis.
#[derive(Debug, Error)]
pub enum IngestError {
    #[error("IP directory not found: {path}")]
    PackageNotFound { path: PathBuf },

    #[error("required metadata file missing: {path}")]
    MissingRequiredFile { path: PathBuf },

    #[error("no fixity manifest (manifest-*.txt) found in {path}")]
    MissingManifest { path: PathBuf },

    #[error("unable to read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("malformed XML in {path}: {message}")]
    MalformedXml { path: PathBuf, message: String },
}

pub type Result<T> = std::result::Result<T, IngestError>;
