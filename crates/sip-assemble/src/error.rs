use std::path::PathBuf;

use thiserror::Error;

/// Filesystem failures during assembly. Any of these fails the build;
/// the partial layout is left in place for inspection.
#[derive(Debug, Error)]
pub enum AssembleError {
    #[error("SIP target directory already exists: {path}")]
    TargetExists { path: PathBuf },

    #[error("unable to create directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("unable to copy {from} to {to}: {source}")]
    Copy {
        from: PathBuf,
        to: PathBuf,
        source: std::io::Error,
    },

    #[error("unable to write {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("unable to read back {path} for fixity: {source}")]
    Fixity {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("layout references unknown generated document: {kind}")]
    UnknownDocument { kind: String },
}
