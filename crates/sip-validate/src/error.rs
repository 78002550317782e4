use thiserror::Error;

/// Validation-side failures. Schema load failures (fetch or compile)
/// trigger fallback resolution and are never fatal to a build.
#[derive(Debug, Error)]
pub enum ValidateError {
    #[error("unable to build HTTP client: {0}")]
    HttpClient(String),

    #[error("unable to fetch schema from {location}: {message}")]
    Fetch { location: String, message: String },

    #[error("schema fetch from {location} returned HTTP {status}")]
    FetchStatus { location: String, status: u16 },

    #[error("unable to read schema file {location}: {message}")]
    ReadFile { location: String, message: String },

    #[error("unable to compile schema '{name}': {message}")]
    Compile { name: String, message: String },
}
