pub mod cache;
pub mod error;
pub mod fetch;
pub mod validator;

pub use cache::{SchemaCache, SchemaSource};
pub use error::ValidateError;
pub use fetch::SchemaFetcher;
pub use validator::XmlValidator;
