pub mod bag;
pub mod error;
pub mod extractor;
pub mod manifest;
pub mod payload;
pub mod sigprops;
pub mod xml;

pub use error::{IngestError, Result};
pub use extractor::{Extraction, extract, load_ip};
pub use xml::{load_xml_file, parse_xml};
