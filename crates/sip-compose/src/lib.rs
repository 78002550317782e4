pub mod common;
pub mod dc;
pub mod mets;
pub mod sigprops;

use anyhow::Result;
use sip_model::{DocumentKind, GeneratedDocument, PreservationMetadata};

pub use dc::DcSynthesizer;
pub use mets::MetsSynthesizer;
pub use sigprops::SigPropsSynthesizer;

/// A deterministic, side-effect-free mapping from the metadata model to
/// one serialized XML document.
pub trait Synthesizer {
    fn kind(&self) -> DocumentKind;

    /// Produce the document. `Ok(None)` means the IP carries no metadata
    /// for this kind and the document is omitted from the SIP entirely.
    fn synthesize(&self, metadata: &PreservationMetadata) -> Result<Option<GeneratedDocument>>;
}

/// The synthesizers for all supported document kinds, in build order.
pub fn default_synthesizers() -> Vec<Box<dyn Synthesizer + Send + Sync>> {
    vec![
        Box::new(MetsSynthesizer),
        Box::new(DcSynthesizer),
        Box::new(SigPropsSynthesizer),
    ]
}
