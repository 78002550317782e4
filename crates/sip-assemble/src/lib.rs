pub mod assembler;
pub mod error;
pub mod layout;

pub use assembler::Assembler;
pub use error::AssembleError;
pub use layout::{plan_layout, write_fixity_manifest, write_layout};
