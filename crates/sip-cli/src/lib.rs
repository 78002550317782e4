pub mod logging;
pub mod summary;
