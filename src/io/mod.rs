//! Input/output helpers.
//!
//! - CSV ingest + validation (`ingest`)
//! - table exports (`export`)

pub mod export;
pub mod ingest;

pub use export::*;
pub use ingest::*;
