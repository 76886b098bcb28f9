//! Input/output helpers.
//!
//! - incident CSV ingest + validation (`ingest`)
//! - ranking exports (CSV/JSON) (`export`)

pub mod export;
pub mod ingest;

pub use export::*;
pub use ingest::*;
