//! Input/output helpers.
//!
//! - CSV ingest into a numeric dataset (`ingest`)
//! - result exports (CSV/JSON) (`export`)

pub mod export;
pub mod ingest;

pub use export::*;
pub use ingest::*;
