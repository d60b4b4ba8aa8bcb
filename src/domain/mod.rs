//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - the input table (`Dataset`) and model specification (`ModelSpec`)
//! - run configuration (`DiagConfig`, `DiagOptions`, `PlotLabels`)
//! - fit and diagnostic outputs (`DiagnosticReport`, `ResidualPoint`, etc.)

pub mod dataset;
pub mod formula;
pub mod types;

pub use dataset::*;
pub use formula::*;
pub use types::*;
