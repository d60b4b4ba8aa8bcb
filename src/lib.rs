//! `reg-diagnostics` library crate.
//!
//! Fits an OLS model to a table of named numeric columns and checks the usual
//! assumptions: linearity (Rainbow), independence of features (VIF) and
//! homoscedasticity (Breusch–Pagan), plus a residual-vs-predicted plot.
//!
//! The binary (`regdiag`) is a thin wrapper around this library so that core
//! logic is testable without spawning processes.
//!
//! ```no_run
//! use reg_diagnostics::{run, Dataset};
//!
//! let data = Dataset::from_columns([
//!     ("price", vec![210.0, 180.0, 250.0, 199.0, 320.0, 150.0, 275.0, 230.0, 188.0, 305.0, 165.0, 242.0]),
//!     ("area", vec![80.0, 65.0, 95.0, 72.0, 120.0, 50.0, 101.0, 88.0, 70.0, 115.0, 58.0, 90.0]),
//!     ("rooms", vec![3.0, 2.0, 4.0, 4.0, 5.0, 2.0, 3.0, 3.0, 2.0, 4.0, 3.0, 5.0]),
//! ])?;
//! run(&data, "price", &["area", "rooms"])?;
//! # Ok::<(), reg_diagnostics::DiagError>(())
//! ```

pub mod app;
pub mod cli;
pub mod data;
pub mod diagnostics;
pub mod domain;
pub mod error;
pub mod io;
pub mod math;
pub mod models;
pub mod plot;
pub mod report;
pub mod tui;

pub use app::pipeline::{analyze, run, run_with_writer, RunOutput};
pub use domain::{Dataset, DiagOptions, DiagnosticReport, ModelSpec};
pub use error::{AppError, DiagError};
pub use models::FittedModel;
