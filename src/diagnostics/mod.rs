//! Assumption checks for a fitted linear model.
//!
//! - `rainbow`: linearity
//! - `vif`: multicollinearity (independence of features)
//! - `breusch_pagan`: homoscedasticity

pub mod breusch_pagan;
pub mod rainbow;
pub mod vif;

pub use breusch_pagan::*;
pub use rainbow::*;
pub use vif::*;
