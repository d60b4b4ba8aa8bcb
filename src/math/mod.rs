//! Numerical building blocks: SVD least squares and residual moments.

pub mod moments;
pub mod ols;

pub use moments::*;
pub use ols::*;
