//! Mathematical utilities: least squares solvers.

pub mod ols;

pub use ols::*;
