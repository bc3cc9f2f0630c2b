//! Mathematical utilities: interpolation, partial-data statistics and least squares.

pub mod interp;
pub mod ols;
pub mod stats;

pub use interp::*;
pub use ols::*;
pub use stats::*;
