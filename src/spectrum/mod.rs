//! Spectrum-level processing.
//!
//! Responsibilities:
//!
//! - condition raw transmission traces (smooth, truncate, remove baseline)
//! - detect prominent peaks and troughs
//! - derive per-fringe FSR and extinction ratio

pub mod features;
pub mod peaks;
pub mod preprocess;

pub use features::*;
pub use peaks::*;
pub use preprocess::*;
