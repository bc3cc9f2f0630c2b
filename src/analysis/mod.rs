//! Device- and batch-level analysis.
//!
//! Responsibilities:
//!
//! - convert fringe features to group index and coupling coefficient
//! - reject group-index outliers per device
//! - average devices on a common grid and read it at a target wavelength
//! - build the geometry-vs-wavelength coupling surface

pub mod aggregate;
pub mod convert;
pub mod lookup;
pub mod outliers;
pub mod reference;
pub mod surface;

pub use aggregate::*;
pub use convert::*;
pub use lookup::*;
pub use outliers::*;
pub use reference::*;
pub use surface::*;
