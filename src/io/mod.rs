//! Input/output helpers.
//!
//! - device CSV discovery + ingest (`ingest`)
//! - numeric CSV exports (`export`)
//! - analysis JSON read/write (`curve`)

pub mod curve;
pub mod export;
pub mod ingest;

pub use curve::*;
pub use export::*;
pub use ingest::*;
