//! `ng-curves` library crate.
//!
//! The binary (`ng`) is a thin wrapper around this library so that:
//!
//! - the analysis core is testable without spawning processes
//! - the pipeline can be driven from other front-ends or notebooks
//!
//! Data flow: `io::ingest` (or `data::sample`) -> `spectrum` -> `analysis` -> `report`/`io`.

pub mod analysis;
pub mod app;
pub mod cli;
pub mod data;
pub mod domain;
pub mod error;
pub mod io;
pub mod math;
pub mod report;
pub mod spectrum;
