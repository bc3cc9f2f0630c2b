//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - per-device stage records (`RawSpectrum`, `DeviceRecord`, `FeatureSet`, `DeviceCurve`)
//! - cross-device results (`AggregateCurve`, `LookupResult`, `CouplingSurface`)
//! - run configuration (`AnalysisConfig`)

pub mod types;

pub use types::*;
