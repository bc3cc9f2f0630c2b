//! Shared domain types.
//!
//! Each stage of the pipeline produces a new immutable value from the previous
//! one (`DeviceRecord -> FeatureSet -> DeviceCurve`); nothing is mutated once a
//! downstream consumer may have read it. Result types are serializable so they
//! can be exported as JSON.

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::error::AnalysisError;

/// Naming convention that encodes the geometry parameter in a device ID.
///
/// Example: prefix `"DC_L"`, suffix `"um"` turns `"DC_L12p5um"` into `12.5`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceNaming {
    pub prefix: String,
    pub suffix: String,
}

/// A spectrum as read from disk, before any processing.
#[derive(Debug, Clone)]
pub struct RawSpectrum {
    pub id: String,
    /// Strictly increasing wavelengths (nm).
    pub wavelength_nm: Vec<f64>,
    /// One power trace (dB) per measured port, each the same length as `wavelength_nm`.
    pub channels: Vec<Vec<f64>>,
}

/// A preprocessed device spectrum, ready for feature extraction.
#[derive(Debug, Clone)]
pub struct DeviceRecord {
    pub id: String,
    /// Geometry parameter parsed from `id` (e.g. coupling length).
    pub geometry: f64,
    pub wavelength_nm: Vec<f64>,
    /// Smoothed, range-truncated transmission (dB).
    pub power: Vec<f64>,
    /// `power` with the slow background trend removed.
    pub corrected: Vec<f64>,
    /// Baseline polynomial coefficients (ascending powers of normalized wavelength).
    pub baseline_fit: Vec<f64>,
}

/// Periodic features of one spectrum.
///
/// All three value sequences share a length of `peak_count - 1`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FeatureSet {
    pub midpoints_nm: Vec<f64>,
    pub fsr_nm: Vec<f64>,
    pub extinction_db: Vec<f64>,
    pub peak_indices: Vec<usize>,
    pub trough_indices: Vec<usize>,
}

impl FeatureSet {
    pub fn len(&self) -> usize {
        self.midpoints_nm.len()
    }

    pub fn is_empty(&self) -> bool {
        self.midpoints_nm.is_empty()
    }
}

/// Physical quantities of one device, sampled at the FSR midpoints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeviceCurve {
    pub id: String,
    pub geometry: f64,
    pub wavelength_nm: Vec<f64>,
    pub group_index: Vec<f64>,
    /// Power coupling coefficient; `None` where the extinction ratio was negative or not finite.
    pub kappa: Vec<Option<f64>>,
}

/// Group-index samples of one device that survived outlier rejection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CleanedCurve {
    pub id: String,
    pub wavelength_nm: Vec<f64>,
    pub group_index: Vec<f64>,
    /// Rounded mode the tolerance window was centred on (`None` for an empty input).
    pub mode: Option<f64>,
    pub removed: usize,
}

impl CleanedCurve {
    pub fn is_empty(&self) -> bool {
        self.wavelength_nm.is_empty()
    }
}

/// Cross-device average on a shared wavelength grid.
///
/// After gap filling every grid point has a finite `mean` and `std`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregateCurve {
    pub grid_nm: Vec<f64>,
    pub mean: Vec<f64>,
    pub std: Vec<f64>,
    /// Number of devices with a defined sample in each column.
    pub coverage: Vec<usize>,
    /// Columns whose values were produced by gap filling rather than data.
    pub filled: Vec<bool>,
}

impl AggregateCurve {
    pub fn len(&self) -> usize {
        self.grid_nm.len()
    }

    pub fn is_empty(&self) -> bool {
        self.grid_nm.is_empty()
    }

    pub fn filled_count(&self) -> usize {
        self.filled.iter().filter(|f| **f).count()
    }
}

/// Nearest-sample read of an aggregate curve.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LookupResult {
    pub index: usize,
    pub wavelength_nm: f64,
    pub mean: f64,
    pub std: f64,
}

/// Coupling coefficient over (device geometry, wavelength).
///
/// `kappa[i][j]` belongs to `geometry[i]` and `wavelength_nm[j]`; rows are ordered
/// by ascending geometry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CouplingSurface {
    pub wavelength_nm: Vec<f64>,
    pub geometry: Vec<f64>,
    pub device_ids: Vec<String>,
    pub kappa: Vec<Vec<f64>>,
    /// Devices left out because they had no usable coupling samples.
    pub skipped: Vec<String>,
}

/// Pipeline stage at which a device was dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Stage {
    Ingest,
    Identifier,
    Preprocess,
    Features,
    Conversion,
}

impl Stage {
    pub fn label(self) -> &'static str {
        match self {
            Stage::Ingest => "ingest",
            Stage::Identifier => "identifier",
            Stage::Preprocess => "preprocess",
            Stage::Features => "features",
            Stage::Conversion => "conversion",
        }
    }
}

/// A device dropped from the batch, and why.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExcludedDevice {
    pub id: String,
    pub stage: Stage,
    pub reason: String,
}

impl ExcludedDevice {
    pub fn new(id: impl Into<String>, stage: Stage, reason: impl std::fmt::Display) -> Self {
        Self {
            id: id.into(),
            stage,
            reason: reason.to_string(),
        }
    }
}

/// Simulated reference band for group-index comparison.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
pub enum ReferenceBand {
    #[serde(rename = "1310")]
    #[value(name = "1310")]
    O1310,
    #[serde(rename = "1550")]
    #[value(name = "1550")]
    C1550,
}

impl ReferenceBand {
    pub fn display_name(self) -> &'static str {
        match self {
            ReferenceBand::O1310 => "1310 nm",
            ReferenceBand::C1550 => "1550 nm",
        }
    }
}

/// Default peak/trough prominence threshold.
pub const DEFAULT_MIN_PROMINENCE: f64 = 0.25;
/// Default half-width of the outlier window around the rounded mode.
pub const DEFAULT_OUTLIER_TOLERANCE: f64 = 1.5;
/// Default number of leading midpoints per device used for the coupling surface.
pub const DEFAULT_SURFACE_POINTS: usize = 11;
/// Default size of the common aggregation grid.
pub const DEFAULT_GRID_POINTS: usize = 50;

/// A full run's configuration as understood by the pipeline.
///
/// This is derived from CLI flags (plus defaults).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisConfig {
    pub naming: DeviceNaming,
    /// Index of the power channel to analyse.
    pub port: usize,
    /// Moving-average window in samples (`<= 1` disables smoothing).
    pub smooth_window: usize,
    /// Inclusive wavelength window (nm) kept after smoothing.
    pub wavelength_range_nm: Option<(f64, f64)>,
    /// Degree of the baseline polynomial.
    pub baseline_degree: usize,
    /// Interferometer path-length difference ΔL (m).
    pub delta_length_m: f64,
    pub min_prominence: f64,
    pub outlier_tolerance: f64,
    pub grid_points: usize,
    pub surface_points: usize,
    pub target_wavelength_nm: Option<f64>,
    pub reference: Option<ReferenceBand>,
}

impl AnalysisConfig {
    /// Config with defaults for everything except ΔL.
    pub fn with_delta_length(delta_length_m: f64) -> Self {
        Self {
            naming: DeviceNaming::default(),
            port: 0,
            smooth_window: 211,
            wavelength_range_nm: None,
            baseline_degree: 4,
            delta_length_m,
            min_prominence: DEFAULT_MIN_PROMINENCE,
            outlier_tolerance: DEFAULT_OUTLIER_TOLERANCE,
            grid_points: DEFAULT_GRID_POINTS,
            surface_points: DEFAULT_SURFACE_POINTS,
            target_wavelength_nm: None,
            reference: None,
        }
    }

    /// Reject settings that would make every device fail the same way.
    pub fn validate(&self) -> Result<(), AnalysisError> {
        if !(self.delta_length_m.is_finite() && self.delta_length_m > 0.0) {
            return Err(AnalysisError::invalid(format!(
                "path-length difference must be finite and > 0 (got {})",
                self.delta_length_m
            )));
        }
        if !(self.min_prominence.is_finite() && self.min_prominence > 0.0) {
            return Err(AnalysisError::invalid("prominence threshold must be > 0"));
        }
        if !(self.outlier_tolerance.is_finite() && self.outlier_tolerance >= 0.0) {
            return Err(AnalysisError::invalid("outlier tolerance must be >= 0"));
        }
        if self.grid_points < 2 {
            return Err(AnalysisError::invalid("grid points must be >= 2"));
        }
        if self.surface_points == 0 {
            return Err(AnalysisError::invalid("surface points must be >= 1"));
        }
        if let Some((low, high)) = self.wavelength_range_nm {
            if !(low.is_finite() && high.is_finite() && high > low) {
                return Err(AnalysisError::invalid(format!(
                    "invalid wavelength range: [{low}, {high}]"
                )));
            }
        }
        if let Some(target) = self.target_wavelength_nm {
            if !target.is_finite() {
                return Err(AnalysisError::invalid("target wavelength must be finite"));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let config = AnalysisConfig::with_delta_length(100e-6);
        assert!(config.validate().is_ok());
        assert_eq!(config.surface_points, 11);
        assert!((config.min_prominence - 0.25).abs() < 1e-12);
    }

    #[test]
    fn validate_rejects_bad_delta_length_and_range() {
        let config = AnalysisConfig::with_delta_length(0.0);
        assert!(matches!(config.validate(), Err(AnalysisError::InvalidInput(_))));

        let mut config = AnalysisConfig::with_delta_length(1e-4);
        config.wavelength_range_nm = Some((1600.0, 1500.0));
        assert!(config.validate().is_err());
    }
}
