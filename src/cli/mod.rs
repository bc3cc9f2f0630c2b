//! Command-line parsing for the group-index / coupling extractor.
//!
//! The goal of this module is to keep **argument parsing** separate from the
//! analysis code. `app` turns these structs into an `AnalysisConfig`.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::domain::{
    DEFAULT_GRID_POINTS, DEFAULT_MIN_PROMINENCE, DEFAULT_OUTLIER_TOLERANCE, DEFAULT_SURFACE_POINTS, ReferenceBand,
};

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(
    name = "ng",
    version,
    about = "Group index and coupling extraction from interferometer spectra"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Analyse a directory of measured device spectra (one CSV per device).
    Analyze(AnalyzeArgs),
    /// Generate synthetic interferometer spectra and analyse them.
    Demo(DemoArgs),
    /// Print the summary of a previously exported analysis JSON.
    Summary(SummaryArgs),
}

/// Options for analysing measured spectra.
#[derive(Debug, Parser, Clone)]
pub struct AnalyzeArgs {
    /// Directory searched (recursively) for device CSV files.
    #[arg(short = 'd', long, value_name = "DIR")]
    pub dir: PathBuf,

    /// Interferometer path-length difference ΔL (m).
    #[arg(long, value_name = "M")]
    pub delta_length: f64,

    /// Device-ID prefix before the geometry value (also filters files).
    #[arg(long, default_value = "")]
    pub prefix: String,

    /// Device-ID suffix after the geometry value.
    #[arg(long, default_value = "")]
    pub suffix: String,

    /// Power channel to analyse (0 = first column after wavelength).
    #[arg(long, default_value_t = 0)]
    pub port: usize,

    /// Moving-average window in samples (1 disables smoothing).
    #[arg(long, default_value_t = 211)]
    pub window: usize,

    /// Keep only wavelengths inside [LOW, HIGH] nm.
    #[arg(long, num_args = 2, value_names = ["LOW", "HIGH"])]
    pub range: Option<Vec<f64>>,

    /// Degree of the baseline polynomial.
    #[arg(long, default_value_t = 4)]
    pub degree: usize,

    #[command(flatten)]
    pub analysis: AnalysisArgs,

    #[command(flatten)]
    pub export: ExportArgs,
}

/// Batch-analysis options shared by `analyze` and `demo`.
#[derive(Debug, Args, Clone)]
pub struct AnalysisArgs {
    /// Minimum peak/trough prominence (dB).
    #[arg(long, default_value_t = DEFAULT_MIN_PROMINENCE)]
    pub prominence: f64,

    /// Half-width of the group-index outlier window around the rounded mode.
    #[arg(long, default_value_t = DEFAULT_OUTLIER_TOLERANCE)]
    pub tolerance: f64,

    /// Number of points in the common aggregation grid.
    #[arg(long, default_value_t = DEFAULT_GRID_POINTS)]
    pub grid_points: usize,

    /// Leading midpoints per device used for the coupling surface.
    #[arg(long, default_value_t = DEFAULT_SURFACE_POINTS)]
    pub surface_points: usize,

    /// Report the aggregate group index at this wavelength (nm).
    #[arg(long, value_name = "NM")]
    pub target: Option<f64>,

    /// Compare against a simulated reference band.
    #[arg(long, value_enum)]
    pub reference: Option<ReferenceBand>,
}

/// Optional result exports.
#[derive(Debug, Args, Clone, Default)]
pub struct ExportArgs {
    /// Export the full run (config, curves, aggregate, surface) to JSON.
    #[arg(long = "export-json", value_name = "PATH")]
    pub json: Option<PathBuf>,

    /// Export the aggregate group-index curve to CSV.
    #[arg(long = "export-curve", value_name = "PATH")]
    pub curve: Option<PathBuf>,

    /// Export per-device group index and coupling to CSV.
    #[arg(id = "export_devices", long = "export-devices", value_name = "PATH")]
    pub devices: Option<PathBuf>,

    /// Export the coupling surface matrix to CSV.
    #[arg(long = "export-surface", value_name = "PATH")]
    pub surface: Option<PathBuf>,
}

/// Options for the synthetic demo.
#[derive(Debug, Parser, Clone)]
pub struct DemoArgs {
    /// Number of synthetic devices.
    #[arg(short = 'n', long, default_value_t = 5)]
    pub devices: usize,

    /// Random seed for noise and alignment offsets.
    #[arg(long, default_value_t = 42)]
    pub seed: u64,

    /// Free spectral range at 1550 nm (nm).
    #[arg(long, default_value_t = 2.0)]
    pub fsr: f64,

    /// True group index of the synthetic waveguide.
    #[arg(long, default_value_t = 4.2)]
    pub group_index: f64,

    /// Std of additive noise (dB).
    #[arg(long, default_value_t = 0.02)]
    pub noise: f64,

    #[command(flatten)]
    pub analysis: AnalysisArgs,

    #[command(flatten)]
    pub export: ExportArgs,
}

/// Options for reprinting a saved run.
#[derive(Debug, Parser)]
pub struct SummaryArgs {
    /// Analysis JSON produced by `--export-json`.
    #[arg(long, value_name = "JSON")]
    pub run: PathBuf,
}
