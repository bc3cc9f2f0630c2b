//! Read/write analysis JSON files.
//!
//! The JSON file is the portable record of a run:
//! - run metadata (tool, timestamp, configuration)
//! - per-device curves and exclusions
//! - the aggregate group-index curve, lookup and coupling surface
//!
//! `ng summary --run <file>` reprints the summary from it without re-analysing.

use std::fs::File;
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::analysis::ReferenceCurve;
use crate::app::pipeline::AnalysisRun;
use crate::domain::{
    AggregateCurve, AnalysisConfig, CouplingSurface, DeviceCurve, ExcludedDevice, LookupResult,
};
use crate::error::AppError;

/// On-disk schema of an analysis run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisFile {
    pub tool: String,
    pub created_at: DateTime<Utc>,
    pub config: AnalysisConfig,
    pub devices: Vec<DeviceCurve>,
    pub excluded: Vec<ExcludedDevice>,
    pub aggregate: AggregateCurve,
    pub lookup: Option<LookupResult>,
    pub surface: CouplingSurface,
    #[serde(default)]
    pub reference: Option<ReferenceCurve>,
    #[serde(default)]
    pub reference_at_target: Option<f64>,
}

impl AnalysisFile {
    pub fn from_run(run: &AnalysisRun, config: &AnalysisConfig) -> Self {
        Self {
            tool: "ng".to_string(),
            created_at: Utc::now(),
            config: config.clone(),
            devices: run.curves(),
            excluded: run.excluded.clone(),
            aggregate: run.aggregate.clone(),
            lookup: run.lookup,
            surface: run.surface.clone(),
            reference: run.reference.clone(),
            reference_at_target: run.reference_at_target,
        }
    }
}

/// Write an analysis JSON file.
pub fn write_analysis_json(path: &Path, run: &AnalysisRun, config: &AnalysisConfig) -> Result<(), AppError> {
    let file = File::create(path)
        .map_err(|e| AppError::new(2, format!("Failed to create analysis JSON '{}': {e}", path.display())))?;

    serde_json::to_writer_pretty(file, &AnalysisFile::from_run(run, config))
        .map_err(|e| AppError::new(2, format!("Failed to write analysis JSON: {e}")))?;

    log::info!("wrote {}", path.display());
    Ok(())
}

/// Read an analysis JSON file.
pub fn read_analysis_json(path: &Path) -> Result<AnalysisFile, AppError> {
    let file = File::open(path)
        .map_err(|e| AppError::new(2, format!("Failed to open analysis JSON '{}': {e}", path.display())))?;
    let analysis: AnalysisFile =
        serde_json::from_reader(file).map_err(|e| AppError::new(2, format!("Invalid analysis JSON: {e}")))?;
    Ok(analysis)
}
