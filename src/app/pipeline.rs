//! Shared analysis pipeline used by the `analyze` and `demo` commands.
//!
//! Per device: parse id -> smooth -> truncate -> baseline -> features -> physical.
//! Devices are independent, so this phase runs on the rayon pool; every task
//! writes one owned result into its own slot and nothing is shared until the
//! join. Batch steps (outlier removal, aggregation, lookup, surface) run after.
//!
//! A device that fails any per-device step is excluded with a reason; only an
//! empty aggregation aborts the run.

use std::cmp::Ordering;

use rayon::prelude::*;

use crate::analysis::{
    ReferenceCurve, aggregate_curves, build_surface, clean_curve, common_grid, convert_to_physical,
    lookup_at_wavelength, parse_device_id, reference_curve,
};
use crate::domain::{
    AggregateCurve, AnalysisConfig, CleanedCurve, CouplingSurface, DeviceCurve, DeviceRecord, ExcludedDevice,
    FeatureSet, LookupResult, RawSpectrum, Stage,
};
use crate::error::AnalysisError;
use crate::spectrum::{baseline_correct, extract_features, smooth, truncate};

/// One device that made it through every per-device stage.
#[derive(Debug, Clone)]
pub struct ProcessedDevice {
    pub record: DeviceRecord,
    pub features: FeatureSet,
    pub curve: DeviceCurve,
}

/// All computed outputs of a single run.
#[derive(Debug, Clone)]
pub struct AnalysisRun {
    /// Ordered by geometry parameter, ties by ID.
    pub devices: Vec<ProcessedDevice>,
    pub excluded: Vec<ExcludedDevice>,
    pub cleaned: Vec<CleanedCurve>,
    pub aggregate: AggregateCurve,
    pub lookup: Option<LookupResult>,
    pub surface: CouplingSurface,
    pub reference: Option<ReferenceCurve>,
    /// Reference group index at the lookup grid point, when both exist.
    pub reference_at_target: Option<f64>,
}

impl AnalysisRun {
    pub fn curves(&self) -> Vec<DeviceCurve> {
        self.devices.iter().map(|d| d.curve.clone()).collect()
    }
}

/// Execute the full analysis over already-loaded spectra.
pub fn run_analysis(spectra: &[RawSpectrum], config: &AnalysisConfig) -> Result<AnalysisRun, AnalysisError> {
    config.validate()?;
    log::info!("analysing {} device(s)", spectra.len());

    // 1) Per-device processing, one slot per input.
    let slots: Vec<Result<ProcessedDevice, ExcludedDevice>> =
        spectra.par_iter().map(|raw| process_device(raw, config)).collect();

    // 2) Join.
    let mut devices = Vec::with_capacity(slots.len());
    let mut excluded = Vec::new();
    for slot in slots {
        match slot {
            Ok(device) => devices.push(device),
            Err(ex) => {
                log::warn!("{}: excluded at {} stage: {}", ex.id, ex.stage.label(), ex.reason);
                excluded.push(ex);
            }
        }
    }
    devices.sort_by(|a, b| match a.record.geometry.total_cmp(&b.record.geometry) {
        Ordering::Equal => a.record.id.cmp(&b.record.id),
        other => other,
    });
    log::info!("{} device(s) processed, {} excluded", devices.len(), excluded.len());

    // 3) Group index: clean, aggregate, look up.
    let cleaned: Vec<CleanedCurve> = devices
        .iter()
        .map(|d| clean_curve(&d.curve, config.outlier_tolerance))
        .collect();
    let grid = common_grid(&cleaned, config.grid_points)?;
    let aggregate = aggregate_curves(&cleaned, &grid)?;
    let lookup = config
        .target_wavelength_nm
        .map(|target| lookup_at_wavelength(&aggregate, target))
        .transpose()?;
    if let Some(hit) = &lookup {
        log::info!(
            "group index at {:.2} nm: {:.4} ± {:.4}",
            hit.wavelength_nm,
            hit.mean,
            hit.std
        );
    }

    // 4) Coupling surface.
    let curves: Vec<DeviceCurve> = devices.iter().map(|d| d.curve.clone()).collect();
    let surface = build_surface(&curves, config.surface_points)?;

    // 5) Optional reference.
    let reference = config.reference.map(reference_curve);
    let reference_at_target = match (&reference, &lookup) {
        (Some(r), Some(hit)) => r.group_index_at(hit.wavelength_nm),
        _ => None,
    };

    Ok(AnalysisRun {
        devices,
        excluded,
        cleaned,
        aggregate,
        lookup,
        surface,
        reference,
        reference_at_target,
    })
}

/// Run one device through every per-device stage.
pub fn process_device(raw: &RawSpectrum, config: &AnalysisConfig) -> Result<ProcessedDevice, ExcludedDevice> {
    let record = prepare_record(raw, config)?;

    let features = extract_features(&record.wavelength_nm, &record.corrected, config.min_prominence)
        .map_err(|e| ExcludedDevice::new(&record.id, Stage::Features, e))?;

    let curve = convert_to_physical(&record.id, record.geometry, &features, config.delta_length_m)
        .map_err(|e| ExcludedDevice::new(&record.id, Stage::Conversion, e))?;

    log::debug!(
        "{}: {} fringe(s), geometry {}",
        record.id,
        features.len(),
        record.geometry
    );

    Ok(ProcessedDevice {
        record,
        features,
        curve,
    })
}

/// Parse the device ID and condition the selected power channel.
pub fn prepare_record(raw: &RawSpectrum, config: &AnalysisConfig) -> Result<DeviceRecord, ExcludedDevice> {
    let geometry = parse_device_id(&raw.id, &config.naming.prefix, &config.naming.suffix)
        .map_err(|e| ExcludedDevice::new(&raw.id, Stage::Identifier, e))?;

    let preprocess_err = |e: AnalysisError| ExcludedDevice::new(&raw.id, Stage::Preprocess, e);

    let channel = raw.channels.get(config.port).ok_or_else(|| {
        preprocess_err(AnalysisError::invalid(format!(
            "port {} not present ({} channel(s) available)",
            config.port,
            raw.channels.len()
        )))
    })?;

    let smoothed = smooth(&raw.wavelength_nm, channel, config.smooth_window.max(1)).map_err(preprocess_err)?;

    let (wavelength_nm, power) = match config.wavelength_range_nm {
        Some((low, high)) => truncate(&raw.wavelength_nm, &smoothed, low, high),
        None => (raw.wavelength_nm.clone(), smoothed),
    };
    if wavelength_nm.is_empty() {
        return Err(preprocess_err(AnalysisError::invalid(
            "no samples left inside the wavelength range",
        )));
    }

    let (corrected, baseline_fit) =
        baseline_correct(&wavelength_nm, &power, config.baseline_degree).map_err(preprocess_err)?;

    Ok(DeviceRecord {
        id: raw.id.clone(),
        geometry,
        wavelength_nm,
        power,
        corrected,
        baseline_fit,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{DemoConfig, generate_devices};
    use crate::domain::ReferenceBand;

    fn demo_config() -> (Vec<RawSpectrum>, AnalysisConfig) {
        let demo = DemoConfig {
            devices: 3,
            noise_db: 0.0,
            start_nm: 1530.0,
            stop_nm: 1570.0,
            step_nm: 0.001,
            ..DemoConfig::default()
        };
        let batch = generate_devices(&demo).unwrap();
        let mut config = AnalysisConfig::with_delta_length(batch.delta_length_m);
        config.naming = batch.naming.clone();
        config.smooth_window = 51;
        config.target_wavelength_nm = Some(1550.0);
        (batch.spectra, config)
    }

    #[test]
    fn recovers_group_index_of_synthetic_devices() {
        let (spectra, config) = demo_config();
        let run = run_analysis(&spectra, &config).unwrap();

        assert!(run.excluded.is_empty(), "excluded: {:?}", run.excluded);
        assert_eq!(run.devices.len(), 3);
        let hit = run.lookup.unwrap();
        assert!((hit.wavelength_nm - 1550.0).abs() < 1.0);
        assert!((hit.mean - 4.2).abs() < 0.02, "mean = {}", hit.mean);
        assert!(hit.std < 0.01, "std = {}", hit.std);
    }

    #[test]
    fn devices_are_ordered_by_geometry_and_surface_matches() {
        let (mut spectra, config) = demo_config();
        spectra.reverse();
        let run = run_analysis(&spectra, &config).unwrap();

        let geometry: Vec<f64> = run.devices.iter().map(|d| d.record.geometry).collect();
        assert_eq!(geometry, vec![5.0, 10.0, 15.0]);
        assert_eq!(run.surface.geometry, geometry);
        assert!(run.surface.kappa.iter().all(|row| row.len() == run.surface.wavelength_nm.len()));
        // Longer couplers couple more.
        assert!(run.surface.kappa[2][0] > run.surface.kappa[0][0]);
    }

    #[test]
    fn failing_devices_are_excluded_not_fatal() {
        let (mut spectra, config) = demo_config();
        spectra.push(RawSpectrum {
            id: "BAD_NAME".to_string(),
            wavelength_nm: spectra[0].wavelength_nm.clone(),
            channels: spectra[0].channels.clone(),
        });
        let n = spectra[0].wavelength_nm.len();
        spectra.push(RawSpectrum {
            id: "MZI_L99um".to_string(),
            wavelength_nm: spectra[0].wavelength_nm.clone(),
            channels: vec![vec![-3.0; n]],
        });

        let run = run_analysis(&spectra, &config).unwrap();
        assert_eq!(run.devices.len(), 3);
        assert_eq!(run.excluded.len(), 2);

        let stage_of = |id: &str| run.excluded.iter().find(|e| e.id == id).map(|e| e.stage);
        assert_eq!(stage_of("BAD_NAME"), Some(Stage::Identifier));
        assert_eq!(stage_of("MZI_L99um"), Some(Stage::Features));
    }

    #[test]
    fn missing_port_is_a_preprocess_exclusion() {
        let (spectra, mut config) = demo_config();
        config.port = 3;
        let err = process_device(&spectra[0], &config).unwrap_err();
        assert_eq!(err.stage, Stage::Preprocess);
    }

    #[test]
    fn all_devices_failing_is_an_empty_aggregation() {
        let (spectra, mut config) = demo_config();
        config.naming.prefix = "NOPE_".to_string();
        assert!(matches!(
            run_analysis(&spectra, &config),
            Err(AnalysisError::EmptyAggregationInput(_))
        ));
    }

    #[test]
    fn reference_is_evaluated_at_the_lookup_point() {
        let (spectra, mut config) = demo_config();
        config.reference = Some(ReferenceBand::C1550);
        let run = run_analysis(&spectra, &config).unwrap();
        let ng = run.reference_at_target.unwrap();
        assert!(ng > 4.0 && ng < 4.4);
    }
}
