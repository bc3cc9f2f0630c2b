//! Synthetic interferometer spectra for the `ng demo` command and tests.
//!
//! Each device is an unbalanced Mach-Zehnder interferometer built from two
//! identical directional couplers of length `L`. Its through-port transmission is
//!
//! `T(λ) = (1-κ)² + κ² - 2κ(1-κ)·cos φ(λ)`,  `φ = 2π·n_eff(λ)·ΔL / λ`
//!
//! with a linear effective index whose group index is constant. The coupler
//! power coupling `κ` grows with `L` and with wavelength. A parabolic
//! grating-coupler envelope and Gaussian noise (dB) are added on top.

use std::f64::consts::PI;

use rand::prelude::*;
use rand::rngs::StdRng;
use rand_distr::Normal;

use crate::domain::{DeviceNaming, RawSpectrum};
use crate::error::AppError;

/// Wavelength at which FSR and effective index are specified.
pub const CENTER_WAVELENGTH_NM: f64 = 1550.0;

const EFFECTIVE_INDEX: f64 = 2.44;
const COUPLING_LENGTH_UM: f64 = 40.0;
const ENVELOPE_LOSS_DB: f64 = 6.0;
const ENVELOPE_ROLLOFF_DB: f64 = 8.0;

#[derive(Debug, Clone)]
pub struct DemoConfig {
    pub devices: usize,
    pub seed: u64,
    /// Free spectral range at the centre wavelength (nm).
    pub fsr_nm: f64,
    pub group_index: f64,
    /// Std of additive noise in dB (0 disables noise).
    pub noise_db: f64,
    pub start_nm: f64,
    pub stop_nm: f64,
    pub step_nm: f64,
    /// Shortest coupler length (µm); later devices step up by `length_step_um`.
    pub first_length_um: f64,
    pub length_step_um: f64,
}

impl Default for DemoConfig {
    fn default() -> Self {
        Self {
            devices: 5,
            seed: 42,
            fsr_nm: 2.0,
            group_index: 4.2,
            noise_db: 0.02,
            start_nm: 1500.0,
            stop_nm: 1600.0,
            step_nm: 0.002,
            first_length_um: 5.0,
            length_step_um: 5.0,
        }
    }
}

impl DemoConfig {
    /// Path-length difference that yields `fsr_nm` at the centre wavelength.
    pub fn delta_length_m(&self) -> f64 {
        let lambda_m = CENTER_WAVELENGTH_NM * 1e-9;
        lambda_m * lambda_m / (self.group_index * self.fsr_nm * 1e-9)
    }

    /// Moving-average window (samples) spanning about 5% of one fringe.
    pub fn smoothing_window(&self) -> usize {
        let w = (0.05 * self.fsr_nm / self.step_nm).round() as usize;
        w.max(1) | 1
    }

    /// Naming convention used for the generated device IDs.
    pub fn naming(&self) -> DeviceNaming {
        DeviceNaming {
            prefix: "MZI_L".to_string(),
            suffix: "um".to_string(),
        }
    }

    fn validate(&self) -> Result<(), AppError> {
        if self.devices == 0 {
            return Err(AppError::new(2, "Device count must be > 0."));
        }
        if !(self.fsr_nm.is_finite() && self.fsr_nm > 0.0) {
            return Err(AppError::new(2, "FSR must be finite and > 0."));
        }
        if !(self.group_index.is_finite() && self.group_index > 0.0) {
            return Err(AppError::new(2, "Group index must be finite and > 0."));
        }
        if !(self.noise_db.is_finite() && self.noise_db >= 0.0) {
            return Err(AppError::new(2, "Noise level must be finite and >= 0."));
        }
        if !(self.start_nm.is_finite() && self.stop_nm.is_finite() && self.stop_nm > self.start_nm) {
            return Err(AppError::new(2, "Invalid wavelength range for demo spectra."));
        }
        if !(self.step_nm.is_finite() && self.step_nm > 0.0) {
            return Err(AppError::new(2, "Wavelength step must be finite and > 0."));
        }
        if self.fsr_nm < 10.0 * self.step_nm {
            return Err(AppError::new(
                2,
                format!(
                    "FSR {} nm is under-sampled at a {} nm step",
                    self.fsr_nm, self.step_nm
                ),
            ));
        }
        Ok(())
    }
}

/// Generated devices plus the settings needed to analyse them.
#[derive(Debug, Clone)]
pub struct DemoBatch {
    pub spectra: Vec<RawSpectrum>,
    pub naming: DeviceNaming,
    pub delta_length_m: f64,
    /// Coupler lengths (µm), one per spectrum.
    pub lengths_um: Vec<f64>,
}

pub fn generate_devices(config: &DemoConfig) -> Result<DemoBatch, AppError> {
    config.validate()?;

    let mut rng = StdRng::seed_from_u64(config.seed);
    let noise = Normal::new(0.0, config.noise_db)
        .map_err(|e| AppError::new(4, format!("Noise distribution error: {e}")))?;

    let delta_length_nm = config.delta_length_m() * 1e9;
    // Linear n_eff(λ) with n_eff - λ·dn/dλ = ng.
    let slope = (EFFECTIVE_INDEX - config.group_index) / CENTER_WAVELENGTH_NM;
    let n = ((config.stop_nm - config.start_nm) / config.step_nm).floor() as usize + 1;
    let wavelength: Vec<f64> = (0..n).map(|i| config.start_nm + config.step_nm * i as f64).collect();
    let half_span = (config.stop_nm - config.start_nm) / 2.0;
    let naming = config.naming();

    let mut spectra = Vec::with_capacity(config.devices);
    let mut lengths_um = Vec::with_capacity(config.devices);

    for i in 0..config.devices {
        let length_um = config.first_length_um + config.length_step_um * i as f64;
        // Each device sits at a slightly different fibre alignment.
        let offset_db = rng.gen_range(-0.5..0.5);

        let power = wavelength
            .iter()
            .map(|&w| {
                let n_eff = EFFECTIVE_INDEX + slope * (w - CENTER_WAVELENGTH_NM);
                let phi = 2.0 * PI * n_eff * delta_length_nm / w;
                let k = coupler_kappa(length_um, w);
                let t = (1.0 - k).powi(2) + k * k - 2.0 * k * (1.0 - k) * phi.cos();

                let u = (w - CENTER_WAVELENGTH_NM) / half_span;
                let envelope = -ENVELOPE_LOSS_DB - ENVELOPE_ROLLOFF_DB * u * u + offset_db;
                let jitter = if config.noise_db > 0.0 { noise.sample(&mut rng) } else { 0.0 };
                10.0 * t.max(1e-12).log10() + envelope + jitter
            })
            .collect();

        spectra.push(RawSpectrum {
            id: format!("{}{}{}", naming.prefix, encode_geometry(length_um), naming.suffix),
            wavelength_nm: wavelength.clone(),
            channels: vec![power],
        });
        lengths_um.push(length_um);
    }

    Ok(DemoBatch {
        spectra,
        naming,
        delta_length_m: config.delta_length_m(),
        lengths_um,
    })
}

/// Power coupling of one directional coupler, kept inside [0.1, 0.45].
pub fn coupler_kappa(length_um: f64, wavelength_nm: f64) -> f64 {
    let coupling_length = COUPLING_LENGTH_UM * (CENTER_WAVELENGTH_NM / wavelength_nm).powi(2);
    let s = (PI / 2.0 * length_um / coupling_length).sin();
    0.1 + 0.35 * s * s
}

/// Geometry value as it appears in a device ID (`12.5` -> `"12p5"`).
pub fn encode_geometry(value: f64) -> String {
    format!("{value}").replace('.', "p")
}
