//! Coupling-coefficient surface over (device geometry, wavelength).
//!
//! Only the first `leading` fringes of each device are used. The wavelength
//! axis is the sorted union of those midpoints over all devices, and every
//! device row is interpolated onto it with linear extrapolation outside the
//! device's own span. Device domains differ, so extrapolation is required to
//! fill a rectangular grid. Rows are ordered by ascending geometry parameter.

use std::cmp::Ordering;

use crate::domain::{CouplingSurface, DeviceCurve};
use crate::error::AnalysisError;
use crate::math::Interpolant;

/// Assemble the coupling surface from per-device curves.
pub fn build_surface(devices: &[DeviceCurve], leading: usize) -> Result<CouplingSurface, AnalysisError> {
    if devices.is_empty() {
        return Err(AnalysisError::EmptyAggregationInput(
            "no devices to build a coupling surface from".to_string(),
        ));
    }
    if leading == 0 {
        return Err(AnalysisError::invalid("surface needs at least one midpoint per device"));
    }

    let mut order: Vec<&DeviceCurve> = devices.iter().collect();
    order.sort_by(|a, b| match a.geometry.total_cmp(&b.geometry) {
        Ordering::Equal => a.id.cmp(&b.id),
        other => other,
    });

    let mut rows: Vec<(&DeviceCurve, Interpolant)> = Vec::with_capacity(order.len());
    let mut skipped = Vec::new();
    let mut axis: Vec<f64> = Vec::new();

    for device in order {
        let n = leading.min(device.wavelength_nm.len()).min(device.kappa.len());
        let wavelengths = &device.wavelength_nm[..n];
        let (x, y): (Vec<f64>, Vec<f64>) = wavelengths
            .iter()
            .zip(device.kappa[..n].iter())
            .filter_map(|(w, k)| k.map(|k| (*w, k)))
            .unzip();

        match Interpolant::new(&x, &y) {
            Some(f) => {
                axis.extend(wavelengths.iter().copied().filter(|w| w.is_finite()));
                rows.push((device, f));
            }
            None => {
                log::warn!("{}: no usable coupling samples; left out of the surface", device.id);
                skipped.push(device.id.clone());
            }
        }
    }

    if rows.is_empty() {
        return Err(AnalysisError::EmptyAggregationInput(format!(
            "none of {} device(s) has coupling samples",
            devices.len()
        )));
    }

    axis.sort_by(f64::total_cmp);
    axis.dedup();

    let kappa = rows
        .iter()
        .map(|(_, f)| axis.iter().map(|&w| f.eval_extrapolate(w)).collect())
        .collect();

    Ok(CouplingSurface {
        wavelength_nm: axis,
        geometry: rows.iter().map(|(d, _)| d.geometry).collect(),
        device_ids: rows.iter().map(|(d, _)| d.id.clone()).collect(),
        kappa,
        skipped,
    })
}
