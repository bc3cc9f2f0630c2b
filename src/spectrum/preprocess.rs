//! Spectrum conditioning applied before feature extraction.
//!
//! - `smooth`: centred moving average (low-pass)
//! - `truncate`: inclusive wavelength window
//! - `baseline_correct`: remove the slow background trend with a polynomial fit

use crate::error::AnalysisError;
use crate::math::{fit_polynomial, polyval};

/// Centred moving average over `window` samples.
///
/// Even windows are widened by one sample so the filter stays centred. Near the
/// edges the window shrinks to the samples available. A window of 1 returns the
/// input unchanged.
pub fn smooth(wavelength_nm: &[f64], power: &[f64], window: usize) -> Result<Vec<f64>, AnalysisError> {
    if wavelength_nm.len() != power.len() {
        return Err(AnalysisError::invalid(format!(
            "wavelength ({}) and power ({}) lengths differ",
            wavelength_nm.len(),
            power.len()
        )));
    }
    if window == 0 {
        return Err(AnalysisError::invalid("smoothing window must be >= 1"));
    }
    let window = if window % 2 == 0 { window + 1 } else { window };
    if window == 1 || power.is_empty() {
        return Ok(power.to_vec());
    }

    let n = power.len();
    let half = window / 2;
    let mut prefix = Vec::with_capacity(n + 1);
    prefix.push(0.0);
    for v in power {
        let last = prefix[prefix.len() - 1];
        prefix.push(last + v);
    }

    let out = (0..n)
        .map(|i| {
            let lo = i.saturating_sub(half);
            let hi = (i + half + 1).min(n);
            (prefix[hi] - prefix[lo]) / (hi - lo) as f64
        })
        .collect();
    Ok(out)
}

/// Keep samples whose wavelength lies in `[low, high]`.
pub fn truncate(wavelength_nm: &[f64], power: &[f64], low: f64, high: f64) -> (Vec<f64>, Vec<f64>) {
    wavelength_nm
        .iter()
        .zip(power.iter())
        .filter(|(w, _)| **w >= low && **w <= high)
        .map(|(w, p)| (*w, *p))
        .unzip()
}

/// Subtract a least-squares polynomial background of the given degree.
///
/// The fit runs on wavelength mapped to [-1, 1]; the returned coefficients are in
/// that normalized variable (ascending powers).
pub fn baseline_correct(
    wavelength_nm: &[f64],
    power: &[f64],
    degree: usize,
) -> Result<(Vec<f64>, Vec<f64>), AnalysisError> {
    if wavelength_nm.len() != power.len() {
        return Err(AnalysisError::invalid(format!(
            "wavelength ({}) and power ({}) lengths differ",
            wavelength_nm.len(),
            power.len()
        )));
    }
    if wavelength_nm.len() <= degree {
        return Err(AnalysisError::invalid(format!(
            "{} samples cannot support a degree-{degree} baseline",
            wavelength_nm.len()
        )));
    }

    let x = normalize_axis(wavelength_nm)
        .ok_or_else(|| AnalysisError::invalid("wavelength axis has zero span"))?;
    let coeffs = fit_polynomial(&x, power, degree)
        .ok_or_else(|| AnalysisError::invalid("baseline polynomial fit is singular"))?;

    let corrected = x
        .iter()
        .zip(power.iter())
        .map(|(&xi, &p)| p - polyval(&coeffs, xi))
        .collect();
    Ok((corrected, coeffs))
}

fn normalize_axis(values: &[f64]) -> Option<Vec<f64>> {
    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let half = (max - min) / 2.0;
    if !(half.is_finite() && half > 0.0) {
        return None;
    }
    let mid = (max + min) / 2.0;
    Some(values.iter().map(|v| (v - mid) / half).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn smooth_averages_and_preserves_constants() {
        let w = [0.0, 1.0, 2.0, 3.0, 4.0];
        let p = [0.0, 0.0, 3.0, 0.0, 0.0];
        let s = smooth(&w, &p, 3).unwrap();
        assert_eq!(s, vec![0.0, 1.0, 1.0, 1.0, 0.0]);

        let flat = [2.0; 5];
        assert_eq!(smooth(&w, &flat, 4).unwrap(), vec![2.0; 5]);
        assert!(smooth(&w, &p, 0).is_err());
    }

    #[test]
    fn truncate_is_inclusive() {
        let w = [1.0, 2.0, 3.0, 4.0];
        let p = [10.0, 20.0, 30.0, 40.0];
        let (tw, tp) = truncate(&w, &p, 2.0, 3.0);
        assert_eq!(tw, vec![2.0, 3.0]);
        assert_eq!(tp, vec![20.0, 30.0]);
    }

    #[test]
    fn baseline_correct_removes_polynomial_trend() {
        let w: Vec<f64> = (0..201).map(|i| 1500.0 + 0.5 * i as f64).collect();
        let p: Vec<f64> = w
            .iter()
            .map(|&x| -20.0 + 0.01 * (x - 1550.0) - 2e-4 * (x - 1550.0).powi(2))
            .collect();
        let (corrected, coeffs) = baseline_correct(&w, &p, 2).unwrap();
        assert_eq!(coeffs.len(), 3);
        assert!(corrected.iter().all(|v| v.abs() < 1e-8));
    }
}
