//! Periodic feature extraction: FSR and extinction ratio per fringe.
//!
//! Given a baseline-corrected interferometer spectrum, consecutive prominent
//! peaks define one fringe each. For fringe `i` (between peak `i` and peak `i+1`):
//!
//! - `fsr[i]      = λ(peak[i+1]) - λ(peak[i])`
//! - `midpoint[i] = (λ(peak[i]) + λ(peak[i+1])) / 2`
//! - `er[i]       = |T(peak[i]) - T(trough[i])|`
//!
//! Troughs are paired with peaks by index after skipping troughs that precede the
//! first peak. The pairing is only meaningful when peaks and troughs alternate,
//! so every paired trough must sit strictly inside its fringe; otherwise the
//! spectrum is rejected as malformed instead of being silently mispaired.

use crate::domain::FeatureSet;
use crate::error::AnalysisError;
use crate::spectrum::peaks::find_peaks;

/// Extract midpoints, FSR values and extinction ratios from a spectrum.
///
/// `wavelength_nm` must be strictly increasing and the same length as `transmission`.
pub fn extract_features(
    wavelength_nm: &[f64],
    transmission: &[f64],
    min_prominence: f64,
) -> Result<FeatureSet, AnalysisError> {
    if wavelength_nm.len() != transmission.len() {
        return Err(AnalysisError::invalid(format!(
            "wavelength ({}) and transmission ({}) lengths differ",
            wavelength_nm.len(),
            transmission.len()
        )));
    }
    if !(min_prominence.is_finite() && min_prominence > 0.0) {
        return Err(AnalysisError::invalid("prominence threshold must be > 0"));
    }
    if wavelength_nm.windows(2).any(|w| !(w[1] > w[0])) {
        return Err(AnalysisError::invalid("wavelengths must be strictly increasing"));
    }
    if transmission.iter().any(|v| !v.is_finite()) {
        return Err(AnalysisError::malformed("transmission contains non-finite samples"));
    }

    let mean = transmission.iter().sum::<f64>() / transmission.len().max(1) as f64;
    let centered: Vec<f64> = transmission.iter().map(|v| v - mean).collect();
    let inverted: Vec<f64> = centered.iter().map(|v| -v).collect();

    let peaks: Vec<usize> = find_peaks(&centered, min_prominence)
        .into_iter()
        .map(|p| p.index)
        .collect();
    let troughs: Vec<usize> = find_peaks(&inverted, min_prominence)
        .into_iter()
        .map(|p| p.index)
        .collect();

    if peaks.len() < 2 {
        return Err(AnalysisError::malformed(format!(
            "found {} peak(s) with prominence >= {min_prominence}; need at least 2",
            peaks.len()
        )));
    }

    let fringes = peaks.len() - 1;
    let skip = troughs.partition_point(|&t| t < peaks[0]);
    let paired = &troughs[skip..];
    if paired.len() < fringes {
        return Err(AnalysisError::malformed(format!(
            "{} trough(s) after the first peak for {fringes} fringe(s)",
            paired.len()
        )));
    }

    let mut features = FeatureSet {
        midpoints_nm: Vec::with_capacity(fringes),
        fsr_nm: Vec::with_capacity(fringes),
        extinction_db: Vec::with_capacity(fringes),
        peak_indices: peaks.clone(),
        trough_indices: troughs.clone(),
    };

    for i in 0..fringes {
        let (p0, p1, t) = (peaks[i], peaks[i + 1], paired[i]);
        if !(p0 < t && t < p1) {
            return Err(AnalysisError::malformed(format!(
                "peaks and troughs do not alternate: trough at {:.4} nm is outside fringe [{:.4}, {:.4}] nm",
                wavelength_nm[t], wavelength_nm[p0], wavelength_nm[p1]
            )));
        }

        let (w0, w1) = (wavelength_nm[p0], wavelength_nm[p1]);
        features.fsr_nm.push(w1 - w0);
        features.midpoints_nm.push((w0 + w1) / 2.0);
        features
            .extinction_db
            .push((transmission[p0] - transmission[t]).abs());
    }

    Ok(features)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;

    fn sinusoid(start: f64, stop: f64, step: f64, period: f64, phase: f64, amp: f64) -> (Vec<f64>, Vec<f64>) {
        let n = ((stop - start) / step).round() as usize + 1;
        let w: Vec<f64> = (0..n).map(|i| start + step * i as f64).collect();
        let t: Vec<f64> = w
            .iter()
            .map(|&x| -10.0 + amp * (2.0 * PI * (x - start) / period + phase).sin())
            .collect();
        (w, t)
    }

    #[test]
    fn recovers_period_of_pure_sinusoid_for_any_phase() {
        let step = 0.005;
        for &period in &[0.8, 2.0, 5.5] {
            for &phase in &[0.0, 0.7, PI / 2.0, 2.5, PI, 4.4] {
                let (w, t) = sinusoid(1500.0, 1600.0, step, period, phase, 2.0);
                let features = extract_features(&w, &t, 0.25).unwrap();
                assert!(features.len() >= 10, "period {period} phase {phase}: {} fringes", features.len());
                for &fsr in &features.fsr_nm {
                    assert!(
                        (fsr - period).abs() <= 2.0 * step + 1e-9,
                        "period {period} phase {phase}: fsr {fsr}"
                    );
                }
            }
        }
    }

    #[test]
    fn sequences_share_length_and_midpoints_increase() {
        let (w, t) = sinusoid(1540.0, 1560.0, 0.01, 2.0, 0.3, 3.0);
        let f = extract_features(&w, &t, 0.25).unwrap();
        assert_eq!(f.len(), f.peak_indices.len() - 1);
        assert_eq!(f.fsr_nm.len(), f.len());
        assert_eq!(f.extinction_db.len(), f.len());
        assert!(f.midpoints_nm.windows(2).all(|m| m[1] > m[0]));
        for &er in &f.extinction_db {
            assert!((er - 6.0).abs() < 0.01, "extinction ratio {er}");
        }
    }

    #[test]
    fn flat_or_single_peak_spectrum_is_malformed() {
        let w: Vec<f64> = (0..100).map(|i| 1550.0 + 0.01 * i as f64).collect();
        let flat = vec![-3.0; 100];
        assert!(matches!(
            extract_features(&w, &flat, 0.25),
            Err(AnalysisError::MalformedSpectrum { .. })
        ));

        let (w, t) = sinusoid(1550.0, 1551.5, 0.01, 2.0, 0.0, 2.0);
        assert!(matches!(
            extract_features(&w, &t, 0.25),
            Err(AnalysisError::MalformedSpectrum { .. })
        ));
    }

    #[test]
    fn non_alternating_extrema_are_rejected() {
        // Two prominent peaks with no trough of sufficient prominence between them.
        let w: Vec<f64> = (0..9).map(|i| i as f64).collect();
        let t = [0.0, 3.0, 2.9, 3.0, 0.0, 0.0, 0.0, 0.0, 0.0];
        let err = extract_features(&w, &t, 0.25);
        assert!(matches!(err, Err(AnalysisError::MalformedSpectrum { .. })), "{err:?}");
    }

    #[test]
    fn mismatched_lengths_are_invalid_input() {
        assert!(matches!(
            extract_features(&[1.0, 2.0], &[1.0], 0.25),
            Err(AnalysisError::InvalidInput(_))
        ));
    }
}
