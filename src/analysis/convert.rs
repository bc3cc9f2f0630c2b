//! Conversion of fringe features into physical quantities.
//!
//! - group index of an unbalanced interferometer: `ng = λ² / (FSR · ΔL)`
//! - power coupling from extinction ratio (dB): `κ = 0.5 - 0.5 · sqrt(10^(-ER/10))`
//!
//! `κ` is 0 at ER = 0 dB and approaches 0.5 as ER grows. Negative or non-finite
//! extinction ratios have no physical meaning and yield `None`.

use crate::domain::{DeviceCurve, FeatureSet};
use crate::error::AnalysisError;

const NM_TO_M: f64 = 1e-9;

/// Group index from wavelengths and FSR values in meters.
pub fn group_index_formula(
    wavelengths_m: &[f64],
    fsr_m: &[f64],
    delta_length_m: f64,
) -> Result<Vec<f64>, AnalysisError> {
    if wavelengths_m.len() != fsr_m.len() {
        return Err(AnalysisError::invalid(format!(
            "wavelength ({}) and FSR ({}) lengths differ",
            wavelengths_m.len(),
            fsr_m.len()
        )));
    }
    if !(delta_length_m.is_finite() && delta_length_m > 0.0) {
        return Err(AnalysisError::invalid(format!(
            "path-length difference must be finite and > 0 (got {delta_length_m})"
        )));
    }

    Ok(wavelengths_m
        .iter()
        .zip(fsr_m.iter())
        .map(|(&w, &fsr)| w * w / (fsr * delta_length_m))
        .collect())
}

/// Power coupling coefficient for an extinction ratio in dB.
pub fn coupling_coefficient(extinction_db: f64) -> Option<f64> {
    if !(extinction_db.is_finite() && extinction_db >= 0.0) {
        return None;
    }
    Some(0.5 - 0.5 * 10f64.powf(-extinction_db / 10.0).sqrt())
}

/// Turn one device's features into its group-index and coupling curves.
pub fn convert_to_physical(
    id: &str,
    geometry: f64,
    features: &FeatureSet,
    delta_length_m: f64,
) -> Result<DeviceCurve, AnalysisError> {
    if features.fsr_nm.len() != features.len() || features.extinction_db.len() != features.len() {
        return Err(AnalysisError::invalid(format!(
            "feature sequences of '{id}' have different lengths"
        )));
    }

    let wavelengths_m: Vec<f64> = features.midpoints_nm.iter().map(|w| w * NM_TO_M).collect();
    let fsr_m: Vec<f64> = features.fsr_nm.iter().map(|f| f * NM_TO_M).collect();
    let group_index = group_index_formula(&wavelengths_m, &fsr_m, delta_length_m)?;
    let kappa = features
        .extinction_db
        .iter()
        .map(|&er| coupling_coefficient(er))
        .collect();

    Ok(DeviceCurve {
        id: id.to_string(),
        geometry,
        wavelength_nm: features.midpoints_nm.clone(),
        group_index,
        kappa,
    })
}

/// Geometry parameter encoded in a device ID.
///
/// The ID must start with `prefix` and end with `suffix`; what remains is a
/// number where `p` may stand for the decimal point (`"12p5"` → 12.5).
pub fn parse_device_id(id: &str, prefix: &str, suffix: &str) -> Result<f64, AnalysisError> {
    let parse_err = |reason: String| AnalysisError::IdentifierParseError {
        id: id.to_string(),
        reason,
    };

    let rest = id
        .strip_prefix(prefix)
        .ok_or_else(|| parse_err(format!("expected prefix '{prefix}'")))?;
    let core = rest
        .strip_suffix(suffix)
        .ok_or_else(|| parse_err(format!("expected suffix '{suffix}'")))?;

    let text = core.replace('p', ".");
    let value: f64 = text
        .trim()
        .parse()
        .map_err(|_| parse_err(format!("'{core}' is not numeric")))?;
    if !value.is_finite() {
        return Err(parse_err(format!("'{core}' is not a finite number")));
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn coupling_coefficient_bounds_and_monotonicity() {
        assert_eq!(coupling_coefficient(0.0), Some(0.0));

        let mut last = 0.0;
        for er in [10.0, 20.0, 30.0] {
            let k = coupling_coefficient(er).unwrap();
            assert!(k >= last, "kappa({er})={k} < {last}");
            assert!(k < 0.5);
            last = k;
        }
        assert!((coupling_coefficient(10.0).unwrap() - (0.5 - 0.5 * 0.1f64.sqrt())).abs() < 1e-12);
        assert!((coupling_coefficient(20.0).unwrap() - 0.45).abs() < 1e-12);
    }

    #[test]
    fn coupling_coefficient_undefined_for_negative_er() {
        assert_eq!(coupling_coefficient(-1.0), None);
        assert_eq!(coupling_coefficient(f64::NAN), None);
    }

    #[test]
    fn group_index_matches_closed_form() {
        // 1550 nm, FSR 2 nm, ΔL 100 µm -> ng = 1550e-9² / (2e-9 · 1e-4) = 12.0125
        let ng = group_index_formula(&[1550e-9], &[2e-9], 100e-6).unwrap();
        assert!((ng[0] - 12.0125).abs() < 1e-9);
        assert!(group_index_formula(&[1550e-9], &[2e-9], 0.0).is_err());
    }

    #[test]
    fn convert_keeps_midpoints_and_lengths() {
        let features = FeatureSet {
            midpoints_nm: vec![1549.0, 1551.0],
            fsr_nm: vec![2.0, 2.0],
            extinction_db: vec![10.0, -0.5],
            peak_indices: vec![0, 10, 20],
            trough_indices: vec![5, 15],
        };
        let curve = convert_to_physical("DC_L10", 10.0, &features, 100e-6).unwrap();
        assert_eq!(curve.wavelength_nm, features.midpoints_nm);
        assert_eq!(curve.group_index.len(), 2);
        assert!(curve.kappa[0].is_some());
        assert!(curve.kappa[1].is_none());
    }

    #[test]
    fn parse_device_id_handles_decimal_marker() {
        assert_eq!(parse_device_id("DC_L12p5um", "DC_L", "um").unwrap(), 12.5);
        assert_eq!(parse_device_id("MZI40", "MZI", "").unwrap(), 40.0);
        assert!(matches!(
            parse_device_id("RING_40", "MZI", ""),
            Err(AnalysisError::IdentifierParseError { .. })
        ));
        assert!(parse_device_id("MZIabc", "MZI", "").is_err());
    }
}
