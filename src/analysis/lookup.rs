//! Nearest-sample lookup on an aggregate curve.
//!
//! No interpolation happens here: the answer is the grid sample closest to the
//! target, with ties going to the lower index.

use crate::domain::{AggregateCurve, LookupResult};
use crate::error::AnalysisError;

/// Mean and std at the grid point nearest to `target_nm`.
pub fn lookup_at_wavelength(curve: &AggregateCurve, target_nm: f64) -> Result<LookupResult, AnalysisError> {
    if curve.is_empty() {
        return Err(AnalysisError::EmptyAggregationInput(
            "aggregate curve has no grid points".to_string(),
        ));
    }
    if !target_nm.is_finite() {
        return Err(AnalysisError::invalid(format!("target wavelength {target_nm} is not finite")));
    }

    let mut index = 0;
    let mut best = (curve.grid_nm[0] - target_nm).abs();
    for (i, g) in curve.grid_nm.iter().enumerate().skip(1) {
        let d = (g - target_nm).abs();
        if d < best {
            best = d;
            index = i;
        }
    }

    Ok(LookupResult {
        index,
        wavelength_nm: curve.grid_nm[index],
        mean: curve.mean[index],
        std: curve.std[index],
    })
}
