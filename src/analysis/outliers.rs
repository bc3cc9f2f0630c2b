//! Mode-based outlier rejection for a single device's group-index curve.
//!
//! Group-index samples cluster around a slowly varying level; false peaks and
//! other extraction failures land far away from that cluster. The cluster is
//! located as the mode of the samples rounded to integers, and only samples
//! whose unrounded value lies within `mode ± tolerance` are kept.

use crate::domain::{CleanedCurve, DeviceCurve};
use crate::math::rounded_mode;

/// Keep the `(x, y)` pairs with `y` inside `[mode - tolerance, mode + tolerance]`.
///
/// Pairs with non-finite `y` are always dropped. Order is preserved.
pub fn remove_outliers(x: &[f64], y: &[f64], tolerance: f64) -> (Vec<f64>, Vec<f64>) {
    let n = x.len().min(y.len());
    let Some(mode) = rounded_mode(&y[..n]) else {
        return (Vec::new(), Vec::new());
    };
    let (lower, upper) = (mode - tolerance, mode + tolerance);

    x[..n]
        .iter()
        .zip(y[..n].iter())
        .filter(|(_, v)| **v >= lower && **v <= upper)
        .map(|(a, b)| (*a, *b))
        .unzip()
}

/// Outlier-filtered group-index curve of one device.
pub fn clean_curve(curve: &DeviceCurve, tolerance: f64) -> CleanedCurve {
    let (wavelength_nm, group_index) = remove_outliers(&curve.wavelength_nm, &curve.group_index, tolerance);
    let removed = curve.group_index.len() - group_index.len();
    if removed > 0 {
        log::debug!(
            "{}: removed {removed} of {} group-index samples as outliers",
            curve.id,
            curve.group_index.len()
        );
    }

    CleanedCurve {
        id: curve.id.clone(),
        wavelength_nm,
        group_index,
        mode: rounded_mode(&curve.group_index),
        removed,
    }
}
