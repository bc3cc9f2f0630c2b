//! Reductions over partially defined samples.
//!
//! Undefined samples are `None` rather than NaN. Every reduction here ignores
//! `None` entries and returns `None` when nothing is defined.

use crate::math::interp::lerp;

/// Mean of the defined entries.
pub fn mean_defined(values: &[Option<f64>]) -> Option<f64> {
    let mut sum = 0.0;
    let mut n = 0usize;
    for v in values.iter().flatten() {
        sum += v;
        n += 1;
    }
    if n == 0 { None } else { Some(sum / n as f64) }
}

/// Population standard deviation (ddof = 0) of the defined entries.
pub fn std_defined(values: &[Option<f64>]) -> Option<f64> {
    let mean = mean_defined(values)?;
    let mut ss = 0.0;
    let mut n = 0usize;
    for v in values.iter().flatten() {
        let d = v - mean;
        ss += d * d;
        n += 1;
    }
    Some((ss / n as f64).sqrt())
}

/// Most frequent value after rounding half-to-even to the nearest integer.
///
/// Frequency ties resolve to the smallest rounded value. Non-finite inputs are ignored.
pub fn rounded_mode(values: &[f64]) -> Option<f64> {
    let mut rounded: Vec<f64> = values
        .iter()
        .filter(|v| v.is_finite())
        .map(|v| v.round_ties_even())
        .collect();
    if rounded.is_empty() {
        return None;
    }
    rounded.sort_by(f64::total_cmp);

    let mut best = rounded[0];
    let mut best_count = 0usize;
    let mut i = 0;
    while i < rounded.len() {
        let value = rounded[i];
        let mut j = i;
        while j < rounded.len() && rounded[j] == value {
            j += 1;
        }
        // Runs are visited in ascending order, so `>` keeps the smallest on ties.
        if j - i > best_count {
            best = value;
            best_count = j - i;
        }
        i = j;
    }
    Some(best)
}

/// Replace undefined entries by linear interpolation along the index.
///
/// Interior gaps are bridged between the nearest defined neighbours; leading and
/// trailing gaps hold the nearest defined value. Returns `None` if no entry is defined.
pub fn fill_gaps(values: &[Option<f64>]) -> Option<Vec<f64>> {
    let defined: Vec<usize> = values
        .iter()
        .enumerate()
        .filter_map(|(i, v)| v.map(|_| i))
        .collect();
    let first = *defined.first()?;
    let last = *defined.last()?;

    let at = |i: usize| values[i].unwrap_or(f64::NAN);
    let mut out = Vec::with_capacity(values.len());
    for (i, v) in values.iter().enumerate() {
        let filled = match v {
            Some(v) => *v,
            None if i < first => at(first),
            None if i > last => at(last),
            None => {
                let k = defined.partition_point(|&d| d < i);
                let (lo, hi) = (defined[k - 1], defined[k]);
                lerp((lo as f64, at(lo)), (hi as f64, at(hi)), i as f64)
            }
        };
        out.push(filled);
    }
    Some(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mean_and_std_ignore_undefined() {
        let v = [Some(1.0), None, Some(3.0)];
        assert_eq!(mean_defined(&v), Some(2.0));
        assert_eq!(std_defined(&v), Some(1.0));
        assert_eq!(mean_defined(&[None, None]), None);
        assert_eq!(std_defined(&[]), None);
    }

    #[test]
    fn rounded_mode_prefers_smallest_on_ties() {
        assert_eq!(rounded_mode(&[4.1, 3.9, 4.2, 4.0, 10.0]), Some(4.0));
        assert_eq!(rounded_mode(&[5.0, 3.0, 5.1, 2.9]), Some(3.0));
        // 4.5 rounds to 4 under half-to-even.
        assert_eq!(rounded_mode(&[4.5, 4.5, 5.4]), Some(4.0));
        assert_eq!(rounded_mode(&[f64::NAN]), None);
    }

    #[test]
    fn fill_gaps_interpolates_interior_and_holds_edges() {
        let v = [None, Some(1.0), None, None, Some(4.0), None];
        let out = fill_gaps(&v).unwrap();
        assert_eq!(out, vec![1.0, 1.0, 2.0, 3.0, 4.0, 4.0]);
        assert!(fill_gaps(&[None, None]).is_none());
    }
}
