//! Prominence-based peak detection.
//!
//! A peak is a local maximum (flat tops count once, at their centre sample).
//! Its prominence is the height above the higher of the two valley floors
//! reached by walking outward until the signal rises above the peak or the
//! edge is hit. This matches the usual topographic definition.

/// A detected local maximum.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Peak {
    pub index: usize,
    pub prominence: f64,
}

/// Indices of local maxima, in ascending order.
///
/// Edge samples are never peaks. For plateaus the middle sample is reported
/// (rounding down for even-width plateaus).
pub fn local_maxima(signal: &[f64]) -> Vec<usize> {
    let n = signal.len();
    let mut out = Vec::new();
    if n < 3 {
        return out;
    }

    let mut i = 1;
    while i < n - 1 {
        if signal[i - 1] < signal[i] {
            let mut ahead = i + 1;
            while ahead < n - 1 && signal[ahead] == signal[i] {
                ahead += 1;
            }
            if signal[ahead] < signal[i] {
                out.push((i + ahead - 1) / 2);
                i = ahead;
                continue;
            }
        }
        i += 1;
    }
    out
}

/// Prominence of the sample at `peak`.
pub fn prominence(signal: &[f64], peak: usize) -> f64 {
    let height = signal[peak];

    let mut left_min = height;
    let mut i = peak;
    loop {
        if signal[i] > height {
            break;
        }
        left_min = left_min.min(signal[i]);
        if i == 0 {
            break;
        }
        i -= 1;
    }

    let mut right_min = height;
    for &v in &signal[peak..] {
        if v > height {
            break;
        }
        right_min = right_min.min(v);
    }

    height - left_min.max(right_min)
}

/// Local maxima whose prominence is at least `min_prominence`.
pub fn find_peaks(signal: &[f64], min_prominence: f64) -> Vec<Peak> {
    local_maxima(signal)
        .into_iter()
        .map(|index| Peak {
            index,
            prominence: prominence(signal, index),
        })
        .filter(|p| p.prominence >= min_prominence)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn local_maxima_handles_plateaus_and_edges() {
        let signal = [5.0, 1.0, 3.0, 3.0, 3.0, 0.0, 2.0, 2.0, 4.0];
        assert_eq!(local_maxima(&signal), vec![3]);
    }

    #[test]
    fn prominence_uses_higher_valley() {
        //           0    1    2    3    4    5    6
        let signal = [0.0, 2.0, 1.0, 5.0, 0.5, 3.0, 0.0];
        assert!((prominence(&signal, 1) - 1.0).abs() < 1e-12);
        assert!((prominence(&signal, 3) - 5.0).abs() < 1e-12);
        assert!((prominence(&signal, 5) - 2.5).abs() < 1e-12);
    }

    #[test]
    fn find_peaks_filters_small_ripples() {
        let signal = [0.0, 2.0, 1.9, 2.05, 0.0, 3.0, 0.0];
        let peaks: Vec<usize> = find_peaks(&signal, 0.25).iter().map(|p| p.index).collect();
        assert_eq!(peaks, vec![3, 5]);
    }
}
