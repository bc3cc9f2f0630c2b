//! Piecewise-linear interpolation.
//!
//! Two evaluation policies are needed downstream:
//!
//! - `eval`: strict, fails outside the sampled domain (aggregation marks those
//!   grid points undefined)
//! - `eval_extrapolate`: extends the first/last segment (coupling surface)

use crate::error::AnalysisError;

/// Tolerance below which two abscissae are treated as the same knot.
const X_EPS: f64 = 1e-12;

/// A sorted set of `(x, y)` knots.
#[derive(Debug, Clone, PartialEq)]
pub struct Interpolant {
    x: Vec<f64>,
    y: Vec<f64>,
}

impl Interpolant {
    /// Build from unsorted samples.
    ///
    /// Non-finite pairs are dropped, knots are sorted by `x`, and repeated `x`
    /// values keep their first occurrence. Returns `None` if nothing usable remains.
    pub fn new(x: &[f64], y: &[f64]) -> Option<Self> {
        let mut pairs: Vec<(f64, f64)> = x
            .iter()
            .zip(y.iter())
            .filter(|(a, b)| a.is_finite() && b.is_finite())
            .map(|(a, b)| (*a, *b))
            .collect();
        if pairs.is_empty() {
            return None;
        }

        pairs.sort_by(|a, b| a.0.total_cmp(&b.0));
        pairs.dedup_by(|later, earlier| (later.0 - earlier.0).abs() <= X_EPS);

        let (x, y) = pairs.into_iter().unzip();
        Some(Self { x, y })
    }

    pub fn len(&self) -> usize {
        self.x.len()
    }

    pub fn is_empty(&self) -> bool {
        self.x.is_empty()
    }

    /// Inclusive `(min, max)` of the sampled abscissae.
    pub fn domain(&self) -> (f64, f64) {
        (self.x[0], self.x[self.x.len() - 1])
    }

    /// Interpolate at `x`; fails with `InterpolationOutOfDomain` outside the knots.
    pub fn eval(&self, x: f64) -> Result<f64, AnalysisError> {
        let (min, max) = self.domain();
        if !(x >= min - X_EPS && x <= max + X_EPS) {
            return Err(AnalysisError::InterpolationOutOfDomain { x, min, max });
        }
        if self.x.len() == 1 {
            return Ok(self.y[0]);
        }

        let j = self.x.partition_point(|v| *v < x);
        if j == 0 {
            return Ok(self.y[0]);
        }
        if j >= self.x.len() {
            return Ok(self.y[self.y.len() - 1]);
        }
        if (self.x[j] - x).abs() <= X_EPS {
            return Ok(self.y[j]);
        }
        Ok(lerp(
            (self.x[j - 1], self.y[j - 1]),
            (self.x[j], self.y[j]),
            x,
        ))
    }

    /// Interpolate at `x`, extending the end segments linearly beyond the domain.
    ///
    /// A single-knot interpolant is constant.
    pub fn eval_extrapolate(&self, x: f64) -> f64 {
        let n = self.x.len();
        if n == 1 {
            return self.y[0];
        }
        let (min, max) = self.domain();
        if x < min {
            lerp((self.x[0], self.y[0]), (self.x[1], self.y[1]), x)
        } else if x > max {
            lerp((self.x[n - 2], self.y[n - 2]), (self.x[n - 1], self.y[n - 1]), x)
        } else {
            self.eval(x).unwrap_or(f64::NAN)
        }
    }
}

/// Straight line through `a` and `b`, evaluated at `x`.
pub fn lerp(a: (f64, f64), b: (f64, f64), x: f64) -> f64 {
    let (x0, y0) = a;
    let (x1, y1) = b;
    if (x1 - x0).abs() < X_EPS {
        return y0;
    }
    let u = (x - x0) / (x1 - x0);
    y0 + u * (y1 - y0)
}

/// `n` evenly spaced points from `start` to `end` (inclusive).
pub fn linspace(start: f64, end: f64, n: usize) -> Vec<f64> {
    match n {
        0 => Vec::new(),
        1 => vec![start],
        _ => {
            let step = (end - start) / (n as f64 - 1.0);
            let mut out: Vec<f64> = (0..n).map(|i| start + step * i as f64).collect();
            out[n - 1] = end;
            out
        }
    }
}
