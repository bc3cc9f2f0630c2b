//! Least squares and polynomial helpers.
//!
//! Baseline correction fits a low-order polynomial to a whole spectrum:
//!
//! ```text
//! minimize Σ (y_i - Σ_k c_k x_i^k)^2
//! ```
//!
//! Implementation choices:
//! - Abscissae are mapped to [-1, 1] by the caller so the Vandermonde columns
//!   stay well conditioned for wavelengths around 1550.
//! - We solve with SVD so tall systems (many samples, few coefficients) work.
//!   (Nalgebra's `QR::solve` is intended for square systems and will panic for
//!   non-square matrices.)

use nalgebra::{DMatrix, DVector};

/// Solve a least squares problem using SVD.
///
/// Returns `None` if the system is too ill-conditioned to solve robustly.
pub fn solve_least_squares(x: &DMatrix<f64>, y: &DVector<f64>) -> Option<DVector<f64>> {
    let svd = x.clone().svd(true, true);

    // Try progressively looser tolerances if strict solve fails.
    for &tol in &[1e-10, 1e-8, 1e-6] {
        if let Ok(beta) = svd.solve(y, tol) {
            if beta.iter().all(|v| v.is_finite()) {
                return Some(beta);
            }
        }
    }

    None
}

/// Fit `y ≈ Σ c_k x^k` for `k = 0..=degree`; coefficients in ascending order.
///
/// Returns `None` for fewer samples than coefficients or a singular system.
pub fn fit_polynomial(x: &[f64], y: &[f64], degree: usize) -> Option<Vec<f64>> {
    let n = x.len().min(y.len());
    let p = degree + 1;
    if n < p {
        return None;
    }

    let mut design = DMatrix::<f64>::zeros(n, p);
    for i in 0..n {
        let mut term = 1.0;
        for k in 0..p {
            design[(i, k)] = term;
            term *= x[i];
        }
    }
    let rhs = DVector::from_row_slice(&y[..n]);

    solve_least_squares(&design, &rhs).map(|c| c.iter().copied().collect())
}

/// Evaluate a polynomial with ascending coefficients (Horner).
pub fn polyval(coeffs: &[f64], x: f64) -> f64 {
    coeffs.iter().rev().fold(0.0, |acc, c| acc * x + c)
}
