//! Cross-device averaging on a common wavelength grid.
//!
//! Steps:
//!
//! 1. Interpolate each device curve onto the grid. Grid points outside a
//!    device's own domain stay undefined (no extrapolation).
//! 2. Per grid column, take the mean and population std over the defined rows.
//! 3. Fill columns nobody covers by interpolating along the grid index between
//!    the nearest covered columns (edges hold the nearest covered value).
//!
//! If no column is covered at all the aggregation fails with
//! `EmptyAggregationInput`; an all-undefined curve is never returned.

use crate::domain::{AggregateCurve, CleanedCurve};
use crate::error::AnalysisError;
use crate::math::{Interpolant, fill_gaps, linspace, mean_defined, std_defined};

/// Evenly spaced grid spanning the union of all non-empty curve domains.
pub fn common_grid(curves: &[CleanedCurve], points: usize) -> Result<Vec<f64>, AnalysisError> {
    let mut min = f64::INFINITY;
    let mut max = f64::NEG_INFINITY;
    for w in curves.iter().flat_map(|c| c.wavelength_nm.iter()) {
        if w.is_finite() {
            min = min.min(*w);
            max = max.max(*w);
        }
    }
    if !(min.is_finite() && max.is_finite()) {
        return Err(AnalysisError::EmptyAggregationInput(
            "no device has group-index samples left after outlier removal".to_string(),
        ));
    }
    if max - min <= 0.0 {
        return Ok(vec![min]);
    }
    Ok(linspace(min, max, points.max(2)))
}

/// Sample one curve on `grid`; `None` where the grid leaves the curve's domain.
pub fn interpolate_onto(x: &[f64], y: &[f64], grid: &[f64]) -> Vec<Option<f64>> {
    match Interpolant::new(x, y) {
        Some(f) => grid.iter().map(|&g| f.eval(g).ok()).collect(),
        None => vec![None; grid.len()],
    }
}

/// Average cleaned device curves on `grid_nm`.
pub fn aggregate_curves(curves: &[CleanedCurve], grid_nm: &[f64]) -> Result<AggregateCurve, AnalysisError> {
    aggregate_series(
        curves
            .iter()
            .map(|c| (c.wavelength_nm.as_slice(), c.group_index.as_slice())),
        grid_nm,
    )
}

/// Average arbitrary `(x, y)` series on `grid`.
pub fn aggregate_series<'a, I>(series: I, grid: &[f64]) -> Result<AggregateCurve, AnalysisError>
where
    I: IntoIterator<Item = (&'a [f64], &'a [f64])>,
{
    if grid.is_empty() {
        return Err(AnalysisError::invalid("aggregation grid is empty"));
    }
    if grid.iter().any(|g| !g.is_finite()) || grid.windows(2).any(|w| !(w[1] > w[0])) {
        return Err(AnalysisError::invalid("aggregation grid must be finite and strictly ascending"));
    }

    let rows: Vec<Vec<Option<f64>>> = series
        .into_iter()
        .map(|(x, y)| interpolate_onto(x, y, grid))
        .collect();
    if rows.is_empty() {
        return Err(AnalysisError::EmptyAggregationInput("no curves supplied".to_string()));
    }

    let mut mean = Vec::with_capacity(grid.len());
    let mut std = Vec::with_capacity(grid.len());
    let mut coverage = Vec::with_capacity(grid.len());
    let mut column = Vec::with_capacity(rows.len());
    for j in 0..grid.len() {
        column.clear();
        column.extend(rows.iter().map(|row| row[j]));
        mean.push(mean_defined(&column));
        std.push(std_defined(&column));
        coverage.push(column.iter().filter(|v| v.is_some()).count());
    }

    let filled: Vec<bool> = mean.iter().map(Option::is_none).collect();
    let (Some(mean), Some(std)) = (fill_gaps(&mean), fill_gaps(&std)) else {
        return Err(AnalysisError::EmptyAggregationInput(format!(
            "none of {} curve(s) overlaps the grid [{}, {}]",
            rows.len(),
            grid[0],
            grid[grid.len() - 1]
        )));
    };

    let curve = AggregateCurve {
        grid_nm: grid.to_vec(),
        mean,
        std,
        coverage,
        filled,
    };
    if curve.filled_count() > 0 {
        log::warn!(
            "{} of {} grid point(s) had no device coverage and were gap-filled",
            curve.filled_count(),
            curve.len()
        );
    }
    Ok(curve)
}
