//! Simulated group-index references for a 500 nm × 220 nm strip waveguide.
//!
//! Each band is stored as two cubic polynomials in a sample index `t ∈ [0, 99]`:
//! one for wavelength (m) and one for group index. Sampling both over `t`
//! gives a reference curve to compare measured aggregates against.

use serde::{Deserialize, Serialize};

use crate::domain::ReferenceBand;
use crate::math::{Interpolant, polyval};

const SAMPLES: usize = 100;

// Ascending coefficients in the sample index.
const NG_1550: [f64; 4] = [4.11962711, -1.90478033e-03, 7.63213215e-05, -4.58401408e-07];
const WAVELENGTH_1550_M: [f64; 4] = [1.45999992e-06, 1.12019032e-09, 8.52254170e-13, 7.71116919e-16];
const NG_1310: [f64; 4] = [4.40335210, 3.25911055e-04, -1.83117238e-08, -6.78194041e-10];
const WAVELENGTH_1310_M: [f64; 4] = [1.28e-06, 4.86069882e-10, 1.84233132e-13, 7.56617044e-17];

/// Sampled reference curve.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReferenceCurve {
    pub band: ReferenceBand,
    pub wavelength_nm: Vec<f64>,
    pub group_index: Vec<f64>,
}

impl ReferenceCurve {
    /// Reference group index at `wavelength_nm`, if inside the simulated span.
    pub fn group_index_at(&self, wavelength_nm: f64) -> Option<f64> {
        Interpolant::new(&self.wavelength_nm, &self.group_index)?
            .eval(wavelength_nm)
            .ok()
    }
}

/// Sample the simulated reference for `band`.
pub fn reference_curve(band: ReferenceBand) -> ReferenceCurve {
    let (ng, wavelength) = match band {
        ReferenceBand::O1310 => (&NG_1310, &WAVELENGTH_1310_M),
        ReferenceBand::C1550 => (&NG_1550, &WAVELENGTH_1550_M),
    };

    let (wavelength_nm, group_index) = (0..SAMPLES)
        .map(|i| {
            let t = i as f64;
            (polyval(wavelength, t) * 1e9, polyval(ng, t))
        })
        .unzip();

    ReferenceCurve {
        band,
        wavelength_nm,
        group_index,
    }
}
