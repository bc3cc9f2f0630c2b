//! Export numeric results to CSV.
//!
//! The exports are meant to be easy to consume in spreadsheets or plotting scripts.

use std::fs::File;
use std::io::Write;
use std::path::Path;

use crate::domain::{AggregateCurve, CouplingSurface, DeviceCurve};
use crate::error::AppError;

/// Write the aggregate group-index curve to a CSV file.
pub fn write_aggregate_csv(path: &Path, curve: &AggregateCurve) -> Result<(), AppError> {
    let mut file = create(path)?;
    write_aggregate(&mut file, curve)
        .map_err(|e| AppError::new(2, format!("Failed to write aggregate CSV '{}': {e}", path.display())))
}

/// Write one row per (device, midpoint) with group index and coupling.
pub fn write_device_curves_csv(path: &Path, devices: &[DeviceCurve]) -> Result<(), AppError> {
    let mut file = create(path)?;
    write_device_curves(&mut file, devices)
        .map_err(|e| AppError::new(2, format!("Failed to write device CSV '{}': {e}", path.display())))
}

/// Write the coupling surface as a matrix: one row per device, one column per wavelength.
pub fn write_surface_csv(path: &Path, surface: &CouplingSurface) -> Result<(), AppError> {
    let mut file = create(path)?;
    write_surface(&mut file, surface)
        .map_err(|e| AppError::new(2, format!("Failed to write surface CSV '{}': {e}", path.display())))
}

fn create(path: &Path) -> Result<File, AppError> {
    File::create(path).map_err(|e| AppError::new(2, format!("Failed to create export CSV '{}': {e}", path.display())))
}

fn write_aggregate(out: &mut impl Write, curve: &AggregateCurve) -> std::io::Result<()> {
    writeln!(out, "wavelength_nm,ng_mean,ng_std,devices,filled")?;
    for i in 0..curve.len() {
        writeln!(
            out,
            "{:.6},{:.6},{:.6},{},{}",
            curve.grid_nm[i], curve.mean[i], curve.std[i], curve.coverage[i], curve.filled[i]
        )?;
    }
    Ok(())
}

fn write_device_curves(out: &mut impl Write, devices: &[DeviceCurve]) -> std::io::Result<()> {
    writeln!(out, "id,geometry,wavelength_nm,ng,kappa")?;
    for d in devices {
        for (i, (w, ng)) in d.wavelength_nm.iter().zip(&d.group_index).enumerate() {
            let kappa = d
                .kappa
                .get(i)
                .copied()
                .flatten()
                .map(|k| format!("{k:.6}"))
                .unwrap_or_default();
            writeln!(out, "{},{},{w:.6},{ng:.6},{kappa}", d.id, d.geometry)?;
        }
    }
    Ok(())
}

fn write_surface(out: &mut impl Write, surface: &CouplingSurface) -> std::io::Result<()> {
    let header: Vec<String> = surface.wavelength_nm.iter().map(|w| format!("{w:.4}")).collect();
    writeln!(out, "id,geometry,{}", header.join(","))?;
    for ((id, geometry), row) in surface.device_ids.iter().zip(&surface.geometry).zip(&surface.kappa) {
        let values: Vec<String> = row.iter().map(|k| format!("{k:.6}")).collect();
        writeln!(out, "{id},{geometry},{}", values.join(","))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn aggregate_csv_has_one_row_per_grid_point() {
        let curve = AggregateCurve {
            grid_nm: vec![1549.0, 1550.0],
            mean: vec![4.2, 4.21],
            std: vec![0.01, 0.02],
            coverage: vec![3, 0],
            filled: vec![false, true],
        };
        let mut buf = Vec::new();
        write_aggregate(&mut buf, &curve).unwrap();
        let text = String::from_utf8(buf).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[1], "1549.000000,4.200000,0.010000,3,false");
        assert!(lines[2].ends_with(",0,true"));
    }

    #[test]
    fn device_csv_leaves_undefined_kappa_blank() {
        let device = DeviceCurve {
            id: "DC_L5".to_string(),
            geometry: 5.0,
            wavelength_nm: vec![1550.0, 1552.0],
            group_index: vec![4.2, 4.19],
            kappa: vec![Some(0.25), None],
        };
        let mut buf = Vec::new();
        write_device_curves(&mut buf, &[device]).unwrap();
        let text = String::from_utf8(buf).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[1], "DC_L5,5,1550.000000,4.200000,0.250000");
        assert_eq!(lines[2], "DC_L5,5,1552.000000,4.190000,");
    }

    #[test]
    fn surface_csv_is_a_matrix() {
        let surface = CouplingSurface {
            wavelength_nm: vec![1550.0, 1551.0],
            geometry: vec![5.0, 10.0],
            device_ids: vec!["A".to_string(), "B".to_string()],
            kappa: vec![vec![0.1, 0.2], vec![0.3, 0.4]],
            skipped: Vec::new(),
        };
        let mut buf = Vec::new();
        write_surface(&mut buf, &surface).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert_eq!(
            text,
            "id,geometry,1550.0000,1551.0000\nA,5,0.100000,0.200000\nB,10,0.300000,0.400000\n"
        );
    }
}
