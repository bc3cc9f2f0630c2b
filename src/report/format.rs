//! Formatted terminal output.
//!
//! We keep formatting code in one place so:
//! - the analysis code stays clean and testable
//! - output changes are localized

use crate::domain::{DeviceCurve, ExcludedDevice};
use crate::io::curve::AnalysisFile;
use crate::math::mean_defined;

/// Per-device statistics shown in the device table.
#[derive(Debug, Clone, PartialEq)]
pub struct DeviceStats {
    pub fringes: usize,
    pub ng_mean: Option<f64>,
    pub ng_min: Option<f64>,
    pub ng_max: Option<f64>,
    pub kappa_mean: Option<f64>,
}

pub fn device_stats(curve: &DeviceCurve) -> DeviceStats {
    let ng: Vec<f64> = curve.group_index.iter().copied().filter(|v| v.is_finite()).collect();
    let ng_defined: Vec<Option<f64>> = ng.iter().copied().map(Some).collect();

    DeviceStats {
        fringes: curve.wavelength_nm.len(),
        ng_mean: mean_defined(&ng_defined),
        ng_min: ng.iter().copied().reduce(f64::min),
        ng_max: ng.iter().copied().reduce(f64::max),
        kappa_mean: mean_defined(&curve.kappa),
    }
}

/// Format the full run summary.
pub fn format_run_summary(run: &AnalysisFile) -> String {
    let mut out = String::new();
    let config = &run.config;

    out.push_str("=== ng - group index & coupling ===\n");
    out.push_str(&format!("Run: {}\n", run.created_at.format("%Y-%m-%d %H:%M:%S UTC")));
    out.push_str(&format!(
        "Devices: analysed={} excluded={} | ΔL={:.2} µm\n",
        run.devices.len(),
        run.excluded.len(),
        config.delta_length_m * 1e6
    ));
    out.push_str(&format!(
        "Settings: window={} degree={} prominence={} tolerance={} grid={} surface={}\n",
        config.smooth_window,
        config.baseline_degree,
        config.min_prominence,
        config.outlier_tolerance,
        config.grid_points,
        config.surface_points
    ));
    if let Some((low, high)) = config.wavelength_range_nm {
        out.push_str(&format!("Range: [{low:.2}, {high:.2}] nm\n"));
    }

    out.push('\n');
    out.push_str(&format_device_table(&run.devices));

    if !run.excluded.is_empty() {
        out.push('\n');
        out.push_str(&format_excluded(&run.excluded));
    }

    let agg = &run.aggregate;
    out.push('\n');
    if let (Some(first), Some(last)) = (agg.grid_nm.first(), agg.grid_nm.last()) {
        out.push_str(&format!(
            "Aggregate: {} point(s) over [{first:.2}, {last:.2}] nm, {} gap-filled\n",
            agg.len(),
            agg.filled_count()
        ));
    }
    if let Some(hit) = &run.lookup {
        out.push_str(&format!(
            "Group index at {:.2} nm is {:.4} ± {:.4}\n",
            hit.wavelength_nm, hit.mean, hit.std
        ));
    }
    if let Some(reference) = &run.reference {
        match (run.reference_at_target, &run.lookup) {
            (Some(ng), Some(hit)) => out.push_str(&format!(
                "Reference ({}): {:.4} (measured - reference = {:+.4})\n",
                reference.band.display_name(),
                ng,
                hit.mean - ng
            )),
            _ => out.push_str(&format!(
                "Reference ({}): not available at the lookup wavelength\n",
                reference.band.display_name()
            )),
        }
    }

    let surface = &run.surface;
    out.push_str(&format!(
        "Coupling surface: {} device(s) × {} wavelength(s)",
        surface.geometry.len(),
        surface.wavelength_nm.len()
    ));
    if surface.skipped.is_empty() {
        out.push('\n');
    } else {
        out.push_str(&format!(" (skipped: {})\n", surface.skipped.join(", ")));
    }

    out
}

fn format_device_table(devices: &[DeviceCurve]) -> String {
    let mut out = String::new();
    out.push_str(
        format!(
            "{:<24} {:>10} {:>7} {:>8} {:>8} {:>8} {:>8}\n",
            "id", "geometry", "fringes", "ng_mean", "ng_min", "ng_max", "kappa"
        )
        .trim_end(),
    );
    out.push('\n');
    out.push_str(
        format!(
            "{:-<24} {:-<10} {:-<7} {:-<8} {:-<8} {:-<8} {:-<8}\n",
            "", "", "", "", "", "", ""
        )
        .trim_end(),
    );
    out.push('\n');

    for d in devices {
        let s = device_stats(d);
        out.push_str(
            format!(
                "{:<24} {:>10.3} {:>7} {:>8} {:>8} {:>8} {:>8}\n",
                truncate(&d.id, 24),
                d.geometry,
                s.fringes,
                fmt_opt(s.ng_mean),
                fmt_opt(s.ng_min),
                fmt_opt(s.ng_max),
                fmt_opt(s.kappa_mean),
            )
            .trim_end(),
        );
        out.push('\n');
    }

    out
}

fn format_excluded(excluded: &[ExcludedDevice]) -> String {
    let mut out = String::from("Excluded devices:\n");
    for ex in excluded {
        out.push_str(&format!("  {} ({}): {}\n", ex.id, ex.stage.label(), ex.reason));
    }
    out
}

fn fmt_opt(v: Option<f64>) -> String {
    v.map(|x| format!("{x:.4}")).unwrap_or_else(|| "-".to_string())
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let mut out: String = s.chars().take(max.saturating_sub(1)).collect();
    out.push('.');
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use crate::domain::{AggregateCurve, AnalysisConfig, CouplingSurface, LookupResult, Stage};

    fn device() -> DeviceCurve {
        DeviceCurve {
            id: "MZI_L5um".to_string(),
            geometry: 5.0,
            wavelength_nm: vec![1549.0, 1551.0, 1553.0],
            group_index: vec![4.1, 4.2, 4.3],
            kappa: vec![Some(0.2), None, Some(0.4)],
        }
    }

    fn run_file() -> AnalysisFile {
        AnalysisFile {
            tool: "ng".to_string(),
            created_at: Utc::now(),
            config: AnalysisConfig::with_delta_length(2.86e-4),
            devices: vec![device()],
            excluded: vec![ExcludedDevice::new("X", Stage::Identifier, "expected prefix 'MZI_L'")],
            aggregate: AggregateCurve {
                grid_nm: vec![1549.0, 1553.0],
                mean: vec![4.1, 4.3],
                std: vec![0.0, 0.0],
                coverage: vec![1, 1],
                filled: vec![false, false],
            },
            lookup: Some(LookupResult {
                index: 0,
                wavelength_nm: 1549.0,
                mean: 4.1,
                std: 0.0012,
            }),
            surface: CouplingSurface {
                wavelength_nm: vec![1549.0, 1551.0, 1553.0],
                geometry: vec![5.0],
                device_ids: vec!["MZI_L5um".to_string()],
                kappa: vec![vec![0.2, 0.3, 0.4]],
                skipped: Vec::new(),
            },
            reference: None,
            reference_at_target: None,
        }
    }

    #[test]
    fn device_stats_ignore_undefined_kappa() {
        let s = device_stats(&device());
        assert_eq!(s.fringes, 3);
        assert!((s.ng_mean.unwrap() - 4.2).abs() < 1e-12);
        assert_eq!(s.ng_min, Some(4.1));
        assert_eq!(s.ng_max, Some(4.3));
        assert!((s.kappa_mean.unwrap() - 0.3).abs() < 1e-12);
    }

    #[test]
    fn summary_reports_lookup_and_exclusions() {
        let text = format_run_summary(&run_file());
        assert!(text.contains("Group index at 1549.00 nm is 4.1000 ± 0.0012"), "{text}");
        assert!(text.contains("X (identifier): expected prefix 'MZI_L'"));
        assert!(text.contains("analysed=1 excluded=1"));
        assert!(text.contains("ΔL=286.00 µm"));
        assert!(text.contains("Coupling surface: 1 device(s) × 3 wavelength(s)\n"));
    }

    #[test]
    fn truncate_marks_cut_ids() {
        assert_eq!(truncate("abcdef", 4), "abc.");
        assert_eq!(truncate("abc", 4), "abc");
    }
}
