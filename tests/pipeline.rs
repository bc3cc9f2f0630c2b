use std::fs;
use std::io::Write;
use std::path::Path;

use ng_curves::app::pipeline::run_analysis;
use ng_curves::data::{DemoConfig, generate_devices};
use ng_curves::domain::{AnalysisConfig, RawSpectrum, ReferenceBand, Stage};
use ng_curves::io::{load_device_directory, read_analysis_json, write_aggregate_csv, write_analysis_json};
use ng_curves::report::format_run_summary;
use tempfile::TempDir;

fn demo() -> DemoConfig {
    DemoConfig {
        devices: 3,
        seed: 11,
        noise_db: 0.0,
        start_nm: 1530.0,
        stop_nm: 1570.0,
        step_nm: 0.001,
        ..DemoConfig::default()
    }
}

fn write_spectrum_csv(dir: &Path, spectrum: &RawSpectrum, wavelength_scale: f64) {
    let path = dir.join(format!("{}.csv", spectrum.id));
    let mut file = fs::File::create(path).expect("csv should be created");
    writeln!(file, "wavelength,power_db").unwrap();
    for (w, p) in spectrum.wavelength_nm.iter().zip(&spectrum.channels[0]) {
        writeln!(file, "{:e},{p:.6}", w * wavelength_scale).unwrap();
    }
}

fn analysis_config(delta_length_m: f64, demo: &DemoConfig) -> AnalysisConfig {
    let mut config = AnalysisConfig::with_delta_length(delta_length_m);
    config.naming = demo.naming();
    config.smooth_window = demo.smoothing_window();
    config.target_wavelength_nm = Some(1550.0);
    config
}

#[test]
fn identical_devices_aggregate_to_their_group_index() {
    let demo = demo();
    let batch = generate_devices(&demo).unwrap();
    let config = analysis_config(batch.delta_length_m, &demo);

    let run = run_analysis(&batch.spectra, &config).unwrap();
    let hit = run.lookup.expect("target was set");
    assert!((hit.mean - 4.2).abs() < 0.02, "mean = {}", hit.mean);
    assert!(hit.std < 0.01, "std = {}", hit.std);

    // FSR 2 nm at 1550 nm means roughly one fringe every 2 nm over 40 nm.
    for device in &run.devices {
        let n = device.features.len();
        assert!((17..=21).contains(&n), "{}: {n} fringes", device.record.id);
        for fsr in &device.features.fsr_nm {
            assert!(*fsr > 1.8 && *fsr < 2.2, "{}: fsr {fsr}", device.record.id);
        }
    }
}

#[test]
fn directory_round_trip_matches_in_memory_analysis() {
    let demo = demo();
    let batch = generate_devices(&demo).unwrap();
    let config = analysis_config(batch.delta_length_m, &demo);

    let temp = TempDir::new().expect("tempdir should be created");
    let data = temp.path().join("chip");
    fs::create_dir_all(data.join("nested")).unwrap();
    write_spectrum_csv(&data, &batch.spectra[0], 1.0);
    write_spectrum_csv(&data, &batch.spectra[1], 1e-9);
    write_spectrum_csv(&data.join("nested"), &batch.spectra[2], 1.0);
    fs::write(data.join("MZI_Lbroken.csv"), "wavelength,power\n1550,-3\n1549,-4\n").unwrap();
    fs::write(data.join("notes.csv"), "not,a,device\n").unwrap();

    let ingested = load_device_directory(&data, &config.naming.prefix).unwrap();
    assert_eq!(ingested.files_found, 4);
    assert_eq!(ingested.spectra.len(), 3);
    assert_eq!(ingested.excluded.len(), 1);
    assert_eq!(ingested.excluded[0].stage, Stage::Ingest);

    let from_disk = run_analysis(&ingested.spectra, &config).unwrap();
    let in_memory = run_analysis(&batch.spectra, &config).unwrap();

    let a = from_disk.lookup.unwrap();
    let b = in_memory.lookup.unwrap();
    assert!((a.mean - b.mean).abs() < 1e-3, "{} vs {}", a.mean, b.mean);
    assert_eq!(from_disk.surface.geometry, vec![5.0, 10.0, 15.0]);
}

#[test]
fn exported_json_reproduces_the_summary() {
    let demo = DemoConfig {
        noise_db: 0.01,
        ..demo()
    };
    let batch = generate_devices(&demo).unwrap();
    let mut config = analysis_config(batch.delta_length_m, &demo);
    config.reference = Some(ReferenceBand::C1550);
    let run = run_analysis(&batch.spectra, &config).unwrap();

    let temp = TempDir::new().expect("tempdir should be created");
    let json = temp.path().join("run.json");
    let csv = temp.path().join("aggregate.csv");
    write_analysis_json(&json, &run, &config).unwrap();
    write_aggregate_csv(&csv, &run.aggregate).unwrap();

    let file = read_analysis_json(&json).unwrap();
    assert_eq!(file.devices.len(), 3);
    assert_eq!(file.aggregate.len(), run.aggregate.len());
    for (a, b) in file.aggregate.mean.iter().zip(&run.aggregate.mean) {
        assert!((a - b).abs() < 1e-12);
    }
    assert!(file.reference_at_target.is_some());

    let summary = format_run_summary(&file);
    assert!(summary.contains("Group index at "), "{summary}");
    assert!(summary.contains("Reference (1550 nm)"));

    let rows = fs::read_to_string(&csv).unwrap().lines().count();
    assert_eq!(rows, config.grid_points + 1);
}
