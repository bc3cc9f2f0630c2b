//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - initializes logging
//! - parses CLI arguments
//! - loads (or generates) device spectra
//! - runs the analysis pipeline
//! - prints the summary and writes optional exports

use clap::Parser;

use crate::cli::{AnalysisArgs, AnalyzeArgs, Command, DemoArgs, ExportArgs, SummaryArgs};
use crate::data::{DemoConfig, generate_devices};
use crate::domain::{AnalysisConfig, DeviceNaming};
use crate::error::AppError;
use crate::io::curve::{AnalysisFile, read_analysis_json, write_analysis_json};
use crate::io::export::{write_aggregate_csv, write_device_curves_csv, write_surface_csv};
use crate::io::ingest::load_device_directory;

pub mod pipeline;

/// Entry point for the `ng` binary.
pub fn run() -> Result<(), AppError> {
    dotenvy::dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = crate::cli::Cli::parse();

    match cli.command {
        Command::Analyze(args) => handle_analyze(args),
        Command::Demo(args) => handle_demo(args),
        Command::Summary(args) => handle_summary(args),
    }
}

fn handle_analyze(args: AnalyzeArgs) -> Result<(), AppError> {
    let config = analysis_config_from_args(&args)?;
    let batch = load_device_directory(&args.dir, &config.naming.prefix)?;
    if batch.files_found == 0 {
        return Err(AppError::new(
            2,
            format!(
                "No device CSV files matching prefix '{}' under {}",
                config.naming.prefix,
                args.dir.display()
            ),
        ));
    }
    log::info!(
        "loaded {} of {} device file(s) from {}",
        batch.spectra.len(),
        batch.files_found,
        args.dir.display()
    );

    let mut run = pipeline::run_analysis(&batch.spectra, &config)?;
    // Ingest failures come first: they never reached the pipeline.
    let mut excluded = batch.excluded;
    excluded.append(&mut run.excluded);
    run.excluded = excluded;

    finish(&run, &config, &args.export)
}

fn handle_demo(args: DemoArgs) -> Result<(), AppError> {
    let demo = DemoConfig {
        devices: args.devices,
        seed: args.seed,
        fsr_nm: args.fsr,
        group_index: args.group_index,
        noise_db: args.noise,
        ..DemoConfig::default()
    };
    let batch = generate_devices(&demo)?;
    log::info!(
        "generated {} synthetic device(s), ΔL = {:.2} µm",
        batch.spectra.len(),
        batch.delta_length_m * 1e6
    );

    let mut config = AnalysisConfig::with_delta_length(batch.delta_length_m);
    config.naming = batch.naming.clone();
    config.smooth_window = demo.smoothing_window();
    apply_analysis_args(&mut config, &args.analysis);

    let run = pipeline::run_analysis(&batch.spectra, &config)?;
    finish(&run, &config, &args.export)
}

fn handle_summary(args: SummaryArgs) -> Result<(), AppError> {
    let run = read_analysis_json(&args.run)?;
    println!("{}", crate::report::format_run_summary(&run));
    Ok(())
}

fn finish(run: &pipeline::AnalysisRun, config: &AnalysisConfig, export: &ExportArgs) -> Result<(), AppError> {
    println!(
        "{}",
        crate::report::format_run_summary(&AnalysisFile::from_run(run, config))
    );

    if let Some(path) = &export.json {
        write_analysis_json(path, run, config)?;
    }
    if let Some(path) = &export.curve {
        write_aggregate_csv(path, &run.aggregate)?;
    }
    if let Some(path) = &export.devices {
        write_device_curves_csv(path, &run.curves())?;
    }
    if let Some(path) = &export.surface {
        write_surface_csv(path, &run.surface)?;
    }
    Ok(())
}

pub fn analysis_config_from_args(args: &AnalyzeArgs) -> Result<AnalysisConfig, AppError> {
    let wavelength_range_nm = match args.range.as_deref() {
        None => None,
        Some([low, high]) => Some((*low, *high)),
        Some(other) => {
            return Err(AppError::new(
                2,
                format!("--range expects LOW HIGH, got {} value(s)", other.len()),
            ));
        }
    };

    let mut config = AnalysisConfig {
        naming: DeviceNaming {
            prefix: args.prefix.clone(),
            suffix: args.suffix.clone(),
        },
        port: args.port,
        smooth_window: args.window,
        wavelength_range_nm,
        baseline_degree: args.degree,
        ..AnalysisConfig::with_delta_length(args.delta_length)
    };
    apply_analysis_args(&mut config, &args.analysis);
    config.validate()?;
    Ok(config)
}

fn apply_analysis_args(config: &mut AnalysisConfig, args: &AnalysisArgs) {
    config.min_prominence = args.prominence;
    config.outlier_tolerance = args.tolerance;
    config.grid_points = args.grid_points;
    config.surface_points = args.surface_points;
    config.target_wavelength_nm = args.target;
    config.reference = args.reference;
}
