//! Spectrum discovery and CSV ingest.
//!
//! A measurement directory holds one CSV per device. The file stem is the
//! device ID; the first column is wavelength and every remaining column is a
//! power channel (dB). Ingest only turns files into `RawSpectrum`s:
//!
//! - rows that do not parse are skipped and counted
//! - wavelengths stored in meters are converted to nm
//! - files whose wavelengths are not strictly increasing are rejected
//!
//! A file that cannot be read becomes an `ExcludedDevice`, never a batch failure.

use std::fs::{self, File};
use std::path::{Path, PathBuf};

use crate::domain::{ExcludedDevice, RawSpectrum, Stage};
use crate::error::AppError;

/// Directory recursion depth when looking for device files.
const DEFAULT_SEARCH_DEPTH: usize = 4;

/// Wavelength columns whose largest value is below this are in meters.
const METERS_THRESHOLD: f64 = 1e-3;

/// Result of loading one device file.
#[derive(Debug, Clone)]
pub struct LoadedSpectrum {
    pub spectrum: RawSpectrum,
    pub rows_read: usize,
    pub rows_skipped: usize,
    /// Set when the wavelength column was rescaled on the way in.
    pub unit_note: Option<String>,
}

/// Everything read from a measurement directory.
#[derive(Debug, Clone, Default)]
pub struct IngestedBatch {
    pub spectra: Vec<RawSpectrum>,
    pub excluded: Vec<ExcludedDevice>,
    pub files_found: usize,
    pub rows_skipped: usize,
}

/// Find `*.csv` files under `root` whose stem starts with `prefix` (sorted by path).
pub fn discover_device_files(root: &Path, prefix: &str) -> Result<Vec<PathBuf>, AppError> {
    if !root.exists() {
        return Err(AppError::new(2, format!("Directory not found: {}", root.display())));
    }
    if !root.is_dir() {
        return Err(AppError::new(
            2,
            format!("Expected a directory, got a file: {}", root.display()),
        ));
    }

    let mut out = Vec::new();
    find_csv_files(root, 0, DEFAULT_SEARCH_DEPTH, &mut out);
    out.retain(|path| device_id_from_path(path).is_some_and(|id| id.starts_with(prefix)));
    out.sort();
    Ok(out)
}

fn find_csv_files(root: &Path, depth: usize, max_depth: usize, out: &mut Vec<PathBuf>) {
    if depth > max_depth {
        return;
    }

    let Ok(entries) = fs::read_dir(root) else {
        return;
    };

    for entry in entries.flatten() {
        let path = entry.path();
        let Ok(file_type) = entry.file_type() else {
            continue;
        };

        if file_type.is_dir() {
            if should_skip_dir(&path) {
                continue;
            }
            find_csv_files(&path, depth + 1, max_depth, out);
            continue;
        }

        if file_type.is_file()
            && path
                .extension()
                .and_then(|ext| ext.to_str())
                .is_some_and(|ext| ext.eq_ignore_ascii_case("csv"))
        {
            out.push(path);
        }
    }
}

fn should_skip_dir(path: &Path) -> bool {
    let name = path.file_name().and_then(|s| s.to_str()).unwrap_or("");
    name.starts_with('.') || matches!(name, "target" | "node_modules")
}

/// Device ID carried by a file path (its stem).
pub fn device_id_from_path(path: &Path) -> Option<&str> {
    path.file_stem().and_then(|s| s.to_str())
}

/// Read one device CSV.
pub fn load_spectrum(path: &Path) -> Result<LoadedSpectrum, AppError> {
    let id = device_id_from_path(path)
        .ok_or_else(|| AppError::new(2, format!("Cannot derive a device ID from '{}'", path.display())))?
        .to_string();

    let file = File::open(path)
        .map_err(|e| AppError::new(2, format!("Failed to open CSV '{}': {e}", path.display())))?;

    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(file);

    let headers = reader
        .headers()
        .map_err(|e| AppError::new(2, format!("Failed to read CSV headers in '{}': {e}", path.display())))?
        .clone();

    let columns = headers.len();
    if columns < 2 {
        return Err(AppError::new(
            2,
            format!(
                "'{}' needs a wavelength column and at least one power column (found {columns})",
                path.display()
            ),
        ));
    }

    let mut wavelength = Vec::new();
    let mut channels: Vec<Vec<f64>> = vec![Vec::new(); columns - 1];
    let mut rows_read = 0usize;
    let mut rows_skipped = 0usize;

    for result in reader.records() {
        rows_read += 1;
        let Ok(record) = result else {
            rows_skipped += 1;
            continue;
        };
        if record.len() != columns {
            rows_skipped += 1;
            continue;
        }
        let Some(values) = record.iter().map(parse_finite).collect::<Option<Vec<f64>>>() else {
            rows_skipped += 1;
            continue;
        };

        wavelength.push(values[0]);
        for (channel, v) in channels.iter_mut().zip(&values[1..]) {
            channel.push(*v);
        }
    }

    if wavelength.is_empty() {
        return Err(AppError::new(
            3,
            format!("'{}' has no numeric rows ({rows_read} read)", path.display()),
        ));
    }

    let unit_note = normalize_wavelength_units(&mut wavelength);

    if let Some(i) = wavelength.windows(2).position(|w| w[1] <= w[0]) {
        return Err(AppError::new(
            2,
            format!(
                "'{}': wavelengths must be strictly increasing (row {} -> {})",
                path.display(),
                i + 1,
                i + 2
            ),
        ));
    }

    Ok(LoadedSpectrum {
        spectrum: RawSpectrum {
            id,
            wavelength_nm: wavelength,
            channels,
        },
        rows_read,
        rows_skipped,
        unit_note,
    })
}

/// Discover and load every device file under `root`.
///
/// Files that fail to load are reported in `excluded` and do not stop the batch.
pub fn load_device_directory(root: &Path, prefix: &str) -> Result<IngestedBatch, AppError> {
    let files = discover_device_files(root, prefix)?;
    let mut batch = IngestedBatch {
        files_found: files.len(),
        ..IngestedBatch::default()
    };

    for path in &files {
        let id = device_id_from_path(path).unwrap_or_default().to_string();
        match load_spectrum(path) {
            Ok(loaded) => {
                if loaded.rows_skipped > 0 {
                    log::warn!(
                        "{id}: skipped {} of {} row(s) that did not parse",
                        loaded.rows_skipped,
                        loaded.rows_read
                    );
                }
                if let Some(note) = &loaded.unit_note {
                    log::debug!("{id}: {note}");
                }
                batch.rows_skipped += loaded.rows_skipped;
                batch.spectra.push(loaded.spectrum);
            }
            Err(err) => {
                log::warn!("{id}: excluded at ingest: {err}");
                batch.excluded.push(ExcludedDevice::new(id, Stage::Ingest, err));
            }
        }
    }

    Ok(batch)
}

fn normalize_wavelength_units(wavelength: &mut [f64]) -> Option<String> {
    let max_abs = wavelength.iter().map(|w| w.abs()).fold(0.0, f64::max);
    if max_abs > 0.0 && max_abs < METERS_THRESHOLD {
        for w in wavelength.iter_mut() {
            *w *= 1e9;
        }
        return Some("wavelength: m→nm (×1e9)".to_string());
    }
    None
}

fn parse_finite(s: &str) -> Option<f64> {
    let s = s.trim().trim_start_matches('\u{feff}');
    let v = s.parse::<f64>().ok()?;
    if v.is_finite() { Some(v) } else { None }
}
