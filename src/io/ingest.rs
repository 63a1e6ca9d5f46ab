//! CSV observation-sheet ingest.
//!
//! Expected columns (case-insensitive, BOM tolerant):
//!
//! | column        | aliases                                  | blank means            |
//! |---------------|------------------------------------------|------------------------|
//! | `water_ml`    | `water`, `water_volume_ml`, `vol_water`  | default series volume  |
//! | `t_disappear` | `t_dis`, `disappearance`, `tdis`         | not entered            |
//! | `t_appear`    | `t_app`, `appearance`, `tapp`            | not entered            |
//! | `label`       | `sample`                                 | observation row        |
//!
//! A row labelled `unknown` carries the unknown sample's two temperatures.
//! Lines that fail to parse are reported, never fatal, and keep their form row
//! as a blank observation so later lines stay on their own mixtures.

use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use csv::StringRecord;
use tracing::{info, warn};

use crate::domain::{ExperimentConfig, Observation, SheetInput, UnknownSample};
use crate::error::AppError;

const WATER_COLUMNS: &[&str] = &["water_ml", "water", "water_volume_ml", "vol_water"];
const DIS_COLUMNS: &[&str] = &["t_disappear", "t_dis", "disappearance", "tdis"];
const APP_COLUMNS: &[&str] = &["t_appear", "t_app", "appearance", "tapp"];
const LABEL_COLUMNS: &[&str] = &["label", "sample"];

/// A line that was skipped during ingest.
#[derive(Debug, Clone, PartialEq)]
pub struct RowError {
    pub line: usize,
    pub message: String,
}

/// Ingest output: the form state plus what was skipped.
#[derive(Debug, Clone)]
pub struct LoadedSheet {
    pub sheet: SheetInput,
    pub row_errors: Vec<RowError>,
    pub rows_read: usize,
}

#[derive(Debug, Clone, Copy)]
struct Columns {
    water: Option<usize>,
    dis: usize,
    app: usize,
    label: Option<usize>,
}

/// Load a sheet CSV from disk.
pub fn load_sheet(path: &Path, config: &ExperimentConfig) -> Result<LoadedSheet, AppError> {
    let file = File::open(path)
        .map_err(|e| AppError::input(format!("Failed to open sheet '{}': {e}", path.display())))?;
    let loaded = read_sheet(file, config)?;
    info!(
        path = %path.display(),
        rows = loaded.rows_read,
        skipped = loaded.row_errors.len(),
        "loaded observation sheet"
    );
    Ok(loaded)
}

/// Parse a sheet CSV from any reader.
///
/// The returned sheet always has at least `config.rows` observation rows; short
/// sheets are padded with blank rows carrying the default water volumes.
pub fn read_sheet<R: Read>(reader: R, config: &ExperimentConfig) -> Result<LoadedSheet, AppError> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = reader
        .headers()
        .map_err(|e| AppError::input(format!("Failed to read sheet headers: {e}")))?
        .clone();
    let columns = resolve_columns(&build_header_map(&headers))?;

    let mut observations = Vec::new();
    let mut unknown: Option<UnknownSample> = None;
    let mut row_errors = Vec::new();
    let mut rows_read = 0usize;

    for (idx, result) in reader.records().enumerate() {
        // Header is line 1.
        let line = idx + 2;
        rows_read += 1;

        let record = match result {
            Ok(r) => r,
            Err(e) => {
                row_errors.push(RowError {
                    line,
                    message: format!("CSV parse error: {e}"),
                });
                // The line still occupies its form row.
                observations.push(Observation::blank(config.default_water_volume(observations.len())));
                continue;
            }
        };

        if is_unknown_row(&record, columns) {
            if unknown.is_some() {
                row_errors.push(RowError {
                    line,
                    message: "duplicate unknown sample row".to_string(),
                });
                continue;
            }
            match parse_temps(&record, columns) {
                Ok((dis, app)) => {
                    unknown = Some(UnknownSample {
                        disappearance_temp: dis,
                        appearance_temp: app,
                    })
                }
                Err(message) => row_errors.push(RowError { line, message }),
            }
            continue;
        }

        let index = observations.len();
        let default_water = config.default_water_volume(index);
        match parse_observation(&record, columns, default_water) {
            Ok(obs) => observations.push(obs),
            Err(message) => {
                row_errors.push(RowError { line, message });
                observations.push(Observation::blank(default_water));
            }
        }
    }

    if observations.len() > config.rows {
        return Err(AppError::input(format!(
            "Sheet has {} observation rows; the form holds at most {}.",
            observations.len(),
            config.rows
        )));
    }
    while observations.len() < config.rows {
        let index = observations.len();
        observations.push(Observation::blank(config.default_water_volume(index)));
    }

    for err in &row_errors {
        warn!(line = err.line, "skipped sheet line: {}", err.message);
    }

    Ok(LoadedSheet {
        sheet: SheetInput {
            observations,
            unknown: unknown.unwrap_or_default(),
        },
        row_errors,
        rows_read,
    })
}

fn build_header_map(headers: &StringRecord) -> HashMap<String, usize> {
    headers
        .iter()
        .enumerate()
        .map(|(idx, name)| (normalize_header_name(name), idx))
        .collect()
}

fn normalize_header_name(name: &str) -> String {
    // Spreadsheet exports often prefix the first header with a UTF-8 BOM.
    let name = name.trim().trim_start_matches('\u{feff}');
    name.to_ascii_lowercase()
}

fn find_column(header_map: &HashMap<String, usize>, names: &[&str]) -> Option<usize> {
    names.iter().find_map(|n| header_map.get(*n).copied())
}

fn resolve_columns(header_map: &HashMap<String, usize>) -> Result<Columns, AppError> {
    let dis = find_column(header_map, DIS_COLUMNS);
    let app = find_column(header_map, APP_COLUMNS);
    match (dis, app) {
        (Some(dis), Some(app)) => Ok(Columns {
            water: find_column(header_map, WATER_COLUMNS),
            dis,
            app,
            label: find_column(header_map, LABEL_COLUMNS),
        }),
        _ => Err(AppError::input(format!(
            "Sheet must have '{}' and '{}' columns.",
            DIS_COLUMNS[0], APP_COLUMNS[0]
        ))),
    }
}

fn is_unknown_row(record: &StringRecord, columns: Columns) -> bool {
    columns
        .label
        .and_then(|idx| record.get(idx))
        .is_some_and(|label| label.eq_ignore_ascii_case("unknown"))
}

fn parse_temps(record: &StringRecord, columns: Columns) -> Result<(Option<f64>, Option<f64>), String> {
    let dis = parse_opt_f64(record.get(columns.dis))
        .map_err(|raw| format!("invalid disappearance temperature '{raw}'"))?;
    let app = parse_opt_f64(record.get(columns.app))
        .map_err(|raw| format!("invalid appearance temperature '{raw}'"))?;
    Ok((dis, app))
}

fn parse_observation(
    record: &StringRecord,
    columns: Columns,
    default_water: f64,
) -> Result<Observation, String> {
    let water = match columns.water {
        Some(idx) => parse_opt_f64(record.get(idx))
            .map_err(|raw| format!("invalid water volume '{raw}'"))?
            .unwrap_or(default_water),
        None => default_water,
    };
    let (dis, app) = parse_temps(record, columns)?;
    Ok(Observation {
        water_volume_ml: water,
        disappearance_temp: dis,
        appearance_temp: app,
    })
}

/// Blank -> `Ok(None)`; unparseable -> `Err(raw)`.
fn parse_opt_f64(s: Option<&str>) -> Result<Option<f64>, String> {
    match s.map(str::trim) {
        None | Some("") => Ok(None),
        Some(raw) => raw.parse::<f64>().map(Some).map_err(|_| raw.to_string()),
    }
}
