//! CSV writers: derived results table and raw observation sheets.
//!
//! The results export is meant to be easy to consume in spreadsheets. The sheet
//! writer produces files that `ingest::read_sheet` reads back.

use std::fs::File;
use std::io::Write;
use std::path::Path;

use tracing::info;

use crate::app::pipeline::Analysis;
use crate::domain::SheetInput;
use crate::error::AppError;

/// Write the derived dataset to a CSV file.
pub fn write_results_csv(path: &Path, analysis: &Analysis) -> Result<(), AppError> {
    let mut file = File::create(path)
        .map_err(|e| AppError::input(format!("Failed to create export CSV '{}': {e}", path.display())))?;
    write_results(&mut file, analysis)?;
    info!(path = %path.display(), rows = analysis.dataset.len(), "wrote results CSV");
    Ok(())
}

pub fn write_results<W: Write>(out: &mut W, analysis: &Analysis) -> Result<(), AppError> {
    writeln!(
        out,
        "row,water_ml,t_disappear,t_appear,mean_temp_c,phenol_percent,critical"
    )
    .map_err(|e| AppError::input(format!("Failed to write export CSV header: {e}")))?;

    let critical_row = analysis.critical.map(|c| c.row);
    for r in &analysis.dataset {
        writeln!(
            out,
            "{},{},{},{},{:.4},{:.4},{}",
            r.row,
            r.water_volume_ml,
            r.disappearance_temp,
            r.appearance_temp,
            r.mean_temp,
            r.phenol_percent,
            critical_row == Some(r.row),
        )
        .map_err(|e| AppError::input(format!("Failed to write export CSV row: {e}")))?;
    }
    Ok(())
}

/// Write an input sheet (observations + unknown row) to a CSV file.
pub fn write_sheet_csv(path: &Path, sheet: &SheetInput) -> Result<(), AppError> {
    let mut file = File::create(path)
        .map_err(|e| AppError::input(format!("Failed to create sheet CSV '{}': {e}", path.display())))?;
    write_sheet(&mut file, sheet)?;
    info!(path = %path.display(), "wrote observation sheet");
    Ok(())
}

pub fn write_sheet<W: Write>(out: &mut W, sheet: &SheetInput) -> Result<(), AppError> {
    let write_err = |e: std::io::Error| AppError::input(format!("Failed to write sheet CSV: {e}"));

    writeln!(out, "label,water_ml,t_disappear,t_appear").map_err(write_err)?;
    for obs in &sheet.observations {
        writeln!(
            out,
            ",{},{},{}",
            obs.water_volume_ml,
            fmt_opt(obs.disappearance_temp),
            fmt_opt(obs.appearance_temp)
        )
        .map_err(write_err)?;
    }
    let unknown = &sheet.unknown;
    if unknown.disappearance_temp.is_some() || unknown.appearance_temp.is_some() {
        writeln!(
            out,
            "unknown,,{},{}",
            fmt_opt(unknown.disappearance_temp),
            fmt_opt(unknown.appearance_temp)
        )
        .map_err(write_err)?;
    }
    Ok(())
}

fn fmt_opt(value: Option<f64>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}
