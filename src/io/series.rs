//! Read/write series JSON files.
//!
//! A series file is the portable form of one analysis: the plotted points in
//! dataset order, the critical point and the unknown estimate. `cst plot`
//! re-renders it without the original sheet.

use std::fs::File;
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::app::pipeline::Analysis;
use crate::domain::{CriticalPoint, ExperimentConfig, PlotSeries, SeriesPoint, UnknownEstimate};
use crate::error::AppError;

pub const TOOL_NAME: &str = "cst";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeriesFile {
    pub tool: String,
    pub generated: DateTime<Utc>,
    pub phenol_volume_ml: f64,
    pub points: Vec<SeriesPoint>,
    pub critical: Option<CriticalPoint>,
    #[serde(default)]
    pub unknown: Option<UnknownEstimate>,
}

impl SeriesFile {
    pub fn from_analysis(analysis: &Analysis, config: &ExperimentConfig) -> Self {
        Self {
            tool: TOOL_NAME.to_string(),
            generated: Utc::now(),
            phenol_volume_ml: config.phenol_volume_ml,
            points: analysis.series.points.clone(),
            critical: analysis.critical,
            unknown: analysis.unknown_estimate,
        }
    }

    pub fn plot_series(&self) -> PlotSeries {
        PlotSeries {
            points: self.points.clone(),
            critical: self.critical,
        }
    }
}

/// Write a series JSON file.
pub fn write_series_json(
    path: &Path,
    analysis: &Analysis,
    config: &ExperimentConfig,
) -> Result<(), AppError> {
    let file = File::create(path)
        .map_err(|e| AppError::input(format!("Failed to create series JSON '{}': {e}", path.display())))?;

    let series = SeriesFile::from_analysis(analysis, config);
    serde_json::to_writer_pretty(file, &series)
        .map_err(|e| AppError::input(format!("Failed to write series JSON: {e}")))?;

    info!(path = %path.display(), points = series.points.len(), "wrote series JSON");
    Ok(())
}

/// Read a series JSON file.
pub fn read_series_json(path: &Path) -> Result<SeriesFile, AppError> {
    let file = File::open(path)
        .map_err(|e| AppError::input(format!("Failed to open series JSON '{}': {e}", path.display())))?;
    let series: SeriesFile =
        serde_json::from_reader(file).map_err(|e| AppError::input(format!("Invalid series JSON: {e}")))?;
    Ok(series)
}
