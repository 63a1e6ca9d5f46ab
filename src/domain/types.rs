//! Shared domain types.
//!
//! These types are intentionally kept lightweight and serializable so they can be:
//!
//! - recomputed in-memory on every form edit
//! - exported to JSON/CSV
//! - reloaded later for plotting

use serde::{Deserialize, Serialize};

/// Phenol volume (ml) used in every mixture unless configured otherwise.
pub const DEFAULT_PHENOL_VOLUME_ML: f64 = 5.0;

/// Number of observation rows on the form.
pub const DEFAULT_ROWS: usize = 15;

/// Default water volume of the first row (ml).
pub const DEFAULT_WATER_START_ML: f64 = 3.0;

/// Default water volume increment between rows (ml).
pub const DEFAULT_WATER_STEP_ML: f64 = 2.0;

/// One observation row: a mixture and its two turbidity temperatures.
///
/// `None` means "not entered". Whether a literal `0.0` also means "not entered"
/// depends on [`ExperimentConfig::zero_is_blank`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    pub water_volume_ml: f64,
    pub disappearance_temp: Option<f64>,
    pub appearance_temp: Option<f64>,
}

impl Observation {
    pub fn blank(water_volume_ml: f64) -> Self {
        Self {
            water_volume_ml,
            disappearance_temp: None,
            appearance_temp: None,
        }
    }

    pub fn new(water_volume_ml: f64, disappearance_temp: f64, appearance_temp: f64) -> Self {
        Self {
            water_volume_ml,
            disappearance_temp: Some(disappearance_temp),
            appearance_temp: Some(appearance_temp),
        }
    }
}

/// The unknown-composition sample: only its two temperatures are measured.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct UnknownSample {
    pub disappearance_temp: Option<f64>,
    pub appearance_temp: Option<f64>,
}

impl UnknownSample {
    pub fn new(disappearance_temp: f64, appearance_temp: f64) -> Self {
        Self {
            disappearance_temp: Some(disappearance_temp),
            appearance_temp: Some(appearance_temp),
        }
    }
}

/// Complete form state. Front ends own one of these and hand it to
/// [`crate::app::pipeline::recompute`] after every edit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SheetInput {
    pub observations: Vec<Observation>,
    pub unknown: UnknownSample,
}

impl SheetInput {
    /// A form with the configured number of rows, default water volumes and no temperatures.
    pub fn blank(config: &ExperimentConfig) -> Self {
        let observations = (0..config.rows)
            .map(|i| Observation::blank(config.default_water_volume(i)))
            .collect();
        Self {
            observations,
            unknown: UnknownSample::default(),
        }
    }
}

/// A valid observation with its derived composition and mean temperature.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DerivedRow {
    /// 1-based row number on the input form.
    pub row: usize,
    pub water_volume_ml: f64,
    pub disappearance_temp: f64,
    pub appearance_temp: f64,
    pub phenol_percent: f64,
    pub mean_temp: f64,
}

/// Why an observation row was left out of the dataset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RowIssue {
    MissingDisappearance,
    MissingAppearance,
    MissingBoth,
    /// Composition or mean came out NaN/infinite (e.g. water volume == -phenol volume).
    NonFinite,
}

impl RowIssue {
    pub fn describe(self) -> &'static str {
        match self {
            RowIssue::MissingDisappearance => "missing disappearance temperature",
            RowIssue::MissingAppearance => "missing appearance temperature",
            RowIssue::MissingBoth => "not entered",
            RowIssue::NonFinite => "non-finite result",
        }
    }
}

/// An excluded observation row.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SkippedRow {
    pub row: usize,
    pub issue: RowIssue,
}

/// Maximum of the mean-temperature curve.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CriticalPoint {
    /// Critical solution temperature (°C).
    pub temperature: f64,
    /// Volume % phenol at the critical point.
    pub composition: f64,
    /// 1-based form row the maximum came from.
    pub row: usize,
}

/// Nearest-neighbour composition estimate for the unknown sample.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct UnknownEstimate {
    pub mean_temp: f64,
    pub phenol_percent: f64,
    /// 1-based form row of the matched observation.
    pub matched_row: usize,
    /// |matched mean_temp - unknown mean_temp|
    pub delta: f64,
}

/// One plotted point.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SeriesPoint {
    pub phenol_percent: f64,
    pub mean_temp: f64,
}

/// Everything the charting collaborator needs: points in dataset order plus the peak.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlotSeries {
    pub points: Vec<SeriesPoint>,
    pub critical: Option<CriticalPoint>,
}

impl PlotSeries {
    pub fn as_pairs(&self) -> Vec<(f64, f64)> {
        self.points
            .iter()
            .map(|p| (p.phenol_percent, p.mean_temp))
            .collect()
    }
}

/// Experiment parameters.
///
/// Loaded from TOML (see `crate::config`); every field falls back to the
/// standard phenol-water procedure when omitted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExperimentConfig {
    /// Phenol volume in every mixture (ml).
    pub phenol_volume_ml: f64,
    /// Number of observation rows on the form.
    pub rows: usize,
    /// Water volume of row 1 (ml).
    pub water_start_ml: f64,
    /// Water volume increment per row (ml).
    pub water_step_ml: f64,
    /// Treat a temperature of exactly `0.0` as "not entered".
    ///
    /// On by default to match how lab sheets have been filled in historically;
    /// turn it off when 0 °C is a genuine reading.
    pub zero_is_blank: bool,
}

impl Default for ExperimentConfig {
    fn default() -> Self {
        Self {
            phenol_volume_ml: DEFAULT_PHENOL_VOLUME_ML,
            rows: DEFAULT_ROWS,
            water_start_ml: DEFAULT_WATER_START_ML,
            water_step_ml: DEFAULT_WATER_STEP_ML,
            zero_is_blank: true,
        }
    }
}

impl ExperimentConfig {
    /// Default water volume for a 0-based row index.
    pub fn default_water_volume(&self, index: usize) -> f64 {
        self.water_start_ml + self.water_step_ml * index as f64
    }
}
