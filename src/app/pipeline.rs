//! Shared recompute pipeline used by both CLI and TUI front-ends.
//!
//! Keeping this in one place avoids duplicating the core workflow:
//! validate rows -> derive dataset -> pick peak -> estimate unknown -> build series
//!
//! The function is pure: every edit in the TUI (and every CLI run) rebuilds the
//! whole `Analysis` from the current `SheetInput`.

use tracing::debug;

use crate::domain::{
    CriticalPoint, DerivedRow, ExperimentConfig, PlotSeries, RowIssue, SeriesPoint, SheetInput,
    SkippedRow, UnknownEstimate,
};
use crate::math::{critical_point, derive_row, nearest_by_mean_temp, unknown_mean};

/// All computed outputs for one snapshot of the form.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Analysis {
    /// Valid rows in input order.
    pub dataset: Vec<DerivedRow>,
    /// Rows left out of the dataset, with the reason.
    pub skipped: Vec<SkippedRow>,
    pub critical: Option<CriticalPoint>,
    /// Mean temperature of the unknown sample; present whenever both readings are,
    /// even if the dataset is empty.
    pub unknown_mean: Option<f64>,
    pub unknown_estimate: Option<UnknownEstimate>,
    pub series: PlotSeries,
}

impl Analysis {
    /// `false` means there is nothing to chart and no results section.
    pub fn has_results(&self) -> bool {
        self.critical.is_some()
    }

    /// Why a 1-based form row was left out, if it was.
    pub fn skipped_issue(&self, row: usize) -> Option<RowIssue> {
        self.skipped.iter().find(|s| s.row == row).map(|s| s.issue)
    }

    /// Derived row for a 1-based form row, if that row is valid.
    pub fn row(&self, row: usize) -> Option<&DerivedRow> {
        self.dataset.iter().find(|r| r.row == row)
    }
}

/// Recompute everything from the current form state.
pub fn recompute(sheet: &SheetInput, config: &ExperimentConfig) -> Analysis {
    let mut dataset = Vec::with_capacity(sheet.observations.len());
    let mut skipped = Vec::new();

    for (idx, obs) in sheet.observations.iter().enumerate() {
        let row = idx + 1;
        match derive_row(row, obs, config) {
            Ok(derived) => dataset.push(derived),
            Err(issue) => {
                if issue != RowIssue::MissingBoth {
                    debug!(row, issue = issue.describe(), "row left out of dataset");
                }
                skipped.push(SkippedRow { row, issue });
            }
        }
    }

    let critical = critical_point(&dataset);
    let unknown_mean = unknown_mean(&sheet.unknown, config);
    let unknown_estimate = unknown_mean.and_then(|t| nearest_by_mean_temp(&dataset, t));

    // Series stays in dataset order so the line, the peak and the nearest match
    // are all computed on the same basis.
    let series = PlotSeries {
        points: dataset
            .iter()
            .map(|r| SeriesPoint {
                phenol_percent: r.phenol_percent,
                mean_temp: r.mean_temp,
            })
            .collect(),
        critical,
    };

    debug!(
        valid = dataset.len(),
        skipped = skipped.len(),
        cst = ?critical.map(|c| c.temperature),
        unknown = ?unknown_estimate.map(|u| u.phenol_percent),
        "recomputed analysis"
    );

    Analysis {
        dataset,
        skipped,
        critical,
        unknown_mean,
        unknown_estimate,
        series,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Observation, UnknownSample};

    fn config() -> ExperimentConfig {
        ExperimentConfig::default()
    }

    #[test]
    fn blank_sheet_produces_no_results() {
        let sheet = SheetInput::blank(&config());
        let analysis = recompute(&sheet, &config());
        assert!(analysis.dataset.is_empty());
        assert_eq!(analysis.skipped.len(), 15);
        assert!(analysis.skipped.iter().all(|s| s.issue == RowIssue::MissingBoth));
        assert!(!analysis.has_results());
        assert!(analysis.series.points.is_empty());
        assert!(analysis.unknown_estimate.is_none());
    }

    #[test]
    fn unknown_mean_is_reported_without_dataset() {
        let mut sheet = SheetInput::blank(&config());
        sheet.unknown = UnknownSample::new(50.0, 48.0);
        let analysis = recompute(&sheet, &config());
        assert_eq!(analysis.unknown_mean, Some(49.0));
        assert!(analysis.unknown_estimate.is_none());
    }

    #[test]
    fn partial_rows_are_skipped_and_order_is_kept() {
        let mut sheet = SheetInput::blank(&config());
        sheet.observations[0] = Observation::new(3.0, 44.0, 42.0);
        sheet.observations[1].disappearance_temp = Some(55.0);
        sheet.observations[2] = Observation::new(7.0, 60.0, 58.0);

        let analysis = recompute(&sheet, &config());
        let rows: Vec<usize> = analysis.dataset.iter().map(|r| r.row).collect();
        assert_eq!(rows, vec![1, 3]);
        assert!(
            analysis
                .skipped
                .contains(&SkippedRow { row: 2, issue: RowIssue::MissingAppearance })
        );
        assert_eq!(analysis.series.points[0].mean_temp, 43.0);
        assert_eq!(analysis.series.points[1].mean_temp, 59.0);

        let cp = analysis.critical.unwrap();
        assert_eq!(cp.row, 3);
        assert_eq!(analysis.series.critical, Some(cp));
        assert!(analysis.row(2).is_none());
        assert_eq!(analysis.skipped_issue(2), Some(RowIssue::MissingAppearance));
        assert_eq!(analysis.skipped_issue(3), None);
        assert_eq!(analysis.row(3).map(|r| r.mean_temp), Some(59.0));
    }

    #[test]
    fn phenol_volume_is_configurable() {
        let config = ExperimentConfig {
            phenol_volume_ml: 10.0,
            ..ExperimentConfig::default()
        };
        let mut sheet = SheetInput::blank(&config);
        sheet.observations[0] = Observation::new(10.0, 40.0, 40.0);
        let analysis = recompute(&sheet, &config);
        assert_eq!(analysis.dataset[0].phenol_percent, 50.0);
    }

    #[test]
    fn unknown_is_matched_against_dataset() {
        let mut sheet = SheetInput::blank(&config());
        sheet.observations[0] = Observation::new(3.0, 45.0, 43.0); // 44.0
        sheet.observations[1] = Observation::new(5.0, 63.0, 61.0); // 62.0
        sheet.observations[2] = Observation::new(7.0, 67.0, 65.0); // 66.0
        sheet.unknown = UnknownSample::new(61.0, 60.0); // 60.5

        let analysis = recompute(&sheet, &config());
        let est = analysis.unknown_estimate.unwrap();
        assert_eq!(est.matched_row, 2);
        assert_eq!(est.phenol_percent, 50.0);
    }
}
