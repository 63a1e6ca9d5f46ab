//! End-to-end checks through the public library API.

use cst_estimator::app::pipeline::recompute;
use cst_estimator::domain::{ExperimentConfig, Observation, SheetInput, UnknownSample};
use cst_estimator::io::{ingest, series};
use cst_estimator::math::{mean_temp, phenol_percent};
use cst_estimator::plot::render_ascii_plot;

fn close(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-9
}

/// Water volumes giving 40 %, 20 % and 10 % phenol with 5 ml phenol.
fn three_row_sheet(config: &ExperimentConfig) -> SheetInput {
    let mut sheet = SheetInput::blank(config);
    sheet.observations[0] = Observation::new(7.5, 11.0, 9.0);
    sheet.observations[1] = Observation::new(20.0, 31.0, 29.0);
    sheet.observations[2] = Observation::new(45.0, 26.0, 24.0);
    sheet
}

#[test]
fn phenol_percent_falls_as_water_rises() {
    let mut prev = f64::INFINITY;
    for i in 1..200 {
        let water = i as f64 * 0.25;
        let p = phenol_percent(5.0, water);
        assert!(close(p, 500.0 / (5.0 + water)));
        assert!(p < prev);
        prev = p;
    }
}

#[test]
fn mean_temp_is_symmetric() {
    assert_eq!(mean_temp(41.3, 67.9), mean_temp(67.9, 41.3));
    assert_eq!(mean_temp(55.5, 55.5), 55.5);
}

#[test]
fn peak_and_unknown_from_a_sheet() {
    let config = ExperimentConfig::default();
    let mut sheet = three_row_sheet(&config);
    sheet.unknown = UnknownSample::new(25.0, 23.0);

    let analysis = recompute(&sheet, &config);
    assert_eq!(analysis.dataset.len(), 3);

    let cp = analysis.critical.unwrap();
    assert_eq!(cp.row, 2);
    assert!(close(cp.temperature, 30.0));
    assert!(close(cp.composition, 20.0));

    let est = analysis.unknown_estimate.unwrap();
    assert_eq!(est.matched_row, 3);
    assert!(close(est.phenol_percent, 10.0));

    // Series stays in form order, not sorted by composition.
    let xs: Vec<f64> = analysis.series.points.iter().map(|p| p.phenol_percent).collect();
    assert!(xs[0] > xs[1] && xs[1] > xs[2]);
}

#[test]
fn equal_peaks_keep_the_first_row() {
    let config = ExperimentConfig::default();
    let mut sheet = SheetInput::blank(&config);
    sheet.observations[0] = Observation::new(7.5, 21.0, 19.0);
    sheet.observations[1] = Observation::new(20.0, 19.0, 21.0);

    let cp = recompute(&sheet, &config).critical.unwrap();
    assert_eq!(cp.row, 1);
    assert!(close(cp.composition, 40.0));
}

#[test]
fn empty_form_yields_nothing_and_does_not_panic() {
    let config = ExperimentConfig::default();
    let mut sheet = SheetInput::blank(&config);
    sheet.unknown = UnknownSample::new(50.0, 48.0);

    let analysis = recompute(&sheet, &config);
    assert!(analysis.dataset.is_empty());
    assert!(analysis.critical.is_none());
    assert!(analysis.unknown_estimate.is_none());
    assert_eq!(analysis.unknown_mean, Some(49.0));
    assert!(render_ascii_plot(&analysis.series, 40, 10).is_none());
}

#[test]
fn zero_reading_policy() {
    let mut config = ExperimentConfig::default();
    let mut sheet = SheetInput::blank(&config);
    sheet.observations[0].disappearance_temp = Some(0.0);
    sheet.observations[0].appearance_temp = Some(45.0);

    assert!(recompute(&sheet, &config).dataset.is_empty());

    config.zero_is_blank = false;
    let analysis = recompute(&sheet, &config);
    assert_eq!(analysis.dataset.len(), 1);
    assert_eq!(analysis.dataset[0].mean_temp, 22.5);
}

#[test]
fn csv_sheet_to_series_file_and_back() {
    let csv = "label,water_ml,t_disappear,t_appear\n\
               ,7.5,11,9\n\
               ,20,31,29\n\
               ,45,26,24\n\
               unknown,,25,23\n";
    let config = ExperimentConfig::default();
    let loaded = ingest::read_sheet(csv.as_bytes(), &config).unwrap();
    assert!(loaded.row_errors.is_empty());

    let analysis = recompute(&loaded.sheet, &config);
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("series.json");
    series::write_series_json(&path, &analysis, &config).unwrap();

    let file = series::read_series_json(&path).unwrap();
    assert_eq!(file.points.len(), 3);
    let cp = file.critical.unwrap();
    assert!((cp.temperature - 30.0).abs() < 1e-9);
    assert!((file.unknown.unwrap().phenol_percent - 10.0).abs() < 1e-9);

    let plot = render_ascii_plot(&file.plot_series(), 40, 10).unwrap();
    assert!(plot.contains("CST = 30.00°C @ 20.0%"));
}
