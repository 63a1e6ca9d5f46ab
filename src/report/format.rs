//! Formatted terminal output.
//!
//! We keep formatting code in one place so:
//! - the math code stays clean and testable
//! - output changes are localized (important for snapshot tests)
//!
//! Temperatures print with 2 decimals, compositions with 1. Stored values are
//! never rounded.

use crate::app::pipeline::Analysis;
use crate::domain::{ExperimentConfig, RowIssue, SheetInput};

/// Run header: experiment parameters and how many rows were usable.
pub fn format_run_summary(analysis: &Analysis, config: &ExperimentConfig) -> String {
    let mut out = String::new();
    out.push_str("=== cst - Critical Solution Temperature (phenol-water) ===\n");
    out.push_str(&format!(
        "Phenol volume: {} ml | rows: {} | zero means blank: {}\n",
        config.phenol_volume_ml,
        config.rows,
        if config.zero_is_blank { "yes" } else { "no" },
    ));
    out.push_str(&format!(
        "Observations used: {} | skipped: {}\n",
        analysis.dataset.len(),
        analysis.skipped.len()
    ));
    out
}

/// One line per form row, including rows that were left out.
pub fn format_table(sheet: &SheetInput, analysis: &Analysis) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "{:>3}  {:>9}  {:>9}  {:>9}  {:>9}  {:>9}\n",
        "#", "water ml", "T_dis °C", "T_app °C", "mean °C", "% phenol"
    ));

    for (idx, obs) in sheet.observations.iter().enumerate() {
        let row = idx + 1;
        match analysis.row(row) {
            Some(d) => {
                let marker = if analysis.critical.is_some_and(|c| c.row == row) {
                    "  <- CST"
                } else {
                    ""
                };
                out.push_str(&format!(
                    "{row:>3}  {:>9.1}  {:>9.2}  {:>9.2}  {:>9.2}  {:>9.1}{marker}\n",
                    d.water_volume_ml, d.disappearance_temp, d.appearance_temp, d.mean_temp, d.phenol_percent,
                ));
            }
            None => {
                // Untouched rows stay quiet; partial or broken ones say why.
                let note = analysis
                    .skipped_issue(row)
                    .filter(|issue| *issue != RowIssue::MissingBoth)
                    .map(|issue| format!("  ({})", issue.describe()))
                    .unwrap_or_default();
                out.push_str(&format!(
                    "{row:>3}  {:>9.1}  {:>9}  {:>9}  {:>9}  {:>9}{note}\n",
                    obs.water_volume_ml,
                    fmt_opt(obs.disappearance_temp),
                    fmt_opt(obs.appearance_temp),
                    "-",
                    "-",
                ));
            }
        }
    }
    out
}

/// Unknown-sample mean plus the results section.
///
/// Lines only appear when their value can be computed; an empty dataset yields
/// no results lines at all.
pub fn format_results(analysis: &Analysis) -> String {
    let mut out = String::new();

    if let Some(mean) = analysis.unknown_mean {
        out.push_str(&format!("Mean Temp for Unknown Sample: {mean:.2} °C\n"));
    }

    if let Some(cp) = analysis.critical {
        out.push_str("\nResults:\n");
        out.push_str(&format!("Critical Solution Temperature = {:.2} °C\n", cp.temperature));
        out.push_str(&format!("Critical Solution Composition = {:.1} % Phenol\n", cp.composition));
        if let Some(est) = analysis.unknown_estimate {
            out.push_str(&format!(
                "Estimated % of Phenol in Unknown Sample = {:.1} %\n",
                est.phenol_percent
            ));
        }
    }

    out
}

fn fmt_opt(value: Option<f64>) -> String {
    match value {
        Some(v) if v.is_finite() => format!("{v:.2}"),
        _ => "-".to_string(),
    }
}
