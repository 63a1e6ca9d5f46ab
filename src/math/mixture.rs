//! Per-row arithmetic: composition, mean temperature, and row validation.
//!
//! ```text
//! phenol %  = P / (P + V_water) * 100
//! mean temp = (T_disappear + T_appear) / 2
//! ```
//!
//! No rounding happens here; formatting is a presentation concern.

use crate::domain::{DerivedRow, ExperimentConfig, Observation, RowIssue, UnknownSample};

/// Volume percent of phenol in a mixture of `phenol_ml` phenol and `water_ml` water.
pub fn phenol_percent(phenol_ml: f64, water_ml: f64) -> f64 {
    phenol_ml / (phenol_ml + water_ml) * 100.0
}

/// Mean of the disappearance and appearance temperatures.
pub fn mean_temp(disappearance: f64, appearance: f64) -> f64 {
    (disappearance + appearance) / 2.0
}

/// Resolve one temperature field to an entered value, honoring the blank policy.
pub fn entered(value: Option<f64>, zero_is_blank: bool) -> Option<f64> {
    match value {
        Some(v) if zero_is_blank && v == 0.0 => None,
        other => other,
    }
}

/// Validate an observation and derive its row, or report why it is excluded.
///
/// `row` is the 1-based position on the form.
pub fn derive_row(
    row: usize,
    obs: &Observation,
    config: &ExperimentConfig,
) -> Result<DerivedRow, RowIssue> {
    let dis = entered(obs.disappearance_temp, config.zero_is_blank);
    let app = entered(obs.appearance_temp, config.zero_is_blank);
    let (dis, app) = match (dis, app) {
        (Some(dis), Some(app)) => (dis, app),
        (None, None) => return Err(RowIssue::MissingBoth),
        (None, Some(_)) => return Err(RowIssue::MissingDisappearance),
        (Some(_), None) => return Err(RowIssue::MissingAppearance),
    };

    let phenol = phenol_percent(config.phenol_volume_ml, obs.water_volume_ml);
    let mean = mean_temp(dis, app);
    if !(phenol.is_finite() && mean.is_finite()) {
        return Err(RowIssue::NonFinite);
    }

    Ok(DerivedRow {
        row,
        water_volume_ml: obs.water_volume_ml,
        disappearance_temp: dis,
        appearance_temp: app,
        phenol_percent: phenol,
        mean_temp: mean,
    })
}

/// Mean temperature of the unknown sample, if both readings are entered.
pub fn unknown_mean(sample: &UnknownSample, config: &ExperimentConfig) -> Option<f64> {
    let dis = entered(sample.disappearance_temp, config.zero_is_blank)?;
    let app = entered(sample.appearance_temp, config.zero_is_blank)?;
    let mean = mean_temp(dis, app);
    mean.is_finite().then_some(mean)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn phenol_percent_matches_closed_form_and_decreases() {
        let mut prev = f64::INFINITY;
        for i in 0..15 {
            let water = 3.0 + 2.0 * i as f64;
            let p = phenol_percent(5.0, water);
            assert!((p - 500.0 / (5.0 + water)).abs() < 1e-12);
            assert!(p < prev, "phenol % must fall as water is added");
            prev = p;
        }
        assert!((phenol_percent(5.0, 3.0) - 62.5).abs() < 1e-12);
        assert!((phenol_percent(5.0, 5.0) - 50.0).abs() < 1e-12);
    }

    #[test]
    fn mean_temp_is_symmetric_and_idempotent() {
        for &(a, b) in &[(40.0, 38.0), (66.7, 65.9), (-3.5, 12.25)] {
            assert_eq!(mean_temp(a, b), mean_temp(b, a));
        }
        assert_eq!(mean_temp(42.5, 42.5), 42.5);
    }

    #[test]
    fn zero_is_unset_under_default_policy() {
        let config = ExperimentConfig::default();
        let obs = Observation::new(3.0, 0.0, 45.0);
        assert_eq!(derive_row(1, &obs, &config), Err(RowIssue::MissingDisappearance));
    }

    #[test]
    fn zero_is_a_reading_when_policy_disabled() {
        let config = ExperimentConfig {
            zero_is_blank: false,
            ..ExperimentConfig::default()
        };
        let obs = Observation::new(3.0, 0.0, 45.0);
        let row = derive_row(1, &obs, &config).unwrap();
        assert_eq!(row.mean_temp, 22.5);
    }

    #[test]
    fn missing_fields_are_classified() {
        let config = ExperimentConfig::default();
        let mut obs = Observation::blank(7.0);
        assert_eq!(derive_row(3, &obs, &config), Err(RowIssue::MissingBoth));
        obs.disappearance_temp = Some(50.0);
        assert_eq!(derive_row(3, &obs, &config), Err(RowIssue::MissingAppearance));
        obs.disappearance_temp = None;
        obs.appearance_temp = Some(49.0);
        assert_eq!(derive_row(3, &obs, &config), Err(RowIssue::MissingDisappearance));
    }

    #[test]
    fn singular_water_volume_is_non_finite() {
        let config = ExperimentConfig::default();
        let obs = Observation::new(-5.0, 40.0, 39.0);
        assert_eq!(derive_row(1, &obs, &config), Err(RowIssue::NonFinite));
    }

    #[test]
    fn derived_row_keeps_inputs() {
        let config = ExperimentConfig::default();
        let row = derive_row(2, &Observation::new(5.0, 61.0, 59.0), &config).unwrap();
        assert_eq!(row.row, 2);
        assert_eq!(row.phenol_percent, 50.0);
        assert_eq!(row.mean_temp, 60.0);
        assert_eq!(row.disappearance_temp, 61.0);
    }

    #[test]
    fn unknown_mean_requires_both_readings() {
        let config = ExperimentConfig::default();
        assert_eq!(unknown_mean(&UnknownSample::new(30.0, 28.0), &config), Some(29.0));
        assert_eq!(unknown_mean(&UnknownSample::new(0.0, 28.0), &config), None);
        assert_eq!(unknown_mean(&UnknownSample::default(), &config), None);
    }
}
