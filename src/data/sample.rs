//! Synthetic observation sheets for demos and practice runs.
//!
//! Readings come from a concave miscibility curve
//!
//! ```text
//! T(x) = T_c - k * (x - x_c)^2        x = volume % phenol
//! ```
//!
//! with the turbidity pair split by a small hysteresis, Gaussian reading noise,
//! and rounding to the 0.1 °C resolution of a lab thermometer.

use rand::prelude::*;
use rand::rngs::StdRng;
use rand_distr::Normal;
use tracing::debug;

use crate::domain::{ExperimentConfig, Observation, SheetInput, UnknownSample};
use crate::error::AppError;
use crate::math::phenol_percent;

/// Upper consolute temperature of phenol-water (°C).
pub const MODEL_CST: f64 = 66.8;

/// Composition at the critical point (volume % phenol).
pub const MODEL_CRITICAL_PERCENT: f64 = 36.0;

/// Curvature of the miscibility dome (°C per %^2).
pub const MODEL_CURVATURE: f64 = 0.035;

/// Range the unknown sample's composition is drawn from (volume % phenol).
const UNKNOWN_PERCENT_RANGE: (f64, f64) = (15.0, 30.0);

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DemoConfig {
    pub seed: u64,
    /// Standard deviation of each reading (°C).
    pub noise_sd: f64,
    /// Disappearance minus appearance temperature (°C).
    pub hysteresis: f64,
}

impl Default for DemoConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            noise_sd: 0.3,
            hysteresis: 0.8,
        }
    }
}

/// Noise-free mean temperature at a composition.
pub fn model_temperature(percent: f64) -> f64 {
    MODEL_CST - MODEL_CURVATURE * (percent - MODEL_CRITICAL_PERCENT).powi(2)
}

/// Fill every form row and the unknown sample with simulated readings.
pub fn generate_sheet(config: &ExperimentConfig, demo: &DemoConfig) -> Result<SheetInput, AppError> {
    if !(demo.noise_sd.is_finite() && demo.noise_sd >= 0.0) {
        return Err(AppError::input("Demo noise must be a non-negative number."));
    }
    if !(demo.hysteresis.is_finite() && demo.hysteresis >= 0.0) {
        return Err(AppError::input("Demo hysteresis must be a non-negative number."));
    }

    let mut rng = StdRng::seed_from_u64(demo.seed);
    let normal = Normal::new(0.0, demo.noise_sd)
        .map_err(|e| AppError::new(4, format!("Noise distribution error: {e}")))?;

    let reading_pair = |percent: f64, rng: &mut StdRng| {
        let t = model_temperature(percent);
        let half = demo.hysteresis / 2.0;
        let dis = round_reading(t + half + normal.sample(rng));
        let app = round_reading(t - half + normal.sample(rng));
        (dis, app)
    };

    let mut observations = Vec::with_capacity(config.rows);
    for i in 0..config.rows {
        let water = config.default_water_volume(i);
        let percent = phenol_percent(config.phenol_volume_ml, water);
        let (dis, app) = reading_pair(percent, &mut rng);
        observations.push(Observation::new(water, dis, app));
    }

    let unknown_percent = rng.gen_range(UNKNOWN_PERCENT_RANGE.0..=UNKNOWN_PERCENT_RANGE.1);
    let (dis, app) = reading_pair(unknown_percent, &mut rng);
    debug!(seed = demo.seed, unknown_percent, "generated demo sheet");

    Ok(SheetInput {
        observations,
        unknown: UnknownSample::new(dis, app),
    })
}

fn round_reading(v: f64) -> f64 {
    (v * 10.0).round() / 10.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::pipeline::recompute;

    #[test]
    fn same_seed_same_sheet() {
        let config = ExperimentConfig::default();
        let a = generate_sheet(&config, &DemoConfig::default()).unwrap();
        let b = generate_sheet(&config, &DemoConfig::default()).unwrap();
        assert_eq!(a, b);

        let c = generate_sheet(&config, &DemoConfig { seed: 7, ..DemoConfig::default() }).unwrap();
        assert_ne!(a, c);
    }

    #[test]
    fn noise_free_sheet_peaks_near_model_cst() {
        let config = ExperimentConfig::default();
        let demo = DemoConfig {
            noise_sd: 0.0,
            ..DemoConfig::default()
        };
        let sheet = generate_sheet(&config, &demo).unwrap();
        let analysis = recompute(&sheet, &config);

        assert_eq!(analysis.dataset.len(), 15);
        let cp = analysis.critical.unwrap();
        // Water 9 ml -> 35.7 % phenol is the closest default row to the dome top.
        assert_eq!(cp.row, 4);
        assert!((cp.temperature - MODEL_CST).abs() < 0.15, "cst = {}", cp.temperature);

        assert!(analysis.unknown_estimate.is_some());
    }

    #[test]
    fn disappearance_reads_above_appearance_without_noise() {
        let config = ExperimentConfig::default();
        let demo = DemoConfig {
            noise_sd: 0.0,
            hysteresis: 1.0,
            ..DemoConfig::default()
        };
        let sheet = generate_sheet(&config, &demo).unwrap();
        for obs in &sheet.observations {
            let dis = obs.disappearance_temp.unwrap();
            let app = obs.appearance_temp.unwrap();
            assert!(dis > app);
        }
    }

    #[test]
    fn rejects_negative_noise() {
        let demo = DemoConfig {
            noise_sd: -1.0,
            ..DemoConfig::default()
        };
        assert!(generate_sheet(&ExperimentConfig::default(), &demo).is_err());
    }
}
