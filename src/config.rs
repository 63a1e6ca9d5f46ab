//! Experiment configuration loading.
//!
//! Resolution order:
//! 1. explicit `--config <file>`
//! 2. `CST_CONFIG` (a `.env` file in the working directory is honored)
//! 3. `./cst.toml`
//! 4. built-in defaults

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::domain::ExperimentConfig;
use crate::error::AppError;

/// Environment variable naming a config file.
pub const CONFIG_ENV: &str = "CST_CONFIG";

/// Config file picked up from the working directory when nothing else is given.
pub const DEFAULT_CONFIG_FILE: &str = "cst.toml";

/// Largest form we are willing to build.
pub const MAX_ROWS: usize = 64;

/// Load the effective configuration.
pub fn load(explicit: Option<&Path>) -> Result<ExperimentConfig, AppError> {
    // Missing `.env` is the normal case.
    let _ = dotenvy::dotenv();

    let path = match explicit {
        Some(p) => Some(p.to_path_buf()),
        None => std::env::var_os(CONFIG_ENV)
            .map(PathBuf::from)
            .or_else(|| {
                let local = PathBuf::from(DEFAULT_CONFIG_FILE);
                local.exists().then_some(local)
            }),
    };

    let config = match path {
        Some(path) => {
            let config = read_file(&path)?;
            info!(path = %path.display(), "loaded experiment config");
            config
        }
        None => {
            debug!("no config file; using defaults");
            ExperimentConfig::default()
        }
    };

    validate(&config)?;
    Ok(config)
}

/// Parse a TOML config file.
pub fn read_file(path: &Path) -> Result<ExperimentConfig, AppError> {
    let content = fs::read_to_string(path)
        .map_err(|e| AppError::input(format!("Failed to read config '{}': {e}", path.display())))?;
    parse(&content)
        .map_err(|e| AppError::input(format!("Invalid config '{}': {e}", path.display())))
}

/// Parse config TOML text.
pub fn parse(content: &str) -> Result<ExperimentConfig, toml::de::Error> {
    toml::from_str(content)
}

/// Render a config as TOML (used by `cst config`).
pub fn to_toml(config: &ExperimentConfig) -> Result<String, AppError> {
    toml::to_string_pretty(config)
        .map_err(|e| AppError::new(4, format!("Failed to serialize config: {e}")))
}

pub fn validate(config: &ExperimentConfig) -> Result<(), AppError> {
    if !(config.phenol_volume_ml.is_finite() && config.phenol_volume_ml > 0.0) {
        return Err(AppError::input("phenol_volume_ml must be a positive number."));
    }
    if config.rows == 0 || config.rows > MAX_ROWS {
        return Err(AppError::input(format!("rows must be between 1 and {MAX_ROWS}.")));
    }
    if !(config.water_start_ml.is_finite() && config.water_step_ml.is_finite()) {
        return Err(AppError::input("water_start_ml and water_step_ml must be finite."));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_partial_toml() {
        let cfg = parse("rows = 10\nzero_is_blank = false\n").unwrap();
        assert_eq!(cfg.rows, 10);
        assert!(!cfg.zero_is_blank);
        assert_eq!(cfg.phenol_volume_ml, 5.0);
    }

    #[test]
    fn rejects_bad_values() {
        let mut cfg = ExperimentConfig::default();
        cfg.phenol_volume_ml = 0.0;
        assert_eq!(validate(&cfg).unwrap_err().exit_code(), 2);

        let mut cfg = ExperimentConfig::default();
        cfg.rows = 0;
        assert!(validate(&cfg).is_err());

        let mut cfg = ExperimentConfig::default();
        cfg.water_step_ml = f64::NAN;
        assert!(validate(&cfg).is_err());

        assert!(validate(&ExperimentConfig::default()).is_ok());
    }

    #[test]
    fn toml_roundtrip_of_defaults() {
        let text = to_toml(&ExperimentConfig::default()).unwrap();
        assert!(text.contains("phenol_volume_ml = 5.0"));
        assert_eq!(parse(&text).unwrap(), ExperimentConfig::default());
    }

    #[test]
    fn explicit_file_is_read() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("lab.toml");
        fs::write(&path, "phenol_volume_ml = 4.0\n").unwrap();
        let cfg = load(Some(&path)).unwrap();
        assert_eq!(cfg.phenol_volume_ml, 4.0);
    }

    #[test]
    fn missing_explicit_file_is_input_error() {
        let err = load(Some(Path::new("/nonexistent/cst.toml"))).unwrap_err();
        assert_eq!(err.exit_code(), 2);
    }
}
