//! Command-line parsing for the CST estimator.
//!
//! The goal of this module is to keep **argument parsing** and **command dispatch**
//! separate from the calculation code.

use std::path::PathBuf;

use clap::{ArgAction, Args, Parser, Subcommand};

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(
    name = "cst",
    version,
    about = "Critical solution temperature estimator for the phenol-water system"
)]
pub struct Cli {
    /// Verbosity level (-v, -vv, -vvv). `RUST_LOG` is used when not given.
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Experiment config (TOML). Falls back to $CST_CONFIG, then ./cst.toml.
    #[arg(long, value_name = "TOML", global = true)]
    pub config: Option<PathBuf>,

    /// Treat a temperature of 0 as a real reading instead of "not entered".
    #[arg(long, global = true)]
    pub zero_is_reading: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Compute the CST curve from a sheet and/or inline observations.
    Analyze(AnalyzeArgs),
    /// Plot a previously exported series JSON.
    Plot(PlotArgs),
    /// Generate a simulated observation sheet.
    Demo(DemoArgs),
    /// Print the effective experiment configuration as TOML.
    Config,
    /// Launch the interactive form (default).
    Tui(TuiArgs),
}

/// Options for `cst analyze`.
#[derive(Debug, Args, Clone)]
pub struct AnalyzeArgs {
    /// Observation sheet CSV (columns: water_ml, t_disappear, t_appear, optional label).
    #[arg(long, value_name = "CSV")]
    pub sheet: Option<PathBuf>,

    /// Observation as `T_DIS,T_APP` (default water series) or `WATER,T_DIS,T_APP`.
    /// Repeat for each row; fills rows after those read from --sheet.
    #[arg(long = "obs", value_name = "VALUES", value_parser = parse_obs_spec, allow_hyphen_values = true)]
    pub obs: Vec<ObsSpec>,

    /// Unknown sample as `T_DIS,T_APP`. Overrides an `unknown` row in the sheet.
    #[arg(long, value_name = "T_DIS,T_APP", value_parser = parse_pair, allow_hyphen_values = true)]
    pub unknown: Option<(f64, f64)>,

    /// Skip the terminal plot.
    #[arg(long)]
    pub no_plot: bool,

    /// Plot width (columns).
    #[arg(long, default_value_t = 72)]
    pub width: usize,

    /// Plot height (rows).
    #[arg(long, default_value_t = 20)]
    pub height: usize,

    /// Export derived rows to CSV.
    #[arg(long, value_name = "CSV")]
    pub export: Option<PathBuf>,

    /// Export the plot series (points + critical point) to JSON.
    #[arg(long = "export-series", value_name = "JSON")]
    pub export_series: Option<PathBuf>,
}

/// Options for plotting a saved series.
#[derive(Debug, Args)]
pub struct PlotArgs {
    /// Series JSON file produced by `cst analyze --export-series`.
    #[arg(long, value_name = "JSON")]
    pub series: PathBuf,

    /// Plot width (columns).
    #[arg(long, default_value_t = 72)]
    pub width: usize,

    /// Plot height (rows).
    #[arg(long, default_value_t = 20)]
    pub height: usize,
}

/// Options for `cst demo`.
#[derive(Debug, Args)]
pub struct DemoArgs {
    /// Random seed.
    #[arg(long, default_value_t = 42)]
    pub seed: u64,

    /// Reading noise standard deviation (°C).
    #[arg(long, default_value_t = 0.3)]
    pub noise: f64,

    /// Disappearance minus appearance temperature (°C).
    #[arg(long, default_value_t = 0.8)]
    pub hysteresis: f64,

    /// Write the sheet here instead of stdout.
    #[arg(long, value_name = "CSV")]
    pub out: Option<PathBuf>,
}

/// Options for the interactive form.
#[derive(Debug, Args, Clone)]
pub struct TuiArgs {
    /// Pre-fill the form from a sheet CSV.
    #[arg(long, value_name = "CSV")]
    pub sheet: Option<PathBuf>,

    /// Where the `e` key writes the series JSON.
    #[arg(long = "export-series", value_name = "JSON", default_value = "cst-series.json")]
    pub export_series: PathBuf,
}

/// One `--obs` value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ObsSpec {
    pub water_ml: Option<f64>,
    pub disappearance_temp: f64,
    pub appearance_temp: f64,
}

fn parse_numbers(s: &str) -> Result<Vec<f64>, String> {
    s.split(',')
        .map(|part| {
            let part = part.trim();
            part.parse::<f64>()
                .map_err(|_| format!("'{part}' is not a number"))
        })
        .collect()
}

pub fn parse_obs_spec(s: &str) -> Result<ObsSpec, String> {
    match parse_numbers(s)?.as_slice() {
        &[dis, app] => Ok(ObsSpec {
            water_ml: None,
            disappearance_temp: dis,
            appearance_temp: app,
        }),
        &[water, dis, app] => Ok(ObsSpec {
            water_ml: Some(water),
            disappearance_temp: dis,
            appearance_temp: app,
        }),
        _ => Err("expected T_DIS,T_APP or WATER,T_DIS,T_APP".to_string()),
    }
}

pub fn parse_pair(s: &str) -> Result<(f64, f64), String> {
    match parse_numbers(s)?.as_slice() {
        &[a, b] => Ok((a, b)),
        _ => Err("expected T_DIS,T_APP".to_string()),
    }
}
