//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - parses CLI arguments
//! - sets up logging and loads the experiment config
//! - builds the sheet (CSV / inline observations / simulation)
//! - runs the recompute pipeline
//! - prints reports/plots and writes optional exports

use std::io::Write;

use clap::Parser;
use tracing::debug;

use crate::cli::{AnalyzeArgs, Cli, Command, DemoArgs, ObsSpec, PlotArgs, TuiArgs};
use crate::data::{DemoConfig, generate_sheet};
use crate::domain::{ExperimentConfig, SheetInput, UnknownSample};
use crate::error::AppError;
use crate::io::series::SeriesFile;

pub mod pipeline;

const SUBCOMMANDS: &[&str] = &["analyze", "plot", "demo", "config", "tui", "help"];

/// Top-level and `tui` flags that take a separate value.
const VALUE_FLAGS: &[&str] = &["--config", "--sheet", "--export-series"];

/// Entry point for the `cst` binary.
pub fn run() -> Result<(), AppError> {
    // `cst` and `cst --sheet x.csv` should behave like `cst tui ...`.
    let argv = rewrite_args(std::env::args().collect());
    let cli = Cli::parse_from(argv);

    crate::logging::init(cli.verbose);

    let mut config = crate::config::load(cli.config.as_deref())?;
    if cli.zero_is_reading {
        config.zero_is_blank = false;
    }
    debug!(?config, "effective configuration");

    match cli.command {
        Command::Analyze(args) => handle_analyze(args, &config),
        Command::Plot(args) => handle_plot(args),
        Command::Demo(args) => handle_demo(args, &config),
        Command::Config => handle_config(&config),
        Command::Tui(args) => handle_tui(args, &config),
    }
}

fn handle_analyze(args: AnalyzeArgs, config: &ExperimentConfig) -> Result<(), AppError> {
    let sheet = build_sheet(&args, config)?;
    let analysis = pipeline::recompute(&sheet, config);

    println!("{}", crate::report::format_run_summary(&analysis, config));
    println!("{}", crate::report::format_table(&sheet, &analysis));

    if !args.no_plot && analysis.has_results() {
        if let Some(plot) = crate::plot::render_ascii_plot(&analysis.series, args.width, args.height) {
            println!("{plot}");
        }
    }

    print!("{}", crate::report::format_results(&analysis));

    if let Some(path) = &args.export {
        crate::io::export::write_results_csv(path, &analysis)?;
    }
    if let Some(path) = &args.export_series {
        crate::io::series::write_series_json(path, &analysis, config)?;
    }

    Ok(())
}

/// Sheet from `--sheet`, then `--obs` values, then `--unknown`.
pub fn build_sheet(args: &AnalyzeArgs, config: &ExperimentConfig) -> Result<SheetInput, AppError> {
    let mut sheet = match &args.sheet {
        Some(path) => crate::io::ingest::load_sheet(path, config)?.sheet,
        None => SheetInput::blank(config),
    };

    apply_obs_specs(&mut sheet, &args.obs)?;

    if let Some((dis, app)) = args.unknown {
        sheet.unknown = UnknownSample::new(dis, app);
    }
    Ok(sheet)
}

/// Place inline observations into the first rows that have no temperatures yet.
pub fn apply_obs_specs(sheet: &mut SheetInput, specs: &[ObsSpec]) -> Result<(), AppError> {
    let mut free = sheet
        .observations
        .iter()
        .enumerate()
        .filter(|(_, o)| o.disappearance_temp.is_none() && o.appearance_temp.is_none())
        .map(|(idx, _)| idx)
        .collect::<Vec<_>>()
        .into_iter();

    for spec in specs {
        let idx = free.next().ok_or_else(|| {
            AppError::input(format!(
                "Too many observations: the form holds {} rows.",
                sheet.observations.len()
            ))
        })?;
        let obs = &mut sheet.observations[idx];
        if let Some(water) = spec.water_ml {
            obs.water_volume_ml = water;
        }
        obs.disappearance_temp = Some(spec.disappearance_temp);
        obs.appearance_temp = Some(spec.appearance_temp);
    }
    Ok(())
}

fn handle_plot(args: PlotArgs) -> Result<(), AppError> {
    let file = crate::io::series::read_series_json(&args.series)?;
    print!("{}", plot_series_file(&file, args.width, args.height)?);
    Ok(())
}

/// Plot plus result lines for a saved series. No points is exit code 3.
pub fn plot_series_file(file: &SeriesFile, width: usize, height: usize) -> Result<String, AppError> {
    let plot = crate::plot::render_ascii_plot(&file.plot_series(), width, height)
        .ok_or_else(|| AppError::new(3, "Series file has no points to plot."))?;

    let mut out = format!("{plot}\n");
    if let Some(cp) = file.critical {
        out.push_str(&format!("Critical Solution Temperature = {:.2} °C\n", cp.temperature));
        out.push_str(&format!("Critical Solution Composition = {:.1} % Phenol\n", cp.composition));
    }
    if let Some(est) = file.unknown {
        out.push_str(&format!(
            "Estimated % of Phenol in Unknown Sample = {:.1} %\n",
            est.phenol_percent
        ));
    }
    Ok(out)
}

fn handle_demo(args: DemoArgs, config: &ExperimentConfig) -> Result<(), AppError> {
    let demo = DemoConfig {
        seed: args.seed,
        noise_sd: args.noise,
        hysteresis: args.hysteresis,
    };
    let sheet = generate_sheet(config, &demo)?;

    match &args.out {
        Some(path) => crate::io::export::write_sheet_csv(path, &sheet),
        None => {
            let stdout = std::io::stdout();
            let mut lock = stdout.lock();
            crate::io::export::write_sheet(&mut lock, &sheet)?;
            lock.flush()
                .map_err(|e| AppError::new(4, format!("Failed to flush stdout: {e}")))
        }
    }
}

fn handle_config(config: &ExperimentConfig) -> Result<(), AppError> {
    print!("{}", crate::config::to_toml(config)?);
    Ok(())
}

fn handle_tui(args: TuiArgs, config: &ExperimentConfig) -> Result<(), AppError> {
    let sheet = match &args.sheet {
        Some(path) => crate::io::ingest::load_sheet(path, config)?.sheet,
        None => SheetInput::blank(config),
    };
    crate::tui::run(sheet, config.clone(), args.export_series)
}

/// Rewrite argv so `cst` defaults to `cst tui`.
///
/// Rules:
/// - `cst`                          -> `cst tui`
/// - `cst --sheet x.csv`            -> `cst tui --sheet x.csv`
/// - `cst --export-series demo`     -> `cst tui --export-series demo` (flag value, not a subcommand)
/// - `cst -v analyze ...`           -> unchanged (a subcommand is present)
/// - `cst --help/--version/-h`      -> unchanged (show top-level help/version)
fn rewrite_args(mut argv: Vec<String>) -> Vec<String> {
    let Some(arg1) = argv.get(1).cloned() else {
        argv.push("tui".to_string());
        return argv;
    };

    let is_top_level_help_or_version = matches!(arg1.as_str(), "-h" | "--help" | "-V" | "--version");
    if is_top_level_help_or_version {
        return argv;
    }

    let has_subcommand = first_positional(&argv[1..]).is_some_and(|a| SUBCOMMANDS.contains(&a));
    if has_subcommand {
        return argv;
    }

    // Only flags: treat them as "tui flags".
    if arg1.starts_with('-') {
        argv.insert(1, "tui".to_string());
    }
    argv
}

/// First token that is neither a flag nor the value of one.
fn first_positional(args: &[String]) -> Option<&str> {
    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        if VALUE_FLAGS.contains(&arg.as_str()) {
            iter.next();
        } else if !arg.starts_with('-') {
            return Some(arg);
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Observation;

    fn args(v: &[&str]) -> Vec<String> {
        v.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn bare_invocation_runs_tui() {
        assert_eq!(rewrite_args(args(&["cst"])), args(&["cst", "tui"]));
        assert_eq!(
            rewrite_args(args(&["cst", "--sheet", "a.csv"])),
            args(&["cst", "tui", "--sheet", "a.csv"])
        );
    }

    #[test]
    fn explicit_subcommands_are_untouched() {
        assert_eq!(
            rewrite_args(args(&["cst", "-v", "analyze"])),
            args(&["cst", "-v", "analyze"])
        );
        assert_eq!(rewrite_args(args(&["cst", "--help"])), args(&["cst", "--help"]));
        assert_eq!(rewrite_args(args(&["cst", "demo"])), args(&["cst", "demo"]));
        assert_eq!(
            rewrite_args(args(&["cst", "--config", "lab.toml", "analyze"])),
            args(&["cst", "--config", "lab.toml", "analyze"])
        );
    }

    #[test]
    fn flag_values_named_like_subcommands_still_open_tui() {
        assert_eq!(
            rewrite_args(args(&["cst", "--export-series", "demo"])),
            args(&["cst", "tui", "--export-series", "demo"])
        );
        assert_eq!(
            rewrite_args(args(&["cst", "--sheet", "plot", "-v"])),
            args(&["cst", "tui", "--sheet", "plot", "-v"])
        );
    }

    #[test]
    fn inline_obs_fill_free_rows_in_order() {
        let config = ExperimentConfig::default();
        let mut sheet = SheetInput::blank(&config);
        sheet.observations[0] = Observation::new(3.0, 40.0, 39.0);

        let specs = [
            ObsSpec { water_ml: None, disappearance_temp: 50.0, appearance_temp: 49.0 },
            ObsSpec { water_ml: Some(8.0), disappearance_temp: 60.0, appearance_temp: 59.0 },
        ];
        apply_obs_specs(&mut sheet, &specs).unwrap();

        assert_eq!(sheet.observations[0].disappearance_temp, Some(40.0));
        assert_eq!(sheet.observations[1], Observation::new(5.0, 50.0, 49.0));
        assert_eq!(sheet.observations[2], Observation::new(8.0, 60.0, 59.0));
    }

    #[test]
    fn empty_series_file_is_no_data() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.json");
        std::fs::write(
            &path,
            r#"{"tool":"cst","generated":"2026-01-01T00:00:00Z","phenol_volume_ml":5.0,"points":[],"critical":null}"#,
        )
        .unwrap();

        let file = crate::io::series::read_series_json(&path).unwrap();
        let err = plot_series_file(&file, 40, 10).unwrap_err();
        assert_eq!(err.exit_code(), 3);
    }

    #[test]
    fn saved_series_replots_with_results() {
        let config = ExperimentConfig::default();
        let mut sheet = SheetInput::blank(&config);
        sheet.observations[0] = Observation::new(3.0, 44.0, 42.0);
        sheet.observations[1] = Observation::new(5.0, 61.0, 60.0);
        let analysis = pipeline::recompute(&sheet, &config);

        let file = SeriesFile::from_analysis(&analysis, &config);
        let txt = plot_series_file(&file, 40, 10).unwrap();
        assert!(txt.contains("Critical Solution Temperature = 60.50 °C"));
        assert!(!txt.contains("Unknown Sample"));
    }

    #[test]
    fn too_many_inline_obs_is_input_error() {
        let config = ExperimentConfig {
            rows: 1,
            ..ExperimentConfig::default()
        };
        let mut sheet = SheetInput::blank(&config);
        let spec = ObsSpec { water_ml: None, disappearance_temp: 1.0, appearance_temp: 1.0 };
        let err = apply_obs_specs(&mut sheet, &[spec, spec]).unwrap_err();
        assert_eq!(err.exit_code(), 2);
    }
}
