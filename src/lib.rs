//! `cst-estimator` library crate.
//!
//! The binary (`cst`) is a thin wrapper around this library so that:
//!
//! - the calculation pipeline is testable without spawning processes
//! - the form, CLI and file front ends share one recompute path

pub mod app;
pub mod cli;
pub mod config;
pub mod data;
pub mod domain;
pub mod error;
pub mod io;
pub mod logging;
pub mod math;
pub mod plot;
pub mod report;
pub mod tui;
