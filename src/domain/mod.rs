//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - form input (`Observation`, `UnknownSample`, `SheetInput`)
//! - derived outputs (`DerivedRow`, `CriticalPoint`, `UnknownEstimate`, `PlotSeries`)
//! - experiment parameters (`ExperimentConfig`)

pub mod types;

pub use types::*;
