//! Input data sources other than files: simulated lab sheets.

pub mod sample;

pub use sample::{DemoConfig, generate_sheet};
