//! Input/output helpers.
//!
//! - observation sheet CSV ingest (`ingest`)
//! - results/sheet CSV exports (`export`)
//! - series JSON read/write (`series`)

pub mod export;
pub mod ingest;
pub mod series;

pub use export::*;
pub use ingest::*;
pub use series::*;
