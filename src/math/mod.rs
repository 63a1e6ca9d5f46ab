//! Numerical kernel: per-row derivation and dataset-level selection.

pub mod mixture;
pub mod select;

pub use mixture::*;
pub use select::*;
