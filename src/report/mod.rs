//! Reporting utilities: derived-row tables and result statements.

pub mod format;

pub use format::*;
