//! Reporting utilities: run summaries, table previews and point evaluations.

pub mod format;

pub use format::*;
