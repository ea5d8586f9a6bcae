//! `time-dilation` library crate.
//!
//! The binary (`tdil`) is a thin wrapper around this library so that:
//!
//! - the formulas and table assembly are testable without spawning processes
//! - generated tables can be reused from notebooks or other tools
//! - code stays easy to navigate as the project grows

pub mod app;
pub mod cli;
pub mod domain;
pub mod error;
pub mod io;
pub mod logging;
pub mod physics;
pub mod plot;
pub mod report;
pub mod sweep;
pub mod table;
pub mod tui;
