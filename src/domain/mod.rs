//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - the scenario enum (`ScenarioKind`)
//! - per-scenario records (`VelocityDilationRecord`, `GravitationalDilationRecord`, `DecayDilationRecord`)
//! - the combined summary row and the resolved run configuration

pub mod types;

pub use types::*;
