//! Shared domain types.
//!
//! Records are flat and serializable so the same structs are used:
//!
//! - in memory while assembling tables
//! - as CSV rows on export (field order = column order)
//! - when reading tables back for plotting or the dashboard

use std::fmt;
use std::path::PathBuf;

use clap::ValueEnum;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::physics::{decay_lifetime, gravitational_dilation, lorentz_factor};
use crate::sweep::Sweep;

/// The three physical scenarios.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ScenarioKind {
    /// Special-relativistic dilation of a moving clock.
    Velocity,
    /// Schwarzschild dilation of a clock near a mass.
    Gravitational,
    /// Lab-frame lifetime of a fast unstable particle.
    Decay,
}

impl ScenarioKind {
    /// Fixed pipeline order; also the order of rows in the combined summary.
    pub const ALL: [ScenarioKind; 3] = [
        ScenarioKind::Velocity,
        ScenarioKind::Gravitational,
        ScenarioKind::Decay,
    ];

    /// Value of the `scenario` column in the combined summary.
    pub fn tag(self) -> &'static str {
        match self {
            ScenarioKind::Velocity => "velocity",
            ScenarioKind::Gravitational => "gravitational",
            ScenarioKind::Decay => "decay",
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            ScenarioKind::Velocity => "Special relativity (velocity)",
            ScenarioKind::Gravitational => "General relativity (gravity)",
            ScenarioKind::Decay => "Relativistic particle decay",
        }
    }

    pub fn file_name(self) -> &'static str {
        match self {
            ScenarioKind::Velocity => "time_dilation_high_speed_particles.csv",
            ScenarioKind::Gravitational => "gravitational_time_dilation.csv",
            ScenarioKind::Decay => "particle_decay_time_dilation.csv",
        }
    }

    pub fn input_column(self) -> &'static str {
        match self {
            ScenarioKind::Velocity | ScenarioKind::Decay => "velocity_fraction",
            ScenarioKind::Gravitational => "radius_ratio",
        }
    }

    /// The derived column plotted against the input.
    pub fn output_column(self) -> &'static str {
        match self {
            ScenarioKind::Velocity => "dilated_time_ratio",
            ScenarioKind::Gravitational => "dilation_factor",
            ScenarioKind::Decay => "observed_lifetime",
        }
    }

    pub fn from_tag(tag: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.tag() == tag)
    }
}

impl fmt::Display for ScenarioKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// Behaviour shared by the three record types.
pub trait DilationRecord: Serialize + DeserializeOwned + Clone + fmt::Debug + Send {
    const SCENARIO: ScenarioKind;
    /// CSV header, in field order.
    const HEADERS: &'static [&'static str];

    /// The swept value.
    fn input(&self) -> f64;
    /// The derived value charted against the input.
    fn output(&self) -> f64;
    /// Every numeric field, in header order.
    fn values(&self) -> Vec<f64>;
    fn to_summary(&self) -> SummaryRow;
    /// Inverse of `to_summary`; `None` when the row belongs to another scenario
    /// or lacks a required column.
    fn from_summary(row: &SummaryRow) -> Option<Self>;
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VelocityDilationRecord {
    pub velocity_fraction: f64,
    pub lorentz_factor: f64,
    /// Dilated time per unit of proper time.
    pub dilated_time_ratio: f64,
}

impl VelocityDilationRecord {
    pub fn evaluate(velocity_fraction: f64) -> Result<Self, AppError> {
        let gamma = lorentz_factor(velocity_fraction)?;
        Ok(Self {
            velocity_fraction,
            lorentz_factor: gamma,
            dilated_time_ratio: gamma,
        })
    }
}

impl DilationRecord for VelocityDilationRecord {
    const SCENARIO: ScenarioKind = ScenarioKind::Velocity;
    const HEADERS: &'static [&'static str] = &["velocity_fraction", "lorentz_factor", "dilated_time_ratio"];

    fn input(&self) -> f64 {
        self.velocity_fraction
    }

    fn output(&self) -> f64 {
        self.dilated_time_ratio
    }

    fn values(&self) -> Vec<f64> {
        vec![self.velocity_fraction, self.lorentz_factor, self.dilated_time_ratio]
    }

    fn to_summary(&self) -> SummaryRow {
        SummaryRow {
            velocity_fraction: Some(self.velocity_fraction),
            lorentz_factor: Some(self.lorentz_factor),
            dilated_time_ratio: Some(self.dilated_time_ratio),
            ..SummaryRow::empty(Self::SCENARIO)
        }
    }

    fn from_summary(row: &SummaryRow) -> Option<Self> {
        if row.scenario != Self::SCENARIO {
            return None;
        }
        Some(Self {
            velocity_fraction: row.velocity_fraction?,
            lorentz_factor: row.lorentz_factor?,
            dilated_time_ratio: row.dilated_time_ratio?,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GravitationalDilationRecord {
    /// Distance from the centre in Schwarzschild radii.
    pub radius_ratio: f64,
    pub dilation_factor: f64,
}

impl GravitationalDilationRecord {
    pub fn evaluate(radius_ratio: f64) -> Result<Self, AppError> {
        Ok(Self {
            radius_ratio,
            dilation_factor: gravitational_dilation(radius_ratio)?,
        })
    }
}

impl DilationRecord for GravitationalDilationRecord {
    const SCENARIO: ScenarioKind = ScenarioKind::Gravitational;
    const HEADERS: &'static [&'static str] = &["radius_ratio", "dilation_factor"];

    fn input(&self) -> f64 {
        self.radius_ratio
    }

    fn output(&self) -> f64 {
        self.dilation_factor
    }

    fn values(&self) -> Vec<f64> {
        vec![self.radius_ratio, self.dilation_factor]
    }

    fn to_summary(&self) -> SummaryRow {
        SummaryRow {
            radius_ratio: Some(self.radius_ratio),
            dilation_factor: Some(self.dilation_factor),
            ..SummaryRow::empty(Self::SCENARIO)
        }
    }

    fn from_summary(row: &SummaryRow) -> Option<Self> {
        if row.scenario != Self::SCENARIO {
            return None;
        }
        Some(Self {
            radius_ratio: row.radius_ratio?,
            dilation_factor: row.dilation_factor?,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DecayDilationRecord {
    pub velocity_fraction: f64,
    pub lorentz_factor: f64,
    /// Lab-frame lifetime (s).
    pub observed_lifetime: f64,
}

impl DecayDilationRecord {
    pub fn evaluate(velocity_fraction: f64, proper_lifetime: f64) -> Result<Self, AppError> {
        Ok(Self {
            velocity_fraction,
            lorentz_factor: lorentz_factor(velocity_fraction)?,
            observed_lifetime: decay_lifetime(proper_lifetime, velocity_fraction)?,
        })
    }
}

impl DilationRecord for DecayDilationRecord {
    const SCENARIO: ScenarioKind = ScenarioKind::Decay;
    const HEADERS: &'static [&'static str] = &["velocity_fraction", "lorentz_factor", "observed_lifetime"];

    fn input(&self) -> f64 {
        self.velocity_fraction
    }

    fn output(&self) -> f64 {
        self.observed_lifetime
    }

    fn values(&self) -> Vec<f64> {
        vec![self.velocity_fraction, self.lorentz_factor, self.observed_lifetime]
    }

    fn to_summary(&self) -> SummaryRow {
        SummaryRow {
            velocity_fraction: Some(self.velocity_fraction),
            lorentz_factor: Some(self.lorentz_factor),
            observed_lifetime: Some(self.observed_lifetime),
            ..SummaryRow::empty(Self::SCENARIO)
        }
    }

    fn from_summary(row: &SummaryRow) -> Option<Self> {
        if row.scenario != Self::SCENARIO {
            return None;
        }
        Some(Self {
            velocity_fraction: row.velocity_fraction?,
            lorentz_factor: row.lorentz_factor?,
            observed_lifetime: row.observed_lifetime?,
        })
    }
}

/// One row of the combined summary: the union of every scenario's columns,
/// tagged by scenario. Columns a scenario does not have are left empty.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SummaryRow {
    pub scenario: ScenarioKind,
    pub velocity_fraction: Option<f64>,
    pub radius_ratio: Option<f64>,
    pub lorentz_factor: Option<f64>,
    pub dilated_time_ratio: Option<f64>,
    pub dilation_factor: Option<f64>,
    pub observed_lifetime: Option<f64>,
}

impl SummaryRow {
    pub const HEADERS: &'static [&'static str] = &[
        "scenario",
        "velocity_fraction",
        "radius_ratio",
        "lorentz_factor",
        "dilated_time_ratio",
        "dilation_factor",
        "observed_lifetime",
    ];

    pub fn empty(scenario: ScenarioKind) -> Self {
        Self {
            scenario,
            velocity_fraction: None,
            radius_ratio: None,
            lorentz_factor: None,
            dilated_time_ratio: None,
            dilation_factor: None,
            observed_lifetime: None,
        }
    }
}

/// One scenario's assembled table.
#[derive(Debug, Clone, PartialEq)]
pub enum ScenarioTable {
    Velocity(Vec<VelocityDilationRecord>),
    Gravitational(Vec<GravitationalDilationRecord>),
    Decay(Vec<DecayDilationRecord>),
}

impl ScenarioTable {
    pub fn kind(&self) -> ScenarioKind {
        match self {
            ScenarioTable::Velocity(_) => ScenarioKind::Velocity,
            ScenarioTable::Gravitational(_) => ScenarioKind::Gravitational,
            ScenarioTable::Decay(_) => ScenarioKind::Decay,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            ScenarioTable::Velocity(r) => r.len(),
            ScenarioTable::Gravitational(r) => r.len(),
            ScenarioTable::Decay(r) => r.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// `(input, output)` pairs in sweep order.
    pub fn series(&self) -> Vec<(f64, f64)> {
        fn pairs<R: DilationRecord>(records: &[R]) -> Vec<(f64, f64)> {
            records.iter().map(|r| (r.input(), r.output())).collect()
        }
        match self {
            ScenarioTable::Velocity(r) => pairs(r),
            ScenarioTable::Gravitational(r) => pairs(r),
            ScenarioTable::Decay(r) => pairs(r),
        }
    }

    pub fn headers(&self) -> &'static [&'static str] {
        match self {
            ScenarioTable::Velocity(_) => VelocityDilationRecord::HEADERS,
            ScenarioTable::Gravitational(_) => GravitationalDilationRecord::HEADERS,
            ScenarioTable::Decay(_) => DecayDilationRecord::HEADERS,
        }
    }

    /// Every row as header-ordered values.
    pub fn rows(&self) -> Vec<Vec<f64>> {
        match self {
            ScenarioTable::Velocity(r) => r.iter().map(DilationRecord::values).collect(),
            ScenarioTable::Gravitational(r) => r.iter().map(DilationRecord::values).collect(),
            ScenarioTable::Decay(r) => r.iter().map(DilationRecord::values).collect(),
        }
    }

    pub fn summary_rows(&self) -> Vec<SummaryRow> {
        match self {
            ScenarioTable::Velocity(r) => r.iter().map(DilationRecord::to_summary).collect(),
            ScenarioTable::Gravitational(r) => r.iter().map(DilationRecord::to_summary).collect(),
            ScenarioTable::Decay(r) => r.iter().map(DilationRecord::to_summary).collect(),
        }
    }
}

/// Default sweep settings, taken from the reference datasets.
pub const DEFAULT_VELOCITY_RANGE: (f64, f64) = (0.1, 0.99);
pub const DEFAULT_VELOCITY_STEPS: usize = 50;
pub const DEFAULT_GRAVITY_RANGE: (f64, f64) = (1.01, 10.0);
pub const DEFAULT_GRAVITY_STEPS: usize = 50_000;
pub const DEFAULT_DECAY_RANGE: (f64, f64) = (0.1, 0.999);
pub const DEFAULT_DECAY_STEPS: usize = 50_000;

/// A full generate run's configuration as understood by the pipeline.
///
/// This is derived from CLI flags (plus environment and defaults).
#[derive(Debug, Clone)]
pub struct GenerateConfig {
    /// Directory for the per-scenario tables.
    pub raw_dir: PathBuf,
    /// Combined summary path; `None` skips the combine step.
    pub combined_path: Option<PathBuf>,
    /// Scenarios to run, in pipeline order.
    pub scenarios: Vec<ScenarioKind>,

    pub velocity_sweep: Sweep,
    pub gravity_sweep: Sweep,
    pub decay_sweep: Sweep,

    /// Rest-frame lifetime used by the decay scenario (s).
    pub proper_lifetime: f64,

    pub plot: bool,
    pub plot_width: usize,
    pub plot_height: usize,

    pub manifest: Option<PathBuf>,
}

impl GenerateConfig {
    pub fn sweep_for(&self, kind: ScenarioKind) -> Sweep {
        match kind {
            ScenarioKind::Velocity => self.velocity_sweep,
            ScenarioKind::Gravitational => self.gravity_sweep,
            ScenarioKind::Decay => self.decay_sweep,
        }
    }
}
