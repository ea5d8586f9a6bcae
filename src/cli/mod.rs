//! Command-line parsing for the time dilation dataset generator.
//!
//! The goal of this module is to keep **argument parsing** and **command dispatch**
//! separate from the physics/table code.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::domain::{
    DEFAULT_DECAY_RANGE, DEFAULT_DECAY_STEPS, DEFAULT_GRAVITY_RANGE, DEFAULT_GRAVITY_STEPS, DEFAULT_VELOCITY_RANGE,
    DEFAULT_VELOCITY_STEPS, ScenarioKind,
};
use crate::physics::MUON_PROPER_LIFETIME;

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "tdil", version, about = "Time dilation datasets: velocity, gravity and particle decay")]
pub struct Cli {
    /// Log level (trace, debug, info, warn, error). `RUST_LOG` takes precedence.
    #[arg(long, global = true, default_value = "info")]
    pub log_level: String,

    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Sweep each scenario, write its CSV table and the combined summary.
    Generate(GenerateArgs),
    /// Union the three scenario tables already on disk into the combined summary.
    Combine(CombineArgs),
    /// Evaluate one scenario at a single input value or at every row of a CSV.
    Eval(EvalArgs),
    /// Plot an exported table (or the combined summary) as ASCII or SVG.
    Plot(PlotArgs),
    /// Browse the combined summary in an interactive terminal dashboard.
    Dashboard(DashboardArgs),
}

/// Options for dataset generation.
#[derive(Debug, Parser, Clone)]
pub struct GenerateArgs {
    /// Data directory; tables go to `<dir>/raw`, the summary to `<dir>/processed`.
    #[arg(long, env = "TDIL_DATA_DIR", default_value = "data")]
    pub data_dir: PathBuf,

    /// Scenario(s) to generate (repeatable). Defaults to all three.
    #[arg(short = 's', long = "scenario", value_enum)]
    pub scenarios: Vec<ScenarioKind>,

    /// Lowest velocity fraction for the velocity sweep.
    #[arg(long, default_value_t = DEFAULT_VELOCITY_RANGE.0)]
    pub velocity_min: f64,

    /// Highest velocity fraction for the velocity sweep (must stay below 1).
    #[arg(long, default_value_t = DEFAULT_VELOCITY_RANGE.1)]
    pub velocity_max: f64,

    /// Number of points in the velocity sweep.
    #[arg(long, default_value_t = DEFAULT_VELOCITY_STEPS)]
    pub velocity_steps: usize,

    /// Nearest radius, in Schwarzschild radii (must stay above 1).
    #[arg(long, default_value_t = DEFAULT_GRAVITY_RANGE.0)]
    pub radius_min: f64,

    /// Farthest radius, in Schwarzschild radii.
    #[arg(long, default_value_t = DEFAULT_GRAVITY_RANGE.1)]
    pub radius_max: f64,

    /// Number of points in the gravitational sweep.
    #[arg(long, default_value_t = DEFAULT_GRAVITY_STEPS)]
    pub gravity_steps: usize,

    /// Lowest velocity fraction for the decay sweep.
    #[arg(long, default_value_t = DEFAULT_DECAY_RANGE.0)]
    pub decay_min: f64,

    /// Highest velocity fraction for the decay sweep (must stay below 1).
    #[arg(long, default_value_t = DEFAULT_DECAY_RANGE.1)]
    pub decay_max: f64,

    /// Number of points in the decay sweep.
    #[arg(long, default_value_t = DEFAULT_DECAY_STEPS)]
    pub decay_steps: usize,

    /// Rest-frame lifetime of the decaying particle (s). Defaults to the muon.
    #[arg(long, default_value_t = MUON_PROPER_LIFETIME)]
    pub proper_lifetime: f64,

    /// Skip writing the combined summary.
    #[arg(long)]
    pub no_combine: bool,

    /// Print an ASCII plot of each table.
    #[arg(long)]
    pub plot: bool,

    /// Plot width (columns).
    #[arg(long, default_value_t = 80)]
    pub width: usize,

    /// Plot height (rows).
    #[arg(long, default_value_t = 20)]
    pub height: usize,

    /// Write a JSON manifest describing the run.
    #[arg(long, value_name = "JSON")]
    pub manifest: Option<PathBuf>,
}

/// Options for the combine step.
#[derive(Debug, Parser, Clone)]
pub struct CombineArgs {
    /// Data directory holding `raw/` tables.
    #[arg(long, env = "TDIL_DATA_DIR", default_value = "data")]
    pub data_dir: PathBuf,

    /// Output path (default: `<dir>/processed/combined_time_dilation_summary.csv`).
    #[arg(long, value_name = "CSV")]
    pub out: Option<PathBuf>,
}

/// Options for a single-point evaluation.
#[derive(Debug, Parser, Clone)]
pub struct EvalArgs {
    /// Scenario to evaluate.
    #[arg(value_enum)]
    pub scenario: ScenarioKind,

    /// Input value: velocity fraction of c, or radius in Schwarzschild radii.
    #[arg(required_unless_present = "input", conflicts_with = "input")]
    pub value: Option<f64>,

    /// Evaluate every row of this CSV instead of a single value. Reads
    /// `velocity_fraction` (velocity, decay) or `radius_ratio`/`radius_rs`
    /// (gravitational).
    #[arg(long, value_name = "CSV")]
    pub input: Option<PathBuf>,

    /// Write the batch result as a scenario table instead of printing it.
    #[arg(long, value_name = "CSV", requires = "input")]
    pub out: Option<PathBuf>,

    /// Proper time (s) on the moving/near-mass clock.
    #[arg(long, default_value_t = 1.0)]
    pub proper_time: f64,

    /// Rest-frame lifetime of the decaying particle (s).
    #[arg(long, default_value_t = MUON_PROPER_LIFETIME)]
    pub proper_lifetime: f64,

    /// Central mass in solar masses (gravitational scenario).
    #[arg(long, default_value_t = 1.0)]
    pub solar_masses: f64,
}

/// Options for plotting a saved table.
#[derive(Debug, Parser, Clone)]
pub struct PlotArgs {
    /// Scenario table or combined summary CSV produced by `tdil generate`.
    #[arg(long, value_name = "CSV")]
    pub input: PathBuf,

    /// Write an SVG chart here instead of printing ASCII plots.
    #[arg(long, value_name = "SVG")]
    pub svg: Option<PathBuf>,

    /// Plot width (columns for ASCII, pixels / 10 for SVG).
    #[arg(long, default_value_t = 80)]
    pub width: usize,

    /// Plot height (rows for ASCII, pixels / 10 for SVG).
    #[arg(long, default_value_t = 20)]
    pub height: usize,
}

/// Options for the dashboard.
#[derive(Debug, Parser, Clone)]
pub struct DashboardArgs {
    /// Combined summary (or any scenario table) to browse.
    #[arg(long, value_name = "CSV")]
    pub summary: Option<PathBuf>,

    /// Data directory used when `--summary` is not given.
    #[arg(long, env = "TDIL_DATA_DIR", default_value = "data")]
    pub data_dir: PathBuf,

    /// Append logs to this file while the dashboard runs.
    #[arg(long, value_name = "PATH")]
    pub log_file: Option<PathBuf>,
}
