//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - loads `.env` and parses CLI arguments
//! - sets up logging
//! - resolves flags into a validated `GenerateConfig`
//! - runs the pipeline and prints reports/plots

use std::path::{Path, PathBuf};

use clap::Parser;

use crate::cli::{CombineArgs, Command, DashboardArgs, EvalArgs, GenerateArgs, PlotArgs};
use crate::domain::{GenerateConfig, ScenarioKind};
use crate::error::AppError;
use crate::logging::{LogTarget, init_logging};
use crate::physics::check_proper_duration;
use crate::sweep::Sweep;

pub mod pipeline;

/// File name of the combined summary inside `<data>/processed`.
pub const COMBINED_FILE_NAME: &str = "combined_time_dilation_summary.csv";

/// Entry point for the `tdil` binary.
pub fn run() -> Result<(), AppError> {
    // `TDIL_DATA_DIR` / `RUST_LOG` may come from a local `.env`.
    dotenvy::dotenv().ok();

    let argv = rewrite_args(std::env::args().collect());
    let cli = crate::cli::Cli::parse_from(argv);

    // The dashboard owns the terminal (raw mode + alternate screen), so log
    // lines written to stderr would corrupt it. Log to a file or not at all.
    let target = match &cli.command {
        Command::Dashboard(args) => args.log_file.as_deref().map_or(LogTarget::Off, LogTarget::File),
        _ => LogTarget::Stderr,
    };
    init_logging(&cli.log_level, target)?;

    match cli.command {
        Command::Generate(args) => handle_generate(args),
        Command::Combine(args) => handle_combine(args),
        Command::Eval(args) => handle_eval(args),
        Command::Plot(args) => handle_plot(args),
        Command::Dashboard(args) => handle_dashboard(args),
    }
}

fn handle_generate(args: GenerateArgs) -> Result<(), AppError> {
    let config = generate_config_from_args(&args)?;
    let run = pipeline::run_generate(&config)?;

    println!("{}", crate::report::format_run_summary(&run.tables, &run.written));

    if config.plot {
        for t in &run.tables {
            println!("{}", crate::report::format_table_preview(t, 5));
            println!("{}", crate::plot::render_table_plot(t, config.plot_width, config.plot_height));
        }
    }

    Ok(())
}

fn handle_combine(args: CombineArgs) -> Result<(), AppError> {
    let raw_dir = args.data_dir.join("raw");
    let out = args.out.unwrap_or_else(|| default_combined_path(&args.data_dir));
    let rows = crate::io::combine::combine_files(&raw_dir, &out)?;
    tracing::info!(rows, path = %out.display(), "wrote combined summary");
    println!("Combined summary saved to {} ({rows} rows)", out.display());
    Ok(())
}

fn handle_eval(args: EvalArgs) -> Result<(), AppError> {
    if let Some(input) = &args.input {
        let table = pipeline::run_batch_eval(args.scenario, input, args.out.as_deref(), args.proper_lifetime)?;
        match &args.out {
            Some(path) => println!("{} rows saved to {}", table.len(), path.display()),
            None => print!("{}", crate::report::format_table_preview(&table, table.len())),
        }
        return Ok(());
    }

    // clap enforces `value` whenever `--input` is absent.
    let Some(value) = args.value else {
        return Err(AppError::invalid_range("eval needs a value or --input."));
    };
    let opts = crate::report::PointOptions {
        proper_time: args.proper_time,
        proper_lifetime: args.proper_lifetime,
        solar_masses: args.solar_masses,
    };
    print!("{}", crate::report::format_point(args.scenario, value, &opts)?);
    Ok(())
}

fn handle_plot(args: PlotArgs) -> Result<(), AppError> {
    let tables = crate::io::export::load_tables(&args.input)?;
    if tables.is_empty() {
        return Err(AppError::render(format!("'{}' holds no rows to plot.", args.input.display())));
    }

    match &args.svg {
        Some(path) => {
            // `--width/--height` are shared with the ASCII mode, so they are
            // given in terminal cells; one cell maps to 10 px.
            let size = crate::plot::pixel_size(args.width, args.height, 10)?;
            crate::plot::write_svg_chart(path, &tables, size)?;
            tracing::info!(path = %path.display(), charts = tables.len(), "wrote svg");
            println!("Chart saved to {}", path.display());
        }
        None => {
            for t in &tables {
                println!("{}", crate::plot::render_table_plot(t, args.width, args.height));
            }
        }
    }
    Ok(())
}

fn handle_dashboard(args: DashboardArgs) -> Result<(), AppError> {
    let path = args.summary.unwrap_or_else(|| default_combined_path(&args.data_dir));
    crate::tui::run(&path)
}

pub fn default_combined_path(data_dir: &Path) -> PathBuf {
    data_dir.join("processed").join(COMBINED_FILE_NAME)
}

/// Resolve generate flags into a validated configuration.
///
/// Sweep bounds are checked here, before any table is built. Bounds that touch
/// `v = 1` or `r = 1` are pulled back by `SINGULARITY_EPSILON`.
pub fn generate_config_from_args(args: &GenerateArgs) -> Result<GenerateConfig, AppError> {
    // Checked even when the decay scenario is not selected, so a bad flag is
    // never silently ignored.
    check_proper_duration("Proper lifetime", args.proper_lifetime)?;

    let scenarios = if args.scenarios.is_empty() {
        ScenarioKind::ALL.to_vec()
    } else {
        // Pipeline order, duplicates dropped.
        ScenarioKind::ALL
            .into_iter()
            .filter(|k| args.scenarios.contains(k))
            .collect()
    };

    Ok(GenerateConfig {
        raw_dir: args.data_dir.join("raw"),
        combined_path: (!args.no_combine).then(|| default_combined_path(&args.data_dir)),
        scenarios,
        velocity_sweep: Sweep::below_singularity(args.velocity_min, args.velocity_max, 1.0, args.velocity_steps)?,
        gravity_sweep: Sweep::above_singularity(args.radius_min, args.radius_max, 1.0, args.gravity_steps)?,
        decay_sweep: Sweep::below_singularity(args.decay_min, args.decay_max, 1.0, args.decay_steps)?,
        proper_lifetime: args.proper_lifetime,
        plot: args.plot,
        plot_width: args.width,
        plot_height: args.height,
        manifest: args.manifest.clone(),
    })
}

/// Rewrite argv so `tdil` defaults to `tdil generate`.
///
/// Rules:
/// - `tdil`                      -> `tdil generate`
/// - `tdil --plot ...`           -> `tdil generate --plot ...`
/// - `tdil --help/--version/-h`  -> unchanged (show top-level help/version)
fn rewrite_args(mut argv: Vec<String>) -> Vec<String> {
    let Some(arg1) = argv.get(1).cloned() else {
        argv.push("generate".to_string());
        return argv;
    };

    let is_top_level_help_or_version = matches!(arg1.as_str(), "-h" | "--help" | "-V" | "--version" | "help");
    if is_top_level_help_or_version {
        return argv;
    }

    let is_subcommand = matches!(arg1.as_str(), "generate" | "combine" | "eval" | "plot" | "dashboard");
    if is_subcommand {
        return argv;
    }

    // If the first token is a flag, treat it as "generate flags". A bare
    // positional stays put so clap reports it as an unknown subcommand.
    if arg1.starts_with('-') {
        argv.insert(1, "generate".to_string());
        return argv;
    }

    // Otherwise, leave as-is.
    argv
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::Cli;
    use crate::error::ErrorKind;

    fn argv(args: &[&str]) -> Vec<String> {
        args.iter().map(|s| s.to_string()).collect()
    }

    fn parse_generate(args: &[&str]) -> GenerateArgs {
        match Cli::parse_from(rewrite_args(argv(args))).command {
            Command::Generate(a) => a,
            other => panic!("expected generate, got {other:?}"),
        }
    }

    #[test]
    fn bare_invocation_defaults_to_generate() {
        assert_eq!(rewrite_args(argv(&["tdil"])), argv(&["tdil", "generate"]));
        assert_eq!(
            rewrite_args(argv(&["tdil", "--plot"])),
            argv(&["tdil", "generate", "--plot"])
        );
        assert_eq!(rewrite_args(argv(&["tdil", "--help"])), argv(&["tdil", "--help"]));
        assert_eq!(
            rewrite_args(argv(&["tdil", "eval", "velocity", "0.5"])),
            argv(&["tdil", "eval", "velocity", "0.5"])
        );
    }

    #[test]
    fn defaults_match_reference_datasets() {
        let args = parse_generate(&["tdil", "--data-dir", "out"]);
        let cfg = generate_config_from_args(&args).unwrap();
        assert_eq!(cfg.scenarios, ScenarioKind::ALL.to_vec());
        assert_eq!(cfg.velocity_sweep.count(), 50);
        assert_eq!(cfg.gravity_sweep.count(), 50_000);
        assert_eq!(cfg.decay_sweep.stop(), 0.999);
        assert_eq!(cfg.raw_dir, PathBuf::from("out").join("raw"));
        assert_eq!(cfg.combined_path, Some(PathBuf::from("out/processed").join(COMBINED_FILE_NAME)));
    }

    #[test]
    fn scenario_selection_keeps_pipeline_order() {
        let args = parse_generate(&["tdil", "generate", "-s", "decay", "-s", "velocity", "-s", "decay", "--no-combine"]);
        let cfg = generate_config_from_args(&args).unwrap();
        assert_eq!(cfg.scenarios, vec![ScenarioKind::Velocity, ScenarioKind::Decay]);
        assert!(cfg.combined_path.is_none());
    }

    #[test]
    fn bad_sweep_flags_are_invalid_range() {
        let args = parse_generate(&["tdil", "generate", "--velocity-steps", "0"]);
        assert_eq!(generate_config_from_args(&args).unwrap_err().kind(), ErrorKind::InvalidRange);

        let args = parse_generate(&["tdil", "generate", "--radius-min", "12"]);
        assert_eq!(generate_config_from_args(&args).unwrap_err().kind(), ErrorKind::InvalidRange);
    }

    #[test]
    fn proper_lifetime_flag_is_validated_up_front() {
        for bad in ["-1", "0", "NaN", "inf"] {
            let flag = format!("--proper-lifetime={bad}");
            let args = parse_generate(&["tdil", "generate", "-s", "velocity", &flag]);
            let err = generate_config_from_args(&args).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::Domain, "{bad}");
        }
        let args = parse_generate(&["tdil", "generate", "--proper-lifetime", "1e-6"]);
        assert_eq!(generate_config_from_args(&args).unwrap().proper_lifetime, 1e-6);
    }

    #[test]
    fn eval_takes_a_value_or_an_input_file() {
        let cli = Cli::try_parse_from(argv(&["tdil", "eval", "velocity", "--input", "in.csv", "--out", "o.csv"])).unwrap();
        let Command::Eval(args) = cli.command else {
            panic!("expected eval");
        };
        assert_eq!(args.input, Some(PathBuf::from("in.csv")));
        assert!(args.value.is_none());

        let cli = Cli::try_parse_from(argv(&["tdil", "eval", "gravitational", "2.5"])).unwrap();
        let Command::Eval(args) = cli.command else {
            panic!("expected eval");
        };
        assert_eq!(args.value, Some(2.5));

        assert!(Cli::try_parse_from(argv(&["tdil", "eval", "velocity"])).is_err());
        assert!(Cli::try_parse_from(argv(&["tdil", "eval", "velocity", "0.5", "--input", "in.csv"])).is_err());
        assert!(Cli::try_parse_from(argv(&["tdil", "eval", "velocity", "0.5", "--out", "o.csv"])).is_err());
    }

    #[test]
    fn singular_bounds_are_pulled_inside_the_domain() {
        let args = parse_generate(&["tdil", "generate", "--velocity-max", "1", "--radius-min", "1"]);
        let cfg = generate_config_from_args(&args).unwrap();
        assert!(cfg.velocity_sweep.stop() < 1.0);
        assert!(cfg.gravity_sweep.start() > 1.0);
    }
}
