//! Shared "generate pipeline" logic used by the CLI.
//!
//! Sweep -> evaluate -> assemble (per scenario, in parallel) -> export -> combine.

use std::path::Path;

use crate::domain::{GenerateConfig, ScenarioKind, ScenarioTable};
use crate::error::AppError;
use crate::io::combine::{combine_tables, write_summary_csv};
use crate::io::export::{read_input_column, write_scenario_csv};
use crate::io::manifest::{RunManifest, write_manifest_json};
use crate::report::WrittenFiles;
use crate::physics::check_proper_duration;
use crate::table::{build_tables, evaluate_inputs};

/// All computed outputs of a single `tdil generate` run.
#[derive(Debug, Clone)]
pub struct RunOutput {
    pub tables: Vec<ScenarioTable>,
    pub written: WrittenFiles,
}

/// Execute the full pipeline: build every configured table and write it out.
pub fn run_generate(config: &GenerateConfig) -> Result<RunOutput, AppError> {
    let tables = build_tables(config)?;
    let written = export_tables(config, &tables)?;
    Ok(RunOutput { tables, written })
}

/// Write tables, the combined summary and the manifest as configured.
pub fn export_tables(config: &GenerateConfig, tables: &[ScenarioTable]) -> Result<WrittenFiles, AppError> {
    let mut written = WrittenFiles::default();

    for t in tables {
        let kind = t.kind();
        let path = config.raw_dir.join(kind.file_name());
        write_scenario_csv(&path, t)?;
        tracing::info!(scenario = %kind, rows = t.len(), path = %path.display(), "wrote table");
        written.tables.push((kind, path));
    }

    if let Some(path) = &config.combined_path {
        let rows = combine_tables(tables);
        write_summary_csv(path, &rows)?;
        tracing::info!(rows = rows.len(), path = %path.display(), "wrote combined summary");
        written.combined = Some((path.clone(), rows.len()));
    }

    if let Some(path) = &config.manifest {
        write_manifest_json(path, &RunManifest::from_run(config, tables))?;
        tracing::info!(path = %path.display(), "wrote manifest");
        written.manifest = Some(path.clone());
    }

    Ok(written)
}

/// Evaluate `kind` at every row of a user CSV, optionally writing the result
/// as a scenario table to `out`.
pub fn run_batch_eval(
    kind: ScenarioKind,
    input: &Path,
    out: Option<&Path>,
    proper_lifetime: f64,
) -> Result<ScenarioTable, AppError> {
    check_proper_duration("Proper lifetime", proper_lifetime)?;
    let values = read_input_column(input, kind)?;
    tracing::debug!(scenario = %kind, rows = values.len(), path = %input.display(), "read batch input");

    let table = evaluate_inputs(kind, &values, proper_lifetime)?;
    if let Some(path) = out {
        write_scenario_csv(path, &table)?;
        tracing::info!(scenario = %kind, rows = table.len(), path = %path.display(), "wrote batch table");
    }
    Ok(table)
}
