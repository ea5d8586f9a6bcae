//! Read/write run manifest JSON files.
//!
//! A manifest records what a `generate` run produced:
//! - the sweep behind each table (bounds, count, endpoint)
//! - row counts, output files and observed input/output ranges
//! - the proper lifetime used for the decay scenario

use std::fs::{self, File};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::{GenerateConfig, ScenarioKind, ScenarioTable};
use crate::error::AppError;
use crate::sweep::Sweep;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunManifest {
    pub tool: String,
    pub version: String,
    pub generated_at: DateTime<Utc>,
    pub proper_lifetime: f64,
    pub scenarios: Vec<ManifestEntry>,
    pub combined: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ManifestEntry {
    pub scenario: ScenarioKind,
    pub file: PathBuf,
    pub rows: usize,
    pub sweep: Sweep,
    pub input_range: Option<[f64; 2]>,
    pub output_range: Option<[f64; 2]>,
}

impl RunManifest {
    pub fn from_run(config: &GenerateConfig, tables: &[ScenarioTable]) -> Self {
        let scenarios = tables
            .iter()
            .map(|t| {
                let kind = t.kind();
                let series = t.series();
                ManifestEntry {
                    scenario: kind,
                    file: config.raw_dir.join(kind.file_name()),
                    rows: t.len(),
                    sweep: config.sweep_for(kind),
                    input_range: min_max(series.iter().map(|p| p.0)),
                    output_range: min_max(series.iter().map(|p| p.1)),
                }
            })
            .collect();

        Self {
            tool: "tdil".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            generated_at: Utc::now(),
            proper_lifetime: config.proper_lifetime,
            scenarios,
            combined: config.combined_path.clone(),
        }
    }
}

/// Write a manifest JSON file.
pub fn write_manifest_json(path: &Path, manifest: &RunManifest) -> Result<(), AppError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .map_err(|e| AppError::io(format!("Failed to create directory '{}': {e}", parent.display())))?;
    }
    let file = File::create(path)
        .map_err(|e| AppError::io(format!("Failed to create manifest JSON '{}': {e}", path.display())))?;

    serde_json::to_writer_pretty(file, manifest)
        .map_err(|e| AppError::io(format!("Failed to write manifest JSON: {e}")))?;

    Ok(())
}

/// Read a manifest JSON file.
pub fn read_manifest_json(path: &Path) -> Result<RunManifest, AppError> {
    let file = File::open(path)
        .map_err(|e| AppError::io(format!("Failed to open manifest JSON '{}': {e}", path.display())))?;
    let manifest: RunManifest =
        serde_json::from_reader(file).map_err(|e| AppError::io(format!("Invalid manifest JSON: {e}")))?;
    Ok(manifest)
}

fn min_max(values: impl Iterator<Item = f64>) -> Option<[f64; 2]> {
    let mut lo = f64::INFINITY;
    let mut hi = f64::NEG_INFINITY;
    for v in values {
        lo = lo.min(v);
        hi = hi.max(v);
    }
    if lo.is_finite() && hi.is_finite() { Some([lo, hi]) } else { None }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::physics::MUON_PROPER_LIFETIME;
    use crate::table::velocity_table;

    #[test]
    fn manifest_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let sweep = Sweep::inclusive(0.1, 0.99, 10).unwrap();
        let config = GenerateConfig {
            raw_dir: dir.path().join("raw"),
            combined_path: None,
            scenarios: vec![ScenarioKind::Velocity],
            velocity_sweep: sweep,
            gravity_sweep: Sweep::inclusive(1.01, 10.0, 2).unwrap(),
            decay_sweep: Sweep::inclusive(0.1, 0.999, 2).unwrap(),
            proper_lifetime: MUON_PROPER_LIFETIME,
            plot: false,
            plot_width: 80,
            plot_height: 20,
            manifest: None,
        };
        let tables = vec![ScenarioTable::Velocity(velocity_table(&sweep).unwrap())];
        let manifest = RunManifest::from_run(&config, &tables);

        assert_eq!(manifest.scenarios[0].rows, 10);
        assert_eq!(manifest.scenarios[0].input_range, Some([0.1, 0.99]));

        let path = dir.path().join("manifest.json");
        write_manifest_json(&path, &manifest).unwrap();
        assert_eq!(read_manifest_json(&path).unwrap(), manifest);
    }

    #[test]
    fn min_max_of_nothing_is_none() {
        assert_eq!(min_max(std::iter::empty()), None);
        assert_eq!(min_max([3.0, 1.0, 2.0].into_iter()), Some([1.0, 3.0]));
    }
}
