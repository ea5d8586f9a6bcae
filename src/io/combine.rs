//! Combined summary: outer union of the scenario tables.
//!
//! Combining is plain concatenation in scenario order. Each row keeps its own
//! columns and gains a `scenario` tag; there is no join, resampling or
//! trimming to a common length.

use std::path::Path;

use crate::domain::{
    DecayDilationRecord, DilationRecord, GravitationalDilationRecord, ScenarioKind, ScenarioTable, SummaryRow,
    VelocityDilationRecord,
};
use crate::error::AppError;
use crate::io::export::{read_table_csv, write_records_csv};

/// Union the given tables into summary rows, in the order given.
pub fn combine_tables(tables: &[ScenarioTable]) -> Vec<SummaryRow> {
    let total = tables.iter().map(ScenarioTable::len).sum();
    let mut out = Vec::with_capacity(total);
    for t in tables {
        out.extend(t.summary_rows());
    }
    out
}

pub fn write_summary_csv(path: &Path, rows: &[SummaryRow]) -> Result<(), AppError> {
    write_records_csv(path, SummaryRow::HEADERS, rows)
}

/// Read the three scenario files from `raw_dir` and write their union to `out`.
///
/// All three files must exist. Returns the number of rows written.
pub fn combine_files(raw_dir: &Path, out: &Path) -> Result<usize, AppError> {
    let mut tables = Vec::with_capacity(ScenarioKind::ALL.len());
    for kind in ScenarioKind::ALL {
        let path = raw_dir.join(kind.file_name());
        let table = match kind {
            ScenarioKind::Velocity => ScenarioTable::Velocity(read_table_csv(&path)?),
            ScenarioKind::Gravitational => ScenarioTable::Gravitational(read_table_csv(&path)?),
            ScenarioKind::Decay => ScenarioTable::Decay(read_table_csv(&path)?),
        };
        tracing::debug!(scenario = %kind, rows = table.len(), path = %path.display(), "loaded table");
        tables.push(table);
    }

    let rows = combine_tables(&tables);
    write_summary_csv(out, &rows)?;
    Ok(rows.len())
}

/// Split summary rows back into per-scenario tables (scenario order; absent
/// scenarios are skipped).
///
/// A row missing one of its scenario's columns is an `Io` error.
pub fn split_summary(rows: &[SummaryRow]) -> Result<Vec<ScenarioTable>, AppError> {
    let mut out = Vec::new();
    for kind in ScenarioKind::ALL {
        let table = match kind {
            ScenarioKind::Velocity => ScenarioTable::Velocity(collect_kind::<VelocityDilationRecord>(rows)?),
            ScenarioKind::Gravitational => {
                ScenarioTable::Gravitational(collect_kind::<GravitationalDilationRecord>(rows)?)
            }
            ScenarioKind::Decay => ScenarioTable::Decay(collect_kind::<DecayDilationRecord>(rows)?),
        };
        if !table.is_empty() {
            out.push(table);
        }
    }
    Ok(out)
}

fn collect_kind<R: DilationRecord>(rows: &[SummaryRow]) -> Result<Vec<R>, AppError> {
    rows.iter()
        .enumerate()
        .filter(|(_, row)| row.scenario == R::SCENARIO)
        .map(|(i, row)| {
            R::from_summary(row).ok_or_else(|| {
                AppError::io(format!(
                    "Summary row {i} ({}) is missing one of: {}.",
                    R::SCENARIO,
                    R::HEADERS.join(", ")
                ))
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::export::{read_summary_csv, write_table_csv};
    use crate::physics::MUON_PROPER_LIFETIME;
    use crate::sweep::Sweep;
    use crate::table::{decay_table, gravitational_table, velocity_table};

    fn tables() -> Vec<ScenarioTable> {
        vec![
            ScenarioTable::Velocity(velocity_table(&Sweep::inclusive(0.1, 0.99, 5).unwrap()).unwrap()),
            ScenarioTable::Gravitational(gravitational_table(&Sweep::inclusive(1.01, 10.0, 3).unwrap()).unwrap()),
            ScenarioTable::Decay(
                decay_table(&Sweep::inclusive(0.1, 0.999, 4).unwrap(), MUON_PROPER_LIFETIME).unwrap(),
            ),
        ]
    }

    #[test]
    fn combine_is_concatenation_in_order() {
        let rows = combine_tables(&tables());
        assert_eq!(rows.len(), 12);
        let tags: Vec<ScenarioKind> = rows.iter().map(|r| r.scenario).collect();
        assert!(tags[..5].iter().all(|&k| k == ScenarioKind::Velocity));
        assert!(tags[5..8].iter().all(|&k| k == ScenarioKind::Gravitational));
        assert!(tags[8..].iter().all(|&k| k == ScenarioKind::Decay));
    }

    #[test]
    fn summary_file_has_scenario_column_and_empty_cells() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("combined.csv");
        write_summary_csv(&path, &combine_tables(&tables())).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        let mut lines = text.lines();
        assert_eq!(
            lines.next(),
            Some("scenario,velocity_fraction,radius_ratio,lorentz_factor,dilated_time_ratio,dilation_factor,observed_lifetime")
        );
        let first = lines.next().unwrap();
        assert!(first.starts_with("velocity,0.1,,"), "got {first}");
        let grav = text.lines().nth(6).unwrap();
        assert!(grav.starts_with("gravitational,,1.01,,,"), "got {grav}");
    }

    #[test]
    fn summary_splits_back_into_tables() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("combined.csv");
        let original = tables();
        write_summary_csv(&path, &combine_tables(&original)).unwrap();

        let rows = read_summary_csv(&path).unwrap();
        assert_eq!(split_summary(&rows).unwrap(), original);
    }

    #[test]
    fn combine_files_reads_raw_directory() {
        let dir = tempfile::tempdir().unwrap();
        for t in tables() {
            let path = dir.path().join(t.kind().file_name());
            match &t {
                ScenarioTable::Velocity(r) => write_table_csv(&path, r).unwrap(),
                ScenarioTable::Gravitational(r) => write_table_csv(&path, r).unwrap(),
                ScenarioTable::Decay(r) => write_table_csv(&path, r).unwrap(),
            }
        }
        let out = dir.path().join("processed").join("combined.csv");
        assert_eq!(combine_files(dir.path(), &out).unwrap(), 12);
        assert_eq!(read_summary_csv(&out).unwrap().len(), 12);
    }

    #[test]
    fn combine_files_requires_all_three() {
        let dir = tempfile::tempdir().unwrap();
        let err = combine_files(dir.path(), &dir.path().join("out.csv")).unwrap_err();
        assert_eq!(err.kind(), crate::error::ErrorKind::Io);
    }

    #[test]
    fn incomplete_summary_row_is_rejected() {
        let mut row = SummaryRow::empty(ScenarioKind::Decay);
        row.velocity_fraction = Some(0.5);
        assert!(split_summary(&[row]).is_err());
    }
}
