//! CSV export and re-import of scenario tables.
//!
//! Files are plain comma-separated UTF-8 with a header row. The header is
//! always written, even for an empty table, so a downstream reader can tell
//! which scenario a file belongs to. Floats are written in shortest
//! round-trip form, so reading a file back yields the exact same records.

use std::fs::{self, File};
use std::path::Path;

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::domain::{
    DecayDilationRecord, DilationRecord, GravitationalDilationRecord, ScenarioKind, ScenarioTable, SummaryRow,
    VelocityDilationRecord,
};
use crate::error::AppError;

/// Write records to `path`, creating parent directories and overwriting any
/// existing file.
pub fn write_records_csv<R: Serialize>(path: &Path, headers: &[&str], records: &[R]) -> Result<(), AppError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .map_err(|e| AppError::io(format!("Failed to create directory '{}': {e}", parent.display())))?;
    }

    let file = File::create(path)
        .map_err(|e| AppError::io(format!("Failed to create CSV '{}': {e}", path.display())))?;
    let mut writer = csv::WriterBuilder::new().has_headers(false).from_writer(file);

    writer
        .write_record(headers)
        .map_err(|e| AppError::io(format!("Failed to write CSV header to '{}': {e}", path.display())))?;
    for r in records {
        writer
            .serialize(r)
            .map_err(|e| AppError::io(format!("Failed to write CSV row to '{}': {e}", path.display())))?;
    }
    writer
        .flush()
        .map_err(|e| AppError::io(format!("Failed to flush CSV '{}': {e}", path.display())))?;

    Ok(())
}

/// Write one scenario's records with its own header.
pub fn write_table_csv<R: DilationRecord>(path: &Path, records: &[R]) -> Result<(), AppError> {
    write_records_csv(path, R::HEADERS, records)
}

/// Write an assembled table of any scenario.
pub fn write_scenario_csv(path: &Path, table: &ScenarioTable) -> Result<(), AppError> {
    match table {
        ScenarioTable::Velocity(r) => write_table_csv(path, r),
        ScenarioTable::Gravitational(r) => write_table_csv(path, r),
        ScenarioTable::Decay(r) => write_table_csv(path, r),
    }
}

/// Read records back, matching columns by header name.
pub fn read_records_csv<R: DeserializeOwned>(path: &Path) -> Result<Vec<R>, AppError> {
    let mut reader = open_reader(path)?;
    let mut out = Vec::new();
    for (i, row) in reader.deserialize::<R>().enumerate() {
        // Line 1 is the header.
        let row = row.map_err(|e| AppError::io(format!("Invalid CSV row {} in '{}': {e}", i + 2, path.display())))?;
        out.push(row);
    }
    Ok(out)
}

pub fn read_table_csv<R: DilationRecord>(path: &Path) -> Result<Vec<R>, AppError> {
    read_records_csv(path)
}

pub fn read_summary_csv(path: &Path) -> Result<Vec<SummaryRow>, AppError> {
    read_records_csv(path)
}

/// What a CSV file holds, judged from its header row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableFile {
    Scenario(ScenarioKind),
    Summary,
}

/// Identify a table file by its header.
pub fn detect_table(path: &Path) -> Result<TableFile, AppError> {
    let mut reader = open_reader(path)?;
    let headers = reader
        .headers()
        .map_err(|e| AppError::io(format!("Failed to read CSV headers from '{}': {e}", path.display())))?;
    let names: Vec<&str> = headers.iter().collect();
    classify_headers(&names).ok_or_else(|| {
        AppError::io(format!(
            "Unrecognized table '{}' (columns: {}).",
            path.display(),
            names.join(", ")
        ))
    })
}

fn classify_headers(names: &[&str]) -> Option<TableFile> {
    if names == SummaryRow::HEADERS {
        return Some(TableFile::Summary);
    }
    if names == VelocityDilationRecord::HEADERS {
        return Some(TableFile::Scenario(ScenarioKind::Velocity));
    }
    if names == GravitationalDilationRecord::HEADERS {
        return Some(TableFile::Scenario(ScenarioKind::Gravitational));
    }
    if names == DecayDilationRecord::HEADERS {
        return Some(TableFile::Scenario(ScenarioKind::Decay));
    }
    None
}

/// Load any exported file as scenario tables.
///
/// A per-scenario file yields one table; a combined summary is split back into
/// one table per scenario present, in scenario order.
pub fn load_tables(path: &Path) -> Result<Vec<ScenarioTable>, AppError> {
    match detect_table(path)? {
        TableFile::Scenario(ScenarioKind::Velocity) => Ok(vec![ScenarioTable::Velocity(read_table_csv(path)?)]),
        TableFile::Scenario(ScenarioKind::Gravitational) => {
            Ok(vec![ScenarioTable::Gravitational(read_table_csv(path)?)])
        }
        TableFile::Scenario(ScenarioKind::Decay) => Ok(vec![ScenarioTable::Decay(read_table_csv(path)?)]),
        TableFile::Summary => crate::io::combine::split_summary(&read_summary_csv(path)?),
    }
}

/// Columns accepted as the input of a batch evaluation. `radius_rs` is the
/// name older upload files use for the radius ratio.
fn accepted_input_columns(kind: ScenarioKind) -> &'static [&'static str] {
    match kind {
        ScenarioKind::Velocity | ScenarioKind::Decay => &["velocity_fraction"],
        ScenarioKind::Gravitational => &["radius_ratio", "radius_rs"],
    }
}

/// Read the input column for `kind` from a user-supplied CSV.
///
/// Other columns are ignored. A missing column or a cell that is not a number
/// is an `Io` error; domain checks are left to the formulas.
pub fn read_input_column(path: &Path, kind: ScenarioKind) -> Result<Vec<f64>, AppError> {
    let mut reader = open_reader(path)?;
    let accepted = accepted_input_columns(kind);
    let headers = reader
        .headers()
        .map_err(|e| AppError::io(format!("Failed to read CSV headers from '{}': {e}", path.display())))?;
    let Some((col, name)) = headers
        .iter()
        .enumerate()
        .find(|(_, h)| accepted.contains(h))
        .map(|(i, h)| (i, h.to_string()))
    else {
        return Err(AppError::io(format!(
            "'{}' has no {} column for the {} scenario (expected one of: {}).",
            path.display(),
            kind.input_column(),
            kind,
            accepted.join(", ")
        )));
    };

    let mut out = Vec::new();
    for (i, record) in reader.records().enumerate() {
        let line = i + 2;
        let record =
            record.map_err(|e| AppError::io(format!("Invalid CSV row {line} in '{}': {e}", path.display())))?;
        let cell = record.get(col).unwrap_or("");
        let value = cell.parse::<f64>().map_err(|_| {
            AppError::io(format!("Row {line} of '{}': {name}='{cell}' is not a number.", path.display()))
        })?;
        out.push(value);
    }
    Ok(out)
}

fn open_reader(path: &Path) -> Result<csv::Reader<File>, AppError> {
    let file = File::open(path).map_err(|e| AppError::io(format!("Failed to open CSV '{}': {e}", path.display())))?;
    Ok(csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(file))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::sweep::Sweep;
    use crate::table::{decay_table, gravitational_table, velocity_table};

    #[test]
    fn velocity_table_round_trips_exactly() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("v.csv");
        let records = velocity_table(&Sweep::inclusive(0.1, 0.99, 50).unwrap()).unwrap();

        write_table_csv(&path, &records).unwrap();
        let back: Vec<VelocityDilationRecord> = read_table_csv(&path).unwrap();
        assert_eq!(back, records);
    }

    #[test]
    fn header_row_names_each_field() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("g.csv");
        let records = gravitational_table(&Sweep::inclusive(1.01, 10.0, 3).unwrap()).unwrap();
        write_table_csv(&path, &records).unwrap();

        let text = fs::read_to_string(&path).unwrap();
        let mut lines = text.lines();
        assert_eq!(lines.next(), Some("radius_ratio,dilation_factor"));
        assert_eq!(lines.count(), 3);
    }

    #[test]
    fn empty_table_still_has_header() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.csv");
        write_table_csv::<DecayDilationRecord>(&path, &[]).unwrap();
        assert_eq!(
            fs::read_to_string(&path).unwrap().trim_end(),
            "velocity_fraction,lorentz_factor,observed_lifetime"
        );
        assert_eq!(detect_table(&path).unwrap(), TableFile::Scenario(ScenarioKind::Decay));
    }

    #[test]
    fn export_overwrites_and_creates_parents() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("raw").join("d.csv");
        let long = decay_table(&Sweep::inclusive(0.1, 0.9, 20).unwrap(), 2.2e-6).unwrap();
        let short = decay_table(&Sweep::inclusive(0.1, 0.9, 2).unwrap(), 2.2e-6).unwrap();

        write_table_csv(&path, &long).unwrap();
        write_table_csv(&path, &short).unwrap();
        let back: Vec<DecayDilationRecord> = read_table_csv(&path).unwrap();
        assert_eq!(back, short);
    }

    #[test]
    fn load_tables_detects_scenario() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("g.csv");
        let records = gravitational_table(&Sweep::inclusive(1.5, 3.0, 4).unwrap()).unwrap();
        write_table_csv(&path, &records).unwrap();

        let tables = load_tables(&path).unwrap();
        assert_eq!(tables, vec![ScenarioTable::Gravitational(records)]);
    }

    #[test]
    fn unwritable_and_missing_paths_are_io_errors() {
        let dir = tempfile::tempdir().unwrap();
        // A directory cannot be opened as a file for writing.
        let err = write_table_csv::<VelocityDilationRecord>(dir.path(), &[]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Io);

        let err = read_summary_csv(&dir.path().join("missing.csv")).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Io);
    }

    #[test]
    fn input_column_is_found_by_name() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("upload.csv");
        fs::write(&path, "label,velocity_fraction\na, 0.5\nb,0.9\n").unwrap();
        assert_eq!(read_input_column(&path, ScenarioKind::Velocity).unwrap(), vec![0.5, 0.9]);
        assert_eq!(read_input_column(&path, ScenarioKind::Decay).unwrap(), vec![0.5, 0.9]);

        fs::write(&path, "radius_rs\n1.5\n3\n").unwrap();
        assert_eq!(read_input_column(&path, ScenarioKind::Gravitational).unwrap(), vec![1.5, 3.0]);
    }

    #[test]
    fn missing_or_malformed_input_column_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("upload.csv");
        fs::write(&path, "radius_rs\n1.5\n").unwrap();
        let err = read_input_column(&path, ScenarioKind::Velocity).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Io);
        assert!(err.message().contains("velocity_fraction"));

        fs::write(&path, "velocity_fraction\n0.5\nfast\n").unwrap();
        let err = read_input_column(&path, ScenarioKind::Velocity).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Io);
        assert!(err.message().contains("Row 3"));
    }

    #[test]
    fn unknown_header_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("other.csv");
        fs::write(&path, "a,b\n1,2\n").unwrap();
        assert_eq!(detect_table(&path).unwrap_err().kind(), ErrorKind::Io);
    }
}
