//! Formatted terminal output: run summaries, table previews, point evaluations.
//!
//! We keep formatting code in one place so:
//! - the physics/table code stays clean and testable
//! - output changes are localized (important for snapshot tests)

use std::path::PathBuf;

use crate::domain::{ScenarioKind, ScenarioTable};
use crate::error::AppError;
use crate::physics::{
    C, GAMMA_AT_099C, M_SUN, decay_distance, decay_lifetime, dilated_time, gravitational_dilated_time,
    gravitational_dilation, lorentz_factor, schwarzschild_radius, velocity_from_fraction,
};

/// Where each generated artifact was written.
#[derive(Debug, Clone, Default)]
pub struct WrittenFiles {
    pub tables: Vec<(ScenarioKind, PathBuf)>,
    pub combined: Option<(PathBuf, usize)>,
    pub manifest: Option<PathBuf>,
}

/// Format the run summary (one line per table + reference values).
pub fn format_run_summary(tables: &[ScenarioTable], written: &WrittenFiles) -> String {
    let mut out = String::new();

    out.push_str("=== tdil - Time Dilation Datasets ===\n");
    for t in tables {
        let kind = t.kind();
        let series = t.series();
        let (first, last) = match (series.first(), series.last()) {
            (Some(a), Some(b)) => (*a, *b),
            _ => continue,
        };
        out.push_str(&format!(
            "{:<14} rows={:<7} {}=[{}, {}] {}=[{}, {}]\n",
            kind.tag(),
            t.len(),
            kind.input_column(),
            fmt_value(first.0),
            fmt_value(last.0),
            kind.output_column(),
            fmt_value(first.1),
            fmt_value(last.1),
        ));
    }

    if !written.tables.is_empty() {
        out.push_str("\nWritten:\n");
        for (kind, path) in &written.tables {
            out.push_str(&format!("- {:<14} {}\n", kind.tag(), path.display()));
        }
        if let Some((path, rows)) = &written.combined {
            out.push_str(&format!("- {:<14} {} ({rows} rows)\n", "combined", path.display()));
        }
        if let Some(path) = &written.manifest {
            out.push_str(&format!("- {:<14} {}\n", "manifest", path.display()));
        }
    }

    out.push_str("\nReference points:\n");
    out.push_str(&format!("- gamma at 0.99c       = {GAMMA_AT_099C:.4} (a moving clock runs ~7x slower)\n"));
    if let Ok(km) = decay_distance(crate::physics::MUON_PROPER_LIFETIME, 0.998) {
        out.push_str(&format!("- muon range at 0.998c = {:.2} km\n", km / 1000.0));
    }
    if let (Ok(near), Ok(far)) = (gravitational_dilation(1.1), gravitational_dilation(10.0)) {
        out.push_str(&format!("- dilation at 1.1 Rs   = {near:.4} (vs {far:.4} at 10 Rs)\n"));
    }

    out
}

/// Format the first `n` rows of a table.
pub fn format_table_preview(table: &ScenarioTable, n: usize) -> String {
    let headers = table.headers();
    let mut out = String::new();
    out.push_str(&format!("{} ({} rows)\n", table.kind().display_name(), table.len()));

    let header_line: Vec<String> = headers.iter().map(|h| format!("{h:>20}")).collect();
    out.push_str(header_line.join(" ").trim_end());
    out.push('\n');
    let rule: Vec<String> = headers.iter().map(|_| format!("{:->20}", "")).collect();
    out.push_str(&rule.join(" "));
    out.push('\n');

    for row in table.rows().into_iter().take(n) {
        let cells: Vec<String> = row.iter().map(|v| format!("{:>20}", fmt_value(*v))).collect();
        out.push_str(&cells.join(" "));
        out.push('\n');
    }
    out
}

/// Options for a single-point evaluation.
#[derive(Debug, Clone, Copy)]
pub struct PointOptions {
    /// Proper time (s) for the clock scenarios.
    pub proper_time: f64,
    /// Rest-frame lifetime (s) for the decay scenario.
    pub proper_lifetime: f64,
    /// Central mass in solar masses (gravitational scenario).
    pub solar_masses: f64,
}

/// Evaluate one scenario at one input value and format every derived quantity.
pub fn format_point(kind: ScenarioKind, value: f64, opts: &PointOptions) -> Result<String, AppError> {
    let mut out = String::new();
    out.push_str(&format!("{}\n", kind.display_name()));

    match kind {
        ScenarioKind::Velocity => {
            let gamma = lorentz_factor(value)?;
            let dilated = dilated_time(opts.proper_time, value)?;
            out.push_str(&format!("velocity_fraction   : {value}\n"));
            out.push_str(&format!("velocity            : {} m/s\n", fmt_value(velocity_from_fraction(value))));
            out.push_str(&format!("lorentz_factor      : {gamma:.6}\n"));
            out.push_str(&format!("proper_time         : {} s\n", fmt_value(opts.proper_time)));
            out.push_str(&format!("dilated_time        : {} s\n", fmt_value(dilated)));
            out.push_str(&format!("time_gained         : {} s\n", fmt_value(dilated - opts.proper_time)));
        }
        ScenarioKind::Gravitational => {
            let factor = gravitational_dilation(value)?;
            let rs = schwarzschild_radius(opts.solar_masses * M_SUN)?;
            let far = gravitational_dilated_time(opts.proper_time, value)?;
            out.push_str(&format!("radius_ratio        : {value}\n"));
            out.push_str(&format!("schwarzschild_radius: {} m ({} M_sun)\n", fmt_value(rs), opts.solar_masses));
            out.push_str(&format!("radius              : {} m\n", fmt_value(value * rs)));
            out.push_str(&format!("dilation_factor     : {factor:.6}\n"));
            out.push_str(&format!("proper_time         : {} s\n", fmt_value(opts.proper_time)));
            out.push_str(&format!("far_observer_time   : {} s\n", fmt_value(far)));
        }
        ScenarioKind::Decay => {
            let gamma = lorentz_factor(value)?;
            let lifetime = decay_lifetime(opts.proper_lifetime, value)?;
            let distance = decay_distance(opts.proper_lifetime, value)?;
            out.push_str(&format!("velocity_fraction   : {value}\n"));
            out.push_str(&format!("lorentz_factor      : {gamma:.6}\n"));
            out.push_str(&format!("proper_lifetime     : {} s\n", fmt_value(opts.proper_lifetime)));
            out.push_str(&format!("observed_lifetime   : {} s\n", fmt_value(lifetime)));
            out.push_str(&format!(
                "decay_distance      : {} m ({:.3} km; {:.3} km without dilation)\n",
                fmt_value(distance),
                distance / 1000.0,
                value * C * opts.proper_lifetime / 1000.0
            ));
        }
    }

    Ok(out)
}

/// Compact numeric formatting: fixed-point for ordinary magnitudes, scientific
/// for very small or very large values.
pub fn fmt_value(v: f64) -> String {
    let a = v.abs();
    if v != 0.0 && (a < 1e-3 || a >= 1e6) {
        format!("{v:.4e}")
    } else {
        format!("{v:.4}")
    }
}
