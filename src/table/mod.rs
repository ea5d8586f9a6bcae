//! Table assembly: sweep × formula → ordered, validated records.
//!
//! Assembly keeps one record per swept value, in sweep order. Nothing is
//! deduplicated, filtered or aggregated. Validation runs after assembly and
//! rejects tables that break the record invariants (non-finite values, a
//! derived column that decreases along the sweep).

use rayon::prelude::*;

use crate::domain::{
    DecayDilationRecord, DilationRecord, GenerateConfig, GravitationalDilationRecord, ScenarioKind, ScenarioTable,
    VelocityDilationRecord,
};
use crate::error::AppError;
use crate::sweep::Sweep;

/// Evaluate `eval` at every input value (usually a `&Sweep`), stopping at the
/// first error.
pub fn assemble<I, R, F>(inputs: I, mut eval: F) -> Result<Vec<R>, AppError>
where
    I: IntoIterator<Item = f64>,
    F: FnMut(f64) -> Result<R, AppError>,
{
    let inputs = inputs.into_iter();
    let mut out = Vec::with_capacity(inputs.size_hint().0);
    for x in inputs {
        out.push(eval(x)?);
    }
    Ok(out)
}

/// Check record invariants along the sweep.
pub fn validate<R: DilationRecord>(records: &[R]) -> Result<(), AppError> {
    for (i, r) in records.iter().enumerate() {
        if r.values().iter().any(|v| !v.is_finite()) {
            return Err(AppError::domain(format!(
                "Non-finite value in {} table at row {i} (input={}).",
                R::SCENARIO,
                r.input()
            )));
        }
    }
    for (i, w) in records.windows(2).enumerate() {
        if w[1].output() < w[0].output() {
            return Err(AppError::domain(format!(
                "{} decreases along the {} sweep between rows {i} and {} ({} -> {}).",
                R::SCENARIO.output_column(),
                R::SCENARIO,
                i + 1,
                w[0].output(),
                w[1].output()
            )));
        }
    }
    Ok(())
}

pub fn velocity_table(sweep: &Sweep) -> Result<Vec<VelocityDilationRecord>, AppError> {
    let records = assemble(sweep, VelocityDilationRecord::evaluate)?;
    validate(&records)?;
    Ok(records)
}

pub fn gravitational_table(sweep: &Sweep) -> Result<Vec<GravitationalDilationRecord>, AppError> {
    let records = assemble(sweep, GravitationalDilationRecord::evaluate)?;
    validate(&records)?;
    Ok(records)
}

pub fn decay_table(sweep: &Sweep, proper_lifetime: f64) -> Result<Vec<DecayDilationRecord>, AppError> {
    let records = assemble(sweep, |v| DecayDilationRecord::evaluate(v, proper_lifetime))?;
    validate(&records)?;
    Ok(records)
}

/// Evaluate a scenario at arbitrary input values, kept in the given order.
///
/// Inputs need not be sorted, so only the per-row domain checks apply; the
/// error names the offending data row (1-based).
pub fn evaluate_inputs(kind: ScenarioKind, inputs: &[f64], proper_lifetime: f64) -> Result<ScenarioTable, AppError> {
    fn rows<R>(inputs: &[f64], mut eval: impl FnMut(f64) -> Result<R, AppError>) -> Result<Vec<R>, AppError> {
        let mut row = 0usize;
        assemble(inputs.iter().copied(), |x| {
            row += 1;
            eval(x).map_err(|e| AppError::new(e.kind(), format!("Input row {row}: {}", e.message())))
        })
    }

    let table = match kind {
        ScenarioKind::Velocity => ScenarioTable::Velocity(rows(inputs, VelocityDilationRecord::evaluate)?),
        ScenarioKind::Gravitational => {
            ScenarioTable::Gravitational(rows(inputs, GravitationalDilationRecord::evaluate)?)
        }
        ScenarioKind::Decay => {
            ScenarioTable::Decay(rows(inputs, |v| DecayDilationRecord::evaluate(v, proper_lifetime))?)
        }
    };
    Ok(table)
}

/// Build one scenario's table from the run configuration.
pub fn build_table(kind: ScenarioKind, config: &GenerateConfig) -> Result<ScenarioTable, AppError> {
    let sweep = config.sweep_for(kind);
    tracing::debug!(
        scenario = %kind,
        start = sweep.start(),
        stop = sweep.stop(),
        count = sweep.count(),
        "assembling table"
    );
    let table = match kind {
        ScenarioKind::Velocity => ScenarioTable::Velocity(velocity_table(&sweep)?),
        ScenarioKind::Gravitational => ScenarioTable::Gravitational(gravitational_table(&sweep)?),
        ScenarioKind::Decay => ScenarioTable::Decay(decay_table(&sweep, config.proper_lifetime)?),
    };
    Ok(table)
}

/// Build every configured scenario.
///
/// Scenarios share nothing, so they are evaluated in parallel; the result keeps
/// the configured order.
pub fn build_tables(config: &GenerateConfig) -> Result<Vec<ScenarioTable>, AppError> {
    config
        .scenarios
        .par_iter()
        .map(|&kind| build_table(kind, config))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::physics::MUON_PROPER_LIFETIME;
    use std::path::PathBuf;

    fn config(scenarios: Vec<ScenarioKind>) -> GenerateConfig {
        GenerateConfig {
            raw_dir: PathBuf::from("unused"),
            combined_path: None,
            scenarios,
            velocity_sweep: Sweep::inclusive(0.1, 0.99, 10).unwrap(),
            gravity_sweep: Sweep::inclusive(1.01, 10.0, 25).unwrap(),
            decay_sweep: Sweep::inclusive(0.1, 0.999, 40).unwrap(),
            proper_lifetime: MUON_PROPER_LIFETIME,
            plot: false,
            plot_width: 80,
            plot_height: 20,
            manifest: None,
        }
    }

    #[test]
    fn velocity_sweep_of_ten_steps() {
        let sweep = Sweep::inclusive(0.1, 0.99, 10).unwrap();
        let table = velocity_table(&sweep).unwrap();
        assert_eq!(table.len(), 10);
        assert_eq!(table[0].velocity_fraction, 0.1);
        for w in table.windows(2) {
            assert!(w[1].lorentz_factor > w[0].lorentz_factor);
        }
        assert!(table.iter().all(|r| r.dilated_time_ratio >= 1.0));
    }

    #[test]
    fn tables_preserve_sweep_order() {
        let sweep = Sweep::new(1.5, 4.5, 6).unwrap();
        let table = gravitational_table(&sweep).unwrap();
        let inputs: Vec<f64> = table.iter().map(|r| r.radius_ratio).collect();
        let swept: Vec<f64> = sweep.iter().collect();
        assert_eq!(inputs, swept);
        assert!(table.iter().all(|r| r.dilation_factor > 0.0 && r.dilation_factor <= 1.0));
    }

    #[test]
    fn decay_lifetimes_never_shorter_than_proper() {
        let sweep = Sweep::inclusive(0.0, 0.999, 30).unwrap();
        let table = decay_table(&sweep, MUON_PROPER_LIFETIME).unwrap();
        assert_eq!(table[0].observed_lifetime, MUON_PROPER_LIFETIME);
        assert!(table.iter().all(|r| r.observed_lifetime >= MUON_PROPER_LIFETIME));
    }

    #[test]
    fn sweep_touching_a_singularity_is_a_domain_error() {
        let sweep = Sweep::inclusive(0.5, 1.0, 5).unwrap();
        assert_eq!(velocity_table(&sweep).unwrap_err().kind(), ErrorKind::Domain);

        let sweep = Sweep::inclusive(1.0, 2.0, 5).unwrap();
        assert_eq!(gravitational_table(&sweep).unwrap_err().kind(), ErrorKind::Domain);
    }

    #[test]
    fn validate_rejects_decreasing_output() {
        let records = vec![
            VelocityDilationRecord {
                velocity_fraction: 0.1,
                lorentz_factor: 2.0,
                dilated_time_ratio: 2.0,
            },
            VelocityDilationRecord {
                velocity_fraction: 0.2,
                lorentz_factor: 1.5,
                dilated_time_ratio: 1.5,
            },
        ];
        let err = validate(&records).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Domain);
        assert!(err.message().contains("dilated_time_ratio"));
    }

    #[test]
    fn float_adjacent_velocities_assemble() {
        let lo: f64 = 0.300_000_000_000_009;
        let hi = f64::from_bits(lo.to_bits() + 1);
        let table = velocity_table(&Sweep::inclusive(lo, hi, 2).unwrap()).unwrap();
        assert_eq!(table.len(), 2);
        assert!(table[1].dilated_time_ratio >= table[0].dilated_time_ratio);

        let hi = f64::from_bits(lo.to_bits() + 64);
        assert_eq!(velocity_table(&Sweep::inclusive(lo, hi, 65).unwrap()).unwrap().len(), 65);
        assert_eq!(decay_table(&Sweep::inclusive(lo, hi, 65).unwrap(), MUON_PROPER_LIFETIME).unwrap().len(), 65);
    }

    #[test]
    fn evaluate_inputs_keeps_row_order() {
        let table = evaluate_inputs(ScenarioKind::Velocity, &[0.9, 0.0, 0.6], MUON_PROPER_LIFETIME).unwrap();
        let ScenarioTable::Velocity(rows) = table else {
            panic!("expected a velocity table");
        };
        let inputs: Vec<f64> = rows.iter().map(|r| r.velocity_fraction).collect();
        assert_eq!(inputs, vec![0.9, 0.0, 0.6]);
        assert!((rows[2].lorentz_factor - 1.25).abs() < 1e-12);

        let decay = evaluate_inputs(ScenarioKind::Decay, &[0.0], 1.0).unwrap();
        assert_eq!(decay.series(), vec![(0.0, 1.0)]);
    }

    #[test]
    fn evaluate_inputs_reports_out_of_domain_row() {
        let err = evaluate_inputs(ScenarioKind::Gravitational, &[2.0, 5.0, 0.5], MUON_PROPER_LIFETIME).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Domain);
        assert!(err.message().starts_with("Input row 3:"), "{}", err.message());

        let err = evaluate_inputs(ScenarioKind::Velocity, &[1.0], MUON_PROPER_LIFETIME).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Domain);
    }

    #[test]
    fn validate_rejects_non_finite() {
        let records = vec![GravitationalDilationRecord {
            radius_ratio: 2.0,
            dilation_factor: f64::NAN,
        }];
        assert!(validate(&records).is_err());
    }

    #[test]
    fn build_tables_keeps_configured_order() {
        let cfg = config(vec![ScenarioKind::Decay, ScenarioKind::Velocity, ScenarioKind::Gravitational]);
        let tables = build_tables(&cfg).unwrap();
        let kinds: Vec<ScenarioKind> = tables.iter().map(ScenarioTable::kind).collect();
        assert_eq!(kinds, cfg.scenarios);
        assert_eq!(tables[0].len(), 40);
        assert_eq!(tables[1].len(), 10);
        assert_eq!(tables[2].len(), 25);
    }
}
