//! Closed-form time dilation formulas.
//!
//! All functions are pure and deterministic. Each one is total over its
//! physical domain and returns a `Domain` error outside it (NaN and infinities
//! included).
//!
//! Divergence is physical, not numerical noise: `lorentz_factor(v)` grows
//! without bound as `v → 1` and `gravitational_dilation(r)` falls to zero as
//! `r → 1⁺`. Nothing here clamps or saturates those limits; sweeps keep away
//! from the singular points instead.
//!
//! Numerical notes:
//! - `1 - v²` is evaluated literally. Every step (`v * v`, the subtraction,
//!   `sqrt`, the reciprocal) is a correctly rounded monotone operation, so
//!   `lorentz_factor` never decreases between adjacent floats. The factored
//!   form `(1 - v)(1 + v)` is more precise near 1 but can step down by an
//!   ulp, which table validation would reject.

use crate::error::AppError;
use crate::physics::constants::{C, G};

/// Lorentz factor `γ = 1 / sqrt(1 - v²)` for a velocity given as a fraction of `c`.
///
/// Domain: `0 <= v_fraction < 1`. `lorentz_factor(0.0)` is exactly `1.0`.
pub fn lorentz_factor(v_fraction: f64) -> Result<f64, AppError> {
    check_velocity_fraction(v_fraction)?;
    Ok(1.0 / (1.0 - v_fraction * v_fraction).sqrt())
}

/// Schwarzschild dilation factor `sqrt(1 - 1/r)` at `r` Schwarzschild radii.
///
/// This is the rate of a clock at rest at `r` relative to a clock far away.
/// Domain: `radius_ratio > 1`.
pub fn gravitational_dilation(radius_ratio: f64) -> Result<f64, AppError> {
    if !radius_ratio.is_finite() {
        return Err(AppError::domain(format!(
            "Radius ratio must be finite, got {radius_ratio}."
        )));
    }
    if radius_ratio <= 1.0 {
        return Err(AppError::domain(format!(
            "Radius must be greater than the Schwarzschild radius (ratio > 1), got {radius_ratio}."
        )));
    }
    Ok((1.0 - radius_ratio.recip()).sqrt())
}

/// Lab-frame lifetime of a particle with rest-frame lifetime `proper_lifetime`.
pub fn decay_lifetime(proper_lifetime: f64, v_fraction: f64) -> Result<f64, AppError> {
    check_proper_duration("Proper lifetime", proper_lifetime)?;
    Ok(proper_lifetime * lorentz_factor(v_fraction)?)
}

/// Time elapsed for a stationary observer while `proper_time` passes on a
/// clock moving at `v_fraction`.
pub fn dilated_time(proper_time: f64, v_fraction: f64) -> Result<f64, AppError> {
    check_proper_duration("Proper time", proper_time)?;
    Ok(proper_time * lorentz_factor(v_fraction)?)
}

/// Time elapsed far from the mass while `proper_time` passes on a clock at
/// `radius_ratio` Schwarzschild radii.
pub fn gravitational_dilated_time(proper_time: f64, radius_ratio: f64) -> Result<f64, AppError> {
    check_proper_duration("Proper time", proper_time)?;
    Ok(proper_time / gravitational_dilation(radius_ratio)?)
}

/// Distance (m) covered before decay: `v · c · τ · γ`.
pub fn decay_distance(proper_lifetime: f64, v_fraction: f64) -> Result<f64, AppError> {
    Ok(v_fraction * C * decay_lifetime(proper_lifetime, v_fraction)?)
}

/// Schwarzschild radius `2GM/c²` (m) of a mass in kilograms.
pub fn schwarzschild_radius(mass_kg: f64) -> Result<f64, AppError> {
    if !(mass_kg.is_finite() && mass_kg > 0.0) {
        return Err(AppError::domain(format!(
            "Mass must be finite and > 0 kg, got {mass_kg}."
        )));
    }
    Ok(2.0 * G * mass_kg / (C * C))
}

/// Gravitational dilation at an absolute radius (m) around a body with the
/// given Schwarzschild radius (m).
pub fn gravitational_dilation_at(radius_m: f64, schwarzschild_radius_m: f64) -> Result<f64, AppError> {
    if !(schwarzschild_radius_m.is_finite() && schwarzschild_radius_m > 0.0) {
        return Err(AppError::domain(format!(
            "Schwarzschild radius must be finite and > 0 m, got {schwarzschild_radius_m}."
        )));
    }
    gravitational_dilation(radius_m / schwarzschild_radius_m)
}

/// Low-speed expansion `γ ≈ 1 + v²/2 + 3v⁴/8`.
///
/// Agrees with `lorentz_factor` to `O(v⁶)`; the leading correction is the
/// Newtonian kinetic term.
pub fn lorentz_factor_low_speed(v_fraction: f64) -> f64 {
    let v2 = v_fraction * v_fraction;
    1.0 + v2 / 2.0 + 3.0 * v2 * v2 / 8.0
}

/// Speed in m/s for a fraction of `c`.
pub fn velocity_from_fraction(v_fraction: f64) -> f64 {
    v_fraction * C
}

fn check_velocity_fraction(v_fraction: f64) -> Result<(), AppError> {
    if !v_fraction.is_finite() {
        return Err(AppError::domain(format!(
            "Velocity fraction must be finite, got {v_fraction}."
        )));
    }
    if v_fraction < 0.0 {
        return Err(AppError::domain(format!(
            "Velocity fraction must be non-negative, got {v_fraction}."
        )));
    }
    if v_fraction >= 1.0 {
        return Err(AppError::domain(format!(
            "Velocity must be less than the speed of light (fraction < 1), got {v_fraction}."
        )));
    }
    Ok(())
}

/// Durations (proper time, rest-frame lifetime) must be finite and positive.
pub fn check_proper_duration(what: &str, value: f64) -> Result<(), AppError> {
    if !(value.is_finite() && value > 0.0) {
        return Err(AppError::domain(format!(
            "{what} must be finite and > 0 s, got {value}."
        )));
    }
    Ok(())
}
