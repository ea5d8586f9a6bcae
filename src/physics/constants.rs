//! Physical constants used by the dilation formulas.
//!
//! SI units throughout.

/// Speed of light in vacuum (m/s). Exact by definition of the metre.
pub const C: f64 = 299_792_458.0;

/// Newtonian gravitational constant (m³ kg⁻¹ s⁻²), CODATA 2018.
pub const G: f64 = 6.674_30e-11;

/// Solar mass (kg).
pub const M_SUN: f64 = 1.9885e30;

/// Earth mass (kg).
pub const M_EARTH: f64 = 5.972e24;

/// Proper (rest-frame) mean lifetime of a muon (s).
pub const MUON_PROPER_LIFETIME: f64 = 2.2e-6;

/// Lorentz factor at 0.99c.
///
/// A clock moving at 0.99c runs "about 7 times slower"; this is the precise
/// value that claim rounds.
pub const GAMMA_AT_099C: f64 = 7.088_812_050_083_356;

/// Distance kept between a sweep bound and a formula singularity when a
/// sweep is clamped (velocity fraction 1, radius ratio 1).
pub const SINGULARITY_EPSILON: f64 = 1e-9;
