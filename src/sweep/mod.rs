//! Parameter sweeps.
//!
//! A `Sweep` is a description of `count` evenly spaced values between two
//! bounds. It is `Copy`, holds no buffer, and hands out a fresh iterator on
//! every `iter()` call, so the same sweep can be walked any number of times.
//!
//! Two spacings are supported:
//! - half-open `[start, stop)` (`Sweep::new`), step `(stop - start) / count`
//! - closed `[start, stop]` (`Sweep::inclusive`), step `(stop - start) / (count - 1)`;
//!   the last value is exactly `stop`

use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::physics::SINGULARITY_EPSILON;

/// Largest accepted `count`. Tables hold one record per swept value, so the
/// count also bounds the memory a single table may take.
pub const MAX_SWEEP_COUNT: usize = 10_000_000;

/// Whether the upper bound is part of the sweep.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Endpoint {
    Excluded,
    Included,
}

/// An ordered, evenly spaced sequence of `count` reals.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Sweep {
    start: f64,
    stop: f64,
    count: usize,
    endpoint: Endpoint,
}

impl Sweep {
    /// Half-open sweep over `[start, stop)`.
    pub fn new(start: f64, stop: f64, count: usize) -> Result<Self, AppError> {
        Self::with_endpoint(start, stop, count, Endpoint::Excluded)
    }

    /// Closed sweep over `[start, stop]`.
    pub fn inclusive(start: f64, stop: f64, count: usize) -> Result<Self, AppError> {
        Self::with_endpoint(start, stop, count, Endpoint::Included)
    }

    pub fn with_endpoint(start: f64, stop: f64, count: usize, endpoint: Endpoint) -> Result<Self, AppError> {
        if !(start.is_finite() && stop.is_finite()) {
            return Err(AppError::invalid_range(format!(
                "Invalid sweep range: start={start}, stop={stop} (bounds must be finite)."
            )));
        }
        if start >= stop {
            return Err(AppError::invalid_range(format!(
                "Invalid sweep range: start={start}, stop={stop} (must have start < stop)."
            )));
        }
        if count < 1 {
            return Err(AppError::invalid_range("Sweep count must be >= 1."));
        }
        if count > MAX_SWEEP_COUNT {
            return Err(AppError::invalid_range(format!(
                "Sweep count {count} exceeds the maximum of {MAX_SWEEP_COUNT}."
            )));
        }
        Ok(Self {
            start,
            stop,
            count,
            endpoint,
        })
    }

    /// Closed sweep whose upper bound sits just below a singular point.
    ///
    /// `stop` is pulled down to `singular - SINGULARITY_EPSILON` when it would
    /// otherwise reach the singularity.
    pub fn below_singularity(start: f64, stop: f64, singular: f64, count: usize) -> Result<Self, AppError> {
        let stop = stop.min(singular - SINGULARITY_EPSILON);
        Self::inclusive(start, stop, count)
    }

    /// Closed sweep whose lower bound sits just above a singular point.
    pub fn above_singularity(start: f64, stop: f64, singular: f64, count: usize) -> Result<Self, AppError> {
        let start = start.max(singular + SINGULARITY_EPSILON);
        Self::inclusive(start, stop, count)
    }

    pub fn start(&self) -> f64 {
        self.start
    }

    pub fn stop(&self) -> f64 {
        self.stop
    }

    pub fn count(&self) -> usize {
        self.count
    }

    pub fn endpoint(&self) -> Endpoint {
        self.endpoint
    }

    /// Distance between consecutive values (0 for a single-point closed sweep).
    pub fn step(&self) -> f64 {
        match self.endpoint {
            Endpoint::Excluded => (self.stop - self.start) / self.count as f64,
            Endpoint::Included if self.count > 1 => (self.stop - self.start) / (self.count as f64 - 1.0),
            Endpoint::Included => 0.0,
        }
    }

    /// The `i`-th value. `i` must be `< count`.
    pub fn value_at(&self, i: usize) -> f64 {
        debug_assert!(i < self.count);
        if self.endpoint == Endpoint::Included && self.count > 1 && i == self.count - 1 {
            return self.stop;
        }
        self.start + self.step() * i as f64
    }

    pub fn iter(&self) -> SweepIter {
        SweepIter {
            sweep: *self,
            front: 0,
            back: self.count,
        }
    }
}

impl<'a> IntoIterator for &'a Sweep {
    type Item = f64;
    type IntoIter = SweepIter;

    fn into_iter(self) -> SweepIter {
        self.iter()
    }
}

/// Lazy iterator over a `Sweep`.
#[derive(Debug, Clone)]
pub struct SweepIter {
    sweep: Sweep,
    front: usize,
    back: usize,
}

impl Iterator for SweepIter {
    type Item = f64;

    fn next(&mut self) -> Option<f64> {
        if self.front >= self.back {
            return None;
        }
        let v = self.sweep.value_at(self.front);
        self.front += 1;
        Some(v)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let n = self.back - self.front;
        (n, Some(n))
    }
}

impl DoubleEndedIterator for SweepIter {
    fn next_back(&mut self) -> Option<f64> {
        if self.front >= self.back {
            return None;
        }
        self.back -= 1;
        Some(self.sweep.value_at(self.back))
    }
}

impl ExactSizeIterator for SweepIter {}
