//! Input/output helpers.
//!
//! - table CSV export + re-import (`export`)
//! - combined summary union/split (`combine`)
//! - run manifest JSON read/write (`manifest`)

pub mod combine;
pub mod export;
pub mod manifest;

pub use combine::*;
pub use export::*;
pub use manifest::*;
