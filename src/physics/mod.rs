//! Physics: constants and the closed-form dilation formulas.

pub mod constants;
pub mod formulas;

pub use constants::*;
pub use formulas::*;
