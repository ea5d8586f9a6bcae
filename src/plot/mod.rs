//! Chart rendering: terminal ASCII plots and SVG files.

pub mod ascii;
pub mod svg;

pub use ascii::*;
pub use svg::*;
