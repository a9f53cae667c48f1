//! Report rendering.

pub mod chart;
pub mod generator;

pub use generator::*;
