//! Analysis modules.
//!
//! The pipeline runs load, clean, filter, group, compare. Profiling
//! functions describe the dataset as a whole.

pub mod aggregator;
pub mod cleaner;
pub mod compare;
pub mod profile;

pub use aggregator::*;
pub use cleaner::*;
pub use compare::*;
pub use profile::*;
