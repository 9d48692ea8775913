//! Critical path analysis.
//!
//! Computes minimum task durations, longest-path distances through the
//! dependency graph and the priority order the leveling scheduler consumes.

mod calculation;
mod types;

pub use calculation::analyze;
pub use types::CriticalPathAnalysis;
