//! Configuration types for the planner.

/// Configuration for a scheduling run.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SchedulerConfig {
    /// Verbosity level: 0=silent, 1=changes, 2=checks, 3=debug.
    pub verbosity: u8,
    /// Planning horizon in working days (None = unlimited).
    ///
    /// A run that still has unfinished work at this offset fails instead
    /// of producing a plan.
    pub max_days: Option<u32>,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            verbosity: 0,
            max_days: None,
        }
    }
}

impl SchedulerConfig {
    pub fn with_verbosity(mut self, verbosity: u8) -> Self {
        self.verbosity = verbosity;
        self
    }

    pub fn with_max_days(mut self, max_days: u32) -> Self {
        self.max_days = Some(max_days);
        self
    }
}
