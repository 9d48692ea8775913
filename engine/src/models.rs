//! Core data types for the planning system.

use chrono::NaiveDate;
use rustc_hash::FxHashSet;
use std::collections::BTreeMap;

/// A unit of work to be planned.
///
/// `effort` is measured in worker-days of serial work and
/// `parallelization_factor` caps how many workers can share the task on a
/// single day. Dependencies are referenced by task name.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Task {
    pub name: String,
    pub description: String,
    pub references: Vec<String>,
    pub point_of_contact: String,
    pub effort: u32,
    pub parallelization_factor: u32,
    pub dependencies: Vec<String>,
}

impl Task {
    pub fn new(name: impl Into<String>, effort: u32, parallelization_factor: u32) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            references: Vec::new(),
            point_of_contact: String::new(),
            effort,
            parallelization_factor,
            dependencies: Vec::new(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_references<I, S>(mut self, references: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.references = references.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_point_of_contact(mut self, point_of_contact: impl Into<String>) -> Self {
        self.point_of_contact = point_of_contact.into();
        self
    }

    pub fn with_dependencies<I, S>(mut self, dependencies: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.dependencies = dependencies.into_iter().map(Into::into).collect();
        self
    }

    /// Dependency names in first-seen order, repeats dropped.
    pub fn unique_dependencies(&self) -> Vec<&str> {
        let mut seen: FxHashSet<&str> = FxHashSet::default();
        self.dependencies
            .iter()
            .map(String::as_str)
            .filter(|name| seen.insert(*name))
            .collect()
    }

    /// Check the attributes the planner relies on.
    ///
    /// Returns a human-readable reason when the task cannot be planned.
    pub fn validate(&self) -> Result<(), String> {
        if self.name.is_empty() {
            return Err("task name must not be empty".to_string());
        }
        if self.effort == 0 {
            return Err("effort must be a positive integer".to_string());
        }
        if self.parallelization_factor == 0 {
            return Err("parallelization factor must be a positive integer".to_string());
        }
        Ok(())
    }

    /// Number of workers this task can use on one day with a team of `team_size`.
    #[inline]
    pub fn max_workers(&self, team_size: u32) -> u32 {
        self.parallelization_factor.min(team_size)
    }

    /// Fastest possible completion in working days, given a team of `team_size`.
    ///
    /// This is `ceil(effort / min(parallelization_factor, team_size))`.
    pub fn optimistic_duration(&self, team_size: u32) -> u32 {
        let workers = self.max_workers(team_size).max(1);
        self.effort.div_ceil(workers)
    }
}

/// A team of interchangeable workers.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Team {
    pub name: String,
    pub size: u32,
}

impl Team {
    pub fn new(name: impl Into<String>, size: u32) -> Self {
        Self {
            name: name.into(),
            size,
        }
    }
}

/// A task that has been placed on the plan.
///
/// Offsets are zero-based working-day indices; `end_offset` is inclusive.
/// `daily_allocation` only holds days on which at least one worker was
/// assigned.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PlannedTask {
    pub task: Task,
    pub start_offset: u32,
    pub end_offset: u32,
    pub daily_allocation: BTreeMap<u32, u32>,
    pub(crate) start_date: NaiveDate,
    pub(crate) end_date: NaiveDate,
    pub(crate) dated_allocation: BTreeMap<NaiveDate, u32>,
}

impl PlannedTask {
    pub fn name(&self) -> &str {
        &self.task.name
    }

    /// Calendar date of the first working day with allocation.
    pub fn start_date(&self) -> NaiveDate {
        self.start_date
    }

    /// Calendar date of the last working day with allocation.
    pub fn end_date(&self) -> NaiveDate {
        self.end_date
    }

    /// Worker allocation keyed by calendar date.
    pub fn dated_allocation(&self) -> &BTreeMap<NaiveDate, u32> {
        &self.dated_allocation
    }

    /// Total worker-days assigned across the task's span.
    pub fn allocated_effort(&self) -> u32 {
        self.daily_allocation.values().sum()
    }

    /// Number of calendar days from start date to end date, inclusive.
    pub fn calendar_span_days(&self) -> i64 {
        (self.end_date - self.start_date).num_days() + 1
    }
}

/// Result of one scheduling run.
///
/// Tasks appear in submission order. `working_dates[offset]` is the calendar
/// date of working-day `offset` for every offset up to the plan's last
/// allocated day.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Plan {
    pub(crate) tasks: Vec<PlannedTask>,
    pub(crate) start_date: NaiveDate,
    pub(crate) team: Team,
    pub(crate) working_dates: Vec<NaiveDate>,
}

impl Plan {
    pub fn tasks(&self) -> &[PlannedTask] {
        &self.tasks
    }

    pub fn start_date(&self) -> NaiveDate {
        self.start_date
    }

    pub fn team(&self) -> &Team {
        &self.team
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Look up a planned task by name.
    pub fn task(&self, name: &str) -> Option<&PlannedTask> {
        self.tasks.iter().find(|t| t.task.name == name)
    }

    /// Working days from offset 0 through the last allocated day.
    pub fn makespan(&self) -> u32 {
        self.tasks
            .iter()
            .map(|t| t.end_offset + 1)
            .max()
            .unwrap_or(0)
    }

    /// Calendar date of a working-day offset inside the plan.
    pub fn date_of(&self, offset: u32) -> Option<NaiveDate> {
        self.working_dates.get(offset as usize).copied()
    }

    /// All working dates covered by the plan, in offset order.
    pub fn working_dates(&self) -> &[NaiveDate] {
        &self.working_dates
    }

    /// Total workers assigned on a working-day offset across all tasks.
    pub fn daily_load(&self, offset: u32) -> u32 {
        self.tasks
            .iter()
            .filter_map(|t| t.daily_allocation.get(&offset))
            .sum()
    }
}
