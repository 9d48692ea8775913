//! Python bindings, enabled with the `python` feature.

// Allow clippy warning triggered by PyO3 macro expansion
#![allow(clippy::useless_conversion)]

use chrono::NaiveDate;
use pyo3::exceptions::PyValueError;
use pyo3::prelude::*;
use pyo3::types::PyDict;
use std::collections::HashMap;

use crate::calendar::Holidays;
use crate::config::SchedulerConfig;
use crate::models::{Plan, PlannedTask, Task, Team};
use crate::render;
use crate::scheduler::{CriticalPathScheduler, ScheduleError, Scheduler};

fn to_py_err(err: ScheduleError) -> PyErr {
    PyValueError::new_err(err.to_string())
}

/// A task to be planned (PyO3 wrapper).
#[pyclass(name = "Task")]
#[derive(Clone, Debug)]
pub struct PyTask {
    #[pyo3(get, set)]
    pub name: String,
    #[pyo3(get, set)]
    pub effort: i64,
    #[pyo3(get, set)]
    pub parallelization_factor: i64,
    #[pyo3(get, set)]
    pub description: String,
    #[pyo3(get, set)]
    pub references: Vec<String>,
    #[pyo3(get, set)]
    pub point_of_contact: String,
    #[pyo3(get, set)]
    pub dependencies: Vec<String>,
}

#[pymethods]
impl PyTask {
    #[new]
    #[pyo3(signature = (
        name,
        effort,
        parallelization_factor=1,
        description=None,
        references=None,
        point_of_contact=None,
        dependencies=None
    ))]
    fn new(
        name: String,
        effort: i64,
        parallelization_factor: i64,
        description: Option<String>,
        references: Option<Vec<String>>,
        point_of_contact: Option<String>,
        dependencies: Option<Vec<String>>,
    ) -> PyResult<Self> {
        let task = Self {
            name,
            effort,
            parallelization_factor,
            description: description.unwrap_or_default(),
            references: references.unwrap_or_default(),
            point_of_contact: point_of_contact.unwrap_or_default(),
            dependencies: dependencies.unwrap_or_default(),
        };
        task.to_task().map_err(PyValueError::new_err)?;
        Ok(task)
    }

    fn optimistic_duration(&self, team_size: u32) -> PyResult<u32> {
        let task = self.to_task().map_err(PyValueError::new_err)?;
        Ok(task.optimistic_duration(team_size))
    }

    fn __repr__(&self) -> String {
        format!(
            "Task(name={:?}, effort={}, parallelization_factor={}, deps={:?})",
            self.name, self.effort, self.parallelization_factor, self.dependencies
        )
    }
}

impl PyTask {
    /// Convert to a validated core task.
    ///
    /// Zero, negative and oversized integers are rejected here, so Python
    /// callers see a `ValueError` rather than an overflow.
    fn to_task(&self) -> Result<Task, String> {
        let positive = |value: i64, field: &str| {
            u32::try_from(value)
                .ok()
                .filter(|&v| v > 0)
                .ok_or_else(|| {
                    format!(
                        "task {:?}: {field} must be a positive integer, got {value}",
                        self.name
                    )
                })
        };
        let task = Task {
            name: self.name.clone(),
            description: self.description.clone(),
            references: self.references.clone(),
            point_of_contact: self.point_of_contact.clone(),
            effort: positive(self.effort, "effort")?,
            parallelization_factor: positive(self.parallelization_factor, "parallelization factor")?,
            dependencies: self.dependencies.clone(),
        };
        task.validate()
            .map_err(|reason| format!("task {:?}: {reason}", self.name))?;
        Ok(task)
    }
}

/// A team of interchangeable workers (PyO3 wrapper).
#[pyclass(name = "Team")]
#[derive(Clone, Debug)]
pub struct PyTeam {
    #[pyo3(get, set)]
    pub name: String,
    #[pyo3(get, set)]
    pub size: i64,
}

#[pymethods]
impl PyTeam {
    #[new]
    fn new(name: String, size: i64) -> PyResult<Self> {
        let team = Self { name, size };
        team.to_team().map_err(to_py_err)?;
        Ok(team)
    }

    fn __repr__(&self) -> String {
        format!("Team(name={:?}, size={})", self.name, self.size)
    }
}

impl PyTeam {
    fn to_team(&self) -> Result<Team, ScheduleError> {
        match u32::try_from(self.size) {
            Ok(size) if size > 0 => Ok(Team::new(self.name.clone(), size)),
            _ => Err(ScheduleError::InvalidTeam {
                name: self.name.clone(),
                size: self.size,
            }),
        }
    }
}

/// A task placed on the plan (PyO3 wrapper).
#[pyclass(name = "PlannedTask")]
#[derive(Clone, Debug)]
pub struct PyPlannedTask {
    #[pyo3(get)]
    pub name: String,
    #[pyo3(get)]
    pub start_offset: u32,
    #[pyo3(get)]
    pub end_offset: u32,
    #[pyo3(get)]
    pub start_date: NaiveDate,
    #[pyo3(get)]
    pub end_date: NaiveDate,
    #[pyo3(get)]
    pub daily_allocation: HashMap<u32, u32>,
    #[pyo3(get)]
    pub date_allocation: HashMap<NaiveDate, u32>,
}

impl From<&PlannedTask> for PyPlannedTask {
    fn from(planned: &PlannedTask) -> Self {
        Self {
            name: planned.name().to_string(),
            start_offset: planned.start_offset,
            end_offset: planned.end_offset,
            start_date: planned.start_date(),
            end_date: planned.end_date(),
            daily_allocation: planned
                .daily_allocation
                .iter()
                .map(|(&k, &v)| (k, v))
                .collect(),
            date_allocation: planned
                .dated_allocation()
                .iter()
                .map(|(&k, &v)| (k, v))
                .collect(),
        }
    }
}

#[pymethods]
impl PyPlannedTask {
    fn __repr__(&self) -> String {
        format!(
            "PlannedTask(name={:?}, start={}, end={})",
            self.name, self.start_date, self.end_date
        )
    }
}

/// Result of a scheduling run (PyO3 wrapper).
#[pyclass(name = "Plan")]
#[derive(Clone, Debug)]
pub struct PyPlan {
    inner: Plan,
}

#[pymethods]
impl PyPlan {
    #[getter]
    fn scheduled_tasks(&self) -> Vec<PyPlannedTask> {
        self.inner.tasks().iter().map(PyPlannedTask::from).collect()
    }

    #[getter]
    fn start_date(&self) -> NaiveDate {
        self.inner.start_date()
    }

    #[getter]
    fn makespan(&self) -> u32 {
        self.inner.makespan()
    }

    fn get_markdown_view(&self) -> String {
        render::markdown(&self.inner)
    }

    fn get_gantt_chart(&self) -> String {
        render::gantt_chart(&self.inner)
    }

    fn get_dependency_graph(&self) -> String {
        render::dependency_graph(&self.inner)
    }

    /// One dict per task with its dates, effort and dependencies.
    fn get_task_table<'py>(&self, py: Python<'py>) -> PyResult<Vec<Bound<'py, PyDict>>> {
        task_table_dicts(py, &self.inner)
    }

    /// One dict per working date with the total and per-task worker counts.
    fn get_engineer_use_table<'py>(&self, py: Python<'py>) -> PyResult<Vec<Bound<'py, PyDict>>> {
        engineer_use_dicts(py, &self.inner)
    }

    fn __repr__(&self) -> String {
        format!(
            "Plan(tasks={}, start={}, makespan={})",
            self.inner.tasks().len(),
            self.inner.start_date(),
            self.inner.makespan()
        )
    }
}

fn task_table_dicts<'py>(py: Python<'py>, plan: &Plan) -> PyResult<Vec<Bound<'py, PyDict>>> {
    render::task_table(plan)
        .into_iter()
        .map(|row| {
            let dict = PyDict::new_bound(py);
            dict.set_item("Task", row.name)?;
            dict.set_item("Start Date", row.start_date)?;
            dict.set_item("End Date", row.end_date)?;
            dict.set_item("Effort", row.effort)?;
            dict.set_item("Parallelization Factor", row.parallelization_factor)?;
            dict.set_item("Point of Contact", row.point_of_contact)?;
            dict.set_item("Dependencies", row.dependencies)?;
            Ok(dict)
        })
        .collect()
}

fn engineer_use_dicts<'py>(py: Python<'py>, plan: &Plan) -> PyResult<Vec<Bound<'py, PyDict>>> {
    let table = render::utilization_table(plan);
    table
        .rows
        .into_iter()
        .map(|row| {
            let dict = PyDict::new_bound(py);
            dict.set_item("Date", row.date)?;
            dict.set_item("Total", row.total)?;
            for (name, workers) in table.task_names.iter().zip(row.per_task) {
                dict.set_item(format!("T-{name}"), workers)?;
            }
            Ok(dict)
        })
        .collect()
}

/// Plan tasks for a team starting at `start_date`.
///
/// Weekends and any `holidays` are non-working days.
///
/// # Raises
/// * ValueError for duplicate names, cycles, unknown dependencies, an
///   invalid team, or an exceeded horizon
#[pyfunction]
#[pyo3(signature = (tasks, team, start_date, holidays=None, verbosity=0, max_days=None))]
fn schedule(
    tasks: Vec<PyTask>,
    team: PyTeam,
    start_date: NaiveDate,
    holidays: Option<Vec<NaiveDate>>,
    verbosity: u8,
    max_days: Option<u32>,
) -> PyResult<PyPlan> {
    let team = team.to_team().map_err(to_py_err)?;
    let tasks: Vec<Task> = tasks
        .iter()
        .map(PyTask::to_task)
        .collect::<Result<_, _>>()
        .map_err(PyValueError::new_err)?;
    let workdays = Holidays::new(holidays.unwrap_or_default());
    let config = SchedulerConfig {
        verbosity,
        max_days,
    };

    CriticalPathScheduler::new(config)
        .schedule(&tasks, &team, start_date, &workdays)
        .map(|inner| PyPlan { inner })
        .map_err(to_py_err)
}

/// The ganttplan Python module.
#[pymodule]
fn ganttplan(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_class::<PyTask>()?;
    m.add_class::<PyTeam>()?;
    m.add_class::<PyPlannedTask>()?;
    m.add_class::<PyPlan>()?;

    m.add_function(wrap_pyfunction!(schedule, m)?)?;

    Ok(())
}
