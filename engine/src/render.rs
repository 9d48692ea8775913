//! Text renderings of a finished plan.
//!
//! All functions are pure and only read the plan.

use chrono::NaiveDate;

use crate::models::Plan;

/// Structured markdown document, one section per task in plan order.
pub fn markdown(plan: &Plan) -> String {
    let mut out = String::from("# Project Plan\n\n");
    for planned in plan.tasks() {
        let task = &planned.task;
        out.push_str(&format!("## `{}`\n\n", task.name));
        out.push_str(&format!("{}\n\n", task.description));
        out.push_str(&format!("**Effort**: {} days\n\n", task.effort));
        out.push_str(&format!(
            "**Parallelization Factor**: {}\n\n",
            task.parallelization_factor
        ));
        out.push_str(&format!("**Point of Contact**: {}\n\n", task.point_of_contact));
        out.push_str("**References**:\n\n");
        for reference in &task.references {
            out.push_str(&format!("  - [{reference}]({reference})\n"));
        }
        out.push_str("\n\n");
        out.push_str("**Dependencies**:\n\n");
        for dep in task.unique_dependencies() {
            out.push_str(&format!("  - `{dep}`\n"));
        }
        out.push_str("\n\n");
        out.push_str("### Schedule\n\n");
        out.push_str("| Date | Engineers |\n");
        out.push_str("|------|-----------|\n");
        for (date, workers) in planned.dated_allocation() {
            if *workers > 0 {
                out.push_str(&format!("| {} | {} |\n", date.format("%Y-%m-%d"), workers));
            }
        }
    }
    out
}

/// Timeline chart markup.
///
/// Durations are calendar-day spans from each task's start date to its end
/// date, inclusive, so non-working days inside a task count towards it.
pub fn gantt_chart(plan: &Plan) -> String {
    let mut out = String::from("@startgantt\n");
    out.push_str(&format!(
        "Project starts {}\n",
        plan.start_date().format("%Y-%m-%d")
    ));
    for planned in plan.tasks() {
        let name = planned.name();
        out.push_str(&format!(
            "[{}] requires {} days\n",
            name,
            planned.calendar_span_days()
        ));
        out.push_str(&format!(
            "[{}] starts {}\n",
            name,
            planned.start_date().format("%Y-%m-%d")
        ));
    }
    out.push_str("@endgantt\n");
    out
}

fn dot_escape(name: &str) -> String {
    name.replace('\\', "\\\\").replace('"', "\\\"")
}

/// Graphviz digraph with an edge from every dependency to its dependent.
pub fn dependency_graph(plan: &Plan) -> String {
    let mut out = String::from("digraph G {\n");
    for planned in plan.tasks() {
        let name = dot_escape(planned.name());
        out.push_str(&format!("\"{name}\" [label=\"{name}\"];\n"));
        for dep in planned.task.unique_dependencies() {
            out.push_str(&format!("\"{}\" -> \"{}\";\n", dot_escape(dep), name));
        }
    }
    out.push_str("}\n");
    out
}

/// Workers assigned per task on one working date.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UtilizationRow {
    pub date: NaiveDate,
    pub total: u32,
    /// Workers per task, in plan order.
    pub per_task: Vec<u32>,
}

/// Daily worker usage across the whole plan.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UtilizationTable {
    pub task_names: Vec<String>,
    pub rows: Vec<UtilizationRow>,
}

pub fn utilization_table(plan: &Plan) -> UtilizationTable {
    let task_names = plan.tasks().iter().map(|t| t.name().to_string()).collect();
    let rows = plan
        .working_dates()
        .iter()
        .enumerate()
        .map(|(offset, &date)| {
            let per_task: Vec<u32> = plan
                .tasks()
                .iter()
                .map(|t| t.daily_allocation.get(&(offset as u32)).copied().unwrap_or(0))
                .collect();
            UtilizationRow {
                date,
                total: per_task.iter().sum(),
                per_task,
            }
        })
        .collect();
    UtilizationTable { task_names, rows }
}

/// One summary line per planned task.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TaskRow {
    pub name: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub effort: u32,
    pub parallelization_factor: u32,
    pub point_of_contact: String,
    pub dependencies: String,
}

pub fn task_table(plan: &Plan) -> Vec<TaskRow> {
    plan.tasks()
        .iter()
        .map(|planned| TaskRow {
            name: planned.task.name.clone(),
            start_date: planned.start_date(),
            end_date: planned.end_date(),
            effort: planned.task.effort,
            parallelization_factor: planned.task.parallelization_factor,
            point_of_contact: planned.task.point_of_contact.clone(),
            dependencies: planned.task.unique_dependencies().join(", "),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calendar::Weekdays;
    use crate::models::{Task, Team};
    use crate::scheduler::{CriticalPathScheduler, Scheduler};

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn prototype_plan() -> Plan {
        let tasks = vec![
            Task::new("Prototype Design", 10, 2)
                .with_description("Design the prototype.")
                .with_references(["https://example.com/design-doc"])
                .with_point_of_contact("Engineer A"),
            Task::new("Build Prototype", 8, 1)
                .with_description("Build the prototype, depends on Task A.")
                .with_references(["https://example.com/build-doc"])
                .with_point_of_contact("Engineer B")
                .with_dependencies(["Prototype Design"]),
        ];
        CriticalPathScheduler::default()
            .schedule(
                &tasks,
                &Team::new("Engineering Team", 3),
                d(2025, 1, 1),
                &Weekdays,
            )
            .unwrap()
    }

    #[test]
    fn test_markdown_view() {
        let expected = "# Project Plan

## `Prototype Design`

Design the prototype.

**Effort**: 10 days

**Parallelization Factor**: 2

**Point of Contact**: Engineer A

**References**:

  - [https://example.com/design-doc](https://example.com/design-doc)


**Dependencies**:



### Schedule

| Date | Engineers |
|------|-----------|
| 2025-01-01 | 2 |
| 2025-01-02 | 2 |
| 2025-01-03 | 2 |
| 2025-01-06 | 2 |
| 2025-01-07 | 2 |
## `Build Prototype`

Build the prototype, depends on Task A.

**Effort**: 8 days

**Parallelization Factor**: 1

**Point of Contact**: Engineer B

**References**:

  - [https://example.com/build-doc](https://example.com/build-doc)


**Dependencies**:

  - `Prototype Design`


### Schedule

| Date | Engineers |
|------|-----------|
| 2025-01-08 | 1 |
| 2025-01-09 | 1 |
| 2025-01-10 | 1 |
| 2025-01-13 | 1 |
| 2025-01-14 | 1 |
| 2025-01-15 | 1 |
| 2025-01-16 | 1 |
| 2025-01-17 | 1 |
";
        assert_eq!(markdown(&prototype_plan()), expected);
    }

    #[test]
    fn test_gantt_chart_view() {
        let chart = gantt_chart(&prototype_plan());
        assert_eq!(
            chart,
            "@startgantt\n\
             Project starts 2025-01-01\n\
             [Prototype Design] requires 7 days\n\
             [Prototype Design] starts 2025-01-01\n\
             [Build Prototype] requires 10 days\n\
             [Build Prototype] starts 2025-01-08\n\
             @endgantt\n"
        );
    }

    #[test]
    fn test_dependency_graph() {
        let graph = dependency_graph(&prototype_plan());
        assert!(graph.starts_with("digraph G {\n"));
        assert!(graph.contains("\"Prototype Design\" -> \"Build Prototype\";\n"));
        assert!(graph.ends_with("}\n"));
    }

    #[test]
    fn test_repeated_dependency_rendered_once() {
        let tasks = vec![
            Task::new("a", 1, 1),
            Task::new("b", 1, 1).with_dependencies(["a", "a"]),
        ];
        let plan = CriticalPathScheduler::default()
            .schedule(&tasks, &Team::new("team", 1), d(2025, 1, 1), &Weekdays)
            .unwrap();

        assert_eq!(markdown(&plan).matches("  - `a`").count(), 1);
        assert_eq!(dependency_graph(&plan).matches("\"a\" -> \"b\";").count(), 1);
        assert_eq!(task_table(&plan)[1].dependencies, "a");
    }

    #[test]
    fn test_dot_escape() {
        assert_eq!(dot_escape("say \"hi\""), "say \\\"hi\\\"");
    }

    #[test]
    fn test_utilization_table() {
        let table = utilization_table(&prototype_plan());
        assert_eq!(table.task_names, vec!["Prototype Design", "Build Prototype"]);
        assert_eq!(table.rows.len(), 13);
        assert_eq!(table.rows[0].date, d(2025, 1, 1));
        assert_eq!(table.rows[0].per_task, vec![2, 0]);
        assert_eq!(table.rows[5].date, d(2025, 1, 8));
        assert_eq!(table.rows[5].total, 1);
        assert!(table.rows.iter().all(|r| r.total <= 3));
    }

    #[test]
    fn test_task_table() {
        let rows = task_table(&prototype_plan());
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1].name, "Build Prototype");
        assert_eq!(rows[1].start_date, d(2025, 1, 8));
        assert_eq!(rows[1].end_date, d(2025, 1, 17));
        assert_eq!(rows[1].dependencies, "Prototype Design");
    }
}
