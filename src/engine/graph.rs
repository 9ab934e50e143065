//! Dependency graph utilities.
//!
//! Tasks form a directed graph with an edge `dep -> task` for every entry
//! in `task.dependencies`. All traversal is read-only over the store.

use std::collections::{HashMap, HashSet};

use thiserror::Error;

use super::geometry::TaskPosition;
use crate::model::{TaskId, TimelineStore};

/// Vertical distance under which two line endpoints count as the same row.
const SAME_ROW_EPSILON: f32 = 5.0;
/// Horizontal control-point offset for same-row curves.
const CURVE_CONTROL_OFFSET: f32 = 20.0;

/// A renderable dependency edge, from the dependency's right-mid edge to
/// the dependent's left-mid edge.
#[derive(Debug, Clone, PartialEq)]
pub struct DependencyLine {
    pub x1: f32,
    pub y1: f32,
    pub x2: f32,
    pub y2: f32,
    pub from_task: TaskId,
    pub to_task: TaskId,
}

/// Routing shape for a dependency line.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LinePath {
    /// Different rows: out, then vertically across, then in.
    Stepped { mid_x: f32 },
    /// Same row: a horizontal bezier with a fixed control-point offset.
    Curved { control_offset: f32 },
}

/// Why a proposed dependency edge was rejected.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DependencyError {
    #[error("task cannot depend on itself")]
    SelfDependency,
    #[error("task not found: {0}")]
    UnknownTask(TaskId),
    #[error("would create a circular dependency")]
    WouldCycle,
    #[error("dependency already exists")]
    DuplicateEdge,
}

/// Ids this task directly depends on. Empty for unknown tasks.
pub fn direct_dependencies(store: &TimelineStore, id: &TaskId) -> Vec<TaskId> {
    store
        .task(id)
        .map(|t| t.dependencies.clone())
        .unwrap_or_default()
}

/// Ids of tasks that directly depend on this one (reverse adjacency,
/// computed by full scan in store order).
pub fn direct_dependents(store: &TimelineStore, id: &TaskId) -> Vec<TaskId> {
    store
        .tasks()
        .iter()
        .filter(|t| t.dependencies.contains(id))
        .map(|t| t.id.clone())
        .collect()
}

/// The task plus everything it transitively depends on, in depth-first
/// preorder with each reachable task listed exactly once.
///
/// Diamonds therefore contribute a single entry per shared dependency,
/// and cycles in malformed input cannot recurse.
pub fn dependency_chain(store: &TimelineStore, id: &TaskId) -> Vec<TaskId> {
    let mut chain = Vec::new();
    let mut visited = HashSet::new();
    let mut stack = vec![id.clone()];

    while let Some(current) = stack.pop() {
        if !visited.insert(current.clone()) {
            continue;
        }
        if let Some(task) = store.task(&current) {
            for dep in task.dependencies.iter().rev() {
                stack.push(dep.clone());
            }
        }
        chain.push(current);
    }

    chain
}

/// True iff `existing` is reachable from `proposed` via dependency edges
/// (including `existing == proposed`).
pub fn would_create_cycle(
    store: &TimelineStore,
    existing: &TaskId,
    proposed: &TaskId,
) -> bool {
    dependency_chain(store, proposed).contains(existing)
}

/// Validate the edge "`to` depends on `from`" before it is recorded.
pub fn validate_new_dependency(
    store: &TimelineStore,
    from: &TaskId,
    to: &TaskId,
) -> Result<(), DependencyError> {
    if from == to {
        return Err(DependencyError::SelfDependency);
    }
    if store.task(from).is_none() {
        return Err(DependencyError::UnknownTask(from.clone()));
    }
    let Some(dependent) = store.task(to) else {
        return Err(DependencyError::UnknownTask(to.clone()));
    };
    if would_create_cycle(store, to, from) {
        return Err(DependencyError::WouldCycle);
    }
    if dependent.dependencies.contains(from) {
        return Err(DependencyError::DuplicateEdge);
    }
    Ok(())
}

/// The dependency chain with the greatest cumulative whole-day duration.
///
/// Each chain member is counted once (see [`dependency_chain`]); ties keep
/// the first chain in store order, and a store whose every chain sums to
/// zero yields an empty path.
pub fn critical_path(store: &TimelineStore) -> Vec<TaskId> {
    let mut longest: Vec<TaskId> = Vec::new();
    let mut max_duration = 0i64;

    for task in store.tasks() {
        let chain = dependency_chain(store, &task.id);
        let duration: i64 = chain
            .iter()
            .filter_map(|id| store.task(id))
            .map(|t| t.duration_days())
            .sum();
        if duration > max_duration {
            max_duration = duration;
            longest = chain;
        }
    }

    longest
}

/// One line per (dependency -> dependent) edge where both ends have a
/// resolved position. Tasks that were not laid out are skipped silently.
pub fn dependency_lines(
    store: &TimelineStore,
    positions: &HashMap<TaskId, TaskPosition>,
) -> Vec<DependencyLine> {
    let mut lines = Vec::new();

    for task in store.tasks() {
        let Some(to_position) = positions.get(&task.id) else {
            continue;
        };
        for dep in &task.dependencies {
            let (Some(_), Some(from_position)) = (store.task(dep), positions.get(dep)) else {
                continue;
            };
            lines.push(DependencyLine {
                x1: from_position.left + from_position.width,
                y1: from_position.top + from_position.height / 2.0,
                x2: to_position.left,
                y2: to_position.top + to_position.height / 2.0,
                from_task: dep.clone(),
                to_task: task.id.clone(),
            });
        }
    }

    lines
}

/// Routing contract for consumers: endpoints on clearly different rows get
/// an orthogonal step, same-row endpoints get a curve.
pub fn line_path(line: &DependencyLine) -> LinePath {
    if (line.y2 - line.y1).abs() > SAME_ROW_EPSILON {
        LinePath::Stepped {
            mid_x: line.x1 + (line.x2 - line.x1) / 2.0,
        }
    } else {
        LinePath::Curved {
            control_offset: CURVE_CONTROL_OFFSET,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Row, RowId, Task};
    use chrono::NaiveDate;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    /// Build a store where each `(id, duration_days, deps)` lands in a
    /// single shared row, in the given order.
    fn store_of(entries: &[(&str, i64, &[&str])]) -> TimelineStore {
        let mut store = TimelineStore::new();
        store.add_row(Row {
            id: RowId::from("row-1"),
            label: "Team".into(),
            tasks: Vec::new(),
        });
        for (id, days, deps) in entries {
            let start = date(2025, 1, 1);
            let end = start + chrono::Duration::days(*days);
            let mut task = Task::new(*id, start, end, RowId::from("row-1"));
            task.id = TaskId::from(*id);
            task.dependencies = deps.iter().map(|d| TaskId::from(*d)).collect();
            store.add_task(task);
        }
        store
    }

    #[test]
    fn direct_dependencies_and_dependents() {
        let store = store_of(&[
            ("a", 1, &[]),
            ("b", 1, &["a"]),
            ("c", 1, &["a", "b"]),
        ]);
        assert_eq!(
            direct_dependencies(&store, &TaskId::from("c")),
            vec![TaskId::from("a"), TaskId::from("b")]
        );
        assert_eq!(
            direct_dependents(&store, &TaskId::from("a")),
            vec![TaskId::from("b"), TaskId::from("c")]
        );
        assert!(direct_dependencies(&store, &TaskId::from("ghost")).is_empty());
    }

    #[test]
    fn chain_is_preorder_starting_with_the_task() {
        let store = store_of(&[("a", 1, &[]), ("b", 1, &["a"]), ("c", 1, &["b"])]);
        assert_eq!(
            dependency_chain(&store, &TaskId::from("c")),
            vec![TaskId::from("c"), TaskId::from("b"), TaskId::from("a")]
        );
    }

    #[test]
    fn chain_lists_diamond_dependencies_once() {
        let store = store_of(&[
            ("a", 1, &[]),
            ("b", 1, &["a"]),
            ("c", 1, &["a"]),
            ("d", 1, &["b", "c"]),
        ]);
        assert_eq!(
            dependency_chain(&store, &TaskId::from("d")),
            vec![
                TaskId::from("d"),
                TaskId::from("b"),
                TaskId::from("a"),
                TaskId::from("c"),
            ]
        );
    }

    #[test]
    fn chain_keeps_unknown_dependency_ids_as_leaves() {
        let store = store_of(&[("b", 1, &["ghost"])]);
        assert_eq!(
            dependency_chain(&store, &TaskId::from("b")),
            vec![TaskId::from("b"), TaskId::from("ghost")]
        );
    }

    #[test]
    fn cycle_detection_is_reachability() {
        let store = store_of(&[("a", 1, &[]), ("b", 1, &["a"]), ("c", 1, &["b"])]);
        // a is reachable from c, so an edge making a depend on c cycles.
        assert!(would_create_cycle(&store, &TaskId::from("a"), &TaskId::from("c")));
        assert!(!would_create_cycle(&store, &TaskId::from("c"), &TaskId::from("a")));
        assert!(would_create_cycle(&store, &TaskId::from("a"), &TaskId::from("a")));
    }

    #[test]
    fn edge_validation_rejects_each_reason() {
        let mut store = store_of(&[("a", 1, &[]), ("b", 1, &[])]);

        assert_eq!(
            validate_new_dependency(&store, &TaskId::from("a"), &TaskId::from("a")),
            Err(DependencyError::SelfDependency)
        );
        assert_eq!(
            validate_new_dependency(&store, &TaskId::from("ghost"), &TaskId::from("b")),
            Err(DependencyError::UnknownTask(TaskId::from("ghost")))
        );
        assert_eq!(
            validate_new_dependency(&store, &TaskId::from("a"), &TaskId::from("ghost")),
            Err(DependencyError::UnknownTask(TaskId::from("ghost")))
        );

        // a -> b is fine once.
        store.add_dependency(&TaskId::from("a"), &TaskId::from("b")).unwrap();
        assert_eq!(
            store.add_dependency(&TaskId::from("a"), &TaskId::from("b")),
            Err(DependencyError::DuplicateEdge)
        );
        // The reverse edge would close a cycle.
        assert_eq!(
            validate_new_dependency(&store, &TaskId::from("b"), &TaskId::from("a")),
            Err(DependencyError::WouldCycle)
        );
    }

    #[test]
    fn critical_path_prefers_heaviest_chain() {
        // Chain c -> b -> a totals 12 days; the lone d is 10.
        let store = store_of(&[
            ("a", 5, &[]),
            ("b", 4, &["a"]),
            ("c", 3, &["b"]),
            ("d", 10, &[]),
        ]);
        assert_eq!(
            critical_path(&store),
            vec![TaskId::from("c"), TaskId::from("b"), TaskId::from("a")]
        );
    }

    #[test]
    fn critical_path_counts_a_long_independent_task() {
        // The accumulation sums each task's chain; a 10-day independent
        // task outweighs the 6-day chain.
        let store = store_of(&[
            ("a", 3, &[]),
            ("b", 2, &["a"]),
            ("c", 1, &["b"]),
            ("d", 10, &[]),
        ]);
        assert_eq!(critical_path(&store), vec![TaskId::from("d")]);
    }

    #[test]
    fn critical_path_counts_diamond_members_once() {
        // d(1) -> {b(2), c(3)} -> a(10): the shared a contributes 10 once,
        // total 16 -- not 26.
        let store = store_of(&[
            ("a", 10, &[]),
            ("b", 2, &["a"]),
            ("c", 3, &["a"]),
            ("d", 1, &["b", "c"]),
            ("e", 17, &[]),
        ]);
        assert_eq!(critical_path(&store), vec![TaskId::from("e")]);
    }

    #[test]
    fn critical_path_tie_keeps_first_in_store_order() {
        let store = store_of(&[("a", 5, &[]), ("b", 5, &[])]);
        assert_eq!(critical_path(&store), vec![TaskId::from("a")]);
    }

    #[test]
    fn dependency_lines_connect_edge_midpoints_and_skip_unplaced() {
        let store = store_of(&[("a", 2, &[]), ("b", 2, &["a"]), ("c", 2, &["b"])]);
        let mut positions = HashMap::new();
        positions.insert(
            TaskId::from("a"),
            TaskPosition { left: 0.0, width: 80.0, top: 8.0, height: 32.0 },
        );
        positions.insert(
            TaskId::from("b"),
            TaskPosition { left: 120.0, width: 80.0, top: 68.0, height: 32.0 },
        );
        // c has no position: its incoming edge is skipped.

        let lines = dependency_lines(&store, &positions);
        assert_eq!(lines.len(), 1);
        let line = &lines[0];
        assert_eq!(line.from_task, TaskId::from("a"));
        assert_eq!(line.to_task, TaskId::from("b"));
        assert_eq!((line.x1, line.y1), (80.0, 24.0));
        assert_eq!((line.x2, line.y2), (120.0, 84.0));
    }

    #[test]
    fn line_routing_steps_across_rows_and_curves_within_one() {
        let across = DependencyLine {
            x1: 80.0,
            y1: 24.0,
            x2: 120.0,
            y2: 84.0,
            from_task: TaskId::from("a"),
            to_task: TaskId::from("b"),
        };
        assert_eq!(line_path(&across), LinePath::Stepped { mid_x: 100.0 });

        let level = DependencyLine {
            y2: 26.0,
            ..across.clone()
        };
        assert_eq!(
            line_path(&level),
            LinePath::Curved { control_offset: 20.0 }
        );
    }
}
