//! The single-owner task/row store.
//!
//! The engine reads this by reference and never mutates it; every mutation
//! arrives here as a commit value (move, resize, patch) applied by the one
//! controller that owns the store. Collections are Vec-backed so iteration
//! order is insertion order.

use std::collections::HashMap;

use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};

use super::task::{Row, RowId, Task, TaskId, TaskPatch};
use crate::engine::geometry::{self, TaskPosition};
use crate::engine::gesture::{MoveCommit, ResizeCommit};
use crate::engine::graph::{self, DependencyError};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TimelineStore {
    tasks: Vec<Task>,
    rows: Vec<Row>,
}

impl TimelineStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a store from host-supplied collections. The host is
    /// responsible for `task.row` and row-membership consistency.
    pub fn from_parts(rows: Vec<Row>, tasks: Vec<Task>) -> Self {
        Self { tasks, rows }
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn task(&self, id: &TaskId) -> Option<&Task> {
        self.tasks.iter().find(|t| &t.id == id)
    }

    fn task_mut(&mut self, id: &TaskId) -> Option<&mut Task> {
        self.tasks.iter_mut().find(|t| &t.id == id)
    }

    pub fn row(&self, id: &RowId) -> Option<&Row> {
        self.rows.iter().find(|r| &r.id == id)
    }

    pub fn row_index(&self, id: &RowId) -> Option<usize> {
        self.rows.iter().position(|r| &r.id == id)
    }

    pub fn add_row(&mut self, row: Row) {
        self.rows.push(row);
    }

    /// Append a task and register it with its row (when the row exists).
    pub fn add_task(&mut self, task: Task) {
        if let Some(row) = self.rows.iter_mut().find(|r| r.id == task.row) {
            row.tasks.push(task.id.clone());
        }
        self.tasks.push(task);
    }

    /// Host-issued delete: drops the task and scrubs its id from row
    /// membership and from every other task's dependency list.
    pub fn remove_task(&mut self, id: &TaskId) -> bool {
        let before = self.tasks.len();
        self.tasks.retain(|t| &t.id != id);
        if self.tasks.len() == before {
            return false;
        }
        for row in &mut self.rows {
            row.tasks.retain(|t| t != id);
        }
        for task in &mut self.tasks {
            task.dependencies.retain(|d| d != id);
        }
        true
    }

    /// Apply a completed drag. Duration is preserved: the new end is the
    /// new start plus the task's old duration. Unknown task ids are a
    /// silent no-op; an unknown target row keeps the task where it is.
    pub fn apply_move(&mut self, commit: &MoveCommit) -> bool {
        let Some(task) = self.task(&commit.task) else {
            return false;
        };
        let duration = task.duration_days();
        let old_row = task.row.clone();
        let new_end = commit
            .new_start
            .checked_add_signed(Duration::days(duration))
            .unwrap_or(commit.new_start);

        let row_known = self.row(&commit.row).is_some();
        if row_known && commit.row != old_row {
            for row in &mut self.rows {
                if row.id == old_row {
                    row.tasks.retain(|t| t != &commit.task);
                } else if row.id == commit.row {
                    row.tasks.push(commit.task.clone());
                }
            }
        }

        let target_row = if row_known { commit.row.clone() } else { old_row };
        if let Some(task) = self.task_mut(&commit.task) {
            task.start = commit.new_start;
            task.end = new_end;
            task.row = target_row;
        }
        true
    }

    /// Apply a completed resize. A commit that would invert the range is
    /// rejected (the gesture layer already discards these; the store
    /// re-validates because it owns the invariant).
    pub fn apply_resize(&mut self, commit: &ResizeCommit) -> bool {
        if commit.new_start > commit.new_end {
            return false;
        }
        match self.task_mut(&commit.task) {
            Some(task) => {
                task.start = commit.new_start;
                task.end = commit.new_end;
                true
            }
            None => false,
        }
    }

    /// Apply a detail-panel edit. Rejected outright when the patched
    /// range would have `start > end`; progress saturates at 100.
    pub fn apply_patch(&mut self, id: &TaskId, patch: &TaskPatch) -> bool {
        let Some(task) = self.task_mut(id) else {
            return false;
        };
        let start = patch.start.unwrap_or(task.start);
        let end = patch.end.unwrap_or(task.end);
        if start > end {
            return false;
        }

        task.start = start;
        task.end = end;
        if let Some(title) = &patch.title {
            task.title = title.clone();
        }
        if let Some(progress) = patch.progress {
            task.progress = progress.min(100);
        }
        if let Some(is_milestone) = patch.is_milestone {
            task.is_milestone = is_milestone;
        }
        if let Some(color) = patch.color {
            task.color = color;
        }
        if let Some(assignee) = &patch.assignee {
            task.assignee = assignee.clone();
        }
        if let Some(description) = &patch.description {
            task.description = description.clone();
        }
        true
    }

    /// Record that `to` depends on `from`, after full edge validation.
    pub fn add_dependency(&mut self, from: &TaskId, to: &TaskId) -> Result<(), DependencyError> {
        graph::validate_new_dependency(self, from, to)?;
        if let Some(task) = self.task_mut(to) {
            task.dependencies.push(from.clone());
        }
        Ok(())
    }

    pub fn remove_dependency(&mut self, from: &TaskId, to: &TaskId) -> bool {
        match self.task_mut(to) {
            Some(task) => {
                let before = task.dependencies.len();
                task.dependencies.retain(|d| d != from);
                task.dependencies.len() != before
            }
            None => false,
        }
    }

    /// Project every task that belongs to a known row into pixel space.
    /// Tasks whose row is missing from the row list get no position and
    /// are skipped by downstream consumers.
    pub fn task_positions(
        &self,
        origin: NaiveDate,
        pixels_per_day: f32,
    ) -> HashMap<TaskId, TaskPosition> {
        let mut positions = HashMap::new();
        for (row_index, row) in self.rows.iter().enumerate() {
            for task_id in &row.tasks {
                if let Some(task) = self.task(task_id) {
                    positions.insert(
                        task.id.clone(),
                        geometry::task_position(task, origin, pixels_per_day, row_index),
                    );
                }
            }
        }
        positions
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn store_with_two_rows() -> TimelineStore {
        let mut store = TimelineStore::new();
        store.add_row(Row {
            id: RowId::from("row-1"),
            label: "Frontend Team".into(),
            tasks: Vec::new(),
        });
        store.add_row(Row {
            id: RowId::from("row-2"),
            label: "Backend Team".into(),
            tasks: Vec::new(),
        });
        store
    }

    fn task(id: &str, row: &str, start: NaiveDate, end: NaiveDate) -> Task {
        let mut t = Task::new(id, start, end, RowId::from(row));
        t.id = TaskId::from(id);
        t
    }

    #[test]
    fn apply_move_preserves_duration_and_updates_membership() {
        let mut store = store_with_two_rows();
        store.add_task(task("a", "row-1", date(2025, 1, 5), date(2025, 1, 10)));

        let moved = store.apply_move(&MoveCommit {
            task: TaskId::from("a"),
            row: RowId::from("row-2"),
            new_start: date(2025, 1, 8),
        });
        assert!(moved);

        let a = store.task(&TaskId::from("a")).unwrap();
        assert_eq!(a.start, date(2025, 1, 8));
        assert_eq!(a.end, date(2025, 1, 13));
        assert_eq!(a.row, RowId::from("row-2"));
        assert!(store.row(&RowId::from("row-1")).unwrap().tasks.is_empty());
        assert_eq!(
            store.row(&RowId::from("row-2")).unwrap().tasks,
            vec![TaskId::from("a")]
        );
    }

    #[test]
    fn apply_move_to_unknown_row_keeps_current_row() {
        let mut store = store_with_two_rows();
        store.add_task(task("a", "row-1", date(2025, 1, 5), date(2025, 1, 10)));

        store.apply_move(&MoveCommit {
            task: TaskId::from("a"),
            row: RowId::from("ghost"),
            new_start: date(2025, 1, 6),
        });
        let a = store.task(&TaskId::from("a")).unwrap();
        assert_eq!(a.row, RowId::from("row-1"));
        assert_eq!(a.start, date(2025, 1, 6));
        assert_eq!(
            store.row(&RowId::from("row-1")).unwrap().tasks,
            vec![TaskId::from("a")]
        );
    }

    #[test]
    fn apply_move_unknown_task_is_a_no_op() {
        let mut store = store_with_two_rows();
        assert!(!store.apply_move(&MoveCommit {
            task: TaskId::from("ghost"),
            row: RowId::from("row-1"),
            new_start: date(2025, 1, 6),
        }));
    }

    #[test]
    fn apply_resize_rejects_inverted_range() {
        let mut store = store_with_two_rows();
        store.add_task(task("a", "row-1", date(2025, 1, 5), date(2025, 1, 10)));

        assert!(!store.apply_resize(&ResizeCommit {
            task: TaskId::from("a"),
            new_start: date(2025, 1, 12),
            new_end: date(2025, 1, 10),
        }));
        let a = store.task(&TaskId::from("a")).unwrap();
        assert_eq!(a.start, date(2025, 1, 5));

        assert!(store.apply_resize(&ResizeCommit {
            task: TaskId::from("a"),
            new_start: date(2025, 1, 5),
            new_end: date(2025, 1, 12),
        }));
        assert_eq!(store.task(&TaskId::from("a")).unwrap().end, date(2025, 1, 12));
    }

    #[test]
    fn apply_patch_validates_range_and_saturates_progress() {
        let mut store = store_with_two_rows();
        store.add_task(task("a", "row-1", date(2025, 1, 5), date(2025, 1, 10)));

        // Inverted range: rejected wholesale, nothing applied.
        let rejected = TaskPatch {
            title: Some("Renamed".into()),
            start: Some(date(2025, 1, 20)),
            ..Default::default()
        };
        assert!(!store.apply_patch(&TaskId::from("a"), &rejected));
        assert_eq!(store.task(&TaskId::from("a")).unwrap().title, "a");

        let accepted = TaskPatch {
            title: Some("Renamed".into()),
            progress: Some(150),
            assignee: Some(Some("QA Team".into())),
            ..Default::default()
        };
        assert!(store.apply_patch(&TaskId::from("a"), &accepted));
        let a = store.task(&TaskId::from("a")).unwrap();
        assert_eq!(a.title, "Renamed");
        assert_eq!(a.progress, 100);
        assert_eq!(a.assignee.as_deref(), Some("QA Team"));

        // `Some(None)` clears an optional field.
        let clear = TaskPatch {
            assignee: Some(None),
            ..Default::default()
        };
        assert!(store.apply_patch(&TaskId::from("a"), &clear));
        assert_eq!(store.task(&TaskId::from("a")).unwrap().assignee, None);
    }

    #[test]
    fn remove_task_scrubs_rows_and_dependencies() {
        let mut store = store_with_two_rows();
        store.add_task(task("a", "row-1", date(2025, 1, 1), date(2025, 1, 5)));
        store.add_task(task("b", "row-2", date(2025, 1, 6), date(2025, 1, 9)));
        store.add_dependency(&TaskId::from("a"), &TaskId::from("b")).unwrap();

        assert!(store.remove_task(&TaskId::from("a")));
        assert!(store.task(&TaskId::from("a")).is_none());
        assert!(store.row(&RowId::from("row-1")).unwrap().tasks.is_empty());
        assert!(store
            .task(&TaskId::from("b"))
            .unwrap()
            .dependencies
            .is_empty());
        assert!(!store.remove_task(&TaskId::from("a")));
    }

    #[test]
    fn task_positions_skip_tasks_without_a_known_row() {
        let mut store = store_with_two_rows();
        store.add_task(task("a", "row-1", date(2025, 1, 1), date(2025, 1, 5)));
        store.add_task(task("orphan", "ghost", date(2025, 1, 1), date(2025, 1, 5)));

        let positions = store.task_positions(date(2025, 1, 1), 40.0);
        assert!(positions.contains_key(&TaskId::from("a")));
        assert!(!positions.contains_key(&TaskId::from("orphan")));
        // Row index drives vertical placement.
        assert_eq!(
            positions[&TaskId::from("a")].top,
            geometry::TASK_BAR_PADDING
        );
    }
}
