//! Data validation for tasks, rows and dependency lists.
//!
//! Everything here returns validation results as values for the host to
//! surface (form field errors, status messages); nothing throws.

use chrono::NaiveDate;
use thiserror::Error;

use crate::model::{Row, Task, TaskId, TimelineStore};

pub const MAX_TITLE_LEN: usize = 200;
pub const MAX_ID_LEN: usize = 100;

/// A user-surfaceable validation failure.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("title is required")]
    EmptyTitle,
    #[error("start date must be on or before end date")]
    StartAfterEnd,
    #[error("start date must be before end date")]
    StartNotBeforeEnd,
    #[error("progress must be between 0 and 100")]
    ProgressOutOfRange(u8),
    #[error("row label is required")]
    EmptyRowLabel,
    #[error("id must be a non-empty string of at most {MAX_ID_LEN} characters")]
    InvalidId,
    #[error("task cannot depend on itself")]
    SelfDependency,
    #[error("dependency task not found: {0}")]
    UnknownDependency(TaskId),
}

/// Validate one task. An empty result means the task is acceptable.
pub fn validate_task(task: &Task) -> Vec<ValidationError> {
    let mut errors = Vec::new();
    if !is_valid_id(task.id.as_str()) {
        errors.push(ValidationError::InvalidId);
    }
    if task.title.trim().is_empty() {
        errors.push(ValidationError::EmptyTitle);
    }
    if task.start > task.end {
        errors.push(ValidationError::StartAfterEnd);
    }
    if task.progress > 100 {
        errors.push(ValidationError::ProgressOutOfRange(task.progress));
    }
    errors
}

/// Validate one row.
pub fn validate_row(row: &Row) -> Vec<ValidationError> {
    let mut errors = Vec::new();
    if !is_valid_id(row.id.as_str()) {
        errors.push(ValidationError::InvalidId);
    }
    if row.label.trim().is_empty() {
        errors.push(ValidationError::EmptyRowLabel);
    }
    errors
}

/// Validate a strict range (view windows, resize results): start must be
/// strictly before end.
pub fn validate_date_range(start: NaiveDate, end: NaiveDate) -> Result<(), ValidationError> {
    if start >= end {
        return Err(ValidationError::StartNotBeforeEnd);
    }
    Ok(())
}

pub fn validate_progress(progress: u8) -> bool {
    progress <= 100
}

/// Validate a task's dependency id list against the store: no
/// self-references, every id resolvable.
pub fn validate_dependencies(
    store: &TimelineStore,
    task_id: &TaskId,
    dependencies: &[TaskId],
) -> Vec<ValidationError> {
    let mut errors = Vec::new();
    for dep in dependencies {
        if dep == task_id {
            errors.push(ValidationError::SelfDependency);
        } else if store.task(dep).is_none() {
            errors.push(ValidationError::UnknownDependency(dep.clone()));
        }
    }
    errors
}

/// Trim surrounding whitespace and cap at [`MAX_TITLE_LEN`] characters.
pub fn sanitize_title(title: &str) -> String {
    title.trim().chars().take(MAX_TITLE_LEN).collect()
}

pub fn is_valid_id(id: &str) -> bool {
    !id.is_empty() && id.len() <= MAX_ID_LEN
}

/// True when the task lies entirely inside the timeline window.
pub fn task_within_bounds(task: &Task, start: NaiveDate, end: NaiveDate) -> bool {
    task.start >= start && task.end <= end
}

/// True when the task intersects the range at all (inclusive).
pub fn task_overlaps_range(task: &Task, start: NaiveDate, end: NaiveDate) -> bool {
    task.start <= end && task.end >= start
}
