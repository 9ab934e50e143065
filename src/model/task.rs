use chrono::NaiveDate;
use egui::Color32;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Opaque identifier for a task. Stable for the task's lifetime.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskId(String);

impl TaskId {
    /// Mint a fresh unique id.
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for TaskId {
    fn default() -> Self {
        Self::new()
    }
}

impl From<&str> for TaskId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl std::fmt::Display for TaskId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Opaque identifier for a row (lane).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RowId(String);

impl RowId {
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for RowId {
    fn default() -> Self {
        Self::new()
    }
}

impl From<&str> for RowId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl std::fmt::Display for RowId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// A single task or milestone on the timeline.
///
/// Invariant: `start <= end`. Every committed mutation re-validates it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Task {
    pub id: TaskId,
    pub title: String,
    pub start: NaiveDate,
    pub end: NaiveDate,
    /// Progress in percent, 0 to 100.
    pub progress: u8,
    /// The row currently owning this task.
    pub row: RowId,
    /// Ids of tasks that must precede this one. No self-references, no cycles.
    pub dependencies: Vec<TaskId>,
    /// If true, rendered as a diamond; date arithmetic is unaffected.
    pub is_milestone: bool,
    /// Display color for the task bar (stored as RGBA).
    #[serde(with = "color_serde")]
    pub color: Color32,
    pub assignee: Option<String>,
    pub description: Option<String>,
}

impl Task {
    /// Create a new task with sensible defaults.
    pub fn new(title: impl Into<String>, start: NaiveDate, end: NaiveDate, row: RowId) -> Self {
        Self {
            id: TaskId::new(),
            title: title.into(),
            start,
            end,
            progress: 0,
            row,
            dependencies: Vec::new(),
            is_milestone: false,
            color: Color32::from_rgb(14, 165, 233), // Sky blue
            assignee: None,
            description: None,
        }
    }

    /// Create a new milestone (zero-duration by convention).
    pub fn new_milestone(title: impl Into<String>, date: NaiveDate, row: RowId) -> Self {
        Self {
            id: TaskId::new(),
            title: title.into(),
            start: date,
            end: date,
            progress: 0,
            row,
            dependencies: Vec::new(),
            is_milestone: true,
            color: Color32::from_rgb(245, 158, 11), // Amber
            assignee: None,
            description: None,
        }
    }

    /// Whole-day duration, `end - start`.
    pub fn duration_days(&self) -> i64 {
        (self.end - self.start).num_days()
    }
}

/// An ordered lane holding an ordered list of task ids.
///
/// Row order is positionally significant: row index maps to vertical offset.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Row {
    pub id: RowId,
    pub label: String,
    pub tasks: Vec<TaskId>,
}

impl Row {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            id: RowId::new(),
            label: label.into(),
            tasks: Vec::new(),
        }
    }
}

/// A partial task update, committed from the detail panel.
#[derive(Debug, Clone, Default)]
pub struct TaskPatch {
    pub title: Option<String>,
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
    pub progress: Option<u8>,
    pub is_milestone: Option<bool>,
    pub color: Option<Color32>,
    /// `Some(None)` clears the field.
    pub assignee: Option<Option<String>>,
    pub description: Option<Option<String>>,
}

impl TaskPatch {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.start.is_none()
            && self.end.is_none()
            && self.progress.is_none()
            && self.is_milestone.is_none()
            && self.color.is_none()
            && self.assignee.is_none()
            && self.description.is_none()
    }
}

/// Serde helper for `Color32`.
mod color_serde {
    use egui::Color32;
    use serde::{self, Deserialize, Deserializer, Serialize, Serializer};

    pub fn serialize<S>(color: &Color32, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let rgba = [color.r(), color.g(), color.b(), color.a()];
        rgba.serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Color32, D::Error>
    where
        D: Deserializer<'de>,
    {
        let rgba: [u8; 4] = Deserialize::deserialize(deserializer)?;
        Ok(Color32::from_rgba_premultiplied(
            rgba[0], rgba[1], rgba[2], rgba[3],
        ))
    }
}
