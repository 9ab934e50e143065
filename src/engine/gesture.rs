//! Gesture tracking: converts continuous pointer movement into discrete,
//! grid-snapped date changes.
//!
//! One controller holds at most one active gesture (drag XOR resize); the
//! tagged union makes that structural. The controller never mutates task
//! data; releases produce commit values for the owning store to apply.

use chrono::NaiveDate;

use super::geometry::{snap_to_grid, x_to_date, MIN_TASK_WIDTH, ROW_HEIGHT};
use crate::model::{Row, RowId, TaskId};

/// Which edge of a task bar a resize gesture grabs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResizeEdge {
    Left,
    Right,
}

#[derive(Debug, Clone)]
struct DragGesture {
    task: TaskId,
    origin_x: f32,
    origin_y: f32,
    initial_left: f32,
    initial_row: RowId,
}

#[derive(Debug, Clone)]
struct ResizeGesture {
    task: TaskId,
    edge: ResizeEdge,
    origin_x: f32,
    initial_width: f32,
    initial_left: f32,
}

#[derive(Debug, Clone, Default)]
enum Gesture {
    #[default]
    Idle,
    Dragging(DragGesture),
    Resizing(ResizeGesture),
}

/// Live values for rendering an in-progress drag.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DragPreview {
    pub left: f32,
    pub delta_y: f32,
}

/// Live values for rendering an in-progress resize.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResizePreview {
    pub left: f32,
    pub width: f32,
}

/// A completed drag: the task requests this row and start date.
///
/// The store preserves duration when applying (`new_end = new_start +
/// old duration`).
#[derive(Debug, Clone, PartialEq)]
pub struct MoveCommit {
    pub task: TaskId,
    pub row: RowId,
    pub new_start: NaiveDate,
}

/// A completed resize: the task requests this date range.
#[derive(Debug, Clone, PartialEq)]
pub struct ResizeCommit {
    pub task: TaskId,
    pub new_start: NaiveDate,
    pub new_end: NaiveDate,
}

/// Tracks the single in-progress gesture, if any.
#[derive(Debug, Default)]
pub struct GestureController {
    state: Gesture,
}

impl GestureController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_idle(&self) -> bool {
        matches!(self.state, Gesture::Idle)
    }

    pub fn is_dragging(&self) -> bool {
        matches!(self.state, Gesture::Dragging(_))
    }

    pub fn is_resizing(&self) -> bool {
        matches!(self.state, Gesture::Resizing(_))
    }

    /// The task owning the active gesture, if any.
    pub fn active_task(&self) -> Option<&TaskId> {
        match &self.state {
            Gesture::Idle => None,
            Gesture::Dragging(drag) => Some(&drag.task),
            Gesture::Resizing(resize) => Some(&resize.task),
        }
    }

    /// Begin a move gesture. Ignored unless idle; the caller must not
    /// start a drag while a resize is in flight.
    pub fn start_drag(
        &mut self,
        task: TaskId,
        pointer_x: f32,
        pointer_y: f32,
        initial_left: f32,
        initial_row: RowId,
    ) {
        if !self.is_idle() {
            return;
        }
        self.state = Gesture::Dragging(DragGesture {
            task,
            origin_x: pointer_x,
            origin_y: pointer_y,
            initial_left,
            initial_row,
        });
    }

    /// Live preview for the current pointer sample. Pure: derived from the
    /// recorded gesture origin plus the two coordinates passed.
    pub fn update_drag(&self, pointer_x: f32, pointer_y: f32) -> Option<DragPreview> {
        let Gesture::Dragging(drag) = &self.state else {
            return None;
        };
        Some(DragPreview {
            left: drag.initial_left + (pointer_x - drag.origin_x),
            delta_y: pointer_y - drag.origin_y,
        })
    }

    /// Finish the drag: snap the landing position to whole days, resolve
    /// the target row from the vertical delta (clamped into range), and
    /// return the commit. Always returns to idle, commit or not; a
    /// gesture with no net movement still commits.
    pub fn end_drag(
        &mut self,
        pointer_x: f32,
        pointer_y: f32,
        origin: NaiveDate,
        pixels_per_day: f32,
        rows: &[Row],
    ) -> Option<MoveCommit> {
        let Gesture::Dragging(drag) = std::mem::take(&mut self.state) else {
            return None;
        };

        let delta_x = pointer_x - drag.origin_x;
        let delta_y = pointer_y - drag.origin_y;

        let new_left = snap_to_grid(drag.initial_left + delta_x, pixels_per_day);
        let new_start = x_to_date(new_left, origin, pixels_per_day);

        // Unknown origin row falls back to itself.
        let new_row = match rows.iter().position(|r| r.id == drag.initial_row) {
            Some(index) => {
                let row_delta = (delta_y / ROW_HEIGHT).round() as i64;
                let target = (index as i64 + row_delta).clamp(0, rows.len() as i64 - 1);
                rows[target as usize].id.clone()
            }
            None => drag.initial_row,
        };

        Some(MoveCommit {
            task: drag.task,
            row: new_row,
            new_start,
        })
    }

    /// Begin an edge resize. Ignored unless idle.
    pub fn start_resize(
        &mut self,
        task: TaskId,
        edge: ResizeEdge,
        pointer_x: f32,
        initial_width: f32,
        initial_left: f32,
    ) {
        if !self.is_idle() {
            return;
        }
        self.state = Gesture::Resizing(ResizeGesture {
            task,
            edge,
            origin_x: pointer_x,
            initial_width,
            initial_left,
        });
    }

    /// Live preview. The left edge counter-moves width against the
    /// pointer; the right edge leaves `left` fixed. Width never previews
    /// below [`MIN_TASK_WIDTH`].
    pub fn update_resize(&self, pointer_x: f32) -> Option<ResizePreview> {
        let Gesture::Resizing(resize) = &self.state else {
            return None;
        };
        let delta = pointer_x - resize.origin_x;
        Some(match resize.edge {
            ResizeEdge::Left => ResizePreview {
                left: resize.initial_left + delta,
                width: (resize.initial_width - delta).max(MIN_TASK_WIDTH),
            },
            ResizeEdge::Right => ResizePreview {
                left: resize.initial_left,
                width: (resize.initial_width + delta).max(MIN_TASK_WIDTH),
            },
        })
    }

    /// Finish the resize, holding the untouched endpoint fixed. A result
    /// that would invert the range is discarded (no commit). Always
    /// returns to idle.
    pub fn end_resize(
        &mut self,
        pointer_x: f32,
        current_start: NaiveDate,
        current_end: NaiveDate,
        origin: NaiveDate,
        pixels_per_day: f32,
    ) -> Option<ResizeCommit> {
        let Gesture::Resizing(resize) = std::mem::take(&mut self.state) else {
            return None;
        };

        let delta = pointer_x - resize.origin_x;
        let (new_start, new_end) = match resize.edge {
            ResizeEdge::Left => {
                let snapped_left = snap_to_grid(resize.initial_left + delta, pixels_per_day);
                (x_to_date(snapped_left, origin, pixels_per_day), current_end)
            }
            ResizeEdge::Right => {
                let new_width = (resize.initial_width + delta).max(MIN_TASK_WIDTH);
                let snapped_width = snap_to_grid(new_width, pixels_per_day);
                let new_right = resize.initial_left + snapped_width;
                (current_start, x_to_date(new_right, origin, pixels_per_day))
            }
        };

        if new_start >= new_end {
            return None;
        }

        Some(ResizeCommit {
            task: resize.task,
            new_start,
            new_end,
        })
    }

    /// Abandon any in-flight gesture without committing. Used when focus
    /// is lost mid-gesture.
    pub fn cancel(&mut self) {
        self.state = Gesture::Idle;
    }
}
