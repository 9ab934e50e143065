//! The position engine: bidirectional mapping between calendar dates and
//! pixel offsets under a variable time scale.
//!
//! Nothing here clamps to the visible area; callers clip off-screen
//! elements themselves. Malformed inputs (zero or negative scale) degrade
//! to no-ops rather than panicking.

use chrono::{Duration, NaiveDate};
use thiserror::Error;

use super::dates::{add_units, days_between};
use super::view::ScaleMode;
use crate::model::Task;

/// Minimum rendered bar width so zero-duration or sub-pixel tasks stay
/// visible and interactable.
pub const MIN_TASK_WIDTH: f32 = 20.0;
pub const ROW_HEIGHT: f32 = 60.0;
pub const TASK_BAR_HEIGHT: f32 = 32.0;
pub const MILESTONE_HEIGHT: f32 = 24.0;
pub const TASK_BAR_PADDING: f32 = 8.0;
pub const HEADER_HEIGHT: f32 = 50.0;
pub const HANDLE_WIDTH: f32 = 8.0;

/// Derived pixel rectangle for one task. Recomputed whenever dates, scale
/// or row order change; never persisted.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TaskPosition {
    pub left: f32,
    pub width: f32,
    pub top: f32,
    pub height: f32,
}

/// One tick of the timeline header.
#[derive(Debug, Clone, PartialEq)]
pub struct TimeScaleItem {
    pub date: NaiveDate,
    pub label: String,
    pub position: f32,
}

/// Errors from time-scale generation.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TimeScaleError {
    #[error("unit pixel width must be positive, got {0}")]
    NonPositiveUnitWidth(f32),
    #[error("scale unit does not advance past {0}")]
    UnitDoesNotAdvance(NaiveDate),
}

/// Pixel offset of `date` from the view origin. Negative for dates before
/// the origin.
pub fn date_to_x(date: NaiveDate, origin: NaiveDate, pixels_per_day: f32) -> f32 {
    (days_between(origin, date) as f32 * pixels_per_day).round()
}

/// Pixel width of the `[start, end]` range, floored at [`MIN_TASK_WIDTH`].
pub fn duration_to_width(start: NaiveDate, end: NaiveDate, pixels_per_day: f32) -> f32 {
    (days_between(start, end) as f32 * pixels_per_day)
        .round()
        .max(MIN_TASK_WIDTH)
}

/// Inverse of [`date_to_x`], rounding to the nearest whole day.
///
/// A non-positive or non-finite scale degrades to the origin date.
pub fn x_to_date(x: f32, origin: NaiveDate, pixels_per_day: f32) -> NaiveDate {
    if !(pixels_per_day > 0.0) || !pixels_per_day.is_finite() {
        return origin;
    }
    let days = (x / pixels_per_day).round() as i64;
    Duration::try_days(days)
        .and_then(|d| origin.checked_add_signed(d))
        .unwrap_or(origin)
}

/// Full pixel rectangle for a task in the given row.
pub fn task_position(
    task: &Task,
    origin: NaiveDate,
    pixels_per_day: f32,
    row_index: usize,
) -> TaskPosition {
    TaskPosition {
        left: date_to_x(task.start, origin, pixels_per_day),
        width: duration_to_width(task.start, task.end, pixels_per_day),
        top: row_index as f32 * ROW_HEIGHT + TASK_BAR_PADDING,
        height: if task.is_milestone {
            MILESTONE_HEIGHT
        } else {
            TASK_BAR_HEIGHT
        },
    }
}

/// Walk from `start` to `end` inclusive in steps of one scale unit,
/// accumulating pixel position by `unit_pixel_width` per step.
pub fn generate_time_scale(
    start: NaiveDate,
    end: NaiveDate,
    mode: ScaleMode,
    unit_pixel_width: f32,
) -> Result<Vec<TimeScaleItem>, TimeScaleError> {
    if !(unit_pixel_width > 0.0) || !unit_pixel_width.is_finite() {
        return Err(TimeScaleError::NonPositiveUnitWidth(unit_pixel_width));
    }

    let mut scale = Vec::new();
    let mut current = start;
    let mut position = 0.0;

    while current <= end {
        scale.push(TimeScaleItem {
            date: current,
            label: mode.tick_label(current),
            position,
        });

        let next = add_units(current, 1, mode);
        if next <= current {
            return Err(TimeScaleError::UnitDoesNotAdvance(current));
        }
        current = next;
        position += unit_pixel_width;
    }

    Ok(scale)
}

/// Quantize a pixel value to the nearest multiple of `grid_size`.
///
/// A non-positive grid returns the input unchanged.
pub fn snap_to_grid(position: f32, grid_size: f32) -> f32 {
    if !(grid_size > 0.0) || !grid_size.is_finite() {
        return position;
    }
    (position / grid_size).round() * grid_size
}

/// Total timeline width for the visible range.
pub fn timeline_width(start: NaiveDate, end: NaiveDate, pixels_per_day: f32) -> f32 {
    duration_to_width(start, end, pixels_per_day)
}

/// Row index under a vertical offset. May be out of range (including
/// negative); callers clamp to `[0, row_count - 1]`.
pub fn row_index_from_y(y: f32) -> i32 {
    (y / ROW_HEIGHT).floor() as i32
}

/// Strict 2D interval-overlap test. Exposed for conflict detection, not
/// enforced anywhere automatically.
pub fn rects_overlap(a: &TaskPosition, b: &TaskPosition) -> bool {
    let horizontal = a.left < b.left + b.width && a.left + a.width > b.left;
    let vertical = a.top < b.top + b.height && a.top + a.height > b.top;
    horizontal && vertical
}

/// Pixel offset of the "today" marker.
pub fn today_x(origin: NaiveDate, pixels_per_day: f32) -> f32 {
    date_to_x(chrono::Local::now().date_naive(), origin, pixels_per_day)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::RowId;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn date_to_x_is_zero_at_origin_and_negative_before() {
        let origin = date(2025, 1, 10);
        assert_eq!(date_to_x(origin, origin, 40.0), 0.0);
        assert_eq!(date_to_x(date(2025, 1, 12), origin, 40.0), 80.0);
        assert_eq!(date_to_x(date(2025, 1, 8), origin, 40.0), -80.0);
    }

    #[test]
    fn duration_to_width_floors_at_minimum() {
        let d = date(2025, 1, 10);
        // Zero duration (milestone) still renders at the minimum width.
        assert_eq!(duration_to_width(d, d, 40.0), MIN_TASK_WIDTH);
        // Sub-pixel scale.
        assert_eq!(duration_to_width(d, date(2025, 1, 11), 0.5), MIN_TASK_WIDTH);
        assert_eq!(duration_to_width(d, date(2025, 1, 15), 40.0), 200.0);
    }

    #[test]
    fn x_to_date_rounds_to_nearest_day() {
        let origin = date(2025, 1, 1);
        assert_eq!(x_to_date(80.0, origin, 40.0), date(2025, 1, 3));
        assert_eq!(x_to_date(59.0, origin, 40.0), date(2025, 1, 2));
        assert_eq!(x_to_date(-40.0, origin, 40.0), date(2024, 12, 31));
    }

    #[test]
    fn x_to_date_degrades_on_bad_scale() {
        let origin = date(2025, 1, 1);
        assert_eq!(x_to_date(500.0, origin, 0.0), origin);
        assert_eq!(x_to_date(500.0, origin, -3.0), origin);
        assert_eq!(x_to_date(500.0, origin, f32::NAN), origin);
    }

    #[test]
    fn task_position_uses_row_index_and_milestone_height() {
        let origin = date(2025, 1, 1);
        let row = RowId::from("row-1");
        let task = Task::new("Build", date(2025, 1, 3), date(2025, 1, 8), row.clone());
        let pos = task_position(&task, origin, 40.0, 2);
        assert_eq!(pos.left, 80.0);
        assert_eq!(pos.width, 200.0);
        assert_eq!(pos.top, 2.0 * ROW_HEIGHT + TASK_BAR_PADDING);
        assert_eq!(pos.height, TASK_BAR_HEIGHT);

        let milestone = Task::new_milestone("Ship", date(2025, 1, 3), row);
        let pos = task_position(&milestone, origin, 40.0, 0);
        assert_eq!(pos.height, MILESTONE_HEIGHT);
        assert_eq!(pos.width, MIN_TASK_WIDTH);
    }

    #[test]
    fn time_scale_walks_days_inclusive() {
        let scale =
            generate_time_scale(date(2025, 1, 1), date(2025, 1, 10), ScaleMode::Day, 40.0)
                .unwrap();
        assert_eq!(scale.len(), 10);
        assert_eq!(scale[0].date, date(2025, 1, 1));
        assert_eq!(scale[0].position, 0.0);
        assert_eq!(scale[9].date, date(2025, 1, 10));
        assert_eq!(scale[9].position, 360.0);
    }

    #[test]
    fn time_scale_walks_months_across_year_end() {
        let scale =
            generate_time_scale(date(2024, 11, 1), date(2025, 2, 1), ScaleMode::Month, 120.0)
                .unwrap();
        let labels: Vec<&str> = scale.iter().map(|i| i.label.as_str()).collect();
        assert_eq!(labels, ["Nov 2024", "Dec 2024", "Jan 2025", "Feb 2025"]);
        assert_eq!(scale[3].position, 360.0);
    }

    #[test]
    fn time_scale_rejects_non_positive_unit_width() {
        let err = generate_time_scale(date(2025, 1, 1), date(2025, 2, 1), ScaleMode::Day, 0.0)
            .unwrap_err();
        assert_eq!(err, TimeScaleError::NonPositiveUnitWidth(0.0));
        assert!(generate_time_scale(
            date(2025, 1, 1),
            date(2025, 2, 1),
            ScaleMode::Week,
            -10.0
        )
        .is_err());
    }

    #[test]
    fn time_scale_empty_when_range_inverted() {
        let scale =
            generate_time_scale(date(2025, 2, 1), date(2025, 1, 1), ScaleMode::Day, 40.0)
                .unwrap();
        assert!(scale.is_empty());
    }

    #[test]
    fn snap_to_grid_quantizes_and_tolerates_zero_grid() {
        assert_eq!(snap_to_grid(97.0, 40.0), 80.0);
        assert_eq!(snap_to_grid(100.0, 40.0), 120.0);
        assert_eq!(snap_to_grid(-59.0, 40.0), -40.0);
        assert_eq!(snap_to_grid(97.0, 0.0), 97.0);
    }

    #[test]
    fn row_index_from_y_may_go_out_of_range() {
        assert_eq!(row_index_from_y(0.0), 0);
        assert_eq!(row_index_from_y(59.9), 0);
        assert_eq!(row_index_from_y(60.0), 1);
        assert_eq!(row_index_from_y(-10.0), -1);
    }

    #[test]
    fn rect_overlap_requires_both_axes() {
        let a = TaskPosition {
            left: 0.0,
            width: 100.0,
            top: 0.0,
            height: 32.0,
        };
        let b = TaskPosition {
            left: 50.0,
            width: 100.0,
            top: 8.0,
            height: 32.0,
        };
        let c = TaskPosition {
            left: 50.0,
            width: 100.0,
            top: 100.0,
            height: 32.0,
        };
        let d = TaskPosition {
            left: 100.0,
            width: 50.0,
            top: 0.0,
            height: 32.0,
        };
        assert!(rects_overlap(&a, &b));
        assert!(!rects_overlap(&a, &c)); // horizontal only
        assert!(!rects_overlap(&a, &d)); // edges touch, not overlap
    }
}

#[cfg(test)]
mod proptest_tests {
    use super::*;
    use proptest::prelude::*;

    fn origin() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 1, 1).unwrap()
    }

    proptest! {
        /// `x_to_date . date_to_x` recovers the date to within one day for
        /// any positive scale.
        #[test]
        fn position_round_trip_within_one_day(
            offset in -2000i64..2000,
            ppd in 0.5f32..120.0,
        ) {
            let date = origin() + Duration::days(offset);
            let x = date_to_x(date, origin(), ppd);
            let back = x_to_date(x, origin(), ppd);
            prop_assert!((back - date).num_days().abs() <= 1);
        }

        /// Snapping is idempotent.
        #[test]
        fn snap_to_grid_is_idempotent(
            position in -100_000.0f32..100_000.0,
            grid in 0.5f32..200.0,
        ) {
            let once = snap_to_grid(position, grid);
            let twice = snap_to_grid(once, grid);
            prop_assert_eq!(once, twice);
        }

        /// Widths never drop below the interaction minimum.
        #[test]
        fn width_never_below_minimum(
            days in 0i64..1000,
            ppd in 0.01f32..100.0,
        ) {
            let start = origin();
            let end = start + Duration::days(days);
            prop_assert!(duration_to_width(start, end, ppd) >= MIN_TASK_WIDTH);
        }
    }
}
