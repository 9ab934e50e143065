use chrono::{Datelike, Months, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::model::TaskId;

/// Nominal days per month used to derive day width in month scale.
///
/// Calendar months are 28-31 days; the fixed denominator is a deliberate
/// simplification, not calendar-exact day width.
pub const APPROX_DAYS_PER_MONTH: f32 = 30.0;

/// Controls what granularity the timeline displays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScaleMode {
    Day,
    Week,
    Month,
}

impl ScaleMode {
    pub const ALL: [ScaleMode; 3] = [ScaleMode::Day, ScaleMode::Week, ScaleMode::Month];

    /// Column width of one scale unit, in pixels.
    pub fn pixels_per_unit(self) -> f32 {
        match self {
            ScaleMode::Day => 40.0,
            ScaleMode::Week => 80.0,
            ScaleMode::Month => 120.0,
        }
    }

    /// Derived day width for the current scale.
    pub fn pixels_per_day(self) -> f32 {
        match self {
            ScaleMode::Day => self.pixels_per_unit(),
            ScaleMode::Week => self.pixels_per_unit() / 7.0,
            ScaleMode::Month => self.pixels_per_unit() / APPROX_DAYS_PER_MONTH,
        }
    }

    /// Header label for a tick at `date`, e.g. "Mon 24", "Week 43", "Oct 2024".
    pub fn tick_label(self, date: NaiveDate) -> String {
        match self {
            ScaleMode::Day => date.format("%a %d").to_string(),
            ScaleMode::Week => format!("Week {}", date.iso_week().week()),
            ScaleMode::Month => date.format("%b %Y").to_string(),
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ScaleMode::Day => "Day",
            ScaleMode::Week => "Week",
            ScaleMode::Month => "Month",
        }
    }

    /// One step toward finer granularity; saturates at `Day`.
    fn finer(self) -> Self {
        match self {
            ScaleMode::Month => ScaleMode::Week,
            ScaleMode::Week | ScaleMode::Day => ScaleMode::Day,
        }
    }

    /// One step toward coarser granularity; saturates at `Month`.
    fn coarser(self) -> Self {
        match self {
            ScaleMode::Day => ScaleMode::Week,
            ScaleMode::Week | ScaleMode::Month => ScaleMode::Month,
        }
    }
}

/// The visible window and interaction state of the timeline.
///
/// One instance per rendered timeline; selection and hover accept any id
/// without validation (an unknown id simply never matches a rendered task).
#[derive(Debug, Clone)]
pub struct ViewState {
    pub mode: ScaleMode,
    /// The leftmost visible date (the position-engine origin).
    pub start: NaiveDate,
    /// The rightmost visible date.
    pub end: NaiveDate,
    pub selected: Option<TaskId>,
    pub hovered: Option<TaskId>,
}

impl ViewState {
    /// Default window: first of the current month through the last day of
    /// the month after next.
    pub fn new(today: NaiveDate) -> Self {
        let start = first_of_month(today);
        let end = add_months(start, 3).pred_opt().unwrap_or(start);
        Self {
            mode: ScaleMode::Week,
            start,
            end,
            selected: None,
            hovered: None,
        }
    }

    pub fn pixels_per_day(&self) -> f32 {
        self.mode.pixels_per_day()
    }

    /// Move one step toward `Day`; no-op at `Day`.
    pub fn zoom_in(&mut self) {
        self.mode = self.mode.finer();
    }

    /// Move one step toward `Month`; no-op at `Month`.
    pub fn zoom_out(&mut self) {
        self.mode = self.mode.coarser();
    }

    pub fn can_zoom_in(&self) -> bool {
        self.mode != ScaleMode::Day
    }

    pub fn can_zoom_out(&self) -> bool {
        self.mode != ScaleMode::Month
    }

    pub fn set_mode(&mut self, mode: ScaleMode) {
        self.mode = mode;
    }

    pub fn set_date_range(&mut self, start: NaiveDate, end: NaiveDate) {
        self.start = start;
        self.end = end;
    }

    /// Re-center the window around today: previous month through next month.
    pub fn scroll_to_today(&mut self) {
        let today = chrono::Local::now().date_naive();
        let start = sub_months(first_of_month(today), 1);
        let end = add_months(first_of_month(today), 2)
            .pred_opt()
            .unwrap_or(start);
        self.set_date_range(start, end);
    }

    pub fn select(&mut self, id: Option<TaskId>) {
        self.selected = id;
    }

    pub fn hover(&mut self, id: Option<TaskId>) {
        self.hovered = id;
    }
}

fn first_of_month(date: NaiveDate) -> NaiveDate {
    date.with_day(1).unwrap_or(date)
}

fn add_months(date: NaiveDate, n: u32) -> NaiveDate {
    date.checked_add_months(Months::new(n)).unwrap_or(date)
}

fn sub_months(date: NaiveDate, n: u32) -> NaiveDate {
    date.checked_sub_months(Months::new(n)).unwrap_or(date)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn default_window_spans_three_months() {
        let view = ViewState::new(date(2025, 1, 15));
        assert_eq!(view.start, date(2025, 1, 1));
        assert_eq!(view.end, date(2025, 3, 31));
        assert_eq!(view.mode, ScaleMode::Week);
    }

    #[test]
    fn zoom_ladder_from_week() {
        let mut view = ViewState::new(date(2025, 1, 15));
        view.zoom_in();
        assert_eq!(view.mode, ScaleMode::Day);
        assert!(!view.can_zoom_in());
        assert!(view.can_zoom_out());
    }

    #[test]
    fn zoom_out_twice_from_day_reaches_month() {
        let mut view = ViewState::new(date(2025, 1, 15));
        view.set_mode(ScaleMode::Day);
        view.zoom_out();
        view.zoom_out();
        assert_eq!(view.mode, ScaleMode::Month);
        assert!(!view.can_zoom_out());
        // Saturates: a further zoom out stays at month.
        view.zoom_out();
        assert_eq!(view.mode, ScaleMode::Month);
    }

    #[test]
    fn pixels_per_day_is_derived_per_mode() {
        assert_eq!(ScaleMode::Day.pixels_per_day(), 40.0);
        assert!((ScaleMode::Week.pixels_per_day() - 80.0 / 7.0).abs() < f32::EPSILON);
        assert_eq!(ScaleMode::Month.pixels_per_day(), 4.0);
    }

    #[test]
    fn tick_labels_per_mode() {
        // 2024-10-21 is a Monday in ISO week 43.
        let d = date(2024, 10, 21);
        assert_eq!(ScaleMode::Day.tick_label(d), "Mon 21");
        assert_eq!(ScaleMode::Week.tick_label(d), "Week 43");
        assert_eq!(ScaleMode::Month.tick_label(d), "Oct 2024");
    }

    #[test]
    fn selection_accepts_unknown_ids() {
        let mut view = ViewState::new(date(2025, 1, 15));
        view.select(Some(TaskId::from("no-such-task")));
        assert_eq!(view.selected, Some(TaskId::from("no-such-task")));
        view.hover(Some(TaskId::from("ghost")));
        view.select(None);
        assert_eq!(view.selected, None);
        assert_eq!(view.hovered, Some(TaskId::from("ghost")));
    }
}
