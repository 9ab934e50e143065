//! Day-granularity calendar math for the timeline.
//!
//! Every function here is pure and total over valid chrono dates: overflow
//! falls back to the input date instead of panicking.

use chrono::{Datelike, Duration, Months, NaiveDate, NaiveDateTime};

use super::view::ScaleMode;

/// Signed whole-day difference, `b - a`.
pub fn days_between(a: NaiveDate, b: NaiveDate) -> i64 {
    (b - a).num_days()
}

/// Add `n` scale units to a date.
///
/// Day and week units are fixed-length; month addition follows calendar
/// month rollover (Jan 31 + 1 month lands on the last day of February).
pub fn add_units(date: NaiveDate, n: i64, mode: ScaleMode) -> NaiveDate {
    match mode {
        ScaleMode::Day => Duration::try_days(n)
            .and_then(|d| date.checked_add_signed(d))
            .unwrap_or(date),
        ScaleMode::Week => n
            .checked_mul(7)
            .and_then(Duration::try_days)
            .and_then(|d| date.checked_add_signed(d))
            .unwrap_or(date),
        ScaleMode::Month => {
            let months = Months::new(n.unsigned_abs().min(u32::MAX as u64) as u32);
            if n >= 0 {
                date.checked_add_months(months).unwrap_or(date)
            } else {
                date.checked_sub_months(months).unwrap_or(date)
            }
        }
    }
}

/// Truncate a timestamp to the calendar day it falls on.
pub fn day_start(at: NaiveDateTime) -> NaiveDate {
    at.date()
}

/// True when both timestamps fall on the same calendar day,
/// ignoring time of day.
pub fn is_same_day(a: NaiveDateTime, b: NaiveDateTime) -> bool {
    a.date() == b.date()
}

/// True when `date` is today in local time.
pub fn is_today(date: NaiveDate) -> bool {
    date == chrono::Local::now().date_naive()
}

/// ISO-8601 week number (the week containing the first Thursday of the
/// year is week 1).
pub fn iso_week(date: NaiveDate) -> u32 {
    date.iso_week().week()
}

/// Clamp a date into `[min, max]`.
pub fn clamp_date(date: NaiveDate, min: NaiveDate, max: NaiveDate) -> NaiveDate {
    if date < min {
        min
    } else if date > max {
        max
    } else {
        date
    }
}
