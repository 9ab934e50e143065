//! Small display-formatting helpers shared by tooltips, panels and labels.

use chrono::NaiveDate;

pub fn format_progress(progress: u8) -> String {
    format!("{progress}%")
}

/// "1 day" / "12 days", from the whole-day difference.
pub fn format_duration(start: NaiveDate, end: NaiveDate) -> String {
    let days = (end - start).num_days();
    if days == 1 {
        "1 day".to_string()
    } else {
        format!("{days} days")
    }
}

/// "Jan 5 - Jan 10, 2025"
pub fn format_date_range(start: NaiveDate, end: NaiveDate) -> String {
    format!(
        "{} - {}",
        start.format("%b %-d"),
        end.format("%b %-d, %Y")
    )
}

/// Up to two uppercase initials from a name, for avatar badges.
pub fn initials(name: &str) -> String {
    name.split_whitespace()
        .filter_map(|word| word.chars().next())
        .take(2)
        .flat_map(|c| c.to_uppercase())
        .collect()
}

/// Truncate with an ellipsis when the text exceeds `max_chars`.
pub fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let head: String = text.chars().take(max_chars.saturating_sub(3)).collect();
    format!("{head}...")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn duration_pluralizes() {
        assert_eq!(format_duration(date(2025, 1, 1), date(2025, 1, 2)), "1 day");
        assert_eq!(format_duration(date(2025, 1, 1), date(2025, 1, 13)), "12 days");
        assert_eq!(format_duration(date(2025, 1, 1), date(2025, 1, 1)), "0 days");
    }

    #[test]
    fn date_range_renders_short_month_names() {
        assert_eq!(
            format_date_range(date(2025, 1, 5), date(2025, 1, 10)),
            "Jan 5 - Jan 10, 2025"
        );
    }

    #[test]
    fn initials_take_at_most_two_words() {
        assert_eq!(initials("Backend Team"), "BT");
        assert_eq!(initials("ada"), "A");
        assert_eq!(initials("Quality Assurance Crew"), "QA");
        assert_eq!(initials(""), "");
    }

    #[test]
    fn truncate_adds_ellipsis_only_when_needed() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("a rather long title", 10), "a rathe...");
        assert_eq!(format_progress(60), "60%");
    }
}
