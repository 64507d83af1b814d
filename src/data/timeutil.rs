//! Calendar and label helpers shared by the store and the layout compiler.
//!
//! All day arithmetic is done in UTC: the retention window, the monthly
//! archive split and the rendered day markers all share the same convention,
//! so a transition never lands on different sides of a day boundary
//! depending on which component looks at it.

use chrono::{DateTime, Datelike, Duration, NaiveTime, TimeZone, Utc};

/// Rolling window of live history served to viewers, in days (7 + 1 buffer).
pub const RETENTION_DAYS: i64 = 8;

/// Number of day-start boundaries handed to the layout compiler.
pub const DAY_BOUNDARY_COUNT: usize = 8;

/// Midnight UTC of the day containing `at`.
pub fn start_of_day(at: DateTime<Utc>) -> DateTime<Utc> {
    Utc.from_utc_datetime(&at.date_naive().and_time(NaiveTime::MIN))
}

/// True if both instants fall on the same UTC calendar day.
pub fn same_day(a: DateTime<Utc>, b: DateTime<Utc>) -> bool {
    a.date_naive() == b.date_naive()
}

/// Day-start instants for the last `count` days, newest first
/// (index 0 is the start of today).
pub fn day_starts(now: DateTime<Utc>, count: usize) -> Vec<DateTime<Utc>> {
    let today = start_of_day(now);
    (0..count as i64).map(|i| today - Duration::days(i)).collect()
}

/// Whole days elapsed between `then` and `now`.
pub fn days_between(now: DateTime<Utc>, then: DateTime<Utc>) -> i64 {
    (now - then).num_days()
}

/// Duration text for a block label: `"3 h 12 min"`, or `"42 min"` below
/// one hour.
pub fn hours_minutes_text(minutes: i64) -> String {
    let minutes = minutes.max(0);
    let hours = minutes / 60;
    if hours == 0 {
        format!("{} min", minutes % 60)
    } else {
        format!("{} h {} min", hours, minutes % 60)
    }
}

/// Weekday label for a day marker, e.g. `"Mon 11.08"`.
pub fn weekday_label(at: DateTime<Utc>) -> String {
    format!("{} {:02}.{:02}", at.weekday(), at.day(), at.month())
}

/// Clock-time label for a transition, e.g. `"07:41"`.
pub fn time_label(at: DateTime<Utc>) -> String {
    at.format("%H:%M").to_string()
}

/// Short date-and-time label for the stale summary, e.g. `"Mon 02.03 14:05"`.
pub fn date_time_label(at: DateTime<Utc>) -> String {
    format!(
        "{} {:02}.{:02} {}",
        at.weekday(),
        at.day(),
        at.month(),
        at.format("%H:%M")
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(s: &str) -> DateTime<Utc> {
        s.parse().unwrap()
    }

    #[test]
    fn test_start_of_day_truncates_to_midnight() {
        let d = start_of_day(at("2026-08-11T17:42:10Z"));
        assert_eq!(d, at("2026-08-11T00:00:00Z"));
    }

    #[test]
    fn test_day_starts_newest_first() {
        let starts = day_starts(at("2026-08-11T17:00:00Z"), 3);
        assert_eq!(
            starts,
            vec![
                at("2026-08-11T00:00:00Z"),
                at("2026-08-10T00:00:00Z"),
                at("2026-08-09T00:00:00Z"),
            ]
        );
    }

    #[test]
    fn test_days_between_floors() {
        let now = at("2026-08-11T12:00:00Z");
        assert_eq!(days_between(now, at("2026-08-01T13:00:00Z")), 9);
        assert_eq!(days_between(now, at("2026-08-01T11:00:00Z")), 10);
    }

    #[test]
    fn test_hours_minutes_text() {
        assert_eq!(hours_minutes_text(0), "0 min");
        assert_eq!(hours_minutes_text(42), "42 min");
        assert_eq!(hours_minutes_text(192), "3 h 12 min");
    }

    #[test]
    fn test_weekday_label() {
        let d = Utc.with_ymd_and_hms(2026, 8, 10, 5, 0, 0).unwrap();
        assert_eq!(weekday_label(d), "Mon 10.08");
    }

    #[test]
    fn test_date_time_label() {
        let d = Utc.with_ymd_and_hms(2026, 3, 2, 14, 5, 0).unwrap();
        assert_eq!(date_time_label(d), "Mon 02.03 14:05");
    }
}
