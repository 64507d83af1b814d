//! Monthly archival split: month keys and boundary detection.
//!
//! A full calendar month of history moves into a separate write-once file
//! once the live log's newest transition is from a month strictly before
//! the current one. Detection compares calendar months, not wall-clock
//! deltas, so the split triggers once per month-boundary crossing rather
//! than on every tick.

use chrono::{DateTime, Datelike, Utc};

use crate::data::Transition;

/// Identifies one calendar month (UTC), e.g. `2026-07`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MonthKey {
    pub year: i32,
    pub month: u32,
}

impl MonthKey {
    pub fn new(year: i32, month: u32) -> Self {
        Self { year, month }
    }

    /// The month containing `at`.
    pub fn of(at: DateTime<Utc>) -> Self {
        Self {
            year: at.year(),
            month: at.month(),
        }
    }
}

impl std::fmt::Display for MonthKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

/// The month to archive, if the newest transition predates the current
/// month. Returns `None` while the log is empty or current.
pub fn month_to_archive(history: &[Transition], now: DateTime<Utc>) -> Option<MonthKey> {
    let newest = history.first()?;
    let newest_month = MonthKey::of(newest.changed_at);
    (newest_month < MonthKey::of(now)).then_some(newest_month)
}

/// The transitions belonging to one calendar month.
pub fn transitions_in_month(history: &[Transition], key: MonthKey) -> Vec<Transition> {
    history
        .iter()
        .filter(|t| MonthKey::of(t.changed_at) == key)
        .copied()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn t(s: &str) -> Transition {
        Transition {
            to_status: true,
            changed_at: s.parse().unwrap(),
        }
    }

    #[test]
    fn test_month_key_display() {
        assert_eq!(MonthKey::new(2026, 7).to_string(), "2026-07");
    }

    #[test]
    fn test_month_key_ordering_across_years() {
        assert!(MonthKey::new(2025, 12) < MonthKey::new(2026, 1));
        assert!(MonthKey::new(2026, 7) < MonthKey::new(2026, 8));
    }

    #[test]
    fn test_no_archive_within_current_month() {
        let now = "2026-08-11T12:00:00Z".parse().unwrap();
        let history = vec![t("2026-08-10T12:00:00Z"), t("2026-07-30T12:00:00Z")];
        assert_eq!(month_to_archive(&history, now), None);
    }

    #[test]
    fn test_archive_triggers_after_month_rollover() {
        // First tick of August with a July-only log.
        let now = "2026-08-01T00:01:00Z".parse().unwrap();
        let history = vec![t("2026-07-30T12:00:00Z"), t("2026-07-02T09:00:00Z")];
        assert_eq!(
            month_to_archive(&history, now),
            Some(MonthKey::new(2026, 7))
        );
    }

    #[test]
    fn test_empty_log_never_archives() {
        let now = "2026-08-11T12:00:00Z".parse().unwrap();
        assert_eq!(month_to_archive(&[], now), None);
    }

    #[test]
    fn test_transitions_in_month_filters() {
        let history = vec![
            t("2026-08-01T12:00:00Z"),
            t("2026-07-30T12:00:00Z"),
            t("2026-07-02T09:00:00Z"),
        ];
        let july = transitions_in_month(&history, MonthKey::new(2026, 7));
        assert_eq!(july.len(), 2);
    }
}
