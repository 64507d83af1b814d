//! Core status types and the stable on-disk schema.
//!
//! The serde renames on [`StoredHistory`] and friends pin the JSON document
//! layout produced by earlier deployments; existing storage files must keep
//! loading unchanged. Timestamps serialize as RFC 3339 strings.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One raw reachability check. Produced by a probe source each tick and
/// consumed immediately by the debouncer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProbeOutcome {
    /// Whether the endpoint answered at all (any HTTP response counts).
    pub reachable: bool,
    /// When the check completed.
    pub checked_at: DateTime<Utc>,
}

/// A confirmed, timestamped change of the monitored state.
///
/// Immutable once committed. A history is an ordered sequence of
/// transitions, newest first, with strictly alternating `to_status`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transition {
    /// The state the endpoint changed to.
    #[serde(rename = "changedToStatus")]
    pub to_status: bool,
    /// When the change is believed to have happened (loss transitions are
    /// back-dated to compensate for confirmation lag).
    #[serde(rename = "dateOfChange")]
    pub changed_at: DateTime<Utc>,
}

/// The latest raw observation, updated every tick whether or not a
/// transition was committed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LastObserved {
    /// The confirmed status (unchanged while a loss is still unconfirmed).
    pub status: bool,
    /// When the last probe completed.
    pub checked_at: DateTime<Utc>,
    /// What the last probe actually reported.
    pub raw_status: bool,
}

/// Read-side view of the store: confirmed status, last raw check, and the
/// retention-filtered history. Cloned out of the store; never shared
/// mutable state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusSnapshot {
    /// Confirmed status.
    pub status: bool,
    /// When the endpoint was last probed.
    pub last_check_at: DateTime<Utc>,
    /// Raw outcome of that probe.
    pub last_check_status: bool,
    /// Committed transitions within the retention window, newest first.
    pub history: Vec<Transition>,
}

/// `lastStatus` object of the durable document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredStatus {
    pub status: bool,
    #[serde(rename = "checkDate")]
    pub check_date: DateTime<Utc>,
}

/// The durable JSON document: last raw check plus the full live history,
/// newest first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredHistory {
    #[serde(rename = "lastStatus")]
    pub last_status: StoredStatus,
    pub history: Vec<Transition>,
}

/// One archived calendar month: `{"history": [...]}`, write-once.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArchivedMonth {
    pub history: Vec<Transition>,
}

/// Checks the strict-alternation invariant: no two adjacent transitions
/// share `to_status`.
pub fn alternates(history: &[Transition]) -> bool {
    history.windows(2).all(|w| w[0].to_status != w[1].to_status)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn t(s: &str, status: bool) -> Transition {
        Transition {
            to_status: status,
            changed_at: s.parse().unwrap(),
        }
    }

    #[test]
    fn test_wire_format_key_spelling() {
        let doc = StoredHistory {
            last_status: StoredStatus {
                status: true,
                check_date: "2026-08-11T17:00:00Z".parse().unwrap(),
            },
            history: vec![t("2026-08-11T07:41:00Z", true)],
        };

        let json = serde_json::to_value(&doc).unwrap();
        assert!(json.get("lastStatus").is_some());
        assert!(json["lastStatus"].get("checkDate").is_some());
        assert!(json["history"][0].get("changedToStatus").is_some());
        assert!(json["history"][0].get("dateOfChange").is_some());
    }

    #[test]
    fn test_wire_format_round_trip() {
        let raw = r#"{
            "lastStatus": { "status": false, "checkDate": "2026-08-11T17:00:00Z" },
            "history": [
                { "changedToStatus": false, "dateOfChange": "2026-08-11T16:30:00Z" },
                { "changedToStatus": true, "dateOfChange": "2026-08-11T07:41:00Z" }
            ]
        }"#;

        let doc: StoredHistory = serde_json::from_str(raw).unwrap();
        assert!(!doc.last_status.status);
        assert_eq!(doc.history.len(), 2);
        assert!(doc.history[1].to_status);

        let back: StoredHistory =
            serde_json::from_str(&serde_json::to_string(&doc).unwrap()).unwrap();
        assert_eq!(back, doc);
    }

    #[test]
    fn test_alternates() {
        let good = vec![
            t("2026-08-11T16:30:00Z", false),
            t("2026-08-11T07:41:00Z", true),
            t("2026-08-10T22:03:00Z", false),
        ];
        assert!(alternates(&good));

        let bad = vec![
            t("2026-08-11T16:30:00Z", false),
            t("2026-08-11T07:41:00Z", false),
        ];
        assert!(!alternates(&bad));

        assert!(alternates(&[]));
        assert!(alternates(&good[..1]));
    }
}
