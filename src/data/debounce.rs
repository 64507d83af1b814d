//! Debounce state machine separating real outages from transient noise.
//!
//! Hysteresis is asymmetric: a restoration is trusted on a single
//! observation, a loss needs three confirming probes in a row. A confirmed
//! loss is back-dated by the time spent confirming, so the recorded instant
//! estimates when power actually went away rather than when the third
//! negative probe landed.

use chrono::Duration;

use super::status::{LastObserved, ProbeOutcome, Transition};

/// Consecutive negative probes required before a loss is committed.
pub const CONFIRMATION_THRESHOLD: u8 = 3;

/// Result of feeding one probe outcome through the debouncer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Decision {
    /// A confirmed transition, if this outcome committed one.
    pub committed: Option<Transition>,
    /// Updated last-observed view; produced on every tick.
    pub observed: LastObserved,
}

/// Stateful filter turning raw probe outcomes into confirmed transitions.
///
/// The strike counter is in-memory only. After a process restart it starts
/// at zero, which can re-open a short confirmation window for a loss that
/// was already in progress; accepted limitation.
#[derive(Debug, Clone)]
pub struct Debouncer {
    confirmed: bool,
    strikes: u8,
    tick_interval: Duration,
}

impl Debouncer {
    /// Create a debouncer with the given confirmed starting status and the
    /// scheduler tick interval (used to back-date confirmed losses).
    pub fn new(confirmed: bool, tick_interval: Duration) -> Self {
        Self {
            confirmed,
            strikes: 0,
            tick_interval,
        }
    }

    /// The currently confirmed status.
    pub fn confirmed(&self) -> bool {
        self.confirmed
    }

    /// Strikes accumulated toward an unconfirmed loss (0 when idle).
    pub fn strikes(&self) -> u8 {
        self.strikes
    }

    /// Feed one probe outcome through the state machine.
    pub fn record(&mut self, outcome: ProbeOutcome) -> Decision {
        let committed = if outcome.reachable == self.confirmed {
            // Steady state; also cancels any loss confirmation in progress.
            self.strikes = 0;
            None
        } else if outcome.reachable {
            // Restoration is trusted immediately. If strikes were pending,
            // the blip never made it into history.
            self.strikes = 0;
            self.confirmed = true;
            Some(Transition {
                to_status: true,
                changed_at: outcome.checked_at,
            })
        } else {
            self.strikes += 1;
            if self.strikes < CONFIRMATION_THRESHOLD {
                None
            } else {
                self.strikes = 0;
                self.confirmed = false;
                Some(Transition {
                    to_status: false,
                    changed_at: outcome.checked_at - self.retry_window(),
                })
            }
        };

        Decision {
            committed,
            observed: LastObserved {
                status: self.confirmed,
                checked_at: outcome.checked_at,
                raw_status: outcome.reachable,
            },
        }
    }

    /// Lag between the actual loss instant and the confirming probe:
    /// one tick until the first negative probe plus one tick per further
    /// strike (3 minutes at a 60s tick).
    fn retry_window(&self) -> Duration {
        self.tick_interval * i32::from(CONFIRMATION_THRESHOLD)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, Utc};

    fn tick() -> Duration {
        Duration::minutes(1)
    }

    fn run(start: bool, outcomes: &[bool]) -> (Debouncer, Vec<Transition>) {
        let mut debouncer = Debouncer::new(start, tick());
        let t0: DateTime<Utc> = "2026-08-11T12:00:00Z".parse().unwrap();

        let mut committed = Vec::new();
        for (i, &reachable) in outcomes.iter().enumerate() {
            let decision = debouncer.record(ProbeOutcome {
                reachable,
                checked_at: t0 + tick() * i as i32,
            });
            committed.extend(decision.committed);
        }
        (debouncer, committed)
    }

    #[test]
    fn test_noise_suppression() {
        // Single and double misses never reach history.
        let (debouncer, committed) = run(true, &[true, true, false, true, true]);
        assert!(committed.is_empty());
        assert!(debouncer.confirmed());
        assert_eq!(debouncer.strikes(), 0);
    }

    #[test]
    fn test_double_miss_suppressed() {
        let (_, committed) = run(true, &[true, false, false, true]);
        assert!(committed.is_empty());
    }

    #[test]
    fn test_confirmed_loss_backdated() {
        let (debouncer, committed) = run(true, &[true, false, false, false]);
        assert_eq!(committed.len(), 1);
        assert!(!committed[0].to_status);
        // Third false lands at t0 + 3 min; change is back-dated 3 minutes.
        let expected: DateTime<Utc> = "2026-08-11T12:00:00Z".parse().unwrap();
        assert_eq!(committed[0].changed_at, expected);
        assert!(!debouncer.confirmed());
    }

    #[test]
    fn test_early_recovery_resets_strikes() {
        let mut debouncer = Debouncer::new(true, tick());
        let t0: DateTime<Utc> = "2026-08-11T12:00:00Z".parse().unwrap();

        for i in 0..2 {
            let d = debouncer.record(ProbeOutcome {
                reachable: false,
                checked_at: t0 + tick() * i,
            });
            assert!(d.committed.is_none());
            // Confirmed status holds while the loss is pending.
            assert!(d.observed.status);
            assert!(!d.observed.raw_status);
        }
        assert_eq!(debouncer.strikes(), 2);

        // Recovery while pending: no transition (status never changed),
        // counter cleared.
        let d = debouncer.record(ProbeOutcome {
            reachable: true,
            checked_at: t0 + tick() * 2,
        });
        assert!(d.committed.is_none());
        assert_eq!(debouncer.strikes(), 0);
        assert!(debouncer.confirmed());
    }

    #[test]
    fn test_restore_commits_on_single_observation() {
        let mut debouncer = Debouncer::new(false, tick());
        let at: DateTime<Utc> = "2026-08-11T12:00:00Z".parse().unwrap();

        let d = debouncer.record(ProbeOutcome {
            reachable: true,
            checked_at: at,
        });
        let committed = d.committed.unwrap();
        assert!(committed.to_status);
        // No back-dating on restore.
        assert_eq!(committed.changed_at, at);
    }

    #[test]
    fn test_full_cycle_alternates() {
        let (_, committed) = run(
            true,
            &[true, false, false, false, false, true, false, false, false],
        );
        let statuses: Vec<bool> = committed.iter().map(|t| t.to_status).collect();
        assert_eq!(statuses, vec![false, true, false]);
        assert!(crate::data::status::alternates(
            &committed.iter().rev().copied().collect::<Vec<_>>()
        ));
    }

    #[test]
    fn test_observed_updates_every_tick() {
        let mut debouncer = Debouncer::new(true, tick());
        let at: DateTime<Utc> = "2026-08-11T12:00:00Z".parse().unwrap();

        let d = debouncer.record(ProbeOutcome {
            reachable: true,
            checked_at: at,
        });
        assert!(d.committed.is_none());
        assert_eq!(d.observed.checked_at, at);
        assert!(d.observed.raw_status);
    }
}
