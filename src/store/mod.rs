//! Durable, ordered, append-only transition history.
//!
//! ## Submodules
//!
//! - [`repository`]: storage backends ([`FileRepository`], [`MemoryRepository`])
//! - [`archive`]: month keys and monthly-split detection
//!
//! All mutations (applying a tick decision, bounded deletion, the monthly
//! archive split) run under one mutex, so an out-of-band admin deletion can
//! never interleave with a scheduled append and break the alternation
//! invariant. Readers never take that lock: every successful mutation
//! publishes a fresh snapshot on a watch channel, and reads borrow the
//! latest published value.
//!
//! A persistence failure is logged and the tick's write is abandoned; the
//! in-memory state is kept, so the next successful write catches up. At
//! most one tick's transition is lost if the process dies in between.

pub mod archive;
pub mod repository;

pub use archive::MonthKey;
pub use repository::{FileRepository, MemoryRepository, Repository, StoreError};

use chrono::{DateTime, Duration, Utc};
use tokio::sync::{watch, Mutex};
use tracing::{debug, error, info, warn};

use crate::data::debounce::Decision;
use crate::data::timeutil::RETENTION_DAYS;
use crate::data::{
    ArchivedMonth, LastObserved, StatusSnapshot, StoredHistory, StoredStatus, Transition,
};

/// Days of live entries kept after a monthly split (retention window plus a
/// small buffer so early-month queries still have local data).
const ARCHIVE_TRIM_DAYS: i64 = 9;

/// Most transitions a single deletion request may remove.
const MAX_DELETE_COUNT: usize = 2;

/// Owner of the durable history and the last-observed state.
#[derive(Debug)]
pub struct HistoryStore {
    inner: Mutex<StoreInner>,
    snapshot_tx: watch::Sender<StatusSnapshot>,
}

#[derive(Debug)]
struct StoreInner {
    repo: Box<dyn Repository>,
    last_observed: LastObserved,
    /// Full live history, newest first. Grown only by `apply`.
    history: Vec<Transition>,
}

impl StoreInner {
    fn document(&self) -> StoredHistory {
        StoredHistory {
            last_status: StoredStatus {
                status: self.last_observed.raw_status,
                check_date: self.last_observed.checked_at,
            },
            history: self.history.clone(),
        }
    }

    fn unfiltered_snapshot(&self) -> StatusSnapshot {
        StatusSnapshot {
            status: self.last_observed.status,
            last_check_at: self.last_observed.checked_at,
            last_check_status: self.last_observed.raw_status,
            history: self.history.clone(),
        }
    }
}

impl HistoryStore {
    /// Open a store over `repo`, restoring state from the durable document.
    ///
    /// A missing document yields an empty store; an unreadable or corrupt
    /// one is logged and likewise treated as empty; serving continues and
    /// the next successful write replaces it.
    pub fn open(repo: Box<dyn Repository>, now: DateTime<Utc>) -> Self {
        let restored = match repo.load() {
            Ok(doc) => doc,
            Err(e) => {
                error!("could not restore history, starting empty: {e}");
                None
            }
        };

        let (last_observed, history) = match restored {
            Some(doc) => (
                LastObserved {
                    status: doc.last_status.status,
                    checked_at: doc.last_status.check_date,
                    raw_status: doc.last_status.status,
                },
                doc.history,
            ),
            None => (
                LastObserved {
                    status: false,
                    checked_at: now,
                    raw_status: false,
                },
                Vec::new(),
            ),
        };

        let inner = StoreInner {
            repo,
            last_observed,
            history,
        };
        let (snapshot_tx, _) = watch::channel(inner.unfiltered_snapshot());
        Self {
            inner: Mutex::new(inner),
            snapshot_tx,
        }
    }

    /// The confirmed status restored from storage (seeds the debouncer).
    pub async fn confirmed_status(&self) -> bool {
        self.inner.lock().await.last_observed.status
    }

    /// Apply one tick's debounce decision: update the last-observed state
    /// and append the committed transition, if any.
    ///
    /// The durable document is rewritten when a transition commits or the
    /// raw outcome agrees with the confirmed status; while a loss is still
    /// unconfirmed only the in-memory view moves, so a blip never touches
    /// the disk at all.
    pub async fn apply(&self, decision: Decision) {
        let mut inner = self.inner.lock().await;
        inner.last_observed = decision.observed;

        if let Some(transition) = decision.committed {
            info!(
                to_status = transition.to_status,
                changed_at = %transition.changed_at,
                "status transition committed"
            );
            inner.history.insert(0, transition);
        }

        let pending = decision.committed.is_none()
            && decision.observed.raw_status != decision.observed.status;
        if !pending {
            if let Err(e) = inner.repo.store(&inner.document()) {
                error!("persisting history failed, keeping in-memory state: {e}");
            }
        }

        self.snapshot_tx.send_replace(inner.unfiltered_snapshot());
    }

    /// Retention-filtered live view.
    pub async fn snapshot(&self, now: DateTime<Utc>) -> StatusSnapshot {
        let mut snapshot = self.snapshot_tx.borrow().clone();
        snapshot.history = retention_filter(&snapshot.history, now);
        snapshot
    }

    /// Receiver for the unfiltered snapshot stream. Render loops may poll
    /// this freely; no store lock is involved.
    pub fn subscribe(&self) -> watch::Receiver<StatusSnapshot> {
        self.snapshot_tx.subscribe()
    }

    /// Split a completed prior month into its write-once archive file and
    /// trim the live log.
    ///
    /// Triggered when the newest transition predates the current calendar
    /// month. An already-existing archive counts as success, so repeated
    /// boundary detection is harmless. Returns whether a boundary was
    /// handled.
    pub async fn monthly_archive(&self, now: DateTime<Utc>) -> Result<bool, StoreError> {
        let mut inner = self.inner.lock().await;

        let Some(key) = archive::month_to_archive(&inner.history, now) else {
            return Ok(false);
        };

        let doc = ArchivedMonth {
            history: archive::transitions_in_month(&inner.history, key),
        };
        if inner.repo.store_archive(key, &doc)? {
            info!(month = %key, entries = doc.history.len(), "archived month");
        } else {
            // Re-triggers every tick until a new-month transition commits;
            // keep the repeat quiet.
            debug!(month = %key, "archive already present, skipping");
        }

        // Keep the working file small while still serving early-month
        // queries; never drop the newest entry.
        let trim_cutoff = now - Duration::days(ARCHIVE_TRIM_DAYS);
        let trimmed: Vec<Transition> = inner
            .history
            .iter()
            .enumerate()
            .filter(|(i, t)| *i == 0 || t.changed_at >= trim_cutoff)
            .map(|(_, t)| *t)
            .collect();
        if trimmed.len() != inner.history.len() {
            inner.history = trimmed;
            if let Err(e) = inner.repo.store(&inner.document()) {
                error!("persisting trimmed history failed: {e}");
            }
            self.snapshot_tx.send_replace(inner.unfiltered_snapshot());
        }

        Ok(true)
    }

    /// Remove `count` transitions starting at index `start`.
    ///
    /// `count` is capped at 2 to bound accidental data loss, and the range
    /// must lie fully within the log. Returns `false` without mutating on
    /// any validation failure.
    pub async fn delete_range(&self, start: usize, count: usize) -> bool {
        let mut inner = self.inner.lock().await;

        if count == 0 || count > MAX_DELETE_COUNT {
            warn!(start, count, "rejected history deletion: bad count");
            return false;
        }
        if start >= inner.history.len() || start + count > inner.history.len() {
            warn!(start, count, "rejected history deletion: out of bounds");
            return false;
        }

        inner.history.drain(start..start + count);
        info!(start, count, "deleted history entries");

        if let Err(e) = inner.repo.store(&inner.document()) {
            error!("persisting history after deletion failed: {e}");
        }
        self.snapshot_tx.send_replace(inner.unfiltered_snapshot());
        true
    }
}

/// Keep only transitions within the rolling retention window. If everything
/// is older, keep the single newest transition so the live view is never
/// empty.
pub fn retention_filter(history: &[Transition], now: DateTime<Utc>) -> Vec<Transition> {
    let cutoff = now - Duration::days(RETENTION_DAYS);
    let recent: Vec<Transition> = history
        .iter()
        .filter(|t| t.changed_at >= cutoff)
        .copied()
        .collect();

    if recent.is_empty() {
        history.first().map(|t| vec![*t]).unwrap_or_default()
    } else {
        recent
    }
}
