//! Application orchestration: the per-tick pipeline and the admin surface.

use chrono::{DateTime, Duration, Utc};
use tracing::{error, info};

use crate::data::{compile, Debouncer, LayoutContext, StatusSnapshot, Timeline};
use crate::probe::ProbeSource;
use crate::store::HistoryStore;

/// Owns the probe, the debouncer and the store, and runs one
/// probe → debounce → persist pass per scheduler tick.
///
/// The probe and debouncer are exclusive to the tick pipeline; the store
/// serializes its own mutations, so the admin operations here may be called
/// from other tasks while ticks are running.
pub struct App {
    probe: Box<dyn ProbeSource>,
    debouncer: Debouncer,
    store: HistoryStore,
    maintenance: bool,
}

impl App {
    /// Build an app over an opened store, seeding the debouncer's confirmed
    /// status from the restored state.
    pub async fn new(
        probe: Box<dyn ProbeSource>,
        store: HistoryStore,
        tick_interval: Duration,
    ) -> Self {
        let confirmed = store.confirmed_status().await;
        info!(
            probe = probe.description(),
            confirmed, "monitor initialized"
        );
        Self {
            probe,
            debouncer: Debouncer::new(confirmed, tick_interval),
            store,
            maintenance: false,
        }
    }

    /// Run one scheduler tick. Skipped entirely in maintenance mode.
    pub async fn tick(&mut self) {
        if self.maintenance {
            return;
        }

        // Month-boundary check runs before the append: the first tick of a
        // new month has to see the previous month's entries as newest.
        if let Err(e) = self.store.monthly_archive(Utc::now()).await {
            error!("monthly archive failed: {e}");
        }

        let outcome = self.probe.check().await;
        let decision = self.debouncer.record(outcome);
        self.store.apply(decision).await;
    }

    /// Suspend or resume probing without touching history. Returns the new
    /// mode.
    pub fn toggle_maintenance(&mut self) -> bool {
        self.maintenance = !self.maintenance;
        info!(maintenance = self.maintenance, "maintenance mode toggled");
        self.maintenance
    }

    /// Whether probing is currently suspended.
    pub fn maintenance(&self) -> bool {
        self.maintenance
    }

    /// Admin deletion of a bounded history range.
    pub async fn delete_history_range(&self, start: usize, count: usize) -> bool {
        self.store.delete_range(start, count).await
    }

    /// Query boundary: the retention-filtered live view.
    pub async fn snapshot(&self) -> StatusSnapshot {
        self.store.snapshot(Utc::now()).await
    }

    /// Compile the current timeline with the given coefficients.
    pub async fn timeline(&self, now: DateTime<Utc>, ctx: &LayoutContext) -> Timeline {
        let snapshot = self.store.snapshot(now).await;
        compile(&snapshot.history, now, ctx)
    }

    /// Access to the underlying store (e.g. for snapshot subscriptions).
    pub fn store(&self) -> &HistoryStore {
        &self.store
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::probe::ScriptedProbe;
    use crate::store::MemoryRepository;

    fn app_with_script(script: &[bool], start_confirmed: bool) -> (App, DateTime<Utc>) {
        // Anchor the script at the wall clock so retention filtering keeps
        // everything this test produces.
        let start = Utc::now() - Duration::hours(1);
        let probe = ScriptedProbe::new(script.to_vec(), start, Duration::minutes(1));

        let store = HistoryStore::open(Box::new(MemoryRepository::new()), start);
        let app = App {
            probe: Box::new(probe),
            debouncer: Debouncer::new(start_confirmed, Duration::minutes(1)),
            store,
            maintenance: false,
        };
        (app, start)
    }

    #[tokio::test]
    async fn test_confirmed_loss_flows_into_store() {
        let (mut app, start) = app_with_script(&[true, false, false, false], true);
        for _ in 0..4 {
            app.tick().await;
        }

        let snapshot = app.snapshot().await;
        assert!(!snapshot.status);
        assert_eq!(snapshot.history.len(), 1);
        assert!(!snapshot.history[0].to_status);
        // Third false at start+3min, back-dated by 3 minutes.
        assert_eq!(snapshot.history[0].changed_at, start);
    }

    #[tokio::test]
    async fn test_blip_commits_nothing() {
        let (mut app, _) = app_with_script(&[true, true, false, true, true], true);
        for _ in 0..5 {
            app.tick().await;
        }

        let snapshot = app.snapshot().await;
        assert!(snapshot.status);
        assert!(snapshot.history.is_empty());
    }

    #[tokio::test]
    async fn test_maintenance_skips_probing() {
        let (mut app, _) = app_with_script(&[false, false, false, false], true);

        assert!(app.toggle_maintenance());
        for _ in 0..4 {
            app.tick().await;
        }

        // No probe ran: the script is untouched and nothing was recorded.
        let snapshot = app.snapshot().await;
        assert!(snapshot.history.is_empty());

        // Resume and confirm the loss.
        assert!(!app.toggle_maintenance());
        for _ in 0..3 {
            app.tick().await;
        }
        assert_eq!(app.snapshot().await.history.len(), 1);
    }

    #[tokio::test]
    async fn test_timeline_from_live_snapshot() {
        let (mut app, _) = app_with_script(&[false, false, false, true], true);
        for _ in 0..4 {
            app.tick().await;
        }

        let now = Utc::now();
        let timeline = app.timeline(now, &LayoutContext::for_now(now)).await;
        let Timeline::Blocks(blocks) = timeline else {
            panic!("expected blocks");
        };
        // Loss then restoration, newest first.
        assert_eq!(blocks.len(), 2);
        assert!(blocks[0].to_status);
        assert!(!blocks[1].to_status);
    }

    #[tokio::test]
    async fn test_admin_deletion_forwards_to_store() {
        let (mut app, _) = app_with_script(&[false, false, false, true], true);
        for _ in 0..4 {
            app.tick().await;
        }
        assert_eq!(app.snapshot().await.history.len(), 2);

        assert!(!app.delete_history_range(0, 3).await);
        assert!(app.delete_history_range(0, 2).await);
        assert!(app.snapshot().await.history.is_empty());
    }
}
