//! # powerwatch
//!
//! A monitor that turns noisy, periodic reachability probes of a single
//! endpoint into a trustworthy log of power state transitions, and compiles
//! that log into a non-overlapping visual timeline.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                           App (tick)                         │
//! │  ┌─────────┐    ┌──────────┐    ┌─────────┐                  │
//! │  │  probe  │───▶│ debounce │───▶│  store  │──▶ JSON document │
//! │  │ (check) │    │ (filter) │    │(durable)│    + archives    │
//! │  └─────────┘    └──────────┘    └────┬────┘                  │
//! │                                      │ snapshot              │
//! │                                      ▼                       │
//! │                                ┌──────────┐                  │
//! │                                │  layout  │──▶ Presenter     │
//! │                                │ (compile)│    (external)    │
//! │                                └──────────┘                  │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! - **[`probe`]**: probe source abstraction ([`ProbeSource`] trait) with an
//!   HTTP implementation and a scripted one for tests
//! - **[`data`]**: the pure core (debounce state machine, timeline layout
//!   compiler, and the stable on-disk schema)
//! - **[`store`]**: durable append-only history with retention filtering,
//!   monthly cold-archival and bounded admin deletion
//! - **[`app`]**: per-tick orchestration plus the admin/query surface
//!
//! ## Debouncing
//!
//! Hysteresis is asymmetric: a restoration commits on a single positive
//! probe, a loss needs three consecutive negative probes and is back-dated
//! by the confirmation lag. Transient one- or two-tick blips never reach
//! the durable history.
//!
//! ```
//! use chrono::{Duration, Utc};
//! use powerwatch::{Debouncer, ProbeOutcome};
//!
//! let mut debouncer = Debouncer::new(true, Duration::minutes(1));
//! let decision = debouncer.record(ProbeOutcome {
//!     reachable: false,
//!     checked_at: Utc::now(),
//! });
//! // One miss is not an outage.
//! assert!(decision.committed.is_none());
//! ```
//!
//! ## Compiling a timeline
//!
//! The layout compiler is a pure function of a history snapshot and "now";
//! it may be called freely (e.g. once per second) without synchronization.
//!
//! ```
//! use chrono::Utc;
//! use powerwatch::{compile, LayoutContext, Timeline};
//!
//! let now = Utc::now();
//! let timeline = compile(&[], now, &LayoutContext::for_now(now));
//! assert!(matches!(timeline, Timeline::Blocks(blocks) if blocks.is_empty()));
//! ```

pub mod app;
pub mod config;
pub mod data;
pub mod probe;
pub mod store;

// Re-export main types for convenience
pub use app::App;
pub use config::Settings;
pub use data::{
    compile, Debouncer, Decision, LastObserved, LayoutBlock, LayoutContext, ProbeOutcome,
    StatusSnapshot, Timeline, Transition,
};
pub use probe::{HttpProbe, ProbeSource, ScriptedProbe};
pub use store::{FileRepository, HistoryStore, MemoryRepository, Repository};
