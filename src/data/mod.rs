//! Data models and the pure processing core.
//!
//! ## Submodules
//!
//! - [`status`]: probe outcomes, transitions, snapshots, and the stable
//!   on-disk schema
//! - [`debounce`]: the 3-strike hysteresis filter turning raw probes into
//!   confirmed transitions
//! - [`layout`]: the timeline layout compiler producing renderable blocks
//! - [`timeutil`]: UTC day-boundary and label helpers
//!
//! ## Data Flow
//!
//! ```text
//! ProbeOutcome (one per tick)
//!        │
//!        ▼
//! Debouncer::record()
//!        │
//!        ├──▶ Transition (committed) ──▶ HistoryStore
//!        │
//!        └──▶ LastObserved (every tick)
//!
//! StatusSnapshot ──▶ layout::compile() ──▶ Timeline (per render call)
//! ```

pub mod debounce;
pub mod layout;
pub mod status;
pub mod timeutil;

pub use debounce::{Debouncer, Decision, CONFIRMATION_THRESHOLD};
pub use layout::{
    compile, DayAnchor, DayMarker, DayMarkers, LayoutBlock, LayoutContext, StaleSummary, Timeline,
};
pub use status::{
    alternates, ArchivedMonth, LastObserved, ProbeOutcome, StatusSnapshot, StoredHistory,
    StoredStatus, Transition,
};
