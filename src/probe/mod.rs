//! Probe source abstraction for reachability checks.
//!
//! This module provides a trait-based abstraction over the actual probe
//! transport. Production uses [`HttpProbe`] (one bare GET per tick, bounded
//! by a timeout); tests and demos use [`ScriptedProbe`], which replays a
//! canned outcome sequence without touching the network.

mod http;
mod scripted;

pub use http::HttpProbe;
pub use scripted::ScriptedProbe;

use async_trait::async_trait;

use crate::data::ProbeOutcome;

/// One reachability check per call.
///
/// Implementations never fail: a timeout, DNS error or refused connection
/// is just a negative outcome for the debouncer, not an error to handle.
#[async_trait]
pub trait ProbeSource: Send + std::fmt::Debug {
    /// Perform one check and report the outcome with its completion time.
    async fn check(&mut self) -> ProbeOutcome;

    /// Human-readable description of the probe target, for logs.
    fn description(&self) -> &str;
}
