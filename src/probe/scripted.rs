//! Scripted probe: replays canned outcomes for tests and demos.

use std::collections::VecDeque;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};

use super::ProbeSource;
use crate::data::ProbeOutcome;

/// A probe source that replays a fixed outcome sequence.
///
/// Each call pops the next scripted outcome and advances the reported check
/// time by one tick, so debouncer behavior is reproducible without real
/// wall-clock waits. Once the script runs out, the last value repeats.
#[derive(Debug)]
pub struct ScriptedProbe {
    script: VecDeque<bool>,
    last: bool,
    next_at: DateTime<Utc>,
    tick: Duration,
}

impl ScriptedProbe {
    /// Create a scripted probe starting at `start`, advancing `tick` per
    /// check.
    pub fn new(script: impl IntoIterator<Item = bool>, start: DateTime<Utc>, tick: Duration) -> Self {
        let script: VecDeque<bool> = script.into_iter().collect();
        let last = script.back().copied().unwrap_or(false);
        Self {
            script,
            last,
            next_at: start,
            tick,
        }
    }

    /// Outcomes remaining in the script.
    pub fn remaining(&self) -> usize {
        self.script.len()
    }
}

#[async_trait]
impl ProbeSource for ScriptedProbe {
    async fn check(&mut self) -> ProbeOutcome {
        let reachable = self.script.pop_front().unwrap_or(self.last);
        let checked_at = self.next_at;
        self.next_at += self.tick;
        ProbeOutcome {
            reachable,
            checked_at,
        }
    }

    fn description(&self) -> &str {
        "scripted"
    }
}
