//! Timeline layout compiler.
//!
//! Pure transformation of a transition history plus "now" into a sequence of
//! renderable blocks: pixel heights, day-of-week markers and label offsets,
//! with marker/label collisions already resolved. Every call is independent
//! and reproducible from its inputs alone; the compiler holds no state.
//!
//! A block covers the span from its transition up to the next newer
//! transition (or "now" for the newest block). Heights scale linearly with
//! elapsed minutes, but each block reserves a minimum footprint for its text
//! lines; only blocks taller than that footprint get padding, and only
//! padded blocks are allowed to move their labels.

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;

use super::timeutil::{
    date_time_label, days_between, hours_minutes_text, same_day, start_of_day, time_label,
    weekday_label,
};
use crate::data::Transition;

/// Rendering coefficients plus the day-boundary grid, fixed per compile call.
#[derive(Debug, Clone)]
pub struct LayoutContext {
    /// Minutes of real time represented by one pixel of height.
    pub minutes_per_pixel: f64,
    /// Height of one text line in pixels.
    pub line_height: f64,
    /// Day-start instants to mark, newest first. The oldest one doubles as
    /// the retention cutoff for displayed blocks.
    pub day_starts: Vec<DateTime<Utc>>,
}

impl LayoutContext {
    /// Canonical coefficients with day boundaries derived from `now`.
    pub fn for_now(now: DateTime<Utc>) -> Self {
        Self {
            minutes_per_pixel: 4.0,
            line_height: 24.0,
            day_starts: super::timeutil::day_starts(now, super::timeutil::DAY_BOUNDARY_COUNT),
        }
    }
}

/// A day-of-week marker inside a block, at its final resolved offset.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DayMarker {
    /// Resolved offset from the block's bottom edge, in pixels.
    pub height: f64,
    /// Weekday label, e.g. `"Mon 11.08"`.
    pub label: String,
    /// The day-start instant this marker points at.
    pub at: DateTime<Utc>,
}

/// Day markers for one block.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum DayMarkers {
    /// No day starts fall inside this block.
    None,
    /// One or more day starts, newest first.
    Markers(Vec<DayMarker>),
}

impl DayMarkers {
    /// Number of markers (0 for `None`).
    pub fn len(&self) -> usize {
        match self {
            DayMarkers::None => 0,
            DayMarkers::Markers(m) => m.len(),
        }
    }

    /// True if there are no markers.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Distance from a block's transition back to the start of its own calendar
/// day. The presenter renders this as the dangling tail under the oldest
/// block.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DayAnchor {
    /// Pixels between the transition and its day start.
    pub height: f64,
    /// Label of that day.
    pub label: String,
}

/// One renderable block of the compiled timeline.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LayoutBlock {
    /// The state this block's transition switched to.
    pub to_status: bool,
    /// When the transition happened.
    pub changed_at: DateTime<Utc>,
    /// Transition label, e.g. `"restored at 07:41"`.
    pub time_text: String,
    /// Duration label, e.g. `"was off for 3 h 12 min"`.
    pub duration_text: String,
    /// Block height in pixels (elapsed minutes scaled and ceiled).
    pub height: f64,
    /// Top padding injected when elapsed time exceeds the text footprint.
    pub added_height: f64,
    /// Resolved offset of the duration label within the padding.
    pub duration_offset: f64,
    /// Day markers at their resolved offsets.
    pub day_markers: DayMarkers,
    /// Distance back to this transition's own day start.
    pub day_anchor: DayAnchor,
}

/// Summary shown when the only known transition predates the display window.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StaleSummary {
    /// The state the endpoint has been in since the transition.
    pub status: bool,
    /// Whole days elapsed since it.
    pub days_ago: i64,
    /// Summary label, e.g. `"on for 10 days straight, since Mon 02.03 14:05"`.
    pub text: String,
    /// When the transition happened.
    pub changed_at: DateTime<Utc>,
}

/// The compiled timeline.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Timeline {
    /// Degenerate case: a single transition older than the display window.
    Stale(StaleSummary),
    /// Blocks within the display window, newest first.
    Blocks(Vec<LayoutBlock>),
}

/// Working state for one block between the collection and finalize passes.
struct DraftBlock {
    to_status: bool,
    changed_at: DateTime<Utc>,
    index: usize,
    raw_height: f64,
    duration_minutes: i64,
    markers: Option<Vec<(f64, String, DateTime<Utc>)>>,
}

/// Compile a transition history (newest first) against `now`.
pub fn compile(history: &[Transition], now: DateTime<Utc>, ctx: &LayoutContext) -> Timeline {
    let cutoff = ctx
        .day_starts
        .last()
        .copied()
        .unwrap_or_else(|| start_of_day(now));

    if history.len() == 1 && history[0].changed_at < cutoff {
        return Timeline::Stale(stale_summary(&history[0], now));
    }

    let drafts = collect_blocks(history, now, cutoff, ctx);
    let blocks = drafts
        .into_iter()
        .map(|draft| finalize_block(draft, ctx))
        .collect();
    Timeline::Blocks(blocks)
}

fn stale_summary(transition: &Transition, now: DateTime<Utc>) -> StaleSummary {
    let days_ago = days_between(now, transition.changed_at);
    let phrase = if transition.to_status { "on" } else { "off" };
    StaleSummary {
        status: transition.to_status,
        days_ago,
        text: format!(
            "{} for {} days straight, since {}",
            phrase,
            days_ago,
            date_time_label(transition.changed_at)
        ),
        changed_at: transition.changed_at,
    }
}

/// First pass: per-block spans, nominal marker heights, and window
/// filtering with the allow-all-last-day rule.
fn collect_blocks(
    history: &[Transition],
    now: DateTime<Utc>,
    cutoff: DateTime<Utc>,
    ctx: &LayoutContext,
) -> Vec<DraftBlock> {
    let mut drafts: Vec<DraftBlock> = Vec::with_capacity(history.len());
    // Once one block from the boundary day is kept, keep all of its
    // siblings from that same day instead of truncating the day mid-way.
    let mut allow_all_last_day = false;
    // Previously processed entry (kept or dropped): its transition time and
    // how many markers it collected. Drives the sibling rule above.
    let mut previous: Option<(DateTime<Utc>, usize)> = None;

    for (index, entry) in history.iter().enumerate() {
        let newer_time = if index == 0 {
            now
        } else {
            history[index - 1].changed_at
        };

        let mut dropped = false;
        let mut markers: Option<Vec<(f64, String, DateTime<Utc>)>> = Some(Vec::new());

        for (j, &day_start) in ctx.day_starts.iter().enumerate() {
            if entry.changed_at < cutoff {
                dropped = true;
                break;
            } else if day_start > entry.changed_at && newer_time > day_start {
                // Day start falls inside this block's span.
                let minutes = minutes_f64(day_start - entry.changed_at);
                if let Some(list) = markers.as_mut() {
                    list.push((
                        minutes / ctx.minutes_per_pixel,
                        weekday_label(day_start),
                        day_start,
                    ));
                }
            } else if newer_time > day_start && entry.changed_at > day_start {
                // Whole block is newer than this day start; older ones
                // can't match either.
                if markers.as_ref().is_some_and(|list| list.is_empty()) {
                    markers = None;
                }
                break;
            } else if day_start > entry.changed_at && j + 2 >= ctx.day_starts.len() {
                // Reached the boundary day at the old edge of the window.
                let last_day_start = ctx.day_starts.get(j + 1).copied().unwrap_or(now);

                if allow_all_last_day {
                    markers = None;
                } else if entry.changed_at > last_day_start {
                    markers = None;
                } else if previous.is_some_and(|(prev_at, prev_markers)| {
                    prev_markers > 1 && same_day(prev_at, entry.changed_at)
                }) {
                    // A near-boundary block already pulled several days in;
                    // keep its same-day siblings too.
                    markers = None;
                    allow_all_last_day = true;
                } else {
                    dropped = true;
                }
                break;
            }
        }

        previous = Some((entry.changed_at, markers.as_ref().map_or(0, Vec::len)));

        if dropped {
            continue;
        }

        let span = newer_time - entry.changed_at;
        drafts.push(DraftBlock {
            to_status: entry.to_status,
            changed_at: entry.changed_at,
            index,
            raw_height: minutes_f64(span) / ctx.minutes_per_pixel,
            duration_minutes: span.num_minutes(),
            markers: match markers {
                Some(list) if list.is_empty() => None,
                other => other,
            },
        });
    }

    drafts
}

/// Second pass: footprint/padding split, label centering, and collision
/// resolution between the duration label and the day markers.
fn finalize_block(draft: DraftBlock, ctx: &LayoutContext) -> LayoutBlock {
    let line_height = ctx.line_height;
    let marker_count = draft.markers.as_ref().map_or(0, Vec::len);

    // Two fixed text lines (transition + duration) plus one per marker.
    let base_height = line_height * (2.0 + marker_count as f64);
    let normalized = draft.raw_height.ceil();
    let added_height = (normalized - base_height).max(0.0);
    let mut duration_offset = added_height / 2.0;

    if let Some(markers) = draft.markers.as_ref() {
        if added_height > 0.0 {
            // The duration label sits last in the block; its nominal start
            // is the footprint minus its own line, plus the centering shift.
            let label_start = base_height - line_height + duration_offset;
            for &(nominal, _, _) in markers {
                let mut marker_start = nominal.ceil();

                // Markers near the next newer block get pushed down first;
                // mirror that shift before measuring clearance.
                let top_diff = normalized - marker_start;
                if marker_start > base_height && top_diff < line_height {
                    marker_start -= line_height - top_diff;
                }

                let diff = label_start - marker_start;
                if diff > 0.0 && diff < line_height {
                    duration_offset += line_height - diff;
                } else if diff > -line_height && diff <= 0.0 {
                    duration_offset -= line_height + diff;
                }
            }
        }
    }

    let day_markers = match draft.markers {
        None => DayMarkers::None,
        Some(markers) => {
            let count = markers.len();
            let resolved = markers
                .into_iter()
                .enumerate()
                .map(|(i, (nominal, label, at))| {
                    let normalized_marker = nominal.ceil();
                    let height = if normalized_marker <= line_height * 2.0 || added_height == 0.0 {
                        // Tight packing: nothing may move.
                        0.0
                    } else {
                        // Stack same-block markers one line apart, then pull
                        // back from the next newer block if too close.
                        let mut h = normalized_marker - line_height * (count - i) as f64;
                        let diff = normalized - normalized_marker;
                        if diff < line_height {
                            h -= line_height - diff;
                        }
                        h
                    };
                    DayMarker { height, label, at }
                })
                .collect();
            DayMarkers::Markers(resolved)
        }
    };

    let duration = hours_minutes_text(draft.duration_minutes);
    let duration_text = match (draft.index == 0, draft.to_status) {
        (true, true) => format!("already on for {duration}"),
        (true, false) => format!("already off for {duration}"),
        (false, true) => format!("was on for {duration}"),
        (false, false) => format!("was off for {duration}"),
    };
    let time_text = if draft.to_status {
        format!("restored at {}", time_label(draft.changed_at))
    } else {
        format!("lost at {}", time_label(draft.changed_at))
    };

    let day_start = start_of_day(draft.changed_at);
    let day_anchor = DayAnchor {
        height: minutes_f64(draft.changed_at - day_start) / ctx.minutes_per_pixel,
        label: weekday_label(day_start),
    };

    LayoutBlock {
        to_status: draft.to_status,
        changed_at: draft.changed_at,
        time_text,
        duration_text,
        height: normalized,
        added_height,
        duration_offset,
        day_markers,
        day_anchor,
    }
}

fn minutes_f64(d: Duration) -> f64 {
    d.num_seconds() as f64 / 60.0
}
