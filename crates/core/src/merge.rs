//! Per-apartment event merging.
//!
//! Combines two event sequences for one apartment (its two OTA feeds, or the
//! merged OTAs with the manual-sheet feed) into one deduplicated sequence
//! bounded to the relevant booking horizon.

use std::collections::HashSet;

use chrono::{Duration, NaiveDateTime};
use staysync_domain::constants::BOOKING_HORIZON_DAYS;
use staysync_domain::{apply_default_hours, Origin, SourceEvent, StayBoundary};
use tracing::debug;

/// Tag untagged events with the origin of the feed they came from.
///
/// Events that already carry an origin keep it.
pub fn tag_origin(mut events: Vec<SourceEvent>, origin: Origin) -> Vec<SourceEvent> {
    for event in &mut events {
        event.origin.get_or_insert(origin);
    }
    events
}

/// Merge two event sequences into one.
///
/// Every timestamp first gets the default check-in/check-out hours (a
/// midnight value is a date-only input; OTA feeds deliver those), so a
/// date-only OTA window and the sheet's copy of the same stay compare equal.
/// Keeps only events ending today-or-later and starting within the next 365
/// days, then removes exact `(start, end)` duplicates keep-first: two sources
/// reporting the identical stay window are taken to be the same physical
/// booking. Near-identical windows are NOT merged — a one-minute skew between
/// sources survives as two events. No output order is guaranteed; downstream
/// components sort when order matters.
pub fn merge_feeds(
    first: Vec<SourceEvent>,
    second: Vec<SourceEvent>,
    now: NaiveDateTime,
) -> Vec<SourceEvent> {
    let horizon = now + Duration::days(BOOKING_HORIZON_DAYS);
    let total = first.len() + second.len();

    let mut seen: HashSet<(NaiveDateTime, NaiveDateTime)> = HashSet::new();
    let mut merged = Vec::new();

    for mut event in first.into_iter().chain(second) {
        event.start = apply_default_hours(event.start, StayBoundary::CheckIn);
        event.end = apply_default_hours(event.end, StayBoundary::CheckOut);

        if event.end < now || event.start > horizon {
            continue;
        }
        if seen.insert((event.start, event.end)) {
            merged.push(event);
        }
    }

    debug!(total, kept = merged.len(), "merged event feeds");
    merged
}
