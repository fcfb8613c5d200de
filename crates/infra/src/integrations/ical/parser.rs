//! iCal payload parsing into the uniform source-event contract.

use chrono::{NaiveDateTime, NaiveTime};
use icalendar::{Calendar, CalendarComponent, CalendarDateTime, Component, DatePerhapsTime, EventLike};
use staysync_domain::{Result, SourceEvent, StaySyncError};
use tracing::debug;

/// Parse an `.ics` payload into source events.
///
/// Components without both a start and an end are skipped; summaries and
/// uids are optional per the adapter contract. Timestamps come out in the
/// naive local convention.
///
/// # Errors
/// Returns `StaySyncError::Feed` when the payload is not a calendar at all.
pub fn parse_feed(payload: &str) -> Result<Vec<SourceEvent>> {
    let calendar: Calendar = payload
        .parse()
        .map_err(|e: String| StaySyncError::Feed(format!("invalid ics payload: {e}")))?;

    let mut events = Vec::new();
    for component in &calendar.components {
        let CalendarComponent::Event(event) = component else {
            continue;
        };
        let (Some(start), Some(end)) = (event.get_start(), event.get_end()) else {
            debug!("skipping calendar component without start or end");
            continue;
        };

        events.push(SourceEvent {
            start: to_naive(start),
            end: to_naive(end),
            summary: event.get_summary().map(normalize_summary),
            uid: event.get_uid().map(str::to_string),
            origin: None,
        });
    }

    Ok(events)
}

/// Standardize the placeholder summaries the OTAs ship.
fn normalize_summary(summary: &str) -> String {
    match summary {
        "CLOSED - Not available" => "Booking".to_string(),
        "Airbnb (Not available)" => "Direto".to_string(),
        "Reserved" => "Airbnb".to_string(),
        other => other.to_string(),
    }
}

/// Collapse every date shape onto the naive local convention.
///
/// Date-only values are promoted to midnight (the merger later applies the
/// default check-in/check-out hours); zoned values keep their wall-clock
/// time, matching the single-zone convention of the sources.
fn to_naive(value: DatePerhapsTime) -> NaiveDateTime {
    match value {
        DatePerhapsTime::Date(date) => date.and_time(NaiveTime::MIN),
        DatePerhapsTime::DateTime(CalendarDateTime::Floating(naive)) => naive,
        DatePerhapsTime::DateTime(CalendarDateTime::Utc(utc)) => utc.naive_utc(),
        DatePerhapsTime::DateTime(CalendarDateTime::WithTimezone { date_time, .. }) => date_time,
    }
}
