//! Detection of OTA bookings missing from the manual sheets.
//!
//! The sheets are the hand-maintained record; a booking that only exists in
//! an OTA feed means the operator never registered it. Those are reported
//! every cycle and, when enabled, appended back to the apartment's tab.

use chrono::NaiveDateTime;
use staysync_domain::constants::BACKFILL_MARKER;
use staysync_domain::{DateToken, RawReservation, SourceEvent};

/// OTA events ending today-or-later that overlap no manual-sheet event.
pub fn unregistered_bookings(
    ota_events: &[SourceEvent],
    manual_events: &[SourceEvent],
    now: NaiveDateTime,
) -> Vec<SourceEvent> {
    ota_events
        .iter()
        .filter(|ota| ota.end >= now)
        .filter(|ota| !manual_events.iter().any(|manual| ota.overlaps(manual)))
        .cloned()
        .collect()
}

/// Build the sheet row appended for an unregistered OTA booking.
///
/// The guest column marks the row as an automatic import and keeps the OTA
/// summary for audit; dates are written in the sheet's day-first format.
pub fn to_backfill_row(event: &SourceEvent, stamp: NaiveDateTime) -> RawReservation {
    let summary = event.summary.as_deref().unwrap_or("Reserva");

    RawReservation {
        start: DateToken::Text(event.start.format("%d/%m/%Y").to_string()),
        end: DateToken::Text(event.end.format("%d/%m/%Y").to_string()),
        status: None,
        guest: Some(format!("{BACKFILL_MARKER} ({summary})")),
        origin: Some(event.origin.unwrap_or_default().as_label().to_string()),
        updated_at: Some(stamp.format("%d/%m/%Y %H:%M:%S").to_string()),
    }
}
