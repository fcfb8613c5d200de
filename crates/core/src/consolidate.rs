//! Ledger consolidation across all apartments.
//!
//! Unions every apartment's sheet rows into the single reservation table,
//! normalizing dates, recomputing statuses, and assigning positional ids.
//! The ledger is rebuilt wholesale on every pass; nothing is updated in
//! place.

use chrono::NaiveDateTime;
use staysync_domain::{
    apply_default_hours, Ledger, Origin, RawReservation, ReservationEvent, ReservationStatus,
    StayBoundary,
};
use tracing::{debug, info};

/// One apartment's rows, as fetched from its sheet tab.
#[derive(Debug, Clone)]
pub struct ApartmentRows {
    pub apartment_id: String,
    pub rows: Vec<RawReservation>,
}

/// Build the consolidated ledger from every apartment's rows.
///
/// Rows with blank dates, unparsable dates, or an inverted range are dropped;
/// the aggregate counts are logged, never surfaced as errors. An apartment
/// contributing no rows simply adds nothing, and a run where every apartment
/// is empty yields the empty ledger — a valid terminal state, not a failure.
pub fn consolidate(per_apartment: Vec<ApartmentRows>, now: NaiveDateTime) -> Ledger {
    let mut reservations = Vec::new();
    let mut dropped_blank = 0usize;
    let mut dropped_unparsable = 0usize;
    let mut dropped_inverted = 0usize;

    for set in per_apartment {
        if set.rows.is_empty() {
            debug!(apartment = %set.apartment_id, "apartment contributed no rows this cycle");
            continue;
        }

        for row in set.rows {
            if row.start.is_blank() || row.end.is_blank() {
                dropped_blank += 1;
                continue;
            }

            let (Some(start), Some(end)) = (row.start.normalize(), row.end.normalize()) else {
                dropped_unparsable += 1;
                continue;
            };

            let start = apply_default_hours(start, StayBoundary::CheckIn);
            let end = apply_default_hours(end, StayBoundary::CheckOut);
            if start >= end {
                dropped_inverted += 1;
                continue;
            }

            let status = if end < now {
                ReservationStatus::Completed
            } else {
                ReservationStatus::Active
            };

            let origin_label = row.origin.as_deref().map(str::trim).filter(|s| !s.is_empty());
            let origin = origin_label.map(Origin::from_label).unwrap_or_default();
            let guest = row.guest.clone().filter(|g| !g.trim().is_empty());
            let summary = origin_label
                .map(str::to_string)
                .or_else(|| guest.clone())
                .unwrap_or_else(|| "Reserva".to_string());

            reservations.push(ReservationEvent {
                // Assigned below, after the full row order is known.
                reservation_id: 0,
                apartment_id: set.apartment_id.clone(),
                start,
                end,
                origin,
                summary,
                guest,
                status,
            });
        }
    }

    for (index, event) in reservations.iter_mut().enumerate() {
        event.reservation_id = index as i64 + 1;
    }

    info!(
        total = reservations.len(),
        dropped_blank,
        dropped_unparsable,
        dropped_inverted,
        "ledger consolidated"
    );

    Ledger { reservations, synced_at: now }
}
