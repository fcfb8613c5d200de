//! Double-booking detection on one apartment's merged events.

use chrono::NaiveDateTime;
use staysync_domain::{ConflictRecord, SourceEvent};
use tracing::warn;

/// Scan a merged event sequence for overlapping stays.
///
/// Events are sorted by start and swept forward: for each event, later events
/// are examined only while their start precedes this event's end. Exact
/// duplicates were already removed by the merger, so any event pair passing
/// the half-open overlap test is a genuine double-booking. One record is
/// emitted per unordered pair.
pub fn detect_conflicts(
    events: &[SourceEvent],
    apartment_id: &str,
    detected_at: NaiveDateTime,
) -> Vec<ConflictRecord> {
    let mut sorted: Vec<&SourceEvent> = events.iter().collect();
    sorted.sort_by_key(|event| event.start);

    let mut conflicts = Vec::new();

    for i in 0..sorted.len() {
        for j in (i + 1)..sorted.len() {
            // Sorted by start: once a later start has cleared this event's
            // end, nothing further down can overlap it.
            if sorted[j].start >= sorted[i].end {
                break;
            }
            if sorted[i].start < sorted[j].end && sorted[j].start < sorted[i].end {
                conflicts.push(ConflictRecord {
                    apartment_id: apartment_id.to_string(),
                    first: sorted[i].describe(),
                    second: sorted[j].describe(),
                    detected_at,
                });
            }
        }
    }

    if !conflicts.is_empty() {
        warn!(
            apartment = apartment_id,
            count = conflicts.len(),
            "overlapping reservations detected"
        );
    }

    conflicts
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;

    fn dt(y: i32, m: u32, d: u32, h: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d).unwrap().and_hms_opt(h, 0, 0).unwrap()
    }

    fn event(start: NaiveDateTime, end: NaiveDateTime, summary: &str) -> SourceEvent {
        SourceEvent { start, end, summary: Some(summary.into()), uid: None, origin: None }
    }

    #[test]
    fn overlapping_ota_and_manual_stay_yield_one_record() {
        let events = vec![
            event(dt(2024, 3, 1, 15), dt(2024, 3, 5, 11), "Airbnb"),
            event(dt(2024, 3, 3, 15), dt(2024, 3, 6, 11), "Maria"),
        ];

        let conflicts = detect_conflicts(&events, "c108", dt(2024, 2, 1, 12));
        assert_eq!(conflicts.len(), 1);
        assert!(conflicts[0].first.contains("Airbnb"));
        assert!(conflicts[0].second.contains("Maria"));
        assert_eq!(conflicts[0].apartment_id, "c108");
    }

    #[test]
    fn back_to_back_stays_do_not_conflict() {
        // Checkout and next check-in at the same instant.
        let events = vec![
            event(dt(2024, 3, 1, 15), dt(2024, 3, 5, 11), "first"),
            event(dt(2024, 3, 5, 11), dt(2024, 3, 9, 11), "second"),
        ];

        let conflicts = detect_conflicts(&events, "c108", dt(2024, 2, 1, 12));
        assert!(conflicts.is_empty());
    }

    #[test]
    fn unsorted_input_is_handled() {
        let events = vec![
            event(dt(2024, 3, 3, 15), dt(2024, 3, 6, 11), "late"),
            event(dt(2024, 3, 1, 15), dt(2024, 3, 5, 11), "early"),
        ];

        let conflicts = detect_conflicts(&events, "d014", dt(2024, 2, 1, 12));
        assert_eq!(conflicts.len(), 1);
        assert!(conflicts[0].first.contains("early"));
    }

    #[test]
    fn one_stay_overlapping_two_yields_two_records() {
        let events = vec![
            event(dt(2024, 3, 1, 15), dt(2024, 3, 10, 11), "long"),
            event(dt(2024, 3, 2, 15), dt(2024, 3, 4, 11), "short-a"),
            event(dt(2024, 3, 5, 15), dt(2024, 3, 7, 11), "short-b"),
        ];

        let conflicts = detect_conflicts(&events, "c108", dt(2024, 2, 1, 12));
        assert_eq!(conflicts.len(), 2);
    }

    #[test]
    fn early_exit_does_not_skip_later_overlaps() {
        // The second event clears the first's end, but the third still
        // overlaps the second; the inner break must only stop the scan for
        // the current outer event.
        let events = vec![
            event(dt(2024, 3, 1, 15), dt(2024, 3, 3, 11), "a"),
            event(dt(2024, 3, 4, 15), dt(2024, 3, 8, 11), "b"),
            event(dt(2024, 3, 6, 15), dt(2024, 3, 9, 11), "c"),
        ];

        let conflicts = detect_conflicts(&events, "c108", dt(2024, 2, 1, 12));
        assert_eq!(conflicts.len(), 1);
        assert!(conflicts[0].first.contains('b'));
        assert!(conflicts[0].second.contains('c'));
    }

    #[test]
    fn empty_input_yields_no_conflicts() {
        assert!(detect_conflicts(&[], "c108", dt(2024, 2, 1, 12)).is_empty());
    }
}
