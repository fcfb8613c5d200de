//! End-to-end checks over the merge → detect → consolidate → query pipeline,
//! using in-memory inputs only.

use chrono::{NaiveDate, NaiveDateTime};
use staysync_core::{check_availability, consolidate, detect_conflicts, merge_feeds, tag_origin};
use staysync_core::{ApartmentRows, QueryWindow};
use staysync_domain::{DateToken, Origin, RawReservation, SourceEvent};

fn dt(y: i32, m: u32, d: u32, h: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(y, m, d).unwrap().and_hms_opt(h, 0, 0).unwrap()
}

fn feed_event(start: NaiveDateTime, end: NaiveDateTime, summary: &str) -> SourceEvent {
    SourceEvent { start, end, summary: Some(summary.into()), uid: None, origin: None }
}

fn sheet_row(start: &str, end: &str) -> RawReservation {
    RawReservation {
        start: DateToken::Text(start.into()),
        end: DateToken::Text(end.into()),
        status: None,
        guest: None,
        origin: Some("Direto".into()),
        updated_at: None,
    }
}

#[test]
fn merged_feeds_flow_into_conflict_detection() {
    let now = dt(2024, 2, 1, 12);

    // Airbnb blocks 2024-03-01..03-05, the sheet records 03-03..03-06.
    let airbnb = tag_origin(
        vec![feed_event(dt(2024, 3, 1, 0), dt(2024, 3, 5, 0), "Reserved")],
        Origin::Airbnb,
    );
    let manual = tag_origin(
        vec![feed_event(dt(2024, 3, 3, 15), dt(2024, 3, 6, 11), "Maria")],
        Origin::Direct,
    );

    let merged = merge_feeds(airbnb, manual, now);
    assert_eq!(merged.len(), 2);

    let conflicts = detect_conflicts(&merged, "c108", now);
    assert_eq!(conflicts.len(), 1);
    assert!(conflicts[0].first.contains("Reserved"));
    assert!(conflicts[0].second.contains("Maria"));
}

#[test]
fn consolidated_ledger_answers_availability_queries() {
    let now = dt(2024, 6, 1, 12);
    let sets = vec![
        ApartmentRows {
            apartment_id: "A".into(),
            rows: vec![sheet_row("10/06/2024", "15/06/2024")],
        },
        ApartmentRows {
            apartment_id: "B".into(),
            rows: vec![sheet_row("20/06/2024", "25/06/2024")],
        },
    ];

    let ledger = consolidate(sets, now);
    assert_eq!(ledger.len(), 2);

    let window = QueryWindow::new(dt(2024, 6, 12, 15), dt(2024, 6, 13, 11)).unwrap();
    let result = check_availability(&ledger, &[], &window);

    assert_eq!(result.occupied, vec!["A".to_string()]);
    assert_eq!(result.free, vec!["B".to_string()]);
}

#[test]
fn checkout_day_is_bookable_again() {
    // Stay ends at the default checkout hour; a query starting at that exact
    // instant must see the apartment as free.
    let now = dt(2024, 1, 1, 12);
    let sets = vec![ApartmentRows {
        apartment_id: "A".into(),
        rows: vec![sheet_row("01/01/2024", "05/01/2024")],
    }];

    let ledger = consolidate(sets, now);
    assert_eq!(ledger.reservations[0].end, dt(2024, 1, 5, 11));

    let window = QueryWindow::new(dt(2024, 1, 5, 11), dt(2024, 1, 7, 11)).unwrap();
    let result = check_availability(&ledger, &[], &window);
    assert_eq!(result.free, vec!["A".to_string()]);
}

#[test]
fn reconsolidation_differs_only_in_nothing_when_inputs_repeat() {
    let now = dt(2024, 6, 1, 12);
    let sets = || {
        vec![
            ApartmentRows {
                apartment_id: "c108".into(),
                rows: vec![
                    sheet_row("10/06/2024", "15/06/2024"),
                    sheet_row("8-dez.24-qui.", "10-dez.24-sáb."),
                ],
            },
            ApartmentRows {
                apartment_id: "d014".into(),
                rows: vec![sheet_row("01/05/2024", "05/05/2024")],
            },
        ]
    };

    let first = consolidate(sets(), now);
    let second = consolidate(sets(), now);

    // Same inputs and the same "now" reproduce the ledger exactly, ids
    // included; ids only move when row order moves.
    assert_eq!(first, second);
}

#[test]
fn duplicate_windows_from_different_sources_merge_to_one() {
    let now = dt(2023, 12, 1, 0);
    let a = vec![feed_event(dt(2024, 1, 1, 0), dt(2024, 1, 3, 0), "Reserved")];
    let b = vec![feed_event(dt(2024, 1, 1, 0), dt(2024, 1, 3, 0), "CLOSED - Not available")];

    let merged = merge_feeds(
        tag_origin(a, Origin::Airbnb),
        tag_origin(b, Origin::Booking),
        now,
    );
    assert_eq!(merged.len(), 1);
    assert_eq!(merged[0].origin, Some(Origin::Airbnb));
}
