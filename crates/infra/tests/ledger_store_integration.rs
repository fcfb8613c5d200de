//! Round-trip and overwrite behavior of the SQLite ledger store.

use chrono::{NaiveDate, NaiveDateTime};
use staysync_core::LedgerStore;
use staysync_domain::{Ledger, Origin, ReservationEvent, ReservationStatus};
use staysync_infra::SqliteLedgerStore;

fn dt(y: i32, m: u32, d: u32, h: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(y, m, d).unwrap().and_hms_opt(h, 0, 0).unwrap()
}

fn reservation(id: i64, apartment: &str) -> ReservationEvent {
    ReservationEvent {
        reservation_id: id,
        apartment_id: apartment.into(),
        start: dt(2024, 7, 1, 15),
        end: dt(2024, 7, 5, 11),
        origin: Origin::Airbnb,
        summary: "Airbnb".into(),
        guest: Some("Maria".into()),
        status: ReservationStatus::Active,
    }
}

#[tokio::test]
async fn ledger_round_trips_through_the_store() {
    let store = SqliteLedgerStore::in_memory().unwrap();
    let ledger = Ledger {
        reservations: vec![reservation(1, "c108"), reservation(2, "d014")],
        synced_at: dt(2024, 6, 1, 12),
    };

    store.replace(&ledger).await.unwrap();
    let loaded = store.load().await.unwrap().unwrap();

    assert_eq!(loaded, ledger);
}

#[tokio::test]
async fn unsynced_store_loads_nothing() {
    let store = SqliteLedgerStore::in_memory().unwrap();
    assert!(store.load().await.unwrap().is_none());
}

#[tokio::test]
async fn shrinking_replace_truncates_stale_rows() {
    let store = SqliteLedgerStore::in_memory().unwrap();

    let big = Ledger {
        reservations: vec![
            reservation(1, "c108"),
            reservation(2, "d014"),
            reservation(3, "ap101"),
        ],
        synced_at: dt(2024, 6, 1, 12),
    };
    store.replace(&big).await.unwrap();

    let small =
        Ledger { reservations: vec![reservation(1, "c108")], synced_at: dt(2024, 6, 2, 12) };
    store.replace(&small).await.unwrap();

    let loaded = store.load().await.unwrap().unwrap();
    assert_eq!(loaded.len(), 1);
    assert_eq!(loaded.synced_at, dt(2024, 6, 2, 12));
}

#[tokio::test]
async fn empty_ledger_is_a_valid_persisted_state() {
    let store = SqliteLedgerStore::in_memory().unwrap();

    store.replace(&Ledger::empty(dt(2024, 6, 1, 12))).await.unwrap();

    // Distinguishable from the never-synced state.
    let loaded = store.load().await.unwrap().unwrap();
    assert!(loaded.is_empty());
    assert_eq!(loaded.synced_at, dt(2024, 6, 1, 12));
}

#[tokio::test]
async fn file_backed_store_survives_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("ledger.db");

    {
        let store = SqliteLedgerStore::open(&path).unwrap();
        let ledger =
            Ledger { reservations: vec![reservation(1, "c108")], synced_at: dt(2024, 6, 1, 12) };
        store.replace(&ledger).await.unwrap();
    }

    let reopened = SqliteLedgerStore::open(&path).unwrap();
    let loaded = reopened.load().await.unwrap().unwrap();
    assert_eq!(loaded.len(), 1);
    assert_eq!(loaded.reservations[0].apartment_id, "c108");
}
