//! Availability queries against the consolidated ledger.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use staysync_domain::{Ledger, Result, StaySyncError};

/// A validated query interval.
///
/// Construction is the only place the `start < end` precondition is checked;
/// an inverted or empty range is a user input error, not a ledger error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueryWindow {
    start: NaiveDateTime,
    end: NaiveDateTime,
}

impl QueryWindow {
    /// # Errors
    /// Returns `StaySyncError::InvalidInput` when `start >= end`.
    pub fn new(start: NaiveDateTime, end: NaiveDateTime) -> Result<Self> {
        if start >= end {
            return Err(StaySyncError::InvalidInput(
                "check-out must be after check-in".into(),
            ));
        }
        Ok(Self { start, end })
    }

    pub fn start(&self) -> NaiveDateTime {
        self.start
    }

    pub fn end(&self) -> NaiveDateTime {
        self.end
    }
}

/// Apartments partitioned into free and occupied for a query window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Availability {
    pub free: Vec<String>,
    pub occupied: Vec<String>,
}

/// Partition apartments into free and occupied for the given window.
///
/// An apartment is occupied when at least one of its reservations overlaps
/// the window under the half-open test (`start < query_end && end >
/// query_start`) — a checkout touching a new check-in at the same instant is
/// not a collision. An empty `apartments` slice means "all apartments present
/// in the ledger". Outputs are sorted; the computation is pure and
/// order-independent.
pub fn check_availability(
    ledger: &Ledger,
    apartments: &[String],
    window: &QueryWindow,
) -> Availability {
    let scope: Vec<String> = if apartments.is_empty() {
        ledger.apartments()
    } else {
        let mut ids = apartments.to_vec();
        ids.sort();
        ids.dedup();
        ids
    };

    let mut free = Vec::new();
    let mut occupied = Vec::new();

    for apartment in scope {
        let busy = ledger
            .for_apartment(&apartment)
            .any(|event| event.overlaps(window.start, window.end));
        if busy {
            occupied.push(apartment);
        } else {
            free.push(apartment);
        }
    }

    Availability { free, occupied }
}
