//! Port interfaces for source adapters, persistence, and time

use async_trait::async_trait;
use chrono::NaiveDateTime;
use staysync_domain::{Ledger, Origin, RawReservation, Result, SourceEvent};

/// One OTA calendar feed belonging to an apartment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedSource {
    pub apartment_id: String,
    pub origin: Origin,
    pub url: String,
}

impl FeedSource {
    /// Cache/display identifier for this feed.
    pub fn identifier(&self) -> String {
        format!("{}_{}", self.apartment_id, self.origin.as_label().to_lowercase())
    }
}

/// Trait for fetching OTA calendar feeds
#[async_trait]
pub trait CalendarFeedProvider: Send + Sync {
    /// Fetch one feed's events.
    ///
    /// Timestamps must already be normalized to naive local time; missing
    /// summaries and uids are tolerated.
    async fn fetch_events(&self, feed: &FeedSource) -> Result<Vec<SourceEvent>>;
}

/// Trait for reading and appending to the manual reservation sheets
#[async_trait]
pub trait ReservationSheet: Send + Sync {
    /// Fetch one tab's rows.
    ///
    /// Locating the header row is the adapter's job; a tab without a usable
    /// header yields an empty result, never an error.
    async fn fetch_rows(&self, tab: &str) -> Result<Vec<RawReservation>>;

    /// Append rows to a tab (backfill of unregistered OTA bookings).
    async fn append_rows(&self, tab: &str, rows: &[RawReservation]) -> Result<()>;
}

/// Trait for persisting the consolidated ledger
#[async_trait]
pub trait LedgerStore: Send + Sync {
    /// Replace the stored ledger wholesale.
    ///
    /// The previous state is fully overwritten, including truncation of any
    /// rows beyond the new row count. Callers hand over fully built ledgers
    /// only; a reader never observes a partial rebuild.
    async fn replace(&self, ledger: &Ledger) -> Result<()>;

    /// Load the previously persisted ledger, if any.
    async fn load(&self) -> Result<Option<Ledger>>;
}

/// Time source, injectable so tests can pin "now".
pub trait Clock: Send + Sync {
    fn now(&self) -> NaiveDateTime;
}

/// System clock returning naive local time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> NaiveDateTime {
        chrono::Local::now().naive_local()
    }
}
