//! Reservation sync service - core business logic
//!
//! Runs the full cycle: per apartment, fetch the OTA feeds and the manual
//! sheet, merge, detect double-bookings, and report OTA bookings missing
//! from the sheet; then consolidate every apartment into the ledger and swap
//! it into the store. One source failing never aborts the others — a failed
//! fetch contributes zero events this cycle and the pipeline moves on.

use std::sync::Arc;

use chrono::NaiveDateTime;
use staysync_domain::{
    ApartmentConfig, ConflictRecord, Origin, PortfolioConfig, RawReservation, Result, SourceEvent,
};
use tracing::{debug, info, instrument, warn};

use crate::conflicts::detect_conflicts;
use crate::consolidate::{consolidate, ApartmentRows};
use crate::merge::{merge_feeds, tag_origin};
use crate::ports::{CalendarFeedProvider, Clock, FeedSource, LedgerStore, ReservationSheet};
use crate::sync::backfill::{to_backfill_row, unregistered_bookings};

/// Outcome of one full sync cycle.
#[derive(Debug, Clone)]
pub struct SyncReport {
    pub synced_at: NaiveDateTime,
    pub apartments_processed: usize,
    pub sources_failed: usize,
    pub events_merged: usize,
    /// Sheet rows dropped before merging because a date would not parse.
    pub rows_dropped: usize,
    pub conflicts: Vec<ConflictRecord>,
    pub backfilled: usize,
    pub ledger_size: usize,
}

/// Reservation sync service
pub struct SyncService {
    feeds: Arc<dyn CalendarFeedProvider>,
    sheet: Arc<dyn ReservationSheet>,
    store: Arc<dyn LedgerStore>,
    clock: Arc<dyn Clock>,
    portfolio: PortfolioConfig,
    backfill_enabled: bool,
}

struct ApartmentOutcome {
    rows: Vec<RawReservation>,
    merged: usize,
    dropped: usize,
    failed_sources: usize,
    conflicts: Vec<ConflictRecord>,
    backfilled: usize,
}

impl SyncService {
    /// Create a new sync service
    pub fn new(
        feeds: Arc<dyn CalendarFeedProvider>,
        sheet: Arc<dyn ReservationSheet>,
        store: Arc<dyn LedgerStore>,
        clock: Arc<dyn Clock>,
        portfolio: PortfolioConfig,
    ) -> Self {
        Self { feeds, sheet, store, clock, portfolio, backfill_enabled: true }
    }

    /// Configure whether unregistered OTA bookings are appended back to the
    /// sheets.
    ///
    /// Enabled by default; dry runs and tests opt out.
    pub fn with_backfill(mut self, enabled: bool) -> Self {
        self.backfill_enabled = enabled;
        self
    }

    /// Run one full sync cycle.
    ///
    /// The ledger is rebuilt from scratch and replaces the stored one only
    /// once fully built; readers never observe a partial rebuild.
    ///
    /// # Errors
    /// Only a failure to persist the finished ledger propagates; every
    /// source-level failure is absorbed into the report.
    #[instrument(skip(self))]
    pub async fn run(&self) -> Result<SyncReport> {
        let now = self.clock.now();
        info!(apartments = self.portfolio.apartments.len(), "starting reservation sync");

        let mut report = SyncReport {
            synced_at: now,
            apartments_processed: 0,
            sources_failed: 0,
            events_merged: 0,
            rows_dropped: 0,
            conflicts: Vec::new(),
            backfilled: 0,
            ledger_size: 0,
        };
        let mut consolidation_input = Vec::new();

        for apartment in &self.portfolio.apartments {
            let outcome = self.sync_apartment(apartment, now).await;
            report.apartments_processed += 1;
            report.sources_failed += outcome.failed_sources;
            report.events_merged += outcome.merged;
            report.rows_dropped += outcome.dropped;
            report.backfilled += outcome.backfilled;
            report.conflicts.extend(outcome.conflicts);
            consolidation_input
                .push(ApartmentRows { apartment_id: apartment.id.clone(), rows: outcome.rows });
        }

        let ledger = consolidate(consolidation_input, now);
        report.ledger_size = ledger.len();
        self.store.replace(&ledger).await?;

        info!(
            ledger_size = report.ledger_size,
            conflicts = report.conflicts.len(),
            sources_failed = report.sources_failed,
            backfilled = report.backfilled,
            "reservation sync completed"
        );

        Ok(report)
    }

    async fn sync_apartment(
        &self,
        apartment: &ApartmentConfig,
        now: NaiveDateTime,
    ) -> ApartmentOutcome {
        debug!(apartment = %apartment.id, "processing apartment");
        let mut failed_sources = 0usize;

        let airbnb = self
            .fetch_feed(apartment, Origin::Airbnb, apartment.airbnb_url.as_deref(), &mut failed_sources)
            .await;
        let booking = self
            .fetch_feed(apartment, Origin::Booking, apartment.booking_url.as_deref(), &mut failed_sources)
            .await;

        let mut rows = match self.sheet.fetch_rows(&apartment.sheet_tab).await {
            Ok(rows) => rows,
            Err(err) => {
                warn!(
                    apartment = %apartment.id,
                    error = %err,
                    "failed to fetch sheet tab; apartment contributes no manual rows this cycle"
                );
                failed_sources += 1;
                Vec::new()
            }
        };

        let mut manual = Vec::new();
        let mut dropped = 0usize;
        for row in &rows {
            match row.to_source_event() {
                Some(event) => manual.push(event),
                None => dropped += 1,
            }
        }
        if dropped > 0 {
            warn!(apartment = %apartment.id, dropped, "sheet rows dropped for unparsable dates");
        }

        let otas = merge_feeds(
            tag_origin(airbnb, Origin::Airbnb),
            tag_origin(booking, Origin::Booking),
            now,
        );
        let merged = merge_feeds(otas.clone(), manual.clone(), now);
        let conflicts = detect_conflicts(&merged, &apartment.id, now);

        let mut backfilled = 0usize;
        let unregistered = unregistered_bookings(&otas, &manual, now);
        if !unregistered.is_empty() {
            info!(
                apartment = %apartment.id,
                count = unregistered.len(),
                "OTA bookings missing from the manual sheet"
            );
            if self.backfill_enabled {
                let new_rows: Vec<RawReservation> =
                    unregistered.iter().map(|event| to_backfill_row(event, now)).collect();
                match self.sheet.append_rows(&apartment.sheet_tab, &new_rows).await {
                    Ok(()) => {
                        backfilled = new_rows.len();
                        // Keep the in-memory view consistent with the sheet so
                        // the ledger picks the appended rows up this cycle.
                        rows.extend(new_rows);
                    }
                    Err(err) => {
                        warn!(
                            apartment = %apartment.id,
                            error = %err,
                            "failed to append backfill rows; they will be reported again next cycle"
                        );
                    }
                }
            }
        }

        ApartmentOutcome {
            rows,
            merged: merged.len(),
            dropped,
            failed_sources,
            conflicts,
            backfilled,
        }
    }

    async fn fetch_feed(
        &self,
        apartment: &ApartmentConfig,
        origin: Origin,
        url: Option<&str>,
        failed: &mut usize,
    ) -> Vec<SourceEvent> {
        let Some(url) = url else {
            return Vec::new();
        };

        let feed =
            FeedSource { apartment_id: apartment.id.clone(), origin, url: url.to_string() };
        match self.feeds.fetch_events(&feed).await {
            Ok(events) => {
                debug!(feed = %feed.identifier(), count = events.len(), "feed fetched");
                events
            }
            Err(err) => {
                warn!(
                    feed = %feed.identifier(),
                    error = %err,
                    "failed to fetch feed; continuing without it"
                );
                *failed += 1;
                Vec::new()
            }
        }
    }
}
