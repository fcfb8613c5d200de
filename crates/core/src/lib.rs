//! # StaySync Core
//!
//! Business logic for the reservation consolidation engine.
//!
//! This crate contains:
//! - The per-apartment merger and duplicate removal
//! - Double-booking detection
//! - Consolidation of all apartments into the ledger
//! - Availability queries against the consolidated ledger
//! - The sync orchestrator and the ports it consumes
//!
//! ## Architecture
//! - Depends only on `staysync-domain`
//! - Pure logic; all I/O goes through the port traits in [`ports`]

pub mod availability;
pub mod conflicts;
pub mod consolidate;
pub mod merge;
pub mod ports;
pub mod sync;

// Re-export commonly used items
pub use availability::{check_availability, Availability, QueryWindow};
pub use conflicts::detect_conflicts;
pub use consolidate::{consolidate, ApartmentRows};
pub use merge::{merge_feeds, tag_origin};
pub use ports::{CalendarFeedProvider, Clock, FeedSource, LedgerStore, ReservationSheet, SystemClock};
pub use sync::{SyncReport, SyncService};
