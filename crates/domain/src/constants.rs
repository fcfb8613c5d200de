//! Domain-wide constants

/// Hour of day assumed for a check-in when the source supplied a bare date.
pub const DEFAULT_CHECK_IN_HOUR: i64 = 15;

/// Hour of day assumed for a check-out when the source supplied a bare date.
pub const DEFAULT_CHECK_OUT_HOUR: i64 = 11;

/// Events starting further ahead than this are dropped by the merger.
pub const BOOKING_HORIZON_DAYS: i64 = 365;

/// Number of leading rows scanned when locating a sheet's header row.
pub const HEADER_SCAN_ROWS: usize = 10;

/// Default time-to-live for cached source fetches, in seconds.
pub const DEFAULT_FETCH_TTL_SECS: u64 = 300;

/// Marker prepended to sheet rows created by the backfill step.
pub const BACKFILL_MARKER: &str = "** IMPORTADO AUTOMATICO **";
