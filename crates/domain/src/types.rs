//! Domain types and models
//!
//! Everything here is naive local time: the upstream feeds are normalized to
//! a single zone convention before they reach the core (see the adapter
//! contracts in `staysync-core::ports`).

use std::collections::hash_map::DefaultHasher;
use std::fmt;
use std::hash::{Hash, Hasher};

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::dates::{apply_default_hours, parse_flexible, StayBoundary};

/// Booking source tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Origin {
    Airbnb,
    Booking,
    Direct,
    #[default]
    Unknown,
}

impl Origin {
    /// Map a free-text source label onto the closed enum.
    ///
    /// OTA feeds ship placeholder summaries (`"CLOSED - Not available"`,
    /// `"Reserved"`) and the manual sheets use Portuguese labels; both funnel
    /// through this single table instead of ad-hoc branches at call sites.
    pub fn from_label(label: &str) -> Self {
        match label.trim() {
            "Airbnb" | "Reserved" => Self::Airbnb,
            "Booking" | "CLOSED - Not available" => Self::Booking,
            "Direto" | "Direct" | "Airbnb (Not available)" => Self::Direct,
            _ => Self::Unknown,
        }
    }

    /// Label used in the persisted ledger and the sheets (Portuguese).
    pub fn as_label(&self) -> &'static str {
        match self {
            Self::Airbnb => "Airbnb",
            Self::Booking => "Booking",
            Self::Direct => "Direto",
            Self::Unknown => "Desconhecido",
        }
    }
}

impl fmt::Display for Origin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_label())
    }
}

/// Reservation lifecycle status, recomputed on every consolidation pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ReservationStatus {
    #[default]
    Active,
    Completed,
}

impl ReservationStatus {
    /// Parse the sheet's status column; anything that is not a completion
    /// marker is treated as active.
    pub fn from_label(label: Option<&str>) -> Self {
        match label.map(str::trim) {
            Some("Concluído") | Some("Concluido") | Some("completed") => Self::Completed,
            _ => Self::Active,
        }
    }

    pub fn as_label(&self) -> &'static str {
        match self {
            Self::Active => "Ativa",
            Self::Completed => "Concluído",
        }
    }
}

impl fmt::Display for ReservationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_label())
    }
}

/// One consolidated stay in the ledger.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReservationEvent {
    /// Positional identifier assigned at consolidation time (`index + 1`).
    ///
    /// NOT stable across consolidation runs: the ledger is rebuilt wholesale
    /// every sync and ids are re-derived from row order. Callers needing a
    /// durable key should use [`ReservationEvent::stable_key`].
    pub reservation_id: i64,
    pub apartment_id: String,
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
    pub origin: Origin,
    /// Free-text label from the source, display/audit only.
    pub summary: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub guest: Option<String>,
    pub status: ReservationStatus,
}

impl ReservationEvent {
    /// Half-open interval overlap test; touching endpoints do not overlap.
    pub fn overlaps(&self, start: NaiveDateTime, end: NaiveDateTime) -> bool {
        self.start < end && start < self.end
    }

    /// Display description used in conflict records and reports.
    pub fn describe(&self) -> String {
        format!("{} ({} - {})", self.summary, self.start, self.end)
    }

    /// Durable key derived from the fields that identify a physical stay.
    ///
    /// Survives re-consolidation, unlike `reservation_id`.
    pub fn stable_key(&self) -> u64 {
        let mut hasher = DefaultHasher::new();
        self.apartment_id.hash(&mut hasher);
        self.start.hash(&mut hasher);
        self.end.hash(&mut hasher);
        self.origin.hash(&mut hasher);
        hasher.finish()
    }
}

/// The consolidated reservation table, one union of all apartments.
///
/// Rebuilt wholesale on every sync; an empty ledger is the valid "no data"
/// state, not an error.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ledger {
    pub reservations: Vec<ReservationEvent>,
    /// Single consolidation stamp; the store denormalizes it onto every row.
    pub synced_at: NaiveDateTime,
}

impl Ledger {
    pub fn empty(synced_at: NaiveDateTime) -> Self {
        Self { reservations: Vec::new(), synced_at }
    }

    pub fn is_empty(&self) -> bool {
        self.reservations.is_empty()
    }

    pub fn len(&self) -> usize {
        self.reservations.len()
    }

    /// All apartment ids present in the ledger, sorted and deduplicated.
    pub fn apartments(&self) -> Vec<String> {
        let mut ids: Vec<String> =
            self.reservations.iter().map(|r| r.apartment_id.clone()).collect();
        ids.sort();
        ids.dedup();
        ids
    }

    pub fn for_apartment<'a>(
        &'a self,
        apartment_id: &'a str,
    ) -> impl Iterator<Item = &'a ReservationEvent> {
        self.reservations.iter().filter(move |r| r.apartment_id == apartment_id)
    }
}

/// A detected double-booking on one apartment.
///
/// Purely informational: conflicts are reported to operators, never resolved
/// automatically, and never mutate the ledger.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConflictRecord {
    pub apartment_id: String,
    pub first: String,
    pub second: String,
    pub detected_at: NaiveDateTime,
}

/// Uniform event record produced by the source adapters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceEvent {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uid: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub origin: Option<Origin>,
}

impl SourceEvent {
    /// Half-open interval overlap test against another event.
    pub fn overlaps(&self, other: &SourceEvent) -> bool {
        self.start < other.end && other.start < self.end
    }

    /// Display description used in conflict records.
    pub fn describe(&self) -> String {
        let label = self.summary.as_deref().unwrap_or("Reserva");
        format!("{} ({} - {})", label, self.start, self.end)
    }
}

/// A date value as it arrives from a source: free text from the sheets, an
/// actual timestamp from the calendar feeds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DateToken {
    Timestamp(NaiveDateTime),
    Text(String),
}

impl DateToken {
    /// Resolve to a canonical timestamp, or `None` when unparsable.
    ///
    /// Callers treat `None` as "drop this record"; a half-parsed date never
    /// survives into the ledger.
    pub fn normalize(&self) -> Option<NaiveDateTime> {
        match self {
            Self::Timestamp(dt) => Some(*dt),
            Self::Text(raw) => parse_flexible(raw),
        }
    }

    pub fn is_blank(&self) -> bool {
        match self {
            Self::Timestamp(_) => false,
            Self::Text(raw) => raw.trim().is_empty(),
        }
    }
}

/// One spreadsheet row before normalization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawReservation {
    pub start: DateToken,
    pub end: DateToken,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub guest: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub origin: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}

impl RawReservation {
    /// Convert the row into the uniform adapter event contract, applying the
    /// default check-in/check-out hours to bare dates.
    ///
    /// Returns `None` when either date fails to normalize.
    pub fn to_source_event(&self) -> Option<SourceEvent> {
        let start = apply_default_hours(self.start.normalize()?, StayBoundary::CheckIn);
        let end = apply_default_hours(self.end.normalize()?, StayBoundary::CheckOut);

        let origin = self.origin.as_deref().map(Origin::from_label).unwrap_or(Origin::Direct);
        let summary = self
            .guest
            .as_deref()
            .filter(|g| !g.trim().is_empty())
            .map(str::to_string)
            .or_else(|| self.origin.clone());

        Some(SourceEvent { start, end, summary, uid: None, origin: Some(origin) })
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;

    fn dt(y: i32, m: u32, d: u32, h: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d).unwrap().and_hms_opt(h, 0, 0).unwrap()
    }

    #[test]
    fn origin_lookup_maps_legacy_labels() {
        assert_eq!(Origin::from_label("Reserved"), Origin::Airbnb);
        assert_eq!(Origin::from_label("CLOSED - Not available"), Origin::Booking);
        assert_eq!(Origin::from_label("Airbnb (Not available)"), Origin::Direct);
        assert_eq!(Origin::from_label("Direto"), Origin::Direct);
        assert_eq!(Origin::from_label("whatsapp"), Origin::Unknown);
    }

    #[test]
    fn status_defaults_to_active() {
        assert_eq!(ReservationStatus::from_label(None), ReservationStatus::Active);
        assert_eq!(ReservationStatus::from_label(Some("")), ReservationStatus::Active);
        assert_eq!(ReservationStatus::from_label(Some("Concluído")), ReservationStatus::Completed);
    }

    #[test]
    fn overlap_is_symmetric_and_half_open() {
        let a = SourceEvent {
            start: dt(2024, 1, 1, 15),
            end: dt(2024, 1, 5, 11),
            summary: None,
            uid: None,
            origin: None,
        };
        let b = SourceEvent { start: dt(2024, 1, 5, 11), end: dt(2024, 1, 7, 11), ..a.clone() };
        let c = SourceEvent { start: dt(2024, 1, 4, 0), end: dt(2024, 1, 6, 0), ..a.clone() };

        // Touching endpoints: checkout at 11:00, check-in at 11:00 same day.
        assert!(!a.overlaps(&b));
        assert!(!b.overlaps(&a));

        assert!(a.overlaps(&c));
        assert!(c.overlaps(&a));
    }

    #[test]
    fn stable_key_survives_reservation_id_reassignment() {
        let event = ReservationEvent {
            reservation_id: 1,
            apartment_id: "c108".into(),
            start: dt(2024, 3, 1, 15),
            end: dt(2024, 3, 5, 11),
            origin: Origin::Airbnb,
            summary: "Airbnb".into(),
            guest: None,
            status: ReservationStatus::Active,
        };
        let renumbered = ReservationEvent { reservation_id: 42, ..event.clone() };

        assert_eq!(event.stable_key(), renumbered.stable_key());
    }

    #[test]
    fn raw_reservation_applies_default_hours() {
        let row = RawReservation {
            start: DateToken::Text("8-dez.23-qui.".into()),
            end: DateToken::Text("10-dez.23-sáb.".into()),
            status: None,
            guest: Some("Maria".into()),
            origin: Some("Direto".into()),
            updated_at: None,
        };

        let event = row.to_source_event().unwrap();
        assert_eq!(event.start, dt(2023, 12, 8, 15));
        assert_eq!(event.end, dt(2023, 12, 10, 11));
        assert_eq!(event.origin, Some(Origin::Direct));
        assert_eq!(event.summary.as_deref(), Some("Maria"));
    }

    #[test]
    fn raw_reservation_with_bad_date_is_dropped() {
        let row = RawReservation {
            start: DateToken::Text("invalid".into()),
            end: DateToken::Text("10-dez.23".into()),
            status: None,
            guest: None,
            origin: None,
            updated_at: None,
        };

        assert!(row.to_source_event().is_none());
    }
}
