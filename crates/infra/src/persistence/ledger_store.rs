//! SQLite-backed ledger persistence.
//!
//! The ledger is replaced wholesale: one transaction deletes every previous
//! row and inserts the new ones, so a shrink can never leave stale trailing
//! rows and readers only ever observe a fully written ledger. The sync stamp
//! lives in its own single-row table, which also distinguishes "never
//! synced" from a validly empty ledger.

use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::NaiveDateTime;
use rusqlite::{params, Connection, OptionalExtension};
use staysync_core::LedgerStore;
use staysync_domain::{
    Ledger, Origin, ReservationEvent, ReservationStatus, Result, StaySyncError,
};
use tracing::debug;

use crate::errors::InfraError;

const TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS sync_meta (
    id INTEGER PRIMARY KEY CHECK (id = 1),
    synced_at TEXT NOT NULL
);
CREATE TABLE IF NOT EXISTS reservations (
    reservation_id INTEGER NOT NULL,
    apartment_id TEXT NOT NULL,
    start_time TEXT NOT NULL,
    end_time TEXT NOT NULL,
    origin TEXT NOT NULL,
    summary TEXT NOT NULL,
    guest TEXT,
    status TEXT NOT NULL,
    synced_at TEXT NOT NULL
);
";

/// Persists the consolidated ledger in a local SQLite database.
pub struct SqliteLedgerStore {
    conn: Mutex<Connection>,
}

impl SqliteLedgerStore {
    /// Open (and initialize) the database at `path`.
    ///
    /// # Errors
    /// Returns `StaySyncError::Persistence` when the database cannot be
    /// opened or the schema cannot be created.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let conn = Connection::open(path).map_err(InfraError::from)?;
        Self::initialize(conn)
    }

    /// In-memory store for tests and dry runs.
    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().map_err(InfraError::from)?;
        Self::initialize(conn)
    }

    fn initialize(conn: Connection) -> Result<Self> {
        conn.execute_batch(SCHEMA).map_err(InfraError::from)?;
        Ok(Self { conn: Mutex::new(conn) })
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| StaySyncError::Internal("ledger store lock poisoned".into()))
    }
}

fn format_time(value: NaiveDateTime) -> String {
    value.format(TIME_FORMAT).to_string()
}

fn parse_time(value: &str) -> Result<NaiveDateTime> {
    NaiveDateTime::parse_from_str(value, TIME_FORMAT).map_err(|e| {
        StaySyncError::Persistence(format!("invalid stored timestamp {value:?}: {e}"))
    })
}

#[async_trait]
impl LedgerStore for SqliteLedgerStore {
    async fn replace(&self, ledger: &Ledger) -> Result<()> {
        let mut conn = self.lock()?;
        let tx = conn.transaction().map_err(InfraError::from)?;

        tx.execute("DELETE FROM reservations", []).map_err(InfraError::from)?;
        tx.execute(
            "INSERT INTO sync_meta (id, synced_at) VALUES (1, ?1)
             ON CONFLICT(id) DO UPDATE SET synced_at = excluded.synced_at",
            params![format_time(ledger.synced_at)],
        )
        .map_err(InfraError::from)?;

        {
            let mut insert = tx
                .prepare(
                    "INSERT INTO reservations (reservation_id, apartment_id, start_time,
                         end_time, origin, summary, guest, status, synced_at)
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
                )
                .map_err(InfraError::from)?;
            for event in &ledger.reservations {
                insert
                    .execute(params![
                        event.reservation_id,
                        event.apartment_id,
                        format_time(event.start),
                        format_time(event.end),
                        event.origin.as_label(),
                        event.summary,
                        event.guest,
                        event.status.as_label(),
                        format_time(ledger.synced_at),
                    ])
                    .map_err(InfraError::from)?;
            }
        }

        tx.commit().map_err(InfraError::from)?;
        debug!(rows = ledger.len(), "ledger replaced");
        Ok(())
    }

    async fn load(&self) -> Result<Option<Ledger>> {
        let conn = self.lock()?;

        let synced_at: Option<String> = conn
            .query_row("SELECT synced_at FROM sync_meta WHERE id = 1", [], |row| row.get(0))
            .optional()
            .map_err(InfraError::from)?;
        let Some(synced_at) = synced_at else {
            return Ok(None);
        };
        let synced_at = parse_time(&synced_at)?;

        let mut statement = conn
            .prepare(
                "SELECT reservation_id, apartment_id, start_time, end_time, origin, summary,
                        guest, status
                 FROM reservations ORDER BY reservation_id",
            )
            .map_err(InfraError::from)?;

        let rows = statement
            .query_map([], |row| {
                Ok((
                    row.get::<_, i64>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                    row.get::<_, String>(3)?,
                    row.get::<_, String>(4)?,
                    row.get::<_, String>(5)?,
                    row.get::<_, Option<String>>(6)?,
                    row.get::<_, String>(7)?,
                ))
            })
            .map_err(InfraError::from)?
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(InfraError::from)?;

        let mut reservations = Vec::with_capacity(rows.len());
        for (reservation_id, apartment_id, start, end, origin, summary, guest, status) in rows {
            reservations.push(ReservationEvent {
                reservation_id,
                apartment_id,
                start: parse_time(&start)?,
                end: parse_time(&end)?,
                origin: Origin::from_label(&origin),
                summary,
                guest,
                status: ReservationStatus::from_label(Some(&status)),
            });
        }

        Ok(Some(Ledger { reservations, synced_at }))
    }
}
