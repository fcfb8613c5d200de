//! Configuration structures
//!
//! Loaded from TOML by the infra config loader; kept here so every crate can
//! consume them without depending on infrastructure.

use serde::{Deserialize, Serialize};

use crate::constants::DEFAULT_FETCH_TTL_SECS;
use crate::errors::{Result, StaySyncError};

/// Top-level application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PortfolioConfig {
    /// Key of the spreadsheet holding one tab per apartment.
    pub sheet_key: String,
    /// Path of the SQLite ledger database.
    pub database_path: String,
    /// Time-to-live for cached source fetches, in seconds.
    #[serde(default = "default_cache_ttl")]
    pub cache_ttl_seconds: u64,
    /// Pre-authorized webhook for appending backfill rows to the sheets.
    /// Absent means backfill appends are reported but not written.
    #[serde(default)]
    pub append_webhook: Option<String>,
    pub apartments: Vec<ApartmentConfig>,
}

/// One apartment: its sheet tab plus optional OTA feed URLs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApartmentConfig {
    pub id: String,
    pub sheet_tab: String,
    #[serde(default)]
    pub airbnb_url: Option<String>,
    #[serde(default)]
    pub booking_url: Option<String>,
}

impl PortfolioConfig {
    /// Validate invariants the loader cannot express structurally.
    ///
    /// # Errors
    /// Returns `StaySyncError::Config` on an empty portfolio or duplicate
    /// apartment ids.
    pub fn validate(&self) -> Result<()> {
        if self.apartments.is_empty() {
            return Err(StaySyncError::Config("no apartments configured".into()));
        }

        let mut ids: Vec<&str> = self.apartments.iter().map(|a| a.id.as_str()).collect();
        ids.sort_unstable();
        let before = ids.len();
        ids.dedup();
        if ids.len() != before {
            return Err(StaySyncError::Config("duplicate apartment ids in configuration".into()));
        }

        Ok(())
    }
}

fn default_cache_ttl() -> u64 {
    DEFAULT_FETCH_TTL_SECS
}
