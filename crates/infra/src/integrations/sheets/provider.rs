//! Spreadsheet access through the CSV export endpoint.

use std::time::Duration;

use async_trait::async_trait;
use staysync_core::ReservationSheet;
use staysync_domain::{RawReservation, Result, StaySyncError};
use tracing::{debug, info, warn};

use super::table::SheetTable;
use crate::errors::InfraError;

const DEFAULT_BASE_URL: &str = "https://docs.google.com";
const FETCH_TIMEOUT: Duration = Duration::from_secs(30);

/// Reads tabs via the spreadsheet's CSV export; appends via webhook.
pub struct CsvSheetClient {
    http: reqwest::Client,
    base_url: String,
    sheet_key: String,
    append_url: Option<String>,
}

impl CsvSheetClient {
    /// # Errors
    /// Returns `StaySyncError::Network` when the HTTP client cannot be built.
    pub fn new(sheet_key: impl Into<String>) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(FETCH_TIMEOUT)
            .build()
            .map_err(|e| StaySyncError::Network(format!("failed to build http client: {e}")))?;
        Ok(Self {
            http,
            base_url: DEFAULT_BASE_URL.to_string(),
            sheet_key: sheet_key.into(),
            append_url: None,
        })
    }

    /// Override the spreadsheet host (tests point this at a local server).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Set the pre-authorized webhook used for appending backfill rows.
    pub fn with_append_url(mut self, url: impl Into<String>) -> Self {
        self.append_url = Some(url.into());
        self
    }

    fn export_url(&self) -> String {
        format!("{}/spreadsheets/d/{}/gviz/tq", self.base_url, self.sheet_key)
    }
}

#[async_trait]
impl ReservationSheet for CsvSheetClient {
    async fn fetch_rows(&self, tab: &str) -> Result<Vec<RawReservation>> {
        debug!(tab, "downloading sheet tab");

        let response = self
            .http
            .get(self.export_url())
            .query(&[("tqx", "out:csv"), ("sheet", tab)])
            .send()
            .await
            .map_err(InfraError::from)?
            .error_for_status()
            .map_err(InfraError::from)?;
        let payload = response.text().await.map_err(InfraError::from)?;

        let cells = parse_cells(&payload)?;
        match SheetTable::from_cells(cells) {
            Some(table) => {
                let reservations = table.reservations();
                debug!(tab, rows = reservations.len(), "sheet tab parsed");
                Ok(reservations)
            }
            None => {
                warn!(tab, "required header columns not found; treating tab as empty");
                Ok(Vec::new())
            }
        }
    }

    async fn append_rows(&self, tab: &str, rows: &[RawReservation]) -> Result<()> {
        let Some(append_url) = &self.append_url else {
            return Err(StaySyncError::Sheet(
                "no append webhook configured; backfill rows not written".into(),
            ));
        };

        let payload = serde_json::json!({ "tab": tab, "rows": rows });
        self.http
            .post(append_url)
            .json(&payload)
            .send()
            .await
            .map_err(InfraError::from)?
            .error_for_status()
            .map_err(InfraError::from)?;

        info!(tab, count = rows.len(), "backfill rows appended to sheet");
        Ok(())
    }
}

/// Read the CSV payload into a plain cell grid, tolerating ragged rows.
fn parse_cells(payload: &str) -> Result<Vec<Vec<String>>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(payload.as_bytes());

    let mut cells = Vec::new();
    for record in reader.records() {
        let record = record.map_err(InfraError::from)?;
        cells.push(record.iter().map(str::to_string).collect());
    }
    Ok(cells)
}
