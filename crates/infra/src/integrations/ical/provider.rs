//! HTTP client for OTA calendar feeds.

use std::time::Duration;

use async_trait::async_trait;
use staysync_core::{CalendarFeedProvider, FeedSource};
use staysync_domain::{Result, SourceEvent, StaySyncError};
use tracing::debug;

use super::parser::parse_feed;
use crate::errors::InfraError;

const FETCH_TIMEOUT: Duration = Duration::from_secs(30);

/// Downloads `.ics` exports over HTTPS and parses them into source events.
pub struct IcalFeedProvider {
    http: reqwest::Client,
}

impl IcalFeedProvider {
    /// # Errors
    /// Returns `StaySyncError::Network` when the HTTP client cannot be built.
    pub fn new() -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(FETCH_TIMEOUT)
            .build()
            .map_err(|e| StaySyncError::Network(format!("failed to build http client: {e}")))?;
        Ok(Self { http })
    }
}

#[async_trait]
impl CalendarFeedProvider for IcalFeedProvider {
    async fn fetch_events(&self, feed: &FeedSource) -> Result<Vec<SourceEvent>> {
        debug!(feed = %feed.identifier(), "downloading calendar feed");

        let response = self
            .http
            .get(&feed.url)
            .send()
            .await
            .map_err(InfraError::from)?
            .error_for_status()
            .map_err(InfraError::from)?;
        let payload = response.text().await.map_err(InfraError::from)?;

        let events = parse_feed(&payload)?;
        debug!(feed = %feed.identifier(), count = events.len(), "calendar feed parsed");
        Ok(events)
    }
}
