//! Error types used throughout the application

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Main error type for StaySync
#[derive(Error, Debug, Serialize, Deserialize)]
#[serde(tag = "type", content = "message")]
pub enum StaySyncError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Feed error: {0}")]
    Feed(String),

    #[error("Sheet error: {0}")]
    Sheet(String),

    #[error("Persistence error: {0}")]
    Persistence(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Result type alias for StaySync operations
pub type Result<T> = std::result::Result<T, StaySyncError>;
