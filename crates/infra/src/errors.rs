//! Conversions from external infrastructure errors into domain errors.

use staysync_domain::StaySyncError;

/// Error newtype that keeps conversions on the infrastructure side and can be
/// converted back into the domain error.
#[derive(Debug)]
pub struct InfraError(pub StaySyncError);

impl From<InfraError> for StaySyncError {
    fn from(value: InfraError) -> Self {
        value.0
    }
}

impl From<StaySyncError> for InfraError {
    fn from(value: StaySyncError) -> Self {
        InfraError(value)
    }
}

impl From<reqwest::Error> for InfraError {
    fn from(value: reqwest::Error) -> Self {
        let message = if value.is_timeout() {
            "request timed out".to_string()
        } else if value.is_connect() {
            "connection failed".to_string()
        } else if let Some(status) = value.status() {
            format!("upstream returned {status}")
        } else {
            value.to_string()
        };
        InfraError(StaySyncError::Network(message))
    }
}

impl From<rusqlite::Error> for InfraError {
    fn from(value: rusqlite::Error) -> Self {
        use rusqlite::Error as SqlError;

        let error = match value {
            SqlError::QueryReturnedNoRows => {
                StaySyncError::NotFound("no rows returned by query".into())
            }
            SqlError::FromSqlConversionFailure(_, _, cause) => {
                StaySyncError::Persistence(format!("failed to convert sqlite value: {cause}"))
            }
            SqlError::InvalidColumnType(_, _, ty) => {
                StaySyncError::Persistence(format!("invalid column type: {ty}"))
            }
            other => StaySyncError::Persistence(other.to_string()),
        };
        InfraError(error)
    }
}

impl From<csv::Error> for InfraError {
    fn from(value: csv::Error) -> Self {
        InfraError(StaySyncError::Sheet(format!("malformed csv payload: {value}")))
    }
}
