//! Analytics service errors.

use bazaar::reporting::InvalidRangeError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AnalyticsServiceError {
    #[error("invalid reporting range")]
    InvalidRange(#[from] InvalidRangeError),

    #[error("stored aggregate out of range")]
    InvalidData,

    #[error("storage error")]
    Sql(#[source] sqlx::Error),
}

impl From<sqlx::Error> for AnalyticsServiceError {
    fn from(error: sqlx::Error) -> Self {
        if matches!(error, sqlx::Error::ColumnDecode { .. }) {
            return Self::InvalidData;
        }

        Self::Sql(error)
    }
}
