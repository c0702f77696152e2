//! Coupons service errors.

use bazaar::discounts::DiscountPercentageError;
use sqlx::{
    Error,
    error::{DatabaseError, ErrorKind},
};
use thiserror::Error;

/// Unique constraint guarding coupon codes.
pub(crate) const COUPON_CODE_CONSTRAINT: &str = "coupons_code_key";

const SERIALIZATION_FAILURE: &str = "40001";
const DEADLOCK_DETECTED: &str = "40P01";

#[derive(Debug, Error)]
pub enum CouponsServiceError {
    #[error("coupon already exists")]
    AlreadyExists,

    #[error("coupon not found")]
    NotFound,

    #[error("related resource not found")]
    InvalidReference,

    #[error("missing required data")]
    MissingRequiredData,

    #[error("invalid data")]
    InvalidData,

    #[error("coupon was modified concurrently")]
    Conflict,

    #[error("coupon expiry out of range")]
    InvalidExpiry(#[source] jiff::Error),

    #[error("invalid discount percentage")]
    InvalidDiscount(#[from] DiscountPercentageError),

    #[error("storage error")]
    Sql(#[source] Error),
}

impl From<Error> for CouponsServiceError {
    fn from(error: Error) -> Self {
        if matches!(error, Error::RowNotFound) {
            return Self::NotFound;
        }

        if let Some(db_error) = error.as_database_error()
            && matches!(
                db_error.code().as_deref(),
                Some(SERIALIZATION_FAILURE | DEADLOCK_DETECTED)
            )
        {
            return Self::Conflict;
        }

        match error.as_database_error().map(DatabaseError::kind) {
            Some(ErrorKind::UniqueViolation) => Self::AlreadyExists,
            Some(ErrorKind::ForeignKeyViolation) => Self::InvalidReference,
            Some(ErrorKind::NotNullViolation) => Self::MissingRequiredData,
            Some(ErrorKind::CheckViolation) => Self::InvalidData,
            Some(ErrorKind::Other | _) | None => Self::Sql(error),
        }
    }
}

/// Whether `error` is a collision on the coupon code constraint.
pub(crate) fn is_code_collision(error: &Error) -> bool {
    error.as_database_error().is_some_and(|db_error| {
        matches!(db_error.kind(), ErrorKind::UniqueViolation)
            && db_error.constraint() == Some(COUPON_CODE_CONSTRAINT)
    })
}
