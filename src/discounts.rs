//! Discounts

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised while constructing a discount percentage.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DiscountPercentageError {
    /// The value exceeded 100.
    #[error("discount percentage {0} is above 100")]
    OutOfRange(i64),
}

/// A whole-number percentage between 0 and 100 inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct DiscountPercentage(u8);

impl DiscountPercentage {
    /// No discount.
    pub const ZERO: Self = Self(0);

    /// The whole amount is discounted.
    pub const FULL: Self = Self(100);

    /// Creates a percentage.
    ///
    /// # Errors
    ///
    /// Returns [`DiscountPercentageError::OutOfRange`] if `value` is above 100.
    pub fn new(value: u8) -> Result<Self, DiscountPercentageError> {
        if value > 100 {
            return Err(DiscountPercentageError::OutOfRange(i64::from(value)));
        }

        Ok(Self(value))
    }

    /// Creates a percentage, capping `value` at 100.
    pub const fn saturating(value: u8) -> Self {
        if value > 100 {
            Self::FULL
        } else {
            Self(value)
        }
    }

    /// Returns the percentage points.
    pub const fn value(self) -> u8 {
        self.0
    }
}

impl TryFrom<u8> for DiscountPercentage {
    type Error = DiscountPercentageError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl TryFrom<i16> for DiscountPercentage {
    type Error = DiscountPercentageError;

    fn try_from(value: i16) -> Result<Self, Self::Error> {
        match u8::try_from(value) {
            Ok(points) => Self::new(points),
            Err(_) => Err(DiscountPercentageError::OutOfRange(i64::from(value))),
        }
    }
}

impl From<DiscountPercentage> for u8 {
    fn from(value: DiscountPercentage) -> Self {
        value.0
    }
}

impl From<DiscountPercentage> for i16 {
    fn from(value: DiscountPercentage) -> Self {
        i16::from(value.0)
    }
}

impl fmt::Display for DiscountPercentage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}%", self.0)
    }
}

/// Amount taken off `total` by `percentage`, rounded half up to a whole minor unit.
///
/// Never exceeds `total`.
pub fn discount_amount(total: u64, percentage: DiscountPercentage) -> u64 {
    let scaled = u128::from(total) * u128::from(percentage.value());

    // (100 * total + 50) / 100 == total, so the rounded amount always fits.
    u64::try_from((scaled + 50) / 100).unwrap_or(total)
}

/// Applies a percentage discount to a minor-unit total.
///
/// The result is always within `0..=total`.
pub fn apply_discount(total: u64, percentage: DiscountPercentage) -> u64 {
    total.saturating_sub(discount_amount(total, percentage))
}
