//! Coupons Data

use bazaar::discounts::DiscountPercentage;
use jiff::{SignedDuration, Timestamp};

use crate::domain::{coupons::records::CouponUuid, customers::records::CustomerUuid};

/// Reward coupons are valid for thirty whole days.
pub const DEFAULT_REWARD_VALIDITY: SignedDuration = SignedDuration::from_hours(30 * 24);

/// Reward coupons take ten percent off.
pub const DEFAULT_REWARD_DISCOUNT: DiscountPercentage = DiscountPercentage::saturating(10);

/// New Coupon Data
#[derive(Debug, Clone, PartialEq)]
pub struct NewCoupon {
    pub uuid: CouponUuid,
    pub customer_uuid: CustomerUuid,
    pub code: String,
    pub discount: DiscountPercentage,
    pub expires_at: Timestamp,
}

/// Terms of the coupon issued after a purchase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RewardPolicy {
    pub discount: DiscountPercentage,
    pub validity: SignedDuration,
}

impl RewardPolicy {
    /// Expiry of a coupon issued at `issued_at`.
    ///
    /// # Errors
    ///
    /// Returns an error if the expiry falls outside the supported timestamp range.
    pub fn expiry_from(&self, issued_at: Timestamp) -> Result<Timestamp, jiff::Error> {
        issued_at.checked_add(self.validity)
    }
}

impl Default for RewardPolicy {
    fn default() -> Self {
        Self {
            discount: DEFAULT_REWARD_DISCOUNT,
            validity: DEFAULT_REWARD_VALIDITY,
        }
    }
}
