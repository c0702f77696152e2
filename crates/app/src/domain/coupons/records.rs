//! Coupon Records

use bazaar::{coupons::Redeemable, discounts::DiscountPercentage};
use jiff::Timestamp;

use crate::{domain::customers::records::CustomerUuid, uuids::TypedUuid};

/// Coupon UUID
pub type CouponUuid = TypedUuid<CouponRecord>;

/// Coupon Record
#[derive(Debug, Clone, PartialEq)]
pub struct CouponRecord {
    pub uuid: CouponUuid,
    pub customer_uuid: CustomerUuid,
    pub code: String,
    pub discount: DiscountPercentage,
    pub expires_at: Timestamp,
    pub is_active: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Redeemable for CouponRecord {
    fn code(&self) -> &str {
        &self.code
    }

    fn discount(&self) -> DiscountPercentage {
        self.discount
    }

    fn is_active(&self) -> bool {
        self.is_active
    }

    fn expires_at(&self) -> Timestamp {
        self.expires_at
    }
}
