//! Checkout Data

use bazaar::{coupons::NotAppliedReason, discounts::DiscountPercentage, pricing::CartLineItem};
use rusty_money::iso;

use crate::{
    domain::{
        coupons::records::CouponRecord, customers::records::CustomerUuid,
        orders::records::OrderRecord,
    },
    gateway::models::{CheckoutRedirects, GatewayDiscountId, GatewayLineItem},
};

/// Checkout Settings
#[derive(Debug, Clone, Copy)]
pub struct CheckoutSettings {
    /// Currency carts are priced in.
    pub currency: &'static iso::Currency,

    /// Smallest charged total, in minor units, that earns a reward coupon.
    /// `None` rewards every purchase.
    pub reward_minimum_order_total: Option<u64>,
}

impl Default for CheckoutSettings {
    fn default() -> Self {
        Self {
            currency: iso::USD,
            reward_minimum_order_total: None,
        }
    }
}

impl CheckoutSettings {
    /// Whether a purchase charging `total` earns a reward coupon.
    #[must_use]
    pub fn earns_reward(&self, total: u64) -> bool {
        self.reward_minimum_order_total
            .is_none_or(|minimum| total >= minimum)
    }
}

/// Checkout Request
#[derive(Debug, Clone, PartialEq)]
pub struct CheckoutRequest {
    pub customer: CustomerUuid,
    pub cart: Vec<CartLineItem>,
    pub coupon_code: Option<String>,
    pub success_url: String,
    pub cancel_url: String,
}

/// Whether checkout applied a coupon.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DiscountOutcome {
    Applied {
        percentage: DiscountPercentage,
        gateway_discount_id: GatewayDiscountId,
        coupon_code: String,
    },
    NotApplied(NotAppliedReason),
}

/// A hosted checkout session ready for the customer.
#[derive(Debug, Clone, PartialEq)]
pub struct CheckoutSession {
    pub session_id: String,
    pub redirect_url: String,
    pub line_items: Vec<GatewayLineItem>,

    /// Cart total before any discount, in minor units.
    pub subtotal_amount: u64,

    /// Amount the customer will be charged, in minor units.
    pub total_amount: u64,
    pub currency: &'static iso::Currency,
    pub discount: DiscountOutcome,
    pub redirects: CheckoutRedirects,
}

impl CheckoutSession {
    #[must_use]
    pub fn applied_discount_percentage(&self) -> Option<DiscountPercentage> {
        match &self.discount {
            DiscountOutcome::Applied { percentage, .. } => Some(*percentage),
            DiscountOutcome::NotApplied(_) => None,
        }
    }

    #[must_use]
    pub fn gateway_discount_id(&self) -> Option<&GatewayDiscountId> {
        match &self.discount {
            DiscountOutcome::Applied {
                gateway_discount_id,
                ..
            } => Some(gateway_discount_id),
            DiscountOutcome::NotApplied(_) => None,
        }
    }

    #[must_use]
    pub fn success_redirect(&self) -> &str {
        self.redirects.success_url()
    }

    #[must_use]
    pub fn cancel_redirect(&self) -> &str {
        self.redirects.cancel_url()
    }
}

/// Notice that the customer returned from a checkout session.
///
/// The charged amount and applied coupon are read back from the gateway; the
/// cart only supplies the order's line items.
#[derive(Debug, Clone, PartialEq)]
pub struct PurchaseConfirmation {
    pub customer: CustomerUuid,
    pub checkout_session_id: String,
    pub cart: Vec<CartLineItem>,
}

/// Completed Purchase
#[derive(Debug, Clone, PartialEq)]
pub struct CompletedPurchase {
    pub order: OrderRecord,

    /// Coupon used up by this purchase.
    pub redeemed_coupon: Option<CouponRecord>,

    /// Coupon issued for the next purchase.
    pub reward_coupon: Option<CouponRecord>,
}
