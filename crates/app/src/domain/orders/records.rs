//! Order Records

use jiff::Timestamp;

use crate::{domain::customers::records::CustomerUuid, uuids::TypedUuid};

/// Order UUID
pub type OrderUuid = TypedUuid<OrderRecord>;

/// Order Record
#[derive(Debug, Clone, PartialEq)]
pub struct OrderRecord {
    pub uuid: OrderUuid,
    pub customer_uuid: CustomerUuid,
    pub checkout_session_id: String,
    pub coupon_code: Option<String>,
    pub items: Vec<OrderItemRecord>,

    /// Amount charged, in minor units, after any discount.
    pub total_amount: u64,
    pub created_at: Timestamp,

    /// When the coupon redemption and reward for this order were settled.
    pub fulfilled_at: Option<Timestamp>,
}

/// Order Item Record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderItemRecord {
    pub product_id: String,
    pub name: String,
    pub unit_amount: u64,
    pub quantity: u32,
}
