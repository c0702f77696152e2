//! Orders Data

use bazaar::pricing::PricedLineItem;

use crate::domain::{customers::records::CustomerUuid, orders::records::OrderUuid};

/// New Order Data
#[derive(Debug, Clone, PartialEq)]
pub struct NewOrder {
    pub uuid: OrderUuid,
    pub customer_uuid: CustomerUuid,
    pub checkout_session_id: String,
    pub coupon_code: Option<String>,
    pub items: Vec<NewOrderItem>,
    pub total_amount: u64,
}

/// New Order Item Data
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewOrderItem {
    pub product_id: String,
    pub name: String,
    pub unit_amount: u64,
    pub quantity: u32,
}

impl From<&PricedLineItem> for NewOrderItem {
    fn from(item: &PricedLineItem) -> Self {
        Self {
            product_id: item.product_id.clone(),
            name: item.name.clone(),
            unit_amount: item.unit_amount,
            quantity: item.quantity,
        }
    }
}
