//! Checkout service errors.

use bazaar::pricing::PricingError;
use thiserror::Error;

use crate::{
    domain::{coupons::CouponsServiceError, orders::OrdersServiceError},
    gateway::GatewayError,
};

#[derive(Debug, Error)]
pub enum CheckoutServiceError {
    #[error("invalid cart")]
    InvalidCart(#[from] PricingError),

    #[error("checkout session already recorded")]
    AlreadyRecorded,

    #[error("checkout session has not been paid")]
    NotPaid,

    #[error("checkout session belongs to another customer")]
    CustomerMismatch,

    #[error("coupon error")]
    Coupons(#[from] CouponsServiceError),

    #[error("order error")]
    Orders(#[source] OrdersServiceError),

    #[error("payment gateway error")]
    Gateway(#[from] GatewayError),
}

impl From<OrdersServiceError> for CheckoutServiceError {
    fn from(error: OrdersServiceError) -> Self {
        match error {
            OrdersServiceError::AlreadyExists => Self::AlreadyRecorded,
            error => Self::Orders(error),
        }
    }
}
