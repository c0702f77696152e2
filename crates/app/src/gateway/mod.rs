//! Payment Gateway

use async_trait::async_trait;
use bazaar::discounts::DiscountPercentage;
use mockall::automock;

pub mod errors;
pub mod models;
mod stripe;

pub use errors::GatewayError;
pub use stripe::{StripeClient, StripeConfig};

use models::{GatewayDiscountId, GatewaySession, GatewaySessionDetails, GatewaySessionRequest};

/// Hosted payment gateway reached during checkout.
#[automock]
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Creates a single-use percentage discount object and returns its identifier.
    async fn create_discount(
        &self,
        percentage: DiscountPercentage,
    ) -> Result<GatewayDiscountId, GatewayError>;

    /// Creates a hosted checkout session.
    async fn create_checkout_session(
        &self,
        request: GatewaySessionRequest,
    ) -> Result<GatewaySession, GatewayError>;

    /// Retrieves a checkout session, including what it actually charged.
    async fn get_checkout_session(
        &self,
        session_id: &str,
    ) -> Result<GatewaySessionDetails, GatewayError>;
}
