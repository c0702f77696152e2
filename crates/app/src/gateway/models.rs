//! Payment Gateway Models

use std::{collections::BTreeMap, fmt};

use bazaar::pricing::PricedLineItem;
use rusty_money::iso;

/// Placeholder the gateway substitutes with the session identifier on redirect.
pub const CHECKOUT_SESSION_ID_PLACEHOLDER: &str = "{CHECKOUT_SESSION_ID}";

/// Session metadata key carrying the customer identifier.
pub const CUSTOMER_UUID_METADATA_KEY: &str = "customer_uuid";

/// Session metadata key carrying the applied coupon code.
pub const COUPON_CODE_METADATA_KEY: &str = "coupon_code";

/// Identifier of a discount object minted by the gateway.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct GatewayDiscountId(String);

impl GatewayDiscountId {
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for GatewayDiscountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A line item in the shape the gateway expects.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GatewayLineItem {
    pub name: String,
    pub images: Vec<String>,
    pub unit_amount: u64,
    pub quantity: u32,

    /// Lowercase ISO 4217 code, e.g. `"usd"`.
    pub currency: String,
}

impl GatewayLineItem {
    /// Maps a priced line item, carrying its image when present.
    #[must_use]
    pub fn from_priced(item: &PricedLineItem, currency: &iso::Currency) -> Self {
        Self {
            name: item.name.clone(),
            images: item.image.iter().cloned().collect(),
            unit_amount: item.unit_amount,
            quantity: item.quantity,
            currency: currency.iso_alpha_code.to_ascii_lowercase(),
        }
    }
}

/// Where the gateway sends the customer after paying or abandoning checkout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckoutRedirects {
    success_url: String,
    cancel_url: String,
}

impl CheckoutRedirects {
    /// Builds redirects, appending the session id placeholder to the success URL.
    #[must_use]
    pub fn new(success_url: &str, cancel_url: impl Into<String>) -> Self {
        let separator = if success_url.contains('?') { '&' } else { '?' };

        Self {
            success_url: format!(
                "{success_url}{separator}session_id={CHECKOUT_SESSION_ID_PLACEHOLDER}"
            ),
            cancel_url: cancel_url.into(),
        }
    }

    #[must_use]
    pub fn success_url(&self) -> &str {
        &self.success_url
    }

    #[must_use]
    pub fn cancel_url(&self) -> &str {
        &self.cancel_url
    }
}

/// Everything needed to open a hosted checkout session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GatewaySessionRequest {
    pub line_items: Vec<GatewayLineItem>,
    pub redirects: CheckoutRedirects,
    pub discount: Option<GatewayDiscountId>,
    pub client_reference_id: Option<String>,
    pub metadata: Vec<(String, String)>,
}

/// A hosted checkout session created by the gateway.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GatewaySession {
    pub id: String,
    pub url: String,
}

/// A checkout session as the gateway reports it after the customer returns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GatewaySessionDetails {
    pub id: String,
    pub client_reference_id: Option<String>,

    /// Amount charged after discounts, in minor units.
    pub amount_total: u64,

    /// Whether the customer completed payment.
    pub paid: bool,
    pub metadata: BTreeMap<String, String>,
}

impl GatewaySessionDetails {
    #[must_use]
    pub fn metadata_value(&self, key: &str) -> Option<&str> {
        self.metadata.get(key).map(String::as_str)
    }
}
