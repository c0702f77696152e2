//! Stripe-compatible checkout client.

use std::collections::BTreeMap;

use async_trait::async_trait;
use bazaar::discounts::DiscountPercentage;
use reqwest::{Client, Response};
use serde::Deserialize;
use tracing::debug;

use super::{
    GatewayError, PaymentGateway,
    models::{GatewayDiscountId, GatewaySession, GatewaySessionDetails, GatewaySessionRequest},
};

/// Payment statuses that mean nothing is left to collect.
const SETTLED_PAYMENT_STATUSES: [&str; 2] = ["paid", "no_payment_required"];

/// Configuration for connecting to the Stripe API.
#[derive(Debug, Clone)]
pub struct StripeConfig {
    /// API base address, e.g. `"https://api.stripe.com"`.
    pub api_base: String,

    /// Secret API key sent as a bearer token.
    pub secret_key: String,
}

/// HTTP client for Stripe coupons and hosted checkout sessions.
#[derive(Debug, Clone)]
pub struct StripeClient {
    config: StripeConfig,
    http: Client,
}

impl StripeClient {
    /// Create a new client from the given configuration.
    #[must_use]
    pub fn new(config: StripeConfig) -> Self {
        Self {
            config,
            http: Client::new(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.config.api_base.trim_end_matches('/'))
    }

    async fn post_form<T>(
        &self,
        path: &str,
        form: &[(String, String)],
        action: &str,
    ) -> Result<T, GatewayError>
    where
        T: for<'de> Deserialize<'de>,
    {
        let response = self
            .http
            .post(self.url(path))
            .bearer_auth(&self.config.secret_key)
            .form(form)
            .send()
            .await?;

        let response = ensure_success(response, action).await?;

        Ok(response.json().await?)
    }

    async fn get_json<T>(&self, path: &str, action: &str) -> Result<T, GatewayError>
    where
        T: for<'de> Deserialize<'de>,
    {
        let response = self
            .http
            .get(self.url(path))
            .bearer_auth(&self.config.secret_key)
            .send()
            .await?;

        let response = ensure_success(response, action).await?;

        Ok(response.json().await?)
    }
}

/// Session ids are spliced into the request path.
fn is_valid_session_id(session_id: &str) -> bool {
    !session_id.is_empty()
        && session_id
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'_')
}

async fn ensure_success(response: Response, action: &str) -> Result<Response, GatewayError> {
    if response.status().is_success() {
        return Ok(response);
    }

    let status = response.status();
    let text = response.text().await.unwrap_or_default();

    Err(GatewayError::UnexpectedResponse(format!(
        "{action} request failed with status {status}: {text}"
    )))
}

#[async_trait]
impl PaymentGateway for StripeClient {
    async fn create_discount(
        &self,
        percentage: DiscountPercentage,
    ) -> Result<GatewayDiscountId, GatewayError> {
        let parsed: CouponResponse = self
            .post_form("/v1/coupons", &coupon_form(percentage), "coupon")
            .await?;

        debug!(discount_id = %parsed.id, %percentage, "created gateway discount");

        Ok(GatewayDiscountId::new(parsed.id))
    }

    async fn create_checkout_session(
        &self,
        request: GatewaySessionRequest,
    ) -> Result<GatewaySession, GatewayError> {
        let parsed: SessionResponse = self
            .post_form(
                "/v1/checkout/sessions",
                &session_form(&request),
                "checkout session",
            )
            .await?;

        let Some(url) = parsed.url else {
            return Err(GatewayError::UnexpectedResponse(format!(
                "checkout session {} has no redirect url",
                parsed.id
            )));
        };

        debug!(session_id = %parsed.id, "created gateway checkout session");

        Ok(GatewaySession { id: parsed.id, url })
    }

    async fn get_checkout_session(
        &self,
        session_id: &str,
    ) -> Result<GatewaySessionDetails, GatewayError> {
        if !is_valid_session_id(session_id) {
            return Err(GatewayError::InvalidRequest(format!(
                "malformed checkout session id {session_id:?}"
            )));
        }

        let parsed: SessionDetailsResponse = self
            .get_json(
                &format!("/v1/checkout/sessions/{session_id}"),
                "checkout session lookup",
            )
            .await?;

        let Some(amount_total) = parsed.amount_total else {
            return Err(GatewayError::UnexpectedResponse(format!(
                "checkout session {} has no amount total",
                parsed.id
            )));
        };

        let paid = parsed
            .payment_status
            .as_deref()
            .is_some_and(|status| SETTLED_PAYMENT_STATUSES.contains(&status));

        debug!(session_id = %parsed.id, amount_total, paid, "retrieved gateway checkout session");

        Ok(GatewaySessionDetails {
            id: parsed.id,
            client_reference_id: parsed.client_reference_id,
            amount_total,
            paid,
            metadata: parsed.metadata.unwrap_or_default(),
        })
    }
}

#[derive(Debug, Deserialize)]
struct CouponResponse {
    id: String,
}

#[derive(Debug, Deserialize)]
struct SessionResponse {
    id: String,
    url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SessionDetailsResponse {
    id: String,
    client_reference_id: Option<String>,
    amount_total: Option<u64>,
    payment_status: Option<String>,
    metadata: Option<BTreeMap<String, String>>,
}

fn coupon_form(percentage: DiscountPercentage) -> Vec<(String, String)> {
    vec![
        ("percent_off".to_string(), percentage.value().to_string()),
        ("duration".to_string(), "once".to_string()),
    ]
}

/// Flattens a session request into Stripe's bracketed form encoding.
fn session_form(request: &GatewaySessionRequest) -> Vec<(String, String)> {
    let mut form = vec![
        ("mode".to_string(), "payment".to_string()),
        ("payment_method_types[0]".to_string(), "card".to_string()),
        (
            "success_url".to_string(),
            request.redirects.success_url().to_string(),
        ),
        (
            "cancel_url".to_string(),
            request.redirects.cancel_url().to_string(),
        ),
    ];

    for (index, item) in request.line_items.iter().enumerate() {
        let prefix = format!("line_items[{index}]");

        form.push((
            format!("{prefix}[price_data][currency]"),
            item.currency.clone(),
        ));
        form.push((
            format!("{prefix}[price_data][unit_amount]"),
            item.unit_amount.to_string(),
        ));
        form.push((
            format!("{prefix}[price_data][product_data][name]"),
            item.name.clone(),
        ));

        for (image_index, image) in item.images.iter().enumerate() {
            form.push((
                format!("{prefix}[price_data][product_data][images][{image_index}]"),
                image.clone(),
            ));
        }

        form.push((format!("{prefix}[quantity]"), item.quantity.to_string()));
    }

    if let Some(discount) = &request.discount {
        form.push((
            "discounts[0][coupon]".to_string(),
            discount.as_str().to_string(),
        ));
    }

    if let Some(reference) = &request.client_reference_id {
        form.push(("client_reference_id".to_string(), reference.clone()));
    }

    for (key, value) in &request.metadata {
        form.push((format!("metadata[{key}]"), value.clone()));
    }

    form
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use testresult::TestResult;
    use wiremock::{
        Mock, MockServer, ResponseTemplate,
        matchers::{body_string_contains, header, method, path},
    };

    use crate::gateway::models::{CheckoutRedirects, GatewayLineItem};

    use super::*;

    fn client(server: &MockServer) -> StripeClient {
        StripeClient::new(StripeConfig {
            api_base: server.uri(),
            secret_key: "sk_test_123".to_string(),
        })
    }

    fn request(discount: Option<GatewayDiscountId>) -> GatewaySessionRequest {
        GatewaySessionRequest {
            line_items: vec![GatewayLineItem {
                name: "Mug".to_string(),
                images: vec!["https://img.test/mug.png".to_string()],
                unit_amount: 1250,
                quantity: 2,
                currency: "usd".to_string(),
            }],
            redirects: CheckoutRedirects::new("https://shop.test/ok", "https://shop.test/cart"),
            discount,
            client_reference_id: Some("customer-1".to_string()),
            metadata: vec![("coupon_code".to_string(), "GIFTAB12CD34".to_string())],
        }
    }

    fn field<'a>(form: &'a [(String, String)], key: &str) -> Option<&'a str> {
        form.iter()
            .find(|(name, _)| name == key)
            .map(|(_, value)| value.as_str())
    }

    #[test]
    fn test_session_form_encodes_items_discount_and_metadata() {
        let form = session_form(&request(Some(GatewayDiscountId::new("co_1"))));

        assert_eq!(field(&form, "mode"), Some("payment"));
        assert_eq!(field(&form, "payment_method_types[0]"), Some("card"));
        assert_eq!(
            field(&form, "success_url"),
            Some("https://shop.test/ok?session_id={CHECKOUT_SESSION_ID}")
        );
        assert_eq!(
            field(&form, "line_items[0][price_data][unit_amount]"),
            Some("1250")
        );
        assert_eq!(
            field(&form, "line_items[0][price_data][currency]"),
            Some("usd")
        );
        assert_eq!(
            field(&form, "line_items[0][price_data][product_data][images][0]"),
            Some("https://img.test/mug.png")
        );
        assert_eq!(field(&form, "line_items[0][quantity]"), Some("2"));
        assert_eq!(field(&form, "discounts[0][coupon]"), Some("co_1"));
        assert_eq!(field(&form, "client_reference_id"), Some("customer-1"));
        assert_eq!(field(&form, "metadata[coupon_code]"), Some("GIFTAB12CD34"));
    }

    #[test]
    fn test_session_form_omits_discount_when_absent() {
        let form = session_form(&request(None));

        assert_eq!(field(&form, "discounts[0][coupon]"), None);
    }

    #[tokio::test]
    async fn test_create_discount_posts_percentage() -> TestResult {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1/coupons"))
            .and(header("authorization", "Bearer sk_test_123"))
            .and(body_string_contains("percent_off=10"))
            .and(body_string_contains("duration=once"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "id": "co_abc" })))
            .expect(1)
            .mount(&server)
            .await;

        let id = client(&server)
            .create_discount(DiscountPercentage::new(10)?)
            .await?;

        assert_eq!(id, GatewayDiscountId::new("co_abc"));

        Ok(())
    }

    #[tokio::test]
    async fn test_create_checkout_session_returns_id_and_url() -> TestResult {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1/checkout/sessions"))
            .and(body_string_contains("mode=payment"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": "cs_test_1",
                "url": "https://checkout.test/pay/cs_test_1"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let session = client(&server)
            .create_checkout_session(request(None))
            .await?;

        assert_eq!(session.id, "cs_test_1");
        assert_eq!(session.url, "https://checkout.test/pay/cs_test_1");

        Ok(())
    }

    #[tokio::test]
    async fn test_error_status_is_unexpected_response() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1/coupons"))
            .respond_with(ResponseTemplate::new(402).set_body_string("card_declined"))
            .mount(&server)
            .await;

        let result = client(&server)
            .create_discount(DiscountPercentage::ZERO)
            .await;

        assert!(
            matches!(&result, Err(GatewayError::UnexpectedResponse(message)) if message.contains("402")),
            "expected UnexpectedResponse, got {result:?}"
        );
    }

    #[tokio::test]
    async fn test_get_checkout_session_reports_charged_amount() -> TestResult {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/v1/checkout/sessions/cs_test_1"))
            .and(header("authorization", "Bearer sk_test_123"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": "cs_test_1",
                "client_reference_id": "customer-1",
                "amount_total": 2251,
                "payment_status": "paid",
                "metadata": { "coupon_code": "GIFTAB12CD34" }
            })))
            .expect(1)
            .mount(&server)
            .await;

        let details = client(&server).get_checkout_session("cs_test_1").await?;

        assert_eq!(details.amount_total, 2251);
        assert!(details.paid);
        assert_eq!(details.client_reference_id.as_deref(), Some("customer-1"));
        assert_eq!(details.metadata_value("coupon_code"), Some("GIFTAB12CD34"));

        Ok(())
    }

    #[tokio::test]
    async fn test_unpaid_session_is_reported_unpaid() -> TestResult {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/v1/checkout/sessions/cs_test_2"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": "cs_test_2",
                "amount_total": 2501,
                "payment_status": "unpaid",
                "metadata": {}
            })))
            .mount(&server)
            .await;

        let details = client(&server).get_checkout_session("cs_test_2").await?;

        assert!(!details.paid);
        assert_eq!(details.client_reference_id, None);

        Ok(())
    }

    #[tokio::test]
    async fn test_malformed_session_id_is_rejected_before_sending() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let result = client(&server).get_checkout_session("../coupons").await;

        assert!(
            matches!(result, Err(GatewayError::InvalidRequest(_))),
            "expected InvalidRequest, got {result:?}"
        );
    }

    #[tokio::test]
    async fn test_session_without_url_is_unexpected_response() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1/checkout/sessions"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "id": "cs_test_2" })))
            .mount(&server)
            .await;

        let result = client(&server).create_checkout_session(request(None)).await;

        assert!(
            matches!(result, Err(GatewayError::UnexpectedResponse(_))),
            "expected UnexpectedResponse, got {result:?}"
        );
    }
}
