//! Checkout Service

use std::sync::Arc;

use async_trait::async_trait;
use bazaar::{
    coupons::{CouponValidation, NotAppliedReason},
    discounts::apply_discount,
    pricing::{CartLineItem, PricedCart, price_cart},
};
use jiff::Timestamp;
use mockall::automock;
use tracing::{Span, info, warn};

use crate::{
    domain::{
        checkout::{
            CheckoutServiceError,
            data::{
                CheckoutRequest, CheckoutSession, CheckoutSettings, CompletedPurchase,
                DiscountOutcome, PurchaseConfirmation,
            },
        },
        coupons::{CouponsService, CouponsServiceError, records::CouponRecord},
        customers::records::CustomerUuid,
        orders::{
            OrdersService, OrdersServiceError,
            data::{NewOrder, NewOrderItem},
            records::OrderUuid,
        },
    },
    gateway::{
        PaymentGateway,
        models::{
            COUPON_CODE_METADATA_KEY, CUSTOMER_UUID_METADATA_KEY, CheckoutRedirects,
            GatewayLineItem, GatewaySessionRequest,
        },
    },
};

/// Checkout backed by a hosted payment gateway.
#[derive(Clone)]
pub struct GatewayCheckoutService {
    coupons: Arc<dyn CouponsService>,
    orders: Arc<dyn OrdersService>,
    gateway: Arc<dyn PaymentGateway>,
    settings: CheckoutSettings,
}

impl GatewayCheckoutService {
    #[must_use]
    pub fn new(
        coupons: Arc<dyn CouponsService>,
        orders: Arc<dyn OrdersService>,
        gateway: Arc<dyn PaymentGateway>,
        settings: CheckoutSettings,
    ) -> Self {
        Self {
            coupons,
            orders,
            gateway,
            settings,
        }
    }

    fn price(&self, cart: &[CartLineItem]) -> Result<PricedCart, CheckoutServiceError> {
        Ok(price_cart(cart, self.settings.currency)?)
    }

    /// Validates the offered code, skipping the lookup when none was offered.
    async fn validate(
        &self,
        customer: CustomerUuid,
        code: Option<String>,
        now: Timestamp,
    ) -> Result<CouponValidation<CouponRecord>, CouponsServiceError> {
        match code.filter(|code| !code.trim().is_empty()) {
            Some(code) => self.coupons.validate_coupon(customer, Some(code), now).await,
            None => Ok(CouponValidation::NotApplied(
                NotAppliedReason::NoCodeSupplied,
            )),
        }
    }
}

#[async_trait]
impl CheckoutService for GatewayCheckoutService {
    #[tracing::instrument(
        name = "checkout.service.build_session",
        skip(self, request),
        fields(
            customer_uuid = %request.customer,
            item_count = request.cart.len(),
            total_amount = tracing::field::Empty,
            discount = tracing::field::Empty
        ),
        err
    )]
    async fn build_session(
        &self,
        request: CheckoutRequest,
        now: Timestamp,
    ) -> Result<CheckoutSession, CheckoutServiceError> {
        let priced = self.price(&request.cart)?;

        let validation = self
            .validate(request.customer, request.coupon_code, now)
            .await?;

        let (total_amount, discount) = match validation {
            CouponValidation::Applied(coupon) => {
                let gateway_discount_id = self.gateway.create_discount(coupon.discount).await?;

                (
                    apply_discount(priced.total, coupon.discount),
                    DiscountOutcome::Applied {
                        percentage: coupon.discount,
                        gateway_discount_id,
                        coupon_code: coupon.code,
                    },
                )
            }
            CouponValidation::NotApplied(reason) => {
                (priced.total, DiscountOutcome::NotApplied(reason))
            }
        };

        let line_items: Vec<GatewayLineItem> = priced
            .items
            .iter()
            .map(|item| GatewayLineItem::from_priced(item, priced.currency))
            .collect();

        let redirects = CheckoutRedirects::new(&request.success_url, request.cancel_url);

        let mut metadata = vec![(
            CUSTOMER_UUID_METADATA_KEY.to_string(),
            request.customer.to_string(),
        )];

        let gateway_discount = match &discount {
            DiscountOutcome::Applied {
                gateway_discount_id,
                coupon_code,
                ..
            } => {
                metadata.push((COUPON_CODE_METADATA_KEY.to_string(), coupon_code.clone()));

                Some(gateway_discount_id.clone())
            }
            DiscountOutcome::NotApplied(_) => None,
        };

        let session = self
            .gateway
            .create_checkout_session(GatewaySessionRequest {
                line_items: line_items.clone(),
                redirects: redirects.clone(),
                discount: gateway_discount,
                client_reference_id: Some(request.customer.to_string()),
                metadata,
            })
            .await?;

        let span = Span::current();

        span.record("total_amount", total_amount);

        match &discount {
            DiscountOutcome::Applied { percentage, .. } => {
                span.record("discount", tracing::field::display(percentage));
            }
            DiscountOutcome::NotApplied(reason) => {
                span.record("discount", tracing::field::display(reason));
            }
        }

        info!(session_id = %session.id, total_amount, "created checkout session");

        Ok(CheckoutSession {
            session_id: session.id,
            redirect_url: session.url,
            line_items,
            subtotal_amount: priced.total,
            total_amount,
            currency: priced.currency,
            discount,
            redirects,
        })
    }

    #[tracing::instrument(
        name = "checkout.service.complete_purchase",
        skip(self, confirmation),
        fields(
            customer_uuid = %confirmation.customer,
            checkout_session_id = %confirmation.checkout_session_id,
            order_uuid = tracing::field::Empty,
            resumed = tracing::field::Empty,
            rewarded = tracing::field::Empty
        ),
        err
    )]
    async fn complete_purchase(
        &self,
        confirmation: PurchaseConfirmation,
        now: Timestamp,
    ) -> Result<CompletedPurchase, CheckoutServiceError> {
        let priced = self.price(&confirmation.cart)?;
        let customer = confirmation.customer;
        let session_id = confirmation.checkout_session_id;

        let charged = self.gateway.get_checkout_session(&session_id).await?;

        if charged.client_reference_id != Some(customer.to_string()) {
            return Err(CheckoutServiceError::CustomerMismatch);
        }

        if !charged.paid {
            return Err(CheckoutServiceError::NotPaid);
        }

        let recorded = self
            .orders
            .record_order(NewOrder {
                uuid: OrderUuid::new(),
                customer_uuid: customer,
                checkout_session_id: session_id.clone(),
                coupon_code: charged
                    .metadata_value(COUPON_CODE_METADATA_KEY)
                    .map(ToString::to_string),
                items: priced.items.iter().map(NewOrderItem::from).collect(),
                total_amount: charged.amount_total,
            })
            .await;

        // A previous attempt may have recorded the order and failed before settling it.
        let (mut order, resumed) = match recorded {
            Ok(order) => (order, false),
            Err(OrdersServiceError::AlreadyExists) => {
                let existing = self.orders.find_by_checkout_session(session_id).await?;

                if existing.fulfilled_at.is_some() {
                    return Err(CheckoutServiceError::AlreadyRecorded);
                }

                info!(order_uuid = %existing.uuid, "resuming unfulfilled purchase");

                (existing, true)
            }
            Err(error) => return Err(error.into()),
        };

        let span = Span::current();

        span.record("order_uuid", tracing::field::display(order.uuid));
        span.record("resumed", resumed);

        let redeemed_coupon = match order.coupon_code.clone() {
            Some(code) => match self.coupons.redeem_coupon(customer, code).await {
                Ok(redeemed) => Some(redeemed),
                Err(CouponsServiceError::NotFound) => {
                    warn!(order_uuid = %order.uuid, "applied coupon was already redeemed");

                    None
                }
                Err(error) => return Err(error.into()),
            },
            None => None,
        };

        let reward_coupon = if self.settings.earns_reward(order.total_amount) {
            Some(self.coupons.issue_reward_coupon(customer, now).await?)
        } else {
            None
        };

        order.fulfilled_at = Some(self.orders.mark_fulfilled(order.uuid, now).await?);

        span.record("rewarded", reward_coupon.is_some());

        info!(order_uuid = %order.uuid, total_amount = order.total_amount, "completed purchase");

        Ok(CompletedPurchase {
            order,
            redeemed_coupon,
            reward_coupon,
        })
    }
}

#[automock]
#[async_trait]
pub trait CheckoutService: Send + Sync {
    /// Prices the cart, applies the customer's coupon when valid, and opens a
    /// hosted checkout session.
    ///
    /// A coupon that does not apply leaves the total unchanged; it never fails
    /// the checkout.
    async fn build_session(
        &self,
        request: CheckoutRequest,
        now: Timestamp,
    ) -> Result<CheckoutSession, CheckoutServiceError>;

    /// Records a paid checkout session at the amount the gateway charged,
    /// redeems the coupon it used, and issues the next reward coupon.
    ///
    /// Retrying after a failure resumes an order that was recorded but never
    /// fulfilled; a fulfilled session yields
    /// [`CheckoutServiceError::AlreadyRecorded`].
    async fn complete_purchase(
        &self,
        confirmation: PurchaseConfirmation,
        now: Timestamp,
    ) -> Result<CompletedPurchase, CheckoutServiceError>;
}
