//! Coupons Service

use async_trait::async_trait;
use bazaar::coupons::{self, CouponValidation};
use jiff::Timestamp;
use mockall::automock;
use tracing::{Span, debug, info, warn};

use crate::{
    database::Db,
    domain::{
        coupons::{
            CouponsServiceError,
            codes::generate_reward_code,
            data::{NewCoupon, RewardPolicy},
            errors::is_code_collision,
            records::{CouponRecord, CouponUuid},
            repository::PgCouponsRepository,
        },
        customers::records::CustomerUuid,
    },
};

/// Attempts made to find an unused reward code before giving up.
pub const MAX_CODE_ATTEMPTS: usize = 5;

#[derive(Debug, Clone)]
pub struct PgCouponsService {
    db: Db,
    repository: PgCouponsRepository,
    policy: RewardPolicy,
}

impl PgCouponsService {
    #[must_use]
    pub fn new(db: Db) -> Self {
        Self::with_policy(db, RewardPolicy::default())
    }

    #[must_use]
    pub fn with_policy(db: Db, policy: RewardPolicy) -> Self {
        Self {
            db,
            repository: PgCouponsRepository::new(),
            policy,
        }
    }
}

#[async_trait]
impl CouponsService for PgCouponsService {
    #[tracing::instrument(
        name = "coupons.service.validate_coupon",
        skip(self, code),
        fields(
            customer_uuid = %customer,
            has_code = code.is_some(),
            outcome = tracing::field::Empty
        ),
        err
    )]
    async fn validate_coupon(
        &self,
        customer: CustomerUuid,
        code: Option<String>,
        now: Timestamp,
    ) -> Result<CouponValidation<CouponRecord>, CouponsServiceError> {
        let stored = if code.as_deref().is_some_and(|c| !c.trim().is_empty()) {
            let mut tx = self.db.begin_transaction().await?;

            let stored = self.repository.find_by_customer(&mut tx, customer).await?;

            tx.commit().await?;

            stored
        } else {
            None
        };

        let validation = coupons::validate_coupon(code.as_deref(), stored, now);

        match validation.not_applied_reason() {
            Some(reason) => {
                Span::current().record("outcome", tracing::field::display(reason));

                debug!(%reason, "coupon not applied");
            }
            None => {
                Span::current().record("outcome", "applied");
            }
        }

        Ok(validation)
    }

    #[tracing::instrument(
        name = "coupons.service.issue_reward_coupon",
        skip(self),
        fields(
            customer_uuid = %customer,
            coupon_uuid = tracing::field::Empty,
            attempts = tracing::field::Empty
        ),
        err
    )]
    async fn issue_reward_coupon(
        &self,
        customer: CustomerUuid,
        issued_at: Timestamp,
    ) -> Result<CouponRecord, CouponsServiceError> {
        let expires_at = self
            .policy
            .expiry_from(issued_at)
            .map_err(CouponsServiceError::InvalidExpiry)?;

        let span = Span::current();

        for attempt in 1..=MAX_CODE_ATTEMPTS {
            let coupon = NewCoupon {
                uuid: CouponUuid::new(),
                customer_uuid: customer,
                code: generate_reward_code(),
                discount: self.policy.discount,
                expires_at,
            };

            let mut tx = self.db.begin_transaction().await?;

            match self.repository.upsert_for_customer(&mut tx, &coupon).await {
                Ok(record) => {
                    tx.commit().await?;

                    span.record("coupon_uuid", tracing::field::display(record.uuid));
                    span.record("attempts", attempt);

                    info!(coupon_uuid = %record.uuid, expires_at = %record.expires_at, "issued reward coupon");

                    return Ok(record);
                }
                Err(error) if is_code_collision(&error) => {
                    warn!(attempt, "reward code collided with an existing coupon");
                }
                Err(error) => return Err(error.into()),
            }
        }

        span.record("attempts", MAX_CODE_ATTEMPTS);

        Err(CouponsServiceError::Conflict)
    }

    #[tracing::instrument(
        name = "coupons.service.get_coupon",
        skip(self),
        fields(customer_uuid = %customer),
        err
    )]
    async fn get_coupon(&self, customer: CustomerUuid) -> Result<CouponRecord, CouponsServiceError> {
        let mut tx = self.db.begin_transaction().await?;

        let coupon = self.repository.find_by_customer(&mut tx, customer).await?;

        tx.commit().await?;

        coupon.ok_or(CouponsServiceError::NotFound)
    }

    #[tracing::instrument(
        name = "coupons.service.redeem_coupon",
        skip(self, code),
        fields(customer_uuid = %customer),
        err
    )]
    async fn redeem_coupon(
        &self,
        customer: CustomerUuid,
        code: String,
    ) -> Result<CouponRecord, CouponsServiceError> {
        let mut tx = self.db.begin_transaction().await?;

        let redeemed = self
            .repository
            .deactivate(&mut tx, customer, code.trim())
            .await?;

        let Some(redeemed) = redeemed else {
            return Err(CouponsServiceError::NotFound);
        };

        tx.commit().await?;

        info!(coupon_uuid = %redeemed.uuid, "redeemed coupon");

        Ok(redeemed)
    }
}

#[automock]
#[async_trait]
pub trait CouponsService: Send + Sync {
    /// Decides whether the customer's coupon applies to the offered code.
    ///
    /// An unusable code is reported through [`CouponValidation::NotApplied`];
    /// only storage failures are errors.
    async fn validate_coupon(
        &self,
        customer: CustomerUuid,
        code: Option<String>,
        now: Timestamp,
    ) -> Result<CouponValidation<CouponRecord>, CouponsServiceError>;

    /// Issues a fresh reward coupon, replacing any coupon the customer holds.
    async fn issue_reward_coupon(
        &self,
        customer: CustomerUuid,
        issued_at: Timestamp,
    ) -> Result<CouponRecord, CouponsServiceError>;

    /// Retrieves the customer's coupon.
    async fn get_coupon(&self, customer: CustomerUuid) -> Result<CouponRecord, CouponsServiceError>;

    /// Marks the customer's active coupon with `code` as used.
    async fn redeem_coupon(
        &self,
        customer: CustomerUuid,
        code: String,
    ) -> Result<CouponRecord, CouponsServiceError>;
}
