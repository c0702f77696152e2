//! Coupons Repository

use bazaar::discounts::DiscountPercentage;
use jiff_sqlx::Timestamp as SqlxTimestamp;
use sqlx::{FromRow, Postgres, Row, Transaction, postgres::PgRow, query_as};

use crate::domain::{
    coupons::{
        data::NewCoupon,
        records::{CouponRecord, CouponUuid},
    },
    customers::records::CustomerUuid,
};

const FIND_COUPON_BY_CUSTOMER_SQL: &str = include_str!("sql/find_coupon_by_customer.sql");
const UPSERT_COUPON_SQL: &str = include_str!("sql/upsert_coupon.sql");
const DEACTIVATE_COUPON_SQL: &str = include_str!("sql/deactivate_coupon.sql");

#[derive(Debug, Clone, Default)]
pub(crate) struct PgCouponsRepository;

impl PgCouponsRepository {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self
    }

    pub(crate) async fn find_by_customer(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        customer: CustomerUuid,
    ) -> Result<Option<CouponRecord>, sqlx::Error> {
        query_as::<Postgres, CouponRecord>(FIND_COUPON_BY_CUSTOMER_SQL)
            .bind(customer.into_uuid())
            .fetch_optional(&mut **tx)
            .await
    }

    /// Inserts the customer's coupon, replacing any existing one in the same statement.
    pub(crate) async fn upsert_for_customer(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        coupon: &NewCoupon,
    ) -> Result<CouponRecord, sqlx::Error> {
        query_as::<Postgres, CouponRecord>(UPSERT_COUPON_SQL)
            .bind(coupon.uuid.into_uuid())
            .bind(coupon.customer_uuid.into_uuid())
            .bind(&coupon.code)
            .bind(i16::from(coupon.discount))
            .bind(SqlxTimestamp::from(coupon.expires_at))
            .fetch_one(&mut **tx)
            .await
    }

    pub(crate) async fn deactivate(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        customer: CustomerUuid,
        code: &str,
    ) -> Result<Option<CouponRecord>, sqlx::Error> {
        query_as::<Postgres, CouponRecord>(DEACTIVATE_COUPON_SQL)
            .bind(customer.into_uuid())
            .bind(code)
            .fetch_optional(&mut **tx)
            .await
    }
}

impl<'r> FromRow<'r, PgRow> for CouponRecord {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        let discount_i16: i16 = row.try_get("discount_percentage")?;

        let discount =
            DiscountPercentage::try_from(discount_i16).map_err(|e| sqlx::Error::ColumnDecode {
                index: "discount_percentage".to_string(),
                source: Box::new(e),
            })?;

        Ok(Self {
            uuid: CouponUuid::from_uuid(row.try_get("uuid")?),
            customer_uuid: CustomerUuid::from_uuid(row.try_get("customer_uuid")?),
            code: row.try_get("code")?,
            discount,
            expires_at: row.try_get::<SqlxTimestamp, _>("expires_at")?.to_jiff(),
            is_active: row.try_get("is_active")?,
            created_at: row.try_get::<SqlxTimestamp, _>("created_at")?.to_jiff(),
            updated_at: row.try_get::<SqlxTimestamp, _>("updated_at")?.to_jiff(),
        })
    }
}
