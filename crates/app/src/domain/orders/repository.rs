//! Orders Repository

use jiff::Timestamp;
use jiff_sqlx::Timestamp as SqlxTimestamp;
use sqlx::{FromRow, Postgres, Row, Transaction, postgres::PgRow, query, query_as};
use uuid::Uuid;

use crate::domain::{
    customers::records::CustomerUuid,
    orders::{
        data::NewOrder,
        records::{OrderItemRecord, OrderRecord, OrderUuid},
    },
};

const CREATE_ORDER_SQL: &str = include_str!("sql/create_order.sql");
const CREATE_ORDER_ITEM_SQL: &str = include_str!("sql/create_order_item.sql");
const GET_ORDER_SQL: &str = include_str!("sql/get_order.sql");
const GET_ORDER_ITEMS_SQL: &str = include_str!("sql/get_order_items.sql");
const FIND_ORDER_BY_CHECKOUT_SESSION_SQL: &str =
    include_str!("sql/find_order_by_checkout_session.sql");
const MARK_ORDER_FULFILLED_SQL: &str = include_str!("sql/mark_order_fulfilled.sql");

#[derive(Debug, Clone, Default)]
pub(crate) struct PgOrdersRepository;

impl PgOrdersRepository {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self
    }

    pub(crate) async fn create_order(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        order: NewOrder,
    ) -> Result<OrderRecord, sqlx::Error> {
        let (created_at,): (SqlxTimestamp,) = query_as(CREATE_ORDER_SQL)
            .bind(order.uuid.into_uuid())
            .bind(order.customer_uuid.into_uuid())
            .bind(&order.checkout_session_id)
            .bind(order.coupon_code.as_deref())
            .bind(encode_amount(order.total_amount)?)
            .fetch_one(&mut **tx)
            .await?;

        for (position, item) in order.items.iter().enumerate() {
            let position = i32::try_from(position).map_err(|e| sqlx::Error::Encode(Box::new(e)))?;
            let quantity =
                i32::try_from(item.quantity).map_err(|e| sqlx::Error::Encode(Box::new(e)))?;

            query(CREATE_ORDER_ITEM_SQL)
                .bind(Uuid::now_v7())
                .bind(order.uuid.into_uuid())
                .bind(position)
                .bind(&item.product_id)
                .bind(&item.name)
                .bind(encode_amount(item.unit_amount)?)
                .bind(quantity)
                .execute(&mut **tx)
                .await?;
        }

        Ok(OrderRecord {
            uuid: order.uuid,
            customer_uuid: order.customer_uuid,
            checkout_session_id: order.checkout_session_id,
            coupon_code: order.coupon_code,
            items: order
                .items
                .into_iter()
                .map(|item| OrderItemRecord {
                    product_id: item.product_id,
                    name: item.name,
                    unit_amount: item.unit_amount,
                    quantity: item.quantity,
                })
                .collect(),
            total_amount: order.total_amount,
            created_at: created_at.to_jiff(),
            fulfilled_at: None,
        })
    }

    pub(crate) async fn get_order(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        order: OrderUuid,
    ) -> Result<OrderRecord, sqlx::Error> {
        let mut record = query_as::<Postgres, OrderRecord>(GET_ORDER_SQL)
            .bind(order.into_uuid())
            .fetch_one(&mut **tx)
            .await?;

        record.items = self.items(tx, order).await?;

        Ok(record)
    }

    pub(crate) async fn find_by_checkout_session(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        checkout_session_id: &str,
    ) -> Result<Option<OrderRecord>, sqlx::Error> {
        let record = query_as::<Postgres, OrderRecord>(FIND_ORDER_BY_CHECKOUT_SESSION_SQL)
            .bind(checkout_session_id)
            .fetch_optional(&mut **tx)
            .await?;

        let Some(mut record) = record else {
            return Ok(None);
        };

        record.items = self.items(tx, record.uuid).await?;

        Ok(Some(record))
    }

    /// Stamps the order as fulfilled, keeping an earlier stamp if one exists.
    pub(crate) async fn mark_fulfilled(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        order: OrderUuid,
        at: Timestamp,
    ) -> Result<Timestamp, sqlx::Error> {
        let (fulfilled_at,): (SqlxTimestamp,) = query_as(MARK_ORDER_FULFILLED_SQL)
            .bind(order.into_uuid())
            .bind(SqlxTimestamp::from(at))
            .fetch_one(&mut **tx)
            .await?;

        Ok(fulfilled_at.to_jiff())
    }

    async fn items(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        order: OrderUuid,
    ) -> Result<Vec<OrderItemRecord>, sqlx::Error> {
        query_as::<Postgres, OrderItemRecord>(GET_ORDER_ITEMS_SQL)
            .bind(order.into_uuid())
            .fetch_all(&mut **tx)
            .await
    }
}

fn encode_amount(amount: u64) -> Result<i64, sqlx::Error> {
    i64::try_from(amount).map_err(|e| sqlx::Error::Encode(Box::new(e)))
}

fn decode_amount(row: &PgRow, column: &str) -> sqlx::Result<u64> {
    let amount_i64: i64 = row.try_get(column)?;

    u64::try_from(amount_i64).map_err(|e| sqlx::Error::ColumnDecode {
        index: column.to_string(),
        source: Box::new(e),
    })
}

/// Items are loaded separately; the row only carries the order header.
impl<'r> FromRow<'r, PgRow> for OrderRecord {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        Ok(Self {
            uuid: OrderUuid::from_uuid(row.try_get("uuid")?),
            customer_uuid: CustomerUuid::from_uuid(row.try_get("customer_uuid")?),
            checkout_session_id: row.try_get("checkout_session_id")?,
            coupon_code: row.try_get("coupon_code")?,
            items: Vec::new(),
            total_amount: decode_amount(row, "total_amount")?,
            created_at: row.try_get::<SqlxTimestamp, _>("created_at")?.to_jiff(),
            fulfilled_at: row
                .try_get::<Option<SqlxTimestamp>, _>("fulfilled_at")?
                .map(SqlxTimestamp::to_jiff),
        })
    }
}

impl<'r> FromRow<'r, PgRow> for OrderItemRecord {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        let quantity_i32: i32 = row.try_get("quantity")?;

        let quantity = u32::try_from(quantity_i32).map_err(|e| sqlx::Error::ColumnDecode {
            index: "quantity".to_string(),
            source: Box::new(e),
        })?;

        Ok(Self {
            product_id: row.try_get("product_id")?,
            name: row.try_get("name")?,
            unit_amount: decode_amount(row, "unit_amount")?,
            quantity,
        })
    }
}
