//! Test Helpers
//!
//! Customers, products and historical orders are written with raw SQL; the
//! services under test never create them.

use jiff::Timestamp;
use jiff_sqlx::Timestamp as SqlxTimestamp;
use sqlx::PgPool;
use uuid::Uuid;

use crate::{domain::customers::records::CustomerUuid, test::TestContext};

pub(crate) async fn insert_customer(pool: &PgPool) -> Result<CustomerUuid, sqlx::Error> {
    let uuid = Uuid::now_v7();

    sqlx::query("INSERT INTO customers (uuid) VALUES ($1)")
        .bind(uuid)
        .execute(pool)
        .await?;

    Ok(CustomerUuid::from_uuid(uuid))
}

pub(crate) async fn insert_product(pool: &PgPool, name: &str, price: i64) -> Result<(), sqlx::Error> {
    sqlx::query("INSERT INTO products (uuid, name, price) VALUES ($1, $2, $3)")
        .bind(Uuid::now_v7())
        .bind(name)
        .bind(price)
        .execute(pool)
        .await?;

    Ok(())
}

/// Records an order for the context's customer as if it were placed at `created_at`.
pub(crate) async fn insert_order_at(
    ctx: &TestContext,
    created_at: Timestamp,
    total_amount: i64,
) -> Result<(), sqlx::Error> {
    let uuid = Uuid::now_v7();

    sqlx::query(
        "INSERT INTO orders (uuid, customer_uuid, checkout_session_id, total_amount, created_at) \
         VALUES ($1, $2, $3, $4, $5)",
    )
    .bind(uuid)
    .bind(ctx.customer_uuid.into_uuid())
    .bind(format!("cs_test_{}", uuid.simple()))
    .bind(total_amount)
    .bind(SqlxTimestamp::from(created_at))
    .execute(ctx.db.pool())
    .await?;

    Ok(())
}
