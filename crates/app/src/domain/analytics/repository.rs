//! Sales Repository
//!
//! Read-only aggregates over the order store.

use bazaar::reporting::{DailyAggregate, SalesTotals};
use jiff::Timestamp;
use jiff_sqlx::{Date as SqlxDate, Timestamp as SqlxTimestamp};
use sqlx::{Postgres, Row, Transaction, postgres::PgRow, query};

const DAILY_SALES_SQL: &str = include_str!("sql/daily_sales.sql");
const SALES_TOTALS_SQL: &str = include_str!("sql/sales_totals.sql");

#[derive(Debug, Clone, Default)]
pub(crate) struct PgSalesRepository;

impl PgSalesRepository {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self
    }

    /// Orders created in `[from, until)`, grouped by UTC calendar day.
    ///
    /// Without `until` every order from `from` onwards is included.
    pub(crate) async fn aggregate_daily(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        from: Timestamp,
        until: Option<Timestamp>,
    ) -> Result<Vec<DailyAggregate>, sqlx::Error> {
        let rows = query(DAILY_SALES_SQL)
            .bind(SqlxTimestamp::from(from))
            .bind(until.map(SqlxTimestamp::from))
            .fetch_all(&mut **tx)
            .await?;

        rows.iter()
            .map(|row| {
                Ok(DailyAggregate {
                    day: row.try_get::<SqlxDate, _>("day")?.to_jiff(),
                    sales_count: count(row, "sales_count")?,
                    revenue: count(row, "revenue")?,
                })
            })
            .collect()
    }

    pub(crate) async fn totals(
        &self,
        tx: &mut Transaction<'_, Postgres>,
    ) -> Result<SalesTotals, sqlx::Error> {
        let row = query(SALES_TOTALS_SQL).fetch_one(&mut **tx).await?;

        Ok(SalesTotals {
            user_count: count(&row, "user_count")?,
            product_count: count(&row, "product_count")?,
            order_count: count(&row, "order_count")?,
            total_revenue: count(&row, "total_revenue")?,
        })
    }
}

fn count(row: &PgRow, column: &str) -> sqlx::Result<u64> {
    let value: i64 = row.try_get(column)?;

    u64::try_from(value).map_err(|e| sqlx::Error::ColumnDecode {
        index: column.to_string(),
        source: Box::new(e),
    })
}
