//! Analytics Service

use async_trait::async_trait;
use bazaar::reporting::{DailySalesRecord, DateRange, SalesTotals, reconcile_daily_sales};
use jiff::{Timestamp, civil::Date, tz::TimeZone};
use mockall::automock;
use tracing::Span;

use crate::{
    database::Db,
    domain::analytics::{AnalyticsServiceError, repository::PgSalesRepository},
};

#[derive(Debug, Clone)]
pub struct PgAnalyticsService {
    db: Db,
    repository: PgSalesRepository,
}

impl PgAnalyticsService {
    #[must_use]
    pub fn new(db: Db) -> Self {
        Self {
            db,
            repository: PgSalesRepository::new(),
        }
    }
}

/// UTC instant window covering every day of `range`.
///
/// The upper bound is exclusive. It is `None` when the midnight after the last
/// day lies beyond the representable instants, leaving the window open-ended.
fn utc_window(range: &DateRange) -> (Timestamp, Option<Timestamp>) {
    let from = utc_midnight(range.start()).unwrap_or(if range.start().year() < 0 {
        Timestamp::MIN
    } else {
        Timestamp::MAX
    });

    let until = range.end().tomorrow().ok().and_then(utc_midnight);

    (from, until)
}

fn utc_midnight(day: Date) -> Option<Timestamp> {
    day.to_zoned(TimeZone::UTC)
        .ok()
        .map(|zoned| zoned.timestamp())
}

#[async_trait]
impl AnalyticsService for PgAnalyticsService {
    #[tracing::instrument(
        name = "analytics.service.daily_sales",
        skip(self),
        fields(
            start = %start,
            end = %end,
            active_days = tracing::field::Empty
        ),
        err
    )]
    async fn daily_sales(
        &self,
        start: Date,
        end: Date,
    ) -> Result<Vec<DailySalesRecord>, AnalyticsServiceError> {
        let range = DateRange::new(start, end)?;
        let (from, until) = utc_window(&range);

        let mut tx = self.db.begin_transaction().await?;

        let aggregates = self.repository.aggregate_daily(&mut tx, from, until).await?;

        tx.commit().await?;

        Span::current().record("active_days", aggregates.len());

        Ok(reconcile_daily_sales(&range, aggregates))
    }

    #[tracing::instrument(name = "analytics.service.totals", skip(self), err)]
    async fn totals(&self) -> Result<SalesTotals, AnalyticsServiceError> {
        let mut tx = self.db.begin_transaction().await?;

        let totals = self.repository.totals(&mut tx).await?;

        tx.commit().await?;

        Ok(totals)
    }
}

#[automock]
#[async_trait]
pub trait AnalyticsService: Send + Sync {
    /// One record per day from `start` through `end`, with days lacking orders zero-filled.
    async fn daily_sales(
        &self,
        start: Date,
        end: Date,
    ) -> Result<Vec<DailySalesRecord>, AnalyticsServiceError>;

    /// Store-wide customer, product, and order counts plus total revenue.
    async fn totals(&self) -> Result<SalesTotals, AnalyticsServiceError>;
}
