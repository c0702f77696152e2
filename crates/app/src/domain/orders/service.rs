//! Orders Service

use async_trait::async_trait;
use jiff::Timestamp;
use mockall::automock;
use tracing::info;

use crate::{
    database::Db,
    domain::orders::{
        OrdersServiceError,
        data::NewOrder,
        records::{OrderRecord, OrderUuid},
        repository::PgOrdersRepository,
    },
};

#[derive(Debug, Clone)]
pub struct PgOrdersService {
    db: Db,
    repository: PgOrdersRepository,
}

impl PgOrdersService {
    #[must_use]
    pub fn new(db: Db) -> Self {
        Self {
            db,
            repository: PgOrdersRepository::new(),
        }
    }
}

#[async_trait]
impl OrdersService for PgOrdersService {
    #[tracing::instrument(
        name = "orders.service.record_order",
        skip(self, order),
        fields(
            order_uuid = %order.uuid,
            customer_uuid = %order.customer_uuid,
            item_count = order.items.len(),
            total_amount = order.total_amount
        ),
        err
    )]
    async fn record_order(&self, order: NewOrder) -> Result<OrderRecord, OrdersServiceError> {
        let mut tx = self.db.begin_transaction().await?;

        let record = self.repository.create_order(&mut tx, order).await?;

        tx.commit().await?;

        info!(order_uuid = %record.uuid, "recorded order");

        Ok(record)
    }

    #[tracing::instrument(
        name = "orders.service.get_order",
        skip(self),
        fields(order_uuid = %order),
        err
    )]
    async fn get_order(&self, order: OrderUuid) -> Result<OrderRecord, OrdersServiceError> {
        let mut tx = self.db.begin_transaction().await?;

        let record = self.repository.get_order(&mut tx, order).await?;

        tx.commit().await?;

        Ok(record)
    }

    #[tracing::instrument(
        name = "orders.service.find_by_checkout_session",
        skip(self),
        fields(checkout_session_id = %checkout_session_id),
        err
    )]
    async fn find_by_checkout_session(
        &self,
        checkout_session_id: String,
    ) -> Result<OrderRecord, OrdersServiceError> {
        let mut tx = self.db.begin_transaction().await?;

        let record = self
            .repository
            .find_by_checkout_session(&mut tx, &checkout_session_id)
            .await?;

        tx.commit().await?;

        record.ok_or(OrdersServiceError::NotFound)
    }

    #[tracing::instrument(
        name = "orders.service.mark_fulfilled",
        skip(self),
        fields(order_uuid = %order),
        err
    )]
    async fn mark_fulfilled(
        &self,
        order: OrderUuid,
        at: Timestamp,
    ) -> Result<Timestamp, OrdersServiceError> {
        let mut tx = self.db.begin_transaction().await?;

        let fulfilled_at = self.repository.mark_fulfilled(&mut tx, order, at).await?;

        tx.commit().await?;

        info!(order_uuid = %order, %fulfilled_at, "fulfilled order");

        Ok(fulfilled_at)
    }
}

#[automock]
#[async_trait]
pub trait OrdersService: Send + Sync {
    /// Records a completed purchase. Each checkout session is recorded at most once.
    async fn record_order(&self, order: NewOrder) -> Result<OrderRecord, OrdersServiceError>;

    /// Retrieves an order with its items.
    async fn get_order(&self, order: OrderUuid) -> Result<OrderRecord, OrdersServiceError>;

    /// Retrieves the order recorded for a checkout session.
    async fn find_by_checkout_session(
        &self,
        checkout_session_id: String,
    ) -> Result<OrderRecord, OrdersServiceError>;

    /// Marks the order's coupon redemption and reward as settled.
    ///
    /// Returns the stamp in effect; an order that is already fulfilled keeps
    /// its original stamp.
    async fn mark_fulfilled(
        &self,
        order: OrderUuid,
        at: Timestamp,
    ) -> Result<Timestamp, OrdersServiceError>;
}
