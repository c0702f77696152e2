//! App Context

use std::sync::Arc;

use thiserror::Error;

use crate::{
    database::{self, Db},
    domain::{
        analytics::{AnalyticsService, PgAnalyticsService},
        checkout::{CheckoutService, GatewayCheckoutService, data::CheckoutSettings},
        coupons::{CouponsService, PgCouponsService, data::RewardPolicy},
        orders::{OrdersService, PgOrdersService},
    },
    gateway::PaymentGateway,
};

#[derive(Debug, Error)]
pub enum AppInitError {
    #[error("failed to connect to database")]
    Database(#[source] sqlx::Error),
}

/// Tunable business settings.
#[derive(Debug, Clone, Copy, Default)]
pub struct AppSettings {
    pub checkout: CheckoutSettings,
    pub reward_policy: RewardPolicy,
}

#[derive(Clone)]
pub struct AppContext {
    pub coupons: Arc<dyn CouponsService>,
    pub orders: Arc<dyn OrdersService>,
    pub analytics: Arc<dyn AnalyticsService>,
    pub checkout: Arc<dyn CheckoutService>,
}

impl AppContext {
    /// Build application context from a database URL.
    ///
    /// # Errors
    ///
    /// Returns an error when establishing a database connection fails.
    pub async fn from_database_url(
        url: &str,
        gateway: Arc<dyn PaymentGateway>,
        settings: AppSettings,
    ) -> Result<Self, AppInitError> {
        let pool = database::connect(url)
            .await
            .map_err(AppInitError::Database)?;

        Ok(Self::from_db(Db::new(pool), gateway, settings))
    }

    #[must_use]
    pub fn from_db(db: Db, gateway: Arc<dyn PaymentGateway>, settings: AppSettings) -> Self {
        let coupons: Arc<dyn CouponsService> =
            Arc::new(PgCouponsService::with_policy(db.clone(), settings.reward_policy));
        let orders: Arc<dyn OrdersService> = Arc::new(PgOrdersService::new(db.clone()));

        Self {
            checkout: Arc::new(GatewayCheckoutService::new(
                Arc::clone(&coupons),
                Arc::clone(&orders),
                gateway,
                settings.checkout,
            )),
            analytics: Arc::new(PgAnalyticsService::new(db)),
            coupons,
            orders,
        }
    }
}
