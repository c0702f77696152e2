use bazaar_app::{
    database::{self, Db},
    domain::coupons::{CouponsService, CouponsServiceError, PgCouponsService},
};
use clap::Args;
use uuid::Uuid;

use crate::cli::args::DatabaseArgs;

#[derive(Debug, Args)]
pub(crate) struct ShowCouponArgs {
    #[command(flatten)]
    database: DatabaseArgs,

    /// Customer whose coupon should be shown
    #[arg(long)]
    customer_uuid: Uuid,
}

pub(crate) async fn run(args: ShowCouponArgs) -> Result<(), String> {
    let pool = database::connect(&args.database.database_url)
        .await
        .map_err(|error| format!("failed to connect to database: {error}"))?;

    let service = PgCouponsService::new(Db::new(pool));

    match service.get_coupon(args.customer_uuid.into()).await {
        Ok(coupon) => {
            super::print_coupon(&coupon);

            Ok(())
        }
        Err(CouponsServiceError::NotFound) => {
            println!("no coupon found for customer {}", args.customer_uuid);

            Ok(())
        }
        Err(error) => Err(format!("failed to load coupon: {error}")),
    }
}
