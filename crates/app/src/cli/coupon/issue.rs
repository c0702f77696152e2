use bazaar_app::{
    database::{self, Db},
    domain::coupons::{CouponsService, PgCouponsService},
};
use clap::Args;
use jiff::Timestamp;
use uuid::Uuid;

use crate::cli::args::{DatabaseArgs, RewardArgs};

#[derive(Debug, Args)]
pub(crate) struct IssueCouponArgs {
    #[command(flatten)]
    database: DatabaseArgs,

    #[command(flatten)]
    rewards: RewardArgs,

    /// Customer receiving the coupon
    #[arg(long)]
    customer_uuid: Uuid,
}

pub(crate) async fn run(args: IssueCouponArgs) -> Result<(), String> {
    let policy = args.rewards.policy()?;

    let pool = database::connect(&args.database.database_url)
        .await
        .map_err(|error| format!("failed to connect to database: {error}"))?;

    let service = PgCouponsService::with_policy(Db::new(pool), policy);

    let coupon = service
        .issue_reward_coupon(args.customer_uuid.into(), Timestamp::now())
        .await
        .map_err(|error| format!("failed to issue coupon: {error}"))?;

    super::print_coupon(&coupon);

    Ok(())
}
