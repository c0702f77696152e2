use std::path::PathBuf;

use bazaar_app::domain::checkout::data::PurchaseConfirmation;
use clap::Args;
use jiff::Timestamp;
use uuid::Uuid;

use super::CheckoutEnvironment;

#[derive(Debug, Args)]
pub(crate) struct CompleteCheckoutArgs {
    #[command(flatten)]
    environment: CheckoutEnvironment,

    /// Customer who paid
    #[arg(long)]
    customer_uuid: Uuid,

    /// Gateway checkout session identifier
    #[arg(long)]
    session_id: String,

    /// Path to the JSON cart the session was created for
    #[arg(long)]
    cart: PathBuf,
}

pub(crate) async fn run(args: CompleteCheckoutArgs) -> Result<(), String> {
    let cart = super::read_cart(&args.cart)?;
    let ctx = args.environment.context().await?;

    let completed = ctx
        .checkout
        .complete_purchase(
            PurchaseConfirmation {
                customer: args.customer_uuid.into(),
                checkout_session_id: args.session_id,
                cart,
            },
            Timestamp::now(),
        )
        .await
        .map_err(|error| format!("failed to complete purchase: {error}"))?;

    println!("order_uuid: {}", completed.order.uuid);
    println!("total_amount: {}", completed.order.total_amount);
    println!(
        "redeemed_coupon: {}",
        completed
            .redeemed_coupon
            .map_or_else(|| "none".to_string(), |coupon| coupon.code)
    );
    println!(
        "reward_coupon: {}",
        completed
            .reward_coupon
            .map_or_else(|| "none".to_string(), |coupon| coupon.code)
    );

    Ok(())
}
