use std::path::PathBuf;

use bazaar_app::domain::checkout::data::{CheckoutRequest, DiscountOutcome};
use clap::Args;
use jiff::Timestamp;
use uuid::Uuid;

use super::CheckoutEnvironment;

#[derive(Debug, Args)]
pub(crate) struct CreateCheckoutArgs {
    #[command(flatten)]
    environment: CheckoutEnvironment,

    /// Customer checking out
    #[arg(long)]
    customer_uuid: Uuid,

    /// Path to a JSON array of cart line items
    #[arg(long)]
    cart: PathBuf,

    /// Coupon code offered by the customer
    #[arg(long)]
    coupon_code: Option<String>,

    /// Where the customer lands after paying
    #[arg(long)]
    success_url: String,

    /// Where the customer lands after abandoning checkout
    #[arg(long)]
    cancel_url: String,
}

pub(crate) async fn run(args: CreateCheckoutArgs) -> Result<(), String> {
    let cart = super::read_cart(&args.cart)?;
    let ctx = args.environment.context().await?;

    let session = ctx
        .checkout
        .build_session(
            CheckoutRequest {
                customer: args.customer_uuid.into(),
                cart,
                coupon_code: args.coupon_code,
                success_url: args.success_url,
                cancel_url: args.cancel_url,
            },
            Timestamp::now(),
        )
        .await
        .map_err(|error| format!("failed to create checkout session: {error}"))?;

    println!("session_id: {}", session.session_id);
    println!("redirect_url: {}", session.redirect_url);
    println!("subtotal_amount: {}", session.subtotal_amount);
    println!("total_amount: {}", session.total_amount);

    match &session.discount {
        DiscountOutcome::Applied {
            percentage,
            gateway_discount_id,
            coupon_code,
        } => {
            println!("discount: {percentage} ({coupon_code}, {gateway_discount_id})");
        }
        DiscountOutcome::NotApplied(reason) => println!("discount: none ({reason})"),
    }

    Ok(())
}
