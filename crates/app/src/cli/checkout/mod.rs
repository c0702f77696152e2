use std::{fs, path::Path, sync::Arc};

use bazaar::pricing::CartLineItem;
use bazaar_app::{
    context::AppContext,
    gateway::{PaymentGateway, StripeClient},
};
use clap::{Args, Subcommand};

use crate::cli::args::{self, CurrencyArgs, DatabaseArgs, RewardArgs, StripeArgs};

mod complete;
mod create;

#[derive(Debug, Args)]
pub(crate) struct CheckoutCommand {
    #[command(subcommand)]
    command: CheckoutSubcommand,
}

#[derive(Debug, Subcommand)]
enum CheckoutSubcommand {
    /// Open a hosted checkout session for a cart
    Create(create::CreateCheckoutArgs),

    /// Record a paid checkout session and issue the next reward coupon
    Complete(complete::CompleteCheckoutArgs),
}

pub(crate) async fn run(command: CheckoutCommand) -> Result<(), String> {
    match command.command {
        CheckoutSubcommand::Create(args) => create::run(args).await,
        CheckoutSubcommand::Complete(args) => complete::run(args).await,
    }
}

/// Connection and business settings shared by checkout commands.
#[derive(Debug, Args)]
struct CheckoutEnvironment {
    #[command(flatten)]
    database: DatabaseArgs,

    #[command(flatten)]
    stripe: StripeArgs,

    #[command(flatten)]
    rewards: RewardArgs,

    #[command(flatten)]
    currency: CurrencyArgs,
}

impl CheckoutEnvironment {
    async fn context(&self) -> Result<AppContext, String> {
        let settings = args::settings(&self.rewards, &self.currency)?;
        let gateway: Arc<dyn PaymentGateway> = Arc::new(StripeClient::new(self.stripe.config()?));

        AppContext::from_database_url(&self.database.database_url, gateway, settings)
            .await
            .map_err(|error| format!("failed to initialise application: {error}"))
    }
}

/// Reads a JSON array of cart line items.
fn read_cart(path: &Path) -> Result<Vec<CartLineItem>, String> {
    let contents = fs::read_to_string(path)
        .map_err(|error| format!("failed to read cart {}: {error}", path.display()))?;

    serde_json::from_str(&contents)
        .map_err(|error| format!("failed to parse cart {}: {error}", path.display()))
}
