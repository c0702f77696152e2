use clap::{Parser, Subcommand};

mod args;
mod checkout;
mod coupon;
mod db;
mod logging;
mod report;

#[derive(Debug, Parser)]
#[command(name = "bazaar-app", about = "Bazaar CLI", long_about = None)]
pub(crate) struct Cli {
    #[command(flatten)]
    logging: logging::LoggingArgs,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    Db(db::DbCommand),
    Coupon(coupon::CouponCommand),
    Report(report::ReportCommand),
    Checkout(checkout::CheckoutCommand),
}

impl Cli {
    pub(crate) async fn run(self) -> Result<(), String> {
        self.logging.init()?;

        match self.command {
            Commands::Db(command) => db::run(command).await,
            Commands::Coupon(command) => coupon::run(command).await,
            Commands::Report(command) => report::run(command).await,
            Commands::Checkout(command) => checkout::run(command).await,
        }
    }
}
