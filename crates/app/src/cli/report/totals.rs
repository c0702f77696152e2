use bazaar_app::{
    database::{self, Db},
    domain::analytics::{AnalyticsService, PgAnalyticsService},
};
use clap::Args;

use crate::cli::args::{CurrencyArgs, DatabaseArgs};

#[derive(Debug, Args)]
pub(crate) struct TotalsReportArgs {
    #[command(flatten)]
    database: DatabaseArgs,

    #[command(flatten)]
    currency: CurrencyArgs,
}

pub(crate) async fn run(args: TotalsReportArgs) -> Result<(), String> {
    let currency = args.currency.currency()?;

    let pool = database::connect(&args.database.database_url)
        .await
        .map_err(|error| format!("failed to connect to database: {error}"))?;

    let service = PgAnalyticsService::new(Db::new(pool));

    let totals = service
        .totals()
        .await
        .map_err(|error| format!("failed to load totals: {error}"))?;

    println!("users: {}", totals.user_count);
    println!("products: {}", totals.product_count);
    println!("orders: {}", totals.order_count);
    println!(
        "revenue: {}",
        super::format_amount(totals.total_revenue, currency)?
    );

    Ok(())
}
