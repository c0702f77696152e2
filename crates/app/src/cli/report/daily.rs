use bazaar_app::{
    database::{self, Db},
    domain::analytics::{AnalyticsService, PgAnalyticsService},
};
use clap::Args;
use jiff::civil::Date;

use crate::cli::args::{CurrencyArgs, DatabaseArgs};

#[derive(Debug, Args)]
pub(crate) struct DailyReportArgs {
    #[command(flatten)]
    database: DatabaseArgs,

    #[command(flatten)]
    currency: CurrencyArgs,

    /// First day of the report (YYYY-MM-DD)
    #[arg(long)]
    from: Date,

    /// Last day of the report, inclusive (YYYY-MM-DD)
    #[arg(long)]
    to: Date,
}

pub(crate) async fn run(args: DailyReportArgs) -> Result<(), String> {
    let currency = args.currency.currency()?;

    let pool = database::connect(&args.database.database_url)
        .await
        .map_err(|error| format!("failed to connect to database: {error}"))?;

    let service = PgAnalyticsService::new(Db::new(pool));

    let report = service
        .daily_sales(args.from, args.to)
        .await
        .map_err(|error| format!("failed to build daily report: {error}"))?;

    for record in report {
        println!(
            "{}\tsales: {}\trevenue: {}",
            record.date,
            record.sales_count,
            super::format_amount(record.revenue, currency)?
        );
    }

    Ok(())
}
