use clap::{Args, Subcommand};
use rusty_money::{Money, iso};

mod daily;
mod totals;

#[derive(Debug, Args)]
pub(crate) struct ReportCommand {
    #[command(subcommand)]
    command: ReportSubcommand,
}

#[derive(Debug, Subcommand)]
enum ReportSubcommand {
    /// Orders and revenue for every day in a range
    Daily(daily::DailyReportArgs),

    /// Store-wide counts and revenue
    Totals(totals::TotalsReportArgs),
}

pub(crate) async fn run(command: ReportCommand) -> Result<(), String> {
    match command.command {
        ReportSubcommand::Daily(args) => daily::run(args).await,
        ReportSubcommand::Totals(args) => totals::run(args).await,
    }
}

fn format_amount(minor: u64, currency: &iso::Currency) -> Result<String, String> {
    let minor = i64::try_from(minor).map_err(|error| format!("amount out of range: {error}"))?;

    Ok(Money::from_minor(minor, currency).to_string())
}
