use bazaar_app::domain::coupons::records::CouponRecord;
use clap::{Args, Subcommand};

mod issue;
mod show;

#[derive(Debug, Args)]
pub(crate) struct CouponCommand {
    #[command(subcommand)]
    command: CouponSubcommand,
}

#[derive(Debug, Subcommand)]
enum CouponSubcommand {
    /// Issue a reward coupon, replacing the customer's current one
    Issue(issue::IssueCouponArgs),

    /// Show the customer's coupon
    Show(show::ShowCouponArgs),
}

pub(crate) async fn run(command: CouponCommand) -> Result<(), String> {
    match command.command {
        CouponSubcommand::Issue(args) => issue::run(args).await,
        CouponSubcommand::Show(args) => show::run(args).await,
    }
}

fn print_coupon(coupon: &CouponRecord) {
    println!("coupon_uuid: {}", coupon.uuid);
    println!("customer_uuid: {}", coupon.customer_uuid);
    println!("code: {}", coupon.code);
    println!("discount: {}", coupon.discount);
    println!("expires_at: {}", coupon.expires_at);
    println!("active: {}", coupon.is_active);
}
