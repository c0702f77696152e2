use bazaar::discounts::DiscountPercentage;
use bazaar_app::{
    context::AppSettings,
    domain::{checkout::data::CheckoutSettings, coupons::data::RewardPolicy},
    gateway::StripeConfig,
};
use clap::Args;
use jiff::SignedDuration;
use rusty_money::iso;

#[derive(Debug, Args)]
pub(crate) struct DatabaseArgs {
    /// PostgreSQL connection string
    #[arg(long, env = "DATABASE_URL", hide_env_values = true)]
    pub(crate) database_url: String,
}

#[derive(Debug, Args)]
pub(crate) struct StripeArgs {
    /// Payment gateway API base address
    #[arg(long, env = "STRIPE_API_BASE", default_value = "https://api.stripe.com")]
    stripe_api_base: String,

    /// Payment gateway secret key
    #[arg(long, env = "STRIPE_SECRET_KEY", hide_env_values = true)]
    stripe_secret_key: String,
}

impl StripeArgs {
    pub(crate) fn config(&self) -> Result<StripeConfig, String> {
        if self.stripe_secret_key.trim().is_empty() {
            return Err("stripe secret key cannot be empty".to_string());
        }

        Ok(StripeConfig {
            api_base: self.stripe_api_base.clone(),
            secret_key: self.stripe_secret_key.clone(),
        })
    }
}

#[derive(Debug, Args)]
pub(crate) struct RewardArgs {
    /// Percentage taken off by reward coupons
    #[arg(long, env = "REWARD_DISCOUNT_PERCENTAGE", default_value_t = 10)]
    reward_discount_percentage: u8,

    /// Days a reward coupon stays valid
    #[arg(long, env = "REWARD_VALIDITY_DAYS", default_value_t = 30)]
    reward_validity_days: u16,

    /// Smallest charged total, in minor units, that earns a reward coupon
    #[arg(long, env = "REWARD_MINIMUM_ORDER_TOTAL")]
    reward_minimum_order_total: Option<u64>,
}

impl RewardArgs {
    pub(crate) fn policy(&self) -> Result<RewardPolicy, String> {
        let discount = DiscountPercentage::new(self.reward_discount_percentage)
            .map_err(|error| format!("invalid reward discount: {error}"))?;

        Ok(RewardPolicy {
            discount,
            validity: SignedDuration::from_hours(i64::from(self.reward_validity_days) * 24),
        })
    }
}

#[derive(Debug, Args)]
pub(crate) struct CurrencyArgs {
    /// ISO 4217 currency carts and reports are expressed in
    #[arg(long, env = "CHECKOUT_CURRENCY", default_value = "USD")]
    currency: String,
}

impl CurrencyArgs {
    pub(crate) fn currency(&self) -> Result<&'static iso::Currency, String> {
        iso::find(&self.currency.to_ascii_uppercase())
            .ok_or_else(|| format!("unknown currency: {}", self.currency))
    }
}

pub(crate) fn settings(rewards: &RewardArgs, currency: &CurrencyArgs) -> Result<AppSettings, String> {
    Ok(AppSettings {
        checkout: CheckoutSettings {
            currency: currency.currency()?,
            reward_minimum_order_total: rewards.reward_minimum_order_total,
        },
        reward_policy: rewards.policy()?,
    })
}
