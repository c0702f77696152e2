//! Bazaar
//!
//! Pricing, coupon and sales-reporting rules for a small storefront. Everything
//! in this crate is pure: persistence and payment gateways live in `bazaar-app`.

pub mod coupons;
pub mod discounts;
pub mod pricing;
pub mod reporting;
