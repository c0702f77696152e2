//! Bazaar Domain Concerns

pub mod analytics;
pub mod checkout;
pub mod coupons;
pub mod customers;
pub mod orders;
