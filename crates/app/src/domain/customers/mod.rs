//! Customers
//!
//! Customer accounts are managed elsewhere; only their identity is used here.

pub mod records;
