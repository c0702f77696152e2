//! Services, persistence, and payment gateway integration for the Bazaar
//! commerce core.

pub mod context;
pub mod database;
pub mod domain;
pub mod gateway;

#[cfg(test)]
mod test;

mod uuids;
