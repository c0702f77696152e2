//! Sales Analytics

pub mod errors;
mod repository;
pub mod service;

pub use errors::AnalyticsServiceError;
pub use service::*;
