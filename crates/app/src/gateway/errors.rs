//! Payment gateway errors.

use thiserror::Error;

/// Errors that can occur when communicating with the payment gateway.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// An HTTP transport or serialization error occurred.
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    /// A request could not be expressed to the gateway.
    #[error("invalid gateway request: {0}")]
    InvalidRequest(String),

    /// The gateway returned a non-2xx response or unexpected body.
    #[error("unexpected response from payment gateway: {0}")]
    UnexpectedResponse(String),
}
