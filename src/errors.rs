//! Error types for the sippar-x402 client.
//!
//! Every operation on [`X402Client`](crate::client::X402Client) returns
//! [`Result`], and failures fall into one of the variants below. Nothing is
//! retried internally: an error is handed back to the caller as soon as it
//! happens.

use thiserror::Error;

/// Main error type for X402 client operations.
#[derive(Error, Debug)]
pub enum X402Error {
    /// The request body could not be encoded as JSON
    #[error("Serialization error: {0}")]
    Serialization(#[source] serde_json::Error),

    /// Network or HTTP failure, including the request timeout
    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The response body was not valid JSON of the expected shape
    #[error("Deserialization error: {0}")]
    Deserialization(#[source] serde_json::Error),

    /// The remote service answered but reported a failure
    #[error("Service reported failure: {0}")]
    Domain(String),

    /// A non-2xx answer from an endpoint whose status is significant
    #[error("API error: {status} - {message}")]
    Api {
        /// HTTP status code
        status: u16,
        /// Error message extracted from the body, or the raw body
        message: String,
    },

    /// Service token rejected by the local format check
    #[error("Invalid service token: {0}")]
    InvalidToken(String),

    /// Caller input rejected before any request was made
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Error parsing URL
    #[error("URL parse error: {0}")]
    UrlParse(#[from] url::ParseError),
}

/// Result type alias for X402 client operations.
pub type Result<T> = std::result::Result<T, X402Error>;

impl X402Error {
    /// Returns `true` for failures reported by the remote service itself,
    /// as opposed to local encoding or transport problems.
    pub fn is_remote(&self) -> bool {
        matches!(self, X402Error::Domain(_) | X402Error::Api { .. })
    }
}
