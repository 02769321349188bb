//! # sippar-x402
//!
//! A typed Rust client for the Sippar X402 payment API.
//!
//! The service sells access to AI and analytics services: a client pays for a
//! service, receives a short-lived service access token, and presents that
//! token to the paid endpoint. This crate covers the client side of that
//! exchange: payment creation, token verification, marketplace discovery and
//! payment status lookups.
//!
//! ## Features
//!
//! - **Typed requests and responses**: serde models for the service's camelCase JSON
//! - **Open schemas kept open**: marketplace and analytics data stay `serde_json::Value`
//! - **Explicit defaults**: base URL and timeout are constants, applied at construction
//! - **Pluggable transport**: `reqwest` by default, any [`transport::Transport`] in tests
//! - **Fail fast**: one attempt per call, errors returned immediately
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use sippar_x402::{ClientConfig, X402Client};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = X402Client::new(ClientConfig::new(
//!     "rdmx6-jaaaa-aaaah-qcaiq-cai",
//!     "6W47GCLXWEIEZ2LRQCXF7HGLOYSXYCXOPXJ5YE55EULFHB7O4RWIM3JDCI",
//! ))?;
//!
//! let marketplace = client.get_marketplace().await?;
//! println!("Available services: {:?}", marketplace.total_services());
//!
//! let payment = client.create_payment("ai-oracle-enhanced", 0.05, None).await?;
//! let token = &payment.payment.service_access_token;
//!
//! println!("Token valid: {}", client.verify_token(token).await?);
//! # Ok(())
//! # }
//! ```
//!
//! ## Endpoints
//!
//! All paths are relative to the base URL (default
//! `https://nuru.network/api/sippar/x402`):
//!
//! | Operation | Request |
//! |-----------|---------|
//! | [`X402Client::create_payment`] | `POST /create-payment` |
//! | [`X402Client::get_marketplace`] | `GET /agent-marketplace` |
//! | [`X402Client::verify_token`] | `POST /verify-token` |
//! | [`X402Client::get_payment_status`] | `GET /payment-status/{id}` |
//! | [`X402Client::get_analytics`] | `GET /analytics` |
//! | [`X402Client::call_service`] | `POST {endpoint}` with `X-Service-Token` |
//!
//! [`X402Client::query_ai_service`] is a local placeholder and never touches
//! the network.
//!
//! ## Errors
//!
//! Every fallible call returns [`Result`]. Encoding, transport, decoding and
//! service-reported failures are distinct [`X402Error`] variants.

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod client;
pub mod config;
pub mod errors;
pub mod transport;
pub mod types;
pub mod utils;

// Re-export commonly used items
pub use client::X402Client;
pub use config::{ClientConfig, DEFAULT_BASE_URL, DEFAULT_TIMEOUT};
pub use errors::{Result, X402Error};
pub use types::{
    MarketplaceSnapshot, PaymentDetails, PaymentRequest, PaymentResponse, PaymentState,
    PaymentStatus, PerformanceInfo,
};

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_default_constants() {
        assert_eq!(DEFAULT_BASE_URL, "https://nuru.network/api/sippar/x402");
        assert_eq!(DEFAULT_TIMEOUT, Duration::from_secs(30));
    }

    #[test]
    fn test_module_accessibility() {
        // Ensure all modules are accessible
        let config = ClientConfig::new("principal", "address");
        let client = X402Client::new(config).unwrap();
        assert_eq!(client.base_url(), DEFAULT_BASE_URL);
        let _ = utils::token_prefix("token");
        let _ = types::KNOWN_SERVICES.len();
    }
}
