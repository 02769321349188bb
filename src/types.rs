//! Wire types for the Sippar X402 API.
//!
//! Field names follow the service's camelCase JSON. Open-schema payloads
//! (marketplace, analytics) stay as [`serde_json::Value`] so unknown fields
//! survive untouched.

use crate::errors::{Result, X402Error};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashMap;

/// Body of `POST /create-payment`.
///
/// # Examples
///
/// ```
/// use sippar_x402::types::PaymentRequest;
///
/// let request = PaymentRequest {
///     service: "ai-oracle-basic".to_string(),
///     amount: 0.01,
///     principal: "rdmx6-jaaaa-aaaah-qcaiq-cai".to_string(),
///     algorand_address: "6W47GCLXWEIEZ2LRQCXF7HGLOYSXYCXOPXJ5YE55EULFHB7O4RWIM3JDCI".to_string(),
///     metadata: None,
/// };
///
/// let json = serde_json::to_string(&request).unwrap();
/// assert!(json.contains("algorandAddress"));
/// assert!(!json.contains("metadata"));
/// ```
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PaymentRequest {
    /// Marketplace service identifier (e.g. "ai-oracle-enhanced")
    pub service: String,

    /// Amount in USD
    pub amount: f64,

    /// Principal of the paying entity
    pub principal: String,

    /// Algorand address backing the payment
    pub algorand_address: String,

    /// Free-form metadata attached to the payment
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<HashMap<String, Value>>,
}

/// Successful answer of `POST /create-payment`.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct PaymentResponse {
    /// Always `true` once returned by the client
    pub success: bool,

    /// The payment record
    pub payment: PaymentDetails,

    /// Server-side timing information
    pub performance: PerformanceInfo,
}

/// Payment record carried by [`PaymentResponse`].
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PaymentDetails {
    /// Unique transaction identifier
    pub transaction_id: String,

    /// Opaque credential authorizing calls to the paid service
    pub service_access_token: String,

    /// Token expiry as unix seconds
    pub expiry_time: i64,
}

impl PaymentDetails {
    /// Expiry as a UTC timestamp, `None` if out of chrono's range.
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.expiry_time, 0)
    }

    /// Whether the access token has expired at `now`.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now.timestamp() >= self.expiry_time
    }
}

/// Timing information carried by [`PaymentResponse`].
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PerformanceInfo {
    /// Processing time as reported by the service (e.g. "12ms")
    pub processing_time: String,
}

/// Raw create-payment body. A failed payment may omit the payment record,
/// so everything except `success` is optional here.
#[derive(Deserialize, Debug)]
pub(crate) struct PaymentEnvelope {
    success: bool,
    #[serde(default)]
    payment: Option<PaymentDetails>,
    #[serde(default)]
    performance: Option<PerformanceInfo>,
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

impl PaymentEnvelope {
    pub(crate) fn into_response(self) -> Result<PaymentResponse> {
        if !self.success {
            let reason = self
                .error
                .or(self.message)
                .unwrap_or_else(|| "payment creation failed".to_string());
            return Err(X402Error::Domain(reason));
        }

        let payment = self.payment.ok_or_else(|| missing_field("payment"))?;
        let performance = self
            .performance
            .ok_or_else(|| missing_field("performance"))?;

        Ok(PaymentResponse {
            success: true,
            payment,
            performance,
        })
    }
}

fn missing_field(field: &'static str) -> X402Error {
    X402Error::Deserialization(<serde_json::Error as serde::de::Error>::missing_field(field))
}

/// Body of `POST /verify-token`.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct TokenVerificationRequest {
    /// The service access token to check
    pub token: String,
}

/// Marketplace listing returned verbatim by `GET /agent-marketplace`.
///
/// The service does not commit to a schema, so the snapshot keeps the whole
/// JSON object and only offers optional probes for the fields the demo uses.
///
/// # Examples
///
/// ```
/// use sippar_x402::types::MarketplaceSnapshot;
///
/// let snapshot: MarketplaceSnapshot = serde_json::from_str(
///     r#"{"success": true, "marketplace": {"totalServices": 5, "services": []}}"#,
/// ).unwrap();
///
/// assert_eq!(snapshot.total_services(), Some(5));
/// assert_eq!(snapshot.services().map(|s| s.len()), Some(0));
/// ```
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
#[serde(transparent)]
pub struct MarketplaceSnapshot(Map<String, Value>);

impl MarketplaceSnapshot {
    /// Wraps an already-decoded JSON object.
    pub fn new(inner: Map<String, Value>) -> Self {
        Self(inner)
    }

    /// Top-level field lookup.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// `marketplace.totalServices`, if present and numeric.
    pub fn total_services(&self) -> Option<u64> {
        let total = self.marketplace_field("totalServices")?;
        total
            .as_u64()
            .or_else(|| total.as_f64().filter(|n| *n >= 0.0).map(|n| n.round() as u64))
    }

    /// `marketplace.services`, if present and an array.
    pub fn services(&self) -> Option<&[Value]> {
        self.marketplace_field("services")
            .and_then(Value::as_array)
            .map(Vec::as_slice)
    }

    /// Borrow the underlying JSON object.
    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    /// Take the underlying JSON object.
    pub fn into_inner(self) -> Map<String, Value> {
        self.0
    }

    fn marketplace_field(&self, key: &str) -> Option<&Value> {
        self.0.get("marketplace")?.get(key)
    }
}

/// Lifecycle state of a payment.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum PaymentState {
    /// Created, not yet settled
    Pending,
    /// Settled; a service token is available
    Completed,
    /// Rejected by the service
    Failed,
    /// Token validity window elapsed
    Expired,
}

/// Answer of `GET /payment-status/{paymentId}`.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PaymentStatus {
    /// Payment identifier
    pub payment_id: String,

    /// Current state
    pub status: PaymentState,

    /// Amount in USD
    pub amount: f64,

    /// Service the payment was made for
    pub service: String,

    /// Creation timestamp as sent by the service
    pub created_at: String,

    /// Last update timestamp as sent by the service
    pub updated_at: String,

    /// Service token, present once the payment completed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service_token: Option<String>,
}

/// A service known to be offered on the marketplace.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ServiceListing {
    /// Identifier used in [`PaymentRequest::service`]
    pub id: &'static str,
    /// Display name
    pub name: &'static str,
    /// Short description
    pub description: &'static str,
    /// Base price in USD
    pub base_price: f64,
}

/// Services published by the Sippar marketplace at the time of writing.
/// The live list comes from [`X402Client::get_marketplace`](crate::client::X402Client::get_marketplace).
pub const KNOWN_SERVICES: &[ServiceListing] = &[
    ServiceListing {
        id: "ai-oracle-basic",
        name: "AI Oracle Basic",
        description: "Basic AI processing with standard models",
        base_price: 0.01,
    },
    ServiceListing {
        id: "ai-oracle-enhanced",
        name: "AI Oracle Enhanced",
        description: "Advanced AI processing with reasoning capabilities",
        base_price: 0.05,
    },
    ServiceListing {
        id: "market-analysis",
        name: "Market Analysis",
        description: "Real-time cryptocurrency market analysis",
        base_price: 0.03,
    },
    ServiceListing {
        id: "data-analytics",
        name: "Data Analytics",
        description: "Advanced data processing and insights",
        base_price: 0.02,
    },
    ServiceListing {
        id: "enterprise-ai",
        name: "Enterprise AI",
        description: "High-performance AI for enterprise applications",
        base_price: 0.10,
    },
];

/// AI models accepted by the AI oracle services.
pub const SUPPORTED_AI_MODELS: &[&str] = &["deepseek-r1", "qwen2.5", "phi-3", "mistral"];

/// Looks up a service in [`KNOWN_SERVICES`].
pub fn find_service(id: &str) -> Option<&'static ServiceListing> {
    KNOWN_SERVICES.iter().find(|s| s.id == id)
}
