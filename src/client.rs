//! Client for the Sippar X402 payment API.
//!
//! [`X402Client`] turns each operation into exactly one HTTP exchange (or
//! none, for the local AI stub) and decodes the answer into typed results.
//! Nothing is retried and nothing is cached between calls.

use crate::config::ClientConfig;
use crate::errors::{Result, X402Error};
use crate::transport::{ReqwestTransport, Transport, TransportRequest, TransportResponse};
use crate::types::{
    MarketplaceSnapshot, PaymentEnvelope, PaymentRequest, PaymentResponse, PaymentStatus,
    TokenVerificationRequest,
};
use crate::utils::{current_timestamp, is_valid_service_token, token_prefix};
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{json, Map, Value};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info, warn};
use url::Url;

/// Endpoint paths, relative to the configured base URL.
pub mod endpoints {
    /// `POST` — create a payment
    pub const CREATE_PAYMENT: &str = "/create-payment";
    /// `GET` — marketplace listing
    pub const MARKETPLACE: &str = "/agent-marketplace";
    /// `POST` — check a service token
    pub const VERIFY_TOKEN: &str = "/verify-token";
    /// `GET` — payment status, followed by `/{paymentId}`
    pub const PAYMENT_STATUS: &str = "/payment-status";
    /// `GET` — usage analytics
    pub const ANALYTICS: &str = "/analytics";
}

/// Header carrying the service access token on paid service calls.
pub const SERVICE_TOKEN_HEADER: &str = "X-Service-Token";

/// Header carrying the enterprise API key.
pub const API_KEY_HEADER: &str = "X-API-Key";

/// Client for the Sippar X402 payment API.
///
/// Holds only the resolved, immutable configuration and a transport, so it
/// is cheap to clone and safe to share.
///
/// # Examples
///
/// ```no_run
/// use sippar_x402::client::X402Client;
/// use sippar_x402::config::ClientConfig;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let client = X402Client::new(ClientConfig::new(
///     "rdmx6-jaaaa-aaaah-qcaiq-cai",
///     "6W47GCLXWEIEZ2LRQCXF7HGLOYSXYCXOPXJ5YE55EULFHB7O4RWIM3JDCI",
/// ))?;
///
/// let payment = client.create_payment("ai-oracle-enhanced", 0.05, None).await?;
/// println!("Payment created: {}", payment.payment.transaction_id);
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct X402Client {
    config: ClientConfig,
    transport: Arc<dyn Transport>,
}

impl X402Client {
    /// Creates a client over HTTP, applying configuration defaults.
    pub fn new(config: ClientConfig) -> Result<Self> {
        let config = config.resolve()?;
        let transport = ReqwestTransport::new(config.timeout)?;
        Ok(Self::from_parts(config, Arc::new(transport)))
    }

    /// Creates a client that sends its requests through `transport`.
    ///
    /// Configuration defaults are applied exactly as in [`X402Client::new`];
    /// the configured timeout is the transport's responsibility.
    pub fn with_transport<T>(config: ClientConfig, transport: T) -> Result<Self>
    where
        T: Transport + 'static,
    {
        let config = config.resolve()?;
        Ok(Self::from_parts(config, Arc::new(transport)))
    }

    fn from_parts(config: ClientConfig, transport: Arc<dyn Transport>) -> Self {
        debug!(
            base_url = %config.base_url,
            timeout_secs = config.timeout.as_secs(),
            "X402 client ready"
        );
        Self { config, transport }
    }

    /// The resolved configuration.
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// The resolved base URL, without trailing slash.
    pub fn base_url(&self) -> &str {
        &self.config.base_url
    }

    /// Creates a payment for `service`.
    ///
    /// The body alone decides the outcome: it must decode as a payment
    /// response, and `success: false` yields [`X402Error::Domain`] with no
    /// payment data. A non-finite `amount` fails with
    /// [`X402Error::Serialization`] before anything is sent.
    pub async fn create_payment(
        &self,
        service: &str,
        amount: f64,
        metadata: Option<HashMap<String, Value>>,
    ) -> Result<PaymentResponse> {
        // serde_json writes NaN and infinities as `null`.
        if !amount.is_finite() {
            return Err(X402Error::Serialization(
                <serde_json::Error as serde::ser::Error>::custom(format!(
                    "amount must be finite, got {}",
                    amount
                )),
            ));
        }

        let request = PaymentRequest {
            service: service.to_string(),
            amount,
            principal: self.config.principal.clone(),
            algorand_address: self.config.algorand_address.clone(),
            metadata,
        };
        let body = serde_json::to_vec(&request).map_err(X402Error::Serialization)?;

        let response = self
            .send(TransportRequest::post_json(
                self.url(endpoints::CREATE_PAYMENT),
                body,
            ))
            .await?;

        let envelope: PaymentEnvelope = decode(&response.body)?;
        let payment = envelope.into_response().map_err(|err| {
            if let X402Error::Domain(reason) = &err {
                warn!(service, status = %response.status, reason = %reason, "payment rejected");
            }
            err
        })?;

        info!(
            service,
            transaction_id = %payment.payment.transaction_id,
            processing_time = %payment.performance.processing_time,
            "payment created"
        );
        Ok(payment)
    }

    /// Answers an AI query locally.
    ///
    /// This is a placeholder for the paid AI service: no request is made and
    /// the token is not checked. The answer echoes `query` and `model`,
    /// carries a templated response, a shortened token (see
    /// [`token_prefix`]), `status: "success"` and the current unix time.
    pub fn query_ai_service(&self, query: &str, model: &str, service_token: &str) -> Map<String, Value> {
        debug!(model, "answering AI query locally");

        let mut response = Map::new();
        response.insert("query".to_string(), json!(query));
        response.insert("model".to_string(), json!(model));
        response.insert(
            "response".to_string(),
            json!(format!("AI response for: {}", query)),
        );
        response.insert("tokenUsed".to_string(), json!(token_prefix(service_token)));
        response.insert("status".to_string(), json!("success"));
        response.insert("timestamp".to_string(), json!(current_timestamp()));
        response
    }

    /// Fetches the marketplace listing, returned exactly as the service sent it.
    pub async fn get_marketplace(&self) -> Result<MarketplaceSnapshot> {
        let response = self
            .send(TransportRequest::get(self.url(endpoints::MARKETPLACE)))
            .await?;

        let snapshot: MarketplaceSnapshot = decode(&response.body)?;
        debug!(total_services = ?snapshot.total_services(), "marketplace fetched");
        Ok(snapshot)
    }

    /// Asks the service whether `token` is valid.
    ///
    /// Returns `true` iff the status is exactly `200 OK`; any other status is
    /// `false`. The body is ignored. Only transport failures are errors.
    pub async fn verify_token(&self, token: &str) -> Result<bool> {
        let request = TokenVerificationRequest {
            token: token.to_string(),
        };
        let body = serde_json::to_vec(&request).map_err(X402Error::Serialization)?;

        let response = self
            .send(TransportRequest::post_json(
                self.url(endpoints::VERIFY_TOKEN),
                body,
            ))
            .await?;

        let valid = response.status == StatusCode::OK;
        if !valid {
            warn!(status = %response.status, "token rejected");
        }
        Ok(valid)
    }

    /// Fetches the status of a payment.
    pub async fn get_payment_status(&self, payment_id: &str) -> Result<PaymentStatus> {
        if payment_id.trim().is_empty() {
            return Err(X402Error::InvalidArgument("payment id is empty".to_string()));
        }
        // `path_segments_mut().push` drops dot segments instead of encoding them.
        if payment_id == "." || payment_id == ".." {
            return Err(X402Error::InvalidArgument(format!(
                "payment id '{}' is not a valid path segment",
                payment_id
            )));
        }

        let mut url = Url::parse(&self.url(endpoints::PAYMENT_STATUS))?;
        url.path_segments_mut()
            .map_err(|_| X402Error::Config("base URL cannot carry a path".to_string()))?
            .push(payment_id);

        let response = self.send(TransportRequest::get(url.as_str())).await?;
        decode(&ensure_success(response)?.body)
    }

    /// Fetches usage analytics. The schema belongs to the service, so the
    /// result is left as open JSON.
    pub async fn get_analytics(&self) -> Result<Value> {
        let response = self
            .send(TransportRequest::get(self.url(endpoints::ANALYTICS)))
            .await?;
        decode(&ensure_success(response)?.body)
    }

    /// Calls a paid service endpoint with a service access token.
    ///
    /// The token must pass [`is_valid_service_token`]; otherwise
    /// [`X402Error::InvalidToken`] is returned and nothing is sent.
    /// `endpoint` is relative to the base URL.
    pub async fn call_service<B, T>(&self, endpoint: &str, data: &B, token: &str) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        if !is_valid_service_token(token) {
            return Err(X402Error::InvalidToken(
                "expected three base64url segments".to_string(),
            ));
        }

        let body = serde_json::to_vec(data).map_err(X402Error::Serialization)?;
        let path = if endpoint.starts_with('/') {
            endpoint.to_string()
        } else {
            format!("/{}", endpoint)
        };

        let request = TransportRequest::post_json(self.url(&path), body)
            .with_header(SERVICE_TOKEN_HEADER, token);
        let response = self.send(request).await?;
        decode(&ensure_success(response)?.body)
    }

    /// Creates a payment for `service`, then calls `endpoint` with the token
    /// it returned. Stops at the first failure.
    pub async fn pay_and_call<B, T>(
        &self,
        service: &str,
        amount: f64,
        data: &B,
        endpoint: &str,
    ) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let payment = self.create_payment(service, amount, None).await?;
        self.call_service(endpoint, data, &payment.payment.service_access_token)
            .await
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.config.base_url, path)
    }

    async fn send(&self, mut request: TransportRequest) -> Result<TransportResponse> {
        request = request.with_header("user-agent", self.config.user_agent.clone());
        if let Some(api_key) = &self.config.api_key {
            request = request.with_header(API_KEY_HEADER, api_key.clone());
        }

        debug!(method = %request.method, url = %request.url, "sending request");
        let response = self.transport.send(request).await?;
        debug!(status = %response.status, bytes = response.body.len(), "response received");

        Ok(response)
    }
}

fn decode<T: DeserializeOwned>(body: &[u8]) -> Result<T> {
    serde_json::from_slice(body).map_err(X402Error::Deserialization)
}

/// Turns a non-2xx response into [`X402Error::Api`], preferring the body's
/// `error` (or `message`) field over the raw body text.
fn ensure_success(response: TransportResponse) -> Result<TransportResponse> {
    if response.status.is_success() {
        return Ok(response);
    }

    let raw = String::from_utf8_lossy(&response.body).into_owned();
    let message = serde_json::from_str::<Value>(&raw)
        .ok()
        .and_then(|v| {
            v.get("error")
                .or_else(|| v.get("message"))
                .and_then(Value::as_str)
                .map(String::from)
        })
        .unwrap_or(raw);

    Err(X402Error::Api {
        status: response.status.as_u16(),
        message,
    })
}
