//! HTTP transport abstraction.
//!
//! The client builds [`TransportRequest`]s and hands them to a [`Transport`].
//! [`ReqwestTransport`] is the production implementation; tests plug in
//! their own to observe exactly which requests go out.

use crate::errors::{Result, X402Error};
use async_trait::async_trait;
use reqwest::{Client, Method, StatusCode};
use std::time::Duration;

/// A fully-built HTTP request.
#[derive(Debug, Clone, PartialEq)]
pub struct TransportRequest {
    /// HTTP method
    pub method: Method,

    /// Absolute URL
    pub url: String,

    /// Extra headers, in insertion order
    pub headers: Vec<(&'static str, String)>,

    /// Encoded body, if any
    pub body: Option<Vec<u8>>,
}

impl TransportRequest {
    /// A bodiless GET.
    pub fn get(url: impl Into<String>) -> Self {
        Self {
            method: Method::GET,
            url: url.into(),
            headers: Vec::new(),
            body: None,
        }
    }

    /// A POST carrying an already-encoded JSON body.
    pub fn post_json(url: impl Into<String>, body: Vec<u8>) -> Self {
        Self {
            method: Method::POST,
            url: url.into(),
            headers: vec![("content-type", "application/json".to_string())],
            body: Some(body),
        }
    }

    /// Appends a header.
    pub fn with_header(mut self, name: &'static str, value: impl Into<String>) -> Self {
        self.headers.push((name, value.into()));
        self
    }

    /// First value of a header, matched case-insensitively.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}

/// Status and fully-read body of an HTTP response.
#[derive(Debug, Clone, PartialEq)]
pub struct TransportResponse {
    /// HTTP status
    pub status: StatusCode,

    /// Raw body bytes
    pub body: Vec<u8>,
}

/// Sends one HTTP exchange and reads the whole response.
///
/// Implementations must not retry: one call, one attempt.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Sends `request` and returns the response. Only network-level failures
    /// are errors; any HTTP status is a successful exchange.
    async fn send(&self, request: TransportRequest) -> Result<TransportResponse>;
}

/// [`Transport`] backed by a `reqwest::Client`.
#[derive(Clone, Debug)]
pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    /// Builds a transport whose requests time out after `timeout`.
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| X402Error::Config(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self { client })
    }

    /// Wraps a preconfigured `reqwest::Client`.
    pub fn with_client(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn send(&self, request: TransportRequest) -> Result<TransportResponse> {
        let mut builder = self.client.request(request.method, &request.url);

        for (name, value) in request.headers {
            builder = builder.header(name, value);
        }
        if let Some(body) = request.body {
            builder = builder.body(body);
        }

        let response = builder.send().await?;
        let status = response.status();
        let body = response.bytes().await?.to_vec();

        Ok(TransportResponse { status, body })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_request() {
        let request = TransportRequest::get("http://localhost/agent-marketplace");
        assert_eq!(request.method, Method::GET);
        assert!(request.body.is_none());
        assert!(request.headers.is_empty());
    }

    #[test]
    fn test_post_json_sets_content_type() {
        let request = TransportRequest::post_json("http://localhost/verify-token", b"{}".to_vec())
            .with_header("X-API-Key", "key");

        assert_eq!(request.method, Method::POST);
        assert_eq!(request.header("content-type"), Some("application/json"));
        assert_eq!(request.header("x-api-key"), Some("key"));
        assert_eq!(request.body.as_deref(), Some(&b"{}"[..]));
    }

    #[test]
    fn test_reqwest_transport_builds() {
        assert!(ReqwestTransport::new(Duration::from_secs(1)).is_ok());
    }

    #[tokio::test]
    async fn test_with_client_uses_given_client() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let client = Client::builder()
            .timeout(Duration::from_secs(2))
            .build()
            .unwrap();
        let transport = ReqwestTransport::with_client(client);
        let result = transport
            .send(TransportRequest::get(format!("http://{}/analytics", addr)))
            .await;
        assert!(matches!(result, Err(X402Error::Transport(_))));
    }

    #[tokio::test]
    async fn test_unreachable_host_is_transport_error() {
        // Grab a free port, then close it so the connection is refused.
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let transport = ReqwestTransport::new(Duration::from_secs(2)).unwrap();
        let result = transport
            .send(TransportRequest::get(format!("http://{}/agent-marketplace", addr)))
            .await;
        assert!(matches!(result, Err(X402Error::Transport(_))));
    }
}
