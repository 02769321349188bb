//! Client configuration.
//!
//! [`ClientConfig`] is plain data. Defaults are explicit constants, applied by
//! [`ClientConfig::resolve`] when the client is built, so an empty base URL
//! or a zero timeout never reach the transport.

use crate::errors::{Result, X402Error};
use crate::utils::{is_valid_algorand_address, is_valid_principal};
use std::fmt;
use std::time::Duration;
use url::Url;

/// Production endpoint of the Sippar X402 API.
pub const DEFAULT_BASE_URL: &str = "https://nuru.network/api/sippar/x402";

/// Request timeout used when none is configured.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// `User-Agent` sent with every request.
pub const DEFAULT_USER_AGENT: &str = concat!("sippar-x402/", env!("CARGO_PKG_VERSION"));

/// Environment variable names read by [`ClientConfig::from_env`].
pub mod env_vars {
    /// Principal of the paying entity
    pub const PRINCIPAL: &str = "X402_PRINCIPAL";
    /// Algorand address backing payments
    pub const ALGORAND_ADDRESS: &str = "X402_ALGORAND_ADDRESS";
    /// Base URL override
    pub const BASE_URL: &str = "X402_BASE_URL";
    /// Timeout override, whole seconds
    pub const TIMEOUT_SECS: &str = "X402_TIMEOUT_SECS";
    /// Enterprise API key
    pub const API_KEY: &str = "X402_API_KEY";
}

/// Configuration for an [`X402Client`](crate::client::X402Client).
#[derive(Clone)]
pub struct ClientConfig {
    /// Principal of the paying entity, sent with every payment
    pub principal: String,

    /// Algorand address backing payments, sent with every payment
    pub algorand_address: String,

    /// API base URL; empty means [`DEFAULT_BASE_URL`]
    pub base_url: String,

    /// Per-request timeout; zero means [`DEFAULT_TIMEOUT`]
    pub timeout: Duration,

    /// Optional enterprise API key, sent as `X-API-Key`
    pub api_key: Option<String>,

    /// `User-Agent` header value; empty means [`DEFAULT_USER_AGENT`]
    pub user_agent: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            principal: String::new(),
            algorand_address: String::new(),
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: DEFAULT_TIMEOUT,
            api_key: None,
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

// The API key stays out of logs.
impl fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientConfig")
            .field("principal", &self.principal)
            .field("algorand_address", &self.algorand_address)
            .field("base_url", &self.base_url)
            .field("timeout", &self.timeout)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("user_agent", &self.user_agent)
            .finish()
    }
}

impl ClientConfig {
    /// Creates a configuration with the default base URL and timeout.
    ///
    /// # Examples
    ///
    /// ```
    /// use sippar_x402::config::{ClientConfig, DEFAULT_BASE_URL};
    ///
    /// let config = ClientConfig::new(
    ///     "rdmx6-jaaaa-aaaah-qcaiq-cai",
    ///     "6W47GCLXWEIEZ2LRQCXF7HGLOYSXYCXOPXJ5YE55EULFHB7O4RWIM3JDCI",
    /// );
    /// assert_eq!(config.base_url, DEFAULT_BASE_URL);
    /// ```
    pub fn new(principal: impl Into<String>, algorand_address: impl Into<String>) -> Self {
        Self {
            principal: principal.into(),
            algorand_address: algorand_address.into(),
            ..Self::default()
        }
    }

    /// Sets the API base URL.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Sets the per-request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Sets the enterprise API key.
    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    /// Sets the `User-Agent` header value.
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Builds a configuration from the process environment.
    ///
    /// `X402_PRINCIPAL` and `X402_ALGORAND_ADDRESS` are required; the
    /// remaining variables of [`env_vars`] are optional overrides.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Applies any optional overrides found in the process environment.
    pub fn with_env_overrides(self) -> Result<Self> {
        self.apply_overrides(|key| std::env::var(key).ok())
    }

    fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let config = Self::default().apply_overrides(&lookup)?;

        if config.principal.is_empty() {
            return Err(X402Error::Config(format!("{} is not set", env_vars::PRINCIPAL)));
        }
        if config.algorand_address.is_empty() {
            return Err(X402Error::Config(format!(
                "{} is not set",
                env_vars::ALGORAND_ADDRESS
            )));
        }

        Ok(config)
    }

    fn apply_overrides<F>(mut self, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        if let Some(principal) = get(env_vars::PRINCIPAL) {
            self.principal = principal;
        }
        if let Some(address) = get(env_vars::ALGORAND_ADDRESS) {
            self.algorand_address = address;
        }
        if let Some(base_url) = get(env_vars::BASE_URL) {
            self.base_url = base_url;
        }
        if let Some(secs) = get(env_vars::TIMEOUT_SECS) {
            let secs: u64 = secs.trim().parse().map_err(|_| {
                X402Error::Config(format!(
                    "{} must be a whole number of seconds, got '{}'",
                    env_vars::TIMEOUT_SECS,
                    secs
                ))
            })?;
            self.timeout = Duration::from_secs(secs);
        }
        if let Some(api_key) = get(env_vars::API_KEY) {
            self.api_key = Some(api_key);
        }

        Ok(self)
    }

    /// Fills in defaults and normalizes the base URL.
    ///
    /// An empty base URL becomes [`DEFAULT_BASE_URL`], a zero timeout becomes
    /// [`DEFAULT_TIMEOUT`], and trailing slashes are dropped. Fails if the
    /// base URL is not an absolute `http`/`https` URL.
    ///
    /// # Examples
    ///
    /// ```
    /// use sippar_x402::config::{ClientConfig, DEFAULT_BASE_URL, DEFAULT_TIMEOUT};
    /// use std::time::Duration;
    ///
    /// let config = ClientConfig::new("principal", "address")
    ///     .with_base_url("")
    ///     .with_timeout(Duration::ZERO)
    ///     .resolve()
    ///     .unwrap();
    ///
    /// assert_eq!(config.base_url, DEFAULT_BASE_URL);
    /// assert_eq!(config.timeout, DEFAULT_TIMEOUT);
    /// ```
    pub fn resolve(mut self) -> Result<Self> {
        let trimmed = self.base_url.trim().trim_end_matches('/');
        self.base_url = if trimmed.is_empty() {
            DEFAULT_BASE_URL.to_string()
        } else {
            trimmed.to_string()
        };

        let parsed = Url::parse(&self.base_url)?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(X402Error::Config(format!(
                "unsupported base URL scheme '{}'",
                parsed.scheme()
            )));
        }

        if self.timeout.is_zero() {
            self.timeout = DEFAULT_TIMEOUT;
        }
        if self.user_agent.trim().is_empty() {
            self.user_agent = DEFAULT_USER_AGENT.to_string();
        }

        Ok(self)
    }

    /// Checks the principal and Algorand address formats.
    ///
    /// Not called implicitly: the service remains the authority on which
    /// identities it accepts.
    pub fn validate(&self) -> Result<()> {
        if !is_valid_principal(&self.principal) {
            return Err(X402Error::Config(format!(
                "invalid principal '{}'",
                self.principal
            )));
        }
        if !is_valid_algorand_address(&self.algorand_address) {
            return Err(X402Error::Config(format!(
                "invalid Algorand address '{}'",
                self.algorand_address
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    const PRINCIPAL: &str = "rdmx6-jaaaa-aaaah-qcaiq-cai";
    const ADDRESS: &str = "6W47GCLXWEIEZ2LRQCXF7HGLOYSXYCXOPXJ5YE55EULFHB7O4RWIM3JDCI";

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn test_config_creation() {
        let config = ClientConfig::new(PRINCIPAL, ADDRESS);
        assert_eq!(config.principal, PRINCIPAL);
        assert_eq!(config.algorand_address, ADDRESS);
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.timeout, Duration::from_secs(30));
        assert!(config.api_key.is_none());
        assert!(config.user_agent.starts_with("sippar-x402/"));
    }

    #[test]
    fn test_config_builders() {
        let config = ClientConfig::new(PRINCIPAL, ADDRESS)
            .with_base_url("http://localhost:3000")
            .with_timeout(Duration::from_secs(5))
            .with_api_key("key")
            .with_user_agent("demo/1.0");

        assert_eq!(config.base_url, "http://localhost:3000");
        assert_eq!(config.timeout, Duration::from_secs(5));
        assert_eq!(config.api_key.as_deref(), Some("key"));
        assert_eq!(config.user_agent, "demo/1.0");
    }

    #[test]
    fn test_resolve_defaults() {
        let config = ClientConfig::new(PRINCIPAL, ADDRESS)
            .with_base_url("   ")
            .with_timeout(Duration::ZERO)
            .with_user_agent("")
            .resolve()
            .unwrap();

        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.timeout, DEFAULT_TIMEOUT);
        assert_eq!(config.user_agent, DEFAULT_USER_AGENT);
    }

    #[test]
    fn test_resolve_strips_trailing_slash() {
        let config = ClientConfig::new(PRINCIPAL, ADDRESS)
            .with_base_url("http://localhost:3000/api/")
            .resolve()
            .unwrap();
        assert_eq!(config.base_url, "http://localhost:3000/api");
    }

    #[test]
    fn test_resolve_rejects_bad_urls() {
        let err = ClientConfig::new(PRINCIPAL, ADDRESS)
            .with_base_url("not a url")
            .resolve()
            .unwrap_err();
        assert!(matches!(err, X402Error::UrlParse(_)));

        let err = ClientConfig::new(PRINCIPAL, ADDRESS)
            .with_base_url("ftp://example.com")
            .resolve()
            .unwrap_err();
        assert!(matches!(err, X402Error::Config(_)));
    }

    #[test]
    fn test_validate() {
        assert!(ClientConfig::new(PRINCIPAL, ADDRESS).validate().is_ok());
        assert!(ClientConfig::new("bad", ADDRESS).validate().is_err());
        assert!(ClientConfig::new(PRINCIPAL, "0xabc").validate().is_err());
    }

    #[test]
    fn test_debug_redacts_api_key() {
        let config = ClientConfig::new(PRINCIPAL, ADDRESS).with_api_key("super-secret");
        let debug = format!("{:?}", config);
        assert!(!debug.contains("super-secret"));
        assert!(debug.contains("<redacted>"));
    }

    #[test]
    fn test_from_lookup() {
        let config = ClientConfig::from_lookup(lookup(&[
            (env_vars::PRINCIPAL, PRINCIPAL),
            (env_vars::ALGORAND_ADDRESS, ADDRESS),
            (env_vars::BASE_URL, "http://127.0.0.1:9000"),
            (env_vars::TIMEOUT_SECS, "7"),
            (env_vars::API_KEY, "k"),
        ]))
        .unwrap();

        assert_eq!(config.principal, PRINCIPAL);
        assert_eq!(config.base_url, "http://127.0.0.1:9000");
        assert_eq!(config.timeout, Duration::from_secs(7));
        assert_eq!(config.api_key.as_deref(), Some("k"));
    }

    #[test]
    fn test_from_lookup_requires_identity() {
        let err = ClientConfig::from_lookup(lookup(&[(env_vars::ALGORAND_ADDRESS, ADDRESS)]))
            .unwrap_err();
        assert!(err.to_string().contains(env_vars::PRINCIPAL));
    }

    #[test]
    fn test_overrides_keep_existing_values() {
        let config = ClientConfig::new(PRINCIPAL, ADDRESS)
            .apply_overrides(lookup(&[(env_vars::BASE_URL, "")]))
            .unwrap();
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.principal, PRINCIPAL);
    }

    #[test]
    fn test_bad_timeout_override() {
        let err = ClientConfig::new(PRINCIPAL, ADDRESS)
            .apply_overrides(lookup(&[(env_vars::TIMEOUT_SECS, "soon")]))
            .unwrap_err();
        assert!(matches!(err, X402Error::Config(_)));
    }
}
