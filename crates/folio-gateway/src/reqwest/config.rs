//! Gateway client configuration.

use std::fmt;
use std::time::Duration;

#[cfg(feature = "config")]
use clap::Args;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::Result;

/// Default per-call timeout: 60 seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Default gateway base URL.
pub const DEFAULT_BASE_URL: &str = "https://openrouter.ai/api/v1";

/// Configuration for the reqwest gateway client.
#[derive(Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "config", derive(Args))]
pub struct GatewayConfig {
    /// API key sent as a bearer token
    #[cfg_attr(
        feature = "config",
        arg(
            long = "gateway-api-key",
            env = "OPENROUTER_API_KEY",
            default_value = "",
            hide_env_values = true,
            hide_default_value = true
        )
    )]
    pub api_key: String,

    /// Gateway base URL (chat completions and embeddings live below it)
    #[cfg_attr(
        feature = "config",
        arg(long = "gateway-base-url", env = "OPENROUTER_BASE_URL", default_value = DEFAULT_BASE_URL)
    )]
    #[serde(default = "default_base_url")]
    pub base_url: Url,

    /// Per-call timeout in seconds
    #[cfg_attr(
        feature = "config",
        arg(long = "gateway-timeout", env = "GATEWAY_TIMEOUT", default_value = "60")
    )]
    #[serde(default = "default_timeout_secs")]
    pub request_timeout_secs: u64,

    /// User-Agent header to send with requests
    #[cfg_attr(feature = "config", arg(long = "gateway-user-agent", env = "GATEWAY_USER_AGENT"))]
    #[serde(default)]
    pub user_agent: Option<String>,

    /// Value of the `HTTP-Referer` attribution header
    #[cfg_attr(feature = "config", arg(long = "gateway-referer", env = "OPENROUTER_REFERER"))]
    #[serde(default)]
    pub http_referer: Option<String>,

    /// Value of the `X-Title` attribution header
    #[cfg_attr(feature = "config", arg(long = "gateway-title", env = "OPENROUTER_TITLE"))]
    #[serde(default)]
    pub app_title: Option<String>,
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

fn default_base_url() -> Url {
    Url::parse(DEFAULT_BASE_URL).expect("default base URL is valid")
}

impl GatewayConfig {
    /// Creates a configuration with defaults and the given API key.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: default_base_url(),
            request_timeout_secs: DEFAULT_TIMEOUT_SECS,
            user_agent: None,
            http_referer: None,
            app_title: None,
        }
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<()> {
        if self.api_key.trim().is_empty() {
            return Err(crate::Error::configuration().with_message("API key cannot be empty"));
        }

        if !matches!(self.base_url.scheme(), "http" | "https") {
            return Err(crate::Error::configuration().with_message(format!(
                "base URL must be http(s), got {}",
                self.base_url.scheme()
            )));
        }

        Ok(())
    }

    /// Returns the effective timeout, using default if zero.
    pub fn effective_timeout(&self) -> Duration {
        if self.request_timeout_secs == 0 {
            Duration::from_secs(DEFAULT_TIMEOUT_SECS)
        } else {
            Duration::from_secs(self.request_timeout_secs)
        }
    }

    /// Returns the effective user agent, using default if not set.
    pub fn effective_user_agent(&self) -> String {
        self.user_agent
            .clone()
            .unwrap_or_else(|| format!("folio/{}", env!("CARGO_PKG_VERSION")))
    }

    /// Returns the absolute URL of an endpoint below the base URL.
    pub fn endpoint(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.as_str().trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }

    /// Returns the API key with everything but its first four characters masked.
    pub fn masked_api_key(&self) -> String {
        let visible: String = self.api_key.chars().take(4).collect();
        format!("{visible}****")
    }

    /// Set the base URL.
    #[must_use]
    pub fn with_base_url(mut self, base_url: Url) -> Self {
        self.base_url = base_url;
        self
    }

    /// Set the timeout in seconds.
    #[must_use]
    pub fn with_timeout(mut self, timeout_secs: u64) -> Self {
        self.request_timeout_secs = timeout_secs;
        self
    }

    /// Set the user agent.
    #[must_use]
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }

    /// Set the attribution headers.
    #[must_use]
    pub fn with_attribution(mut self, referer: impl Into<String>, title: impl Into<String>) -> Self {
        self.http_referer = Some(referer.into());
        self.app_title = Some(title.into());
        self
    }
}

impl fmt::Debug for GatewayConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GatewayConfig")
            .field("api_key", &self.masked_api_key())
            .field("base_url", &self.base_url.as_str())
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("user_agent", &self.user_agent)
            .field("http_referer", &self.http_referer)
            .field("app_title", &self.app_title)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ErrorKind;

    #[test]
    fn test_default_config() {
        let config = GatewayConfig::new("key");
        assert_eq!(config.request_timeout_secs, 60);
        assert_eq!(config.effective_timeout(), Duration::from_secs(60));
        assert!(config.effective_user_agent().starts_with("folio/"));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_empty_api_key_rejected() {
        let error = GatewayConfig::new("  ").validate().unwrap_err();
        assert_eq!(error.kind, ErrorKind::Configuration);
    }

    #[test]
    fn test_effective_timeout_uses_default_when_zero() {
        let config = GatewayConfig::new("key").with_timeout(0);
        assert_eq!(
            config.effective_timeout(),
            Duration::from_secs(DEFAULT_TIMEOUT_SECS)
        );
    }

    #[test]
    fn test_endpoint_keeps_base_path() {
        let config = GatewayConfig::new("key");
        assert_eq!(
            config.endpoint("chat/completions"),
            "https://openrouter.ai/api/v1/chat/completions"
        );

        let config = config.with_base_url(Url::parse("http://localhost:8080/v1/").unwrap());
        assert_eq!(config.endpoint("/embeddings"), "http://localhost:8080/v1/embeddings");
    }

    #[test]
    fn test_masked_api_key_in_debug() {
        let config = GatewayConfig::new("secret_key_12345");
        let debug_str = format!("{config:?}");
        assert!(debug_str.contains("secr****"));
        assert!(!debug_str.contains("secret_key_12345"));
    }

    #[test]
    fn test_deserialize_applies_defaults() {
        let config: GatewayConfig = serde_json::from_str(r#"{"api_key": "k"}"#).unwrap();
        assert_eq!(config.base_url.as_str(), "https://openrouter.ai/api/v1");
        assert_eq!(config.request_timeout_secs, DEFAULT_TIMEOUT_SECS);
    }
}
