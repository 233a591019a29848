//! Reqwest-based gateway client.

use std::sync::Arc;

use reqwest::{Client, RequestBuilder, Response};

use super::wire::{ChatCompletion, ChatCompletionBody, EmbeddingBody, EmbeddingList};
use super::{Error, GatewayConfig, TRACING_TARGET};
use crate::{ChatRequest, EmbeddingRequest, GatewayProvider, GatewayService};

/// Inner client that holds the HTTP client and configuration.
struct ReqwestGatewayInner {
    http: Client,
    config: GatewayConfig,
}

/// Reqwest-based client for an OpenRouter-compatible gateway.
///
/// Sends one request per call to `{base_url}/chat/completions` or
/// `{base_url}/embeddings`. The per-call timeout comes from
/// [`GatewayConfig::effective_timeout`]; there is no retry.
#[derive(Clone)]
pub struct ReqwestGateway {
    inner: Arc<ReqwestGatewayInner>,
}

impl std::fmt::Debug for ReqwestGateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReqwestGateway")
            .field("config", &self.inner.config)
            .finish_non_exhaustive()
    }
}

impl ReqwestGateway {
    /// Creates a new gateway client with the given configuration.
    pub fn new(config: GatewayConfig) -> crate::Result<Self> {
        config.validate()?;

        let timeout = config.effective_timeout();
        let user_agent = config.effective_user_agent();

        tracing::debug!(
            target: TRACING_TARGET,
            base_url = %config.base_url,
            timeout_ms = timeout.as_millis(),
            "Creating gateway client"
        );

        let http = Client::builder()
            .timeout(timeout)
            .user_agent(&user_agent)
            .build()
            .map_err(|e| {
                crate::Error::configuration()
                    .with_message("failed to create HTTP client")
                    .with_source(e)
            })?;

        tracing::info!(
            target: TRACING_TARGET,
            base_url = %config.base_url,
            "Gateway client created successfully"
        );

        Ok(Self {
            inner: Arc::new(ReqwestGatewayInner { http, config }),
        })
    }

    /// Gets the client configuration.
    pub fn config(&self) -> &GatewayConfig {
        &self.inner.config
    }

    /// Converts this client into a [`GatewayService`] for use with dependency injection.
    pub fn into_service(self) -> GatewayService {
        GatewayService::new(self)
    }

    /// Starts an authenticated POST to an endpoint below the base URL.
    fn post(&self, path: &str) -> RequestBuilder {
        let config = self.config();
        let mut request = self
            .inner
            .http
            .post(config.endpoint(path))
            .bearer_auth(&config.api_key);

        if let Some(ref referer) = config.http_referer {
            request = request.header("HTTP-Referer", referer);
        }
        if let Some(ref title) = config.app_title {
            request = request.header("X-Title", title);
        }

        request
    }

    /// Turns non-2xx responses into errors.
    async fn check_status(response: Response) -> Result<Response, Error> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        Err(Error::status(status.as_u16(), &body))
    }
}

#[async_trait::async_trait]
impl GatewayProvider for ReqwestGateway {
    async fn chat(&self, request: &ChatRequest) -> crate::Result<String> {
        let body = ChatCompletionBody::from(request);
        let response = self
            .post("chat/completions")
            .json(&body)
            .send()
            .await
            .map_err(Error::from)?;

        let response = Self::check_status(response).await?;
        let completion: ChatCompletion = response.json().await.map_err(Error::from)?;
        let text = completion.into_text()?;

        tracing::trace!(
            target: TRACING_TARGET,
            model = %request.model,
            reply_len = text.len(),
            "Chat completion received"
        );

        Ok(text)
    }

    async fn embed(&self, request: &EmbeddingRequest) -> crate::Result<Vec<f32>> {
        let body = EmbeddingBody::from(request);
        let response = self
            .post("embeddings")
            .json(&body)
            .send()
            .await
            .map_err(Error::from)?;

        let response = Self::check_status(response).await?;
        let list: EmbeddingList = response.json().await.map_err(Error::from)?;
        Ok(list.into_vector()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ErrorKind;

    #[test]
    fn test_client_creation() {
        let client = ReqwestGateway::new(GatewayConfig::new("key")).unwrap();
        assert!(client.config().user_agent.is_none());
    }

    #[test]
    fn test_client_rejects_invalid_config() {
        let error = ReqwestGateway::new(GatewayConfig::new("")).unwrap_err();
        assert_eq!(error.kind, ErrorKind::Configuration);
    }

    #[test]
    fn test_debug_masks_key() {
        let client = ReqwestGateway::new(GatewayConfig::new("sk-or-abcdef")).unwrap();
        let debug = format!("{client:?}");
        assert!(debug.contains("sk-o****"));
        assert!(!debug.contains("abcdef"));
    }
}
