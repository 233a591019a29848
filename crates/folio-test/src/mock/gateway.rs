//! Scripted gateway provider.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

#[cfg(feature = "config")]
use clap::Args;
use folio_core::{Error, ErrorKind, Result};
use folio_gateway::{ChatRequest, EmbeddingRequest, GatewayProvider, GatewayService};
use serde::{Deserialize, Serialize};

use super::mock_embedding;

/// Configuration for the mock gateway.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "config", derive(Args))]
pub struct MockGatewayConfig {
    /// Dimensions of generated embedding vectors.
    #[cfg_attr(
        feature = "config",
        arg(long = "mock-dimensions", env = "MOCK_EMBEDDING_DIMENSIONS", default_value_t = 8)
    )]
    pub embedding_dimensions: usize,

    /// Fail every embedding call that has no scripted reply.
    #[cfg_attr(
        feature = "config",
        arg(long = "mock-fail-embeddings", env = "MOCK_FAIL_EMBEDDINGS")
    )]
    pub fail_embeddings: bool,
}

impl Default for MockGatewayConfig {
    fn default() -> Self {
        Self {
            embedding_dimensions: 8,
            fail_embeddings: false,
        }
    }
}

/// Scripted outcome of one call.
#[derive(Debug, Clone)]
enum MockReply {
    /// Reply with this text.
    Text(String),
    /// Reply with this vector.
    Vector(Vec<f32>),
    /// Fail with an error of this kind.
    Fail(ErrorKind),
    /// Panic inside the provider.
    Panic,
}

#[derive(Debug, Default)]
struct Script {
    chat: HashMap<String, MockReply>,
    embed: HashMap<String, MockReply>,
    fallback_chat: Option<MockReply>,
    calls: Vec<String>,
}

/// Mock gateway for testing.
///
/// Chat replies are looked up by model identifier; a model with no script
/// fails with [`ErrorKind::ServiceUnavailable`]. Embeddings are looked up the
/// same way and otherwise derived with [`mock_embedding`].
#[derive(Debug, Clone, Default)]
pub struct MockGateway {
    config: MockGatewayConfig,
    script: Arc<Mutex<Script>>,
}

impl MockGateway {
    /// Creates a mock gateway with the default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a mock gateway with the given configuration.
    pub fn from_config(config: MockGatewayConfig) -> Self {
        Self {
            config,
            script: Arc::default(),
        }
    }

    /// Creates a mock gateway where every chat and embedding call fails.
    pub fn failing() -> Self {
        Self::from_config(MockGatewayConfig {
            fail_embeddings: true,
            ..MockGatewayConfig::default()
        })
    }

    /// Scripts a chat reply for `model`.
    #[must_use]
    pub fn with_reply(self, model: impl Into<String>, reply: impl Into<String>) -> Self {
        self.script_chat(model, MockReply::Text(reply.into()))
    }

    /// Scripts a chat failure for `model`.
    #[must_use]
    pub fn with_failure(self, model: impl Into<String>) -> Self {
        self.script_chat(model, MockReply::Fail(ErrorKind::ServiceUnavailable))
    }

    /// Scripts a panic for chat calls against `model`.
    #[must_use]
    pub fn with_panic(self, model: impl Into<String>) -> Self {
        self.script_chat(model, MockReply::Panic)
    }

    /// Sets the reply used for every chat model without its own script.
    #[must_use]
    pub fn with_default_reply(self, reply: impl Into<String>) -> Self {
        self.lock().fallback_chat = Some(MockReply::Text(reply.into()));
        self
    }

    /// Scripts an embedding vector for `model`.
    #[must_use]
    pub fn with_embedding(self, model: impl Into<String>, vector: Vec<f32>) -> Self {
        self.lock()
            .embed
            .insert(model.into(), MockReply::Vector(vector));
        self
    }

    /// Scripts an embedding failure for `model`.
    #[must_use]
    pub fn with_embedding_failure(self, model: impl Into<String>) -> Self {
        self.lock()
            .embed
            .insert(model.into(), MockReply::Fail(ErrorKind::ServiceUnavailable));
        self
    }

    /// Returns the models contacted so far, in call order.
    pub fn calls(&self) -> Vec<String> {
        self.lock().calls.clone()
    }

    /// Returns how many calls were made against `model`.
    pub fn call_count(&self, model: &str) -> usize {
        self.lock().calls.iter().filter(|m| *m == model).count()
    }

    /// Wraps a clone of this mock in a [`GatewayService`].
    pub fn into_service(self) -> GatewayService {
        GatewayService::new(self)
    }

    fn script_chat(self, model: impl Into<String>, reply: MockReply) -> Self {
        self.lock().chat.insert(model.into(), reply);
        self
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Script> {
        // A panic scripted with `with_panic` happens after the guard is
        // dropped, so the lock is never poisoned by the mock itself.
        self.script.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn unscripted(model: &str) -> Error {
        Error::service_unavailable().with_message(format!("no scripted reply for model '{model}'"))
    }
}

#[async_trait::async_trait]
impl GatewayProvider for MockGateway {
    async fn chat(&self, request: &ChatRequest) -> Result<String> {
        let reply = {
            let mut script = self.lock();
            script.calls.push(request.model.clone());
            script
                .chat
                .get(&request.model)
                .or(script.fallback_chat.as_ref())
                .cloned()
        };

        match reply {
            Some(MockReply::Text(text)) => Ok(text),
            Some(MockReply::Fail(kind)) => {
                Err(Error::new(kind).with_message(format!("scripted failure for '{}'", request.model)))
            }
            Some(MockReply::Panic) => panic!("scripted panic for model '{}'", request.model),
            Some(MockReply::Vector(_)) | None => Err(Self::unscripted(&request.model)),
        }
    }

    async fn embed(&self, request: &EmbeddingRequest) -> Result<Vec<f32>> {
        let reply = {
            let mut script = self.lock();
            script.calls.push(request.model.clone());
            script.embed.get(&request.model).cloned()
        };

        match reply {
            Some(MockReply::Vector(vector)) => Ok(vector),
            Some(MockReply::Fail(kind)) => {
                Err(Error::new(kind).with_message(format!("scripted failure for '{}'", request.model)))
            }
            Some(MockReply::Panic) => panic!("scripted panic for model '{}'", request.model),
            Some(MockReply::Text(_)) => Err(Self::unscripted(&request.model)),
            None if self.config.fail_embeddings => Err(Self::unscripted(&request.model)),
            None => Ok(mock_embedding(
                &request.input,
                self.config.embedding_dimensions,
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use folio_gateway::GenerationOptions;

    use super::*;

    fn request(model: &str) -> ChatRequest {
        ChatRequest::builder()
            .with_model(model)
            .with_system_prompt("system")
            .with_user_prompt("user")
            .with_options(GenerationOptions::new(0.3, 100))
            .build()
            .unwrap()
    }

    #[tokio::test]
    async fn test_routes_by_model() {
        let mock = MockGateway::new()
            .with_reply("a", "alpha")
            .with_failure("b");

        assert_eq!(mock.chat(&request("a")).await.unwrap(), "alpha");
        assert!(mock.chat(&request("b")).await.is_err());
        assert!(mock.chat(&request("c")).await.is_err());
        assert_eq!(mock.calls(), vec!["a", "b", "c"]);
    }

    #[tokio::test]
    async fn test_default_reply() {
        let mock = MockGateway::new().with_default_reply("{}");
        assert_eq!(mock.chat(&request("anything")).await.unwrap(), "{}");
    }

    #[tokio::test]
    async fn test_embeddings() {
        let mock = MockGateway::new()
            .with_embedding("primary", vec![1.0, 0.0])
            .with_embedding_failure("broken");

        let vector = mock
            .embed(&EmbeddingRequest::new("primary", "text"))
            .await
            .unwrap();
        assert_eq!(vector, vec![1.0, 0.0]);

        assert!(mock.embed(&EmbeddingRequest::new("broken", "text")).await.is_err());

        let derived = mock
            .embed(&EmbeddingRequest::new("other", "text"))
            .await
            .unwrap();
        assert_eq!(derived.len(), 8);
        assert_eq!(mock.call_count("other"), 1);
    }

    #[tokio::test]
    async fn test_failing_gateway() {
        let mock = MockGateway::failing();
        assert!(mock.chat(&request("m")).await.is_err());
        assert!(mock.embed(&EmbeddingRequest::new("m", "text")).await.is_err());
    }

    #[tokio::test]
    async fn test_clones_share_script() {
        let mock = MockGateway::new();
        let service = mock.clone().into_service();
        let _ = service.chat_text(&request("shared")).await;
        assert_eq!(mock.call_count("shared"), 1);
    }
}
