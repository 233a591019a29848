//! Gateway service wrapper with observability.

use std::sync::Arc;
use std::time::Instant;

use schemars::JsonSchema;
use serde::de::DeserializeOwned;
use validator::Validate;

use crate::{
    ChatRequest, EmbeddingRequest, Error, GatewayProvider, JsonResponse, ResponseFormat, Result,
    TRACING_TARGET,
};

/// Gateway service wrapper with observability.
///
/// This wrapper adds structured logging to any [`GatewayProvider`] and the
/// typed JSON path used by the generators. The inner provider is wrapped in
/// `Arc` for cheap cloning.
#[derive(Clone)]
pub struct GatewayService {
    inner: Arc<dyn GatewayProvider>,
}

impl std::fmt::Debug for GatewayService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GatewayService").finish_non_exhaustive()
    }
}

impl GatewayService {
    /// Creates a new gateway service wrapper.
    pub fn new<P>(provider: P) -> Self
    where
        P: GatewayProvider + 'static,
    {
        Self {
            inner: Arc::new(provider),
        }
    }

    /// Creates a service from an already shared provider.
    pub fn from_arc(provider: Arc<dyn GatewayProvider>) -> Self {
        Self { inner: provider }
    }

    /// Sends a chat completion and returns the raw text.
    pub async fn chat_text(&self, request: &ChatRequest) -> Result<String> {
        let start = Instant::now();

        tracing::debug!(
            target: TRACING_TARGET,
            model = %request.model,
            temperature = request.options.temperature,
            max_tokens = request.options.max_tokens,
            json = request.expects_json(),
            "Sending chat completion"
        );

        let result = self.inner.chat(request).await;
        let elapsed = start.elapsed();

        match &result {
            Ok(reply) => {
                tracing::debug!(
                    target: TRACING_TARGET,
                    model = %request.model,
                    reply_len = reply.len(),
                    elapsed_ms = elapsed.as_millis(),
                    "Chat completion succeeded"
                );
            }
            Err(error) => {
                tracing::warn!(
                    target: TRACING_TARGET,
                    model = %request.model,
                    error = %error,
                    elapsed_ms = elapsed.as_millis(),
                    "Chat completion failed"
                );
            }
        }

        result
    }

    /// Sends a chat completion that must reply with JSON shaped like `T`.
    ///
    /// The JSON Schema of `T` is appended to the system prompt, the request is
    /// switched to [`ResponseFormat::Json`], and the reply is decoded and
    /// validated. Transport, decoding and validation failures all surface as
    /// a single error.
    pub async fn chat_json<T>(&self, request: ChatRequest) -> Result<T>
    where
        T: DeserializeOwned + Validate + JsonSchema,
    {
        let schema = schemars::schema_for!(T);
        let schema = serde_json::to_string(&schema).map_err(|e| {
            Error::serialization()
                .with_message("failed to render response schema")
                .with_source(e)
        })?;

        let request = ChatRequest {
            system_prompt: format!(
                "{}\n\nRespond with a single JSON object matching this JSON Schema:\n{}",
                request.system_prompt, schema
            ),
            response_format: ResponseFormat::Json,
            ..request
        };

        let reply = self.chat_text(&request).await?;
        JsonResponse::decode(&reply).inspect_err(|error| {
            tracing::warn!(
                target: TRACING_TARGET,
                model = %request.model,
                error = %error,
                "Structured reply rejected"
            );
        })
    }

    /// Requests one embedding vector.
    pub async fn embed(&self, request: &EmbeddingRequest) -> Result<Vec<f32>> {
        let start = Instant::now();

        tracing::debug!(
            target: TRACING_TARGET,
            model = %request.model,
            input_len = request.input.len(),
            "Requesting embedding"
        );

        let result = self.inner.embed(request).await;
        let elapsed = start.elapsed();

        match &result {
            Ok(vector) => {
                tracing::debug!(
                    target: TRACING_TARGET,
                    model = %request.model,
                    dimensions = vector.len(),
                    elapsed_ms = elapsed.as_millis(),
                    "Embedding succeeded"
                );
            }
            Err(error) => {
                tracing::warn!(
                    target: TRACING_TARGET,
                    model = %request.model,
                    error = %error,
                    elapsed_ms = elapsed.as_millis(),
                    "Embedding failed"
                );
            }
        }

        result
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use schemars::JsonSchema;
    use serde::Deserialize;

    use super::*;
    use crate::{ErrorKind, GenerationOptions};

    /// Replies with a fixed string and records the last request.
    struct Echo {
        reply: String,
        last: Mutex<Option<ChatRequest>>,
    }

    #[async_trait::async_trait]
    impl GatewayProvider for Echo {
        async fn chat(&self, request: &ChatRequest) -> Result<String> {
            *self.last.lock().unwrap() = Some(request.clone());
            Ok(self.reply.clone())
        }

        async fn embed(&self, _request: &EmbeddingRequest) -> Result<Vec<f32>> {
            Err(Error::service_unavailable())
        }
    }

    #[derive(Debug, Deserialize, Validate, JsonSchema)]
    struct Answer {
        #[validate(length(min = 1))]
        answer: String,
    }

    fn request() -> ChatRequest {
        ChatRequest::builder()
            .with_model("test/model")
            .with_system_prompt("You answer.")
            .with_user_prompt("Question?")
            .with_options(GenerationOptions::new(0.3, 100))
            .build()
            .unwrap()
    }

    #[tokio::test]
    async fn test_chat_json_decodes_and_marks_request() {
        let echo = Arc::new(Echo {
            reply: r#"{"answer": "42"}"#.to_string(),
            last: Mutex::new(None),
        });
        let service = GatewayService::from_arc(echo.clone());

        let answer: Answer = service.chat_json(request()).await.unwrap();
        assert_eq!(answer.answer, "42");

        let sent = echo.last.lock().unwrap().clone().unwrap();
        assert!(sent.expects_json());
        assert!(sent.system_prompt.starts_with("You answer."));
        assert!(sent.system_prompt.contains("\"answer\""));
    }

    #[tokio::test]
    async fn test_chat_json_rejects_invalid_shape() {
        let service = GatewayService::new(Echo {
            reply: r#"{"answer": ""}"#.to_string(),
            last: Mutex::new(None),
        });

        let error = service.chat_json::<Answer>(request()).await.unwrap_err();
        assert_eq!(error.kind, ErrorKind::InvalidResponse);
    }

    #[tokio::test]
    async fn test_embed_propagates_errors() {
        let service = GatewayService::new(Echo {
            reply: String::new(),
            last: Mutex::new(None),
        });

        let error = service
            .embed(&EmbeddingRequest::new("m", "text"))
            .await
            .unwrap_err();
        assert_eq!(error.kind, ErrorKind::ServiceUnavailable);
    }
}
