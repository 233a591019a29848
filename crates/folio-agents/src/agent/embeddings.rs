//! Embeddings unit: one vector for the whole document.
//!
//! A vector cannot be fabricated deterministically, so instead of a
//! heuristic this unit retries once against a second model and otherwise
//! returns the error.

use folio_core::{ContentInput, Error};
use folio_gateway::{EmbeddingRequest, GatewayService};
use serde::{Deserialize, Serialize};

use super::TRACING_TARGET;
use crate::{Generated, Result, Unit, WorkflowConfig};

/// Model name reported when no vector could be produced.
pub const NO_MODEL: &str = "none";

/// Document embedding.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmbeddingsOutput {
    pub embedding: Vec<f32>,
    /// Model that produced the vector, or `none`.
    pub model: String,
    pub dimensions: usize,
}

impl EmbeddingsOutput {
    /// Creates an output from a vector.
    pub fn new(embedding: Vec<f32>, model: impl Into<String>) -> Self {
        Self {
            dimensions: embedding.len(),
            embedding,
            model: model.into(),
        }
    }

    /// The empty output used when both models fail.
    pub fn empty() -> Self {
        Self::new(Vec::new(), NO_MODEL)
    }

    /// Returns true when no vector was produced.
    pub fn is_empty(&self) -> bool {
        self.embedding.is_empty()
    }
}

/// Embeddings unit.
#[derive(Debug, Clone)]
pub struct EmbeddingsAgent {
    gateway: GatewayService,
    model: String,
    fallback_model: String,
    limit: usize,
}

impl EmbeddingsAgent {
    /// Creates the unit from the workflow configuration.
    pub fn new(gateway: GatewayService, config: &WorkflowConfig) -> Self {
        Self {
            gateway,
            model: config.models.embedding.clone(),
            fallback_model: config.models.embedding_fallback.clone(),
            limit: config.limits.embeddings,
        }
    }

    /// Embeds title and content with the first model, then once with the second.
    ///
    /// A vector from the second model is tagged as a fallback. Fails with
    /// [`ErrorKind::ExternalError`](crate::ErrorKind::ExternalError) when
    /// both calls fail.
    #[tracing::instrument(skip_all, target = TRACING_TARGET, name = "embeddings")]
    pub async fn generate(&self, input: &ContentInput) -> Result<Generated<EmbeddingsOutput>> {
        let text = format!("{}\n\n{}", input.title, input.content_prefix(self.limit));
        let request = EmbeddingRequest::new(&self.model, text);

        let primary_error = match self.embed(&request).await {
            Ok(vector) => return Ok(Generated::model(EmbeddingsOutput::new(vector, &self.model))),
            Err(error) => error,
        };

        tracing::warn!(
            target: TRACING_TARGET,
            unit = %Unit::Embeddings,
            model = %self.model,
            fallback_model = %self.fallback_model,
            error = %primary_error,
            "Embedding failed, retrying with fallback model"
        );

        let request = request.with_model(&self.fallback_model);
        match self.embed(&request).await {
            Ok(vector) => Ok(Generated::fallback(EmbeddingsOutput::new(
                vector,
                &self.fallback_model,
            ))),
            Err(error) => Err(Error::external_error()
                .with_message(format!(
                    "embedding failed with '{}' ({primary_error}) and '{}' ({error})",
                    self.model, self.fallback_model
                ))
                .with_source(error)),
        }
    }

    /// One embedding call; an empty vector counts as a failure.
    async fn embed(&self, request: &EmbeddingRequest) -> Result<Vec<f32>> {
        let vector = self.gateway.embed(request).await?;
        if vector.is_empty() {
            return Err(Error::invalid_response().with_message("empty embedding vector"));
        }
        Ok(vector)
    }
}

#[cfg(test)]
mod tests {
    use folio_test::MockGateway;

    use super::*;
    use crate::{ErrorKind, ModelTable, Provenance};

    fn agent(mock: MockGateway) -> EmbeddingsAgent {
        let config = WorkflowConfig::new().with_models(ModelTable::with_prefix("test"));
        EmbeddingsAgent::new(mock.into_service(), &config)
    }

    fn input() -> ContentInput {
        ContentInput::new("Title", "Body")
    }

    #[tokio::test]
    async fn test_primary_model() {
        let mock = MockGateway::new().with_embedding("test/embedding", vec![0.1, 0.2, 0.3]);
        let generated = agent(mock.clone()).generate(&input()).await.unwrap();

        assert_eq!(generated.provenance, Provenance::Model);
        assert_eq!(generated.value.model, "test/embedding");
        assert_eq!(generated.value.dimensions, 3);
        assert_eq!(mock.call_count("test/embedding_fallback"), 0);
    }

    #[tokio::test]
    async fn test_retries_once_with_fallback_model() {
        let mock = MockGateway::new()
            .with_embedding_failure("test/embedding")
            .with_embedding("test/embedding_fallback", vec![0.5; 4]);
        let generated = agent(mock.clone()).generate(&input()).await.unwrap();

        assert_eq!(generated.provenance, Provenance::Fallback);
        assert_eq!(generated.value.model, "test/embedding_fallback");
        assert_eq!(generated.value.dimensions, 4);
        assert_eq!(mock.calls(), vec!["test/embedding", "test/embedding_fallback"]);
    }

    #[tokio::test]
    async fn test_empty_vector_counts_as_failure() {
        let mock = MockGateway::new()
            .with_embedding("test/embedding", Vec::new())
            .with_embedding("test/embedding_fallback", vec![1.0]);
        let generated = agent(mock).generate(&input()).await.unwrap();
        assert_eq!(generated.value.model, "test/embedding_fallback");
    }

    #[tokio::test]
    async fn test_double_failure_is_an_error() {
        let mock = MockGateway::failing();
        let error = agent(mock.clone()).generate(&input()).await.unwrap_err();

        assert_eq!(error.kind, ErrorKind::ExternalError);
        assert_eq!(mock.calls().len(), 2);
    }

    #[test]
    fn test_empty_output() {
        let output = EmbeddingsOutput::empty();
        assert!(output.is_empty());
        assert_eq!(output.model, "none");
        assert_eq!(output.dimensions, 0);
    }
}
