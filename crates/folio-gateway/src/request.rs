//! Gateway request types.

use derive_builder::Builder;
use serde::{Deserialize, Serialize};

use crate::Error;

/// Sampling options for a single chat completion.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationOptions {
    /// Sampling temperature (0.0-2.0).
    pub temperature: f32,
    /// Maximum number of output tokens.
    pub max_tokens: u32,
}

impl GenerationOptions {
    /// Creates new generation options.
    pub const fn new(temperature: f32, max_tokens: u32) -> Self {
        Self {
            temperature,
            max_tokens,
        }
    }
}

impl Default for GenerationOptions {
    fn default() -> Self {
        Self::new(0.7, 1000)
    }
}

/// Expected format of the assistant reply.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResponseFormat {
    /// Free text.
    #[default]
    Text,
    /// A single JSON object.
    Json,
}

/// A chat completion request: one system and one user instruction.
#[derive(Debug, Clone, Builder)]
#[builder(
    name = "ChatRequestBuilder",
    pattern = "owned",
    setter(into, prefix = "with"),
    build_fn(validate = "Self::validate_request")
)]
pub struct ChatRequest {
    /// Model identifier understood by the gateway (e.g. `openai/gpt-4o-mini`).
    pub model: String,
    /// System instruction.
    pub system_prompt: String,
    /// User instruction.
    pub user_prompt: String,
    /// Sampling options.
    #[builder(default)]
    pub options: GenerationOptions,
    /// Expected reply format.
    #[builder(default)]
    pub response_format: ResponseFormat,
}

impl ChatRequest {
    /// Creates a new chat request builder.
    pub fn builder() -> ChatRequestBuilder {
        ChatRequestBuilder::default()
    }

    /// Returns true when the caller demands a JSON reply.
    pub fn expects_json(&self) -> bool {
        self.response_format == ResponseFormat::Json
    }
}

impl ChatRequestBuilder {
    fn validate_request(&self) -> std::result::Result<(), String> {
        if let Some(ref model) = self.model
            && model.trim().is_empty()
        {
            return Err("model identifier cannot be empty".to_string());
        }

        if let Some(ref options) = self.options {
            if !(0.0..=2.0).contains(&options.temperature) {
                return Err(format!(
                    "temperature must be between 0.0 and 2.0, got {}",
                    options.temperature
                ));
            }
            if options.max_tokens == 0 {
                return Err("max tokens must be greater than 0".to_string());
            }
        }

        Ok(())
    }
}

impl From<ChatRequestBuilderError> for Error {
    fn from(error: ChatRequestBuilderError) -> Self {
        Error::invalid_input().with_message(error.to_string())
    }
}

/// Encoding of the returned embedding vector.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EncodingFormat {
    /// Plain JSON floats.
    #[default]
    Float,
}

/// An embedding request against the dedicated embeddings endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmbeddingRequest {
    /// Embedding model identifier.
    pub model: String,
    /// Text to embed.
    pub input: String,
    /// Vector encoding.
    pub encoding_format: EncodingFormat,
}

impl EmbeddingRequest {
    /// Creates a new embedding request with float encoding.
    pub fn new(model: impl Into<String>, input: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            input: input.into(),
            encoding_format: EncodingFormat::Float,
        }
    }

    /// Returns a copy of this request targeting another model.
    pub fn with_model(&self, model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            ..self.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ErrorKind, Result};

    #[test]
    fn test_builder_defaults() -> Result<()> {
        let request = ChatRequest::builder()
            .with_model("openai/gpt-4o-mini")
            .with_system_prompt("system")
            .with_user_prompt("user")
            .build()?;

        assert_eq!(request.options, GenerationOptions::default());
        assert_eq!(request.response_format, ResponseFormat::Text);
        assert!(!request.expects_json());
        Ok(())
    }

    #[test]
    fn test_builder_rejects_missing_fields() {
        let error: Error = ChatRequest::builder()
            .with_model("openai/gpt-4o-mini")
            .build()
            .unwrap_err()
            .into();
        assert_eq!(error.kind, ErrorKind::InvalidInput);
    }

    #[test]
    fn test_builder_rejects_bad_temperature() {
        let error = ChatRequest::builder()
            .with_model("m")
            .with_system_prompt("s")
            .with_user_prompt("u")
            .with_options(GenerationOptions::new(3.5, 100))
            .build()
            .unwrap_err();
        assert!(error.to_string().contains("temperature"));
    }

    #[test]
    fn test_builder_rejects_blank_model() {
        let result = ChatRequest::builder()
            .with_model("  ")
            .with_system_prompt("s")
            .with_user_prompt("u")
            .build();
        assert!(result.is_err());
    }

    #[test]
    fn test_embedding_request_serializes_encoding() {
        let request = EmbeddingRequest::new("openai/text-embedding-3-small", "hello");
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["encoding_format"], "float");

        let other = request.with_model("openai/text-embedding-3-large");
        assert_eq!(other.input, "hello");
        assert_eq!(other.model, "openai/text-embedding-3-large");
    }
}
