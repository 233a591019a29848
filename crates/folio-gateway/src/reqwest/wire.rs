//! JSON bodies exchanged with OpenAI-compatible endpoints.

use serde::{Deserialize, Serialize};

use super::Error;
use crate::{ChatRequest, EmbeddingRequest, ResponseFormat};

#[derive(Debug, Serialize)]
pub(super) struct ChatCompletionBody<'a> {
    model: &'a str,
    messages: [Message<'a>; 2],
    temperature: f32,
    max_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_format: Option<WireFormat>,
}

#[derive(Debug, Serialize)]
struct Message<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct WireFormat {
    #[serde(rename = "type")]
    kind: &'static str,
}

impl<'a> From<&'a ChatRequest> for ChatCompletionBody<'a> {
    fn from(request: &'a ChatRequest) -> Self {
        Self {
            model: &request.model,
            messages: [
                Message {
                    role: "system",
                    content: &request.system_prompt,
                },
                Message {
                    role: "user",
                    content: &request.user_prompt,
                },
            ],
            temperature: request.options.temperature,
            max_tokens: request.options.max_tokens,
            response_format: match request.response_format {
                ResponseFormat::Json => Some(WireFormat {
                    kind: "json_object",
                }),
                ResponseFormat::Text => None,
            },
        }
    }
}

#[derive(Debug, Deserialize)]
pub(super) struct ChatCompletion {
    #[serde(default)]
    choices: Vec<Choice>,
    #[serde(default)]
    error: Option<ApiError>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    #[serde(default)]
    message: String,
}

impl ChatCompletion {
    /// Returns the text of the first choice.
    pub(super) fn into_text(self) -> Result<String, Error> {
        if let Some(error) = self.error {
            return Err(Error::Empty(format!("gateway error: {}", error.message)));
        }

        self.choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .filter(|content| !content.trim().is_empty())
            .ok_or_else(|| Error::Empty("completion has no content".into()))
    }
}

#[derive(Debug, Serialize)]
pub(super) struct EmbeddingBody<'a> {
    model: &'a str,
    input: &'a str,
    encoding_format: crate::EncodingFormat,
}

impl<'a> From<&'a EmbeddingRequest> for EmbeddingBody<'a> {
    fn from(request: &'a EmbeddingRequest) -> Self {
        Self {
            model: &request.model,
            input: &request.input,
            encoding_format: request.encoding_format,
        }
    }
}

#[derive(Debug, Deserialize)]
pub(super) struct EmbeddingList {
    #[serde(default)]
    data: Vec<EmbeddingData>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingData {
    embedding: Vec<f32>,
}

impl EmbeddingList {
    /// Returns the first embedding vector.
    pub(super) fn into_vector(self) -> Result<Vec<f32>, Error> {
        self.data
            .into_iter()
            .next()
            .map(|data| data.embedding)
            .filter(|vector| !vector.is_empty())
            .ok_or_else(|| Error::Empty("embedding response has no vector".into()))
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::GenerationOptions;

    #[test]
    fn test_chat_body_includes_json_format() {
        let request = ChatRequest::builder()
            .with_model("openai/gpt-4o-mini")
            .with_system_prompt("sys")
            .with_user_prompt("usr")
            .with_options(GenerationOptions::new(0.25, 300))
            .with_response_format(ResponseFormat::Json)
            .build()
            .unwrap();

        let body = serde_json::to_value(ChatCompletionBody::from(&request)).unwrap();
        assert_eq!(
            body,
            json!({
                "model": "openai/gpt-4o-mini",
                "messages": [
                    {"role": "system", "content": "sys"},
                    {"role": "user", "content": "usr"}
                ],
                "temperature": 0.25,
                "max_tokens": 300,
                "response_format": {"type": "json_object"}
            })
        );
    }

    #[test]
    fn test_chat_body_omits_format_for_text() {
        let request = ChatRequest::builder()
            .with_model("m")
            .with_system_prompt("s")
            .with_user_prompt("u")
            .build()
            .unwrap();

        let body = serde_json::to_value(ChatCompletionBody::from(&request)).unwrap();
        assert!(body.get("response_format").is_none());
    }

    #[test]
    fn test_completion_text_extraction() {
        let completion: ChatCompletion = serde_json::from_value(json!({
            "choices": [{"message": {"role": "assistant", "content": "hello"}}]
        }))
        .unwrap();
        assert_eq!(completion.into_text().unwrap(), "hello");
    }

    #[test]
    fn test_completion_without_content_is_error() {
        let completion: ChatCompletion = serde_json::from_value(json!({
            "choices": [{"message": {"role": "assistant", "content": null}}]
        }))
        .unwrap();
        assert!(completion.into_text().is_err());

        let completion: ChatCompletion =
            serde_json::from_value(json!({"error": {"message": "quota"}})).unwrap();
        let error = completion.into_text().unwrap_err();
        assert!(error.to_string().contains("quota"));
    }

    #[test]
    fn test_embedding_round_trip_shapes() {
        let request = EmbeddingRequest::new("openai/text-embedding-3-small", "text");
        let body = serde_json::to_value(EmbeddingBody::from(&request)).unwrap();
        assert_eq!(body["encoding_format"], "float");

        let list: EmbeddingList = serde_json::from_value(json!({
            "data": [{"embedding": [0.1, 0.2, 0.3], "index": 0}]
        }))
        .unwrap();
        assert_eq!(list.into_vector().unwrap().len(), 3);

        let empty: EmbeddingList = serde_json::from_value(json!({"data": []})).unwrap();
        assert!(empty.into_vector().is_err());
    }
}
