//! SEO unit: meta title, meta description and keywords.

use folio_core::{ContentInput, text};
use folio_gateway::{GatewayService, GenerationOptions};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use validator::Validate;

use super::{TRACING_TARGET, chat_request, with_fallback};
use crate::{Generated, Result, Unit, WorkflowConfig};

const PREAMBLE: &str = "\
You are an SEO specialist writing search metadata for technical articles.
Titles are specific and descriptive. Descriptions invite the click without clickbait.";

const PROMPT: &str = "\
Write search metadata for the following document:
- 'metaTitle': at most 60 characters
- 'metaDescription': at most 160 characters
- 'keywords': 5-10 search keywords
- 'focusKeyword': the single most important keyword";

/// Hard ceiling of the meta title, in characters.
pub const META_TITLE_MAX: usize = 60;

/// Hard ceiling of the meta description, in characters.
pub const META_DESCRIPTION_MAX: usize = 160;

/// Shortest sentence the fallback accepts as a description.
const SENTENCE_MIN: usize = 50;

/// Search metadata.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeoOutput {
    /// At most 60 characters.
    pub meta_title: String,
    /// At most 160 characters.
    pub meta_description: String,
    /// Lower-case keywords.
    pub keywords: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub focus_keyword: Option<String>,
}

/// Shape of the model reply before truncation.
#[derive(Debug, Deserialize, Validate, JsonSchema)]
#[serde(rename_all = "camelCase")]
struct SeoReply {
    #[validate(length(min = 1))]
    meta_title: String,
    #[validate(length(min = 1))]
    meta_description: String,
    #[serde(default)]
    keywords: Vec<String>,
    #[serde(default)]
    focus_keyword: Option<String>,
}

impl SeoOutput {
    /// Applies the length ceilings and lower-cases the keywords.
    fn from_reply(reply: SeoReply) -> Self {
        let mut keywords: Vec<String> = Vec::with_capacity(reply.keywords.len());
        for keyword in reply.keywords {
            let keyword = keyword.trim().to_lowercase();
            if !keyword.is_empty() && !keywords.contains(&keyword) {
                keywords.push(keyword);
            }
        }

        let focus_keyword = reply
            .focus_keyword
            .map(|k| k.trim().to_lowercase())
            .filter(|k| !k.is_empty());

        Self {
            meta_title: text::truncate_with_ellipsis(reply.meta_title.trim(), META_TITLE_MAX),
            meta_description: text::truncate_with_ellipsis(
                reply.meta_description.trim(),
                META_DESCRIPTION_MAX,
            ),
            keywords,
            focus_keyword,
        }
    }
}

/// SEO unit.
#[derive(Debug, Clone)]
pub struct SeoAgent {
    gateway: GatewayService,
    model: String,
    options: GenerationOptions,
    limit: usize,
}

impl SeoAgent {
    /// Creates the unit from the workflow configuration.
    pub fn new(gateway: GatewayService, config: &WorkflowConfig) -> Self {
        Self {
            gateway,
            model: config.models.seo.clone(),
            options: config.options.seo,
            limit: config.limits.seo,
        }
    }

    /// Generates search metadata, falling back to the title and first long sentence.
    #[tracing::instrument(skip_all, target = TRACING_TARGET, name = "seo")]
    pub async fn generate(&self, input: &ContentInput) -> Generated<SeoOutput> {
        with_fallback(Unit::Seo, self.request(input), || self.fallback(input)).await
    }

    async fn request(&self, input: &ContentInput) -> Result<SeoOutput> {
        let prompt = format!(
            "{PROMPT}\n\nTitle: {}\n\nDocument:\n{}",
            input.title,
            input.content_prefix(self.limit)
        );
        let request = chat_request(&self.model, self.options, PREAMBLE, prompt)?;
        let reply: SeoReply = self.gateway.chat_json(request).await?;
        Ok(SeoOutput::from_reply(reply))
    }

    /// Uses the literal title and the first sentence of at least 50 characters.
    ///
    /// Without such a sentence the description is the stripped content
    /// prefix. Keywords stay empty.
    pub fn fallback(&self, input: &ContentInput) -> SeoOutput {
        let plain = text::strip_markdown(input.content_prefix(self.limit));
        let description = text::first_sentence(&plain, SENTENCE_MIN).unwrap_or(&plain);

        SeoOutput {
            meta_title: text::truncate_with_ellipsis(input.title.trim(), META_TITLE_MAX),
            meta_description: text::truncate_with_ellipsis(description, META_DESCRIPTION_MAX),
            keywords: Vec::new(),
            focus_keyword: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use folio_test::MockGateway;
    use serde_json::json;

    use super::*;
    use crate::{ModelTable, Provenance};

    fn agent(mock: MockGateway) -> SeoAgent {
        let config = WorkflowConfig::new().with_models(ModelTable::with_prefix("test"));
        SeoAgent::new(mock.into_service(), &config)
    }

    #[tokio::test]
    async fn test_model_output_is_capped() {
        let reply = json!({
            "metaTitle": "A".repeat(90),
            "metaDescription": "b ".repeat(150),
            "keywords": ["Rust", "  Async IO ", "rust"],
            "focusKeyword": "Rust"
        });
        let seo = agent(MockGateway::new().with_reply("test/seo", reply.to_string()));

        let generated = seo.generate(&ContentInput::new("T", "body")).await;
        assert_eq!(generated.provenance, Provenance::Model);

        let output = generated.value;
        assert_eq!(text::char_len(&output.meta_title), META_TITLE_MAX);
        assert!(output.meta_title.ends_with("..."));
        assert!(text::char_len(&output.meta_description) <= META_DESCRIPTION_MAX);
        assert_eq!(output.keywords, vec!["rust", "async io"]);
        assert_eq!(output.focus_keyword.as_deref(), Some("rust"));
    }

    #[tokio::test]
    async fn test_fallback_uses_first_long_sentence() {
        let content = "Hi. This sentence is comfortably longer than fifty characters in total. Next.";
        let seo = agent(MockGateway::failing());

        let generated = seo.generate(&ContentInput::new("My Title", content)).await;
        assert_eq!(generated.provenance, Provenance::Fallback);
        assert_eq!(generated.value.meta_title, "My Title");
        assert_eq!(
            generated.value.meta_description,
            "This sentence is comfortably longer than fifty characters in total."
        );
        assert!(generated.value.keywords.is_empty());
    }

    #[tokio::test]
    async fn test_fallback_respects_ceilings() {
        let title = "An extremely long title that keeps going well past the sixty character limit";
        let content = "word ".repeat(400);
        let seo = agent(MockGateway::failing());

        let output = seo.generate(&ContentInput::new(title, content)).await.value;
        assert!(text::char_len(&output.meta_title) <= META_TITLE_MAX);
        assert!(text::char_len(&output.meta_description) <= META_DESCRIPTION_MAX);
    }
}
