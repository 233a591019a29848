//! Summary unit: four summaries of increasing length.

use folio_core::{ContentInput, text};
use folio_gateway::{GatewayService, GenerationOptions};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use validator::Validate;

use super::{TRACING_TARGET, chat_request, with_fallback};
use crate::{Generated, Result, Unit, WorkflowConfig};

const PREAMBLE: &str = "\
You are an editor who summarizes technical markdown documents.
Write plain prose for the summaries, without markdown syntax.
Never invent facts that are not in the document.";

const PROMPT: &str = "\
Summarize the following document at four lengths:
- 'short': one or two sentences, 150-200 characters
- 'medium': about 300 characters
- 'long': about 500 characters
- 'markdown': a condensed markdown version of the document, about 30% of its length, keeping its headings";

/// Ceiling of the short summary.
const SHORT_MAX: usize = 200;
const MEDIUM_MAX: usize = 300;
const LONG_MAX: usize = 500;

/// Lower bound of the fallback markdown excerpt, so short documents are kept whole.
const MARKDOWN_MIN: usize = 200;

/// Summaries of one document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, Validate, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct SummaryOutput {
    /// 150-200 characters.
    #[validate(length(min = 1))]
    pub short: String,
    /// About 300 characters.
    #[validate(length(min = 1))]
    pub medium: String,
    /// About 500 characters.
    #[validate(length(min = 1))]
    pub long: String,
    /// Condensed markdown, about 30% of the source.
    #[validate(length(min = 1))]
    pub markdown: String,
}

/// Summary unit.
#[derive(Debug, Clone)]
pub struct SummaryAgent {
    gateway: GatewayService,
    model: String,
    options: GenerationOptions,
    limit: usize,
}

impl SummaryAgent {
    /// Creates the unit from the workflow configuration.
    pub fn new(gateway: GatewayService, config: &WorkflowConfig) -> Self {
        Self {
            gateway,
            model: config.models.summary.clone(),
            options: config.options.summary,
            limit: config.limits.summary,
        }
    }

    /// Summarizes the input, falling back to truncation of the stripped text.
    #[tracing::instrument(skip_all, target = TRACING_TARGET, name = "summary")]
    pub async fn generate(&self, input: &ContentInput) -> Generated<SummaryOutput> {
        with_fallback(Unit::Summary, self.request(input), || self.fallback(input)).await
    }

    async fn request(&self, input: &ContentInput) -> Result<SummaryOutput> {
        let prompt = format!(
            "{PROMPT}\n\nTitle: {}\n\nDocument:\n{}",
            input.title,
            input.content_prefix(self.limit)
        );
        let request = chat_request(&self.model, self.options, PREAMBLE, prompt)?;
        let mut output: SummaryOutput = self.gateway.chat_json(request).await?;

        output.short = text::truncate_at_word(output.short.trim(), SHORT_MAX);
        Ok(output)
    }

    /// Truncates the markdown-stripped content on word boundaries.
    pub fn fallback(&self, input: &ContentInput) -> SummaryOutput {
        let plain = text::strip_markdown(input.content_prefix(self.limit));
        let markdown_target = (input.content_chars() * 3 / 10).max(MARKDOWN_MIN);

        SummaryOutput {
            short: text::truncate_at_word(&plain, SHORT_MAX),
            medium: text::truncate_at_word(&plain, MEDIUM_MAX),
            long: text::truncate_at_word(&plain, LONG_MAX),
            markdown: text::truncate_at_word(input.content.trim(), markdown_target),
        }
    }
}
