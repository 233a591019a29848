//! Category unit: classification into the closed [`Category`] set.

use folio_core::ContentInput;
use folio_gateway::{GatewayService, GenerationOptions};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use validator::Validate;

use super::{TRACING_TARGET, chat_request, with_fallback};
use crate::{Category, Generated, Result, Unit, WorkflowConfig};

const PREAMBLE: &str = "\
You are a librarian classifying technical documents about AI tooling.
Pick exactly one category from the provided list. Be conservative with confidence.";

const PROMPT: &str = "\
Classify the following document into exactly one of these categories: {}

Reply with 'category' (one of the categories, verbatim), 'confidence' (0-1), \
a one-sentence 'reasoning', and up to two 'alternatives' from the same list.";

/// Fallback confidence when a keyword rule matched.
const MATCHED_CONFIDENCE: f32 = 0.6;

/// Fallback confidence when nothing matched.
const UNMATCHED_CONFIDENCE: f32 = 0.3;

/// Classification result.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryOutput {
    pub category: Category,
    /// In `[0, 1]`.
    pub confidence: f32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reasoning: Option<String>,
    #[serde(default)]
    pub alternatives: Vec<Category>,
}

/// Shape of the model reply; labels are free text until remapped.
#[derive(Debug, Deserialize, Validate, JsonSchema)]
#[serde(rename_all = "camelCase")]
struct CategoryReply {
    #[validate(length(min = 1))]
    category: String,
    #[validate(range(min = 0.0, max = 1.0))]
    confidence: f32,
    #[serde(default)]
    reasoning: Option<String>,
    #[serde(default)]
    alternatives: Vec<String>,
}

/// Category unit.
#[derive(Debug, Clone)]
pub struct CategoryAgent {
    gateway: GatewayService,
    model: String,
    options: GenerationOptions,
    limit: usize,
}

impl CategoryAgent {
    /// Creates the unit from the workflow configuration.
    pub fn new(gateway: GatewayService, config: &WorkflowConfig) -> Self {
        Self {
            gateway,
            model: config.models.category.clone(),
            options: config.options.category,
            limit: config.limits.category,
        }
    }

    /// Classifies the input, falling back to keyword rules.
    #[tracing::instrument(skip_all, target = TRACING_TARGET, name = "category")]
    pub async fn generate(&self, input: &ContentInput) -> Generated<CategoryOutput> {
        with_fallback(Unit::Category, self.request(input), || self.fallback(input)).await
    }

    async fn request(&self, input: &ContentInput) -> Result<CategoryOutput> {
        let labels = Category::labels().join(", ");
        let prompt = format!(
            "{}\n\nTitle: {}\n\nDocument:\n{}",
            PROMPT.replace("{}", &labels),
            input.title,
            input.content_prefix(self.limit)
        );
        let request = chat_request(&self.model, self.options, PREAMBLE, prompt)?;
        let reply: CategoryReply = self.gateway.chat_json(request).await?;
        Ok(self.remap(reply, input))
    }

    /// Maps free-text labels onto the closed set.
    ///
    /// A label outside the set is matched against the keyword rules, first
    /// by its own text and then by the document's; only when both miss does
    /// it become [`Category::General`].
    fn remap(&self, reply: CategoryReply, input: &ContentInput) -> CategoryOutput {
        let category = Category::parse_label(&reply.category)
            .or_else(|| Category::from_keywords(&reply.category))
            .unwrap_or_else(|| {
                tracing::debug!(
                    target: TRACING_TARGET,
                    label = %reply.category,
                    "Model label outside the category set"
                );
                Category::from_keywords(&self.haystack(input)).unwrap_or_default()
            });

        let mut alternatives = Vec::new();
        for label in &reply.alternatives {
            if let Some(alternative) = Category::parse_label(label)
                && alternative != category
                && !alternatives.contains(&alternative)
            {
                alternatives.push(alternative);
            }
        }

        CategoryOutput {
            category,
            confidence: reply.confidence.clamp(0.0, 1.0),
            reasoning: reply.reasoning.filter(|r| !r.trim().is_empty()),
            alternatives,
        }
    }

    /// Matches the title and content against the keyword rules.
    pub fn fallback(&self, input: &ContentInput) -> CategoryOutput {
        match Category::from_keywords(&self.haystack(input)) {
            Some(category) => CategoryOutput {
                category,
                confidence: MATCHED_CONFIDENCE,
                reasoning: Some(format!("Keyword match for {category}")),
                alternatives: Vec::new(),
            },
            None => CategoryOutput {
                category: Category::General,
                confidence: UNMATCHED_CONFIDENCE,
                reasoning: Some("No category keywords found".to_owned()),
                alternatives: Vec::new(),
            },
        }
    }

    fn haystack(&self, input: &ContentInput) -> String {
        format!("{}\n{}", input.title, input.content_prefix(self.limit))
    }
}
