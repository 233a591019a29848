//! Image prompt unit: cover illustration prompt.

use folio_core::{ContentInput, text};
use folio_gateway::{GatewayService, GenerationOptions};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use validator::Validate;

use super::{CategoryOutput, TRACING_TARGET, TagsOutput, chat_request, with_fallback};
use crate::{Category, Generated, Result, Unit, WorkflowConfig};

const PREAMBLE: &str = "\
You are an art director briefing an image model for article cover illustrations.
Describe composition, subject, lighting and mood. Never ask for text or logos in the image.";

const PROMPT: &str = "\
Write a cover illustration brief for the following document:
- 'prompt': 100-200 words
- 'style': a short style label
- 'colors': 3-5 hex colors

Category: {category}. Tags: {tags}.";

const MIN_COLORS: usize = 3;
const MAX_COLORS: usize = 5;

const FALLBACK_STYLE: &str = "minimalist digital illustration";

/// Cover image brief.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImagePromptOutput {
    pub prompt: String,
    pub style: String,
    /// 3-5 color values.
    pub colors: Vec<String>,
}

#[derive(Debug, Deserialize, Validate, JsonSchema)]
struct ImagePromptReply {
    #[validate(length(min = 1))]
    prompt: String,
    #[serde(default)]
    style: String,
    #[serde(default)]
    colors: Vec<String>,
}

/// Visual metaphor and palette per category.
fn motif(category: Category) -> (&'static str, [&'static str; 3]) {
    match category {
        Category::ClaudeSkills => (
            "a toolbox of glowing modular blocks being assembled by a friendly abstract assistant",
            ["#D97757", "#F5E6D3", "#2B2A27"],
        ),
        Category::McpServers => (
            "interconnected server nodes exchanging streams of light through a central hub",
            ["#1E3A5F", "#4FC3F7", "#E0F7FA"],
        ),
        Category::AiWorkflows => (
            "a flowing assembly line of abstract shapes passing through connected processing stations",
            ["#6A1B9A", "#26A69A", "#F3E5F5"],
        ),
        Category::PromptEngineering => (
            "a pen drawing precise lines of light that turn into structured speech bubbles",
            ["#F9A825", "#37474F", "#FFFDE7"],
        ),
        Category::DevelopmentTools => (
            "a tidy workbench of stylized code editors, terminals and precision instruments",
            ["#263238", "#00E676", "#ECEFF1"],
        ),
        Category::General => (
            "an open book whose pages unfold into a landscape of abstract geometric shapes",
            ["#3949AB", "#FF7043", "#FAFAFA"],
        ),
    }
}

/// Image prompt unit.
#[derive(Debug, Clone)]
pub struct ImagePromptAgent {
    gateway: GatewayService,
    model: String,
    options: GenerationOptions,
    limit: usize,
}

impl ImagePromptAgent {
    /// Creates the unit from the workflow configuration.
    pub fn new(gateway: GatewayService, config: &WorkflowConfig) -> Self {
        Self {
            gateway,
            model: config.models.image_prompt.clone(),
            options: config.options.image_prompt,
            limit: config.limits.image_prompt,
        }
    }

    /// Writes the brief, falling back to the category's canned metaphor.
    #[tracing::instrument(skip_all, target = TRACING_TARGET, name = "image_prompt")]
    pub async fn generate(
        &self,
        input: &ContentInput,
        category: &CategoryOutput,
        tags: &TagsOutput,
    ) -> Generated<ImagePromptOutput> {
        with_fallback(
            Unit::ImagePrompt,
            self.request(input, category, tags),
            || self.fallback(input, category, tags),
        )
        .await
    }

    async fn request(
        &self,
        input: &ContentInput,
        category: &CategoryOutput,
        tags: &TagsOutput,
    ) -> Result<ImagePromptOutput> {
        let instructions = PROMPT
            .replace("{category}", category.category.label())
            .replace("{tags}", &tags.tags.join(", "));
        let prompt = format!(
            "{instructions}\n\nTitle: {}\n\nDocument:\n{}",
            input.title,
            input.content_prefix(self.limit)
        );

        let request = chat_request(&self.model, self.options, PREAMBLE, prompt)?;
        let reply: ImagePromptReply = self.gateway.chat_json(request).await?;

        let (_, palette) = motif(category.category);
        let mut colors: Vec<String> = Vec::with_capacity(MAX_COLORS);
        for color in reply.colors.iter().map(|c| c.trim()) {
            if colors.len() < MAX_COLORS && !color.is_empty() && !colors.iter().any(|c| c == color) {
                colors.push(color.to_owned());
            }
        }
        for color in palette {
            if colors.len() >= MIN_COLORS {
                break;
            }
            if !colors.iter().any(|c| c == color) {
                colors.push(color.to_owned());
            }
        }

        let style = match reply.style.trim() {
            "" => FALLBACK_STYLE.to_owned(),
            style => style.to_owned(),
        };

        Ok(ImagePromptOutput {
            prompt: reply.prompt.trim().to_owned(),
            style,
            colors,
        })
    }

    /// Combines the category's visual metaphor with the title and tags.
    pub fn fallback(
        &self,
        input: &ContentInput,
        category: &CategoryOutput,
        tags: &TagsOutput,
    ) -> ImagePromptOutput {
        let (metaphor, palette) = motif(category.category);
        let title = text::truncate_with_ellipsis(input.title.trim(), 80);

        let mut prompt = format!(
            "A {FALLBACK_STYLE} of {metaphor}, representing \"{title}\". \
             Clean composition, soft lighting, generous negative space, no text or logos."
        );
        if !tags.tags.is_empty() {
            prompt.push_str(&format!(" Subtle visual cues for {}.", tags.tags.join(", ")));
        }

        ImagePromptOutput {
            prompt,
            style: FALLBACK_STYLE.to_owned(),
            colors: palette.iter().map(|c| (*c).to_owned()).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use folio_test::MockGateway;
    use serde_json::json;

    use super::*;
    use crate::{ModelTable, Provenance};

    fn agent(mock: MockGateway) -> ImagePromptAgent {
        let config = WorkflowConfig::new().with_models(ModelTable::with_prefix("test"));
        ImagePromptAgent::new(mock.into_service(), &config)
    }

    fn category(category: Category) -> CategoryOutput {
        CategoryOutput {
            category,
            ..CategoryOutput::default()
        }
    }

    #[test]
    fn test_every_category_has_a_palette() {
        for category in Category::all() {
            let (metaphor, palette) = motif(category);
            assert!(!metaphor.is_empty());
            assert_eq!(palette.len(), MIN_COLORS);
        }
    }

    #[tokio::test]
    async fn test_model_colors_are_padded_and_capped() {
        let reply = json!({"prompt": "A lighthouse.", "style": "", "colors": ["#000000"]});
        let image = agent(MockGateway::new().with_reply("test/image_prompt", reply.to_string()));
        let generated = image
            .generate(&ContentInput::new("T", "b"), &category(Category::General), &TagsOutput::default())
            .await;

        assert_eq!(generated.provenance, Provenance::Model);
        assert_eq!(generated.value.colors, vec!["#000000", "#3949AB", "#FF7043"]);
        assert_eq!(generated.value.style, FALLBACK_STYLE);

        let reply = json!({
            "prompt": "A lighthouse.",
            "style": "watercolor",
            "colors": ["#1", "#2", "#3", "#4", "#5", "#6"]
        });
        let image = agent(MockGateway::new().with_reply("test/image_prompt", reply.to_string()));
        let generated = image
            .generate(&ContentInput::new("T", "b"), &category(Category::General), &TagsOutput::default())
            .await;
        assert_eq!(generated.value.colors, vec!["#1", "#2", "#3", "#4", "#5"]);
        assert_eq!(generated.value.style, "watercolor");
    }

    #[tokio::test]
    async fn test_fallback_uses_category_metaphor() {
        let tags = TagsOutput {
            tags: vec!["mcp".into(), "rust".into()],
            related_topics: Vec::new(),
        };
        let generated = agent(MockGateway::failing())
            .generate(&ContentInput::new("Ship it", "b"), &category(Category::McpServers), &tags)
            .await;

        assert_eq!(generated.provenance, Provenance::Fallback);
        let output = generated.value;
        assert!(output.prompt.contains("server nodes"));
        assert!(output.prompt.contains("\"Ship it\""));
        assert!(output.prompt.contains("mcp, rust"));
        assert!(text::char_len(&output.prompt) >= 50);
        assert_eq!(output.colors.len(), 3);
    }
}
