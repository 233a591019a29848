//! Workflow configuration.
//!
//! Everything a unit needs besides the input lives here: which model it
//! calls, with which sampling options, and how much of the content it sees.
//! The configuration is injected into [`Workflow::new`](crate::Workflow::new),
//! so tests can point every unit at a stub model.

#[cfg(feature = "config")]
use clap::Args;
use folio_gateway::GenerationOptions;
use serde::{Deserialize, Serialize};

/// Default quality threshold of the validator gate.
pub const DEFAULT_QUALITY_THRESHOLD: u8 = 60;

/// Model identifier per unit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "config", derive(Args))]
#[serde(rename_all = "camelCase")]
pub struct ModelTable {
    /// Model used by the summary unit.
    #[cfg_attr(
        feature = "config",
        arg(long = "summary-model", env = "FOLIO_SUMMARY_MODEL", default_value = SUMMARY_MODEL)
    )]
    pub summary: String,

    /// Model used by the SEO unit.
    #[cfg_attr(
        feature = "config",
        arg(long = "seo-model", env = "FOLIO_SEO_MODEL", default_value = LIGHT_MODEL)
    )]
    pub seo: String,

    /// Model used by the category unit.
    #[cfg_attr(
        feature = "config",
        arg(long = "category-model", env = "FOLIO_CATEGORY_MODEL", default_value = LIGHT_MODEL)
    )]
    pub category: String,

    /// Model used by the tags unit.
    #[cfg_attr(
        feature = "config",
        arg(long = "tags-model", env = "FOLIO_TAGS_MODEL", default_value = LIGHT_MODEL)
    )]
    pub tags: String,

    /// Model used by the schema unit.
    #[cfg_attr(
        feature = "config",
        arg(long = "schema-model", env = "FOLIO_SCHEMA_MODEL", default_value = SUMMARY_MODEL)
    )]
    pub schema: String,

    /// Model used by the image prompt unit.
    #[cfg_attr(
        feature = "config",
        arg(long = "image-prompt-model", env = "FOLIO_IMAGE_PROMPT_MODEL", default_value = SUMMARY_MODEL)
    )]
    pub image_prompt: String,

    /// Model used by the validator unit.
    #[cfg_attr(
        feature = "config",
        arg(long = "validator-model", env = "FOLIO_VALIDATOR_MODEL", default_value = SUMMARY_MODEL)
    )]
    pub validator: String,

    /// First embedding model.
    #[cfg_attr(
        feature = "config",
        arg(long = "embedding-model", env = "FOLIO_EMBEDDING_MODEL", default_value = EMBEDDING_MODEL)
    )]
    pub embedding: String,

    /// Embedding model tried once when the first one fails.
    #[cfg_attr(
        feature = "config",
        arg(
            long = "embedding-fallback-model",
            env = "FOLIO_EMBEDDING_FALLBACK_MODEL",
            default_value = EMBEDDING_FALLBACK_MODEL
        )
    )]
    pub embedding_fallback: String,
}

const SUMMARY_MODEL: &str = "anthropic/claude-3.5-sonnet";
const LIGHT_MODEL: &str = "openai/gpt-4o-mini";
const EMBEDDING_MODEL: &str = "openai/text-embedding-3-small";
const EMBEDDING_FALLBACK_MODEL: &str = "openai/text-embedding-3-large";

impl Default for ModelTable {
    fn default() -> Self {
        Self {
            summary: SUMMARY_MODEL.to_owned(),
            seo: LIGHT_MODEL.to_owned(),
            category: LIGHT_MODEL.to_owned(),
            tags: LIGHT_MODEL.to_owned(),
            schema: SUMMARY_MODEL.to_owned(),
            image_prompt: SUMMARY_MODEL.to_owned(),
            validator: SUMMARY_MODEL.to_owned(),
            embedding: EMBEDDING_MODEL.to_owned(),
            embedding_fallback: EMBEDDING_FALLBACK_MODEL.to_owned(),
        }
    }
}

impl ModelTable {
    /// Names every model `{prefix}/{unit}`.
    ///
    /// Gives each unit a distinct identifier, which lets a stub gateway
    /// script replies per unit.
    pub fn with_prefix(prefix: &str) -> Self {
        let model = |unit: &str| format!("{prefix}/{unit}");
        Self {
            summary: model("summary"),
            seo: model("seo"),
            category: model("category"),
            tags: model("tags"),
            schema: model("schema"),
            image_prompt: model("image_prompt"),
            validator: model("validator"),
            embedding: model("embedding"),
            embedding_fallback: model("embedding_fallback"),
        }
    }
}

/// Sampling options per chat unit.
///
/// Low temperatures for classification and validation, high ones for the
/// creative units.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UnitOptions {
    pub summary: GenerationOptions,
    pub seo: GenerationOptions,
    pub category: GenerationOptions,
    pub tags: GenerationOptions,
    pub schema: GenerationOptions,
    pub image_prompt: GenerationOptions,
    pub validator: GenerationOptions,
}

impl Default for UnitOptions {
    fn default() -> Self {
        Self {
            summary: GenerationOptions::new(0.7, 2000),
            seo: GenerationOptions::new(0.5, 500),
            category: GenerationOptions::new(0.3, 300),
            tags: GenerationOptions::new(0.5, 300),
            schema: GenerationOptions::new(0.3, 1500),
            image_prompt: GenerationOptions::new(0.8, 500),
            validator: GenerationOptions::new(0.3, 1500),
        }
    }
}

/// Number of content characters each unit sends to its model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentLimits {
    /// The summary needs the most context; it condenses the whole document.
    pub summary: usize,
    /// Title and description only depend on the opening of the document.
    pub seo: usize,
    /// Classification is decided by the opening of the document.
    pub category: usize,
    /// Tags are drawn from the opening of the document.
    pub tags: usize,
    /// Room for the article headline and description in the JSON-LD.
    pub schema: usize,
    /// Only the theme of the document matters for the illustration.
    pub image_prompt: usize,
    /// Embedding models accept roughly 8k tokens, about 32k characters.
    pub embeddings: usize,
}

impl Default for ContentLimits {
    fn default() -> Self {
        Self {
            summary: 8000,
            seo: 4000,
            category: 4000,
            tags: 4000,
            schema: 5000,
            image_prompt: 4000,
            embeddings: 32000,
        }
    }
}

/// Fixed publisher and author identity written into the JSON-LD graph.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "config", derive(Args))]
#[serde(rename_all = "camelCase")]
pub struct Publisher {
    /// Base URL of the site the content is published on.
    #[cfg_attr(
        feature = "config",
        arg(long = "site-url", env = "FOLIO_SITE_URL", default_value = "https://folio.dev")
    )]
    pub site_url: String,

    /// Organization name.
    #[cfg_attr(
        feature = "config",
        arg(long = "organization-name", env = "FOLIO_ORGANIZATION", default_value = "Folio")
    )]
    pub organization: String,

    /// Author name.
    #[cfg_attr(
        feature = "config",
        arg(long = "author-name", env = "FOLIO_AUTHOR", default_value = "Folio Editorial")
    )]
    pub author: String,
}

impl Default for Publisher {
    fn default() -> Self {
        Self {
            site_url: "https://folio.dev".to_owned(),
            organization: "Folio".to_owned(),
            author: "Folio Editorial".to_owned(),
        }
    }
}

impl Publisher {
    /// Returns the site URL without a trailing slash.
    pub fn base_url(&self) -> &str {
        self.site_url.trim_end_matches('/')
    }
}

/// Complete workflow configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowConfig {
    pub models: ModelTable,
    pub options: UnitOptions,
    pub limits: ContentLimits,
    pub publisher: Publisher,
    /// Minimum validator score for a valid result.
    pub quality_threshold: u8,
}

impl Default for WorkflowConfig {
    fn default() -> Self {
        Self {
            models: ModelTable::default(),
            options: UnitOptions::default(),
            limits: ContentLimits::default(),
            publisher: Publisher::default(),
            quality_threshold: DEFAULT_QUALITY_THRESHOLD,
        }
    }
}

impl WorkflowConfig {
    /// Creates the default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the model table.
    #[must_use]
    pub fn with_models(mut self, models: ModelTable) -> Self {
        self.models = models;
        self
    }

    /// Sets the sampling options.
    #[must_use]
    pub fn with_options(mut self, options: UnitOptions) -> Self {
        self.options = options;
        self
    }

    /// Sets the content limits.
    #[must_use]
    pub fn with_limits(mut self, limits: ContentLimits) -> Self {
        self.limits = limits;
        self
    }

    /// Sets the publisher identity.
    #[must_use]
    pub fn with_publisher(mut self, publisher: Publisher) -> Self {
        self.publisher = publisher;
        self
    }

    /// Sets the quality threshold, capped at 100.
    #[must_use]
    pub fn with_quality_threshold(mut self, threshold: u8) -> Self {
        self.quality_threshold = threshold.min(100);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_models() {
        let models = ModelTable::default();
        assert_eq!(models.summary, "anthropic/claude-3.5-sonnet");
        assert_eq!(models.category, "openai/gpt-4o-mini");
        assert_eq!(models.embedding, "openai/text-embedding-3-small");
        assert_eq!(models.embedding_fallback, "openai/text-embedding-3-large");
    }

    #[test]
    fn test_prefixed_models_are_distinct() {
        let models = ModelTable::with_prefix("stub");
        assert_eq!(models.seo, "stub/seo");
        assert_eq!(models.image_prompt, "stub/image_prompt");
        assert_ne!(models.embedding, models.embedding_fallback);
    }

    #[test]
    fn test_temperature_spread() {
        let options = UnitOptions::default();
        assert!(options.category.temperature < options.summary.temperature);
        assert!(options.validator.temperature < options.image_prompt.temperature);
        assert_eq!(options.summary.max_tokens, 2000);
    }

    #[test]
    fn test_threshold_capped() {
        let config = WorkflowConfig::new().with_quality_threshold(150);
        assert_eq!(config.quality_threshold, 100);
        assert_eq!(WorkflowConfig::default().quality_threshold, 60);
    }

    #[test]
    fn test_publisher_base_url() {
        let publisher = Publisher {
            site_url: "https://example.com/".into(),
            ..Publisher::default()
        };
        assert_eq!(publisher.base_url(), "https://example.com");
    }
}
