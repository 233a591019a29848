//! The eight generation units.
//!
//! Each unit builds a prompt, sends one request through the gateway with its
//! configured model and options, decodes and validates the reply, and falls
//! back to a deterministic heuristic when any of that fails:
//!
//! - [`SummaryAgent`] - four summaries of increasing length
//! - [`SeoAgent`] - meta title, description and keywords
//! - [`CategoryAgent`] - one of the six [`Category`](crate::Category) labels
//! - [`TagsAgent`] - normalized tags and related topics
//! - [`SchemaAgent`] - schema.org JSON-LD graph
//! - [`ImagePromptAgent`] - cover image prompt
//! - [`EmbeddingsAgent`] - vector embedding (the only unit that can fail)
//! - [`ValidatorAgent`] - quality score and gate
//!
//! Use [`Agents`] to create all units from one gateway and configuration.

mod category;
mod embeddings;
mod fallback;
mod image_prompt;
mod schema;
mod seo;
mod summary;
mod tags;
mod validator;

pub use category::{CategoryAgent, CategoryOutput};
pub use embeddings::{EmbeddingsAgent, EmbeddingsOutput};
pub use fallback::with_fallback;
use folio_gateway::{ChatRequest, GatewayService, GenerationOptions};
pub use image_prompt::{ImagePromptAgent, ImagePromptOutput};
pub use schema::{SchemaAgent, SchemaOutput};
pub use seo::{SeoAgent, SeoOutput};
pub use summary::{SummaryAgent, SummaryOutput};
pub use tags::{TagsAgent, TagsOutput, normalize_tag};
pub use validator::{
    QualityGate, Severity, UnitOutputs, ValidationIssue, ValidationOutput, ValidatorAgent, assess,
};

use crate::{Result, WorkflowConfig};

/// Tracing target for unit operations.
pub const TRACING_TARGET: &str = "folio_agents::agent";

/// Collection of all generation units.
///
/// # Example
///
/// ```ignore
/// let agents = Agents::new(gateway, &WorkflowConfig::default());
/// let summary = agents.summary.generate(&input).await;
/// ```
#[derive(Debug, Clone)]
pub struct Agents {
    pub summary: SummaryAgent,
    pub seo: SeoAgent,
    pub category: CategoryAgent,
    pub tags: TagsAgent,
    pub schema: SchemaAgent,
    pub image_prompt: ImagePromptAgent,
    pub embeddings: EmbeddingsAgent,
    pub validator: ValidatorAgent,
}

impl Agents {
    /// Creates all units from a gateway and configuration.
    pub fn new(gateway: GatewayService, config: &WorkflowConfig) -> Self {
        Self {
            summary: SummaryAgent::new(gateway.clone(), config),
            seo: SeoAgent::new(gateway.clone(), config),
            category: CategoryAgent::new(gateway.clone(), config),
            tags: TagsAgent::new(gateway.clone(), config),
            schema: SchemaAgent::new(gateway.clone(), config),
            image_prompt: ImagePromptAgent::new(gateway.clone(), config),
            embeddings: EmbeddingsAgent::new(gateway.clone(), config),
            validator: ValidatorAgent::new(gateway, config),
        }
    }
}

/// Builds a chat request for one unit.
fn chat_request(
    model: &str,
    options: GenerationOptions,
    system_prompt: &str,
    user_prompt: String,
) -> Result<ChatRequest> {
    let request = ChatRequest::builder()
        .with_model(model)
        .with_system_prompt(system_prompt)
        .with_user_prompt(user_prompt)
        .with_options(options)
        .build()?;
    Ok(request)
}
