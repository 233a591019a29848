//! Three-phase workflow coordinator.
//!
//! ```text
//! Phase 1 (concurrent)  summary, seo, category, tags
//!            |
//! Phase 2 (concurrent)  schema, image prompt, embeddings   <- category, tags
//!            |
//! Phase 3 (alone)       validator                          <- all seven outputs
//! ```
//!
//! Each unit runs as its own task. A task that dies (a panic past the unit's
//! own fallback) is replaced by a workflow default that shares no code with
//! the unit; a failed embeddings unit
//! becomes an empty vector with model `none`. Only a dead validator task
//! fails the run.

mod defaults;
mod result;

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Instant;

use folio_core::ContentInput;
use folio_gateway::GatewayService;
use jiff::Timestamp;
pub use result::WorkflowResult;
use tokio::task::JoinError;
use tracing::Instrument;
use uuid::Uuid;

use crate::agent::{Agents, EmbeddingsOutput, UnitOutputs};
use crate::{Error, Generated, Result, Unit, WorkflowConfig};

/// Tracing target for workflow coordination.
pub const TRACING_TARGET: &str = "folio_agents::workflow";

/// Runs the eight units over one document.
///
/// Cheap to clone; independent runs share nothing but the gateway.
#[derive(Debug, Clone)]
pub struct Workflow {
    agents: Arc<Agents>,
    config: Arc<WorkflowConfig>,
}

impl Workflow {
    /// Creates a workflow over a gateway.
    pub fn new(gateway: GatewayService, config: WorkflowConfig) -> Self {
        let agents = Agents::new(gateway, &config);
        Self {
            agents: Arc::new(agents),
            config: Arc::new(config),
        }
    }

    /// Returns the configuration.
    pub fn config(&self) -> &WorkflowConfig {
        &self.config
    }

    /// Returns the units.
    pub fn agents(&self) -> &Agents {
        &self.agents
    }

    /// Processes one document.
    ///
    /// Always yields a complete result unless the validator task itself
    /// dies, which surfaces as [`ErrorKind::InternalError`](crate::ErrorKind::InternalError).
    pub async fn run(&self, input: ContentInput) -> Result<WorkflowResult> {
        let run_id = Uuid::now_v7();
        let span = tracing::info_span!(target: TRACING_TARGET, "workflow", %run_id);
        self.run_phases(run_id, Arc::new(input)).instrument(span).await
    }

    async fn run_phases(&self, run_id: Uuid, input: Arc<ContentInput>) -> Result<WorkflowResult> {
        let started = Instant::now();

        tracing::info!(
            target: TRACING_TARGET,
            title = %input.title,
            content_chars = input.content_chars(),
            "Workflow started"
        );

        // Phase 1
        let summary = self.spawn(&input, |agents, input| async move {
            agents.summary.generate(&input).await
        });
        let seo = self.spawn(&input, |agents, input| async move {
            agents.seo.generate(&input).await
        });
        let category = self.spawn(&input, |agents, input| async move {
            agents.category.generate(&input).await
        });
        let tags = self.spawn(&input, |agents, input| async move {
            agents.tags.generate(&input).await
        });

        let (summary, seo, category, tags) = tokio::join!(summary, seo, category, tags);

        let summary = settle(Unit::Summary, summary, || defaults::summary(&input));
        let seo = settle(Unit::Seo, seo, || defaults::seo(&input));
        let category = settle(Unit::Category, category, defaults::category);
        let tags = settle(Unit::Tags, tags, defaults::tags);

        tracing::debug!(
            target: TRACING_TARGET,
            category = %category.value.category,
            tags = ?tags.value.tags,
            elapsed_ms = started.elapsed().as_millis(),
            "Phase 1 settled"
        );

        // Phase 2
        let phase_one = Arc::new((category.value.clone(), tags.value.clone()));

        let schema = {
            let phase_one = phase_one.clone();
            self.spawn(&input, |agents, input| async move {
                let (category, tags) = &*phase_one;
                agents.schema.generate(&input, category, tags).await
            })
        };
        let image_prompt = {
            let phase_one = phase_one.clone();
            self.spawn(&input, |agents, input| async move {
                let (category, tags) = &*phase_one;
                agents.image_prompt.generate(&input, category, tags).await
            })
        };
        let embeddings = self.spawn(&input, |agents, input| async move {
            agents.embeddings.generate(&input).await
        });

        let (schema, image_prompt, embeddings) = tokio::join!(schema, image_prompt, embeddings);

        let schema = settle(Unit::Schema, schema, || defaults::schema(&input));
        let image_prompt = settle(Unit::ImagePrompt, image_prompt, defaults::image_prompt);
        let embeddings = settle_embeddings(embeddings);

        tracing::debug!(
            target: TRACING_TARGET,
            schema_types = ?schema.value.schema_types,
            dimensions = embeddings.value.dimensions,
            elapsed_ms = started.elapsed().as_millis(),
            "Phase 2 settled"
        );

        // Phase 3
        let mut provenance = BTreeMap::from([
            (Unit::Summary, summary.provenance),
            (Unit::Seo, seo.provenance),
            (Unit::Category, category.provenance),
            (Unit::Tags, tags.provenance),
            (Unit::Schema, schema.provenance),
            (Unit::ImagePrompt, image_prompt.provenance),
            (Unit::Embeddings, embeddings.provenance),
        ]);

        let outputs = UnitOutputs {
            summary: summary.value,
            seo: seo.value,
            category: category.value,
            tags: tags.value,
            schema: schema.value,
            image_prompt: image_prompt.value,
            embeddings: embeddings.value,
        };

        let agents = self.agents.clone();
        let (outputs, validation) = tokio::spawn(
            async move {
                let validation = agents.validator.generate(&outputs).await;
                (outputs, validation)
            }
            .in_current_span(),
        )
        .await
        .map_err(|error| {
            tracing::error!(
                target: TRACING_TARGET,
                unit = %Unit::Validator,
                error = %error,
                "Validator task failed"
            );
            Error::internal_error()
                .with_message("validator task failed")
                .with_source(error)
        })?;
        provenance.insert(Unit::Validator, validation.provenance);

        let total_processing_time = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);
        let result = WorkflowResult {
            run_id,
            summary: outputs.summary,
            seo: outputs.seo,
            category: outputs.category,
            tags: outputs.tags,
            schema: outputs.schema,
            image_prompt: outputs.image_prompt,
            embeddings: outputs.embeddings,
            validation: validation.value,
            processed_at: Timestamp::now(),
            total_processing_time,
            provenance,
        };

        tracing::info!(
            target: TRACING_TARGET,
            quality_score = result.validation.quality_score,
            is_valid = result.validation.is_valid,
            degraded = ?result.degraded_units(),
            elapsed_ms = total_processing_time,
            "Workflow finished"
        );

        Ok(result)
    }

    /// Spawns one unit as a task inside the current span.
    fn spawn<T, F, Fut>(&self, input: &Arc<ContentInput>, unit: F) -> tokio::task::JoinHandle<T>
    where
        T: Send + 'static,
        F: FnOnce(Arc<Agents>, Arc<ContentInput>) -> Fut,
        Fut: Future<Output = T> + Send + 'static,
    {
        let future = unit(self.agents.clone(), input.clone());
        tokio::spawn(future.in_current_span())
    }
}

/// Unwraps a unit task, substituting `default` when the task died.
fn settle<T>(
    unit: Unit,
    joined: std::result::Result<Generated<T>, JoinError>,
    default: impl FnOnce() -> T,
) -> Generated<T> {
    match joined {
        Ok(generated) => generated,
        Err(error) => {
            tracing::error!(
                target: TRACING_TARGET,
                unit = %unit,
                error = %error,
                "Unit task failed, using workflow default"
            );
            Generated::default_value(default())
        }
    }
}

/// Absorbs an embeddings failure as an empty vector with model `none`.
fn settle_embeddings(
    joined: std::result::Result<Result<Generated<EmbeddingsOutput>>, JoinError>,
) -> Generated<EmbeddingsOutput> {
    let error = match joined {
        Ok(Ok(generated)) => return generated,
        Ok(Err(error)) => error.to_string(),
        Err(error) => error.to_string(),
    };

    tracing::error!(
        target: TRACING_TARGET,
        unit = %Unit::Embeddings,
        error = %error,
        "Embeddings unavailable, storing an empty vector"
    );
    Generated::default_value(EmbeddingsOutput::empty())
}
