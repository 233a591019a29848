//! Aggregate workflow result.

use std::collections::BTreeMap;

use jiff::Timestamp;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::agent::{
    CategoryOutput, EmbeddingsOutput, ImagePromptOutput, SchemaOutput, SeoOutput, SummaryOutput,
    TagsOutput, ValidationOutput,
};
use crate::{Category, Provenance, Unit};

/// Output of one workflow run.
///
/// Every unit field is always populated, either from a model, from the
/// unit's fallback, or from a workflow default. `provenance` says which.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowResult {
    pub run_id: Uuid,
    pub summary: SummaryOutput,
    pub seo: SeoOutput,
    pub category: CategoryOutput,
    pub tags: TagsOutput,
    pub schema: SchemaOutput,
    pub image_prompt: ImagePromptOutput,
    pub embeddings: EmbeddingsOutput,
    pub validation: ValidationOutput,
    /// Completion time, serialized as ISO-8601.
    pub processed_at: Timestamp,
    /// Wall-clock milliseconds from entry to the end of validation.
    pub total_processing_time: u64,
    pub provenance: BTreeMap<Unit, Provenance>,
}

impl WorkflowResult {
    /// Returns the units that ended on a fallback or default value.
    pub fn degraded_units(&self) -> Vec<Unit> {
        self.provenance
            .iter()
            .filter(|(_, provenance)| provenance.is_degraded())
            .map(|(unit, _)| *unit)
            .collect()
    }

    /// Returns the quality gate verdict.
    pub fn is_valid(&self) -> bool {
        self.validation.is_valid
    }

    /// Returns the validator score.
    pub fn quality_score(&self) -> u8 {
        self.validation.quality_score
    }

    /// Returns the assigned category.
    pub fn category(&self) -> Category {
        self.category.category
    }
}
