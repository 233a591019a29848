//! Where a unit's value came from.

use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumIter, IntoStaticStr};

/// One of the eight generation units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[derive(Serialize, Deserialize)]
#[derive(AsRefStr, Display, EnumIter, IntoStaticStr)]
#[serde(rename_all = "camelCase")]
#[strum(serialize_all = "snake_case")]
pub enum Unit {
    Summary,
    Seo,
    Category,
    Tags,
    Schema,
    ImagePrompt,
    Embeddings,
    Validator,
}

/// Origin of a unit's value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[derive(AsRefStr, Display)]
#[serde(rename_all = "camelCase")]
#[strum(serialize_all = "snake_case")]
pub enum Provenance {
    /// Decoded and validated from a model reply.
    Model,
    /// Computed by the unit's deterministic fallback.
    Fallback,
    /// Substituted by the workflow after the unit itself failed.
    Default,
}

impl Provenance {
    /// Returns true when the value did not come from a model.
    pub fn is_degraded(self) -> bool {
        !matches!(self, Self::Model)
    }
}

/// A unit's value tagged with its provenance.
#[derive(Debug, Clone, PartialEq)]
pub struct Generated<T> {
    pub value: T,
    pub provenance: Provenance,
}

impl<T> Generated<T> {
    /// Wraps a model-derived value.
    pub fn model(value: T) -> Self {
        Self {
            value,
            provenance: Provenance::Model,
        }
    }

    /// Wraps a fallback value.
    pub fn fallback(value: T) -> Self {
        Self {
            value,
            provenance: Provenance::Fallback,
        }
    }

    /// Wraps a workflow-level default.
    pub fn default_value(value: T) -> Self {
        Self {
            value,
            provenance: Provenance::Default,
        }
    }

    /// Returns the value, dropping the provenance.
    pub fn into_inner(self) -> T {
        self.value
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unit_names() {
        assert_eq!(Unit::ImagePrompt.as_ref(), "image_prompt");
        assert_eq!(
            serde_json::to_string(&Unit::ImagePrompt).unwrap(),
            "\"imagePrompt\""
        );
    }

    #[test]
    fn test_degraded() {
        assert!(!Provenance::Model.is_degraded());
        assert!(Provenance::Fallback.is_degraded());
        assert!(Generated::default_value(()).provenance.is_degraded());
    }
}
