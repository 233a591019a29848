//! Validator unit: quality score, issues and the quality gate.
//!
//! The validator sees the outputs of the other seven units, never the raw
//! content. Whatever the model claims, validity is always decided by
//! [`QualityGate`]: a score at or above the threshold and no error-severity
//! issue.

use folio_core::text;
use folio_gateway::{GatewayService, GenerationOptions};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::json;
use strum::{AsRefStr, Display};
use validator::Validate;

use super::seo::{META_DESCRIPTION_MAX, META_TITLE_MAX};
use super::{
    CategoryOutput, EmbeddingsOutput, ImagePromptOutput, SchemaOutput, SeoOutput, SummaryOutput,
    TRACING_TARGET, TagsOutput, chat_request, with_fallback,
};
use crate::config::DEFAULT_QUALITY_THRESHOLD;
use crate::{Error, Generated, Result, Unit, WorkflowConfig};

const PREAMBLE: &str = "\
You are the final quality reviewer for generated article metadata.
Score strictly and consistently. Report concrete problems, not general advice.";

const PROMPT: &str = "\
Review the generated metadata below against four rubric categories worth 25 points each:
1. completeness: every field is present and non-trivial
2. accuracy: summaries, SEO text, category and tags agree with each other
3. quality: clear writing, respected length limits (meta title <= 60, description <= 160)
4. consistency: schema, image prompt and tags describe the same document

Reply with 'qualityScore' (0-100), a short 'report', a list of 'issues' \
(each with 'field', 'severity' of error|warning|info, and 'message') and a list of 'suggestions'.";

/// Issue severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[derive(Serialize, Deserialize, JsonSchema, AsRefStr, Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Severity {
    /// Fails the quality gate on its own.
    Error,
    Warning,
    Info,
}

/// One problem found by the validator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct ValidationIssue {
    /// Dotted path of the offending field, e.g. `seo.metaTitle`.
    pub field: String,
    pub severity: Severity,
    pub message: String,
}

impl ValidationIssue {
    /// Creates an issue.
    pub fn new(field: impl Into<String>, severity: Severity, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            severity,
            message: message.into(),
        }
    }
}

/// Validator verdict.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationOutput {
    pub is_valid: bool,
    /// In `[0, 100]`.
    pub quality_score: u8,
    pub report: String,
    pub issues: Vec<ValidationIssue>,
    pub suggestions: Vec<String>,
}

impl ValidationOutput {
    /// Returns true when any issue has error severity.
    pub fn has_errors(&self) -> bool {
        self.issues.iter().any(|i| i.severity == Severity::Error)
    }
}

/// The pass/fail policy: `score >= threshold` and no error-severity issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QualityGate {
    threshold: u8,
}

impl Default for QualityGate {
    fn default() -> Self {
        Self::new(DEFAULT_QUALITY_THRESHOLD)
    }
}

impl QualityGate {
    /// Creates a gate; thresholds above 100 are capped.
    pub const fn new(threshold: u8) -> Self {
        Self {
            threshold: if threshold > 100 { 100 } else { threshold },
        }
    }

    /// Returns the threshold.
    pub const fn threshold(&self) -> u8 {
        self.threshold
    }

    /// Rounds and clamps a raw score into `[0, 100]`; NaN becomes 0.
    pub fn clamp_score(score: f64) -> u8 {
        if score.is_nan() {
            return 0;
        }
        score.round().clamp(0.0, 100.0) as u8
    }

    /// Returns true when the score and issues pass the gate.
    pub fn passes(&self, score: u8, issues: &[ValidationIssue]) -> bool {
        score >= self.threshold && !issues.iter().any(|i| i.severity == Severity::Error)
    }

    /// Clamps the score and recomputes `is_valid`.
    pub fn apply(&self, mut output: ValidationOutput) -> ValidationOutput {
        output.quality_score = output.quality_score.min(100);
        output.is_valid = self.passes(output.quality_score, &output.issues);
        output
    }
}

/// Outputs of the first seven units, as seen by the validator.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UnitOutputs {
    pub summary: SummaryOutput,
    pub seo: SeoOutput,
    pub category: CategoryOutput,
    pub tags: TagsOutput,
    pub schema: SchemaOutput,
    pub image_prompt: ImagePromptOutput,
    pub embeddings: EmbeddingsOutput,
}

impl UnitOutputs {
    /// Renders the outputs for the review prompt; the vector is reduced to its size.
    fn to_review_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(&json!({
            "summary": self.summary,
            "seo": self.seo,
            "category": self.category,
            "tags": self.tags,
            "schema": {
                "schemaTypes": self.schema.schema_types,
                "jsonLd": self.schema.json_ld,
            },
            "imagePrompt": self.image_prompt,
            "embeddings": {
                "model": self.embeddings.model,
                "dimensions": self.embeddings.dimensions,
            },
        }))
    }
}

#[derive(Debug, Deserialize, Validate, JsonSchema)]
#[serde(rename_all = "camelCase")]
struct ValidationReply {
    quality_score: f64,
    #[validate(length(min = 1))]
    report: String,
    #[serde(default)]
    issues: Vec<ValidationIssue>,
    #[serde(default)]
    suggestions: Vec<String>,
}

/// One deterministic deduction.
struct Deduction {
    field: &'static str,
    points: u8,
    severity: Severity,
    message: String,
    suggestion: &'static str,
}

/// Scores the outputs without a model.
///
/// Starts at 100 and deducts a fixed amount per failed check:
///
/// | Check                                  | Points | Severity |
/// |----------------------------------------|-------:|----------|
/// | short summary missing or < 50 chars    | 15     | error    |
/// | medium summary < 100 chars             | 10     | warning  |
/// | long summary < 200 chars               | 10     | warning  |
/// | meta title missing                     | 15     | error    |
/// | meta title > 60 chars                  | 5      | warning  |
/// | meta description missing or < 50 chars | 10     | warning  |
/// | meta description > 160 chars           | 5      | warning  |
/// | no SEO keywords                        | 5      | warning  |
/// | fewer than 3 tags                      | 10     | warning  |
/// | no related topics                      | 5      | info     |
/// | embeddings empty                       | 15     | error    |
/// | schema missing required node types     | 10     | warning  |
/// | image prompt < 50 chars                | 5      | info     |
pub fn assess(outputs: &UnitOutputs, gate: QualityGate) -> ValidationOutput {
    let mut deductions = Vec::new();
    let mut deduct = |field, points, severity, message: String, suggestion| {
        deductions.push(Deduction {
            field,
            points,
            severity,
            message,
            suggestion,
        });
    };

    let short = text::char_len(outputs.summary.short.trim());
    if short < 50 {
        deduct(
            "summary.short",
            15,
            Severity::Error,
            format!("Short summary is missing or too short ({short} chars, minimum 50)"),
            "Expand the short summary to 150-200 characters.",
        );
    }
    let medium = text::char_len(outputs.summary.medium.trim());
    if medium < 100 {
        deduct(
            "summary.medium",
            10,
            Severity::Warning,
            format!("Medium summary is too short ({medium} chars, minimum 100)"),
            "Expand the medium summary to about 300 characters.",
        );
    }
    let long = text::char_len(outputs.summary.long.trim());
    if long < 200 {
        deduct(
            "summary.long",
            10,
            Severity::Warning,
            format!("Long summary is too short ({long} chars, minimum 200)"),
            "Expand the long summary to about 500 characters.",
        );
    }

    let title = text::char_len(outputs.seo.meta_title.trim());
    if title == 0 {
        deduct(
            "seo.metaTitle",
            15,
            Severity::Error,
            "Meta title is missing".to_owned(),
            "Add a descriptive meta title of up to 60 characters.",
        );
    } else if title > META_TITLE_MAX {
        deduct(
            "seo.metaTitle",
            5,
            Severity::Warning,
            format!("Meta title exceeds {META_TITLE_MAX} characters ({title})"),
            "Shorten the meta title to 60 characters.",
        );
    }

    let description = text::char_len(outputs.seo.meta_description.trim());
    if description < 50 {
        deduct(
            "seo.metaDescription",
            10,
            Severity::Warning,
            format!("Meta description is missing or too short ({description} chars, minimum 50)"),
            "Write a meta description of 120-160 characters.",
        );
    } else if description > META_DESCRIPTION_MAX {
        deduct(
            "seo.metaDescription",
            5,
            Severity::Warning,
            format!("Meta description exceeds {META_DESCRIPTION_MAX} characters ({description})"),
            "Shorten the meta description to 160 characters.",
        );
    }

    if outputs.seo.keywords.is_empty() {
        deduct(
            "seo.keywords",
            5,
            Severity::Warning,
            "No SEO keywords".to_owned(),
            "Add 5-10 search keywords.",
        );
    }

    let tags = outputs.tags.tags.len();
    if tags < 3 {
        deduct(
            "tags.tags",
            10,
            Severity::Warning,
            format!("Fewer than 3 tags ({tags})"),
            "Add tags until there are 3-5.",
        );
    }
    if outputs.tags.related_topics.is_empty() {
        deduct(
            "tags.relatedTopics",
            5,
            Severity::Info,
            "No related topics".to_owned(),
            "Add a few broader related topics.",
        );
    }

    if outputs.embeddings.is_empty() {
        deduct(
            "embeddings.embedding",
            15,
            Severity::Error,
            "Embedding vector is empty".to_owned(),
            "Re-run the embeddings step once the embedding models are reachable.",
        );
    }

    let missing = outputs.schema.missing_types();
    if !missing.is_empty() {
        deduct(
            "schema.schemaTypes",
            10,
            Severity::Warning,
            format!("Schema is missing node types: {}", missing.join(", ")),
            "Regenerate the JSON-LD with all four required nodes.",
        );
    }

    let image = text::char_len(outputs.image_prompt.prompt.trim());
    if image < 50 {
        deduct(
            "imagePrompt.prompt",
            5,
            Severity::Info,
            format!("Image prompt is too short ({image} chars, minimum 50)"),
            "Describe the cover image in more detail.",
        );
    }

    let lost: u32 = deductions.iter().map(|d| u32::from(d.points)).sum();
    let score = QualityGate::clamp_score(100.0 - f64::from(lost));

    let mut suggestions = Vec::new();
    for deduction in &deductions {
        if !suggestions.iter().any(|s| s == deduction.suggestion) {
            suggestions.push(deduction.suggestion.to_owned());
        }
    }

    let issues: Vec<ValidationIssue> = deductions
        .into_iter()
        .map(|d| ValidationIssue::new(d.field, d.severity, d.message))
        .collect();

    let report = format!(
        "Deterministic assessment: {} issue(s), {} point(s) deducted, score {score}/100.",
        issues.len(),
        lost
    );

    gate.apply(ValidationOutput {
        is_valid: false,
        quality_score: score,
        report,
        issues,
        suggestions,
    })
}

/// Validator unit.
#[derive(Debug, Clone)]
pub struct ValidatorAgent {
    gateway: GatewayService,
    model: String,
    options: GenerationOptions,
    gate: QualityGate,
}

impl ValidatorAgent {
    /// Creates the unit from the workflow configuration.
    pub fn new(gateway: GatewayService, config: &WorkflowConfig) -> Self {
        Self {
            gateway,
            model: config.models.validator.clone(),
            options: config.options.validator,
            gate: QualityGate::new(config.quality_threshold),
        }
    }

    /// Returns the gate this unit enforces.
    pub fn gate(&self) -> QualityGate {
        self.gate
    }

    /// Scores the outputs, falling back to the deterministic deductions.
    #[tracing::instrument(skip_all, target = TRACING_TARGET, name = "validator")]
    pub async fn generate(&self, outputs: &UnitOutputs) -> Generated<ValidationOutput> {
        let generated =
            with_fallback(Unit::Validator, self.request(outputs), || assess(outputs, self.gate))
                .await;

        tracing::info!(
            target: TRACING_TARGET,
            quality_score = generated.value.quality_score,
            is_valid = generated.value.is_valid,
            issues = generated.value.issues.len(),
            provenance = %generated.provenance,
            "Validation finished"
        );

        generated
    }

    async fn request(&self, outputs: &UnitOutputs) -> Result<ValidationOutput> {
        let review = outputs.to_review_json().map_err(|e| {
            Error::serialization()
                .with_message("failed to render outputs for review")
                .with_source(e)
        })?;
        let prompt = format!("{PROMPT}\n\nGenerated metadata:\n{review}");

        let request = chat_request(&self.model, self.options, PREAMBLE, prompt)?;
        let reply: ValidationReply = self.gateway.chat_json(request).await?;

        Ok(self.gate.apply(ValidationOutput {
            is_valid: false,
            quality_score: QualityGate::clamp_score(reply.quality_score),
            report: reply.report.trim().to_owned(),
            issues: reply.issues,
            suggestions: reply.suggestions,
        }))
    }
}

#[cfg(test)]
mod tests {
    use folio_test::MockGateway;

    use super::*;
    use crate::{Category, ModelTable, Provenance};

    fn agent(mock: MockGateway) -> ValidatorAgent {
        let config = WorkflowConfig::new().with_models(ModelTable::with_prefix("test"));
        ValidatorAgent::new(mock.into_service(), &config)
    }

    fn complete_outputs() -> UnitOutputs {
        UnitOutputs {
            summary: SummaryOutput {
                short: "s".repeat(160),
                medium: "m".repeat(300),
                long: "l".repeat(500),
                markdown: "# Doc".to_owned(),
            },
            seo: SeoOutput {
                meta_title: "A good title".to_owned(),
                meta_description: "d".repeat(140),
                keywords: vec!["rust".to_owned()],
                focus_keyword: None,
            },
            category: CategoryOutput {
                category: Category::DevelopmentTools,
                confidence: 0.9,
                ..CategoryOutput::default()
            },
            tags: TagsOutput {
                tags: vec!["a".into(), "b".into(), "c".into()],
                related_topics: vec!["topic".into()],
            },
            schema: SchemaOutput {
                json_ld: json!({}),
                schema_types: ["TechArticle", "BreadcrumbList", "Organization", "Person"]
                    .map(String::from)
                    .to_vec(),
            },
            image_prompt: ImagePromptOutput {
                prompt: "p".repeat(120),
                style: "flat".to_owned(),
                colors: vec!["#000".into(), "#111".into(), "#222".into()],
            },
            embeddings: EmbeddingsOutput::new(vec![0.1; 8], "test/embedding"),
        }
    }

    #[test]
    fn test_clamp_score() {
        assert_eq!(QualityGate::clamp_score(-20.0), 0);
        assert_eq!(QualityGate::clamp_score(150.0), 100);
        assert_eq!(QualityGate::clamp_score(59.6), 60);
        assert_eq!(QualityGate::clamp_score(f64::NAN), 0);
    }

    #[test]
    fn test_gate() {
        let gate = QualityGate::default();
        let error = ValidationIssue::new("x", Severity::Error, "bad");
        let warning = ValidationIssue::new("x", Severity::Warning, "meh");

        assert!(gate.passes(60, &[]));
        assert!(!gate.passes(59, &[]));
        assert!(gate.passes(95, std::slice::from_ref(&warning)));
        assert!(!gate.passes(95, &[warning, error]));
        assert_eq!(QualityGate::new(200).threshold(), 100);
    }

    #[test]
    fn test_assess_complete_outputs() {
        let output = assess(&complete_outputs(), QualityGate::default());
        assert_eq!(output.quality_score, 100);
        assert!(output.is_valid);
        assert!(output.issues.is_empty());
        assert!(output.suggestions.is_empty());
    }

    #[test]
    fn test_assess_empty_outputs() {
        let output = assess(&UnitOutputs::default(), QualityGate::default());
        // 15 + 10 + 10 + 15 + 10 + 5 + 10 + 5 + 15 + 10 + 5 = 110, clamped
        assert_eq!(output.quality_score, 0);
        assert!(!output.is_valid);
        assert!(output.has_errors());
    }

    #[test]
    fn test_assess_error_fails_despite_score() {
        let mut outputs = complete_outputs();
        outputs.embeddings = EmbeddingsOutput::empty();

        let output = assess(&outputs, QualityGate::default());
        assert_eq!(output.quality_score, 85);
        assert!(!output.is_valid);
        assert_eq!(output.issues[0].field, "embeddings.embedding");
    }

    #[test]
    fn test_assess_length_ceilings() {
        let mut outputs = complete_outputs();
        outputs.seo.meta_title = "t".repeat(61);
        outputs.seo.meta_description = "d".repeat(161);

        let output = assess(&outputs, QualityGate::default());
        assert_eq!(output.quality_score, 90);
        assert!(output.is_valid);
        assert!(output.issues.iter().all(|i| i.severity == Severity::Warning));
    }

    #[tokio::test]
    async fn test_model_verdict_is_gated() {
        let reply = json!({
            "qualityScore": 140,
            "isValid": false,
            "report": "Looks fine.",
            "issues": [{"field": "seo.keywords", "severity": "info", "message": "Could add more"}],
            "suggestions": []
        });
        let validator = agent(MockGateway::new().with_reply("test/validator", reply.to_string()));

        let generated = validator.generate(&complete_outputs()).await;
        assert_eq!(generated.provenance, Provenance::Model);
        assert_eq!(generated.value.quality_score, 100);
        assert!(generated.value.is_valid);

        let reply = json!({
            "qualityScore": 90,
            "isValid": true,
            "report": "One blocker.",
            "issues": [{"field": "summary.short", "severity": "error", "message": "Wrong"}]
        });
        let validator = agent(MockGateway::new().with_reply("test/validator", reply.to_string()));
        let generated = validator.generate(&complete_outputs()).await;
        assert!(!generated.value.is_valid);
    }

    #[tokio::test]
    async fn test_fallback_on_failure() {
        let validator = agent(MockGateway::failing());
        let outputs = complete_outputs();

        let generated = validator.generate(&outputs).await;
        assert_eq!(generated.provenance, Provenance::Fallback);
        assert_eq!(generated.value, assess(&outputs, QualityGate::default()));
    }

    #[test]
    fn test_review_json_omits_vector() {
        let review = complete_outputs().to_review_json().unwrap();
        assert!(review.contains("\"dimensions\": 8"));
        assert!(!review.contains("0.1"));
    }
}
