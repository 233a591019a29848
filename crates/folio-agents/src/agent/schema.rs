//! Schema unit: schema.org JSON-LD graph.

use folio_core::{ContentInput, text};
use folio_gateway::{GatewayService, GenerationOptions};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use validator::Validate;

use super::{CategoryOutput, TRACING_TARGET, TagsOutput, chat_request, with_fallback};
use crate::{Generated, Publisher, Result, Unit, WorkflowConfig};

const PREAMBLE: &str = "\
You write schema.org structured data in JSON-LD for technical articles.
Use only properties defined by schema.org. Do not invent URLs for images.";

const PROMPT: &str = "\
Write a JSON-LD object with '@context' set to https://schema.org and an '@graph' array holding:
- one {article} node for the document
- one BreadcrumbList node: Home > {category} > the document
- one Organization node (publisher): {organization}, {site}
- one Person node (author): {author}
The document URL is {url}. Keywords: {keywords}.";

/// Node types every graph must contain; the first entry accepts either article type.
const REQUIRED_TYPES: [&[&str]; 4] = [
    &["Article", "TechArticle"],
    &["BreadcrumbList"],
    &["Organization"],
    &["Person"],
];

/// Tags that mark a document as technical.
const TECHNICAL_TAGS: [&str; 14] = [
    "api",
    "cli",
    "sdk",
    "mcp",
    "python",
    "typescript",
    "javascript",
    "rust",
    "docker",
    "kubernetes",
    "git",
    "database",
    "nodejs",
    "react",
];

const HEADLINE_MAX: usize = 110;
const DESCRIPTION_MAX: usize = 160;

/// JSON-LD graph and the node types it contains.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SchemaOutput {
    pub json_ld: Value,
    /// `@type` of every graph node, in graph order.
    pub schema_types: Vec<String>,
}

impl SchemaOutput {
    /// Returns the required node types absent from this graph.
    pub fn missing_types(&self) -> Vec<String> {
        missing_groups(&self.schema_types)
            .into_iter()
            .map(|accepted| accepted.join(" or "))
            .collect()
    }
}

#[derive(Debug, Deserialize, Validate, JsonSchema)]
struct SchemaReply {
    #[serde(rename = "@context", default)]
    context: Option<Value>,
    #[serde(rename = "@graph")]
    #[validate(length(min = 1))]
    graph: Vec<Value>,
}

/// Picks `TechArticle` for technical categories or technical tags.
pub fn article_type(category: &CategoryOutput, tags: &TagsOutput) -> &'static str {
    let technical_tag = tags
        .tags
        .iter()
        .any(|tag| TECHNICAL_TAGS.contains(&tag.as_str()));

    if category.category.is_technical() || technical_tag {
        "TechArticle"
    } else {
        "Article"
    }
}

fn missing_groups(types: &[String]) -> Vec<&'static [&'static str]> {
    REQUIRED_TYPES
        .into_iter()
        .filter(|accepted| !types.iter().any(|t| accepted.contains(&t.as_str())))
        .collect()
}

/// Returns the string `@type` values of a node.
fn node_types(node: &Value) -> Vec<String> {
    match node.get("@type") {
        Some(Value::String(kind)) => vec![kind.clone()],
        Some(Value::Array(kinds)) => kinds
            .iter()
            .filter_map(Value::as_str)
            .map(str::to_owned)
            .collect(),
        _ => Vec::new(),
    }
}

fn collect_types(graph: &[Value]) -> Vec<String> {
    let mut types = Vec::new();
    for kind in graph.iter().flat_map(node_types) {
        if !types.contains(&kind) {
            types.push(kind);
        }
    }
    types
}

/// Schema unit.
#[derive(Debug, Clone)]
pub struct SchemaAgent {
    gateway: GatewayService,
    model: String,
    options: GenerationOptions,
    limit: usize,
    publisher: Publisher,
}

impl SchemaAgent {
    /// Creates the unit from the workflow configuration.
    pub fn new(gateway: GatewayService, config: &WorkflowConfig) -> Self {
        Self {
            gateway,
            model: config.models.schema.clone(),
            options: config.options.schema,
            limit: config.limits.schema,
            publisher: config.publisher.clone(),
        }
    }

    /// Generates the JSON-LD graph, filling missing nodes deterministically.
    #[tracing::instrument(skip_all, target = TRACING_TARGET, name = "schema")]
    pub async fn generate(
        &self,
        input: &ContentInput,
        category: &CategoryOutput,
        tags: &TagsOutput,
    ) -> Generated<SchemaOutput> {
        with_fallback(
            Unit::Schema,
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
    ) -> Result<SchemaOutput> {
        let article = article_type(category, tags);
        let instructions = PROMPT
            .replace("{article}", article)
            .replace("{category}", category.category.label())
            .replace("{organization}", &self.publisher.organization)
            .replace("{site}", self.publisher.base_url())
            .replace("{author}", &self.publisher.author)
            .replace("{url}", &self.article_url(input))
            .replace("{keywords}", &tags.tags.join(", "));
        let prompt = format!(
            "{instructions}\n\nTitle: {}\n\nDocument:\n{}",
            input.title,
            input.content_prefix(self.limit)
        );

        let request = chat_request(&self.model, self.options, PREAMBLE, prompt)?;
        let reply: SchemaReply = self.gateway.chat_json(request).await?;
        Ok(self.complete(reply, input, category, tags))
    }

    /// Appends a deterministic node for every required type the model left out.
    fn complete(
        &self,
        reply: SchemaReply,
        input: &ContentInput,
        category: &CategoryOutput,
        tags: &TagsOutput,
    ) -> SchemaOutput {
        let mut graph = reply.graph;
        let missing = missing_groups(&collect_types(&graph));

        if !missing.is_empty() {
            tracing::debug!(
                target: TRACING_TARGET,
                missing = missing.len(),
                "Filling JSON-LD nodes the model omitted"
            );

            for node in self.nodes(input, category, tags) {
                let fills_gap = node_types(&node)
                    .iter()
                    .any(|kind| missing.iter().any(|accepted| accepted.contains(&kind.as_str())));
                if fills_gap {
                    graph.push(node);
                }
            }
        }

        let schema_types = collect_types(&graph);
        let context = reply
            .context
            .unwrap_or_else(|| Value::String("https://schema.org".to_owned()));

        SchemaOutput {
            json_ld: json!({ "@context": context, "@graph": graph }),
            schema_types,
        }
    }

    /// Builds the four-node graph from the input and the fixed publisher identity.
    pub fn fallback(
        &self,
        input: &ContentInput,
        category: &CategoryOutput,
        tags: &TagsOutput,
    ) -> SchemaOutput {
        let graph = self.nodes(input, category, tags);
        let schema_types = collect_types(&graph);

        SchemaOutput {
            json_ld: json!({ "@context": "https://schema.org", "@graph": graph }),
            schema_types,
        }
    }

    fn article_url(&self, input: &ContentInput) -> String {
        format!("{}/{}", self.publisher.base_url(), input.slug_or_derived())
    }

    fn nodes(&self, input: &ContentInput, category: &CategoryOutput, tags: &TagsOutput) -> Vec<Value> {
        let base = self.publisher.base_url();
        let url = self.article_url(input);
        let organization_id = format!("{base}/#organization");
        let person_id = format!("{base}/#author");
        let label = category.category.label();

        let plain = text::strip_markdown(input.content_prefix(self.limit));
        let description = text::truncate_with_ellipsis(
            text::first_sentence(&plain, 0).unwrap_or_default(),
            DESCRIPTION_MAX,
        );

        vec![
            json!({
                "@type": article_type(category, tags),
                "@id": format!("{url}#article"),
                "headline": text::truncate_with_ellipsis(input.title.trim(), HEADLINE_MAX),
                "description": description,
                "url": url,
                "mainEntityOfPage": url,
                "articleSection": label,
                "keywords": tags.tags.join(", "),
                "inLanguage": "en",
                "author": { "@id": person_id },
                "publisher": { "@id": organization_id },
            }),
            json!({
                "@type": "BreadcrumbList",
                "@id": format!("{url}#breadcrumb"),
                "itemListElement": [
                    { "@type": "ListItem", "position": 1, "name": "Home", "item": base },
                    {
                        "@type": "ListItem",
                        "position": 2,
                        "name": label,
                        "item": format!("{base}/category/{}", text::slugify(label)),
                    },
                    { "@type": "ListItem", "position": 3, "name": input.title.trim(), "item": url },
                ],
            }),
            json!({
                "@type": "Organization",
                "@id": organization_id,
                "name": self.publisher.organization,
                "url": base,
            }),
            json!({
                "@type": "Person",
                "@id": person_id,
                "name": self.publisher.author,
            }),
        ]
    }
}
