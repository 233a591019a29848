//! Tags unit: normalized tags and looser related topics.

use std::sync::LazyLock;

use folio_core::{ContentInput, Error, text};
use folio_gateway::{GatewayService, GenerationOptions};
use regex::Regex;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use validator::Validate;

use super::{TRACING_TARGET, chat_request, with_fallback};
use crate::{Category, Generated, Result, Unit, WorkflowConfig};

const PREAMBLE: &str = "\
You tag technical articles for a content catalog.
Tags are short, lowercase and specific. Related topics may be broader.";

const PROMPT: &str = "\
Extract 3-5 'tags' for the following document and 3-6 broader 'relatedTopics'.";

const MIN_TAGS: usize = 3;
const MAX_TAGS: usize = 5;
const MAX_TOPICS: usize = 8;

/// Shortest title word the fallback prefers as a tag.
const TITLE_WORD_MIN: usize = 4;

/// Last-resort tags, so the fallback always reaches three.
const FILLER_TAGS: [&str; MIN_TAGS] = ["article", "notes", "reference"];

/// Fixed vocabulary scanned by the fallback: tag and the pattern that finds it.
const VOCABULARY: [(&str, &str); 30] = [
    ("claude", "claude"),
    ("anthropic", "anthropic"),
    ("openai", "openai|gpt-?\\d\\w*"),
    ("llm", "llms?|large language models?"),
    ("ai", "ai|artificial intelligence"),
    ("machine-learning", "machine[\\s-]learning|ml"),
    ("agents", "agents?|agentic"),
    ("mcp", "mcp|model context protocol"),
    ("prompt-engineering", "prompt[\\s-]engineering|prompts?"),
    ("rag", "rag|retrieval[\\s-]augmented"),
    ("embeddings", "embeddings?"),
    ("vector-database", "vector[\\s-](?:database|store|db)s?"),
    ("automation", "automation|automate[ds]?"),
    ("workflow", "workflows?"),
    ("api", "apis?|rest"),
    ("cli", "cli|command[\\s-]line"),
    ("sdk", "sdks?"),
    ("python", "python"),
    ("typescript", "typescript"),
    ("javascript", "javascript"),
    ("rust", "rust"),
    ("docker", "docker|containers?"),
    ("kubernetes", "kubernetes|k8s"),
    ("git", "git|github"),
    ("testing", "testing|tests?"),
    ("security", "security|secure"),
    ("database", "databases?|sql|postgres\\w*"),
    ("react", "react"),
    ("nodejs", "node(?:\\.?js)?"),
    ("open-source", "open[\\s-]source"),
];

static VOCABULARY_PATTERNS: LazyLock<Vec<(&'static str, Regex)>> = LazyLock::new(|| {
    VOCABULARY
        .iter()
        .map(|(tag, pattern)| {
            let regex = Regex::new(&format!(r"(?i)\b(?:{pattern})\b")).unwrap();
            (*tag, regex)
        })
        .collect()
});

static DISALLOWED: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[^a-z0-9\s-]").unwrap());
static WHITESPACE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());
static HYPHENS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"-{2,}").unwrap());

/// Normalizes a tag to lowercase-hyphenated form.
///
/// Lower-cases, drops characters outside `[a-z0-9\s-]`, turns whitespace
/// runs into single hyphens, collapses repeated hyphens and trims hyphens at
/// both ends. Normalizing a normalized tag returns it unchanged.
pub fn normalize_tag(tag: &str) -> String {
    let lower = tag.to_lowercase();
    let kept = DISALLOWED.replace_all(&lower, "");
    let hyphenated = WHITESPACE.replace_all(kept.trim(), "-");
    HYPHENS
        .replace_all(&hyphenated, "-")
        .trim_matches('-')
        .to_owned()
}

/// Tags and related topics.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TagsOutput {
    /// 3-5 normalized tags.
    pub tags: Vec<String>,
    pub related_topics: Vec<String>,
}

#[derive(Debug, Deserialize, Validate, JsonSchema)]
#[serde(rename_all = "camelCase")]
struct TagsReply {
    #[validate(length(min = 1))]
    tags: Vec<String>,
    #[serde(default)]
    related_topics: Vec<String>,
}

/// Pushes `item` unless it is empty or already present.
fn push_unique(items: &mut Vec<String>, item: String) {
    if !item.is_empty() && !items.contains(&item) {
        items.push(item);
    }
}

/// Tags unit.
#[derive(Debug, Clone)]
pub struct TagsAgent {
    gateway: GatewayService,
    model: String,
    options: GenerationOptions,
    limit: usize,
}

impl TagsAgent {
    /// Creates the unit from the workflow configuration.
    pub fn new(gateway: GatewayService, config: &WorkflowConfig) -> Self {
        Self {
            gateway,
            model: config.models.tags.clone(),
            options: config.options.tags,
            limit: config.limits.tags,
        }
    }

    /// Extracts tags, falling back to the fixed vocabulary.
    #[tracing::instrument(skip_all, target = TRACING_TARGET, name = "tags")]
    pub async fn generate(&self, input: &ContentInput) -> Generated<TagsOutput> {
        with_fallback(Unit::Tags, self.request(input), || self.fallback(input)).await
    }

    async fn request(&self, input: &ContentInput) -> Result<TagsOutput> {
        let prompt = format!(
            "{PROMPT}\n\nTitle: {}\n\nDocument:\n{}",
            input.title,
            input.content_prefix(self.limit)
        );
        let request = chat_request(&self.model, self.options, PREAMBLE, prompt)?;
        let reply: TagsReply = self.gateway.chat_json(request).await?;

        let mut tags = Vec::with_capacity(MAX_TAGS);
        for tag in &reply.tags {
            push_unique(&mut tags, normalize_tag(tag));
        }
        tags.truncate(MAX_TAGS);

        if tags.len() < MIN_TAGS {
            return Err(Error::invalid_response()
                .with_message(format!("expected at least {MIN_TAGS} tags, got {}", tags.len())));
        }

        let mut related_topics = Vec::new();
        for topic in reply.related_topics {
            push_unique(&mut related_topics, topic.trim().to_owned());
        }
        related_topics.truncate(MAX_TOPICS);

        Ok(TagsOutput {
            tags,
            related_topics,
        })
    }

    /// Scans the fixed vocabulary, padding up to three tags when fewer match.
    ///
    /// Padding takes title words of four or more characters, then the
    /// category label, then shorter title words, then [`FILLER_TAGS`].
    /// Vocabulary hits past the fifth become related topics, after the
    /// keyword-matched category if there is one.
    pub fn fallback(&self, input: &ContentInput) -> TagsOutput {
        let haystack = format!("{}\n{}", input.title, input.content_prefix(self.limit));

        let mut matches: Vec<String> = VOCABULARY_PATTERNS
            .iter()
            .filter(|(_, regex)| regex.is_match(&haystack))
            .map(|(tag, _)| (*tag).to_owned())
            .collect();

        let overflow = if matches.len() > MAX_TAGS {
            matches.split_off(MAX_TAGS)
        } else {
            Vec::new()
        };
        let mut tags = matches;

        let category = Category::from_keywords(&haystack);
        let title_words: Vec<String> = input.title.split_whitespace().map(normalize_tag).collect();
        let (long_words, short_words): (Vec<String>, Vec<String>) = title_words
            .into_iter()
            .partition(|word| text::char_len(word) >= TITLE_WORD_MIN);

        let padding = long_words
            .into_iter()
            .chain([normalize_tag(category.unwrap_or_default().label())])
            .chain(short_words)
            .chain(FILLER_TAGS.map(str::to_owned));
        for tag in padding {
            if tags.len() >= MIN_TAGS {
                break;
            }
            push_unique(&mut tags, tag);
        }

        let mut related_topics = Vec::new();
        if let Some(category) = category {
            push_unique(&mut related_topics, category.label().to_lowercase());
        }
        for tag in overflow {
            push_unique(&mut related_topics, tag.replace('-', " "));
        }
        related_topics.truncate(MAX_TOPICS);

        TagsOutput {
            tags,
            related_topics,
        }
    }
}
