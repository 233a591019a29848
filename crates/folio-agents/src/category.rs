//! The closed set of content categories.

use std::sync::LazyLock;

use regex::Regex;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString, IntoEnumIterator, IntoStaticStr};

/// Content category.
///
/// One source of truth for the classifier prompt, the classifier's label
/// remapping and the schema/image heuristics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[derive(Serialize, Deserialize, JsonSchema)]
#[derive(Display, EnumIter, EnumString, IntoStaticStr)]
pub enum Category {
    #[serde(rename = "Claude Skills")]
    #[strum(serialize = "Claude Skills")]
    ClaudeSkills,
    #[serde(rename = "MCP Servers")]
    #[strum(serialize = "MCP Servers")]
    McpServers,
    #[serde(rename = "AI Workflows")]
    #[strum(serialize = "AI Workflows")]
    AiWorkflows,
    #[serde(rename = "Prompt Engineering")]
    #[strum(serialize = "Prompt Engineering")]
    PromptEngineering,
    #[serde(rename = "Development Tools")]
    #[strum(serialize = "Development Tools")]
    DevelopmentTools,
    #[default]
    #[serde(rename = "General")]
    #[strum(serialize = "General")]
    General,
}

/// Keyword rules in priority order; the first rule whose patterns all match wins.
static RULES: LazyLock<Vec<(Category, Vec<Regex>)>> = LazyLock::new(|| {
    let rule = |category: Category, patterns: &[&str]| {
        let patterns: Vec<Regex> = patterns
            .iter()
            .map(|p| Regex::new(&format!(r"(?i)\b(?:{p})\b")).unwrap())
            .collect();
        (category, patterns)
    };

    vec![
        rule(Category::ClaudeSkills, &["claude", "skills?"]),
        rule(Category::McpServers, &["mcp|model context protocol"]),
        rule(
            Category::AiWorkflows,
            &["workflows?|automation|agents?|agentic|pipelines?|orchestrat\\w*"],
        ),
        rule(Category::PromptEngineering, &["prompts?|prompting"]),
        rule(
            Category::DevelopmentTools,
            &["cli|sdk|ide|debugg\\w*|linter|compiler|developer tools?|devtools?|librar(?:y|ies)|api"],
        ),
    ]
});

impl Category {
    /// Returns every category.
    pub fn all() -> impl Iterator<Item = Self> {
        Self::iter()
    }

    /// Returns every category label, in declaration order.
    pub fn labels() -> Vec<&'static str> {
        Self::iter().map(Self::label).collect()
    }

    /// Returns the display label.
    pub fn label(self) -> &'static str {
        self.into()
    }

    /// Parses an exact label, ignoring case, surrounding whitespace and
    /// hyphen or underscore separators.
    pub fn parse_label(label: &str) -> Option<Self> {
        let wanted = normalize_label(label);
        Self::iter().find(|category| normalize_label(category.label()) == wanted)
    }

    /// Matches `text` against the keyword rules.
    ///
    /// Returns `None` when no rule matches.
    pub fn from_keywords(text: &str) -> Option<Self> {
        RULES
            .iter()
            .find(|(_, patterns)| patterns.iter().all(|p| p.is_match(text)))
            .map(|(category, _)| *category)
    }

    /// Returns true for categories about software tooling.
    pub fn is_technical(self) -> bool {
        !matches!(self, Self::General | Self::PromptEngineering)
    }
}

fn normalize_label(label: &str) -> String {
    label
        .trim()
        .to_lowercase()
        .replace(['-', '_'], " ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}
