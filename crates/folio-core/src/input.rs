//! Workflow input.

use serde::{Deserialize, Serialize};

use crate::text;

/// The document handed to the generation workflow.
///
/// Immutable for the whole run: every unit receives a shared reference (or an
/// `Arc` of it) and truncates `content` to its own limit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentInput {
    /// Document title.
    pub title: String,
    /// Raw markdown body.
    pub content: String,
    /// Optional URL slug; derived from the title when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slug: Option<String>,
}

impl ContentInput {
    /// Creates a new input without a slug.
    pub fn new(title: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            content: content.into(),
            slug: None,
        }
    }

    /// Sets the slug.
    #[must_use]
    pub fn with_slug(mut self, slug: impl Into<String>) -> Self {
        self.slug = Some(slug.into());
        self
    }

    /// Returns the explicit slug, or one derived from the title.
    pub fn slug_or_derived(&self) -> String {
        match self.slug.as_deref().map(str::trim) {
            Some(slug) if !slug.is_empty() => slug.to_owned(),
            _ => text::slugify(&self.title),
        }
    }

    /// Returns the content cut to at most `max_chars` characters.
    pub fn content_prefix(&self, max_chars: usize) -> &str {
        text::truncate_chars(&self.content, max_chars)
    }

    /// Returns the number of characters in the content.
    pub fn content_chars(&self) -> usize {
        self.content.chars().count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slug_derived_from_title() {
        let input = ContentInput::new("Building MCP Servers in Rust!", "body");
        assert_eq!(input.slug_or_derived(), "building-mcp-servers-in-rust");
    }

    #[test]
    fn test_explicit_slug_wins() {
        let input = ContentInput::new("Title", "body").with_slug("custom-slug");
        assert_eq!(input.slug_or_derived(), "custom-slug");
    }

    #[test]
    fn test_blank_slug_falls_back_to_title() {
        let input = ContentInput::new("Hello World", "body").with_slug("   ");
        assert_eq!(input.slug_or_derived(), "hello-world");
    }

    #[test]
    fn test_content_prefix_is_char_safe() {
        let input = ContentInput::new("t", "héllo wörld");
        assert_eq!(input.content_prefix(4), "héll");
        assert_eq!(input.content_chars(), 11);
    }

    #[test]
    fn test_serde_camel_case_without_slug() {
        let input = ContentInput::new("T", "C");
        let json = serde_json::to_value(&input).unwrap();
        assert_eq!(json, serde_json::json!({"title": "T", "content": "C"}));
    }
}
