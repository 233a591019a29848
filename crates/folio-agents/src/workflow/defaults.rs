//! Workflow-level defaults for units whose task died past their own fallback.

use folio_core::{ContentInput, text};
use serde_json::json;

use crate::Category;
use crate::agent::{
    CategoryOutput, ImagePromptOutput, SchemaOutput, SeoOutput, SummaryOutput, TagsOutput,
};

const SCHEMA_TYPES: [&str; 4] = ["Article", "BreadcrumbList", "Organization", "Person"];

const IMAGE_PROMPT: &str = "An abstract editorial illustration of an open notebook surrounded \
    by soft geometric shapes, calm lighting, generous negative space, no text or logos.";

/// First ~180/280/480 characters of the raw content.
pub(super) fn summary(input: &ContentInput) -> SummaryOutput {
    let content = input.content.trim();
    SummaryOutput {
        short: text::truncate_at_word(content, 180),
        medium: text::truncate_at_word(content, 280),
        long: text::truncate_at_word(content, 480),
        markdown: content.to_owned(),
    }
}

/// Truncated title and content, no keywords.
pub(super) fn seo(input: &ContentInput) -> SeoOutput {
    SeoOutput {
        meta_title: text::truncate_with_ellipsis(input.title.trim(), 60),
        meta_description: text::truncate_with_ellipsis(input.content.trim(), 160),
        keywords: Vec::new(),
        focus_keyword: None,
    }
}

pub(super) fn category() -> CategoryOutput {
    CategoryOutput {
        category: Category::General,
        confidence: 0.0,
        reasoning: None,
        alternatives: Vec::new(),
    }
}

pub(super) fn tags() -> TagsOutput {
    TagsOutput::default()
}

/// Bare four-node graph carrying only the title.
pub(super) fn schema(input: &ContentInput) -> SchemaOutput {
    let headline = text::truncate_with_ellipsis(input.title.trim(), 110);
    let graph: Vec<_> = SCHEMA_TYPES
        .iter()
        .map(|kind| match *kind {
            "Article" => json!({ "@type": kind, "headline": headline }),
            _ => json!({ "@type": kind }),
        })
        .collect();

    SchemaOutput {
        json_ld: json!({ "@context": "https://schema.org", "@graph": graph }),
        schema_types: SCHEMA_TYPES.map(str::to_owned).to_vec(),
    }
}

/// Canned prompt independent of the document.
pub(super) fn image_prompt() -> ImagePromptOutput {
    ImagePromptOutput {
        prompt: IMAGE_PROMPT.to_owned(),
        style: "minimalist digital illustration".to_owned(),
        colors: ["#3949AB", "#FF7043", "#FAFAFA"].map(str::to_owned).to_vec(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summary_defaults() {
        let input = ContentInput::new("T", "word ".repeat(200));
        let summary = summary(&input);
        assert!(text::char_len(&summary.short) <= 180);
        assert!(text::char_len(&summary.medium) <= 280);
        assert!(text::char_len(&summary.long) <= 480);
    }

    #[test]
    fn test_seo_defaults() {
        let input = ContentInput::new("t".repeat(100), "c".repeat(300));
        let seo = seo(&input);
        assert_eq!(text::char_len(&seo.meta_title), 60);
        assert_eq!(text::char_len(&seo.meta_description), 160);
        assert!(seo.keywords.is_empty());
    }

    #[test]
    fn test_schema_default_is_complete() {
        let schema = schema(&ContentInput::new("Title", "body"));
        assert!(schema.missing_types().is_empty());
        assert_eq!(schema.json_ld["@graph"][0]["headline"], "Title");
        assert_eq!(schema.json_ld["@graph"].as_array().map(Vec::len), Some(4));
    }

    #[test]
    fn test_image_prompt_default() {
        let image = image_prompt();
        assert!(text::char_len(&image.prompt) >= 50);
        assert_eq!(image.colors.len(), 3);
    }
}
