//! Loading the input document.

use std::path::Path;

use anyhow::Context;
use folio_core::ContentInput;
use tokio::io::AsyncReadExt;

use crate::TRACING_TARGET_INPUT;

/// Reads a markdown document from `path`, or stdin when `path` is `-`.
///
/// The title is `title` when given, then the first `#` heading, then the
/// file stem.
pub async fn load(
    path: &Path,
    title: Option<&str>,
    slug: Option<&str>,
) -> anyhow::Result<ContentInput> {
    let content = if path == Path::new("-") {
        let mut content = String::new();
        tokio::io::stdin()
            .read_to_string(&mut content)
            .await
            .context("failed to read document from stdin")?;
        content
    } else {
        tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("failed to read document '{}'", path.display()))?
    };

    if content.trim().is_empty() {
        anyhow::bail!("document '{}' is empty", path.display());
    }

    let title = title
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_owned)
        .or_else(|| first_heading(&content))
        .or_else(|| file_stem(path))
        .context("cannot derive a title; pass --title")?;

    tracing::debug!(
        target: TRACING_TARGET_INPUT,
        path = %path.display(),
        title = %title,
        chars = content.chars().count(),
        "Document loaded"
    );

    let input = ContentInput::new(title, content);
    Ok(match slug {
        Some(slug) => input.with_slug(slug),
        None => input,
    })
}

/// Returns the text of the first level-one ATX heading.
fn first_heading(content: &str) -> Option<String> {
    content
        .lines()
        .filter_map(|line| line.trim_start().strip_prefix("# "))
        .map(|heading| heading.trim().trim_end_matches('#').trim())
        .find(|heading| !heading.is_empty())
        .map(str::to_owned)
}

fn file_stem(path: &Path) -> Option<String> {
    let stem = path.file_stem()?.to_str()?;
    let title = stem.replace(['-', '_'], " ");
    let title = title.trim();
    (!title.is_empty() && title != "-").then(|| title.to_owned())
}
