//! Text helpers shared by the deterministic fallbacks.
//!
//! Every length in this module is measured in characters, never bytes, so
//! multi-byte content can be cut without splitting a code point.

use std::sync::LazyLock;

use regex::Regex;

static CODE_FENCE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?s)```.*?```").unwrap());
static IMAGE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"!\[([^\]]*)\]\([^)]*\)").unwrap());
static LINK: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\[([^\]]+)\]\([^)]*\)").unwrap());
static INLINE_CODE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"`([^`]*)`").unwrap());
static HEADING: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?m)^\s{0,3}#{1,6}\s*").unwrap());
static BLOCKQUOTE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?m)^\s*>\s?").unwrap());
static RULE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?m)^\s*[-*_]{3,}\s*$").unwrap());
static LIST_MARKER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^\s*(?:[-*+]|\d+\.)\s+").unwrap());
static EMPHASIS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[*~]{1,3}").unwrap());
static HTML_TAG: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]+>").unwrap());
static WHITESPACE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());
static NON_SLUG: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[^a-z0-9]+").unwrap());

const ELLIPSIS: &str = "...";

/// Returns the number of characters in `text`.
pub fn char_len(text: &str) -> usize {
    text.chars().count()
}

/// Returns the longest prefix of `text` with at most `max_chars` characters.
pub fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

/// Truncates `text` to at most `max_chars` characters, ending with `...` when cut.
///
/// The ellipsis counts toward the ceiling.
pub fn truncate_with_ellipsis(text: &str, max_chars: usize) -> String {
    if char_len(text) <= max_chars {
        return text.to_owned();
    }

    if max_chars <= ELLIPSIS.len() {
        return truncate_chars(text, max_chars).to_owned();
    }

    let head = truncate_chars(text, max_chars - ELLIPSIS.len()).trim_end();
    format!("{head}{ELLIPSIS}")
}

/// Like [`truncate_with_ellipsis`], but prefers cutting on a word boundary.
///
/// The boundary is only used when it keeps at least half of the allowed
/// characters; otherwise the cut falls mid-word.
pub fn truncate_at_word(text: &str, max_chars: usize) -> String {
    if char_len(text) <= max_chars {
        return text.to_owned();
    }

    if max_chars <= ELLIPSIS.len() {
        return truncate_chars(text, max_chars).to_owned();
    }

    let head = truncate_chars(text, max_chars - ELLIPSIS.len());
    let head = match head.rfind(char::is_whitespace) {
        Some(cut) if cut >= head.len() / 2 => &head[..cut],
        _ => head,
    };

    format!("{}{ELLIPSIS}", head.trim_end())
}

/// Removes markdown syntax and collapses all whitespace to single spaces.
///
/// Fenced code blocks are dropped entirely, links and images keep their text.
pub fn strip_markdown(markdown: &str) -> String {
    let text = CODE_FENCE.replace_all(markdown, " ");
    let text = IMAGE.replace_all(&text, "$1");
    let text = LINK.replace_all(&text, "$1");
    let text = INLINE_CODE.replace_all(&text, "$1");
    let text = HEADING.replace_all(&text, "");
    let text = BLOCKQUOTE.replace_all(&text, "");
    let text = RULE.replace_all(&text, " ");
    let text = LIST_MARKER.replace_all(&text, "");
    let text = EMPHASIS.replace_all(&text, "");
    let text = HTML_TAG.replace_all(&text, " ");
    WHITESPACE.replace_all(&text, " ").trim().to_owned()
}

/// Returns the first sentence of `text` that has at least `min_chars` characters.
///
/// Sentences end at `.`, `!` or `?`; a trailing fragment without terminator
/// also counts as a sentence.
pub fn first_sentence(text: &str, min_chars: usize) -> Option<&str> {
    text.split_inclusive(['.', '!', '?'])
        .map(str::trim)
        .find(|sentence| char_len(sentence) >= min_chars)
}

/// Converts arbitrary text into a lowercase, hyphen-separated slug.
pub fn slugify(text: &str) -> String {
    let lower = text.to_lowercase();
    NON_SLUG
        .replace_all(&lower, "-")
        .trim_matches('-')
        .to_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncate_chars_respects_boundaries() {
        assert_eq!(truncate_chars("abcdef", 3), "abc");
        assert_eq!(truncate_chars("abc", 10), "abc");
        assert_eq!(truncate_chars("ééé", 2), "éé");
        assert_eq!(truncate_chars("abc", 0), "");
    }

    #[test]
    fn ellipsis_counts_toward_limit() {
        let long = "a".repeat(100);
        let cut = truncate_with_ellipsis(&long, 60);
        assert_eq!(char_len(&cut), 60);
        assert!(cut.ends_with("..."));

        assert_eq!(truncate_with_ellipsis("short", 60), "short");
        assert_eq!(truncate_with_ellipsis("abcdef", 2), "ab");
    }

    #[test]
    fn word_truncation_prefers_whitespace() {
        let text = "the quick brown fox jumps over the lazy dog";
        let cut = truncate_at_word(text, 20);
        assert_eq!(cut, "the quick brown...");
        assert!(char_len(&cut) <= 20);
    }

    #[test]
    fn word_truncation_cuts_long_words() {
        let text = "a supercalifragilisticexpialidocious word";
        let cut = truncate_at_word(text, 15);
        assert!(char_len(&cut) <= 15);
        assert!(cut.ends_with("..."));
    }

    #[test]
    fn strip_markdown_removes_syntax() {
        let markdown = "# Title\n\nSome **bold** and *italic* text with [a link](https://x.y).\n\n\
                        ```rust\nfn main() {}\n```\n\n- item one\n- item two\n\n> quoted `code`";
        let plain = strip_markdown(markdown);
        assert_eq!(
            plain,
            "Title Some bold and italic text with a link. item one item two quoted code"
        );
    }

    #[test]
    fn strip_markdown_keeps_image_alt_text() {
        assert_eq!(strip_markdown("![diagram](img.png) below"), "diagram below");
    }

    #[test]
    fn first_sentence_skips_short_ones() {
        let text = "Hi. This sentence is definitely longer than twenty characters. Next.";
        assert_eq!(
            first_sentence(text, 20),
            Some("This sentence is definitely longer than twenty characters.")
        );
        assert_eq!(first_sentence("tiny. bits.", 20), None);
    }

    #[test]
    fn slugify_collapses_separators() {
        assert_eq!(slugify("  Hello,   World!! "), "hello-world");
        assert_eq!(slugify("Claude Skills & MCP"), "claude-skills-mcp");
    }
}
