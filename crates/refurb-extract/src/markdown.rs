//! Markdown-to-plain-text cleanup for listing titles.

use std::sync::LazyLock;

use regex::Regex;

static IMAGE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"!\[[^\]]*\]\([^)]*\)").expect("valid regex"));
static LINK_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[([^\]]*)\]\([^)]*\)").expect("valid regex"));
static HEADER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^\s*#{1,6}\s*").expect("valid regex"));
static LIST_MARKER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^\s*(?:[-*+]|\d+\.)\s+").expect("valid regex"));
static EMPHASIS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\*{1,3}|__|~~|`").expect("valid regex"));
static WHITESPACE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("valid regex"));

/// Strips images, link syntax, headers, list markers and emphasis, then
/// collapses runs of whitespace.
///
/// Link text is kept; link targets are dropped. Single underscores are left
/// alone because they occur inside model names and slugs.
#[must_use]
pub fn clean_markdown(text: &str) -> String {
    let text = IMAGE_RE.replace_all(text, "");
    let text = LINK_RE.replace_all(&text, "$1");
    let text = HEADER_RE.replace_all(&text, "");
    let text = LIST_MARKER_RE.replace_all(&text, "");
    let text = EMPHASIS_RE.replace_all(&text, "");
    WHITESPACE_RE.replace_all(&text, " ").trim().to_string()
}

/// Truncates to at most `max_chars` characters without splitting a character.
#[must_use]
pub fn truncate_chars(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((byte_idx, _)) => text[..byte_idx].trim_end().to_string(),
        None => text.to_string(),
    }
}
