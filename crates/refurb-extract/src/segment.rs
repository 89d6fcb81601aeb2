//! Greedy line-based splitting of a page into candidate listing sections.

use std::sync::LazyLock;

use regex::Regex;

use crate::fields::has_price_marker;

static PRICE_LEAD_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*\$\s*\d").expect("valid regex"));

/// Brand and model-family keywords that open a listing at line start.
/// Leading markdown markers (`#`, `*`, `-`, `>`, `[`) are skipped first.
static KEYWORD_LEAD_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)^[\s#*\->\[]*(?:dell|hp|lenovo|latitude|precision|optiplex|elitebook|probook|thinkpad|thinkcentre)\s",
    )
    .expect("valid regex")
});

/// A contiguous run of non-blank lines hypothesized to describe one listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Section<'a> {
    pub lines: Vec<&'a str>,
}

impl Section<'_> {
    /// All lines joined with single spaces, for whole-section attribute extraction.
    #[must_use]
    pub fn joined(&self) -> String {
        self.lines.join(" ")
    }
}

/// `true` when `line` starts a new listing section.
#[must_use]
pub fn opens_section(line: &str) -> bool {
    PRICE_LEAD_RE.is_match(line) || KEYWORD_LEAD_RE.is_match(line) || has_price_marker(line)
}

/// Splits page text into listing sections in a single forward pass.
///
/// A section opens on a price-leading line, a brand or model-family line, or
/// any line with a currency symbol and a digit. Opening lines always start a
/// fresh section. Non-blank lines extend the open section and a blank line
/// closes it. Lines outside any section are ignored.
#[must_use]
pub fn segment(text: &str) -> Vec<Section<'_>> {
    let mut sections = Vec::new();
    let mut current: Vec<&str> = Vec::new();

    for line in text.lines() {
        let blank = line.trim().is_empty();
        if !blank && opens_section(line) {
            if !current.is_empty() {
                sections.push(Section {
                    lines: std::mem::take(&mut current),
                });
            }
            current.push(line);
        } else if !current.is_empty() {
            if blank {
                sections.push(Section {
                    lines: std::mem::take(&mut current),
                });
            } else {
                current.push(line);
            }
        }
    }

    if !current.is_empty() {
        sections.push(Section { lines: current });
    }

    sections
}
