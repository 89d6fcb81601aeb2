use std::sync::LazyLock;

use regex::Captures;

use super::{first_match, Rule};

const MAX_RAM_GB: u32 = 128;

/// RAM rules. The adjacency rule requires a memory-technology keyword right
/// after the size so storage capacities are never read as RAM; the context
/// rules only fire when the words "ram" or "memory" sit next to the size.
pub static RAM_RULES: LazyLock<Vec<Rule>> = LazyLock::new(|| {
    vec![
        Rule::new(
            "size_then_technology",
            r"(?i)\b(\d+)\s*gb\s*(?:ram\s*)?(?:lpddr\d?x?|ddr\d?|sdram|ram|memory|pc[3-5])",
            plausible_gb,
        ),
        Rule::new(
            "label_then_size",
            r"(?i)\b(?:ram|memory)[\s:]+(\d+)\s*gb\b",
            plausible_gb,
        ),
        Rule::new(
            "size_then_label",
            r"(?i)\b(\d+)\s*gb[\s:]+(?:of\s+)?(?:ram|memory)\b",
            plausible_gb,
        ),
    ]
});

fn plausible_gb(caps: &Captures<'_>) -> Option<String> {
    let size: u32 = caps[1].parse().ok()?;
    (1..=MAX_RAM_GB)
        .contains(&size)
        .then(|| format!("{size}GB"))
}

/// Extracts installed memory as `"<N>GB"` (1 to 128 GB).
#[must_use]
pub fn extract_ram(text: &str) -> Option<String> {
    first_match(&RAM_RULES, text)
}
