use std::sync::LazyLock;

use regex::Captures;

use super::{first_match, Rule};

const TECHNOLOGY: &str = r"ssd|hdd|nvme|m\.2|hard\s+drive|hard\s+disk|solid\s+state(?:\s+drive)?";

/// Storage rules: size then technology, technology then size, and finally a
/// labelled size without a technology keyword.
pub static STORAGE_RULES: LazyLock<Vec<Rule>> = LazyLock::new(|| {
    vec![
        Rule::new(
            "size_then_technology",
            &format!(r"(?i)\b(\d+(?:\.\d+)?)\s*(gb|tb)\s*(?:pcie\s*)?({TECHNOLOGY})"),
            |caps| sized_with_technology(caps, 1, 2, 3),
        ),
        Rule::new(
            "technology_then_size",
            &format!(r"(?i)\b({TECHNOLOGY})[ \t:]*(\d+(?:\.\d+)?)\s*(gb|tb)\b"),
            |caps| sized_with_technology(caps, 2, 3, 1),
        ),
        Rule::new(
            "labelled_size",
            r"(?i)\b(?:storage|hard\s+drive|drive)[\s:]+(\d+(?:\.\d+)?)\s*(gb|tb)\b",
            |caps| Some(format!("{}{}", &caps[1], caps[2].to_uppercase())),
        ),
    ]
});

fn sized_with_technology(
    caps: &Captures<'_>,
    size: usize,
    unit: usize,
    technology: usize,
) -> Option<String> {
    let size = caps.get(size)?.as_str();
    let unit = caps.get(unit)?.as_str().to_uppercase();
    let technology = canonical_technology(caps.get(technology)?.as_str());
    Some(format!("{size}{unit} {technology}"))
}

fn canonical_technology(raw: &str) -> &'static str {
    let lower = raw.to_lowercase();
    if lower.starts_with("hard") || lower == "hdd" {
        "HDD"
    } else if lower == "nvme" {
        "NVMe"
    } else if lower == "m.2" {
        "M.2"
    } else {
        "SSD"
    }
}

/// Extracts a storage description such as `"256GB SSD"` or `"1TB HDD"`.
///
/// The unit is kept as written (`GB`/`TB`); sizes are not converted.
#[must_use]
pub fn extract_storage(text: &str) -> Option<String> {
    first_match(&STORAGE_RULES, text)
}
