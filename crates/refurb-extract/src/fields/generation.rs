use std::sync::LazyLock;

use regex::Regex;

static INTEL_HINT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"intel|core i|\bi[3579][\s-]\d").expect("valid regex"));
static ORDINAL_GEN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d{1,2})(?:st|nd|rd|th)\s*gen").expect("valid regex"));
static MODEL_NUMBER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\bi[3579][\s-]?(\d{4,5})").expect("valid regex"));
static LOOSE_GEN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\bi[3579]\s*(\d{1,2})\w*\s*gen").expect("valid regex"));

/// Best-effort Intel Core generation from a processor description.
///
/// Understands `"11th Gen"`, extracted labels like `"I5-8th gen"`, and model
/// numbers (`i5-8350U` is 8th gen, `i7-10610U` is 10th gen). Text that does
/// not look like an Intel CPU yields `None`.
#[must_use]
pub fn intel_generation(text: &str) -> Option<u8> {
    let lower = text.to_lowercase();
    if !INTEL_HINT_RE.is_match(&lower) {
        return None;
    }

    if let Some(caps) = ORDINAL_GEN_RE.captures(&lower) {
        if let Ok(generation) = caps[1].parse() {
            return Some(generation);
        }
    }

    if let Some(caps) = MODEL_NUMBER_RE.captures(&lower) {
        let digits = &caps[1];
        let leading = if digits.len() >= 5 { &digits[..2] } else { &digits[..1] };
        if let Ok(generation) = leading.parse::<u8>() {
            if (1..=20).contains(&generation) {
                return Some(generation);
            }
        }
    }

    LOOSE_GEN_RE
        .captures(&lower)
        .and_then(|caps| caps[1].parse().ok())
}
