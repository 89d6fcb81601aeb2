use std::sync::LazyLock;

use regex::Regex;

use refurb_core::Brand;

static HP_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\bhp\b|hewlett").expect("valid regex"));

/// Detects one of the tracked manufacturers, checked as Dell, HP, Lenovo.
///
/// `hp` must stand alone as a word so text like "shipping" is not read as HP.
#[must_use]
pub fn extract_brand(text: &str) -> Option<Brand> {
    let lower = text.to_lowercase();
    if lower.contains("dell") {
        Some(Brand::Dell)
    } else if HP_RE.is_match(text) {
        Some(Brand::Hp)
    } else if lower.contains("lenovo") {
        Some(Brand::Lenovo)
    } else {
        None
    }
}
