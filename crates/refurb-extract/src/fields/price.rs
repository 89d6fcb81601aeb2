use std::sync::LazyLock;

use regex::Regex;

static CURRENCY_PRICE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\$\s*(\d+(?:\.\d+)?)").expect("valid regex"));
static BARE_PRICE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d+(?:\.\d+)?)").expect("valid regex"));

/// `true` when the line carries a currency symbol and at least one digit.
#[must_use]
pub fn has_price_marker(line: &str) -> bool {
    line.contains('$') && line.chars().any(|c| c.is_ascii_digit())
}

/// Parses the first price on a line, preferring a `$`-prefixed amount.
///
/// Thousands separators are stripped first. A zero amount counts as no price.
#[must_use]
pub fn extract_price(line: &str) -> Option<f64> {
    let cleaned = line.replace(',', "");
    let caps = CURRENCY_PRICE_RE
        .captures(&cleaned)
        .or_else(|| BARE_PRICE_RE.captures(&cleaned))?;
    let value: f64 = caps[1].parse().ok()?;
    (value.is_finite() && value > 0.0).then_some(value)
}
