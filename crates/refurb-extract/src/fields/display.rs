use std::sync::LazyLock;

use regex::Regex;

/// Resolution tiers, highest first. A tier fires when the lowercased text
/// contains any of its needles, so the bare `"hd"` needle must stay last.
const RESOLUTION_TIERS: &[(&[&str], &str)] = &[
    (&["3840", "2160", "4k", "uhd"], "4K UHD (3840x2160)"),
    (&["2560", "1440", "qhd", "2k"], "QHD (2560x1440)"),
    (&["1920", "1080", "fhd", "full hd"], "FHD (1920x1080)"),
    (&["1366", "768", "hd"], "HD (1366x768)"),
];

const SCREEN_INCHES: std::ops::RangeInclusive<f64> = 7.0..=21.0;

static SCREEN_SIZE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)\b(\d{1,2}(?:\.\d+)?)\s*(?:-\s*)?(?:inch(?:es)?\b|"|”|''|-in\b)"#)
        .expect("valid regex")
});

/// Classifies the panel resolution into one of four named tiers.
#[must_use]
pub fn extract_screen_resolution(text: &str) -> Option<String> {
    let lower = text.to_lowercase();
    RESOLUTION_TIERS
        .iter()
        .find(|(needles, _)| needles.iter().any(|n| lower.contains(n)))
        .map(|(_, label)| (*label).to_string())
}

/// Extracts the diagonal screen size as `"<N> inch"`, accepting 7 to 21 inches.
#[must_use]
pub fn extract_screen_size(text: &str) -> Option<String> {
    SCREEN_SIZE_RE.captures_iter(text).find_map(|caps| {
        let raw = caps.get(1)?.as_str();
        let inches: f64 = raw.parse().ok()?;
        SCREEN_INCHES
            .contains(&inches)
            .then(|| format!("{raw} inch"))
    })
}
