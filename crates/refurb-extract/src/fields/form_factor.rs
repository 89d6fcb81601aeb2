use std::sync::LazyLock;

use super::{first_match, Rule};

/// Desktop chassis rules, most specific first.
pub static FORM_FACTOR_RULES: LazyLock<Vec<Rule>> = LazyLock::new(|| {
    vec![
        Rule::new("tiny", r"(?i)\b(?:tiny|mff|micro)", |_| {
            Some("MFF/Tiny".to_string())
        }),
        Rule::new("small_form", r"(?i)\b(?:sff|small\s+form)", |_| {
            Some("SFF".to_string())
        }),
        Rule::new("tower", r"(?i)\b(?:tower|mt)\b", |_| Some("Tower".to_string())),
    ]
});

/// Classifies a desktop chassis as `"MFF/Tiny"`, `"SFF"` or `"Tower"`.
#[must_use]
pub fn extract_form_factor(text: &str) -> Option<String> {
    first_match(&FORM_FACTOR_RULES, text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cascade_order() {
        assert_eq!(
            extract_form_factor("OptiPlex 7060 Micro").as_deref(),
            Some("MFF/Tiny")
        );
        assert_eq!(
            extract_form_factor("ThinkCentre M720q Tiny Tower-less").as_deref(),
            Some("MFF/Tiny")
        );
        assert_eq!(
            extract_form_factor("EliteDesk 800 G4 Small Form Factor").as_deref(),
            Some("SFF")
        );
        assert_eq!(
            extract_form_factor("OptiPlex 7050 MT").as_deref(),
            Some("Tower")
        );
    }

    #[test]
    fn mt_needs_word_boundary() {
        assert!(extract_form_factor("Intel vPro SmartMT").is_none());
        assert!(extract_form_factor("Precision 3630").is_none());
    }
}
