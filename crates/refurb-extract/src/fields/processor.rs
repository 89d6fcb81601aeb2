use std::sync::LazyLock;

use regex::Captures;

use super::{first_match, title_case, Rule};

/// Processor rules: Intel generation forms, then AMD Ryzen, then a bare
/// keyword fallback that keeps a short phrase around the keyword.
pub static PROCESSOR_RULES: LazyLock<Vec<Rule>> = LazyLock::new(|| {
    let mut rules = vec![
        Rule::new(
            "intel_core_gen",
            r"(?i)\b(?:intel\s+)?(?:core\s+)?i([3579])[\s-](\d{1,2})(?:th|st|nd|rd)?\s*gen(?:eration)?\b",
            |caps| intel_label(&caps[1], &caps[2]),
        ),
        Rule::new(
            "intel_gen_leading",
            r"(?i)\b(\d{1,2})(?:th|st|nd|rd)\s+gen(?:eration)?\s+(?:intel\s+)?(?:core\s+)?i([3579])\b",
            |caps| intel_label(&caps[2], &caps[1]),
        ),
        Rule::new(
            "ryzen_pro_model",
            r"(?i)\bryzen\s*([3579])\s*pro\s+(\d{4}[a-z]*)",
            |caps| Some(format!("Ryzen {} PRO {}", &caps[1], caps[2].to_uppercase())),
        ),
        Rule::new(
            "ryzen_model",
            r"(?i)\bryzen\s*([3579])[\s-]+(\d{4}[a-z]*)",
            |caps| Some(format!("Ryzen {} {}", &caps[1], caps[2].to_uppercase())),
        ),
        Rule::new("ryzen", r"(?i)\bryzen\s*([3579])\b", |caps| {
            Some(format!("Ryzen {}", &caps[1]))
        }),
    ];

    for (name, keyword) in [
        ("celeron", "celeron"),
        ("pentium", "pentium"),
        ("xeon", "xeon"),
        ("athlon", "athlon"),
        ("bare_i3", "i3"),
        ("bare_i5", "i5"),
        ("bare_i7", "i7"),
        ("bare_i9", "i9"),
    ] {
        rules.push(Rule::new(
            name,
            &format!(r"(?i)(?:\b\w+[ \t]+)?\b{keyword}[-\w]*"),
            keyword_phrase,
        ));
    }

    rules
});

fn intel_label(tier: &str, generation: &str) -> Option<String> {
    let generation: u8 = generation.parse().ok()?;
    (1..=20)
        .contains(&generation)
        .then(|| format!("I{tier}-{generation}th gen"))
}

fn keyword_phrase(caps: &Captures<'_>) -> Option<String> {
    let phrase = caps.get(0)?.as_str().trim();
    (!phrase.is_empty()).then(|| title_case(phrase))
}

/// Extracts a processor description such as `"I5-11th gen"`, `"Ryzen 5 5650U"`
/// or `"Intel Celeron"`.
#[must_use]
pub fn extract_processor(text: &str) -> Option<String> {
    first_match(&PROCESSOR_RULES, text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn intel_generation_form() {
        assert_eq!(
            extract_processor("Intel i5-11th gen, 16GB DDR4").as_deref(),
            Some("I5-11th gen")
        );
        assert_eq!(
            extract_processor("Core i7 8th Generation").as_deref(),
            Some("I7-8th gen")
        );
    }

    #[test]
    fn intel_generation_leading_form() {
        assert_eq!(
            extract_processor("11th Gen Intel Core i5-1145G7").as_deref(),
            Some("I5-11th gen")
        );
    }

    #[test]
    fn ryzen_pro_beats_plain_ryzen() {
        assert_eq!(
            extract_processor("AMD Ryzen 5 PRO 5650u 16GB").as_deref(),
            Some("Ryzen 5 PRO 5650U")
        );
        assert_eq!(
            extract_processor("AMD Ryzen 7 4700U").as_deref(),
            Some("Ryzen 7 4700U")
        );
        assert_eq!(extract_processor("ryzen 3 laptop").as_deref(), Some("Ryzen 3"));
    }

    #[test]
    fn keyword_fallback_keeps_neighbouring_word() {
        assert_eq!(
            extract_processor("Intel Celeron N4020 4GB").as_deref(),
            Some("Intel Celeron")
        );
        assert_eq!(
            extract_processor("with Core i5-8350U vPro").as_deref(),
            Some("Core I5-8350U")
        );
    }

    #[test]
    fn earlier_rule_wins_over_later_position() {
        // The keyword rule would match "Xeon" first in the text, but the
        // Intel generation rule is earlier in the table.
        assert_eq!(
            extract_processor("Xeon alternative: i7-10th gen").as_deref(),
            Some("I7-10th gen")
        );
    }

    #[test]
    fn no_processor_mentioned() {
        assert!(extract_processor("Dell Latitude 5420 16GB DDR4").is_none());
        assert!(extract_processor("").is_none());
    }

    #[test]
    fn implausible_generation_is_not_labelled() {
        let processor = extract_processor("i5-45th gen").unwrap_or_default();
        assert!(!processor.to_lowercase().contains("45th gen"), "got {processor}");
    }
}
