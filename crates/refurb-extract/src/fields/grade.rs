use std::sync::LazyLock;

use regex::Captures;

use super::{first_match, Rule};

/// Cosmetic grade rules. Only grades A, B and C are recognised.
pub static GRADE_RULES: LazyLock<Vec<Rule>> = LazyLock::new(|| {
    vec![
        Rule::new("grade_letter", r"(?i)\bgrade[\s:\-]*([abc])\b", grade_label),
        Rule::new("letter_grade", r"(?i)\b([abc])[\s\-]*grade\b", grade_label),
        Rule::new("condition_letter", r"(?i)\bcondition[\s:]*([abc])\b", grade_label),
        Rule::new("letter_condition", r"(?i)\b([abc])\s*condition\b", grade_label),
        Rule::new("cosmetic_letter", r"(?i)\bcosmetic[\s:]*([abc])\b", grade_label),
        Rule::new("letter_cosmetic", r"(?i)\b([abc])\s*cosmetic\b", grade_label),
    ]
});

fn grade_label(caps: &Captures<'_>) -> Option<String> {
    Some(format!("Grade {}", caps[1].to_uppercase()))
}

/// Extracts a cosmetic grade as `"Grade A"`, `"Grade B"` or `"Grade C"`.
#[must_use]
pub fn extract_cosmetic_grade(text: &str) -> Option<String> {
    first_match(&GRADE_RULES, text).or_else(|| substring_grade(text))
}

fn substring_grade(text: &str) -> Option<String> {
    let lower = text.to_lowercase();
    ['a', 'b', 'c'].into_iter().find_map(|letter| {
        let hit = [
            format!("grade {letter}"),
            format!("grade-{letter}"),
            format!("{letter} grade"),
        ]
        .iter()
        .any(|needle| lower.contains(needle.as_str()));
        hit.then(|| format!("Grade {}", letter.to_ascii_uppercase()))
    })
}
