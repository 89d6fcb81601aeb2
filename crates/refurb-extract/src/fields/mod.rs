//! Single-attribute extractors.
//!
//! Every extractor takes an arbitrary text blob and returns a value in its
//! controlled vocabulary or `None`. Nothing here fails loudly: malformed input
//! simply yields absence.
//!
//! Most extractors are an ordered table of [`Rule`]s evaluated first-match-wins.
//! A rule's normalizer may still reject a match (for example an implausible
//! RAM size), in which case later matches of the same rule are tried before
//! falling through to the next rule.

mod brand;
mod display;
mod form_factor;
mod generation;
mod grade;
mod memory;
mod price;
mod processor;
mod storage;

use regex::{Captures, Regex};

use refurb_core::{ProductConfig, ProductType};

pub use brand::extract_brand;
pub use display::{extract_screen_resolution, extract_screen_size};
pub use form_factor::extract_form_factor;
pub use generation::intel_generation;
pub use grade::extract_cosmetic_grade;
pub use memory::extract_ram;
pub use price::{extract_price, has_price_marker};
pub use processor::extract_processor;
pub use storage::extract_storage;

type Normalizer = fn(&Captures<'_>) -> Option<String>;

/// One entry in an extractor's precedence table.
pub struct Rule {
    pub name: &'static str,
    pattern: Regex,
    normalize: Normalizer,
}

impl Rule {
    fn new(name: &'static str, pattern: &str, normalize: Normalizer) -> Self {
        Self {
            name,
            pattern: Regex::new(pattern).expect("valid regex"),
            normalize,
        }
    }

    /// Normalized value of the first match of this rule that the normalizer accepts.
    #[must_use]
    pub fn apply(&self, text: &str) -> Option<String> {
        self.pattern
            .captures_iter(text)
            .find_map(|caps| (self.normalize)(&caps))
    }
}

/// Evaluates `rules` in order and returns the first accepted value.
pub(crate) fn first_match(rules: &[Rule], text: &str) -> Option<String> {
    rules.iter().find_map(|rule| rule.apply(text))
}

/// Capitalizes every letter that follows a non-letter and lowercases the rest
/// (`"core i5-8350u"` -> `"Core I5-8350U"`).
pub(crate) fn title_case(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut prev_alpha = false;
    for c in s.chars() {
        if c.is_alphabetic() {
            if prev_alpha {
                out.extend(c.to_lowercase());
            } else {
                out.extend(c.to_uppercase());
            }
            prev_alpha = true;
        } else {
            out.push(c);
            prev_alpha = false;
        }
    }
    out
}

/// Runs every configuration extractor over `text`.
///
/// Screen attributes are only filled for laptops and form factor only for
/// desktops; an `Unknown` product type gets neither.
#[must_use]
pub fn extract_config(text: &str, product_type: ProductType) -> ProductConfig {
    let mut config = ProductConfig {
        processor: extract_processor(text),
        ram: extract_ram(text),
        storage: extract_storage(text),
        cosmetic_grade: extract_cosmetic_grade(text),
        ..ProductConfig::default()
    };

    match product_type {
        ProductType::Laptop => {
            config.screen_resolution = extract_screen_resolution(text);
            config.screen_size = extract_screen_size(text);
        }
        ProductType::Desktop => {
            config.form_factor = extract_form_factor(text);
        }
        ProductType::Unknown => {}
    }

    config
}

/// Rule tables exposed so tests can enumerate pattern coverage.
pub mod tables {
    pub use super::form_factor::FORM_FACTOR_RULES;
    pub use super::grade::GRADE_RULES;
    pub use super::memory::RAM_RULES;
    pub use super::processor::PROCESSOR_RULES;
    pub use super::storage::STORAGE_RULES;
}

#[cfg(test)]
#[path = "fields_test.rs"]
mod tests;
