//! Grade-variant expansion of detail pages.
//!
//! Some vendors list one summary row per machine while the detail page offers
//! several cosmetic grades at different prices. [`expand_grades`] turns such a
//! page into one product per grade using a three-tier cascade; the first tier
//! that yields anything wins.

use std::sync::LazyLock;

use regex::Regex;
use serde_json::Value;

use refurb_core::Product;

use crate::fields::extract_config;
use crate::mapper::extract_model;

/// Half-width, in characters, of the window searched around a grade mention.
const PROXIMITY_WINDOW: usize = 100;

/// At most one variant per grade in the positional tier.
const POSITIONAL_GRADES: [char; 3] = ['C', 'B', 'A'];

static GRADE_PRICE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)grade\s*([abc])\s*[:\-]?\s*\$\s*(\d+(?:,\d{3})*(?:\.\d{2})?)")
        .expect("valid regex")
});
static GRADE_MENTION_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\bgrade\s+([abc])\b").expect("valid regex"));
static DOLLAR_PRICE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\$(\d+(?:,\d{3})*(?:\.\d{2})?)").expect("valid regex"));

/// Which cascade tier produced a set of variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExpansionTier {
    /// Explicit `Grade X: $price` pairs.
    StructuredPairs,
    /// A price within the window around a grade mention.
    Proximity,
    /// Distinct page prices assigned C, B, A from cheapest up.
    Positional,
}

/// Explodes `original` into grade-specific variants using the detail page text.
///
/// Returns an empty vector when no tier finds anything; the caller then keeps
/// the original product.
#[must_use]
pub fn expand_grades(original: &Product, page_text: &str) -> Vec<Product> {
    expand_grades_with_tier(original, page_text)
        .map(|(_, variants)| variants)
        .unwrap_or_default()
}

/// Like [`expand_grades`] but also reports which tier fired.
#[must_use]
pub fn expand_grades_with_tier(
    original: &Product,
    page_text: &str,
) -> Option<(ExpansionTier, Vec<Product>)> {
    let tiers: [(ExpansionTier, fn(&str) -> Vec<(char, f64)>); 3] = [
        (ExpansionTier::StructuredPairs, structured_pairs),
        (ExpansionTier::Proximity, proximity_pairs),
        (ExpansionTier::Positional, positional_pairs),
    ];

    tiers.into_iter().find_map(|(tier, find_pairs)| {
        let pairs = find_pairs(page_text);
        (!pairs.is_empty()).then(|| {
            let variants = pairs
                .into_iter()
                .map(|(grade, price)| make_variant(original, grade, price))
                .collect();
            (tier, variants)
        })
    })
}

fn parse_amount(raw: &str) -> Option<f64> {
    raw.replace(',', "")
        .parse::<f64>()
        .ok()
        .filter(|p| p.is_finite() && *p > 0.0)
}

fn grade_letter(raw: &str) -> Option<char> {
    raw.chars().next().map(|c| c.to_ascii_uppercase())
}

fn structured_pairs(text: &str) -> Vec<(char, f64)> {
    let mut pairs: Vec<(char, f64)> = Vec::new();
    for caps in GRADE_PRICE_RE.captures_iter(text) {
        let (Some(grade), Some(price)) = (grade_letter(&caps[1]), parse_amount(&caps[2])) else {
            continue;
        };
        if !pairs.iter().any(|&(g, p)| g == grade && p.to_bits() == price.to_bits()) {
            pairs.push((grade, price));
        }
    }
    pairs
}

fn proximity_pairs(text: &str) -> Vec<(char, f64)> {
    let lower = text.to_lowercase();
    let mut pairs = Vec::new();

    for letter in ['a', 'b', 'c'] {
        let Some(mention) = GRADE_MENTION_RE
            .captures_iter(&lower)
            .find(|caps| caps[1].starts_with(letter))
            .and_then(|caps| caps.get(0))
        else {
            continue;
        };

        let window = char_window(&lower, mention.start(), PROXIMITY_WINDOW);
        let price = DOLLAR_PRICE_RE
            .captures(window)
            .and_then(|caps| parse_amount(&caps[1]));
        if let Some(price) = price {
            pairs.push((letter.to_ascii_uppercase(), price));
        }
    }

    pairs
}

fn positional_pairs(text: &str) -> Vec<(char, f64)> {
    let mut prices: Vec<f64> = DOLLAR_PRICE_RE
        .captures_iter(text)
        .filter_map(|caps| parse_amount(&caps[1]))
        .collect();
    prices.sort_by(f64::total_cmp);
    prices.dedup_by(|a, b| a.to_bits() == b.to_bits());

    if prices.len() < 2 {
        return Vec::new();
    }
    POSITIONAL_GRADES.into_iter().zip(prices).collect()
}

/// Slice of `text` spanning `radius` characters either side of the byte
/// offset `pos`, which must lie on a char boundary.
fn char_window(text: &str, pos: usize, radius: usize) -> &str {
    let start = text[..pos]
        .char_indices()
        .rev()
        .take(radius)
        .last()
        .map_or(pos, |(i, _)| i);
    let end = text[pos..]
        .char_indices()
        .nth(radius)
        .map_or(text.len(), |(i, _)| pos + i);

    &text[start..end]
}

fn make_variant(original: &Product, grade: char, price: f64) -> Product {
    let mut variant = original.clone();
    variant.price = price;
    variant.config.cosmetic_grade = Some(format!("Grade {grade}"));
    variant.title = format!("{} (Grade {grade})", original.title);
    variant
        .extra
        .insert("price_text".to_string(), Value::from(format!("${price:.2}")));
    variant
}

/// Appends a `#grade-<x>` fragment to a variant's URL so each grade keeps its
/// own catalog entry. Products without a URL or grade are left alone.
pub fn tag_grade_fragment(product: &mut Product) {
    let Some(letter) = product
        .config
        .cosmetic_grade
        .as_deref()
        .and_then(|g| g.trim().chars().last())
        .map(|c| c.to_ascii_lowercase())
    else {
        return;
    };
    if let Some(url) = product.url.as_mut() {
        if let Some(idx) = url.find('#') {
            url.truncate(idx);
        }
        url.push_str(&format!("#grade-{letter}"));
    }
}

/// Fills absent configuration fields, and an empty model, from a detail page.
///
/// Existing values are never replaced. Returns how many fields were filled.
pub fn enrich_from_detail(product: &mut Product, page_text: &str) -> usize {
    let detail = extract_config(page_text, product.product_type);
    let mut filled = product.config.fill_missing(&detail);

    if product.model.trim().is_empty() {
        let model = extract_model(page_text);
        if !model.is_empty() {
            product.model = model;
            filled += 1;
        }
    }
    filled
}

#[cfg(test)]
mod tests {
    use refurb_core::{Brand, ProductType};

    use super::*;

    fn make_original() -> Product {
        let mut p = Product::new(
            Brand::Dell,
            "Latitude 5420",
            ProductType::Laptop,
            "Dell Latitude 5420",
            450.0,
        );
        p.url = Some("https://www.pcliquidations.com/p125225-dell-latitude-5420".to_string());
        p.config.ram = Some("16GB".to_string());
        p
    }

    fn summary(variants: &[Product]) -> Vec<(String, f64)> {
        variants
            .iter()
            .map(|v| (v.config.cosmetic_grade.clone().unwrap_or_default(), v.price))
            .collect()
    }

    #[test]
    fn structured_pairs_tier() {
        let page = "Choose condition. Grade A: $500 ... Grade B: $420 ... Grade C: $380";
        let (tier, variants) = expand_grades_with_tier(&make_original(), page).unwrap();

        assert_eq!(tier, ExpansionTier::StructuredPairs);
        assert_eq!(
            summary(&variants),
            vec![
                ("Grade A".to_string(), 500.0),
                ("Grade B".to_string(), 420.0),
                ("Grade C".to_string(), 380.0),
            ]
        );
        assert_eq!(variants[0].title, "Dell Latitude 5420 (Grade A)");
        assert_eq!(variants[0].config.ram.as_deref(), Some("16GB"));
        assert_eq!(variants[0].url, make_original().url);
    }

    #[test]
    fn structured_pairs_deduplicated() {
        let page = "Grade A - $1,050.00 | Grade A - $1,050.00 | Grade B $999";
        let variants = expand_grades(&make_original(), page);
        assert_eq!(
            summary(&variants),
            vec![("Grade A".to_string(), 1050.0), ("Grade B".to_string(), 999.0)]
        );
    }

    #[test]
    fn proximity_tier() {
        let page = format!(
            "Grade A units ship with a new battery. Price $515.\n{}\n\
             Looking for value? Grade B (light scratches) now only $449",
            "-".repeat(120)
        );
        let (tier, variants) = expand_grades_with_tier(&make_original(), &page).unwrap();
        assert_eq!(tier, ExpansionTier::Proximity);
        assert_eq!(
            summary(&variants),
            vec![("Grade A".to_string(), 515.0), ("Grade B".to_string(), 449.0)]
        );
    }

    #[test]
    fn positional_tier_assigns_cheapest_to_c() {
        let page = "Options: $610 / $540 / $540 / $480 / $700";
        let (tier, variants) = expand_grades_with_tier(&make_original(), page).unwrap();
        assert_eq!(tier, ExpansionTier::Positional);
        assert_eq!(
            summary(&variants),
            vec![
                ("Grade C".to_string(), 480.0),
                ("Grade B".to_string(), 540.0),
                ("Grade A".to_string(), 610.0),
            ]
        );
    }

    #[test]
    fn single_price_yields_nothing() {
        assert!(expand_grades(&make_original(), "Only $450 today").is_empty());
        assert!(expand_grades(&make_original(), "").is_empty());
    }

    #[test]
    fn proximity_window_counts_characters() {
        let page = format!("$300 {} grade a only", "é".repeat(60));
        let (tier, variants) = expand_grades_with_tier(&make_original(), &page).unwrap();
        assert_eq!(tier, ExpansionTier::Proximity);
        assert_eq!(summary(&variants), vec![("Grade A".to_string(), 300.0)]);
    }

    #[test]
    fn char_window_spans_radius_characters() {
        let text = "ab\u{e9}\u{e9}Xcd\u{fc}";
        let pos = text.find('X').unwrap();
        assert_eq!(char_window(text, pos, 2), "\u{e9}\u{e9}Xc");
        assert_eq!(char_window(text, pos, 10), text);
        assert_eq!(char_window(text, 0, 1), "a");
    }

    #[test]
    fn window_is_char_safe() {
        let page = format!("{} grade a {} $300 and $200", "é".repeat(80), "ü".repeat(30));
        let variants = expand_grades(&make_original(), &page);
        assert_eq!(summary(&variants), vec![("Grade A".to_string(), 300.0)]);
    }

    #[test]
    fn grade_fragment_tags_url() {
        let mut v = make_original();
        v.config.cosmetic_grade = Some("Grade B".to_string());
        tag_grade_fragment(&mut v);
        assert_eq!(
            v.url.as_deref(),
            Some("https://www.pcliquidations.com/p125225-dell-latitude-5420#grade-b")
        );
        tag_grade_fragment(&mut v);
        assert!(v.url.as_deref().unwrap().ends_with("5420#grade-b"));
    }

    #[test]
    fn enrichment_fills_only_missing() {
        let mut p = make_original();
        p.model = String::new();
        let page = "Dell Latitude 5420 | Intel i5-11th gen | 8GB DDR4 | 256GB SSD | Grade A";
        let filled = enrich_from_detail(&mut p, page);

        assert_eq!(p.config.ram.as_deref(), Some("16GB"));
        assert_eq!(p.config.processor.as_deref(), Some("I5-11th gen"));
        assert_eq!(p.config.storage.as_deref(), Some("256GB SSD"));
        assert_eq!(p.model, "Latitude 5420");
        assert!(filled >= 4);
    }
}
