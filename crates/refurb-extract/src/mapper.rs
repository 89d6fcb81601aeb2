//! Turns one segmented section into at most one candidate [`Product`].

use std::sync::LazyLock;

use regex::Regex;
use serde_json::Value;

use refurb_core::{Brand, Product, ProductType, VendorConfig};

use crate::fields::{extract_brand, extract_config, extract_price, has_price_marker};
use crate::markdown::{clean_markdown, truncate_chars};
use crate::segment::{segment, Section};

pub const DEFAULT_TITLE_MAX_CHARS: usize = 200;

/// Model families with their canonical spelling.
const MODEL_FAMILIES: &[&str] = &[
    "Latitude",
    "Precision",
    "OptiPlex",
    "EliteBook",
    "ProBook",
    "ThinkPad",
    "ThinkCentre",
    "EliteDesk",
    "ProDesk",
];

static FAMILY_MODEL_RE: LazyLock<Regex> = LazyLock::new(|| {
    let families = MODEL_FAMILIES.join("|");
    Regex::new(&format!(
        r"(?i)\b({families})\s+((?:[a-z]+\s+)?[a-z]*\d[a-z0-9]*)"
    ))
    .expect("valid regex")
});
static SIZED_MODEL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(?i)(\w+\s*\d+)\s*(?:inch|")"#).expect("valid regex"));

static LAPTOP_TITLE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(?:latitude|elitebook|probook|thinkpad|zbook|laptop|notebook)")
        .expect("valid regex")
});
static DESKTOP_TITLE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(?:optiplex|elitedesk|prodesk|thinkcentre|desktop|tower|sff|mff|tiny)")
        .expect("valid regex")
});

static ABSOLUTE_DETAIL_URL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)(https?://[^\s"'()\[\]]*?/p\d{5,}-[a-z0-9-]+)"#).expect("valid regex")
});
static RELATIVE_DETAIL_URL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)(?:^|[\s("'\[])(/p\d{5,}-[a-z0-9-]+)"#).expect("valid regex")
});

/// Everything the mapper needs to know about the page a section came from.
#[derive(Debug, Clone)]
pub struct PageContext {
    pub competitor: String,
    pub website: String,
    pub page_url: String,
    pub product_type: ProductType,
    pub title_max_chars: usize,
    /// Drop products whose Intel generation is unknown or below this value.
    pub min_intel_generation: Option<u8>,
}

impl PageContext {
    #[must_use]
    pub fn new(vendor: &VendorConfig, page_url: &str, product_type: ProductType) -> Self {
        Self {
            competitor: vendor.name.clone(),
            website: vendor.website.clone(),
            page_url: page_url.to_string(),
            product_type,
            title_max_chars: DEFAULT_TITLE_MAX_CHARS,
            min_intel_generation: None,
        }
    }

    #[must_use]
    pub fn with_title_max_chars(mut self, max: usize) -> Self {
        self.title_max_chars = max;
        self
    }

    #[must_use]
    pub fn with_min_intel_generation(mut self, generation: Option<u8>) -> Self {
        self.min_intel_generation = generation;
        self
    }

    /// Joins a site-relative path onto the vendor website.
    fn absolute(&self, path: &str) -> Option<String> {
        let base = self.website.trim_end_matches('/');
        (!base.is_empty()).then(|| format!("{base}{path}"))
    }
}

/// Extracts a model such as `"Latitude 5420"` from a title.
///
/// Known families keep their family name followed by the first token that
/// contains a digit, optionally preceded by one word (`"Precision Tower 3620"`).
/// Otherwise a `<word><number>` token directly before a screen size is used.
/// Returns an empty string when nothing matches.
#[must_use]
pub fn extract_model(title: &str) -> String {
    if let Some(caps) = FAMILY_MODEL_RE.captures(title) {
        let family = MODEL_FAMILIES
            .iter()
            .find(|f| f.eq_ignore_ascii_case(&caps[1]))
            .copied()
            .unwrap_or(&caps[1]);
        return format!("{family} {}", caps[2].trim());
    }
    SIZED_MODEL_RE
        .captures(title)
        .map(|caps| caps[1].trim().to_string())
        .unwrap_or_default()
}

/// Infers laptop vs desktop from family names and chassis words in a title.
#[must_use]
pub fn product_type_from_title(title: &str) -> ProductType {
    if LAPTOP_TITLE_RE.is_match(title) {
        ProductType::Laptop
    } else if DESKTOP_TITLE_RE.is_match(title) {
        ProductType::Desktop
    } else {
        ProductType::Unknown
    }
}

/// Finds a product detail link (`/p<5+ digits>-<slug>`) inside a section.
#[must_use]
pub fn extract_detail_url(section_text: &str, ctx: &PageContext) -> Option<String> {
    if let Some(caps) = ABSOLUTE_DETAIL_URL_RE.captures(section_text) {
        return Some(caps[1].to_string());
    }
    RELATIVE_DETAIL_URL_RE
        .captures(section_text)
        .and_then(|caps| ctx.absolute(&caps[1]))
}

fn is_meaningful_title(line: &str) -> bool {
    line.chars().count() > 10 && !line.starts_with(['[', '*', '!', '-', '+'])
}

/// Builds a candidate product from one section.
///
/// Returns `None` when the section has no usable title line or no parseable
/// price. Brand may come back `Unknown`; callers validate before persisting.
#[must_use]
pub fn map_section(section: &Section<'_>, ctx: &PageContext) -> Option<Product> {
    let lines: Vec<&str> = section
        .lines
        .iter()
        .map(|l| l.trim())
        .filter(|l| !l.is_empty())
        .collect();

    let title_line = lines
        .iter()
        .find(|l| extract_brand(l).is_some())
        .or_else(|| lines.iter().find(|l| is_meaningful_title(l)))
        .copied()?;

    let (price_line, price) = lines
        .iter()
        .filter(|l| has_price_marker(l))
        .find_map(|l| extract_price(l).map(|p| (*l, p)))?;

    let product_type = match ctx.product_type {
        ProductType::Unknown => product_type_from_title(title_line),
        known => known,
    };

    let joined = section.joined();
    let brand = extract_brand(title_line).unwrap_or(Brand::Unknown);
    let title = truncate_chars(&clean_markdown(title_line), ctx.title_max_chars);

    let mut product = Product::new(
        brand,
        &extract_model(title_line),
        product_type,
        &title,
        price,
    );
    product.config = extract_config(&joined, product_type);
    product.url = Some(
        extract_detail_url(&section.lines.join("\n"), ctx).unwrap_or_else(|| ctx.page_url.clone()),
    );
    product.competitor = Some(ctx.competitor.clone());
    product
        .extra
        .insert("price_text".to_string(), Value::from(price_line));

    Some(product)
}

/// Segments a page and maps every section, keeping only products that pass
/// validation (known brand, positive price).
#[must_use]
pub fn map_page(text: &str, ctx: &PageContext) -> Vec<Product> {
    segment(text)
        .iter()
        .filter_map(|section| map_section(section, ctx))
        .filter_map(|product| match product.validate() {
            Ok(product) => Some(product),
            Err(e) => {
                tracing::debug!(url = %ctx.page_url, reason = %e, "dropping section");
                None
            }
        })
        .collect()
}

#[cfg(test)]
#[path = "mapper_test.rs"]
mod tests;
