//! Validation of structured records produced by an external extraction oracle.
//!
//! The oracle (typically an AI model reading the rendered page) is opaque: it
//! returns candidate records or nothing. Its records go through the same
//! brand-allowlist and mandatory-price rules as self-extracted ones.

use serde::{Deserialize, Serialize};

use refurb_core::{Brand, Product, ProductConfig, ProductType};

use crate::fields::{extract_brand, extract_config, extract_price};
use crate::mapper::{extract_model, product_type_from_title, PageContext};
use crate::markdown::{clean_markdown, truncate_chars};
use crate::ScrapeError;

/// A price as the oracle reports it: a bare number or display text (`"$1,299.00"`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawPrice {
    Number(f64),
    Text(String),
}

impl RawPrice {
    #[must_use]
    pub fn value(&self) -> Option<f64> {
        match self {
            RawPrice::Number(n) => (n.is_finite() && *n > 0.0).then_some(*n),
            RawPrice::Text(text) => extract_price(text),
        }
    }
}

/// A loosely-typed listing as returned by the oracle. Every field may be absent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CandidateRecord {
    pub brand: Option<String>,
    pub model: Option<String>,
    pub product_type: Option<String>,
    pub title: Option<String>,
    pub price: Option<RawPrice>,
    pub url: Option<String>,
    pub config: Option<ProductConfig>,
    pub availability: Option<String>,
}

/// Source of structured records for a page.
pub trait ExtractionOracle {
    /// Returns the records found on the page, or `None` when the oracle has
    /// nothing to offer and the deterministic path should run.
    ///
    /// # Errors
    ///
    /// Returns [`ScrapeError`] when the oracle itself fails.
    fn extract(
        &mut self,
        page_url: &str,
        page_text: &str,
    ) -> Result<Option<Vec<CandidateRecord>>, ScrapeError>;
}

/// Oracle that never answers; every page takes the segmenter path.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoOracle;

impl ExtractionOracle for NoOracle {
    fn extract(
        &mut self,
        _page_url: &str,
        _page_text: &str,
    ) -> Result<Option<Vec<CandidateRecord>>, ScrapeError> {
        Ok(None)
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

fn parse_product_type(raw: Option<&str>) -> ProductType {
    match raw.map(|s| s.trim().to_lowercase()).as_deref() {
        Some("laptop" | "notebook") => ProductType::Laptop,
        Some("desktop" | "workstation") => ProductType::Desktop,
        _ => ProductType::Unknown,
    }
}

/// Converts an oracle record into a validated [`Product`].
///
/// Returns `None` when the brand is outside the allowlist, the price is
/// missing or non-positive, or there is neither a title nor a model.
/// Relative URLs are resolved against the vendor website and absent config
/// fields are filled by running the field extractors over the title.
#[must_use]
pub fn normalize_candidate(record: CandidateRecord, ctx: &PageContext) -> Option<Product> {
    let title = non_blank(record.title)
        .map(|t| truncate_chars(&clean_markdown(&t), ctx.title_max_chars));
    let model = non_blank(record.model);
    let display_title = title.or_else(|| model.clone())?;

    // An explicit off-list brand is final; only a missing one is read from the title.
    let brand = match non_blank(record.brand) {
        Some(named) => Brand::from_name(&named),
        None => extract_brand(&display_title).unwrap_or(Brand::Unknown),
    };

    let Some(price) = record.price.as_ref().and_then(RawPrice::value) else {
        tracing::debug!(title = %display_title, "dropping oracle record without price");
        return None;
    };

    let product_type = match parse_product_type(record.product_type.as_deref()) {
        ProductType::Unknown => match ctx.product_type {
            ProductType::Unknown => product_type_from_title(&display_title),
            known => known,
        },
        known => known,
    };

    let model = model.unwrap_or_else(|| extract_model(&display_title));
    let mut product = Product::new(brand, &model, product_type, &display_title, price);

    let mut config = record.config.unwrap_or_default();
    config.fill_missing(&extract_config(&display_title, product_type));
    product.config = config;

    product.url = Some(match non_blank(record.url) {
        Some(url) if url.starts_with("http://") || url.starts_with("https://") => url,
        Some(path) => {
            let base = ctx.website.trim_end_matches('/');
            if path.starts_with('/') {
                format!("{base}{path}")
            } else {
                format!("{base}/{path}")
            }
        }
        None => ctx.page_url.clone(),
    });
    product.availability = non_blank(record.availability);
    product.competitor = Some(ctx.competitor.clone());

    match product.validate() {
        Ok(product) => Some(product),
        Err(e) => {
            tracing::debug!(url = %ctx.page_url, reason = %e, "dropping oracle record");
            None
        }
    }
}
