//! Paginated crawl of one vendor listing over an injected page source.
//!
//! Fetching is delegated to a [`PageSource`]; this module only decides which
//! URLs to ask for, when to stop, and how each page becomes products. Every
//! page is handed to a sink before the next one is fetched so the caller can
//! persist incrementally.

use refurb_core::{Product, ProductType, VendorConfig};

use crate::fields::intel_generation;
use crate::grades::{enrich_from_detail, expand_grades_with_tier, tag_grade_fragment};
use crate::mapper::{map_page, PageContext, DEFAULT_TITLE_MAX_CHARS};
use crate::oracle::{normalize_candidate, ExtractionOracle};
use crate::ScrapeError;

/// Supplies rendered page text.
pub trait PageSource {
    /// Returns the page text, or `None` when the page does not exist.
    ///
    /// # Errors
    ///
    /// Returns [`ScrapeError`] when the page could not be retrieved.
    fn fetch(&mut self, url: &str) -> Result<Option<String>, ScrapeError>;
}

#[derive(Debug, Clone)]
pub struct CrawlOptions {
    pub max_pages: usize,
    /// Consecutive empty or failed pages before the crawl stops.
    pub max_empty_pages: usize,
    pub title_max_chars: usize,
    pub min_intel_generation: Option<u8>,
}

impl Default for CrawlOptions {
    fn default() -> Self {
        Self {
            max_pages: 20,
            max_empty_pages: 2,
            title_max_chars: DEFAULT_TITLE_MAX_CHARS,
            min_intel_generation: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    MaxPages,
    FirstPageEmpty,
    ConsecutiveEmpty,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrawlSummary {
    pub pages_visited: usize,
    pub pages_failed: usize,
    pub products_found: usize,
    pub stop_reason: StopReason,
}

/// `true` when the product's Intel generation is known and at least `min`.
/// Without a minimum every product passes.
///
/// A stated processor is the only source consulted; title and model are read
/// only when the processor is absent.
#[must_use]
pub fn meets_min_generation(product: &Product, min: Option<u8>) -> bool {
    let Some(min) = min else {
        return true;
    };
    let generation = match product.config.processor.as_deref().map(str::trim) {
        Some(processor) if !processor.is_empty() => intel_generation(processor),
        _ => intel_generation(&format!("{} {}", product.title, product.model)),
    };
    generation.is_some_and(|generation| generation >= min)
}

/// Extracts the products on one page.
///
/// The oracle is consulted first; when it fails or has nothing, the
/// segmenter and mapper run over the page text.
pub fn extract_page<O>(page_text: &str, ctx: &PageContext, oracle: &mut O) -> Vec<Product>
where
    O: ExtractionOracle + ?Sized,
{
    let from_oracle = match oracle.extract(&ctx.page_url, page_text) {
        Ok(Some(records)) => {
            let products: Vec<Product> = records
                .into_iter()
                .filter_map(|record| normalize_candidate(record, ctx))
                .collect();
            (!products.is_empty()).then_some(products)
        }
        Ok(None) => None,
        Err(e) => {
            tracing::warn!(url = %ctx.page_url, error = %e, "extraction oracle failed; using text segmenter");
            None
        }
    };

    let products = from_oracle.unwrap_or_else(|| map_page(page_text, ctx));
    products
        .into_iter()
        .filter(|p| meets_min_generation(p, ctx.min_intel_generation))
        .collect()
}

/// Visits each product's detail page, fills missing attributes, and splits
/// it into grade variants when the page lists several grades.
///
/// Products without a vendor detail URL, or whose detail page cannot be
/// fetched, pass through unchanged. Variant URLs gain a `#grade-<x>` fragment.
pub fn expand_with_details<S>(
    products: Vec<Product>,
    vendor: &VendorConfig,
    listing_url: &str,
    source: &mut S,
) -> Vec<Product>
where
    S: PageSource + ?Sized,
{
    let mut expanded = Vec::with_capacity(products.len());

    for mut product in products {
        let detail_url = match product.url.as_deref() {
            Some(url) if url != listing_url && vendor.owns_url(url) => url.to_string(),
            _ => {
                expanded.push(product);
                continue;
            }
        };

        let page = match source.fetch(&detail_url) {
            Ok(Some(page)) => page,
            Ok(None) => {
                expanded.push(product);
                continue;
            }
            Err(e) => {
                tracing::warn!(url = %detail_url, error = %e, "detail page unavailable; keeping listing");
                expanded.push(product);
                continue;
            }
        };

        enrich_from_detail(&mut product, &page);
        match expand_grades_with_tier(&product, &page) {
            Some((tier, mut variants)) => {
                tracing::debug!(url = %detail_url, ?tier, count = variants.len(), "expanded grade variants");
                for variant in &mut variants {
                    tag_grade_fragment(variant);
                }
                expanded.extend(variants);
            }
            None => expanded.push(product),
        }
    }

    expanded
}

/// Crawls one listing URL page by page.
///
/// Page 1 is `base_url`; later pages use the vendor's page parameter. The
/// crawl stops after `max_pages`, when the first page yields no products, or
/// after `max_empty_pages` consecutive empty or failed pages. A fetch error is
/// logged and counted as an empty page. Each non-empty page is passed to
/// `sink` before the next page is requested.
///
/// # Errors
///
/// Returns the first error produced by `sink`; pages already sunk stay sunk.
pub fn crawl_listing<S, O, F, E>(
    source: &mut S,
    oracle: &mut O,
    vendor: &VendorConfig,
    base_url: &str,
    product_type: ProductType,
    options: &CrawlOptions,
    mut sink: F,
) -> Result<CrawlSummary, E>
where
    S: PageSource + ?Sized,
    O: ExtractionOracle + ?Sized,
    F: FnMut(&str, Vec<Product>) -> Result<(), E>,
{
    let mut summary = CrawlSummary {
        pages_visited: 0,
        pages_failed: 0,
        products_found: 0,
        stop_reason: StopReason::MaxPages,
    };
    let mut consecutive_empty = 0usize;

    for page_num in 1..=options.max_pages {
        let page_url = vendor.page_url(base_url, page_num);
        summary.pages_visited += 1;

        let page_text = match source.fetch(&page_url) {
            Ok(text) => text,
            Err(e) => {
                tracing::warn!(vendor = %vendor.name, url = %page_url, error = %e, "page fetch failed");
                summary.pages_failed += 1;
                None
            }
        };

        let products = match page_text {
            Some(text) => {
                let ctx = PageContext::new(vendor, &page_url, product_type)
                    .with_title_max_chars(options.title_max_chars)
                    .with_min_intel_generation(options.min_intel_generation);
                let products = extract_page(&text, &ctx, oracle);
                if vendor.grade_expansion {
                    expand_with_details(products, vendor, &page_url, source)
                } else {
                    products
                }
            }
            None => Vec::new(),
        };

        if products.is_empty() {
            tracing::info!(vendor = %vendor.name, url = %page_url, page = page_num, "no products on page");
            if page_num == 1 {
                summary.stop_reason = StopReason::FirstPageEmpty;
                break;
            }
            consecutive_empty += 1;
            if consecutive_empty >= options.max_empty_pages {
                summary.stop_reason = StopReason::ConsecutiveEmpty;
                break;
            }
            continue;
        }

        consecutive_empty = 0;
        summary.products_found += products.len();
        tracing::info!(vendor = %vendor.name, url = %page_url, page = page_num, count = products.len(), "page extracted");
        sink(&page_url, products)?;
    }

    Ok(summary)
}

#[cfg(test)]
#[path = "crawl_test.rs"]
mod tests;
