//! `scrape` and `parse-page` handlers.
//!
//! Scraping walks every listing of the selected vendors page by page and
//! merges each page into the catalog before the next one is read. A vendor
//! that fails is logged and skipped so the remaining vendors still run.

use std::path::Path;

use anyhow::Context;
use refurb_core::{load_vendors, AppConfig, ProductType, VendorConfig, VendorsFile};
use refurb_extract::{
    crawl_listing, extract_page, CrawlOptions, ExtractionOracle, NoOracle, PageContext,
    PageSource, StopReason,
};
use refurb_store::{record_products, CatalogRepository, JsonCatalogStore, StoreError};

use crate::pages::{DirOracle, DirPageSource};

/// Totals for one vendor run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct VendorRun {
    pub(crate) listings: usize,
    pub(crate) pages_visited: usize,
    pub(crate) pages_failed: usize,
    pub(crate) products_found: usize,
    pub(crate) added: usize,
}

pub(crate) fn crawl_options(config: &AppConfig, max_pages: Option<usize>) -> CrawlOptions {
    CrawlOptions {
        max_pages: max_pages.unwrap_or(config.max_pages).max(1),
        max_empty_pages: config.max_empty_pages,
        title_max_chars: config.title_max_chars,
        min_intel_generation: config.min_intel_generation,
    }
}

fn select_vendors<'a>(
    vendors: &'a VendorsFile,
    filter: Option<&str>,
) -> anyhow::Result<Vec<&'a VendorConfig>> {
    match filter {
        Some(name) => {
            let vendor = vendors
                .find(name)
                .ok_or_else(|| anyhow::anyhow!("vendor '{name}' not found"))?;
            Ok(vec![vendor])
        }
        None => Ok(vendors.vendors.iter().collect()),
    }
}

/// Crawls every listing URL of `vendor`, merging each page through `store`.
///
/// # Errors
///
/// Returns [`StoreError`] if a page cannot be merged. Pages merged before the
/// failure stay in the catalog.
pub(crate) fn scrape_vendor<R, S, O>(
    store: &R,
    source: &mut S,
    oracle: &mut O,
    vendor: &VendorConfig,
    options: &CrawlOptions,
) -> Result<VendorRun, StoreError>
where
    R: CatalogRepository,
    S: PageSource,
    O: ExtractionOracle,
{
    let mut run = VendorRun::default();

    for (base_url, product_type) in vendor.listing_urls() {
        let mut added = 0;
        let summary = crawl_listing(
            source,
            oracle,
            vendor,
            base_url,
            product_type,
            options,
            |_page_url, products| {
                let outcome = record_products(store, &vendor.name, &vendor.website, products)?;
                added += outcome.added;
                Ok::<(), StoreError>(())
            },
        )?;

        if summary.stop_reason == StopReason::FirstPageEmpty {
            tracing::warn!(vendor = %vendor.name, url = base_url, "listing yielded no products");
        }
        run.listings += 1;
        run.pages_visited += summary.pages_visited;
        run.pages_failed += summary.pages_failed;
        run.products_found += summary.products_found;
        run.added += added;
    }

    Ok(run)
}

/// Scrapes one vendor (by name) or all vendors from captured pages.
///
/// # Errors
///
/// Returns an error if the vendor registry cannot be loaded or the named
/// vendor does not exist. Per-vendor failures are logged, not returned.
pub(crate) fn run_scrape(
    config: &AppConfig,
    vendor_filter: Option<&str>,
    max_pages: Option<usize>,
) -> anyhow::Result<()> {
    let vendors = load_vendors(&config.vendors_path)
        .with_context(|| format!("loading {}", config.vendors_path.display()))?;
    let selected = select_vendors(&vendors, vendor_filter)?;

    let store = JsonCatalogStore::new(&config.catalog_path);
    let mut source = DirPageSource::new(&config.pages_dir);
    let mut oracle = DirOracle::new(&config.pages_dir);
    let options = crawl_options(config, max_pages);

    let mut failed = 0usize;
    for vendor in &selected {
        match scrape_vendor(&store, &mut source, &mut oracle, vendor, &options) {
            Ok(run) => {
                tracing::info!(
                    vendor = %vendor.name,
                    pages = run.pages_visited,
                    found = run.products_found,
                    added = run.added,
                    "vendor scraped"
                );
                println!(
                    "{}: {} products found, {} new ({} pages, {} failed)",
                    vendor.name, run.products_found, run.added, run.pages_visited, run.pages_failed
                );
            }
            Err(e) => {
                tracing::error!(vendor = %vendor.name, error = %e, "vendor scrape failed; skipping");
                failed += 1;
            }
        }
    }

    let total = store.load()?.total_products();
    println!(
        "scraped {} vendors ({failed} failed); catalog now holds {total} products",
        selected.len()
    );
    Ok(())
}

/// Parses one captured page without touching the catalog and prints the
/// products as JSON.
///
/// Without `--vendor` the vendor is the one whose website owns `url`.
///
/// # Errors
///
/// Returns an error if the file or vendor registry cannot be read, or no
/// vendor matches.
pub(crate) fn run_parse_page(
    config: &AppConfig,
    file: &Path,
    url: &str,
    vendor_name: Option<&str>,
) -> anyhow::Result<()> {
    let vendors = load_vendors(&config.vendors_path)
        .with_context(|| format!("loading {}", config.vendors_path.display()))?;
    let vendor = match vendor_name {
        Some(name) => vendors.find(name),
        None => vendors.vendors.iter().find(|v| v.owns_url(url)),
    }
    .ok_or_else(|| anyhow::anyhow!("no vendor matches {url}; pass --vendor"))?;

    let text = std::fs::read_to_string(file)
        .with_context(|| format!("reading {}", file.display()))?;
    let product_type = ProductType::from_url(url);
    let ctx = PageContext::new(vendor, url, product_type)
        .with_title_max_chars(config.title_max_chars)
        .with_min_intel_generation(config.min_intel_generation);

    let products = extract_page(&text, &ctx, &mut NoOracle);
    tracing::info!(vendor = %vendor.name, url, count = products.len(), "page parsed");
    println!("{}", serde_json::to_string_pretty(&products)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use refurb_store::MemoryCatalogStore;
    use std::fs;
    use tempfile::TempDir;

    use crate::pages::page_file_stem;

    fn vendor() -> VendorConfig {
        VendorConfig {
            name: "DiscountPC".to_string(),
            website: "https://discountpc.example".to_string(),
            laptop_urls: vec!["https://discountpc.example/laptops".to_string()],
            desktop_urls: vec!["https://discountpc.example/desktops".to_string()],
            page_param: "page".to_string(),
            grade_expansion: false,
            notes: None,
        }
    }

    fn capture(dir: &TempDir, url: &str, text: &str) {
        fs::write(dir.path().join(format!("{}.md", page_file_stem(url))), text)
            .expect("write page");
    }

    #[test]
    fn scrapes_all_listings_into_store() {
        let dir = TempDir::new().expect("tempdir");
        capture(
            &dir,
            "https://discountpc.example/laptops",
            "[Dell Latitude 5420](/p10001-latitude-5420) i5-11th gen 16GB DDR4 256GB SSD $450\n\n\
             [Lenovo ThinkPad T14](/p10002-thinkpad-t14) Ryzen 5 PRO 4650U 8GB DDR4 $329\n",
        );
        capture(
            &dir,
            "https://discountpc.example/laptops?page=2",
            "[HP EliteBook 840 G6](/p10003-elitebook-840) i7-8th gen 16GB RAM $389\n",
        );
        capture(
            &dir,
            "https://discountpc.example/desktops",
            "[Dell OptiPlex 7050 Micro](/p10004-optiplex-7050) i5-7th gen 8GB DDR4 $149\n",
        );

        let store = MemoryCatalogStore::default();
        let mut source = DirPageSource::new(dir.path());
        let options = CrawlOptions {
            max_pages: 5,
            ..CrawlOptions::default()
        };

        let run = scrape_vendor(&store, &mut source, &mut NoOracle, &vendor(), &options)
            .expect("scrape");

        assert_eq!(run.listings, 2);
        assert_eq!(run.products_found, 4);
        assert_eq!(run.added, 4);
        let catalog = store.into_inner();
        let stored = catalog.vendor("DiscountPC").expect("vendor stored");
        assert_eq!(stored.total_products, 4);
        let desktop = &stored.products[3];
        assert_eq!(
            desktop.url.as_deref(),
            Some("https://discountpc.example/p10004-optiplex-7050")
        );
        assert_eq!(desktop.product_type, ProductType::Desktop);
        assert_eq!(desktop.config.form_factor.as_deref(), Some("MFF/Tiny"));
    }

    #[test]
    fn rescrape_adds_nothing() {
        let dir = TempDir::new().expect("tempdir");
        capture(
            &dir,
            "https://discountpc.example/laptops",
            "Dell Latitude 5420 i5-11th gen 16GB DDR4 256GB SSD $450\n",
        );

        let store = MemoryCatalogStore::default();
        let mut source = DirPageSource::new(dir.path());
        let options = CrawlOptions::default();
        scrape_vendor(&store, &mut source, &mut NoOracle, &vendor(), &options).expect("first");
        let again =
            scrape_vendor(&store, &mut source, &mut NoOracle, &vendor(), &options).expect("second");

        assert_eq!(again.products_found, 1);
        assert_eq!(again.added, 0);
    }

    #[test]
    fn select_unknown_vendor_is_error() {
        let vendors = VendorsFile {
            vendors: vec![vendor()],
        };
        assert!(select_vendors(&vendors, Some("nobody")).is_err());
        assert_eq!(
            select_vendors(&vendors, Some("discountpc"))
                .expect("case-insensitive")
                .len(),
            1
        );
        assert_eq!(select_vendors(&vendors, None).expect("all").len(), 1);
    }
}
