//! Read-only views over the stored catalog: dated reports, cross-vendor
//! comparison, and counts.

use std::path::Path;

use chrono::NaiveDate;
use refurb_core::AppConfig;
use refurb_extract::compare;
use refurb_store::{generate_report, summarize, CatalogRepository, JsonCatalogStore};

fn load_catalog(config: &AppConfig) -> anyhow::Result<refurb_core::Catalog> {
    let store = JsonCatalogStore::new(&config.catalog_path);
    let catalog = store.load()?;
    if catalog.vendors.is_empty() {
        anyhow::bail!(
            "catalog {} is empty; run `refurb scrape` first",
            config.catalog_path.display()
        );
    }
    Ok(catalog)
}

pub(crate) fn run_report(
    config: &AppConfig,
    date: Option<NaiveDate>,
    history_dir: Option<&Path>,
) -> anyhow::Result<()> {
    let catalog = load_catalog(config)?;
    let date = date.unwrap_or_else(|| chrono::Local::now().date_naive());
    let history_dir = history_dir.unwrap_or(&config.history_dir);

    let outcome = generate_report(&catalog, history_dir, date)?;
    println!("report written to {}", outcome.path.display());
    match &outcome.baseline {
        Some(baseline) => println!("compared against {}", baseline.display()),
        None => println!("no earlier report found; every row is NEW"),
    }
    println!(
        "{} rows: {} new, {} up, {} down, {} unchanged",
        outcome.rows, outcome.new, outcome.up, outcome.down, outcome.same
    );
    Ok(())
}

pub(crate) fn run_compare(config: &AppConfig, include_single_site: bool) -> anyhow::Result<()> {
    let catalog = load_catalog(config)?;
    let report = compare(catalog.products(), include_single_site);
    tracing::info!(
        groups = report.total_products,
        unique = report.total_unique_products,
        "comparison built"
    );
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

pub(crate) fn run_summary(config: &AppConfig) -> anyhow::Result<()> {
    let catalog = load_catalog(config)?;
    let summary = summarize(&catalog);

    for vendor in &summary.vendors {
        let brands: Vec<String> = vendor
            .by_brand
            .iter()
            .map(|(brand, count)| format!("{brand} {count}"))
            .collect();
        println!(
            "{:<24} {:>5}  [{}]  last scraped {}",
            vendor.competitor,
            vendor.total_products,
            brands.join(", "),
            vendor.scrape_date
        );
    }
    let brands: Vec<String> = summary
        .by_brand
        .iter()
        .map(|(brand, count)| format!("{brand} {count}"))
        .collect();
    println!(
        "{:<24} {:>5}  [{}]",
        "total",
        summary.total_products,
        brands.join(", ")
    );
    Ok(())
}
