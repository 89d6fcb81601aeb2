//! Incremental, append-only merging of scraped products into the catalog.

use std::collections::HashSet;

use refurb_core::{Catalog, CompetitorCatalog, Product};
use serde::Serialize;

use crate::{CatalogRepository, StoreError};

/// Counts from one [`merge_vendor`] call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct MergeOutcome {
    /// Products the vendor had before the merge.
    pub existing: usize,
    pub added: usize,
    /// Incoming products whose identity key was already present.
    pub duplicates: usize,
    /// Incoming products rejected by validation (unknown brand, unusable price).
    pub rejected: usize,
    /// Products the vendor has after the merge.
    pub total: usize,
}

/// Merges `products` into the entry for `vendor`, creating it on first use.
///
/// Existing products are never removed, reordered, or modified. An incoming
/// product is appended only when no product with the same identity key is
/// already present; within one batch the first occurrence wins. Every incoming
/// product is stamped with the vendor name and validated before it is
/// considered. The vendor's counters and `scrape_date` are refreshed even when
/// nothing was added.
pub fn merge_vendor(
    catalog: &mut Catalog,
    vendor: &str,
    website: &str,
    products: Vec<Product>,
) -> MergeOutcome {
    let entry = catalog
        .vendors
        .entry(vendor.to_string())
        .or_insert_with(|| CompetitorCatalog::new(vendor, website));
    if entry.website.is_empty() {
        entry.website = website.to_string();
    }

    let mut outcome = MergeOutcome {
        existing: entry.products.len(),
        ..MergeOutcome::default()
    };
    let mut known: HashSet<String> = entry.products.iter().map(Product::identity_key).collect();

    for mut product in products {
        product.competitor = Some(vendor.to_string());
        let product = match product.validate() {
            Ok(product) => product,
            Err(e) => {
                tracing::debug!(vendor, error = %e, "rejected product during merge");
                outcome.rejected += 1;
                continue;
            }
        };
        if known.insert(product.identity_key()) {
            entry.products.push(product);
            outcome.added += 1;
        } else {
            outcome.duplicates += 1;
        }
    }

    outcome.total = entry.products.len();
    entry.total_products = outcome.total;
    entry.existing_products = Some(outcome.existing);
    entry.new_additions = Some(outcome.added);
    entry.touch();
    outcome
}

/// Merges one batch (typically one crawled page) through `repo` as a single
/// transaction.
///
/// # Errors
///
/// Returns [`StoreError`] if the catalog cannot be locked, read, or written.
/// On error the stored catalog is unchanged.
pub fn record_products<R: CatalogRepository>(
    repo: &R,
    vendor: &str,
    website: &str,
    products: Vec<Product>,
) -> Result<MergeOutcome, StoreError> {
    let outcome = repo.transaction(|catalog| merge_vendor(catalog, vendor, website, products))?;
    tracing::info!(
        vendor,
        added = outcome.added,
        duplicates = outcome.duplicates,
        rejected = outcome.rejected,
        total = outcome.total,
        "merged products into catalog"
    );
    Ok(outcome)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MemoryCatalogStore;
    use refurb_core::{Brand, ProductType};

    fn listing(url: Option<&str>, model: &str, price: f64) -> Product {
        let mut p = Product::new(
            Brand::Dell,
            model,
            ProductType::Laptop,
            &format!("Dell {model}"),
            price,
        );
        p.url = url.map(str::to_string);
        p
    }

    fn batch() -> Vec<Product> {
        vec![
            listing(Some("https://shop.example/p10001-a"), "Latitude 5420", 450.0),
            listing(Some("https://shop.example/p10002-b"), "Latitude 7490", 329.0),
            listing(None, "OptiPlex 7050", 199.0),
        ]
    }

    #[test]
    fn first_merge_creates_vendor_entry() {
        let mut catalog = Catalog::default();
        let outcome = merge_vendor(&mut catalog, "ShopA", "https://shop.example", batch());

        assert_eq!(outcome.existing, 0);
        assert_eq!(outcome.added, 3);
        let vendor = catalog.vendor("ShopA").expect("vendor created");
        assert_eq!(vendor.website, "https://shop.example");
        assert_eq!(vendor.total_products, 3);
        assert_eq!(vendor.new_additions, Some(3));
        assert!(vendor
            .products
            .iter()
            .all(|p| p.competitor.as_deref() == Some("ShopA")));
    }

    #[test]
    fn merging_same_batch_twice_adds_nothing() {
        let mut catalog = Catalog::default();
        merge_vendor(&mut catalog, "ShopA", "https://shop.example", batch());
        let second = merge_vendor(&mut catalog, "ShopA", "https://shop.example", batch());

        assert_eq!(second.added, 0);
        assert_eq!(second.duplicates, 3);
        let vendor = catalog.vendor("ShopA").expect("vendor");
        assert_eq!(vendor.total_products, 3);
        assert_eq!(vendor.existing_products, Some(3));
        assert_eq!(vendor.new_additions, Some(0));
    }

    #[test]
    fn merge_never_drops_existing_entries() {
        let mut catalog = Catalog::default();
        merge_vendor(&mut catalog, "ShopA", "https://shop.example", batch());
        let before = catalog.vendor("ShopA").expect("vendor").products.clone();

        // A later partial crawl sees only one old listing, with a new price.
        let partial = vec![
            listing(Some("https://shop.example/p10002-b"), "Latitude 7490", 299.0),
            listing(Some("https://shop.example/p10003-c"), "Precision 5540", 899.0),
        ];
        merge_vendor(&mut catalog, "ShopA", "https://shop.example", partial);

        let after = &catalog.vendor("ShopA").expect("vendor").products;
        assert_eq!(after.len(), 4);
        assert_eq!(&after[..before.len()], &before[..]);
        assert_eq!(after[1].price, 329.0, "existing entry must not be updated");
        assert_eq!(after[3].model, "Precision 5540");
    }

    #[test]
    fn first_occurrence_in_batch_wins() {
        let mut catalog = Catalog::default();
        let products = vec![
            listing(Some("https://shop.example/p10001-a"), "Latitude 5420", 450.0),
            listing(Some("https://shop.example/p10001-a"), "Latitude 5420", 399.0),
        ];
        let outcome = merge_vendor(&mut catalog, "ShopA", "https://shop.example", products);

        assert_eq!(outcome.added, 1);
        assert_eq!(outcome.duplicates, 1);
        assert_eq!(catalog.vendor("ShopA").expect("vendor").products[0].price, 450.0);
    }

    #[test]
    fn urlless_products_dedupe_on_brand_model_price() {
        let mut catalog = Catalog::default();
        let products = vec![
            listing(None, "OptiPlex 7050", 199.0),
            listing(None, "OptiPlex 7050", 199.0),
            listing(None, "OptiPlex 7050", 219.0),
        ];
        let outcome = merge_vendor(&mut catalog, "ShopA", "https://shop.example", products);
        assert_eq!(outcome.added, 2);
    }

    #[test]
    fn invalid_products_are_rejected() {
        let mut catalog = Catalog::default();
        let mut unknown = listing(Some("https://shop.example/p10009-x"), "Surface 3", 299.0);
        unknown.brand = Brand::Unknown;
        let free = listing(Some("https://shop.example/p10010-y"), "Latitude 3510", 0.0);

        let outcome = merge_vendor(
            &mut catalog,
            "ShopA",
            "https://shop.example",
            vec![unknown, free, listing(None, "Latitude 3510", 249.0)],
        );

        assert_eq!(outcome.rejected, 2);
        assert_eq!(outcome.added, 1);
    }

    #[test]
    fn vendors_are_merged_independently() {
        let mut catalog = Catalog::default();
        merge_vendor(&mut catalog, "ShopA", "https://a.example", batch());
        merge_vendor(&mut catalog, "ShopB", "https://b.example", batch());

        assert_eq!(catalog.vendors.len(), 2);
        assert_eq!(catalog.total_products(), 6);
    }

    #[test]
    fn record_products_goes_through_repository() {
        let repo = MemoryCatalogStore::default();
        let outcome = record_products(&repo, "ShopA", "https://shop.example", batch())
            .expect("memory store never fails");
        assert_eq!(outcome.added, 3);

        let outcome = record_products(&repo, "ShopA", "https://shop.example", batch())
            .expect("memory store never fails");
        assert_eq!(outcome.added, 0);
        assert_eq!(repo.into_inner().total_products(), 3);
    }
}
