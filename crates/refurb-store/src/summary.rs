use std::collections::BTreeMap;

use refurb_core::Catalog;
use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct VendorSummary {
    pub competitor: String,
    pub website: String,
    pub scrape_date: String,
    pub total_products: usize,
    pub by_brand: BTreeMap<String, usize>,
    pub by_type: BTreeMap<String, usize>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CatalogSummary {
    pub total_products: usize,
    pub by_brand: BTreeMap<String, usize>,
    pub vendors: Vec<VendorSummary>,
}

/// Per-vendor and per-brand product counts, vendors in name order.
///
/// Counts come from the stored product lists, not from the `total_products`
/// field, so a hand-edited catalog still reports what it actually holds.
#[must_use]
pub fn summarize(catalog: &Catalog) -> CatalogSummary {
    let mut by_brand: BTreeMap<String, usize> = BTreeMap::new();
    let vendors = catalog
        .vendors
        .iter()
        .map(|(name, vendor)| {
            let mut vendor_brands: BTreeMap<String, usize> = BTreeMap::new();
            let mut vendor_types: BTreeMap<String, usize> = BTreeMap::new();
            for product in &vendor.products {
                *vendor_brands
                    .entry(product.brand.as_str().to_string())
                    .or_default() += 1;
                *vendor_types
                    .entry(product.product_type.as_str().to_string())
                    .or_default() += 1;
            }
            for (brand, count) in &vendor_brands {
                *by_brand.entry(brand.clone()).or_default() += count;
            }
            VendorSummary {
                competitor: name.clone(),
                website: vendor.website.clone(),
                scrape_date: vendor.scrape_date.clone(),
                total_products: vendor.products.len(),
                by_brand: vendor_brands,
                by_type: vendor_types,
            }
        })
        .collect();

    CatalogSummary {
        total_products: catalog.total_products(),
        by_brand,
        vendors,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::merge_vendor;
    use refurb_core::{Brand, Product, ProductType};

    fn product(brand: Brand, model: &str, product_type: ProductType, price: f64) -> Product {
        Product::new(brand, model, product_type, &format!("{brand} {model}"), price)
    }

    #[test]
    fn counts_per_vendor_and_brand() {
        let mut catalog = Catalog::default();
        merge_vendor(
            &mut catalog,
            "ShopB",
            "https://b.example",
            vec![
                product(Brand::Dell, "OptiPlex 7050", ProductType::Desktop, 199.0),
                product(Brand::Hp, "EliteBook 840", ProductType::Laptop, 289.0),
            ],
        );
        merge_vendor(
            &mut catalog,
            "ShopA",
            "https://a.example",
            vec![product(Brand::Dell, "Latitude 5420", ProductType::Laptop, 450.0)],
        );

        let summary = summarize(&catalog);

        assert_eq!(summary.total_products, 3);
        assert_eq!(summary.by_brand.get("Dell"), Some(&2));
        assert_eq!(summary.by_brand.get("HP"), Some(&1));
        let names: Vec<&str> = summary.vendors.iter().map(|v| v.competitor.as_str()).collect();
        assert_eq!(names, ["ShopA", "ShopB"]);
        assert_eq!(summary.vendors[1].by_type.get("Desktop"), Some(&1));
    }

    #[test]
    fn empty_catalog_summarizes_to_zero() {
        let summary = summarize(&Catalog::default());
        assert_eq!(summary.total_products, 0);
        assert!(summary.vendors.is_empty());
    }
}
