//! Groups equivalent listings from different vendors for price comparison.

use std::collections::{HashMap, HashSet};

use serde::Serialize;

use refurb_core::{Brand, Product, ProductConfig, ProductType, NOT_SPECIFIED};

use crate::signature::product_signature;

/// Display-oriented specs; holes read `"Not specified"`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NormalizedSpecs {
    pub processor: String,
    pub ram: String,
    pub storage: String,
    /// Laptops only.
    pub screen_resolution: Option<String>,
    /// Desktops only.
    pub form_factor: Option<String>,
    pub cosmetic_grade: String,
}

impl NormalizedSpecs {
    #[must_use]
    pub fn from_product(product: &Product) -> Self {
        let config = &product.config;
        let or_placeholder =
            |value: &Option<String>| value.clone().unwrap_or_else(|| NOT_SPECIFIED.to_string());

        Self {
            processor: or_placeholder(&config.processor),
            ram: or_placeholder(&config.ram),
            storage: or_placeholder(&config.storage),
            screen_resolution: (product.product_type == ProductType::Laptop)
                .then(|| or_placeholder(&config.screen_resolution)),
            form_factor: (product.product_type == ProductType::Desktop)
                .then(|| or_placeholder(&config.form_factor)),
            cosmetic_grade: or_placeholder(&config.cosmetic_grade),
        }
    }
}

/// One vendor's offer inside a comparison group.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SiteOffer {
    pub competitor: String,
    pub price: f64,
    pub url: Option<String>,
    pub availability: String,
    pub raw_config: ProductConfig,
}

impl SiteOffer {
    fn known_price(&self) -> Option<f64> {
        (self.price.is_finite() && self.price > 0.0).then_some(self.price)
    }
}

/// Listings sharing one signature, with price statistics over known prices.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProductGroup {
    pub signature: String,
    pub brand: Brand,
    pub model: String,
    pub product_type: ProductType,
    pub title: String,
    pub normalized_specs: NormalizedSpecs,
    pub sites: Vec<SiteOffer>,
    pub lowest_price: Option<f64>,
    pub highest_price: Option<f64>,
    pub price_range: Option<f64>,
    pub avg_price: Option<f64>,
}

impl ProductGroup {
    fn seed(signature: String, product: &Product) -> Self {
        Self {
            signature,
            brand: product.brand,
            model: product.model.clone(),
            product_type: product.product_type,
            title: product.title.clone(),
            normalized_specs: NormalizedSpecs::from_product(product),
            sites: Vec::new(),
            lowest_price: None,
            highest_price: None,
            price_range: None,
            avg_price: None,
        }
    }

    #[must_use]
    pub fn is_multi_site(&self) -> bool {
        self.sites.len() > 1
    }

    /// Sorts offers cheapest first (unknown prices last) and fills the stats.
    fn finish(&mut self) {
        self.sites.sort_by(|a, b| match (a.known_price(), b.known_price()) {
            (Some(x), Some(y)) => x.total_cmp(&y),
            (Some(_), None) => std::cmp::Ordering::Less,
            (None, Some(_)) => std::cmp::Ordering::Greater,
            (None, None) => std::cmp::Ordering::Equal,
        });

        let prices: Vec<f64> = self.sites.iter().filter_map(SiteOffer::known_price).collect();
        if prices.is_empty() {
            return;
        }
        let lowest = prices.iter().copied().fold(f64::INFINITY, f64::min);
        let highest = prices.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        #[allow(clippy::cast_precision_loss)]
        let avg = prices.iter().sum::<f64>() / prices.len() as f64;

        self.lowest_price = Some(lowest);
        self.highest_price = Some(highest);
        self.price_range = Some(highest - lowest);
        self.avg_price = Some(avg);
    }
}

/// Result of a comparison run.
#[derive(Debug, Clone, Serialize)]
pub struct ComparisonReport {
    pub products: Vec<ProductGroup>,
    /// Number of groups in `products`.
    pub total_products: usize,
    /// Number of distinct signatures seen, multi-site or not.
    pub total_unique_products: usize,
}

/// Groups `(competitor, product)` pairs by signature.
///
/// Within a group an offer is keyed by competitor and URL, so repeat crawls of
/// the same page are counted once (first occurrence kept). Groups come back in
/// first-seen order with offers sorted and statistics filled.
pub fn group_products<'a, I>(products: I) -> Vec<ProductGroup>
where
    I: IntoIterator<Item = (&'a str, &'a Product)>,
{
    let mut groups: Vec<ProductGroup> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();
    let mut seen_sites: Vec<HashSet<String>> = Vec::new();

    for (competitor, product) in products {
        let signature = product_signature(product);
        let slot = *index.entry(signature.clone()).or_insert_with(|| {
            groups.push(ProductGroup::seed(signature, product));
            seen_sites.push(HashSet::new());
            groups.len() - 1
        });

        let site_key = format!("{competitor}_{}", product.url.as_deref().unwrap_or_default());
        if seen_sites[slot].insert(site_key) {
            groups[slot].sites.push(SiteOffer {
                competitor: competitor.to_string(),
                price: product.price,
                url: product.url.clone(),
                availability: product
                    .availability
                    .clone()
                    .unwrap_or_else(|| "Available".to_string()),
                raw_config: product.config.clone(),
            });
        }
    }

    for group in &mut groups {
        group.finish();
    }
    groups
}

/// Builds the cross-vendor comparison.
///
/// Only multi-site groups are kept unless `include_single_site` is set. The
/// result is ordered by descending price range so the largest spreads come
/// first; groups without a range sort as zero.
pub fn compare<'a, I>(products: I, include_single_site: bool) -> ComparisonReport
where
    I: IntoIterator<Item = (&'a str, &'a Product)>,
{
    let groups = group_products(products);
    let total_unique_products = groups.len();

    let mut selected: Vec<ProductGroup> = groups
        .into_iter()
        .filter(|g| include_single_site || g.is_multi_site())
        .collect();
    selected.sort_by(|a, b| {
        b.price_range
            .unwrap_or(0.0)
            .total_cmp(&a.price_range.unwrap_or(0.0))
    });

    ComparisonReport {
        total_products: selected.len(),
        products: selected,
        total_unique_products,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_product(url: &str, price: f64, processor: &str) -> Product {
        let mut p = Product::new(
            Brand::Dell,
            "Latitude 5420",
            ProductType::Laptop,
            "Dell Latitude 5420",
            price,
        );
        p.url = Some(url.to_string());
        p.config.processor = Some(processor.to_string());
        p.config.ram = Some("16GB".to_string());
        p
    }

    #[test]
    fn groups_across_vendors_and_sorts_offers() {
        let a = make_product("https://a.example/1", 520.0, "Intel Core i5-1145G7");
        let b = make_product("https://b.example/9", 449.0, "i5-1145G7");
        let c = make_product("https://c.example/3", 610.0, "i5-1145G7 vPro");

        let report = compare([("A", &a), ("B", &b), ("C", &c)], false);

        assert_eq!(report.total_products, 1);
        assert_eq!(report.total_unique_products, 1);
        let group = &report.products[0];
        let order: Vec<&str> = group.sites.iter().map(|s| s.competitor.as_str()).collect();
        assert_eq!(order, vec!["B", "A", "C"]);
        assert_eq!(group.lowest_price, Some(449.0));
        assert_eq!(group.highest_price, Some(610.0));
        assert_eq!(group.price_range, Some(161.0));
        assert!((group.avg_price.unwrap() - 526.333_333).abs() < 1e-3);
        assert_eq!(group.normalized_specs.storage, NOT_SPECIFIED);
        assert_eq!(group.normalized_specs.form_factor, None);
        assert_eq!(
            group.normalized_specs.screen_resolution.as_deref(),
            Some(NOT_SPECIFIED)
        );
    }

    #[test]
    fn repeat_crawl_of_same_url_counts_once() {
        let first = make_product("https://a.example/1", 520.0, "i5-1145G7");
        let repeat = make_product("https://a.example/1", 499.0, "i5-1145G7");

        let groups = group_products([("A", &first), ("A", &repeat)]);
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].sites.len(), 1);
        assert!((groups[0].sites[0].price - 520.0).abs() < f64::EPSILON);
        assert!(!groups[0].is_multi_site());
    }

    #[test]
    fn single_site_groups_filtered_unless_requested() {
        let a = make_product("https://a.example/1", 520.0, "i5-1145G7");
        let other = make_product("https://a.example/2", 300.0, "i7-8650U");

        let report = compare([("A", &a), ("A", &other)], false);
        assert!(report.products.is_empty());
        assert_eq!(report.total_unique_products, 2);

        let all = compare([("A", &a), ("A", &other)], true);
        assert_eq!(all.total_products, 2);
    }

    #[test]
    fn unknown_price_sorted_last_and_excluded_from_stats() {
        let a = make_product("https://a.example/1", 0.0, "i5-1145G7");
        let b = make_product("https://b.example/1", 450.0, "i5-1145G7");

        let groups = group_products([("A", &a), ("B", &b)]);
        let group = &groups[0];
        assert_eq!(group.sites[0].competitor, "B");
        assert_eq!(group.sites[1].competitor, "A");
        assert_eq!(group.price_range, Some(0.0));
        assert_eq!(group.avg_price, Some(450.0));
    }

    #[test]
    fn groups_ordered_by_descending_range() {
        let narrow_a = make_product("https://a.example/1", 500.0, "i5-1145G7");
        let narrow_b = make_product("https://b.example/1", 510.0, "i5-1145G7");
        let wide_a = make_product("https://a.example/2", 300.0, "i7-8650U");
        let wide_b = make_product("https://b.example/2", 450.0, "i7-8650U");

        let report = compare(
            [
                ("A", &narrow_a),
                ("B", &narrow_b),
                ("A", &wide_a),
                ("B", &wide_b),
            ],
            false,
        );
        let ranges: Vec<Option<f64>> = report.products.iter().map(|g| g.price_range).collect();
        assert_eq!(ranges, vec![Some(150.0), Some(10.0)]);
    }
}
