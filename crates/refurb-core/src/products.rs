//! Canonical catalog types shared by extraction, matching, and persistence.
//!
//! The on-disk catalog is a single JSON document keyed by vendor name. Every
//! record type here carries a flattened `extra` map so fields written by older
//! or newer tooling survive a load/merge/save cycle untouched.

use std::collections::BTreeMap;

use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::CoreError;

/// Placeholder used by display-oriented views for a missing attribute.
pub const NOT_SPECIFIED: &str = "Not specified";

/// Manufacturers the catalog tracks. Anything else deserializes to `Unknown`
/// and is never written by a merge.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Brand {
    Dell,
    #[serde(rename = "HP")]
    Hp,
    Lenovo,
    #[default]
    #[serde(other)]
    Unknown,
}

impl Brand {
    /// Maps a free-form manufacturer name onto the allowlist.
    ///
    /// Accepts `"dell"`, `"HP"`, `"Hewlett-Packard"`, `"hewlett packard"`,
    /// `"LENOVO"` and similar spellings. Everything else is `Unknown`.
    #[must_use]
    pub fn from_name(name: &str) -> Self {
        let lower = name.trim().to_lowercase();
        if lower.contains("dell") {
            Brand::Dell
        } else if lower == "hp" || lower.starts_with("hp ") || lower.contains("hewlett") {
            Brand::Hp
        } else if lower.contains("lenovo") {
            Brand::Lenovo
        } else {
            Brand::Unknown
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Brand::Dell => "Dell",
            Brand::Hp => "HP",
            Brand::Lenovo => "Lenovo",
            Brand::Unknown => "Unknown",
        }
    }

    #[must_use]
    pub fn is_known(self) -> bool {
        self != Brand::Unknown
    }
}

impl std::fmt::Display for Brand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProductType {
    Laptop,
    Desktop,
    #[default]
    #[serde(other)]
    Unknown,
}

impl ProductType {
    /// Infers the listing type from a category URL.
    ///
    /// `laptop`/`notebook` win over `desktop`/`workstation`, so a
    /// "mobile-workstations" collection without either laptop keyword is
    /// classified as a desktop listing.
    #[must_use]
    pub fn from_url(url: &str) -> Self {
        let lower = url.to_lowercase();
        if lower.contains("laptop") || lower.contains("notebook") {
            ProductType::Laptop
        } else if lower.contains("desktop") || lower.contains("workstation") {
            ProductType::Desktop
        } else {
            ProductType::Unknown
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            ProductType::Laptop => "Laptop",
            ProductType::Desktop => "Desktop",
            ProductType::Unknown => "Unknown",
        }
    }
}

impl std::fmt::Display for ProductType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Hardware configuration attributes, each in a small controlled vocabulary
/// (`"16GB"`, `"512GB SSD"`, `"Grade A"`, `"FHD (1920x1080)"`, ...).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProductConfig {
    pub processor: Option<String>,
    pub ram: Option<String>,
    pub storage: Option<String>,
    pub cosmetic_grade: Option<String>,
    pub form_factor: Option<String>,
    pub screen_resolution: Option<String>,
    pub screen_size: Option<String>,
}

impl ProductConfig {
    /// Copies every attribute from `other` that is absent (or blank) here.
    ///
    /// Values already present are never replaced. Returns the number of
    /// attributes that were filled.
    pub fn fill_missing(&mut self, other: &ProductConfig) -> usize {
        let pairs = [
            (&mut self.processor, &other.processor),
            (&mut self.ram, &other.ram),
            (&mut self.storage, &other.storage),
            (&mut self.cosmetic_grade, &other.cosmetic_grade),
            (&mut self.form_factor, &other.form_factor),
            (&mut self.screen_resolution, &other.screen_resolution),
            (&mut self.screen_size, &other.screen_size),
        ];

        let mut filled = 0;
        for (slot, candidate) in pairs {
            let empty = slot.as_deref().is_none_or(|s| s.trim().is_empty());
            if let (true, Some(value)) = (empty, candidate.as_deref()) {
                if !value.trim().is_empty() {
                    *slot = Some(value.to_owned());
                    filled += 1;
                }
            }
        }
        filled
    }

    /// Returns `true` when no attribute carries a value.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        [
            &self.processor,
            &self.ram,
            &self.storage,
            &self.cosmetic_grade,
            &self.form_factor,
            &self.screen_resolution,
            &self.screen_size,
        ]
        .iter()
        .all(|v| v.is_none())
    }
}

/// A single vendor listing after normalization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    #[serde(default)]
    pub brand: Brand,
    #[serde(default)]
    pub model: String,
    #[serde(default)]
    pub product_type: ProductType,
    #[serde(default)]
    pub title: String,
    pub price: f64,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub config: ProductConfig,
    #[serde(default)]
    pub availability: Option<String>,
    /// Vendor name, attached at ingestion.
    #[serde(default)]
    pub competitor: Option<String>,
    /// Fields written by other tooling (reviews, price text, ...), kept verbatim.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Product {
    /// Creates a product with an empty configuration and no optional fields.
    #[must_use]
    pub fn new(brand: Brand, model: &str, product_type: ProductType, title: &str, price: f64) -> Self {
        Self {
            brand,
            model: model.to_owned(),
            product_type,
            title: title.to_owned(),
            price,
            url: None,
            config: ProductConfig::default(),
            availability: None,
            competitor: None,
            extra: Map::new(),
        }
    }

    /// Deduplication key inside one vendor's catalog: the URL when present,
    /// otherwise a `brand|model|price` composite.
    #[must_use]
    pub fn identity_key(&self) -> String {
        match self.url.as_deref().map(str::trim) {
            Some(url) if !url.is_empty() => url.to_owned(),
            _ => format!("{}|{}|{}", self.brand, self.model, self.price),
        }
    }

    /// Checks the invariants every persisted product must hold.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::UnknownBrand`] for brands outside the allowlist and
    /// [`CoreError::InvalidPrice`] for a price that is not a positive finite number.
    pub fn validate(self) -> Result<Self, CoreError> {
        if !self.brand.is_known() {
            return Err(CoreError::UnknownBrand { title: self.title });
        }
        if !self.price.is_finite() || self.price <= 0.0 {
            return Err(CoreError::InvalidPrice {
                title: self.title,
                price: self.price,
            });
        }
        Ok(self)
    }
}

/// One vendor's accumulated listings.
///
/// `products` is kept in discovery order and is only ever appended to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompetitorCatalog {
    pub competitor: String,
    #[serde(default)]
    pub website: String,
    #[serde(default)]
    pub scrape_date: String,
    #[serde(default)]
    pub total_products: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub existing_products: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub new_additions: Option<usize>,
    #[serde(default)]
    pub products: Vec<Product>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl CompetitorCatalog {
    #[must_use]
    pub fn new(competitor: &str, website: &str) -> Self {
        Self {
            competitor: competitor.to_owned(),
            website: website.to_owned(),
            scrape_date: now_timestamp(),
            total_products: 0,
            existing_products: None,
            new_additions: None,
            products: Vec::new(),
            extra: Map::new(),
        }
    }

    /// Refreshes `scrape_date` to the current time.
    pub fn touch(&mut self) {
        self.scrape_date = now_timestamp();
    }
}

/// The full persisted catalog, keyed by vendor name.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Catalog {
    pub vendors: BTreeMap<String, CompetitorCatalog>,
}

impl Catalog {
    #[must_use]
    pub fn vendor(&self, name: &str) -> Option<&CompetitorCatalog> {
        self.vendors.get(name)
    }

    /// Iterates every product together with the vendor key it is filed under.
    pub fn products(&self) -> impl Iterator<Item = (&str, &Product)> {
        self.vendors
            .iter()
            .flat_map(|(name, vendor)| vendor.products.iter().map(move |p| (name.as_str(), p)))
    }

    #[must_use]
    pub fn total_products(&self) -> usize {
        self.vendors.values().map(|v| v.products.len()).sum()
    }
}

fn now_timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true)
}
