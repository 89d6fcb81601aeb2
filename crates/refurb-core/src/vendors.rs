use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::{ConfigError, ProductType};

fn default_page_param() -> String {
    "page".to_string()
}

/// A refurbished-computer retailer whose listings are cataloged.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VendorConfig {
    pub name: String,
    pub website: String,
    #[serde(default)]
    pub laptop_urls: Vec<String>,
    #[serde(default)]
    pub desktop_urls: Vec<String>,
    /// Query parameter carrying the page number (`page`, `paged`, ...).
    #[serde(default = "default_page_param")]
    pub page_param: String,
    /// Detail pages follow the grade/price-table convention and are expanded
    /// into one record per cosmetic grade.
    #[serde(default)]
    pub grade_expansion: bool,
    pub notes: Option<String>,
}

impl VendorConfig {
    /// Listing URLs paired with the product type their pages carry.
    #[must_use]
    pub fn listing_urls(&self) -> Vec<(&str, ProductType)> {
        self.laptop_urls
            .iter()
            .map(|u| (u.as_str(), ProductType::Laptop))
            .chain(
                self.desktop_urls
                    .iter()
                    .map(|u| (u.as_str(), ProductType::Desktop)),
            )
            .collect()
    }

    /// URL of page `page_num` (1-based) of a listing.
    ///
    /// Page 1 is the listing URL itself; later pages append the vendor's page
    /// parameter, joining with `&` when the URL already has a query string.
    #[must_use]
    pub fn page_url(&self, base_url: &str, page_num: usize) -> String {
        if page_num <= 1 {
            return base_url.to_string();
        }
        let sep = if base_url.contains('?') { '&' } else { '?' };
        format!("{base_url}{sep}{}={page_num}", self.page_param)
    }

    /// Joins a site-relative path (`/p12345-...`) onto the vendor website.
    /// Absolute URLs are returned unchanged.
    #[must_use]
    pub fn absolute_url(&self, url: &str) -> String {
        if url.starts_with("http://") || url.starts_with("https://") {
            return url.to_string();
        }
        let base = self.website.trim_end_matches('/');
        if url.starts_with('/') {
            format!("{base}{url}")
        } else {
            format!("{base}/{url}")
        }
    }

    /// Returns `true` when `url` points at this vendor's site.
    #[must_use]
    pub fn owns_url(&self, url: &str) -> bool {
        let host = self
            .website
            .trim_start_matches("https://")
            .trim_start_matches("http://")
            .trim_start_matches("www.")
            .trim_end_matches('/')
            .to_lowercase();
        !host.is_empty() && url.to_lowercase().contains(&host)
    }
}

#[derive(Debug, Deserialize)]
pub struct VendorsFile {
    pub vendors: Vec<VendorConfig>,
}

impl VendorsFile {
    /// Case-insensitive lookup by vendor name.
    #[must_use]
    pub fn find(&self, name: &str) -> Option<&VendorConfig> {
        self.vendors
            .iter()
            .find(|v| v.name.eq_ignore_ascii_case(name))
    }
}

/// Load and validate the vendor registry from a YAML file.
///
/// # Errors
///
/// Returns `ConfigError` if the file cannot be read, parsed, or fails validation.
pub fn load_vendors(path: &Path) -> Result<VendorsFile, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::VendorsFileIo {
        path: path.display().to_string(),
        source: e,
    })?;

    let vendors_file: VendorsFile =
        serde_yaml::from_str(&content).map_err(ConfigError::VendorsFileParse)?;

    validate_vendors(&vendors_file)?;

    Ok(vendors_file)
}

fn validate_vendors(vendors_file: &VendorsFile) -> Result<(), ConfigError> {
    let mut seen_names = HashSet::new();

    for vendor in &vendors_file.vendors {
        if vendor.name.trim().is_empty() {
            return Err(ConfigError::Validation(
                "vendor name must be non-empty".to_string(),
            ));
        }

        if !(vendor.website.starts_with("http://") || vendor.website.starts_with("https://")) {
            return Err(ConfigError::Validation(format!(
                "vendor '{}' has invalid website '{}'; must start with http:// or https://",
                vendor.name, vendor.website
            )));
        }

        if vendor.laptop_urls.is_empty() && vendor.desktop_urls.is_empty() {
            return Err(ConfigError::Validation(format!(
                "vendor '{}' has no listing URLs",
                vendor.name
            )));
        }

        if vendor.page_param.trim().is_empty() {
            return Err(ConfigError::Validation(format!(
                "vendor '{}' has an empty page_param",
                vendor.name
            )));
        }

        if !seen_names.insert(vendor.name.to_lowercase()) {
            return Err(ConfigError::Validation(format!(
                "duplicate vendor name: '{}'",
                vendor.name
            )));
        }
    }

    Ok(())
}

#[cfg(test)]
#[path = "vendors_test.rs"]
mod tests;
