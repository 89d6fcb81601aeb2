//! Cross-vendor product signatures.
//!
//! A signature collapses vendor-specific wording into a stable key built from
//! brand, model, product type, processor, RAM and storage. Processor
//! normalization keeps the exact CPU model so that different chips with the
//! same generation are never grouped together.

use std::sync::LazyLock;

use regex::Regex;

use refurb_core::Product;

use crate::markdown::truncate_chars;

static HEWLETT_PACKARD_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"hewlett[-\s]*packard|\bhp\b").expect("valid regex"));

static MODEL_FAMILY_RES: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    ["thinkpad", "latitude", "elitebook", "optiplex", "precision"]
        .iter()
        .map(|family| Regex::new(&format!(r"{family}\s+(\w+)")).expect("valid regex"))
        .collect()
});
static GENERIC_MODEL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\w+\s*\d+)").expect("valid regex"));

static INTEL_MODEL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\bi([3579])-(\d+)").expect("valid regex"));
static RYZEN_MODEL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"ryzen\s+(\d+)\s*(\d+)?").expect("valid regex"));

static RAM_SIZE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d+)\s*(gb|mb)").expect("valid regex"));
static STORAGE_SIZE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d+(?:\.\d+)?)\s*(gb|tb|mb)").expect("valid regex"));
static NUMBER_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(\d+)").expect("valid regex"));

/// Canonical brand token: `dell`, `hp`, `lenovo`, or the trimmed lowercase input.
#[must_use]
pub fn normalize_brand(brand: &str) -> String {
    let lower = brand.trim().to_lowercase();
    if lower.contains("dell") {
        "dell".to_string()
    } else if HEWLETT_PACKARD_RE.is_match(&lower) {
        "hp".to_string()
    } else if lower.contains("lenovo") {
        "lenovo".to_string()
    } else {
        lower
    }
}

/// Model token without family name or whitespace (`"ThinkPad T490"` -> `"t490"`).
///
/// Every Latitude 5320 listing, touch or not, maps to `5320touch`.
#[must_use]
pub fn normalize_model(model: &str) -> String {
    let lower = model.trim().to_lowercase();
    if lower.is_empty() {
        return String::new();
    }
    if lower.contains("latitude") && lower.contains("5320") {
        return "5320touch".to_string();
    }

    MODEL_FAMILY_RES
        .iter()
        .chain(std::iter::once(&*GENERIC_MODEL_RE))
        .find_map(|re| re.captures(&lower).map(|caps| caps[1].to_string()))
        .unwrap_or(lower)
        .replace(char::is_whitespace, "")
}

/// Processor token that keeps the specific CPU model (`"i5-1135G7"` -> `"i51135"`).
#[must_use]
pub fn normalize_processor(processor: &str) -> String {
    let lower = processor.trim().to_lowercase();
    if lower.is_empty() {
        return String::new();
    }
    if let Some(caps) = INTEL_MODEL_RE.captures(&lower) {
        return format!("i{}{}", &caps[1], &caps[2]);
    }
    if let Some(caps) = RYZEN_MODEL_RE.captures(&lower) {
        let model = caps.get(2).map_or("", |m| m.as_str());
        return format!("ryzen{}{model}", &caps[1]);
    }
    for family in ["celeron", "pentium", "xeon"] {
        if lower.contains(family) {
            return family.to_string();
        }
    }
    truncate_chars(&lower, 30)
}

/// RAM token such as `"16gb"`.
#[must_use]
pub fn normalize_ram(ram: &str) -> String {
    let lower = ram.trim().to_lowercase();
    if lower.is_empty() {
        return String::new();
    }
    if let Some(caps) = RAM_SIZE_RE.captures(&lower) {
        return format!("{}{}", &caps[1], &caps[2]);
    }
    if let Some(caps) = NUMBER_RE.captures(&lower) {
        return format!("{}gb", &caps[1]);
    }
    truncate_chars(&lower, 20)
}

/// Storage token such as `"512gb"` or `"1tb"`; the technology is dropped.
#[must_use]
pub fn normalize_storage(storage: &str) -> String {
    let lower = storage.trim().to_lowercase();
    if lower.is_empty() {
        return String::new();
    }
    if let Some(caps) = STORAGE_SIZE_RE.captures(&lower) {
        return format!("{}{}", &caps[1], &caps[2]);
    }
    if ["ssd", "hdd", "nvme", "sata"].iter().any(|w| lower.contains(w)) {
        if let Some(caps) = NUMBER_RE.captures(&lower) {
            return format!("{}gb", &caps[1]);
        }
    }
    truncate_chars(&lower, 30)
}

/// Signature of a product: normalized brand, model, type, processor, RAM and
/// storage joined by `_`, with empty parts omitted. An unknown type still
/// contributes `unknown`, so it never groups with a typed product.
#[must_use]
pub fn product_signature(product: &Product) -> String {
    let product_type = product.product_type.as_str().to_lowercase();
    let config = &product.config;

    [
        normalize_brand(product.brand.as_str()),
        normalize_model(&product.model),
        product_type,
        normalize_processor(config.processor.as_deref().unwrap_or_default()),
        normalize_ram(config.ram.as_deref().unwrap_or_default()),
        normalize_storage(config.storage.as_deref().unwrap_or_default()),
    ]
    .into_iter()
    .filter(|part| !part.is_empty())
    .collect::<Vec<_>>()
    .join("_")
}
