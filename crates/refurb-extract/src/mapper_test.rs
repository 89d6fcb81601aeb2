use super::*;

fn make_ctx(product_type: ProductType) -> PageContext {
    PageContext {
        competitor: "PCLiquidations".to_string(),
        website: "https://www.pcliquidations.com".to_string(),
        page_url: "https://www.pcliquidations.com/refurbished-laptops".to_string(),
        product_type,
        title_max_chars: DEFAULT_TITLE_MAX_CHARS,
        min_intel_generation: None,
    }
}

fn section(lines: &[&'static str]) -> Section<'static> {
    Section {
        lines: lines.to_vec(),
    }
}

// -----------------------------------------------------------------------
// map_section
// -----------------------------------------------------------------------

#[test]
fn maps_latitude_section() {
    let s = section(&[
        "Dell Latitude 5420",
        "$450 Intel i5-11th gen, 16GB DDR4, 256GB SSD",
    ]);
    let p = map_section(&s, &make_ctx(ProductType::Laptop)).expect("product");

    assert_eq!(p.brand, Brand::Dell);
    assert_eq!(p.model, "Latitude 5420");
    assert!((p.price - 450.0).abs() < f64::EPSILON);
    assert_eq!(p.config.processor.as_deref(), Some("I5-11th gen"));
    assert_eq!(p.config.ram.as_deref(), Some("16GB"));
    assert_eq!(p.config.storage.as_deref(), Some("256GB SSD"));
    assert_eq!(p.competitor.as_deref(), Some("PCLiquidations"));
    assert_eq!(
        p.url.as_deref(),
        Some("https://www.pcliquidations.com/refurbished-laptops")
    );
    assert_eq!(
        p.extra.get("price_text"),
        Some(&Value::from("$450 Intel i5-11th gen, 16GB DDR4, 256GB SSD"))
    );
}

#[test]
fn no_price_means_no_product() {
    let s = section(&["Dell Latitude 5420", "Intel i5-11th gen, 16GB DDR4"]);
    assert!(map_section(&s, &make_ctx(ProductType::Laptop)).is_none());

    let s = section(&["Lenovo ThinkPad T14", "Call for $ pricing"]);
    assert!(map_section(&s, &make_ctx(ProductType::Laptop)).is_none());
}

#[test]
fn no_title_means_no_product() {
    let s = section(&["$199", "* 8GB"]);
    assert!(map_section(&s, &make_ctx(ProductType::Laptop)).is_none());
}

#[test]
fn meaningful_line_used_when_no_brand() {
    let s = section(&["* bullet", "Refurbished business notebook", "$310"]);
    let p = map_section(&s, &make_ctx(ProductType::Laptop)).expect("product");
    assert_eq!(p.title, "Refurbished business notebook");
    assert_eq!(p.brand, Brand::Unknown);
}

#[test]
fn config_spans_all_lines_and_respects_type() {
    let s = section(&[
        "HP EliteDesk 800 G4",
        "Core i5-8th gen",
        "8GB DDR4 RAM",
        "Small Form Factor, 500GB HDD",
        "FHD output $229.99",
    ]);
    let p = map_section(&s, &make_ctx(ProductType::Desktop)).expect("product");
    assert_eq!(p.model, "EliteDesk 800");
    assert_eq!(p.config.form_factor.as_deref(), Some("SFF"));
    assert_eq!(p.config.storage.as_deref(), Some("500GB HDD"));
    assert!(p.config.screen_resolution.is_none());
    assert!((p.price - 229.99).abs() < 1e-9);
}

#[test]
fn relative_detail_url_is_joined_to_website() {
    let s = section(&[
        "[Dell Latitude 3510 15.6\"](/p125225-dell-latitude-3510-15)",
        "$329.00",
    ]);
    let p = map_section(&s, &make_ctx(ProductType::Laptop)).expect("product");
    assert_eq!(
        p.url.as_deref(),
        Some("https://www.pcliquidations.com/p125225-dell-latitude-3510-15")
    );
    assert_eq!(p.title, "Dell Latitude 3510 15.6\"");
    assert_eq!(p.config.screen_size.as_deref(), Some("15.6 inch"));
}

#[test]
fn absolute_detail_url_preferred() {
    let s = section(&[
        "Lenovo ThinkPad T480 https://www.pcliquidations.com/p998877-lenovo-t480",
        "$259",
    ]);
    let p = map_section(&s, &make_ctx(ProductType::Laptop)).expect("product");
    assert_eq!(
        p.url.as_deref(),
        Some("https://www.pcliquidations.com/p998877-lenovo-t480")
    );
}

#[test]
fn title_is_cleaned_and_capped() {
    let s = section(&["**Dell OptiPlex 7050 Micro** with a very long marketing tail", "$149"]);
    let mut ctx = make_ctx(ProductType::Desktop);
    ctx.title_max_chars = 18;
    let p = map_section(&s, &ctx).expect("product");
    assert_eq!(p.title, "Dell OptiPlex 7050");
}

#[test]
fn unknown_page_type_classified_from_title() {
    let s = section(&["Lenovo ThinkCentre M720q Tiny", "$189"]);
    let p = map_section(&s, &make_ctx(ProductType::Unknown)).expect("product");
    assert_eq!(p.product_type, ProductType::Desktop);
    assert_eq!(p.config.form_factor.as_deref(), Some("MFF/Tiny"));
}

// -----------------------------------------------------------------------
// extract_model / product_type_from_title
// -----------------------------------------------------------------------

#[test]
fn model_families() {
    assert_eq!(extract_model("HP EliteBook 840 G6"), "EliteBook 840");
    assert_eq!(extract_model("lenovo thinkpad X1 Carbon"), "ThinkPad X1");
    assert_eq!(extract_model("Dell Precision 7540 workstation"), "Precision 7540");
    assert_eq!(extract_model("Dell Precision Tower 3620"), "Precision Tower 3620");
    assert_eq!(extract_model("Dell Latitude 5420 14\" FHD"), "Latitude 5420");
}

#[test]
fn model_from_screen_size_fallback() {
    assert_eq!(extract_model("Acme Book14 15\" laptop"), "Book14 15");
    assert_eq!(extract_model("Refurbished notebook"), "");
}

#[test]
fn title_product_types() {
    assert_eq!(product_type_from_title("HP ProBook 450"), ProductType::Laptop);
    assert_eq!(product_type_from_title("Dell OptiPlex 3060"), ProductType::Desktop);
    assert_eq!(product_type_from_title("Dell monitor"), ProductType::Unknown);
}

// -----------------------------------------------------------------------
// map_page
// -----------------------------------------------------------------------

#[test]
fn map_page_drops_unknown_brands_and_priceless_sections() {
    let page = "\
# Refurbished Laptops

Dell Latitude 7490 Intel i7-8th gen 16GB DDR4 512GB SSD 14\" FHD $389

Apple MacBook Air 13\" $499

HP EliteBook 840 G5 Grade B
no price here
";
    let products = map_page(page, &make_ctx(ProductType::Laptop));
    assert_eq!(products.len(), 1);
    assert_eq!(products[0].brand, Brand::Dell);
    assert_eq!(products[0].model, "Latitude 7490");
}
