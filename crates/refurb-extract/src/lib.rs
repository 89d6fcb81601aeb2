//! Text extraction and cross-vendor matching for refurbished-computer listings.
//!
//! Everything here is synchronous and free of I/O except through the
//! [`PageSource`] and [`ExtractionOracle`] traits supplied by the caller.

pub mod crawl;
pub mod error;
pub mod fields;
pub mod grades;
pub mod mapper;
pub mod markdown;
pub mod matcher;
pub mod oracle;
pub mod segment;
pub mod signature;

pub use crawl::{
    crawl_listing, expand_with_details, extract_page, CrawlOptions, CrawlSummary, PageSource,
    StopReason,
};
pub use error::ScrapeError;
pub use fields::extract_config;
pub use grades::{enrich_from_detail, expand_grades, ExpansionTier};
pub use mapper::{map_page, map_section, PageContext};
pub use matcher::{compare, group_products, ComparisonReport, ProductGroup, SiteOffer};
pub use oracle::{normalize_candidate, CandidateRecord, ExtractionOracle, NoOracle};
pub use segment::{segment, Section};
pub use signature::product_signature;
