//! Persistence for the accumulated catalog and its price-history reports.
//!
//! The catalog lives in one JSON document that is only ever changed through a
//! [`CatalogRepository`] transaction: lock, load, merge, write a temporary file,
//! rename it over the original. Reports are immutable dated CSV snapshots.

pub mod catalog;
pub mod merge;
pub mod report;
pub mod summary;

pub use catalog::{CatalogRepository, JsonCatalogStore, MemoryCatalogStore};
pub use merge::{merge_vendor, record_products, MergeOutcome};
pub use report::{
    build_report, diff_price, find_baseline, generate_report, load_previous_prices, report_key,
    report_path, write_report, ChangeFlag, ReportOutcome, ReportRow, REPORT_COLUMNS,
};
pub use summary::{summarize, CatalogSummary, VendorSummary};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// The catalog file exists but is not a valid catalog. Nothing is written.
    #[error("catalog {path} is not valid JSON: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to encode catalog: {0}")]
    Encode(#[source] serde_json::Error),

    #[error(
        "catalog is locked by another writer ({path}, owner pid {owner}); \
         if that process is gone, delete the lock file and retry"
    )]
    Locked { path: String, owner: String },

    #[error("CSV error on {path}: {source}")]
    Csv {
        path: String,
        #[source]
        source: csv::Error,
    },

    #[error("report {path} already exists")]
    ReportExists { path: String },
}

impl StoreError {
    pub(crate) fn io(path: &std::path::Path, source: std::io::Error) -> Self {
        StoreError::Io {
            path: path.display().to_string(),
            source,
        }
    }
}
