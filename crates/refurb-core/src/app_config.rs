use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    Development,
    Test,
    Production,
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Test => write!(f, "test"),
            Environment::Production => write!(f, "production"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub env: Environment,
    pub log_level: String,
    /// JSON catalog accumulated across scrape runs.
    pub catalog_path: PathBuf,
    /// Directory holding `msrp_report_YYYY-MM-DD.csv` snapshots.
    pub history_dir: PathBuf,
    pub vendors_path: PathBuf,
    /// Rendered page text captured by the external fetcher.
    pub pages_dir: PathBuf,
    pub max_pages: usize,
    /// Consecutive empty or failed listing pages before a crawl stops.
    pub max_empty_pages: usize,
    pub title_max_chars: usize,
    /// When set, products whose Intel generation is unknown or older are dropped.
    pub min_intel_generation: Option<u8>,
}
