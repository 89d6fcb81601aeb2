//! Dated price-history reports.
//!
//! A report flattens the catalog into one row per product and diffs each row's
//! price against the most recent earlier report, matched on a lowercase
//! `competitor|url` key (`competitor|brand|model` for products without a URL).
//! Report files are `msrp_report_YYYY-MM-DD.csv` and are never rewritten.

use std::collections::HashMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use refurb_core::{Catalog, Product};
use refurb_extract::fields::intel_generation;
use serde::Serialize;
use tempfile::NamedTempFile;

use crate::StoreError;

const REPORT_PREFIX: &str = "msrp_report_";
const REPORT_EXTENSION: &str = ".csv";

/// Column order of every report file.
pub const REPORT_COLUMNS: [&str; 20] = [
    "week_date",
    "competitor",
    "brand",
    "product_type",
    "model",
    "title",
    "url",
    "processor",
    "pg",
    "ram",
    "storage",
    "cosmetic_grade",
    "form_factor",
    "screen_resolution",
    "price_previous",
    "price_current",
    "price_change",
    "price_change_pct",
    "change_flag",
    "key",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ChangeFlag {
    New,
    Up,
    Down,
    Same,
}

impl ChangeFlag {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            ChangeFlag::New => "NEW",
            ChangeFlag::Up => "UP",
            ChangeFlag::Down => "DOWN",
            ChangeFlag::Same => "SAME",
        }
    }
}

/// One product in a report.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportRow {
    pub week_date: NaiveDate,
    pub competitor: String,
    pub brand: String,
    pub product_type: String,
    pub model: String,
    pub title: String,
    pub url: String,
    pub processor: String,
    /// Intel processor generation, when one can be read.
    pub pg: Option<u8>,
    pub ram: String,
    pub storage: String,
    pub cosmetic_grade: String,
    pub form_factor: String,
    pub screen_resolution: String,
    pub price_previous: Option<f64>,
    pub price_current: f64,
    pub price_change: Option<f64>,
    pub price_change_pct: Option<f64>,
    pub change_flag: ChangeFlag,
    pub key: String,
}

impl ReportRow {
    fn to_record(&self) -> Vec<String> {
        vec![
            self.week_date.to_string(),
            self.competitor.clone(),
            self.brand.clone(),
            self.product_type.clone(),
            self.model.clone(),
            self.title.clone(),
            self.url.clone(),
            self.processor.clone(),
            self.pg.map(|g| g.to_string()).unwrap_or_default(),
            self.ram.clone(),
            self.storage.clone(),
            self.cosmetic_grade.clone(),
            self.form_factor.clone(),
            self.screen_resolution.clone(),
            self.price_previous.map(format_price).unwrap_or_default(),
            format_price(self.price_current),
            self.price_change.map(format_price).unwrap_or_default(),
            self.price_change_pct
                .map(|pct| format!("{pct:.2}"))
                .unwrap_or_default(),
            self.change_flag.as_str().to_string(),
            self.key.clone(),
        ]
    }
}

/// Summary of a written report.
#[derive(Debug, Clone, Serialize)]
pub struct ReportOutcome {
    pub path: PathBuf,
    /// The earlier report the prices were compared against.
    pub baseline: Option<PathBuf>,
    pub rows: usize,
    pub new: usize,
    pub up: usize,
    pub down: usize,
    pub same: usize,
}

/// Matching key between report dates.
#[must_use]
pub fn report_key(competitor: &str, url: Option<&str>, brand: &str, model: &str) -> String {
    let base = match url.map(str::trim) {
        Some(url) if !url.is_empty() => url.to_string(),
        _ => format!("{brand}|{model}"),
    };
    format!("{competitor}|{base}").to_lowercase()
}

/// Price change against the previous report.
///
/// Returns `(change, percent_change, flag)`. Without a previous price the row
/// is `NEW`; the percentage is absent when the previous price is not positive.
#[must_use]
pub fn diff_price(previous: Option<f64>, current: f64) -> (Option<f64>, Option<f64>, ChangeFlag) {
    let Some(previous) = previous else {
        return (None, None, ChangeFlag::New);
    };
    let change = current - previous;
    let pct = (previous > 0.0).then(|| change / previous * 100.0);
    let flag = if change > 0.0 {
        ChangeFlag::Up
    } else if change < 0.0 {
        ChangeFlag::Down
    } else {
        ChangeFlag::Same
    };
    (Some(change), pct, flag)
}

/// Flattens `catalog` into report rows dated `date`, diffed against
/// `previous` (key -> earlier price).
#[must_use]
pub fn build_report(
    catalog: &Catalog,
    previous: &HashMap<String, f64>,
    date: NaiveDate,
) -> Vec<ReportRow> {
    catalog
        .products()
        .map(|(competitor, product)| report_row(competitor, product, previous, date))
        .collect()
}

fn report_row(
    competitor: &str,
    product: &Product,
    previous: &HashMap<String, f64>,
    date: NaiveDate,
) -> ReportRow {
    let brand = product.brand.as_str();
    let key = report_key(competitor, product.url.as_deref(), brand, &product.model);
    let price_previous = previous.get(&key).copied();
    let (price_change, price_change_pct, change_flag) =
        diff_price(price_previous, product.price);

    let config = &product.config;
    let pg = match config.processor.as_deref() {
        Some(processor) => intel_generation(processor),
        None => intel_generation(&format!("{} {}", product.title, product.model)),
    };

    ReportRow {
        week_date: date,
        competitor: competitor.to_string(),
        brand: brand.to_string(),
        product_type: product.product_type.as_str().to_string(),
        model: product.model.clone(),
        title: product.title.clone(),
        url: product.url.clone().unwrap_or_default(),
        processor: config.processor.clone().unwrap_or_default(),
        pg,
        ram: config.ram.clone().unwrap_or_default(),
        storage: config.storage.clone().unwrap_or_default(),
        cosmetic_grade: config.cosmetic_grade.clone().unwrap_or_default(),
        form_factor: config.form_factor.clone().unwrap_or_default(),
        screen_resolution: config.screen_resolution.clone().unwrap_or_default(),
        price_previous,
        price_current: product.price,
        price_change,
        price_change_pct,
        change_flag,
        key,
    }
}

/// Whole prices are written without decimals, others with two.
fn format_price(value: f64) -> String {
    if value.fract().abs() < f64::EPSILON {
        format!("{value:.0}")
    } else {
        format!("{value:.2}")
    }
}

#[must_use]
pub fn report_path(history_dir: &Path, date: NaiveDate) -> PathBuf {
    history_dir.join(format!("{REPORT_PREFIX}{date}{REPORT_EXTENSION}"))
}

fn report_date(file_name: &str) -> Option<NaiveDate> {
    let stem = file_name
        .strip_prefix(REPORT_PREFIX)?
        .strip_suffix(REPORT_EXTENSION)?;
    NaiveDate::parse_from_str(stem, "%Y-%m-%d").ok()
}

/// Newest report in `history_dir` dated strictly before `date`.
///
/// Files whose names do not carry a valid date are ignored. A missing
/// directory means there is no baseline.
///
/// # Errors
///
/// Returns [`StoreError::Io`] if the directory exists but cannot be listed.
pub fn find_baseline(history_dir: &Path, date: NaiveDate) -> Result<Option<PathBuf>, StoreError> {
    let entries = match fs::read_dir(history_dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(StoreError::io(history_dir, e)),
    };

    let mut best: Option<(NaiveDate, PathBuf)> = None;
    for entry in entries {
        let entry = entry.map_err(|e| StoreError::io(history_dir, e))?;
        let Some(found) = entry.file_name().to_str().and_then(report_date) else {
            continue;
        };
        if found < date && best.as_ref().is_none_or(|(d, _)| found > *d) {
            best = Some((found, entry.path()));
        }
    }
    Ok(best.map(|(_, path)| path))
}

/// Reads `key -> price_current` from an earlier report.
///
/// Older files without a `key` column get their key rebuilt from
/// `competitor`/`url`/`brand`/`model`; a legacy `price` column stands in for a
/// missing or empty `price_current`. Rows without a parseable price are skipped.
///
/// # Errors
///
/// Returns [`StoreError::Csv`] if the file cannot be opened or is not valid CSV.
pub fn load_previous_prices(path: &Path) -> Result<HashMap<String, f64>, StoreError> {
    let csv_err = |source| StoreError::Csv {
        path: path.display().to_string(),
        source,
    };
    let mut reader = csv::Reader::from_path(path).map_err(csv_err)?;

    let mut prices = HashMap::new();
    for row in reader.deserialize::<HashMap<String, String>>() {
        let row = row.map_err(csv_err)?;
        let field = |name: &str| {
            row.get(name)
                .map(|v| v.trim())
                .filter(|v| !v.is_empty())
        };

        let key = match field("key") {
            Some(key) => key.to_string(),
            None => report_key(
                field("competitor").unwrap_or_default(),
                field("url"),
                field("brand").unwrap_or_default(),
                field("model").unwrap_or_default(),
            ),
        };
        let price = field("price_current")
            .or_else(|| field("price"))
            .and_then(|raw| raw.parse::<f64>().ok());
        if let Some(price) = price {
            prices.insert(key, price);
        }
    }
    Ok(prices)
}

/// Writes `rows` as the report for `date`.
///
/// The file is written to a temporary file first and only linked into place
/// if no report for that date exists yet.
///
/// # Errors
///
/// Returns [`StoreError::ReportExists`] if a report for `date` is already
/// present, or an IO/CSV error if writing fails.
pub fn write_report(
    history_dir: &Path,
    date: NaiveDate,
    rows: &[ReportRow],
) -> Result<PathBuf, StoreError> {
    let path = report_path(history_dir, date);
    let exists = || StoreError::ReportExists {
        path: path.display().to_string(),
    };
    if path.exists() {
        return Err(exists());
    }
    fs::create_dir_all(history_dir).map_err(|e| StoreError::io(history_dir, e))?;

    let mut tmp = NamedTempFile::new_in(history_dir).map_err(|e| StoreError::io(history_dir, e))?;
    {
        let csv_err = |source| StoreError::Csv {
            path: path.display().to_string(),
            source,
        };
        let mut writer = csv::Writer::from_writer(tmp.as_file_mut());
        writer.write_record(REPORT_COLUMNS).map_err(csv_err)?;
        for row in rows {
            writer.write_record(row.to_record()).map_err(csv_err)?;
        }
        writer.flush().map_err(|e| StoreError::io(&path, e))?;
    }

    match tmp.persist_noclobber(&path) {
        Ok(_) => Ok(path),
        Err(e) if e.error.kind() == ErrorKind::AlreadyExists => Err(exists()),
        Err(e) => Err(StoreError::io(&path, e.error)),
    }
}

/// Builds and writes the report for `date`, comparing against the newest
/// earlier report in `history_dir`.
///
/// # Errors
///
/// Returns [`StoreError`] if the baseline cannot be read or the report cannot
/// be written (including when one already exists for `date`).
pub fn generate_report(
    catalog: &Catalog,
    history_dir: &Path,
    date: NaiveDate,
) -> Result<ReportOutcome, StoreError> {
    let baseline = find_baseline(history_dir, date)?;
    let previous = match &baseline {
        Some(path) => load_previous_prices(path)?,
        None => HashMap::new(),
    };

    let rows = build_report(catalog, &previous, date);
    let path = write_report(history_dir, date, &rows)?;

    let count = |flag: ChangeFlag| rows.iter().filter(|r| r.change_flag == flag).count();
    let outcome = ReportOutcome {
        path,
        baseline,
        rows: rows.len(),
        new: count(ChangeFlag::New),
        up: count(ChangeFlag::Up),
        down: count(ChangeFlag::Down),
        same: count(ChangeFlag::Same),
    };
    tracing::info!(
        path = %outcome.path.display(),
        rows = outcome.rows,
        new = outcome.new,
        up = outcome.up,
        down = outcome.down,
        "report written"
    );
    Ok(outcome)
}
