//! Offline page access.
//!
//! The external fetcher renders each page and saves its text under the pages
//! directory as `<stem>.md`, where the stem is the URL without its scheme and
//! with every non-alphanumeric character replaced by `_`. When the extraction
//! oracle ran on a page its candidate records sit next to it as
//! `<stem>.records.json`.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use refurb_extract::{CandidateRecord, ExtractionOracle, PageSource, ScrapeError};

/// File stem under which the fetcher stores `url`.
pub(crate) fn page_file_stem(url: &str) -> String {
    let trimmed = url
        .trim()
        .trim_start_matches("https://")
        .trim_start_matches("http://");
    trimmed
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect()
}

fn read_optional(path: &Path) -> Result<Option<String>, ScrapeError> {
    match fs::read_to_string(path) {
        Ok(text) => Ok(Some(text)),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
        Err(e) => Err(ScrapeError::Io {
            path: path.display().to_string(),
            source: e,
        }),
    }
}

#[derive(Debug, Clone)]
pub(crate) struct DirPageSource {
    dir: PathBuf,
}

impl DirPageSource {
    pub(crate) fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

impl PageSource for DirPageSource {
    fn fetch(&mut self, url: &str) -> Result<Option<String>, ScrapeError> {
        let path = self.dir.join(format!("{}.md", page_file_stem(url)));
        let page = read_optional(&path)?;
        if page.is_none() {
            tracing::debug!(url, path = %path.display(), "no captured page");
        }
        Ok(page)
    }
}

/// Replays oracle output captured alongside the pages.
#[derive(Debug, Clone)]
pub(crate) struct DirOracle {
    dir: PathBuf,
}

impl DirOracle {
    pub(crate) fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

impl ExtractionOracle for DirOracle {
    fn extract(
        &mut self,
        page_url: &str,
        _page_text: &str,
    ) -> Result<Option<Vec<CandidateRecord>>, ScrapeError> {
        let path = self
            .dir
            .join(format!("{}.records.json", page_file_stem(page_url)));
        let Some(text) = read_optional(&path)? else {
            return Ok(None);
        };
        let records: Vec<CandidateRecord> =
            serde_json::from_str(&text).map_err(|e| ScrapeError::Deserialize {
                context: path.display().to_string(),
                source: e,
            })?;
        Ok(Some(records))
    }
}
