use thiserror::Error;

#[derive(Debug, Error)]
pub enum ScrapeError {
    #[error("page source failed for {url}: {reason}")]
    PageSource { url: String, reason: String },

    #[error("failed to read page file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("extraction oracle failed for {url}: {reason}")]
    Oracle { url: String, reason: String },

    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },
}
