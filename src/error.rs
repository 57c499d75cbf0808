// Error types for dataset and basemap loading.

use thiserror::Error;

/// Errors that can occur while fetching or parsing remote resources.
#[derive(Debug, Error)]
pub enum LoadError {
    /// Transport-level failure from the browser fetch.
    #[error("HTTP request error: {0}")]
    Http(#[from] gloo_net::Error),

    /// The server answered with a non-success status.
    #[error("HTTP {status} fetching {url}")]
    Status {
        /// Response status code.
        status: u16,
        /// Requested URL.
        url: String,
    },

    /// Malformed CSV record or header.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// A required column is absent from the header row.
    #[error("CSV is missing column {0:?}")]
    MissingColumn(String),

    /// Basemap style document is not valid JSON.
    #[error("style JSON error: {0}")]
    Style(#[from] serde_json::Error),
}
