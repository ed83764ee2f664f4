//! Error types for catalog loading.

use thiserror::Error;

/// The course catalog could not be loaded.
///
/// Selection and filtering stay unavailable until a catalog is present.
#[derive(Debug, Error)]
pub enum CatalogLoadError {
    /// Reading a local catalog file failed
    #[error("Failed to read catalog file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Fetching a remote catalog failed
    #[error("Failed to fetch catalog from {url}: {source}")]
    Http {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// The remote server answered with a non-success status
    #[error("Catalog request to {url} returned status {status}")]
    Status { url: String, status: u16 },

    /// The catalog body is not a JSON array of courses
    #[error("Catalog is not a valid course list: {0}")]
    Decode(#[from] serde_json::Error),

    /// The source string is neither a path nor an http(s) URL
    #[error("Unsupported catalog source: {0}")]
    UnsupportedSource(String),
}
