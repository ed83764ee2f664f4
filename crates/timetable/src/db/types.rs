/// Database types for the key-value store
use chrono::{DateTime, Utc};
use thiserror::Error;

/// A stored value with its last write time.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredEntry {
    pub key: String,
    pub value: String,
    pub updated_at: DateTime<Utc>,
}

/// Errors raised by key-value store backends.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
