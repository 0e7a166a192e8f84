//! Error types for the price catalog store

use std::path::PathBuf;
use thiserror::Error;

/// Errors while loading or persisting catalog records
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("failed to read catalog file {path}")]
    ReadFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse catalog file {path}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to serialize catalog")]
    Serialize(#[source] serde_json::Error),

    #[error("failed to write catalog file {path}")]
    WriteFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid item id '{key}' in {path}")]
    InvalidItemId { path: PathBuf, key: String },
}
