//! Error types for the drop audit log

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AuditError {
    #[error("failed to open drop log {path}")]
    OpenFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to append to drop log {path}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
