//! Error types for context operations

use thiserror::Error;

/// Errors during configuration operations
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load configuration")]
    Load(#[from] confy::ConfyError),

    #[error("failed to save configuration")]
    Save(#[source] confy::ConfyError),
}

/// Errors starting the background log monitor
#[derive(Debug, Error)]
pub enum MonitorError {
    #[error("failed to spawn log monitor thread")]
    Spawn(#[source] std::io::Error),

    #[error("log monitor thread panicked")]
    Panicked,
}
