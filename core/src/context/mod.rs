mod config;
mod error;
mod monitor;
mod session;

pub use config::AppConfig;
pub use error::{ConfigError, MonitorError};
pub use monitor::{LogMonitor, MonitorCommand, MonitorHandle, MonitorSettings};
pub use session::{ChunkReport, TrackingSession};
