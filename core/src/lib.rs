pub mod catalog;
pub mod context;
pub mod game_data;
pub mod game_log;
pub mod inventory;
pub mod signal_processor;
pub mod stats;

// Re-exports for convenience
pub use catalog::{CatalogStore, Freshness, JsonCatalogStore, PriceCatalog, PriceRecord};
pub use context::{AppConfig, LogMonitor, MonitorCommand, MonitorHandle, TrackingSession};
pub use game_data::*;
pub use game_log::*;
pub use inventory::{Delta, InventoryReconciler, ReconcilerState};
pub use signal_processor::{ChannelSignalHandler, EngineSignal, SignalHandler};
pub use stats::{DropLog, MapStats, SessionStatistics, TotalStats};
