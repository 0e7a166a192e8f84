//! Session and per-map drop statistics valued against the price catalog.

mod audit;
mod error;
mod session;
mod summary;


pub use audit::{AuditSink, DropEntry, DropLog, format_unit_price};
pub use error::AuditError;
pub use session::{SessionStatistics, ValuedChange};
pub use summary::{MapStats, TotalStats, drops_in_categories, format_duration};
