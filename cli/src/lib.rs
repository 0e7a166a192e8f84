pub mod commands;
pub mod context;
pub mod logging;
pub mod presenter;

pub use context::{CliContext, EngineHandles};
