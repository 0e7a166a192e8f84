pub mod handler;
pub mod signal;

pub use handler::{ChannelSignalHandler, SignalHandler};
pub use signal::EngineSignal;
