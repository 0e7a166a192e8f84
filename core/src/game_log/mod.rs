mod error;
mod game_event;
mod parser;
mod reader;

pub use error::ReaderError;
pub use game_event::*;
pub use parser::LogTextParser;
pub use reader::{LogTail, read_log_chunks};
