mod commands;
mod config;
mod error;
mod log;

pub use commands::Commands;
pub use config::*;
pub use error::{Error, ErrorKind, Result};
pub use self::log::*;
