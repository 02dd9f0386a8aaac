use std::sync::OnceLock;

use crate::runtime;
use crate::tag::TagAlphabet;

///////////////////////////////
/// Global Config Options
pub static CONFIG: OnceLock<Config> = OnceLock::new();

#[derive(Clone, Debug)]
pub struct Config {
    pub log_level: Option<runtime::LogLevel>,
    pub alphabet: TagAlphabet,
}

impl Config {
    ///////////////////////////////
    /// Store the config for the rest of the process. Only the first call has any effect
    pub fn init(config: Config) -> &'static Config {
        CONFIG.get_or_init(|| config)
    }

    ///////////////////////////////
    /// Get the process-wide config; falls back to defaults if the binary never set one
    pub fn get() -> &'static Config {
        CONFIG.get_or_init(Config::default)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_level: None,
            alphabet: TagAlphabet::Numeric,
        }
    }
}
