//! Configuration for the `argbind` binary: spec search path and logging.

mod loader;
mod types;

pub use loader::ConfigError;
pub use types::{Config, LoggingConfig, SpecsConfig};
