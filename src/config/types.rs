use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Root configuration container.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub specs: SpecsConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Where spec manifests are looked up by name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpecsConfig {
    /// Directories searched in order for `<name>.toml`.
    #[serde(default = "default_spec_dirs")]
    pub dirs: Vec<PathBuf>,
}

/// Logging settings for the `argbind` binary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Default filter when `RUST_LOG` is unset (e.g. "warn", "argbind=debug").
    #[serde(default = "default_log_level")]
    pub level: String,
}

fn default_spec_dirs() -> Vec<PathBuf> {
    let config_dir = dirs::config_dir().unwrap_or_else(|| PathBuf::from("."));
    vec![config_dir.join("argbind").join("specs")]
}

fn default_log_level() -> String {
    "warn".to_string()
}

impl Default for SpecsConfig {
    fn default() -> Self {
        Self {
            dirs: default_spec_dirs(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            specs: SpecsConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}
