//! Configuration for the watch process.
//!
//! Layered: built-in defaults, then a TOML settings file, then environment
//! variables. The settings file is `.bagwatch/settings.toml`, found by
//! walking up from the current directory, so the watcher can be launched
//! from anywhere inside a deployment tree.
//!
//! # Environment Variables
//!
//! Variables are prefixed with `BAGWATCH_` and use double underscores to
//! separate nesting levels:
//! - `BAGWATCH_INDEXER__COMMAND=/opt/bagit_indexer/bagit_indexer.php`
//! - `BAGWATCH_INDEXER__INTERPRETER=php`
//! - `BAGWATCH_LOGGING__DEFAULT=debug`

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;

const SETTINGS_DIR: &str = ".bagwatch";
const SETTINGS_FILE: &str = "settings.toml";

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Settings {
    /// Version of the configuration schema
    #[serde(default = "default_version")]
    pub version: u32,

    /// External indexing program
    #[serde(default)]
    pub indexer: IndexerConfig,

    /// Log output configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// How to invoke the external indexer for each new Bag.
#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct IndexerConfig {
    /// Path to the indexer executable. Required before watching can start.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub command: Option<PathBuf>,

    /// Interpreter to run the indexer with (e.g. "php" for a PHP script).
    /// When unset the command is executed directly.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub interpreter: Option<PathBuf>,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct LoggingConfig {
    /// Default log level: error, warn, info, debug, or trace
    #[serde(default = "default_log_level")]
    pub default: String,

    /// Per-module level overrides, e.g. `bagwatch = "debug"`
    #[serde(default)]
    pub modules: HashMap<String, String>,
}

fn default_version() -> u32 {
    1
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            version: default_version(),
            indexer: IndexerConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            default: default_log_level(),
            modules: HashMap::new(),
        }
    }
}

impl Settings {
    /// Load configuration from all sources.
    ///
    /// Defaults, then the discovered settings file (if any), then
    /// `BAGWATCH_*` environment variables.
    pub fn load() -> Result<Self, Box<figment::Error>> {
        let settings_path = Self::find_settings_file()
            .unwrap_or_else(|| PathBuf::from(SETTINGS_DIR).join(SETTINGS_FILE));

        Self::figment(settings_path).extract().map_err(Box::new)
    }

    /// Load configuration from a specific file, with the same defaults and
    /// environment layering as [`Settings::load`].
    pub fn load_from(path: impl AsRef<std::path::Path>) -> Result<Self, Box<figment::Error>> {
        Self::figment(path.as_ref().to_path_buf())
            .extract()
            .map_err(Box::new)
    }

    fn figment(settings_path: PathBuf) -> Figment {
        Figment::new()
            .merge(Serialized::defaults(Settings::default()))
            .merge(Toml::file(settings_path))
            // Double underscore separates nesting levels; single underscores
            // stay part of the field name.
            .merge(Env::prefixed("BAGWATCH_").map(|key| {
                key.as_str()
                    .to_lowercase()
                    .replace("__", ".")
                    .into()
            }))
    }

    /// Find the settings file by walking ancestors of the current directory.
    fn find_settings_file() -> Option<PathBuf> {
        let current = std::env::current_dir().ok()?;

        for ancestor in current.ancestors() {
            let candidate = ancestor.join(SETTINGS_DIR).join(SETTINGS_FILE);
            if candidate.is_file() {
                return Some(candidate);
            }
        }

        None
    }
}
