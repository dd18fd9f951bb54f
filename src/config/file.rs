//! Configuration file and environment sources

use std::env;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use super::{parser, ConfigSource};
use crate::error::{ModGraphError, Result};
use crate::models::config::PartialSettings;
use tracing::warn;

/// Default configuration file name
pub const DEFAULT_CONFIG_FILE: &str = ".modgraph.toml";

/// Configuration file source
pub struct FileConfig {
    path: PathBuf,
    name: String,
    priority: u8,
}

impl FileConfig {
    /// Create a new file configuration source with the default path
    pub fn new() -> Self {
        Self {
            path: PathBuf::from(DEFAULT_CONFIG_FILE),
            name: "default config file".to_string(),
            priority: 20,
        }
    }

    /// Create a new file configuration source with a custom path
    pub fn with_path<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            name: format!("config file ({})", path.as_ref().display()),
            priority: 20,
        }
    }

    /// Set the priority for this configuration source
    pub fn with_priority(mut self, priority: u8) -> Self {
        self.priority = priority;
        self
    }

    /// Get the path of this configuration file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Create a default configuration file at this location
    pub fn create_default(&self) -> Result<()> {
        parser::create_default_config(&self.path)
    }
}

impl ConfigSource for FileConfig {
    fn load(&self) -> Result<PartialSettings> {
        if !self.is_available() {
            return Err(ModGraphError::ConfigNotFound {
                path: self.path.clone(),
            });
        }

        parser::parse_config_file(&self.path)
    }

    fn is_available(&self) -> bool {
        self.path.is_file()
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn priority(&self) -> u8 {
        self.priority
    }
}

impl Default for FileConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Variable suffixes understood by [`EnvConfig`]
const ENV_KEYS: &[&str] = &[
    "ADDONS_PATHS",
    "EXCLUDE",
    "OUTPUT_FORMAT",
    "OUTPUT_FILE",
    "INCLUDE_CORE",
    "INCLUDE_EXTERNAL",
    "TREE_DEPTH",
    "USE_COLORS",
    "QUIET",
    "VERBOSE",
    "SHOW_PROGRESS",
];

/// Environment variable configuration source
///
/// Reads `<PREFIX>_ADDONS_PATHS` and `<PREFIX>_EXCLUDE` as comma-separated
/// lists; the remaining keys hold a single value. Unparsable values are
/// logged and ignored.
pub struct EnvConfig {
    prefix: String,
    name: String,
    priority: u8,
}

impl EnvConfig {
    /// Create a new environment variable configuration source
    pub fn new(prefix: impl Into<String>) -> Self {
        let prefix = prefix.into();
        Self {
            name: format!("{} environment variables", &prefix),
            prefix,
            priority: 10,
        }
    }

    /// Set the priority for this configuration source
    pub fn with_priority(mut self, priority: u8) -> Self {
        self.priority = priority;
        self
    }

    fn var(&self, key: &str) -> Option<String> {
        env::var(format!("{}_{}", self.prefix, key))
            .ok()
            .filter(|value| !value.trim().is_empty())
    }

    fn list(&self, key: &str) -> Option<Vec<String>> {
        self.var(key).map(|value| {
            value
                .split(',')
                .map(str::trim)
                .filter(|item| !item.is_empty())
                .map(String::from)
                .collect()
        })
    }

    fn parsed<T: FromStr>(&self, key: &str) -> Option<T> {
        let value = self.var(key)?;
        match value.trim().parse() {
            Ok(parsed) => Some(parsed),
            Err(_) => {
                warn!("Ignoring {}_{}: invalid value '{}'", self.prefix, key, value);
                None
            }
        }
    }

    fn flag(&self, key: &str) -> Option<bool> {
        let value = self.var(key)?;
        match value.trim().to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => Some(true),
            "0" | "false" | "no" | "off" => Some(false),
            _ => {
                warn!("Ignoring {}_{}: expected a boolean, got '{}'", self.prefix, key, value);
                None
            }
        }
    }
}

impl ConfigSource for EnvConfig {
    fn load(&self) -> Result<PartialSettings> {
        Ok(PartialSettings {
            addons_paths: self
                .list("ADDONS_PATHS")
                .map(|paths| paths.into_iter().map(PathBuf::from).collect()),
            exclude_patterns: self.list("EXCLUDE"),
            output_format: self.parsed("OUTPUT_FORMAT"),
            output_file: self.var("OUTPUT_FILE").map(PathBuf::from),
            include_core: self.flag("INCLUDE_CORE"),
            include_external: self.flag("INCLUDE_EXTERNAL"),
            tree_depth: self.parsed("TREE_DEPTH"),
            use_colors: self.flag("USE_COLORS"),
            quiet: self.flag("QUIET"),
            verbose: self.flag("VERBOSE"),
            show_progress: self.flag("SHOW_PROGRESS"),
        })
    }

    fn is_available(&self) -> bool {
        ENV_KEYS.iter().any(|key| self.var(key).is_some())
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn priority(&self) -> u8 {
        self.priority
    }
}
