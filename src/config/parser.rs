//! Configuration file parsing utilities

use std::fs;
use std::path::{Path, PathBuf};

use super::file::DEFAULT_CONFIG_FILE;
use crate::error::{ModGraphError, Result};
use crate::models::config::PartialSettings;
use tracing::debug;

/// Template written by `modgraph --init`
const DEFAULT_CONFIG_TEMPLATE: &str = include_str!("default_config.toml");

/// Parse a TOML configuration file into PartialSettings
pub fn parse_config_file<P: AsRef<Path>>(path: P) -> Result<PartialSettings> {
    let path = path.as_ref();

    if !path.exists() {
        return Err(ModGraphError::ConfigNotFound {
            path: path.to_path_buf(),
        });
    }

    let content = fs::read_to_string(path).map_err(|source| ModGraphError::ConfigRead {
        path: path.to_path_buf(),
        source,
    })?;

    parse_config_content(&content, path)
}

/// Parse TOML configuration content into PartialSettings
pub fn parse_config_content<P: AsRef<Path>>(content: &str, path: P) -> Result<PartialSettings> {
    let path = path.as_ref();

    let settings: PartialSettings =
        toml::from_str(content).map_err(|source| ModGraphError::ConfigParse {
            path: path.to_path_buf(),
            source,
        })?;

    validate_partial_settings(&settings, path)?;

    Ok(settings)
}

fn invalid(path: &Path, problem: impl std::fmt::Display) -> ModGraphError {
    ModGraphError::config_error(format!("{} in config file: {}", problem, path.display()))
}

/// Validate partial settings for obvious errors
pub fn validate_partial_settings<P: AsRef<Path>>(settings: &PartialSettings, path: P) -> Result<()> {
    let path = path.as_ref();

    if let Some(paths) = &settings.addons_paths {
        if paths.iter().any(|addons| addons.as_os_str().is_empty()) {
            return Err(invalid(path, "Empty entry in addons_paths"));
        }
    }

    if let Some(patterns) = &settings.exclude_patterns {
        for pattern in patterns {
            if pattern.is_empty() {
                return Err(invalid(path, "Empty exclude pattern"));
            }
            glob::Pattern::new(pattern)
                .map_err(|err| invalid(path, format!("Invalid exclude pattern '{}': {}", pattern, err)))?;
        }
    }

    if settings.tree_depth == Some(0) {
        return Err(invalid(path, "Invalid tree_depth 0 (must be at least 1)"));
    }

    if let Some(output_file) = &settings.output_file {
        if output_file.as_os_str().is_empty() {
            return Err(invalid(path, "Invalid empty output_file"));
        }
    }

    Ok(())
}

/// Candidate locations for the default configuration file, in lookup order
pub fn default_config_locations() -> Vec<PathBuf> {
    let mut locations = vec![PathBuf::from(DEFAULT_CONFIG_FILE)];
    if let Some(home_dir) = dirs::home_dir() {
        locations.push(home_dir.join(DEFAULT_CONFIG_FILE));
    }
    if let Some(config_dir) = dirs::config_dir() {
        locations.push(config_dir.join("modgraph").join("config.toml"));
    }
    locations
}

/// Find and load configuration from the first default location that exists
pub fn find_default_config() -> Result<Option<PartialSettings>> {
    for location in default_config_locations() {
        if location.is_file() {
            debug!("Using configuration file {}", location.display());
            return parse_config_file(&location).map(Some);
        }
    }
    Ok(None)
}

/// Create a default configuration file at the specified path
pub fn create_default_config<P: AsRef<Path>>(path: P) -> Result<()> {
    let path = path.as_ref();

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            fs::create_dir_all(parent).map_err(ModGraphError::io_error)?;
        }
    }

    fs::write(path, DEFAULT_CONFIG_TEMPLATE).map_err(|source| ModGraphError::OutputWrite {
        path: path.to_path_buf(),
        source,
    })
}
