//! Validation of resolved settings

use std::path::Path;

use crate::error::{ModGraphError, Result};
use crate::models::config::Settings;
use tracing::warn;

/// Settings validator for ensuring configuration is valid
pub struct SettingsValidator;

impl SettingsValidator {
    /// Validate settings and return errors if invalid
    ///
    /// Addons paths that do not exist are only warned about here; the
    /// scanner skips them.
    pub fn validate(settings: &Settings) -> Result<()> {
        if settings.addons_paths.is_empty() {
            return Err(ModGraphError::config_error("At least one addons path is required"));
        }

        for path in &settings.addons_paths {
            if !path.exists() {
                warn!("Addons path does not exist: {}", path.display());
            }
        }

        for pattern in &settings.exclude_patterns {
            glob::Pattern::new(pattern)?;
        }

        if settings.tree_depth == 0 {
            return Err(ModGraphError::config_error("Tree depth must be at least 1"));
        }

        if let Some(path) = &settings.output_file {
            Self::validate_output_path(path)?;
        }

        Ok(())
    }

    /// Validate that an output path can be created
    fn validate_output_path(path: &Path) -> Result<()> {
        let Some(parent) = path.parent() else {
            return Ok(());
        };
        if parent.as_os_str().is_empty() {
            return Ok(());
        }
        if !parent.is_dir() {
            return Err(ModGraphError::OutputDirectoryNotFound {
                path: parent.to_path_buf(),
            });
        }

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let metadata = std::fs::metadata(parent).map_err(ModGraphError::io_error)?;
            if metadata.permissions().mode() & 0o200 == 0 {
                return Err(ModGraphError::permission_denied(parent));
            }
        }

        Ok(())
    }
}
