//! Path context for traversal errors, and reporting the error that ends a
//! command.

use crate::error::{ErrorSeverity, ModGraphError, Result};
use std::io;
use std::path::Path;
use tracing::debug;

/// Extension trait attaching the path being traversed to an I/O failure
pub trait ResultExt<T> {
    /// Permission problems become `PermissionDenied`, anything else
    /// `DirectoryTraversal`; both are warnings the scan recovers from
    fn with_file_context<P: AsRef<Path>>(self, path: P) -> Result<T>;
}

impl<T> ResultExt<T> for std::result::Result<T, io::Error> {
    fn with_file_context<P: AsRef<Path>>(self, path: P) -> Result<T> {
        self.map_err(|err| {
            let path = path.as_ref().to_path_buf();
            match err.kind() {
                io::ErrorKind::PermissionDenied => ModGraphError::PermissionDenied { path },
                _ => ModGraphError::DirectoryTraversal {
                    path,
                    message: err.to_string(),
                },
            }
        })
    }
}

/// Process exit code for an error that ends a command
pub fn exit_code(err: &ModGraphError) -> i32 {
    match err.severity() {
        ErrorSeverity::Warning => 0,
        ErrorSeverity::Error => 1,
        ErrorSeverity::Critical => 2,
    }
}

/// Print the error that ended a command and return the exit code to use
pub fn report_error(err: &ModGraphError) -> i32 {
    debug!("Command failed: {:?}", err);
    eprintln!("{}: {}", err.severity(), err.user_message());
    exit_code(err)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_with_file_context() {
        let result: std::result::Result<(), io::Error> =
            Err(io::Error::new(io::ErrorKind::NotFound, "file not found"));

        match result.with_file_context("addons/sale_ext") {
            Err(ModGraphError::DirectoryTraversal { path, message }) => {
                assert_eq!(path.to_string_lossy(), "addons/sale_ext");
                assert_eq!(message, "file not found");
            }
            other => panic!("Expected DirectoryTraversal error, got {:?}", other),
        }
    }

    #[test]
    fn test_with_file_context_permission_denied() {
        let result: std::result::Result<(), io::Error> =
            Err(io::Error::new(io::ErrorKind::PermissionDenied, "permission denied"));

        match result.with_file_context("addons/locked") {
            Err(ModGraphError::PermissionDenied { path }) => {
                assert_eq!(path.to_string_lossy(), "addons/locked");
            }
            other => panic!("Expected PermissionDenied error, got {:?}", other),
        }
    }

    #[test]
    fn test_exit_codes_follow_severity() {
        let denied = ModGraphError::permission_denied("addons/locked");
        let missing = ModGraphError::ModuleNotFound { name: "sale_ext".to_string() };
        let unscanned = ModGraphError::NotScanned;

        assert_eq!(exit_code(&denied), 0);
        assert_eq!(exit_code(&missing), 1);
        assert_eq!(exit_code(&unscanned), 2);
        assert_eq!(report_error(&missing), 1);
    }
}
