//! Error types and definitions for modgraph
//!
//! Data-quality problems (bad manifests, unreadable sources, cycles) are
//! recovered where they happen and never reach this type. What does reach it
//! is configuration and I/O failure at the edges, plus sequence errors such
//! as querying an analyzer before it has scanned anything.

use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Error severity levels for different error types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorSeverity {
    /// Warning level errors - operation can continue
    Warning,
    /// Error level - current operation fails but overall process can continue
    Error,
    /// Critical level - process should terminate
    Critical,
}

impl fmt::Display for ErrorSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorSeverity::Warning => write!(f, "WARNING"),
            ErrorSeverity::Error => write!(f, "ERROR"),
            ErrorSeverity::Critical => write!(f, "CRITICAL"),
        }
    }
}

/// Main error type for modgraph operations
#[derive(Debug, Error)]
pub enum ModGraphError {
    /// Standard IO errors
    #[error("IO error: {source}")]
    Io {
        #[source]
        source: std::io::Error,
    },

    /// Configuration errors
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// Permission denied errors
    #[error("Permission denied accessing {path}")]
    PermissionDenied { path: PathBuf },

    /// Invalid path errors
    #[error("Invalid path: {path}")]
    InvalidPath { path: PathBuf },

    /// CSV handling errors
    #[error("CSV error: {source}")]
    Csv {
        #[source]
        source: csv::Error,
    },

    /// Glob pattern errors
    #[error("Glob pattern error: {source}")]
    GlobPattern {
        #[source]
        source: glob::PatternError,
    },

    /// Configuration file not found
    #[error("Configuration file not found at {path}")]
    ConfigNotFound { path: PathBuf },

    /// Configuration file read errors
    #[error("Error reading configuration file {path}: {source}")]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Configuration file parse errors
    #[error("Error parsing configuration file {path}: {source}")]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    /// Invalid output format
    #[error("Invalid output format: {format}")]
    InvalidOutputFormat { format: String },

    /// Output file write errors
    #[error("Error writing to output file {path}: {source}")]
    OutputWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Stdout write errors
    #[error("Error writing to stdout: {source}")]
    StdoutWrite {
        #[source]
        source: std::io::Error,
    },

    /// Directory traversal errors
    #[error("Directory traversal error for {path}: {message}")]
    DirectoryTraversal { path: PathBuf, message: String },

    /// A query was issued before any module set was scanned
    #[error("No modules have been scanned yet")]
    NotScanned,

    /// A graph query was issued before the dependency graph was built
    #[error("Dependency graph has not been built; call build_graph() after scan()")]
    GraphNotBuilt,

    /// A version comparison was requested before both sides were loaded
    #[error("Version comparison requires the {missing} module set to be loaded")]
    VersionsNotLoaded { missing: &'static str },

    /// A module named on the command line is not part of the scanned set
    #[error("Module not found: {name}")]
    ModuleNotFound { name: String },

    /// JSON serialization error
    #[error("JSON serialization error: {source}")]
    JsonSerialize {
        #[source]
        source: serde_json::Error,
    },

    /// CSV serialization error
    #[error("CSV serialization error: {source}")]
    CsvSerialize {
        #[source]
        source: std::string::FromUtf8Error,
    },

    /// Output directory not found
    #[error("Output directory not found: {path}")]
    OutputDirectoryNotFound { path: PathBuf },
}

impl ModGraphError {
    /// Get the severity level of this error
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            // Warning level errors - operation can continue
            ModGraphError::PermissionDenied { .. } => ErrorSeverity::Warning,
            ModGraphError::DirectoryTraversal { .. } => ErrorSeverity::Warning,

            // Critical errors - process should terminate
            ModGraphError::Config { .. } => ErrorSeverity::Critical,
            ModGraphError::ConfigNotFound { .. } => ErrorSeverity::Critical,
            ModGraphError::ConfigRead { .. } => ErrorSeverity::Critical,
            ModGraphError::ConfigParse { .. } => ErrorSeverity::Critical,
            ModGraphError::InvalidOutputFormat { .. } => ErrorSeverity::Critical,
            ModGraphError::StdoutWrite { .. } => ErrorSeverity::Critical,
            ModGraphError::OutputDirectoryNotFound { .. } => ErrorSeverity::Critical,
            ModGraphError::NotScanned => ErrorSeverity::Critical,
            ModGraphError::GraphNotBuilt => ErrorSeverity::Critical,
            ModGraphError::VersionsNotLoaded { .. } => ErrorSeverity::Critical,

            // Regular errors - current operation fails but overall process can continue
            _ => ErrorSeverity::Error,
        }
    }

    /// Get a user-friendly error message
    pub fn user_message(&self) -> String {
        match self {
            ModGraphError::PermissionDenied { path } => {
                format!("Cannot access '{}' due to permission denied. Check file permissions.", path.display())
            }
            ModGraphError::Io { source } => {
                format!("File system error: {}. Check disk space and permissions.", source)
            }
            ModGraphError::InvalidPath { path } => {
                format!("Invalid path: '{}'. Please provide a valid addons directory.", path.display())
            }
            ModGraphError::ConfigNotFound { path } => {
                format!("Configuration file not found at '{}'. Create a config file or use command line options.", path.display())
            }
            ModGraphError::ModuleNotFound { name } => {
                format!("Module '{}' was not found in the scanned addons paths.", name)
            }
            ModGraphError::OutputDirectoryNotFound { path } => {
                format!("Output directory '{}' does not exist. Please create the directory or specify a different output path.", path.display())
            }
            // For other errors, use the standard Display implementation
            _ => self.to_string(),
        }
    }

    /// Create an IO error with context
    pub fn io_error(source: std::io::Error) -> Self {
        ModGraphError::Io { source }
    }

    /// Create a configuration error
    pub fn config_error(message: impl Into<String>) -> Self {
        ModGraphError::Config {
            message: message.into(),
        }
    }

    /// Create a permission denied error
    pub fn permission_denied(path: impl Into<PathBuf>) -> Self {
        ModGraphError::PermissionDenied { path: path.into() }
    }
}

// Implement From for common error types
impl From<std::io::Error> for ModGraphError {
    fn from(err: std::io::Error) -> Self {
        ModGraphError::io_error(err)
    }
}

impl From<csv::Error> for ModGraphError {
    fn from(err: csv::Error) -> Self {
        ModGraphError::Csv { source: err }
    }
}

impl From<glob::PatternError> for ModGraphError {
    fn from(err: glob::PatternError) -> Self {
        ModGraphError::GlobPattern { source: err }
    }
}

impl From<serde_json::Error> for ModGraphError {
    fn from(err: serde_json::Error) -> Self {
        ModGraphError::JsonSerialize { source: err }
    }
}

/// Result type alias for modgraph operations
pub type Result<T> = std::result::Result<T, ModGraphError>;
