//! Configuration-related data structures

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Main configuration settings for modgraph
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Directories to scan for modules
    pub addons_paths: Vec<PathBuf>,

    /// Glob patterns for directories to skip while scanning
    pub exclude_patterns: Vec<String>,

    /// Output format (text, json, dot, csv)
    pub output_format: OutputFormat,

    /// Output file path (if not specified, output to stdout)
    pub output_file: Option<PathBuf>,

    /// Whether core modules are listed in dependency queries
    pub include_core: bool,

    /// Whether external placeholder nodes are included in graph exports
    pub include_external: bool,

    /// Maximum depth of the rendered dependency tree
    pub tree_depth: usize,

    /// Whether to use colors in text output
    pub use_colors: bool,

    /// Whether to suppress non-essential output
    pub quiet: bool,

    /// Whether to show detailed progress and debug information
    pub verbose: bool,

    /// Whether to show a progress spinner while scanning
    pub show_progress: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            addons_paths: vec![PathBuf::from(".")],
            exclude_patterns: Vec::new(),
            output_format: OutputFormat::Text,
            output_file: None,
            include_core: true,
            include_external: true,
            tree_depth: 5,
            use_colors: true,
            quiet: false,
            verbose: false,
            show_progress: true,
        }
    }
}

/// Supported output formats
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Human-readable text output
    Text,
    /// JSON output for programmatic consumption
    Json,
    /// Graphviz DOT output of the dependency graph
    Dot,
    /// CSV module inventory for spreadsheet analysis
    Csv,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" => Ok(OutputFormat::Text),
            "json" => Ok(OutputFormat::Json),
            "dot" => Ok(OutputFormat::Dot),
            "csv" => Ok(OutputFormat::Csv),
            _ => Err(format!("Invalid output format: {}", s)),
        }
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Text => write!(f, "text"),
            OutputFormat::Json => write!(f, "json"),
            OutputFormat::Dot => write!(f, "dot"),
            OutputFormat::Csv => write!(f, "csv"),
        }
    }
}

/// Partial settings for configuration merging
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PartialSettings {
    pub addons_paths: Option<Vec<PathBuf>>,
    pub exclude_patterns: Option<Vec<String>>,
    pub output_format: Option<OutputFormat>,
    pub output_file: Option<PathBuf>,
    pub include_core: Option<bool>,
    pub include_external: Option<bool>,
    pub tree_depth: Option<usize>,
    pub use_colors: Option<bool>,
    pub quiet: Option<bool>,
    pub verbose: Option<bool>,
    pub show_progress: Option<bool>,
}

impl PartialSettings {
    /// Merge another PartialSettings into this one
    /// Fields from `other` take precedence over existing fields
    pub fn merge_from(&mut self, other: PartialSettings) {
        if other.addons_paths.is_some() {
            self.addons_paths = other.addons_paths;
        }
        if other.exclude_patterns.is_some() {
            self.exclude_patterns = other.exclude_patterns;
        }
        if other.output_format.is_some() {
            self.output_format = other.output_format;
        }
        if other.output_file.is_some() {
            self.output_file = other.output_file;
        }
        if other.include_core.is_some() {
            self.include_core = other.include_core;
        }
        if other.include_external.is_some() {
            self.include_external = other.include_external;
        }
        if other.tree_depth.is_some() {
            self.tree_depth = other.tree_depth;
        }
        if other.use_colors.is_some() {
            self.use_colors = other.use_colors;
        }
        if other.quiet.is_some() {
            self.quiet = other.quiet;
        }
        if other.verbose.is_some() {
            self.verbose = other.verbose;
        }
        if other.show_progress.is_some() {
            self.show_progress = other.show_progress;
        }
    }

    /// Convert partial settings to full settings
    /// Uses defaults for any fields that are None
    pub fn to_settings(&self) -> Settings {
        let mut settings = Settings::default();

        if let Some(addons_paths) = &self.addons_paths {
            settings.addons_paths = addons_paths.clone();
        }
        if let Some(exclude_patterns) = &self.exclude_patterns {
            settings.exclude_patterns = exclude_patterns.clone();
        }
        if let Some(output_format) = self.output_format {
            settings.output_format = output_format;
        }
        if let Some(output_file) = &self.output_file {
            settings.output_file = Some(output_file.clone());
        }
        if let Some(include_core) = self.include_core {
            settings.include_core = include_core;
        }
        if let Some(include_external) = self.include_external {
            settings.include_external = include_external;
        }
        if let Some(tree_depth) = self.tree_depth {
            settings.tree_depth = tree_depth;
        }
        if let Some(use_colors) = self.use_colors {
            settings.use_colors = use_colors;
        }
        if let Some(quiet) = self.quiet {
            settings.quiet = quiet;
        }
        if let Some(verbose) = self.verbose {
            settings.verbose = verbose;
        }
        if let Some(show_progress) = self.show_progress {
            settings.show_progress = show_progress;
        }

        settings
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_format_parsing() {
        assert_eq!("DOT".parse::<OutputFormat>().unwrap(), OutputFormat::Dot);
        assert_eq!("csv".parse::<OutputFormat>().unwrap(), OutputFormat::Csv);
        assert!("yaml".parse::<OutputFormat>().is_err());
    }

    #[test]
    fn test_partial_settings_precedence() {
        let mut base = PartialSettings {
            tree_depth: Some(3),
            quiet: Some(true),
            ..Default::default()
        };
        base.merge_from(PartialSettings {
            tree_depth: Some(8),
            ..Default::default()
        });

        let settings = base.to_settings();
        assert_eq!(settings.tree_depth, 8);
        assert!(settings.quiet);
        assert!(settings.include_core);
        assert_eq!(settings.output_format, OutputFormat::Text);
    }
}
