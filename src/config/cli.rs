//! Command-line argument configuration source

use std::path::PathBuf;

use super::ConfigSource;
use crate::cli::args::Args;
use crate::error::Result;
use crate::models::config::{OutputFormat, PartialSettings};

/// Command-line argument configuration source
#[derive(Debug)]
pub struct CliConfig {
    args: CliArgs,
    name: String,
    priority: u8,
}

/// Settings-related command-line arguments
///
/// Flags only override lower layers when they were actually given.
#[derive(Debug, Clone, Default)]
pub struct CliArgs {
    pub paths: Vec<PathBuf>,
    pub exclude: Vec<String>,
    pub output_format: Option<OutputFormat>,
    pub output_file: Option<PathBuf>,
    pub tree_depth: Option<usize>,
    pub no_core: bool,
    pub no_external: bool,
    pub no_colors: bool,
    pub no_progress: bool,
    pub quiet: bool,
    pub verbose: bool,
    pub config: Option<PathBuf>,
}

impl CliArgs {
    /// Extract the settings-related flags from parsed arguments
    pub fn from_args(args: &Args) -> Self {
        Self {
            paths: args.path.clone(),
            exclude: args.exclude.clone(),
            output_format: args.output.map(Into::into),
            output_file: args.output_file.clone(),
            tree_depth: args.tree_depth,
            no_core: args.no_core,
            no_external: args.no_external,
            no_colors: args.no_colors,
            no_progress: args.no_progress,
            quiet: args.quiet,
            verbose: args.verbose,
            config: args.config.clone(),
        }
    }
}

impl CliConfig {
    /// Create a new CLI configuration source
    pub fn new(args: CliArgs) -> Self {
        Self {
            args,
            name: "command-line arguments".to_string(),
            priority: 30,
        }
    }

    /// Create a CLI configuration source from Args
    pub fn from_args(args: &Args) -> Self {
        Self::new(CliArgs::from_args(args))
    }

    /// Set the priority for this configuration source
    pub fn with_priority(mut self, priority: u8) -> Self {
        self.priority = priority;
        self
    }

    /// Get the config file path if specified
    pub fn config_path(&self) -> Option<&PathBuf> {
        self.args.config.as_ref()
    }
}

impl ConfigSource for CliConfig {
    fn load(&self) -> Result<PartialSettings> {
        let args = &self.args;
        let mut settings = PartialSettings::default();

        if !args.paths.is_empty() {
            settings.addons_paths = Some(args.paths.clone());
        }
        if !args.exclude.is_empty() {
            settings.exclude_patterns = Some(args.exclude.clone());
        }
        settings.output_format = args.output_format;
        settings.output_file = args.output_file.clone();
        settings.tree_depth = args.tree_depth;

        // Boolean flags
        if args.no_core {
            settings.include_core = Some(false);
        }
        if args.no_external {
            settings.include_external = Some(false);
        }
        if args.no_colors {
            settings.use_colors = Some(false);
        }
        if args.no_progress {
            settings.show_progress = Some(false);
        }
        if args.quiet {
            settings.quiet = Some(true);
            settings.show_progress = Some(false);
        }
        if args.verbose {
            settings.verbose = Some(true);
        }

        Ok(settings)
    }

    fn is_available(&self) -> bool {
        true
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn priority(&self) -> u8 {
        self.priority
    }
}
