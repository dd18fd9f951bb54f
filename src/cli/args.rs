//! Command-line argument parsing

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// modgraph - dependency analyzer for Odoo-style addon modules
#[derive(Parser, Debug, Clone)]
#[command(name = "modgraph")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Analyze dependencies between Odoo-style addon modules")]
#[command(long_about = "modgraph scans addons directories for modules described by a manifest \
(__manifest__.py or __openerp__.py), builds their dependency graph and answers questions about it: \
install order, circular and missing dependencies, dependency trees, model definitions, \
and the upgrade impact of a module or the differences between two versions of an addons tree.")]
#[command(after_help = "EXAMPLES:

Scanning:
    # Summarize the modules under the current directory
    modgraph scan

    # Scan several addons paths, skipping test modules
    modgraph --path ./odoo/addons --path ./custom --exclude '*_test' scan

Dependencies:
    # Details and dependency tree of one module
    modgraph --path ./custom deps sale_custom

    # Install order for a few modules
    modgraph --path ./custom order -m sale_custom -m stock_custom

    # Fail in CI when there are cycles or missing dependencies
    modgraph --path ./custom --quiet check

Export:
    # Graphviz rendering of the dependency graph
    modgraph --path ./custom export --format dot --output-file deps.dot

    # Full analysis as JSON
    modgraph --path ./custom export

Upgrades:
    # Risk of upgrading a module
    modgraph --path ./custom impact sale

    # Compare two versions of an addons tree
    modgraph compare --source ./v16/addons --target ./v17/addons

Configuration:
    # Create a default configuration file (.modgraph.toml)
    modgraph --init
")]
pub struct Args {
    /// Addons directories to scan
    #[arg(short, long, global = true, value_name = "PATH", help = "Addons directory to scan (can be given multiple times; defaults to the current directory)")]
    pub path: Vec<PathBuf>,

    /// Exclude directories matching these glob patterns
    #[arg(short, long, global = true, value_name = "PATTERN", help = "Glob pattern for module directories to skip (can be given multiple times, e.g. --exclude '*_test')")]
    pub exclude: Vec<String>,

    /// Output format
    #[arg(short, long, global = true, value_enum, help = "Output format: 'text' for humans, 'json' for programs, 'dot' for Graphviz, 'csv' for spreadsheets")]
    pub output: Option<OutputFormat>,

    /// Output file path (stdout if not specified)
    #[arg(long, global = true, value_name = "FILE", help = "File to write output to (uses stdout if not specified)")]
    pub output_file: Option<PathBuf>,

    /// Suppress non-essential output
    #[arg(short, long, global = true, help = "Suppress non-essential output (summaries only, no progress, errors only in logs)")]
    pub quiet: bool,

    /// Show detailed information
    #[arg(short, long, global = true, help = "Show module paths, model fields and informational log messages")]
    pub verbose: bool,

    /// Configuration file path
    #[arg(short, long, global = true, value_name = "FILE", help = "Path to configuration file (defaults to .modgraph.toml in the current directory)")]
    pub config: Option<PathBuf>,

    /// Disable colored output
    #[arg(long, global = true, help = "Disable colored output (useful when piping output)")]
    pub no_colors: bool,

    /// Disable the progress spinner
    #[arg(long, global = true, help = "Disable the progress spinner (useful for CI environments)")]
    pub no_progress: bool,

    /// Leave core modules out of dependency lists
    #[arg(long, global = true, help = "Leave core distribution modules out of transitive dependency lists")]
    pub no_core: bool,

    /// Leave unscanned dependencies out of graph exports
    #[arg(long, global = true, help = "Leave dependencies that were not found on disk out of graph output")]
    pub no_external: bool,

    /// Maximum depth of the dependency tree
    #[arg(long, global = true, value_name = "DEPTH", help = "Maximum depth of the rendered dependency tree (default: 5)")]
    pub tree_depth: Option<usize>,

    /// Initialize a default configuration file
    #[arg(long, help = "Create a default configuration file (.modgraph.toml) in the current directory")]
    pub init: bool,

    #[command(subcommand)]
    pub command: Option<SubCommand>,
}

/// Analyses offered on the command line
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum SubCommand {
    /// Scan addons paths and summarize modules and problems (default)
    Scan,

    /// Show dependencies, dependents and the dependency tree of a module
    Deps {
        /// Module name
        module: String,
    },

    /// Compute an installation order
    Order {
        /// Restrict the order to these modules (can be given multiple times)
        #[arg(short, long = "module", value_name = "MODULE")]
        modules: Vec<String>,
    },

    /// Check for circular dependencies, missing dependencies and non-installable modules
    Check,

    /// Export the analysis as JSON, DOT or CSV
    Export {
        /// Export format (overrides --output; defaults to json)
        #[arg(short, long, value_enum)]
        format: Option<OutputFormat>,
    },

    /// List model definitions found in module sources
    Models {
        /// Only analyze this module
        module: Option<String>,
    },

    /// Assess the upgrade risk of a module
    Impact {
        /// Module name
        module: String,
    },

    /// Order modules for an upgrade, with the risk of each step
    UpgradeOrder {
        /// Restrict the plan to these modules
        modules: Vec<String>,
    },

    /// Compare two versions of an addons tree
    Compare {
        /// Addons paths of the current version
        #[arg(long, required = true, num_args = 1.., value_name = "PATH")]
        source: Vec<PathBuf>,

        /// Addons paths of the new version
        #[arg(long, required = true, num_args = 1.., value_name = "PATH")]
        target: Vec<PathBuf>,
    },
}

/// Output format options
#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text output
    Text,
    /// JSON output for programmatic consumption
    Json,
    /// Graphviz DOT output
    Dot,
    /// CSV output for spreadsheet analysis
    Csv,
}

impl From<OutputFormat> for crate::models::config::OutputFormat {
    fn from(format: OutputFormat) -> Self {
        match format {
            OutputFormat::Text => Self::Text,
            OutputFormat::Json => Self::Json,
            OutputFormat::Dot => Self::Dot,
            OutputFormat::Csv => Self::Csv,
        }
    }
}

impl Args {
    /// Parse command-line arguments
    pub fn parse_args() -> Self {
        Args::parse()
    }

    /// The requested subcommand, `scan` when none was given
    pub fn subcommand(&self) -> SubCommand {
        self.command.clone().unwrap_or(SubCommand::Scan)
    }
}
