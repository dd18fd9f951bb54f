//! Command implementations

use std::path::PathBuf;

use super::args::{Args, SubCommand};
use crate::config::{self, CliArgs, DEFAULT_CONFIG_FILE};
use crate::core::{upgrade, ModelAnalyzer, ModuleAnalyzer, ModuleScanner, UpgradeAnalyzer};
use crate::error::{report_error, Result};
use crate::models::config::{OutputFormat, Settings};
use crate::output::{create_formatter, create_progress_callback, create_writer, ProgressReporter, Report};
use tracing::{debug, info};

/// Exit status when a command ran but found problems
pub const EXIT_ISSUES: i32 = 1;

/// Available commands
#[derive(Debug)]
pub enum Command {
    /// Run an analysis subcommand
    Analyze(Args),
    /// Initialize a default configuration file
    Init,
}

impl Command {
    /// Create a command from parsed arguments
    pub fn from_args(args: Args) -> Self {
        if args.init {
            return Command::Init;
        }
        Command::Analyze(args)
    }

    /// Execute the command, returning the process exit status
    pub fn execute(&self) -> Result<i32> {
        match self {
            Command::Init => init_config(),
            Command::Analyze(args) => {
                let settings = config::load_config(CliArgs::from_args(args))?;
                debug!("Resolved settings: {:?}", settings);
                analyze(&args.subcommand(), &settings)
            }
        }
    }

    /// Run the command and handle errors
    pub fn run(&self) -> i32 {
        match self.execute() {
            Ok(code) => code,
            Err(err) => report_error(&err),
        }
    }
}

fn init_config() -> Result<i32> {
    let config_path = PathBuf::from(DEFAULT_CONFIG_FILE);

    if config_path.exists() {
        println!("Configuration file already exists at: {}", config_path.display());
        println!("To overwrite it, delete the file first and run this command again.");
        return Ok(0);
    }

    config::create_default_config(&config_path)?;

    println!("Created default configuration file at: {}", config_path.display());
    println!("\nMain options:");
    println!("  - addons_paths: directories to scan for modules");
    println!("  - exclude_patterns: glob patterns for directories to skip");
    println!("  - output_format: text, json, dot or csv");
    println!("  - tree_depth: depth of rendered dependency trees");
    Ok(0)
}

/// Scan `roots` with the configured exclusions and build the graph
fn load_modules(settings: &Settings, roots: &[PathBuf]) -> Result<ModuleAnalyzer> {
    let mut scanner = ModuleScanner::new().with_exclude_patterns(&settings.exclude_patterns)?;
    let mut progress = ProgressReporter::new(settings.show_progress && !settings.quiet);
    progress.start("Scanning addons paths");

    let mut analyzer = ModuleAnalyzer::new();
    let found = analyzer
        .scan_with_progress(&mut scanner, roots, create_progress_callback(&progress))
        .len();
    progress.finish(&format!("Found {} modules", found));

    for (path, err) in scanner.errors() {
        debug!("Scan problem at {}: {}", path.display(), err);
    }
    analyzer.build_graph()?;
    info!("Loaded {} modules from {} addons path(s)", found, roots.len());
    Ok(analyzer)
}

fn render(report: Report<'_>, format: OutputFormat, settings: &Settings) -> Result<()> {
    let formatter = create_formatter(format, settings);
    let content = formatter.format(&report)?;
    create_writer(settings.output_file.as_ref()).write(&content)
}

fn subset(modules: &[String]) -> Option<&[String]> {
    (!modules.is_empty()).then_some(modules)
}

/// Run one analysis subcommand against the configured addons paths
fn analyze(command: &SubCommand, settings: &Settings) -> Result<i32> {
    let format = settings.output_format;
    let load = || load_modules(settings, &settings.addons_paths);

    match command {
        SubCommand::Scan => {
            let analyzer = load()?;
            let export = analyzer.export()?;
            let graph = analyzer.graph()?;
            render(Report::Scan { export: &export, graph }, format, settings)?;
            Ok(0)
        }
        SubCommand::Deps { module } => {
            let analyzer = load()?;
            let report = analyzer.module_report(module, settings.include_core, settings.tree_depth)?;
            let graph = analyzer.graph()?;
            render(Report::Module { report: &report, graph }, format, settings)?;
            Ok(0)
        }
        SubCommand::Order { modules } => {
            let order = load()?.install_order(subset(modules))?;
            render(Report::InstallOrder(&order), format, settings)?;
            Ok(if order.is_empty() { EXIT_ISSUES } else { 0 })
        }
        SubCommand::Check => {
            let report = load()?.check()?;
            render(Report::Check(&report), format, settings)?;
            Ok(if report.has_issues() { EXIT_ISSUES } else { 0 })
        }
        SubCommand::Export { format: requested } => {
            let export_format = match requested {
                Some(requested) => (*requested).into(),
                None if format == OutputFormat::Text => OutputFormat::Json,
                None => format,
            };
            let analyzer = load()?;
            let export = analyzer.export()?;
            let graph = analyzer.graph()?;
            render(Report::Scan { export: &export, graph }, export_format, settings)?;
            Ok(0)
        }
        SubCommand::Models { module } => {
            let analyzer = load()?;
            let report = match module {
                Some(name) => {
                    let found = analyzer.module(name)?;
                    let mut models = ModelAnalyzer::new();
                    models.analyze_module(&found.path, &found.name);
                    models.report()
                }
                None => {
                    let mut upgrades = UpgradeAnalyzer::new();
                    let models = upgrades.analyze_models(&analyzer)?;
                    models.report()
                }
            };
            render(Report::Models(&report), format, settings)?;
            Ok(0)
        }
        SubCommand::Impact { module } => {
            let impact = upgrade::assess_impact(module, &load()?)?;
            render(Report::Impact(&impact), format, settings)?;
            Ok(0)
        }
        SubCommand::UpgradeOrder { modules } => {
            let steps = upgrade::upgrade_order(subset(modules), &load()?)?;
            render(Report::UpgradeOrder(&steps), format, settings)?;
            Ok(if steps.is_empty() { EXIT_ISSUES } else { 0 })
        }
        SubCommand::Compare { source, target } => {
            let mut upgrades = UpgradeAnalyzer::new();
            upgrades.set_source(load_modules(settings, source)?);
            upgrades.set_target(load_modules(settings, target)?);
            let diff = upgrades.compare_versions()?;
            render(Report::Diff(&diff), format, settings)?;
            Ok(0)
        }
    }
}
