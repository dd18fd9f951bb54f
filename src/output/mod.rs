//! Output formatting and writing functionality

mod formatters;
mod progress;
mod writers;

pub use self::formatters::cycle_path;
pub use self::progress::{create_progress_callback, ProgressReporter};
pub use self::writers::{create_writer, FileWriter, OutputWriter, StdoutWriter};

use crate::error::{ModGraphError, Result};
use crate::models::analysis::{AnalysisExport, CheckReport, ModelReport, ModuleReport};
use crate::models::config::{OutputFormat, Settings};
use crate::models::graph::ModuleGraph;
use crate::models::upgrade::{UpgradeImpact, UpgradeStep, VersionDiff};
use std::collections::BTreeSet;

/// A result produced by one of the commands, ready to be rendered
#[derive(Debug, Clone, Copy)]
pub enum Report<'a> {
    /// Full scan: statistics plus the module inventory
    Scan {
        export: &'a AnalysisExport,
        graph: &'a ModuleGraph,
    },
    /// The dependency graph alone
    Graph(&'a ModuleGraph),
    /// Details of one module
    Module {
        report: &'a ModuleReport,
        graph: &'a ModuleGraph,
    },
    InstallOrder(&'a [String]),
    Check(&'a CheckReport),
    Models(&'a ModelReport),
    Impact(&'a UpgradeImpact),
    UpgradeOrder(&'a [UpgradeStep]),
    Diff(&'a VersionDiff),
}

impl Report<'_> {
    /// Short name used in error messages
    pub fn kind(&self) -> &'static str {
        match self {
            Report::Scan { .. } => "scan",
            Report::Graph(_) => "graph",
            Report::Module { .. } => "module",
            Report::InstallOrder(_) => "install order",
            Report::Check(_) => "check",
            Report::Models(_) => "models",
            Report::Impact(_) => "impact",
            Report::UpgradeOrder(_) => "upgrade order",
            Report::Diff(_) => "diff",
        }
    }
}

/// Trait for different output formatters
pub trait Formatter {
    /// Render a report into a string
    fn format(&self, report: &Report<'_>) -> Result<String>;
}

/// Text formatter for human-readable output
pub struct TextFormatter {
    pub use_colors: bool,
    pub verbose: bool,
    pub quiet: bool,
    pub include_external: bool,
}

impl TextFormatter {
    /// Create a new text formatter
    pub fn new(use_colors: bool, verbose: bool, quiet: bool) -> Self {
        Self {
            use_colors,
            verbose,
            quiet,
            include_external: true,
        }
    }

    pub fn with_external(mut self, include_external: bool) -> Self {
        self.include_external = include_external;
        self
    }
}

impl Formatter for TextFormatter {
    fn format(&self, report: &Report<'_>) -> Result<String> {
        let output = match report {
            Report::Scan { export, .. } => {
                formatters::format_scan_text(export, self.use_colors, self.verbose, self.quiet)
            }
            Report::Graph(graph) => formatters::format_graph_text(graph, self.include_external),
            Report::Module { report, .. } => formatters::format_module_text(report, self.use_colors),
            Report::InstallOrder(order) => formatters::format_order_text(order, self.use_colors),
            Report::Check(check) => formatters::format_check_text(check, self.use_colors),
            Report::Models(models) => {
                formatters::format_models_text(models, self.use_colors, self.verbose)
            }
            Report::Impact(impact) => formatters::format_impact_text(impact, self.use_colors),
            Report::UpgradeOrder(steps) => {
                formatters::format_upgrade_order_text(steps, self.use_colors)
            }
            Report::Diff(diff) => formatters::format_diff_text(diff, self.use_colors),
        };
        Ok(output)
    }
}

/// JSON formatter for machine-readable output
pub struct JsonFormatter {
    pub include_external: bool,
}

impl JsonFormatter {
    /// Create a new JSON formatter
    pub fn new(include_external: bool) -> Self {
        Self { include_external }
    }
}

impl Formatter for JsonFormatter {
    fn format(&self, report: &Report<'_>) -> Result<String> {
        match report {
            Report::Scan { export, .. } => formatters::format_json(export),
            Report::Graph(graph) => formatters::format_graph_json(graph, self.include_external),
            Report::Module { report, .. } => formatters::format_json(report),
            Report::InstallOrder(order) => {
                formatters::format_json(&serde_json::json!({ "install_order": order }))
            }
            Report::Check(check) => formatters::format_json(check),
            Report::Models(models) => formatters::format_json(models),
            Report::Impact(impact) => formatters::format_json(impact),
            Report::UpgradeOrder(steps) => {
                formatters::format_json(&serde_json::json!({ "upgrade_order": steps }))
            }
            Report::Diff(diff) => formatters::format_json(diff),
        }
    }
}

/// Graphviz formatter for dependency graphs
pub struct DotFormatter {
    pub include_external: bool,
}

impl DotFormatter {
    /// Create a new DOT formatter
    pub fn new(include_external: bool) -> Self {
        Self { include_external }
    }
}

impl Formatter for DotFormatter {
    fn format(&self, report: &Report<'_>) -> Result<String> {
        match report {
            Report::Scan { graph, .. } | Report::Graph(graph) => {
                Ok(formatters::format_graph_dot(graph, self.include_external, None))
            }
            Report::Module { report, graph } => {
                let mut subset: BTreeSet<String> = report.all_dependencies.iter().cloned().collect();
                subset.insert(report.module.name.clone());
                Ok(formatters::format_graph_dot(graph, self.include_external, Some(&subset)))
            }
            other => Err(ModGraphError::InvalidOutputFormat {
                format: format!("dot is not available for {} output", other.kind()),
            }),
        }
    }
}

/// CSV formatter for spreadsheet analysis
#[derive(Default)]
pub struct CsvFormatter;

impl CsvFormatter {
    /// Create a new CSV formatter
    pub fn new() -> Self {
        Self
    }
}

impl Formatter for CsvFormatter {
    fn format(&self, report: &Report<'_>) -> Result<String> {
        match report {
            Report::Scan { export, .. } => {
                formatters::format_csv(formatters::SCAN_HEADER, &formatters::scan_rows(export))
            }
            Report::Graph(graph) => {
                let rows: Vec<Vec<String>> = graph
                    .edges()
                    .map(|(from, to)| vec![from.to_string(), to.to_string()])
                    .collect();
                formatters::format_csv(&["Module", "Depends On"], &rows)
            }
            Report::Module { report, .. } => {
                let rows: Vec<Vec<String>> = report
                    .all_dependencies
                    .iter()
                    .map(|dep| {
                        let direct = report.direct_dependencies.contains(dep);
                        vec![report.module.name.clone(), dep.clone(), direct.to_string()]
                    })
                    .collect();
                formatters::format_csv(&["Module", "Dependency", "Direct"], &rows)
            }
            Report::InstallOrder(order) => {
                let rows: Vec<Vec<String>> = order
                    .iter()
                    .enumerate()
                    .map(|(i, module)| vec![(i + 1).to_string(), module.clone()])
                    .collect();
                formatters::format_csv(&["Order", "Module"], &rows)
            }
            Report::Check(check) => {
                formatters::format_csv(&["Issue", "Module", "Detail"], &formatters::check_rows(check))
            }
            Report::Models(models) => {
                let rows: Vec<Vec<String>> = models
                    .models
                    .values()
                    .map(|model| {
                        vec![
                            model.name.clone(),
                            model.module.clone(),
                            model.inherit.join(";"),
                            model.fields.len().to_string(),
                            model.methods.len().to_string(),
                            model.file_path.display().to_string(),
                        ]
                    })
                    .collect();
                formatters::format_csv(
                    &["Model", "Module", "Inherit", "Fields", "Methods", "File"],
                    &rows,
                )
            }
            Report::Impact(impact) => {
                let rows = vec![vec![
                    impact.module_name.clone(),
                    impact.risk_level.to_string(),
                    impact.impact_score.to_string(),
                    impact.direct_dependents.len().to_string(),
                    impact.all_dependents.len().to_string(),
                    impact.affected_models.len().to_string(),
                ]];
                formatters::format_csv(
                    &[
                        "Module",
                        "Risk Level",
                        "Impact Score",
                        "Direct Dependents",
                        "All Dependents",
                        "Models",
                    ],
                    &rows,
                )
            }
            Report::UpgradeOrder(steps) => {
                let rows: Vec<Vec<String>> = steps
                    .iter()
                    .map(|step| {
                        vec![
                            step.order.to_string(),
                            step.module.clone(),
                            step.risk_level.to_string(),
                            step.dependents_count.to_string(),
                        ]
                    })
                    .collect();
                formatters::format_csv(&["Order", "Module", "Risk Level", "Dependents"], &rows)
            }
            Report::Diff(diff) => {
                formatters::format_csv(&["Change", "Module", "Detail"], &formatters::diff_rows(diff))
            }
        }
    }
}

/// Create a formatter based on the output format
pub fn create_formatter(format: OutputFormat, settings: &Settings) -> Box<dyn Formatter> {
    match format {
        OutputFormat::Text => Box::new(
            TextFormatter::new(settings.use_colors, settings.verbose, settings.quiet)
                .with_external(settings.include_external),
        ),
        OutputFormat::Json => Box::new(JsonFormatter::new(settings.include_external)),
        OutputFormat::Dot => Box::new(DotFormatter::new(settings.include_external)),
        OutputFormat::Csv => Box::new(CsvFormatter::new()),
    }
}
