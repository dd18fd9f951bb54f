//! Output formatting functionality
//!
//! Rendering helpers for each report kind, used by the formatters in
//! the parent module.

use crate::error::{ModGraphError, Result};
use crate::models::analysis::{AnalysisExport, CheckReport, ModelReport, ModuleReport};
use crate::models::graph::{GraphNode, ModuleGraph, NodeKind};
use crate::models::module::is_core_module;
use crate::models::upgrade::{RiskLevel, UpgradeImpact, UpgradeStep, VersionDiff};
use ansi_term::Colour::{Blue, Cyan, Green, Purple, Red, Yellow};
use ansi_term::Style;
use serde::Serialize;
use std::collections::BTreeSet;

fn paint(use_colors: bool, style: Style, text: &str) -> String {
    if use_colors {
        style.paint(text).to_string()
    } else {
        text.to_string()
    }
}

fn heading(use_colors: bool, text: &str) -> String {
    paint(use_colors, Blue.bold(), text)
}

fn yes_no(flag: bool) -> &'static str {
    if flag {
        "yes"
    } else {
        "no"
    }
}

fn or_none(value: &str) -> &str {
    if value.is_empty() {
        "(none)"
    } else {
        value
    }
}

/// Name of a module, colored by whether it ships with the core distribution
fn module_name(use_colors: bool, name: &str) -> String {
    if is_core_module(name) {
        paint(use_colors, Cyan.normal(), name)
    } else {
        paint(use_colors, Green.normal(), name)
    }
}

fn risk_label(use_colors: bool, risk: RiskLevel) -> String {
    let style = match risk {
        RiskLevel::Critical => Red.bold(),
        RiskLevel::High => Red.normal(),
        RiskLevel::Medium => Yellow.normal(),
        RiskLevel::Low => Green.normal(),
    };
    paint(use_colors, style, risk.as_str())
}

/// Render a cycle as a closed loop, `a → b → a`
pub fn cycle_path(cycle: &[String]) -> String {
    let mut nodes: Vec<&str> = cycle.iter().map(String::as_str).collect();
    if let Some(first) = cycle.first() {
        nodes.push(first);
    }
    nodes.join(" → ")
}

/// Format a scan summary followed by the module list
pub fn format_scan_text(export: &AnalysisExport, use_colors: bool, verbose: bool, quiet: bool) -> String {
    let stats = &export.statistics;

    if quiet {
        return format!(
            "Modules: {}, dependencies: {}, cycles: {}, modules with missing dependencies: {}\n",
            stats.total_modules,
            stats.total_dependencies,
            stats.circular_dependencies.len(),
            stats.missing_dependencies.len()
        );
    }

    let mut output = String::new();
    output.push_str(&format!("{}\n", heading(use_colors, "Statistics:")));
    output.push_str(&format!("  Modules: {}\n", stats.total_modules));
    output.push_str(&format!(
        "  Dependencies: {} ({} unique)\n",
        stats.total_dependencies, stats.unique_dependencies
    ));
    output.push_str(&format!("  External dependencies: {}\n", stats.external_dependencies.len()));
    output.push_str(&format!("  Applications: {}\n", stats.applications.len()));
    output.push_str(&format!("  Categories: {}\n", stats.categories.len()));

    if !stats.has_issues() {
        output.push_str(&format!("\n{}\n", paint(use_colors, Green.bold(), "No dependency issues found")));
    }

    if !stats.circular_dependencies.is_empty() {
        output.push_str(&format!(
            "\n{}\n",
            paint(
                use_colors,
                Yellow.bold(),
                &format!("Circular dependencies: {}", stats.circular_dependencies.len())
            )
        ));
        for cycle in &stats.circular_dependencies {
            output.push_str(&format!("    {}\n", cycle_path(cycle)));
        }
    }

    if !stats.missing_dependencies.is_empty() {
        output.push_str(&format!("\n{}\n", paint(use_colors, Yellow.bold(), "Missing dependencies:")));
        for (module, deps) in &stats.missing_dependencies {
            output.push_str(&format!("    {}: {}\n", module, deps.join(", ")));
        }
    }

    if !stats.most_depended_modules.is_empty() {
        output.push_str(&format!("\n{}\n", heading(use_colors, "Most depended upon:")));
        for (name, count) in &stats.most_depended_modules {
            output.push_str(&format!("  {} ({})\n", module_name(use_colors, name), count));
        }
    }

    output.push_str(&format!("\n{}\n", heading(use_colors, "Modules:")));
    for (name, module) in &export.modules {
        let badge = if module.application {
            format!(" {}", paint(use_colors, Red.normal(), "[app]"))
        } else {
            String::new()
        };
        output.push_str(&format!(
            "  • {}{} (v{}, {} dependencies)\n",
            paint(use_colors, Green.normal(), name),
            badge,
            module.version,
            module.depends.len()
        ));
        if verbose {
            output.push_str(&format!(
                "      {}\n",
                paint(use_colors, Style::new().dimmed(), &module.path.display().to_string())
            ));
        }
    }

    output
}

/// Format the details of one module
pub fn format_module_text(report: &ModuleReport, use_colors: bool) -> String {
    let module = &report.module;
    let mut output = String::new();

    output.push_str(&format!(
        "{}\n",
        heading(use_colors, &format!("Module: {}", module.name))
    ));
    output.push_str(&format!("  Version: {}\n", module.version));
    output.push_str(&format!("  Category: {}\n", or_none(&module.category)));
    output.push_str(&format!("  Author: {}\n", or_none(&module.author)));
    output.push_str(&format!("  Application: {}\n", yes_no(module.application)));
    output.push_str(&format!("  Installable: {}\n", yes_no(module.installable)));
    output.push_str(&format!("  Dependency depth: {}\n", report.depth));

    output.push_str(&format!(
        "\n{}\n",
        heading(
            use_colors,
            &format!("Direct dependencies ({}):", report.direct_dependencies.len())
        )
    ));
    for dep in &report.direct_dependencies {
        let badge = if is_core_module(dep) { " [core]" } else { "" };
        output.push_str(&format!("  • {}{}\n", module_name(use_colors, dep), badge));
    }

    output.push_str(&format!(
        "\n{}\n",
        heading(use_colors, &format!("All dependencies ({}):", report.all_dependencies.len()))
    ));
    for dep in &report.all_dependencies {
        output.push_str(&format!("  • {}\n", module_name(use_colors, dep)));
    }

    output.push_str(&format!(
        "\n{}\n",
        heading(use_colors, &format!("Depended on by ({}):", report.direct_dependents.len()))
    ));
    for dependent in &report.direct_dependents {
        output.push_str(&format!("  • {}\n", paint(use_colors, Purple.normal(), dependent)));
    }
    if report.all_dependents.len() > report.direct_dependents.len() {
        output.push_str(&format!(
            "  ({} modules depend on it indirectly)\n",
            report.all_dependents.len() - report.direct_dependents.len()
        ));
    }

    output.push_str(&format!("\n{}\n", heading(use_colors, "Dependency tree:")));
    output.push_str(&report.tree);
    output.push('\n');

    output
}

/// Format an install order as a numbered list
pub fn format_order_text(order: &[String], use_colors: bool) -> String {
    if order.is_empty() {
        return format!(
            "{}\n",
            paint(
                use_colors,
                Red.normal(),
                "No valid install order (circular dependencies?)"
            )
        );
    }

    let mut output = format!("{}\n", heading(use_colors, "Install order:"));
    for (i, module) in order.iter().enumerate() {
        output.push_str(&format!("  {:3}. {}\n", i + 1, module_name(use_colors, module)));
    }
    output
}

/// Format the result of a consistency check
pub fn format_check_text(report: &CheckReport, use_colors: bool) -> String {
    let mut output = String::new();

    if !report.circular_dependencies.is_empty() {
        output.push_str(&format!(
            "{}\n",
            paint(
                use_colors,
                Red.bold(),
                &format!("Circular dependencies ({}):", report.circular_dependencies.len())
            )
        ));
        for cycle in &report.circular_dependencies {
            output.push_str(&format!("   {}\n", cycle_path(cycle)));
        }
        output.push('\n');
    }

    if !report.missing_dependencies.is_empty() {
        output.push_str(&format!("{}\n", paint(use_colors, Yellow.bold(), "Missing dependencies:")));
        for (module, deps) in &report.missing_dependencies {
            output.push_str(&format!(
                "   {}: {}\n",
                paint(use_colors, Green.normal(), module),
                deps.join(", ")
            ));
        }
        output.push('\n');
    }

    if !report.not_installable.is_empty() {
        output.push_str(&format!(
            "{}\n",
            paint(
                use_colors,
                Yellow.bold(),
                &format!("Not installable ({}):", report.not_installable.len())
            )
        ));
        for module in &report.not_installable {
            output.push_str(&format!("   • {}\n", module));
        }
        output.push('\n');
    }

    if !report.has_issues() {
        output.push_str(&format!("{}\n", paint(use_colors, Green.bold(), "No issues found")));
    }

    output
}

/// Format collected models with their statistics
pub fn format_models_text(report: &ModelReport, use_colors: bool, verbose: bool) -> String {
    let stats = &report.statistics;
    let mut output = String::new();

    output.push_str(&format!("{}\n", heading(use_colors, "Model statistics:")));
    output.push_str(&format!("  Models: {}\n", stats.total_models));
    output.push_str(&format!("  Fields: {}\n", stats.total_fields));
    output.push_str(&format!("  Relational fields: {}\n", stats.relation_fields));
    output.push_str(&format!("  Computed fields: {}\n", stats.computed_fields));
    output.push_str(&format!("  Average fields per model: {:.1}\n", stats.avg_fields_per_model));

    if report.models.is_empty() {
        return output;
    }

    output.push_str(&format!("\n{}\n", heading(use_colors, "Models:")));
    for (name, model) in &report.models {
        output.push_str(&format!(
            "  • {} ({}, {} fields, {} methods)\n",
            paint(use_colors, Green.normal(), name),
            model.module,
            model.fields.len(),
            model.methods.len()
        ));
        if !model.inherit.is_empty() && (model.inherit.len() > 1 || model.inherit[0] != *name) {
            output.push_str(&format!("      inherits: {}\n", model.inherit.join(", ")));
        }
        if verbose {
            for field in model.fields.values() {
                match &field.comodel_name {
                    Some(target) => output.push_str(&format!(
                        "      {}: {} → {}\n",
                        field.name, field.field_type, target
                    )),
                    None => output.push_str(&format!("      {}: {}\n", field.name, field.field_type)),
                }
            }
        }
    }

    output
}

/// Format the upgrade impact of a single module
pub fn format_impact_text(impact: &UpgradeImpact, use_colors: bool) -> String {
    let mut output = String::new();

    output.push_str(&format!(
        "{}\n",
        heading(use_colors, &format!("Upgrade impact: {}", impact.module_name))
    ));
    output.push_str(&format!("  Risk level: {}\n", risk_label(use_colors, impact.risk_level)));
    output.push_str(&format!("  Impact score: {}\n", impact.impact_score));
    output.push_str(&format!(
        "  Direct dependents ({}): {}\n",
        impact.direct_dependents.len(),
        impact.direct_dependents.join(", ")
    ));
    output.push_str(&format!("  All dependents: {}\n", impact.all_dependents.len()));
    output.push_str(&format!(
        "  Affected models ({}): {}\n",
        impact.affected_models.len(),
        impact.affected_models.join(", ")
    ));

    if !impact.risk_factors.is_empty() {
        output.push_str(&format!("\n{}\n", heading(use_colors, "Risk factors:")));
        for factor in &impact.risk_factors {
            output.push_str(&format!("  • {}\n", factor));
        }
    }

    if !impact.recommendations.is_empty() {
        output.push_str(&format!("\n{}\n", heading(use_colors, "Recommendations:")));
        for advice in &impact.recommendations {
            output.push_str(&format!("  • {}\n", advice));
        }
    }

    output
}

/// Format an upgrade plan
pub fn format_upgrade_order_text(steps: &[UpgradeStep], use_colors: bool) -> String {
    if steps.is_empty() {
        return format!(
            "{}\n",
            paint(
                use_colors,
                Red.normal(),
                "No valid upgrade order (circular dependencies?)"
            )
        );
    }

    let width = steps.iter().map(|step| step.module.len()).max().unwrap_or(0);
    let mut output = format!("{}\n", heading(use_colors, "Upgrade order:"));
    for step in steps {
        // Pad before painting so escape codes do not break alignment
        let name = format!("{:width$}", step.module, width = width);
        let style = if is_core_module(&step.module) {
            Cyan.normal()
        } else {
            Green.normal()
        };
        output.push_str(&format!(
            "  {:3}. {}  {:8}  {} dependents\n",
            step.order,
            paint(use_colors, style, &name),
            risk_label(use_colors, step.risk_level),
            step.dependents_count
        ));
    }
    output
}

/// Format the differences between two versions
pub fn format_diff_text(diff: &VersionDiff, use_colors: bool) -> String {
    if diff.is_empty() {
        return "No differences found\n".to_string();
    }

    let mut output = String::new();
    output.push_str(&format!(
        "{}\n  Added: {}, removed: {}, modified: {}\n",
        heading(use_colors, "Summary:"),
        diff.summary.added,
        diff.summary.removed,
        diff.summary.modified
    ));

    if !diff.added_modules.is_empty() {
        output.push_str(&format!("\n{}\n", heading(use_colors, "Added modules:")));
        for name in &diff.added_modules {
            output.push_str(&format!("  + {}\n", paint(use_colors, Green.normal(), name)));
        }
    }

    if !diff.removed_modules.is_empty() {
        output.push_str(&format!("\n{}\n", heading(use_colors, "Removed modules:")));
        for name in &diff.removed_modules {
            output.push_str(&format!("  - {}\n", paint(use_colors, Red.normal(), name)));
        }
    }

    if !diff.modified_modules.is_empty() {
        output.push_str(&format!("\n{}\n", heading(use_colors, "Modified modules:")));
        for modified in &diff.modified_modules {
            output.push_str(&format!("  {}\n", paint(use_colors, Yellow.normal(), &modified.name)));
            for change in &modified.changes {
                output.push_str(&format!("    - {}\n", change));
            }
        }
    }

    if !diff.dependency_changes.is_empty() {
        output.push_str(&format!("\n{}\n", heading(use_colors, "Dependency changes:")));
        for change in &diff.dependency_changes {
            let mut parts: Vec<String> = change
                .added_dependencies
                .iter()
                .map(|dep| format!("+{}", dep))
                .collect();
            parts.extend(change.removed_dependencies.iter().map(|dep| format!("-{}", dep)));
            output.push_str(&format!("  {}: {}\n", change.module, parts.join(", ")));
        }
    }

    output
}

/// Format the edges of a graph, one `dependent -> dependency` per line
pub fn format_graph_text(graph: &ModuleGraph, include_external: bool) -> String {
    let mut output = String::new();
    for (from, to) in graph.edges() {
        if !include_external && graph.node(to).is_some_and(|node| node.is_external()) {
            continue;
        }
        output.push_str(&format!("{} -> {}\n", from, to));
    }
    output
}

/// Serialize any report as pretty-printed JSON
pub fn format_json<T: Serialize + ?Sized>(value: &T) -> Result<String> {
    let mut json = serde_json::to_string_pretty(value)?;
    json.push('\n');
    Ok(json)
}

/// Graph nodes and edges as JSON
pub fn format_graph_json(graph: &ModuleGraph, include_external: bool) -> Result<String> {
    let nodes: Vec<_> = graph
        .nodes()
        .filter(|node| include_external || !node.is_external())
        .collect();
    let edges: Vec<_> = graph
        .edges()
        .filter(|(_, to)| include_external || !graph.node(to).is_some_and(|node| node.is_external()))
        .map(|(from, to)| serde_json::json!({ "from": from, "to": to }))
        .collect();
    format_json(&serde_json::json!({ "nodes": nodes, "edges": edges }))
}

fn escape_dot(value: &str) -> String {
    value.replace('\\', "\\\\").replace('"', "\\\"")
}

/// Node attributes with escaped values: rendering attributes first, then the
/// node's own attributes
fn dot_attributes(node: &GraphNode) -> Vec<(&'static str, String)> {
    let category = node.category();
    let label = match node.version() {
        Some(version) => format!("{}\\n{}", escape_dot(&node.name), escape_dot(version)),
        None => escape_dot(&node.name),
    };

    let mut attributes = vec![
        ("label", label),
        ("fillcolor", category.color().to_string()),
        ("tooltip", category.label().to_string()),
        ("is_core", node.is_core.to_string()),
        ("is_external", node.is_external().to_string()),
    ];
    if let NodeKind::Scanned {
        version,
        category,
        application,
        installable,
        path,
    } = &node.kind
    {
        attributes.push(("version", escape_dot(version)));
        attributes.push(("category", escape_dot(category)));
        attributes.push(("application", application.to_string()));
        attributes.push(("installable", installable.to_string()));
        attributes.push(("path", escape_dot(&path.to_string_lossy())));
    }
    attributes
}

/// Render a graph in Graphviz DOT format
///
/// With `only`, nodes outside the given set are left out together with
/// their edges.
pub fn format_graph_dot(graph: &ModuleGraph, include_external: bool, only: Option<&BTreeSet<String>>) -> String {
    let keep = |name: &str| {
        let in_subset = only.map_or(true, |names| names.contains(name));
        let visible = include_external || !graph.node(name).is_some_and(|node| node.is_external());
        in_subset && visible
    };

    let mut dot = String::from("digraph dependencies {\n");
    dot.push_str("  rankdir=LR;\n");
    dot.push_str("  node [shape=box, style=filled];\n\n");

    for node in graph.nodes() {
        if !keep(&node.name) {
            continue;
        }
        let attributes: Vec<String> = dot_attributes(node)
            .into_iter()
            .map(|(key, value)| format!("{}=\"{}\"", key, value))
            .collect();
        dot.push_str(&format!(
            "  \"{}\" [{}];\n",
            escape_dot(&node.name),
            attributes.join(", ")
        ));
    }

    dot.push('\n');

    for (from, to) in graph.edges() {
        if keep(from) && keep(to) {
            dot.push_str(&format!("  \"{}\" -> \"{}\";\n", escape_dot(from), escape_dot(to)));
        }
    }

    dot.push_str("}\n");
    dot
}

/// Write rows as CSV with a header line
pub fn format_csv(header: &[&str], rows: &[Vec<String>]) -> Result<String> {
    let mut writer = csv::Writer::from_writer(vec![]);
    writer.write_record(header)?;
    for row in rows {
        writer.write_record(row)?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|err| {
            let cause = err.error();
            ModGraphError::io_error(std::io::Error::new(cause.kind(), cause.to_string()))
        })?;
    String::from_utf8(bytes).map_err(|source| ModGraphError::CsvSerialize { source })
}

/// Module inventory rows
pub fn scan_rows(export: &AnalysisExport) -> Vec<Vec<String>> {
    export
        .modules
        .values()
        .map(|module| {
            vec![
                module.name.clone(),
                module.version.clone(),
                module.category.clone(),
                module.application.to_string(),
                module.installable.to_string(),
                module.auto_install.to_string(),
                module.license.clone(),
                module.depends.len().to_string(),
                module.depends.join(";"),
                module.path.display().to_string(),
            ]
        })
        .collect()
}

pub const SCAN_HEADER: &[&str] = &[
    "Name",
    "Version",
    "Category",
    "Application",
    "Installable",
    "Auto Install",
    "License",
    "Dependency Count",
    "Depends",
    "Path",
];

/// One row per problem found by a check
pub fn check_rows(report: &CheckReport) -> Vec<Vec<String>> {
    let mut rows = Vec::new();
    for cycle in &report.circular_dependencies {
        rows.push(vec![
            "circular".to_string(),
            cycle.first().cloned().unwrap_or_default(),
            cycle_path(cycle),
        ]);
    }
    for (module, deps) in &report.missing_dependencies {
        for dep in deps {
            rows.push(vec!["missing".to_string(), module.clone(), dep.clone()]);
        }
    }
    for module in &report.not_installable {
        rows.push(vec!["not_installable".to_string(), module.clone(), String::new()]);
    }
    rows
}

/// One row per added, removed or modified item
pub fn diff_rows(diff: &VersionDiff) -> Vec<Vec<String>> {
    let mut rows = Vec::new();
    for name in &diff.added_modules {
        rows.push(vec!["added".to_string(), name.clone(), String::new()]);
    }
    for name in &diff.removed_modules {
        rows.push(vec!["removed".to_string(), name.clone(), String::new()]);
    }
    for modified in &diff.modified_modules {
        for change in &modified.changes {
            rows.push(vec!["modified".to_string(), modified.name.clone(), change.to_string()]);
        }
    }
    for change in &diff.dependency_changes {
        for dep in &change.added_dependencies {
            rows.push(vec!["dependency_added".to_string(), change.module.clone(), dep.clone()]);
        }
        for dep in &change.removed_dependencies {
            rows.push(vec!["dependency_removed".to_string(), change.module.clone(), dep.clone()]);
        }
    }
    rows
}
