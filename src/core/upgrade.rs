//! Version comparison and upgrade impact assessment

use crate::core::analyzer::ModuleAnalyzer;
use crate::core::models::ModelAnalyzer;
use crate::error::{ModGraphError, Result};
use crate::models::entity::Model;
use crate::models::module::{is_core_module, Module};
use crate::models::upgrade::{
    DependencyChange, DiffSummary, ModifiedModule, ModuleChange, RiskLevel, UpgradeImpact,
    UpgradeStep, VersionDiff,
};
use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;
use tracing::info;

const CRITICAL_DEPENDENTS: usize = 50;
const HIGH_DEPENDENTS: usize = 20;
const MEDIUM_DEPENDENTS: usize = 5;
/// Modules defining more models than this are never rated low risk
const MODEL_COUNT_THRESHOLD: usize = 10;

/// Compares two module sets and rates the risk of upgrading modules
#[derive(Debug, Default)]
pub struct UpgradeAnalyzer {
    source: Option<ModuleAnalyzer>,
    target: Option<ModuleAnalyzer>,
    models: ModelAnalyzer,
}

impl UpgradeAnalyzer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Scan the current version's addons paths
    pub fn load_source<P: AsRef<Path>>(&mut self, roots: &[P]) -> Result<&ModuleAnalyzer> {
        let analyzer = load(roots)?;
        Ok(&*self.source.insert(analyzer))
    }

    /// Scan the new version's addons paths
    pub fn load_target<P: AsRef<Path>>(&mut self, roots: &[P]) -> Result<&ModuleAnalyzer> {
        let analyzer = load(roots)?;
        Ok(&*self.target.insert(analyzer))
    }

    /// Use an already prepared analyzer as the source side
    pub fn set_source(&mut self, analyzer: ModuleAnalyzer) {
        self.source = Some(analyzer);
    }

    /// Use an already prepared analyzer as the target side
    pub fn set_target(&mut self, analyzer: ModuleAnalyzer) {
        self.target = Some(analyzer);
    }

    /// Diff the loaded source and target versions
    pub fn compare_versions(&self) -> Result<VersionDiff> {
        let source = self
            .source
            .as_ref()
            .ok_or(ModGraphError::VersionsNotLoaded { missing: "source" })?;
        let target = self
            .target
            .as_ref()
            .ok_or(ModGraphError::VersionsNotLoaded { missing: "target" })?;
        compare(source, target)
    }

    /// Collect the models of every module scanned by `analyzer`
    ///
    /// Replaces any earlier collection. A model defined by several modules
    /// keeps the definition read last, modules being visited by name.
    pub fn analyze_models(&mut self, analyzer: &ModuleAnalyzer) -> Result<&ModelAnalyzer> {
        let modules = analyzer.modules()?;
        let count = self.models.analyze_modules(modules).len();
        info!("Collected {} model(s) from {} module(s)", count, modules.len());
        Ok(&self.models)
    }
}

fn load<P: AsRef<Path>>(roots: &[P]) -> Result<ModuleAnalyzer> {
    let mut analyzer = ModuleAnalyzer::new();
    analyzer.scan(roots);
    analyzer.build_graph()?;
    Ok(analyzer)
}

/// Diff two scanned module sets
pub fn compare(source: &ModuleAnalyzer, target: &ModuleAnalyzer) -> Result<VersionDiff> {
    let source = source.modules()?;
    let target = target.modules()?;

    let added_modules: Vec<String> = target
        .keys()
        .filter(|name| !source.contains_key(*name))
        .cloned()
        .collect();
    let removed_modules: Vec<String> = source
        .keys()
        .filter(|name| !target.contains_key(*name))
        .cloned()
        .collect();

    let mut modified_modules = Vec::new();
    let mut dependency_changes = Vec::new();

    // BTreeMap iteration keeps both lists sorted by name
    for (name, before) in source {
        let Some(after) = target.get(name) else {
            continue;
        };

        let changes = module_changes(before, after);
        if !changes.is_empty() {
            modified_modules.push(ModifiedModule {
                name: name.clone(),
                changes,
            });
        }

        let old: BTreeSet<&String> = before.depends.iter().collect();
        let new: BTreeSet<&String> = after.depends.iter().collect();
        let added: Vec<String> = new.difference(&old).map(|dep| dep.to_string()).collect();
        let removed: Vec<String> = old.difference(&new).map(|dep| dep.to_string()).collect();
        if !added.is_empty() || !removed.is_empty() {
            dependency_changes.push(DependencyChange {
                module: name.clone(),
                added_dependencies: added,
                removed_dependencies: removed,
            });
        }
    }

    let summary = DiffSummary {
        added: added_modules.len(),
        removed: removed_modules.len(),
        modified: modified_modules.len(),
    };
    info!(
        "Version diff: {} added, {} removed, {} modified",
        summary.added, summary.removed, summary.modified
    );

    Ok(VersionDiff {
        added_modules,
        removed_modules,
        modified_modules,
        dependency_changes,
        summary,
    })
}

fn module_changes(before: &Module, after: &Module) -> Vec<ModuleChange> {
    let mut changes = Vec::new();

    if before.version != after.version {
        changes.push(ModuleChange::Version {
            from: before.version.clone(),
            to: after.version.clone(),
        });
    }
    if before.category != after.category {
        changes.push(ModuleChange::Category {
            from: before.category.clone(),
            to: after.category.clone(),
        });
    }
    if before.application != after.application {
        changes.push(ModuleChange::Application { to: after.application });
    }
    let old: BTreeSet<&String> = before.depends.iter().collect();
    let new: BTreeSet<&String> = after.depends.iter().collect();
    if old != new {
        changes.push(ModuleChange::Dependencies);
    }

    changes
}

/// Rate the blast radius of upgrading `name` within `analyzer`'s module set
///
/// Dependents are counted over the full reverse closure. Affected models
/// are the ones defined in the module's own sources.
pub fn assess_impact(name: &str, analyzer: &ModuleAnalyzer) -> Result<UpgradeImpact> {
    let graph = analyzer.graph()?;
    let Some(module) = analyzer.modules()?.get(name) else {
        return Ok(UpgradeImpact::not_found(name));
    };

    let direct_dependents = graph.direct_dependents(name);
    let all_dependents: Vec<String> = graph.transitive_dependents(name).into_iter().collect();

    let mut models = ModelAnalyzer::new();
    let affected_models: Vec<String> = models
        .analyze_module(&module.path, &module.name)
        .into_keys()
        .collect();

    let dependent_count = all_dependents.len();
    let model_count = affected_models.len();
    let mut risk_factors = Vec::new();

    let mut risk_level = if dependent_count > CRITICAL_DEPENDENTS || is_core_module(name) {
        risk_factors.push(format!(
            "critical module: {} module(s) depend on it",
            dependent_count
        ));
        RiskLevel::Critical
    } else if dependent_count > HIGH_DEPENDENTS {
        risk_factors.push(format!("high impact: {} module(s) depend on it", dependent_count));
        RiskLevel::High
    } else if dependent_count > MEDIUM_DEPENDENTS {
        risk_factors.push(format!("medium impact: {} module(s) depend on it", dependent_count));
        RiskLevel::Medium
    } else {
        RiskLevel::Low
    };

    if model_count > MODEL_COUNT_THRESHOLD {
        risk_factors.push(format!("defines {} models", model_count));
        if risk_level == RiskLevel::Low {
            risk_level = RiskLevel::Medium;
        }
    }

    Ok(UpgradeImpact {
        module_name: name.to_string(),
        direct_dependents,
        all_dependents,
        impact_score: dependent_count + 2 * model_count,
        affected_models,
        risk_level,
        risk_factors,
        recommendations: risk_level.recommendations(),
    })
}

/// Install order of `subset` (or everything) with each step's risk
pub fn upgrade_order(subset: Option<&[String]>, analyzer: &ModuleAnalyzer) -> Result<Vec<UpgradeStep>> {
    analyzer
        .install_order(subset)?
        .into_iter()
        .enumerate()
        .map(|(position, module)| -> Result<UpgradeStep> {
            let impact = assess_impact(&module, analyzer)?;
            Ok(UpgradeStep {
                order: position + 1,
                risk_level: impact.risk_level,
                dependents_count: impact.all_dependents.len(),
                module,
            })
        })
        .collect()
}
