//! Version comparison and upgrade impact structures

use serde::{Deserialize, Serialize};
use std::fmt;

/// A single difference between two versions of the same module
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ModuleChange {
    Version { from: String, to: String },
    Category { from: String, to: String },
    Application { to: bool },
    /// The set of declared dependencies changed
    Dependencies,
}

impl fmt::Display for ModuleChange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ModuleChange::Version { from, to } => write!(f, "version changed: {} -> {}", from, to),
            ModuleChange::Category { from, to } => {
                write!(f, "category changed: {} -> {}", display_or_none(from), display_or_none(to))
            }
            ModuleChange::Application { to } => {
                write!(f, "application flag changed: {}", if *to { "yes" } else { "no" })
            }
            ModuleChange::Dependencies => write!(f, "dependencies changed"),
        }
    }
}

fn display_or_none(value: &str) -> &str {
    if value.is_empty() {
        "(none)"
    } else {
        value
    }
}

/// A module present in both versions with at least one change
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModifiedModule {
    pub name: String,
    pub changes: Vec<ModuleChange>,
}

/// Dependency names gained or lost by a module between versions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DependencyChange {
    pub module: String,
    pub added_dependencies: Vec<String>,
    pub removed_dependencies: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DiffSummary {
    pub added: usize,
    pub removed: usize,
    pub modified: usize,
}

/// Differences between a source and a target module set
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct VersionDiff {
    pub added_modules: Vec<String>,
    pub removed_modules: Vec<String>,
    pub modified_modules: Vec<ModifiedModule>,
    pub dependency_changes: Vec<DependencyChange>,
    pub summary: DiffSummary,
}

impl VersionDiff {
    pub fn is_empty(&self) -> bool {
        self.added_modules.is_empty()
            && self.removed_modules.is_empty()
            && self.modified_modules.is_empty()
            && self.dependency_changes.is_empty()
    }
}

/// Risk tier of upgrading a module
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
    Critical,
}

impl RiskLevel {
    /// Fixed advice attached to each tier
    pub fn recommendations(&self) -> Vec<String> {
        let advice: &[&str] = match self {
            RiskLevel::Critical => &[
                "Test thoroughly in a staging environment before upgrading",
                "Prepare a detailed rollback plan",
                "Back up the database before upgrading",
            ],
            RiskLevel::High => &[
                "Check the compatibility of every dependent module",
                "Validate the upgrade in a test environment first",
            ],
            RiskLevel::Medium => &["Check the compatibility of direct dependents"],
            RiskLevel::Low => &["Safe to upgrade"],
        };
        advice.iter().map(|line| line.to_string()).collect()
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RiskLevel::Low => "low",
            RiskLevel::Medium => "medium",
            RiskLevel::High => "high",
            RiskLevel::Critical => "critical",
        }
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Blast radius of upgrading a single module
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpgradeImpact {
    pub module_name: String,
    pub direct_dependents: Vec<String>,
    pub all_dependents: Vec<String>,
    pub affected_models: Vec<String>,
    pub risk_level: RiskLevel,
    pub risk_factors: Vec<String>,
    pub recommendations: Vec<String>,
    pub impact_score: usize,
}

impl UpgradeImpact {
    /// Impact for a module that is not part of the graph
    pub fn not_found(module_name: &str) -> Self {
        Self {
            module_name: module_name.to_string(),
            direct_dependents: Vec::new(),
            all_dependents: Vec::new(),
            affected_models: Vec::new(),
            risk_level: RiskLevel::Critical,
            risk_factors: vec![format!("module '{}' not found", module_name)],
            recommendations: Vec::new(),
            impact_score: 0,
        }
    }
}

/// One entry of an upgrade plan
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpgradeStep {
    /// 1-based position in the plan
    pub order: usize,
    pub module: String,
    pub risk_level: RiskLevel,
    pub dependents_count: usize,
}
