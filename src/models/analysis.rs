//! Analysis result structures

use super::entity::{Model, ModelStatistics, Relationship};
use super::module::Module;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Aggregate statistics over a scanned module set
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct DependencyStatistics {
    pub total_modules: usize,
    /// Every declared dependency, duplicates included
    pub total_dependencies: usize,
    pub unique_dependencies: usize,
    /// Referenced names that were never scanned, sorted
    pub external_dependencies: Vec<String>,
    /// External names that belong to the core distribution, sorted
    pub core_dependencies: Vec<String>,
    pub missing_dependencies: BTreeMap<String, Vec<String>>,
    pub circular_dependencies: Vec<Vec<String>>,
    /// Up to ten `(name, reference count)` pairs, most referenced first
    pub most_depended_modules: Vec<(String, usize)>,
    pub applications: Vec<String>,
    /// Non-empty categories, sorted
    pub categories: Vec<String>,
}

impl DependencyStatistics {
    /// Whether the scan surfaced any structural problem
    pub fn has_issues(&self) -> bool {
        !self.missing_dependencies.is_empty() || !self.circular_dependencies.is_empty()
    }
}

/// Serializable snapshot of a full analysis run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisExport {
    pub generated_at: DateTime<Utc>,
    pub modules: BTreeMap<String, Module>,
    pub statistics: DependencyStatistics,
}

impl AnalysisExport {
    /// Create a snapshot stamped with the current time
    pub fn new(modules: BTreeMap<String, Module>, statistics: DependencyStatistics) -> Self {
        Self {
            generated_at: Utc::now(),
            modules,
            statistics,
        }
    }
}

/// Everything known about one module's position in the graph
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModuleReport {
    pub module: Module,
    pub depth: usize,
    /// Declared dependencies in manifest order, duplicates removed
    pub direct_dependencies: Vec<String>,
    pub all_dependencies: Vec<String>,
    pub direct_dependents: Vec<String>,
    pub all_dependents: Vec<String>,
    /// Rendered dependency tree
    pub tree: String,
}

/// Structural problems found in a module set
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct CheckReport {
    pub circular_dependencies: Vec<Vec<String>>,
    pub missing_dependencies: BTreeMap<String, Vec<String>>,
    /// Modules whose manifest marks them as not installable
    pub not_installable: Vec<String>,
}

impl CheckReport {
    /// Cycles and missing dependencies count as issues; non-installable modules do not
    pub fn has_issues(&self) -> bool {
        !self.circular_dependencies.is_empty() || !self.missing_dependencies.is_empty()
    }
}

/// Models collected from a module set
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ModelReport {
    pub models: BTreeMap<String, Model>,
    pub relationships: BTreeMap<String, Vec<Relationship>>,
    pub statistics: ModelStatistics,
}
