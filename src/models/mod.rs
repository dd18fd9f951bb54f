//! Data models and structures for modgraph

pub mod analysis;
pub mod config;
pub mod entity;
pub mod graph;
pub mod module;
pub mod upgrade;

pub use analysis::{AnalysisExport, CheckReport, DependencyStatistics, ModelReport, ModuleReport};
pub use config::{OutputFormat, PartialSettings, Settings};
pub use entity::{Field, FieldType, Model, ModelStatistics, Relationship};
pub use graph::{GraphNode, ModuleGraph, NodeCategory, NodeKind};
pub use module::{is_core_module, Module, CORE_MODULES};
pub use upgrade::{
    DependencyChange, DiffSummary, ModifiedModule, ModuleChange, RiskLevel, UpgradeImpact,
    UpgradeStep, VersionDiff,
};
