//! modgraph - dependency analysis for Odoo-style addon modules
//!
//! This library scans addons directories for modules described by a
//! manifest, builds their dependency graph and answers questions about it:
//! install order, circular and missing dependencies, dependency trees, the
//! models each module defines, and the upgrade impact of a module or the
//! differences between two versions of an addons tree.
//!
//! ```no_run
//! use modgraph::ModuleAnalyzer;
//!
//! let mut analyzer = ModuleAnalyzer::new();
//! analyzer.scan(&["/opt/odoo/addons"]);
//! analyzer.build_graph()?;
//! let order = analyzer.install_order(None)?;
//! # Ok::<(), modgraph::ModGraphError>(())
//! ```

pub mod cli;
pub mod config;
pub mod core;
pub mod error;
pub mod models;
pub mod output;
pub mod parsers;

// Re-export commonly used types
pub use crate::core::{GraphBuilder, ModelAnalyzer, ModuleAnalyzer, ModuleScanner, UpgradeAnalyzer};
pub use error::{ErrorSeverity, ModGraphError, Result, ResultExt};
pub use models::{
    analysis::{AnalysisExport, CheckReport, DependencyStatistics, ModelReport, ModuleReport},
    config::Settings,
    entity::{Field, FieldType, Model},
    graph::ModuleGraph,
    module::Module,
    upgrade::{RiskLevel, UpgradeImpact, UpgradeStep, VersionDiff},
};
pub use parsers::{ManifestData, ManifestParser};

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const NAME: &str = env!("CARGO_PKG_NAME");
