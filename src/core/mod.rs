//! Core functionality for module discovery and dependency analysis

pub mod analyzer;
pub mod graph_builder;
pub mod models;
pub mod scanner;
pub mod upgrade;

pub use analyzer::ModuleAnalyzer;
pub use graph_builder::GraphBuilder;
pub use models::ModelAnalyzer;
pub use scanner::ModuleScanner;
pub use upgrade::UpgradeAnalyzer;
