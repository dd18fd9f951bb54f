//! Dependency graph construction

use crate::models::graph::ModuleGraph;
use crate::models::module::Module;
use std::collections::BTreeMap;
use tracing::info;

/// Builds a [`ModuleGraph`] from scanned modules
pub struct GraphBuilder;

impl GraphBuilder {
    /// Build the graph for `modules`
    ///
    /// Scanned modules are inserted first in name order, so a dependency
    /// on a later scanned module never becomes an external placeholder.
    /// Edges follow each module's declaration order.
    pub fn build(modules: &BTreeMap<String, Module>) -> ModuleGraph {
        let mut graph = ModuleGraph::new();

        for module in modules.values() {
            graph.add_module(module);
        }
        for module in modules.values() {
            for dependency in &module.depends {
                graph.add_dependency(&module.name, dependency);
            }
        }

        info!(
            "Built dependency graph: {} nodes, {} edges",
            graph.node_count(),
            graph.edge_count()
        );
        graph
    }
}
