//! Module dependency graph
//!
//! A directed graph over module names where an edge `A -> B` means "A depends
//! on B". Scanned modules carry their manifest attributes; names that are only
//! referenced from a `depends` list become external placeholder nodes so every
//! edge always has both endpoints in the graph.

use super::module::{is_core_module, Module};
use petgraph::algo;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::{Dfs, EdgeRef, Reversed};
use petgraph::Direction;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap, HashSet};
use std::path::PathBuf;
use tracing::warn;

/// A node in the module graph
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphNode {
    pub name: String,
    pub is_core: bool,
    pub kind: NodeKind,
}

/// What is known about a node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum NodeKind {
    /// A module found on disk
    Scanned {
        version: String,
        category: String,
        application: bool,
        installable: bool,
        path: PathBuf,
    },
    /// A dependency name that was never scanned
    External,
}

/// Display category of a node, used for coloring and legends
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeCategory {
    External,
    Core,
    NotInstallable,
    Application,
    Normal,
}

impl NodeCategory {
    /// Hex color used when rendering the node
    pub fn color(&self) -> &'static str {
        match self {
            NodeCategory::Application => "#e74c3c",
            NodeCategory::Core => "#3498db",
            NodeCategory::External => "#95a5a6",
            NodeCategory::Normal => "#2ecc71",
            NodeCategory::NotInstallable => "#f39c12",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            NodeCategory::External => "external",
            NodeCategory::Core => "core",
            NodeCategory::NotInstallable => "not installable",
            NodeCategory::Application => "application",
            NodeCategory::Normal => "module",
        }
    }
}

impl GraphNode {
    /// Create a node for a scanned module
    pub fn scanned(module: &Module) -> Self {
        Self {
            name: module.name.clone(),
            is_core: module.is_core(),
            kind: NodeKind::Scanned {
                version: module.version.clone(),
                category: module.category.clone(),
                application: module.application,
                installable: module.installable,
                path: module.path.clone(),
            },
        }
    }

    /// Create a placeholder node for a dependency that was never scanned
    pub fn external(name: &str) -> Self {
        Self {
            name: name.to_string(),
            is_core: is_core_module(name),
            kind: NodeKind::External,
        }
    }

    pub fn is_external(&self) -> bool {
        matches!(self.kind, NodeKind::External)
    }

    /// Manifest version of a scanned module
    pub fn version(&self) -> Option<&str> {
        match &self.kind {
            NodeKind::Scanned { version, .. } => Some(version),
            NodeKind::External => None,
        }
    }

    pub fn is_application(&self) -> bool {
        matches!(self.kind, NodeKind::Scanned { application: true, .. })
    }

    pub fn is_installable(&self) -> bool {
        match &self.kind {
            NodeKind::Scanned { installable, .. } => *installable,
            NodeKind::External => true,
        }
    }

    /// Category used for coloring; external beats core beats installability
    pub fn category(&self) -> NodeCategory {
        if self.is_external() {
            NodeCategory::External
        } else if self.is_core {
            NodeCategory::Core
        } else if !self.is_installable() {
            NodeCategory::NotInstallable
        } else if self.is_application() {
            NodeCategory::Application
        } else {
            NodeCategory::Normal
        }
    }

    /// Short marker shown next to the node in a dependency tree
    pub fn tree_marker(&self) -> &'static str {
        if self.is_core {
            "[core]"
        } else if self.is_external() {
            "[ext]"
        } else if self.is_application() {
            "[app]"
        } else {
            "[mod]"
        }
    }
}

/// Directed dependency graph over module names
#[derive(Debug, Clone, Default)]
pub struct ModuleGraph {
    graph: DiGraph<GraphNode, ()>,
    indices: HashMap<String, NodeIndex>,
}

impl ModuleGraph {
    /// Create a new empty graph
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a scanned module node, replacing the attributes of an existing node
    pub fn add_module(&mut self, module: &Module) -> NodeIndex {
        let node = GraphNode::scanned(module);
        match self.indices.get(&module.name) {
            Some(&idx) => {
                self.graph[idx] = node;
                idx
            }
            None => {
                let idx = self.graph.add_node(node);
                self.indices.insert(module.name.clone(), idx);
                idx
            }
        }
    }

    /// Get the node for `name`, inserting an external placeholder if needed
    pub fn ensure_node(&mut self, name: &str) -> NodeIndex {
        if let Some(&idx) = self.indices.get(name) {
            return idx;
        }
        let idx = self.graph.add_node(GraphNode::external(name));
        self.indices.insert(name.to_string(), idx);
        idx
    }

    /// Add the edge `from -> to`; repeated declarations collapse to one edge
    pub fn add_dependency(&mut self, from: &str, to: &str) {
        let from_idx = self.ensure_node(from);
        let to_idx = self.ensure_node(to);
        self.graph.update_edge(from_idx, to_idx, ());
    }

    pub fn contains(&self, name: &str) -> bool {
        self.indices.contains_key(name)
    }

    pub fn node(&self, name: &str) -> Option<&GraphNode> {
        self.indices.get(name).map(|&idx| &self.graph[idx])
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// All nodes in insertion order
    pub fn nodes(&self) -> impl Iterator<Item = &GraphNode> {
        self.graph.node_indices().map(move |idx| &self.graph[idx])
    }

    /// All edges as `(dependent, dependency)` name pairs, in insertion order
    pub fn edges(&self) -> impl Iterator<Item = (&str, &str)> {
        self.graph.edge_references().map(move |edge| {
            (
                self.graph[edge.source()].name.as_str(),
                self.graph[edge.target()].name.as_str(),
            )
        })
    }

    /// Every module reachable from `name` along dependency edges, excluding itself
    pub fn transitive_dependencies(&self, name: &str, include_core: bool) -> BTreeSet<String> {
        let Some(&start) = self.indices.get(name) else {
            return BTreeSet::new();
        };

        let mut result = BTreeSet::new();
        let mut dfs = Dfs::new(&self.graph, start);
        while let Some(idx) = dfs.next(&self.graph) {
            if idx == start {
                continue;
            }
            let node = &self.graph[idx];
            if include_core || !node.is_core {
                result.insert(node.name.clone());
            }
        }
        result
    }

    /// Every module that reaches `name` along dependency edges, excluding itself
    pub fn transitive_dependents(&self, name: &str) -> BTreeSet<String> {
        let Some(&start) = self.indices.get(name) else {
            return BTreeSet::new();
        };

        let reversed = Reversed(&self.graph);
        let mut result = BTreeSet::new();
        let mut dfs = Dfs::new(reversed, start);
        while let Some(idx) = dfs.next(reversed) {
            if idx != start {
                result.insert(self.graph[idx].name.clone());
            }
        }
        result
    }

    /// Immediate dependencies of `name` in declaration order
    pub fn direct_dependencies(&self, name: &str) -> Vec<String> {
        self.neighbors_in_order(name, Direction::Outgoing)
    }

    /// Modules that declare `name` directly, sorted by name
    pub fn direct_dependents(&self, name: &str) -> Vec<String> {
        let mut dependents = self.neighbors_in_order(name, Direction::Incoming);
        dependents.sort();
        dependents
    }

    /// Number of distinct modules declaring `name`
    pub fn in_degree(&self, name: &str) -> usize {
        self.indices
            .get(name)
            .map(|&idx| self.graph.edges_directed(idx, Direction::Incoming).count())
            .unwrap_or(0)
    }

    fn neighbors_in_order(&self, name: &str, direction: Direction) -> Vec<String> {
        let Some(&idx) = self.indices.get(name) else {
            return Vec::new();
        };

        let mut edges: Vec<_> = self.graph.edges_directed(idx, direction).collect();
        edges.sort_by_key(|edge| edge.id());
        edges
            .into_iter()
            .map(|edge| {
                let other = match direction {
                    Direction::Outgoing => edge.target(),
                    Direction::Incoming => edge.source(),
                };
                self.graph[other].name.clone()
            })
            .collect()
    }

    /// Every elementary cycle in the graph
    ///
    /// Each cycle is listed once, starting from the node that was inserted
    /// first and following dependency edges from there.
    pub fn find_cycles(&self) -> Vec<Vec<String>> {
        let mut component_of = vec![0usize; self.graph.node_count()];
        for (component, members) in algo::tarjan_scc(&self.graph).iter().enumerate() {
            for idx in members {
                component_of[idx.index()] = component;
            }
        }

        let mut cycles = Vec::new();
        for start in self.graph.node_indices() {
            let mut path = vec![start];
            let mut on_path = HashSet::from([start]);
            self.collect_cycles(start, start, &component_of, &mut path, &mut on_path, &mut cycles);
        }

        cycles
            .into_iter()
            .map(|cycle| cycle.into_iter().map(|idx| self.graph[idx].name.clone()).collect())
            .collect()
    }

    fn collect_cycles(
        &self,
        start: NodeIndex,
        current: NodeIndex,
        component_of: &[usize],
        path: &mut Vec<NodeIndex>,
        on_path: &mut HashSet<NodeIndex>,
        cycles: &mut Vec<Vec<NodeIndex>>,
    ) {
        let mut successors: Vec<NodeIndex> = self.graph.neighbors(current).collect();
        successors.sort();
        successors.dedup();

        for next in successors {
            if next == start {
                cycles.push(path.clone());
                continue;
            }
            // Only nodes after `start` in the same component, so each cycle is found once
            if next < start
                || component_of[next.index()] != component_of[start.index()]
                || on_path.contains(&next)
            {
                continue;
            }
            path.push(next);
            on_path.insert(next);
            self.collect_cycles(start, next, component_of, path, on_path, cycles);
            on_path.remove(&next);
            path.pop();
        }
    }

    /// Topological order with dependencies first
    ///
    /// With a subset, the order is filtered down to the named modules plus
    /// everything they transitively depend on. Returns an empty list when the
    /// graph contains a cycle.
    pub fn install_order(&self, subset: Option<&[String]>) -> Vec<String> {
        let order = match algo::toposort(Reversed(&self.graph), None) {
            Ok(order) => order,
            Err(cycle) => {
                warn!(
                    "Circular dependency involving '{}' prevents a valid install order",
                    self.graph[cycle.node_id()].name
                );
                return Vec::new();
            }
        };

        let names = order.into_iter().map(|idx| self.graph[idx].name.clone());

        match subset {
            Some(subset) if !subset.is_empty() => {
                let mut required: HashSet<String> = HashSet::new();
                for name in subset {
                    required.insert(name.clone());
                    required.extend(self.transitive_dependencies(name, true));
                }
                names.filter(|name| required.contains(name)).collect()
            }
            _ => names.collect(),
        }
    }

    /// Largest shortest-path distance from `name` along dependency edges
    ///
    /// This is the greatest number of hops needed to reach any dependency,
    /// which is not the longest chain when a dependency is reachable by
    /// paths of different lengths.
    pub fn dependency_depth(&self, name: &str) -> usize {
        let Some(&start) = self.indices.get(name) else {
            return 0;
        };

        algo::dijkstra(&self.graph, start, None, |_| 1usize)
            .into_values()
            .max()
            .unwrap_or(0)
    }

    /// Render the outgoing dependencies of `name` as a text tree
    pub fn dependency_tree(&self, name: &str, max_depth: usize) -> String {
        let mut lines = vec![name.to_string()];
        self.add_tree_lines(name, "", max_depth, &mut HashSet::new(), &mut lines);
        lines.join("\n")
    }

    fn add_tree_lines(
        &self,
        name: &str,
        prefix: &str,
        depth_left: usize,
        visited: &mut HashSet<String>,
        lines: &mut Vec<String>,
    ) {
        if depth_left == 0 || !visited.insert(name.to_string()) {
            return;
        }

        let children = self.direct_dependencies(name);
        let count = children.len();
        for (i, child) in children.iter().enumerate() {
            let is_last = i + 1 == count;
            let connector = if is_last { "└── " } else { "├── " };
            let marker = self.node(child).map(GraphNode::tree_marker).unwrap_or("[ext]");
            lines.push(format!("{}{}{} {}", prefix, connector, marker, child));

            let child_prefix = format!("{}{}", prefix, if is_last { "    " } else { "│   " });
            // Each branch tracks its own ancestors so shared dependencies still render
            let mut branch_visited = visited.clone();
            self.add_tree_lines(child, &child_prefix, depth_left - 1, &mut branch_visited, lines);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn graph_from(edges: &[(&str, &str)]) -> ModuleGraph {
        let mut graph = ModuleGraph::new();
        for (from, to) in edges {
            graph.add_dependency(from, to);
        }
        graph
    }

    #[test]
    fn test_duplicate_edges_collapse() {
        let graph = graph_from(&[("a", "b"), ("a", "b"), ("a", "c")]);
        assert_eq!(graph.node_count(), 3);
        assert_eq!(graph.edge_count(), 2);
        assert_eq!(graph.in_degree("b"), 1);
    }

    #[test]
    fn test_transitive_queries() {
        let graph = graph_from(&[("a", "b"), ("b", "c"), ("c", "base")]);

        let deps = graph.transitive_dependencies("a", true);
        assert_eq!(deps.into_iter().collect::<Vec<_>>(), vec!["b", "base", "c"]);

        let deps = graph.transitive_dependencies("a", false);
        assert!(!deps.contains("base"));

        let dependents = graph.transitive_dependents("c");
        assert_eq!(dependents.into_iter().collect::<Vec<_>>(), vec!["a", "b"]);

        assert!(graph.transitive_dependencies("missing", true).is_empty());
        assert!(graph.transitive_dependents("missing").is_empty());
    }

    #[test]
    fn test_direct_neighbors() {
        let graph = graph_from(&[("z", "m"), ("a", "m"), ("m", "y"), ("m", "b")]);
        assert_eq!(graph.direct_dependencies("m"), vec!["y", "b"]);
        assert_eq!(graph.direct_dependents("m"), vec!["a", "z"]);
        assert!(graph.direct_dependents("nope").is_empty());
    }

    #[test]
    fn test_single_cycle() {
        let graph = graph_from(&[("a", "b"), ("b", "c"), ("c", "a")]);
        let cycles = graph.find_cycles();
        assert_eq!(cycles, vec![vec!["a".to_string(), "b".to_string(), "c".to_string()]]);
        assert!(graph.install_order(None).is_empty());
    }

    #[test]
    fn test_overlapping_cycles_each_reported_once() {
        let graph = graph_from(&[("a", "b"), ("b", "a"), ("b", "c"), ("c", "a")]);
        let mut cycles = graph.find_cycles();
        cycles.sort();
        assert_eq!(
            cycles,
            vec![
                vec!["a".to_string(), "b".to_string()],
                vec!["a".to_string(), "b".to_string(), "c".to_string()],
            ]
        );
    }

    #[test]
    fn test_self_loop_is_a_cycle() {
        let graph = graph_from(&[("a", "a")]);
        assert_eq!(graph.find_cycles(), vec![vec!["a".to_string()]]);
    }

    #[test]
    fn test_acyclic_graph_has_no_cycles() {
        let graph = graph_from(&[("a", "b"), ("a", "c"), ("b", "c")]);
        assert!(graph.find_cycles().is_empty());
    }

    #[test]
    fn test_install_order_respects_edges() {
        let edges = [("a", "b"), ("a", "c"), ("b", "c"), ("d", "a"), ("c", "base")];
        let graph = graph_from(&edges);
        let order = graph.install_order(None);
        assert_eq!(order.len(), 5);

        let position = |name: &str| order.iter().position(|n| n == name).unwrap();
        for (from, to) in edges {
            assert!(position(to) < position(from), "{} should come before {}", to, from);
        }
    }

    #[test]
    fn test_install_order_subset() {
        let graph = graph_from(&[("a", "b"), ("b", "c"), ("x", "c")]);
        let order = graph.install_order(Some(&["a".to_string()]));
        assert_eq!(order, vec!["c", "b", "a"]);
    }

    #[test]
    fn test_dependency_depth_uses_shortest_paths() {
        // a reaches c both directly and through b
        let graph = graph_from(&[("a", "b"), ("b", "c"), ("a", "c"), ("c", "d")]);
        assert_eq!(graph.dependency_depth("a"), 2);
        assert_eq!(graph.dependency_depth("b"), 2);
        assert_eq!(graph.dependency_depth("d"), 0);
        assert_eq!(graph.dependency_depth("missing"), 0);
    }

    #[test]
    fn test_dependency_tree_is_cycle_safe() {
        let graph = graph_from(&[("a", "b"), ("b", "a"), ("a", "base")]);
        let tree = graph.dependency_tree("a", 10);
        let lines: Vec<&str> = tree.lines().collect();
        assert_eq!(lines[0], "a");
        assert_eq!(lines[1], "├── [ext] b");
        assert_eq!(lines[2], "│   └── [ext] a");
        assert_eq!(lines[3], "└── [core] base");
        assert_eq!(lines.len(), 4);
    }

    #[test]
    fn test_dependency_tree_respects_depth() {
        let graph = graph_from(&[("a", "b"), ("b", "c"), ("c", "d")]);
        let tree = graph.dependency_tree("a", 2);
        assert_eq!(tree.lines().count(), 3);
        assert!(!tree.contains(" d"));
    }

    #[test]
    fn test_node_categories() {
        let mut graph = ModuleGraph::new();
        let mut app = Module::new("shop", "/addons/shop");
        app.application = true;
        graph.add_module(&app);
        let mut broken = Module::new("legacy", "/addons/legacy");
        broken.installable = false;
        graph.add_module(&broken);
        graph.add_dependency("shop", "sale");
        graph.add_dependency("shop", "vendor_lib");

        assert_eq!(graph.node("shop").unwrap().category(), NodeCategory::Application);
        assert_eq!(graph.node("legacy").unwrap().category(), NodeCategory::NotInstallable);
        assert_eq!(graph.node("vendor_lib").unwrap().category(), NodeCategory::External);
        // External beats core for coloring
        assert_eq!(graph.node("sale").unwrap().category(), NodeCategory::External);
        assert!(graph.node("sale").unwrap().is_core);
        assert_eq!(graph.node("sale").unwrap().tree_marker(), "[core]");
    }
}
