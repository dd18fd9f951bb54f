//! Module dependency analysis
//!
//! [`ModuleAnalyzer`] owns the scanned module set and the graph built from
//! it. Scanning replaces both wholesale; every query checks that the
//! required phase has run and reports a sequence error otherwise.

use crate::core::graph_builder::GraphBuilder;
use crate::core::scanner::ModuleScanner;
use crate::error::{ModGraphError, Result};
use crate::models::analysis::{AnalysisExport, CheckReport, DependencyStatistics, ModuleReport};
use crate::models::graph::ModuleGraph;
use crate::models::module::{is_core_module, Module};
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::path::{Path, PathBuf};
use tracing::info;

const MOST_DEPENDED_LIMIT: usize = 10;

/// Analyzer for one set of addons paths
#[derive(Debug, Default)]
pub struct ModuleAnalyzer {
    modules: Option<BTreeMap<String, Module>>,
    graph: Option<ModuleGraph>,
    skipped: Vec<PathBuf>,
}

impl ModuleAnalyzer {
    /// Create an analyzer with nothing scanned yet
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an analyzer from an already known module set
    pub fn from_modules(modules: BTreeMap<String, Module>) -> Self {
        Self {
            modules: Some(modules),
            graph: None,
            skipped: Vec::new(),
        }
    }

    /// Scan `roots` with a default scanner, replacing any previous state
    pub fn scan<P: AsRef<Path>>(&mut self, roots: &[P]) -> &BTreeMap<String, Module> {
        let mut scanner = ModuleScanner::new();
        self.scan_with(&mut scanner, roots)
    }

    /// Scan `roots` with a configured scanner, replacing any previous state
    pub fn scan_with<P: AsRef<Path>>(
        &mut self,
        scanner: &mut ModuleScanner,
        roots: &[P],
    ) -> &BTreeMap<String, Module> {
        self.scan_with_progress(scanner, roots, |_| {})
    }

    /// Like [`scan_with`](Self::scan_with), calling `on_module` for each module found
    pub fn scan_with_progress<P, F>(
        &mut self,
        scanner: &mut ModuleScanner,
        roots: &[P],
        on_module: F,
    ) -> &BTreeMap<String, Module>
    where
        P: AsRef<Path>,
        F: FnMut(&Module),
    {
        let modules = scanner.scan_with_progress(roots, on_module);
        self.skipped = scanner.skipped().to_vec();
        self.graph = None;
        self.modules.insert(modules)
    }

    /// Build (or rebuild) the dependency graph from the scanned modules
    pub fn build_graph(&mut self) -> Result<&ModuleGraph> {
        let modules = self.modules.as_ref().ok_or(ModGraphError::NotScanned)?;
        let graph = GraphBuilder::build(modules);
        Ok(&*self.graph.insert(graph))
    }

    pub fn modules(&self) -> Result<&BTreeMap<String, Module>> {
        self.modules.as_ref().ok_or(ModGraphError::NotScanned)
    }

    pub fn graph(&self) -> Result<&ModuleGraph> {
        self.modules()?;
        self.graph.as_ref().ok_or(ModGraphError::GraphNotBuilt)
    }

    /// Whether a graph is available for queries
    pub fn is_built(&self) -> bool {
        self.graph.is_some()
    }

    /// Module directories skipped during the last scan
    pub fn skipped(&self) -> &[PathBuf] {
        &self.skipped
    }

    /// Look up a scanned module by name
    pub fn module(&self, name: &str) -> Result<&Module> {
        self.modules()?
            .get(name)
            .ok_or_else(|| ModGraphError::ModuleNotFound { name: name.to_string() })
    }

    pub fn transitive_dependencies(&self, name: &str, include_core: bool) -> Result<BTreeSet<String>> {
        Ok(self.graph()?.transitive_dependencies(name, include_core))
    }

    pub fn transitive_dependents(&self, name: &str) -> Result<BTreeSet<String>> {
        Ok(self.graph()?.transitive_dependents(name))
    }

    pub fn direct_dependencies(&self, name: &str) -> Result<Vec<String>> {
        Ok(self.graph()?.direct_dependencies(name))
    }

    pub fn direct_dependents(&self, name: &str) -> Result<Vec<String>> {
        Ok(self.graph()?.direct_dependents(name))
    }

    pub fn find_cycles(&self) -> Result<Vec<Vec<String>>> {
        Ok(self.graph()?.find_cycles())
    }

    /// Declared dependencies that are neither scanned nor part of the core set
    ///
    /// Only needs a scan. Repeated declarations are reported as declared.
    pub fn find_missing_dependencies(&self) -> Result<BTreeMap<String, Vec<String>>> {
        let modules = self.modules()?;
        let missing = modules
            .values()
            .filter_map(|module| {
                let absent: Vec<String> = module
                    .depends
                    .iter()
                    .filter(|dep| !modules.contains_key(dep.as_str()) && !is_core_module(dep))
                    .cloned()
                    .collect();
                (!absent.is_empty()).then(|| (module.name.clone(), absent))
            })
            .collect();
        Ok(missing)
    }

    pub fn install_order(&self, subset: Option<&[String]>) -> Result<Vec<String>> {
        Ok(self.graph()?.install_order(subset))
    }

    pub fn dependency_depth(&self, name: &str) -> Result<usize> {
        Ok(self.graph()?.dependency_depth(name))
    }

    pub fn dependency_tree(&self, name: &str, max_depth: usize) -> Result<String> {
        Ok(self.graph()?.dependency_tree(name, max_depth))
    }

    /// Aggregate statistics over the scanned set
    pub fn statistics(&self) -> Result<DependencyStatistics> {
        let modules = self.modules()?;
        let graph = self.graph()?;

        let mut total_dependencies = 0;
        let mut unique = BTreeSet::new();
        let mut external = BTreeSet::new();
        // Reference counts in first-seen order so ties keep discovery order
        let mut counts: Vec<(String, usize)> = Vec::new();
        let mut positions: HashMap<&str, usize> = HashMap::new();

        for module in modules.values() {
            total_dependencies += module.depends.len();
            for dep in &module.depends {
                unique.insert(dep.as_str());
                if !modules.contains_key(dep) {
                    external.insert(dep.clone());
                }
                match positions.get(dep.as_str()) {
                    Some(&pos) => counts[pos].1 += 1,
                    None => {
                        positions.insert(dep.as_str(), counts.len());
                        counts.push((dep.clone(), 1));
                    }
                }
            }
        }

        counts.sort_by(|a, b| b.1.cmp(&a.1));
        counts.truncate(MOST_DEPENDED_LIMIT);

        let core_dependencies = external
            .iter()
            .filter(|name| is_core_module(name))
            .cloned()
            .collect();
        let categories: BTreeSet<String> = modules
            .values()
            .filter(|module| !module.category.is_empty())
            .map(|module| module.category.clone())
            .collect();

        let statistics = DependencyStatistics {
            total_modules: modules.len(),
            total_dependencies,
            unique_dependencies: unique.len(),
            external_dependencies: external.into_iter().collect(),
            core_dependencies,
            missing_dependencies: self.find_missing_dependencies()?,
            circular_dependencies: graph.find_cycles(),
            most_depended_modules: counts,
            applications: modules
                .values()
                .filter(|module| module.application)
                .map(|module| module.name.clone())
                .collect(),
            categories: categories.into_iter().collect(),
        };
        info!(
            "Statistics: {} modules, {} dependencies, {} cycles",
            statistics.total_modules,
            statistics.total_dependencies,
            statistics.circular_dependencies.len()
        );
        Ok(statistics)
    }

    /// Details, neighbours and tree of one scanned module
    pub fn module_report(&self, name: &str, include_core: bool, tree_depth: usize) -> Result<ModuleReport> {
        let module = self.module(name)?;
        let graph = self.graph()?;

        Ok(ModuleReport {
            module: module.clone(),
            depth: graph.dependency_depth(name),
            direct_dependencies: module.unique_depends().into_iter().map(String::from).collect(),
            all_dependencies: graph.transitive_dependencies(name, include_core).into_iter().collect(),
            direct_dependents: graph.direct_dependents(name),
            all_dependents: graph.transitive_dependents(name).into_iter().collect(),
            tree: graph.dependency_tree(name, tree_depth),
        })
    }

    /// Cycles, missing dependencies and non-installable modules
    pub fn check(&self) -> Result<CheckReport> {
        let modules = self.modules()?;
        Ok(CheckReport {
            circular_dependencies: self.find_cycles()?,
            missing_dependencies: self.find_missing_dependencies()?,
            not_installable: modules
                .values()
                .filter(|module| !module.installable)
                .map(|module| module.name.clone())
                .collect(),
        })
    }

    /// Snapshot of the scanned modules and their statistics
    pub fn export(&self) -> Result<AnalysisExport> {
        Ok(AnalysisExport::new(self.modules()?.clone(), self.statistics()?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn analyzer(specs: &[(&str, &[&str])]) -> ModuleAnalyzer {
        let modules = specs
            .iter()
            .map(|(name, deps)| {
                let module = Module::new(*name, format!("/addons/{}", name)).with_depends(deps.iter().copied());
                (name.to_string(), module)
            })
            .collect();
        let mut analyzer = ModuleAnalyzer::from_modules(modules);
        analyzer.build_graph().unwrap();
        analyzer
    }

    #[test]
    fn test_queries_before_scan() {
        let analyzer = ModuleAnalyzer::new();
        assert!(matches!(analyzer.modules(), Err(ModGraphError::NotScanned)));
        assert!(matches!(analyzer.install_order(None), Err(ModGraphError::NotScanned)));
        assert!(matches!(analyzer.find_missing_dependencies(), Err(ModGraphError::NotScanned)));
    }

    #[test]
    fn test_build_before_scan() {
        let mut analyzer = ModuleAnalyzer::new();
        assert!(matches!(analyzer.build_graph(), Err(ModGraphError::NotScanned)));
    }

    #[test]
    fn test_queries_before_build() {
        let analyzer = ModuleAnalyzer::from_modules(BTreeMap::new());
        assert!(matches!(analyzer.find_cycles(), Err(ModGraphError::GraphNotBuilt)));
        assert!(matches!(analyzer.statistics(), Err(ModGraphError::GraphNotBuilt)));
        // Missing dependencies only need the scan
        assert!(analyzer.find_missing_dependencies().unwrap().is_empty());
    }

    #[test]
    fn test_missing_dependencies() {
        let analyzer = analyzer(&[("a", &["b", "ghost", "base", "ghost"]), ("b", &[])]);
        let missing = analyzer.find_missing_dependencies().unwrap();

        assert_eq!(missing.len(), 1);
        assert_eq!(missing["a"], vec!["ghost", "ghost"]);
    }

    #[test]
    fn test_transitive_queries() {
        let analyzer = analyzer(&[("a", &["b"]), ("b", &["c", "base"]), ("c", &[])]);

        let deps = analyzer.transitive_dependencies("a", true).unwrap();
        assert_eq!(deps.into_iter().collect::<Vec<_>>(), vec!["b", "base", "c"]);

        let deps = analyzer.transitive_dependencies("a", false).unwrap();
        assert_eq!(deps.into_iter().collect::<Vec<_>>(), vec!["b", "c"]);

        let dependents = analyzer.transitive_dependents("c").unwrap();
        assert_eq!(dependents.into_iter().collect::<Vec<_>>(), vec!["a", "b"]);

        assert!(analyzer.transitive_dependencies("nope", true).unwrap().is_empty());
        assert_eq!(analyzer.dependency_depth("a").unwrap(), 2);
    }

    #[test]
    fn test_statistics() {
        let mut analyzer = analyzer(&[
            ("crm", &["base", "mail"]),
            ("sale", &["base", "mail", "crm", "ghost"]),
            ("website", &["base"]),
        ]);
        let mut modules = analyzer.modules().unwrap().clone();
        modules.get_mut("sale").unwrap().application = true;
        modules.get_mut("sale").unwrap().category = "Sales".to_string();
        analyzer = ModuleAnalyzer::from_modules(modules);
        analyzer.build_graph().unwrap();

        let stats = analyzer.statistics().unwrap();
        assert_eq!(stats.total_modules, 3);
        assert_eq!(stats.total_dependencies, 7);
        assert_eq!(stats.unique_dependencies, 4);
        assert_eq!(stats.external_dependencies, vec!["base", "ghost", "mail"]);
        assert_eq!(stats.core_dependencies, vec!["base", "mail"]);
        assert_eq!(stats.missing_dependencies["sale"], vec!["ghost"]);
        assert!(stats.circular_dependencies.is_empty());
        assert_eq!(stats.most_depended_modules[0], ("base".to_string(), 3));
        assert_eq!(stats.most_depended_modules[1], ("mail".to_string(), 2));
        // Ties keep first-seen order: crm is referenced before ghost
        assert_eq!(stats.most_depended_modules[2], ("crm".to_string(), 1));
        assert_eq!(stats.applications, vec!["sale"]);
        assert_eq!(stats.categories, vec!["Sales"]);
    }

    #[test]
    fn test_rescan_resets_graph() {
        let mut analyzer = analyzer(&[("a", &[])]);
        assert!(analyzer.is_built());

        let temp = tempfile::TempDir::new().unwrap();
        let modules = analyzer.scan(&[temp.path()]);
        assert!(modules.is_empty());
        assert!(!analyzer.is_built());
        assert!(matches!(analyzer.graph(), Err(ModGraphError::GraphNotBuilt)));
    }

    #[test]
    fn test_module_report() {
        let analyzer = analyzer(&[("a", &["b", "b", "base"]), ("b", &[]), ("c", &["a"])]);
        let report = analyzer.module_report("a", false, 5).unwrap();

        assert_eq!(report.direct_dependencies, vec!["b", "base"]);
        assert_eq!(report.all_dependencies, vec!["b"]);
        assert_eq!(report.direct_dependents, vec!["c"]);
        assert_eq!(report.depth, 1);
        assert!(report.tree.starts_with("a\n"));
    }

    #[test]
    fn test_check() {
        let mut modules: BTreeMap<String, Module> = [("a", &["b"][..]), ("b", &["a", "ghost"][..])]
            .iter()
            .map(|(name, deps)| (name.to_string(), Module::new(*name, "/x").with_depends(deps.iter().copied())))
            .collect();
        modules.get_mut("b").unwrap().installable = false;
        let mut analyzer = ModuleAnalyzer::from_modules(modules);
        analyzer.build_graph().unwrap();

        let report = analyzer.check().unwrap();
        assert_eq!(report.circular_dependencies, vec![vec!["a".to_string(), "b".to_string()]]);
        assert_eq!(report.missing_dependencies["b"], vec!["ghost"]);
        assert_eq!(report.not_installable, vec!["b"]);
        assert!(report.has_issues());
    }

    #[test]
    fn test_module_lookup() {
        let analyzer = analyzer(&[("a", &[])]);
        assert_eq!(analyzer.module("a").unwrap().name, "a");
        assert!(matches!(
            analyzer.module("b"),
            Err(ModGraphError::ModuleNotFound { .. })
        ));
    }
}
