use super::common::{analyzer_for, fixture_addons, position, write_module};
use modgraph::{ModGraphError, ModuleAnalyzer};
use std::collections::BTreeSet;
use tempfile::TempDir;

#[test]
fn test_every_declared_dependency_becomes_an_edge() {
    let analyzer = analyzer_for(&[fixture_addons()]);
    let graph = analyzer.graph().unwrap();
    let modules = analyzer.modules().unwrap();

    for module in modules.values() {
        assert!(graph.contains(&module.name));
        for dep in &module.depends {
            assert!(graph.contains(dep), "{} missing from graph", dep);
            assert!(graph.direct_dependencies(&module.name).contains(dep));
        }
    }

    let externals: Vec<&str> = graph
        .nodes()
        .filter(|node| node.is_external())
        .map(|node| node.name.as_str())
        .collect();
    assert!(externals.contains(&"ghost_connector"));
    assert!(externals.contains(&"base"));
}

#[test]
fn test_fixture_install_order_respects_dependencies() {
    let analyzer = analyzer_for(&[fixture_addons()]);
    let order = analyzer.install_order(None).unwrap();
    let graph = analyzer.graph().unwrap();

    assert_eq!(order.len(), graph.node_count());
    for (from, to) in graph.edges() {
        assert!(
            position(&order, to) < position(&order, from),
            "{} must come before {}",
            to,
            from
        );
    }
}

#[test]
fn test_subset_install_order() {
    let analyzer = analyzer_for(&[fixture_addons()]);
    let order = analyzer
        .install_order(Some(&["loyalty_portal".to_string()]))
        .unwrap();

    let got: BTreeSet<&str> = order.iter().map(String::as_str).collect();
    assert_eq!(
        got,
        BTreeSet::from(["base", "loyalty_base", "loyalty_portal", "portal", "product", "sale"])
    );
    assert_eq!(order.last().map(String::as_str), Some("loyalty_portal"));
}

#[test]
fn test_subset_of_chain() {
    let temp = TempDir::new().unwrap();
    write_module(temp.path(), "a", &["b"]);
    write_module(temp.path(), "b", &["c"]);
    write_module(temp.path(), "c", &[]);
    write_module(temp.path(), "unrelated", &[]);

    let analyzer = analyzer_for(&[temp.path()]);
    let order = analyzer.install_order(Some(&["a".to_string()])).unwrap();
    assert_eq!(order, vec!["c", "b", "a"]);
}

#[test]
fn test_three_module_cycle() {
    let temp = TempDir::new().unwrap();
    write_module(temp.path(), "a", &["b"]);
    write_module(temp.path(), "b", &["c"]);
    write_module(temp.path(), "c", &["a"]);

    let analyzer = analyzer_for(&[temp.path()]);
    let cycles = analyzer.find_cycles().unwrap();

    assert_eq!(cycles, vec![vec!["a".to_string(), "b".to_string(), "c".to_string()]]);
    assert!(analyzer.install_order(None).unwrap().is_empty());
    assert!(analyzer.check().unwrap().has_issues());
}

#[test]
fn test_rebuilding_gives_the_same_graph() {
    let mut analyzer = analyzer_for(&[fixture_addons()]);
    let first_order = analyzer.install_order(None).unwrap();
    let first_edges: Vec<(String, String)> = analyzer
        .graph()
        .unwrap()
        .edges()
        .map(|(from, to)| (from.to_string(), to.to_string()))
        .collect();

    analyzer.build_graph().unwrap();
    let second_edges: Vec<(String, String)> = analyzer
        .graph()
        .unwrap()
        .edges()
        .map(|(from, to)| (from.to_string(), to.to_string()))
        .collect();

    assert_eq!(first_edges, second_edges);
    assert_eq!(first_order, analyzer.install_order(None).unwrap());
}

#[test]
fn test_fixture_check_report() {
    let analyzer = analyzer_for(&[fixture_addons()]);
    let report = analyzer.check().unwrap();

    assert!(report.circular_dependencies.is_empty());
    assert_eq!(report.missing_dependencies.len(), 1);
    assert_eq!(report.missing_dependencies["legacy_stock"], vec!["ghost_connector"]);
    assert_eq!(report.not_installable, vec!["legacy_stock"]);
    assert!(report.has_issues());
}

#[test]
fn test_missing_dependencies_skip_core_modules() {
    let temp = TempDir::new().unwrap();
    write_module(temp.path(), "x", &["base", "y", "not_there"]);
    write_module(temp.path(), "y", &["mail"]);

    let mut analyzer = ModuleAnalyzer::new();
    analyzer.scan(&[temp.path()]);
    // No graph needed
    let missing = analyzer.find_missing_dependencies().unwrap();

    assert_eq!(missing.len(), 1);
    assert_eq!(missing["x"], vec!["not_there"]);
}

#[test]
fn test_dependents_and_depth() {
    let analyzer = analyzer_for(&[fixture_addons()]);

    assert_eq!(
        analyzer.direct_dependents("loyalty_base").unwrap(),
        vec!["loyalty_portal", "report_helper"]
    );
    let all = analyzer.transitive_dependents("base").unwrap();
    assert_eq!(
        all,
        BTreeSet::from([
            "loyalty_base".to_string(),
            "loyalty_portal".to_string(),
            "report_helper".to_string()
        ])
    );

    assert_eq!(analyzer.dependency_depth("loyalty_portal").unwrap(), 2);
    assert_eq!(analyzer.dependency_depth("loyalty_base").unwrap(), 1);
    assert_eq!(analyzer.dependency_depth("base").unwrap(), 0);
}

#[test]
fn test_transitive_dependencies_without_core() {
    let analyzer = analyzer_for(&[fixture_addons()]);

    let with_core = analyzer.transitive_dependencies("report_helper", true).unwrap();
    let without_core = analyzer.transitive_dependencies("report_helper", false).unwrap();

    assert!(with_core.contains("web"));
    assert!(with_core.contains("base"));
    assert_eq!(without_core, BTreeSet::from(["loyalty_base".to_string()]));
}

#[test]
fn test_fixture_statistics() {
    let analyzer = analyzer_for(&[fixture_addons()]);
    let stats = analyzer.statistics().unwrap();

    assert_eq!(stats.total_modules, 4);
    assert_eq!(stats.total_dependencies, 9);
    assert_eq!(stats.applications, vec!["loyalty_portal"]);
    assert!(stats.external_dependencies.contains(&"ghost_connector".to_string()));
    assert!(!stats.core_dependencies.contains(&"ghost_connector".to_string()));
    assert_eq!(stats.most_depended_modules[0], ("loyalty_base".to_string(), 2));
    assert!(stats.categories.contains(&"Sales".to_string()));
}

#[test]
fn test_dependency_tree_marks_external_modules() {
    let analyzer = analyzer_for(&[fixture_addons()]);
    let tree = analyzer.dependency_tree("loyalty_portal", 5).unwrap();

    assert!(tree.starts_with("loyalty_portal"));
    assert!(tree.contains("loyalty_base"));
    assert!(tree.contains("portal"));
}

#[test]
fn test_queries_follow_the_phase_order() {
    let mut analyzer = ModuleAnalyzer::new();
    assert!(matches!(analyzer.statistics(), Err(ModGraphError::NotScanned)));

    analyzer.scan(&[fixture_addons()]);
    assert!(matches!(analyzer.install_order(None), Err(ModGraphError::GraphNotBuilt)));
    assert!(matches!(analyzer.find_cycles(), Err(ModGraphError::GraphNotBuilt)));

    analyzer.build_graph().unwrap();
    assert!(analyzer.install_order(None).is_ok());
}
