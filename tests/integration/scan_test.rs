use super::common::{fixture_addons, write_manifest, write_module};
use modgraph::{ModuleAnalyzer, ModuleScanner};
use std::collections::BTreeSet;
use tempfile::TempDir;

#[test]
fn test_fixture_scan_finds_every_module() {
    let mut analyzer = ModuleAnalyzer::new();
    let modules = analyzer.scan(&[fixture_addons()]);

    let names: Vec<&str> = modules.keys().map(String::as_str).collect();
    assert_eq!(names, vec!["legacy_stock", "loyalty_base", "loyalty_portal", "report_helper"]);
    assert!(analyzer.skipped().is_empty());
}

#[test]
fn test_fixture_manifest_fields() {
    let mut analyzer = ModuleAnalyzer::new();
    let modules = analyzer.scan(&[fixture_addons()]);

    let base = &modules["loyalty_base"];
    assert_eq!(base.version, "16.0.1.2.0");
    assert_eq!(base.category, "Sales");
    assert_eq!(base.author, "Example Partners");
    assert_eq!(base.depends, vec!["base", "sale", "product"]);
    assert_eq!(base.data.len(), 2);

    let legacy = &modules["legacy_stock"];
    assert!(!legacy.installable);
    assert!(legacy.path.ends_with("legacy_stock"));

    let helper = &modules["report_helper"];
    assert!(helper.auto_install);
    assert!(helper.path.ends_with("vendor/report_helper"));
}

#[test]
fn test_computed_manifest_falls_back_to_key_extraction() {
    let mut analyzer = ModuleAnalyzer::new();
    let modules = analyzer.scan(&[fixture_addons()]);

    let portal = &modules["loyalty_portal"];
    let depends: BTreeSet<&str> = portal.depends.iter().map(String::as_str).collect();
    assert_eq!(depends, BTreeSet::from(["loyalty_base", "portal"]));
    assert!(portal.application);
    assert_eq!(portal.category, "Website");
}

#[test]
fn test_fallback_and_literal_agree_on_multiline_depends() {
    let temp = TempDir::new().unwrap();
    let deps = "    'depends': [\n        'base',\n        'mail',\n        'sale_management',\n    ],\n";
    write_manifest(temp.path(), "literal_mod", &format!("{{\n    'name': 'L',\n{}}}\n", deps));
    write_manifest(
        temp.path(),
        "computed_mod",
        &format!("NAME = 'C'\n{{\n    'name': NAME,\n{}}}\n", deps),
    );

    let mut analyzer = ModuleAnalyzer::new();
    let modules = analyzer.scan(&[temp.path()]);

    let literal: BTreeSet<&String> = modules["literal_mod"].depends.iter().collect();
    let computed: BTreeSet<&String> = modules["computed_mod"].depends.iter().collect();
    assert_eq!(literal.len(), 3);
    assert_eq!(literal, computed);
}

#[test]
fn test_module_as_root() {
    let temp = TempDir::new().unwrap();
    let dir = write_module(temp.path(), "standalone", &["base"]);

    let mut analyzer = ModuleAnalyzer::new();
    let modules = analyzer.scan(&[&dir]);

    assert_eq!(modules.len(), 1);
    assert!(modules.contains_key("standalone"));
}

#[test]
fn test_missing_root_is_skipped() {
    let temp = TempDir::new().unwrap();
    write_module(temp.path(), "present", &[]);

    let mut scanner = ModuleScanner::new();
    let modules = scanner.scan(&[temp.path().join("absent"), temp.path().to_path_buf()]);

    assert_eq!(modules.keys().collect::<Vec<_>>(), vec!["present"]);
    assert_eq!(scanner.errors().len(), 1);
}

#[test]
fn test_later_root_overrides_earlier_module() {
    let temp = TempDir::new().unwrap();
    let community = temp.path().join("community");
    let enterprise = temp.path().join("enterprise");
    write_module(&community, "web_extra", &["web"]);
    write_module(&enterprise, "web_extra", &["web", "web_enterprise"]);

    let mut analyzer = ModuleAnalyzer::new();
    let modules = analyzer.scan(&[&community, &enterprise]);

    assert_eq!(modules["web_extra"].depends, vec!["web", "web_enterprise"]);
    assert!(modules["web_extra"].path.starts_with(&enterprise));
}

#[test]
fn test_exclude_patterns() {
    let mut scanner = ModuleScanner::new().with_exclude_patterns(&["legacy_*", "vendor"]).unwrap();
    let modules = scanner.scan(&[fixture_addons()]);

    assert_eq!(modules.keys().collect::<Vec<_>>(), vec!["loyalty_base", "loyalty_portal"]);
}

#[test]
fn test_rescanning_discards_previous_results() {
    let temp = TempDir::new().unwrap();
    write_module(temp.path(), "only_here", &[]);

    let mut analyzer = ModuleAnalyzer::new();
    analyzer.scan(&[fixture_addons()]);
    analyzer.build_graph().unwrap();

    let modules = analyzer.scan(&[temp.path()]);
    assert_eq!(modules.keys().collect::<Vec<_>>(), vec!["only_here"]);
    assert!(!analyzer.is_built());
}
