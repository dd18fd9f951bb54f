use super::common::{fixture_addons, write_module};
use clap::Parser;
use modgraph::cli::{Args, Command};
use std::fs;
use std::path::Path;
use tempfile::TempDir;

fn run(output: &Path, extra: &[&str]) -> i32 {
    let addons = fixture_addons();
    let mut argv = vec![
        "modgraph".to_string(),
        "--path".to_string(),
        addons.to_string_lossy().into_owned(),
        "--output-file".to_string(),
        output.to_string_lossy().into_owned(),
        "--no-progress".to_string(),
        "--no-colors".to_string(),
    ];
    argv.extend(extra.iter().map(|arg| arg.to_string()));

    let args = Args::try_parse_from(argv).unwrap();
    Command::from_args(args).execute().unwrap()
}

#[test]
fn test_check_reports_fixture_issues() {
    let temp = TempDir::new().unwrap();
    let out = temp.path().join("check.txt");

    assert_eq!(run(&out, &["check"]), 1);
    let text = fs::read_to_string(&out).unwrap();
    assert!(text.contains("ghost_connector"));
    assert!(text.contains("legacy_stock"));
}

#[test]
fn test_order_succeeds_without_cycles() {
    let temp = TempDir::new().unwrap();
    let out = temp.path().join("order.txt");

    assert_eq!(run(&out, &["order", "--module", "loyalty_portal"]), 0);
    let text = fs::read_to_string(&out).unwrap();
    assert!(text.starts_with("Install order:"));
    assert!(text.find("loyalty_base").unwrap() < text.find("loyalty_portal").unwrap());
}

#[test]
fn test_export_as_dot() {
    let temp = TempDir::new().unwrap();
    let out = temp.path().join("graph.dot");

    assert_eq!(run(&out, &["export", "--format", "dot"]), 0);
    let dot = fs::read_to_string(&out).unwrap();
    assert!(dot.starts_with("digraph"));
    assert!(dot.contains("\"loyalty_portal\" -> \"loyalty_base\";"));
}

#[test]
fn test_deps_as_json() {
    let temp = TempDir::new().unwrap();
    let out = temp.path().join("deps.json");

    assert_eq!(run(&out, &["-o", "json", "deps", "loyalty_portal"]), 0);
    let parsed: serde_json::Value = serde_json::from_str(&fs::read_to_string(&out).unwrap()).unwrap();
    assert_eq!(parsed["depth"], 2);
    assert_eq!(parsed["module"]["name"], "loyalty_portal");
}

#[test]
fn test_impact_as_json() {
    let temp = TempDir::new().unwrap();
    let out = temp.path().join("impact.json");

    assert_eq!(run(&out, &["-o", "json", "impact", "loyalty_base"]), 0);
    let parsed: serde_json::Value = serde_json::from_str(&fs::read_to_string(&out).unwrap()).unwrap();
    assert_eq!(parsed["impact_score"], 8);
    assert_eq!(parsed["risk_level"], "low");
}

#[test]
fn test_compare_two_trees() {
    let temp = TempDir::new().unwrap();
    let source = temp.path().join("v1");
    let target = temp.path().join("v2");
    write_module(&source, "a", &[]);
    write_module(&target, "a", &["b"]);
    write_module(&target, "b", &[]);
    let out = temp.path().join("diff.txt");

    let args = Args::try_parse_from([
        "modgraph",
        "--output-file",
        out.to_str().unwrap(),
        "--no-progress",
        "--no-colors",
        "compare",
        "--source",
        source.to_str().unwrap(),
        "--target",
        target.to_str().unwrap(),
    ])
    .unwrap();

    assert_eq!(Command::from_args(args).execute().unwrap(), 0);
    let text = fs::read_to_string(&out).unwrap();
    assert!(text.contains("b"));
}

#[test]
fn test_unknown_module_fails() {
    let temp = TempDir::new().unwrap();
    let out = temp.path().join("deps.txt");
    let addons = fixture_addons();

    let args = Args::try_parse_from([
        "modgraph",
        "--path",
        addons.to_str().unwrap(),
        "--output-file",
        out.to_str().unwrap(),
        "--no-progress",
        "deps",
        "does_not_exist",
    ])
    .unwrap();

    let command = Command::from_args(args);
    assert!(command.execute().is_err());
    assert_eq!(command.run(), 1);
}
