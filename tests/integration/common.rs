//! Helpers shared by the integration tests

use modgraph::ModuleAnalyzer;
use std::fs;
use std::path::{Path, PathBuf};

/// The checked-in addons tree under `tests/fixtures/addons`
pub fn fixture_addons() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join("addons")
}

/// Write a module directory with a literal manifest
pub fn write_module(root: &Path, name: &str, depends: &[&str]) -> PathBuf {
    let deps: Vec<String> = depends.iter().map(|dep| format!("'{}'", dep)).collect();
    write_manifest(
        root,
        name,
        &format!("{{\n    'name': '{}',\n    'depends': [{}],\n}}\n", name, deps.join(", ")),
    )
}

/// Write a module directory with the given manifest content
pub fn write_manifest(root: &Path, name: &str, manifest: &str) -> PathBuf {
    let dir = root.join(name);
    fs::create_dir_all(&dir).unwrap();
    fs::write(dir.join("__init__.py"), "").unwrap();
    fs::write(dir.join("__manifest__.py"), manifest).unwrap();
    dir
}

/// Scan `roots` and build the graph
pub fn analyzer_for<P: AsRef<Path>>(roots: &[P]) -> ModuleAnalyzer {
    let mut analyzer = ModuleAnalyzer::new();
    analyzer.scan(roots);
    analyzer.build_graph().unwrap();
    analyzer
}

/// Position of each name in `order`
pub fn position(order: &[String], name: &str) -> usize {
    order
        .iter()
        .position(|entry| entry == name)
        .unwrap_or_else(|| panic!("{} missing from {:?}", name, order))
}
