//! Module manifest parsing
//!
//! A manifest is read by an ordered chain of strategies. The literal strategy
//! evaluates the file as a Python literal; when the file is not a literal
//! (computed values, several statements) the regex strategy extracts the
//! recognized keys one by one.

use super::literal::{parse_literal, Value};
use crate::models::module::Module;
use regex::Regex;
use std::fs;
use std::path::Path;
use std::sync::OnceLock;
use tracing::{debug, warn};

/// Current manifest file name
pub const MANIFEST_FILE: &str = "__manifest__.py";
/// Manifest file name used by older releases
pub const LEGACY_MANIFEST_FILE: &str = "__openerp__.py";
/// Marker file every module directory carries
pub const INIT_FILE: &str = "__init__.py";

/// Recognized manifest fields; `None` means the key was absent
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ManifestData {
    pub name: Option<String>,
    pub version: Option<String>,
    pub summary: Option<String>,
    pub description: Option<String>,
    pub author: Option<String>,
    pub category: Option<String>,
    pub depends: Vec<String>,
    pub data: Vec<String>,
    pub installable: Option<bool>,
    pub application: Option<bool>,
    pub auto_install: Option<bool>,
    pub license: Option<String>,
}

impl ManifestData {
    /// Build a module named after its directory, filling defaults for absent keys
    pub fn into_module(self, name: &str, path: &Path) -> Module {
        let mut module = Module::new(name, path);
        if let Some(version) = self.version {
            module.version = version;
        }
        module.summary = self.summary.unwrap_or_default();
        module.description = self.description.unwrap_or_default();
        module.author = self.author.unwrap_or_default();
        module.category = self.category.unwrap_or_default();
        module.depends = self.depends;
        module.data = self.data;
        if let Some(installable) = self.installable {
            module.installable = installable;
        }
        if let Some(application) = self.application {
            module.application = application;
        }
        if let Some(auto_install) = self.auto_install {
            module.auto_install = auto_install;
        }
        if let Some(license) = self.license {
            module.license = license;
        }
        module
    }
}

/// Result of running one strategy over manifest text
#[derive(Debug, Clone, PartialEq)]
pub enum Extraction {
    /// The strategy produced manifest data
    Parsed(ManifestData),
    /// The content is well-formed but is not a manifest; stop the chain
    Rejected,
    /// The strategy cannot handle this content; try the next one
    Unsupported,
}

/// One way of reading manifest text
pub trait ManifestStrategy {
    /// Short name used in log messages
    fn name(&self) -> &'static str;

    /// Extract manifest data; never fails
    fn extract(&self, content: &str) -> Extraction;
}

/// Evaluate the whole file as a single Python literal
pub struct LiteralStrategy;

impl ManifestStrategy for LiteralStrategy {
    fn name(&self) -> &'static str {
        "literal"
    }

    fn extract(&self, content: &str) -> Extraction {
        match parse_literal(content) {
            Ok(value) if value.is_dict() => Extraction::Parsed(from_literal(&value)),
            Ok(_) => Extraction::Rejected,
            Err(err) => {
                debug!("Manifest is not a plain literal ({}), trying next strategy", err);
                Extraction::Unsupported
            }
        }
    }
}

fn from_literal(dict: &Value) -> ManifestData {
    let text = |key: &str| dict.get(key).map(|v| v.as_str().unwrap_or_default().to_string());
    let strings = |key: &str| -> Vec<String> {
        dict.get(key)
            .and_then(Value::as_sequence)
            .map(|items| {
                items
                    .iter()
                    .filter_map(Value::as_str)
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default()
    };
    let flag = |key: &str| dict.get(key).map(Value::is_truthy);

    ManifestData {
        name: text("name"),
        version: dict.get("version").map(Value::to_python_str),
        summary: text("summary"),
        description: text("description"),
        author: text("author"),
        category: text("category"),
        depends: strings("depends"),
        data: strings("data"),
        installable: flag("installable"),
        application: flag("application"),
        auto_install: flag("auto_install"),
        license: dict.get("license").and_then(Value::as_str).map(str::to_string),
    }
}

/// Best-effort extraction of individual keys with regular expressions
pub struct RegexStrategy;

struct ManifestPatterns {
    name: Regex,
    version: Regex,
    summary: Regex,
    author: Regex,
    category: Regex,
    license: Regex,
    depends: Regex,
    quoted: Regex,
    installable: Regex,
    application: Regex,
    auto_install: Regex,
}

fn patterns() -> &'static ManifestPatterns {
    static PATTERNS: OnceLock<ManifestPatterns> = OnceLock::new();
    PATTERNS.get_or_init(|| {
        let text_key = |key: &str, value: &str| {
            Regex::new(&format!(r#"['"]{}['"]\s*:\s*['"]({})['"]"#, key, value))
                .expect("manifest text pattern")
        };
        let flag_key = |key: &str| {
            Regex::new(&format!(r#"['"]{}['"]\s*:\s*(True|False)"#, key)).expect("manifest flag pattern")
        };
        ManifestPatterns {
            name: text_key("name", r#"[^'"]+"#),
            version: text_key("version", r#"[^'"]+"#),
            summary: text_key("summary", r#"[^'"]*"#),
            author: text_key("author", r#"[^'"]*"#),
            category: text_key("category", r#"[^'"]*"#),
            license: text_key("license", r#"[^'"]*"#),
            depends: Regex::new(r#"(?s)['"]depends['"]\s*:\s*\[(.*?)\]"#).expect("depends pattern"),
            quoted: Regex::new(r#"['"]([^'"]+)['"]"#).expect("quoted token pattern"),
            installable: flag_key("installable"),
            application: flag_key("application"),
            auto_install: Regex::new(r#"(?s)['"]auto_install['"]\s*:\s*(True|False|\[.*?\])"#)
                .expect("auto_install pattern"),
        }
    })
}

fn capture(regex: &Regex, content: &str) -> Option<String> {
    regex
        .captures(content)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

impl ManifestStrategy for RegexStrategy {
    fn name(&self) -> &'static str {
        "regex"
    }

    fn extract(&self, content: &str) -> Extraction {
        let p = patterns();

        let depends = p
            .depends
            .captures(content)
            .and_then(|caps| caps.get(1))
            .map(|list| {
                p.quoted
                    .captures_iter(list.as_str())
                    .filter_map(|caps| caps.get(1))
                    .map(|m| m.as_str().to_string())
                    .collect()
            })
            .unwrap_or_default();

        let flag = |regex: &Regex| capture(regex, content).map(|value| value == "True");
        let auto_install =
            capture(&p.auto_install, content).map(|value| value == "True" || value.starts_with('['));

        Extraction::Parsed(ManifestData {
            name: capture(&p.name, content),
            version: capture(&p.version, content),
            summary: capture(&p.summary, content),
            description: None,
            author: capture(&p.author, content),
            category: capture(&p.category, content),
            depends,
            data: Vec::new(),
            installable: flag(&p.installable),
            application: flag(&p.application),
            auto_install,
            license: capture(&p.license, content),
        })
    }
}

/// Reads manifests with an ordered chain of strategies; first success wins
pub struct ManifestParser {
    strategies: Vec<Box<dyn ManifestStrategy>>,
}

impl Default for ManifestParser {
    fn default() -> Self {
        Self::new(vec![Box::new(LiteralStrategy), Box::new(RegexStrategy)])
    }
}

impl ManifestParser {
    /// Create a parser running `strategies` in order
    pub fn new(strategies: Vec<Box<dyn ManifestStrategy>>) -> Self {
        Self { strategies }
    }

    /// Parse manifest text; `path` is only used for diagnostics
    pub fn parse(&self, content: &str, path: &Path) -> Option<ManifestData> {
        for strategy in &self.strategies {
            match strategy.extract(content) {
                Extraction::Parsed(data) => {
                    debug!("Parsed {} with the {} strategy", path.display(), strategy.name());
                    return Some(data);
                }
                Extraction::Rejected => {
                    warn!("Manifest {} is not a dictionary, module skipped", path.display());
                    return None;
                }
                Extraction::Unsupported => continue,
            }
        }
        warn!("No strategy could read manifest {}, module skipped", path.display());
        None
    }

    /// Read and parse a manifest file; unreadable files yield `None`
    pub fn parse_file(&self, path: &Path) -> Option<ManifestData> {
        match fs::read_to_string(path) {
            Ok(content) => self.parse(&content, path),
            Err(err) => {
                warn!("Cannot read manifest {}: {}, module skipped", path.display(), err);
                None
            }
        }
    }
}

/// Locate the manifest of a module directory, preferring the current file name
pub fn find_manifest(dir: &Path) -> Option<std::path::PathBuf> {
    [MANIFEST_FILE, LEGACY_MANIFEST_FILE]
        .iter()
        .map(|name| dir.join(name))
        .find(|path| path.is_file())
}

/// A directory is a module when it has the init marker and a manifest
pub fn is_module_dir(dir: &Path) -> bool {
    dir.join(INIT_FILE).is_file() && find_manifest(dir).is_some()
}
