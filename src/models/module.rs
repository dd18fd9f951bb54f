//! Module-related data structures

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Modules that ship with the base distribution and are assumed to be installed
pub const CORE_MODULES: &[&str] = &[
    "account",
    "analytic",
    "auth_signup",
    "base",
    "base_import",
    "base_setup",
    "board",
    "bus",
    "calendar",
    "contacts",
    "crm",
    "delivery",
    "digest",
    "fetchmail",
    "fleet",
    "hr",
    "http_routing",
    "iap",
    "im_livechat",
    "lunch",
    "mail",
    "mrp",
    "note",
    "payment",
    "phone_validation",
    "point_of_sale",
    "portal",
    "product",
    "project",
    "purchase",
    "rating",
    "resource",
    "sale",
    "sms",
    "snailmail",
    "stock",
    "survey",
    "uom",
    "utm",
    "web",
    "web_editor",
    "web_tour",
    "website",
];

/// Check whether a module name belongs to the core distribution
pub fn is_core_module(name: &str) -> bool {
    CORE_MODULES.binary_search(&name).is_ok()
}

/// A module discovered on disk, built from its manifest
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Module {
    /// Directory name of the module
    pub name: String,
    /// Module directory, kept so sources can be re-parsed later
    pub path: PathBuf,
    pub version: String,
    pub summary: String,
    pub description: String,
    pub author: String,
    pub category: String,
    /// Declared dependencies in manifest order; may contain duplicates
    pub depends: Vec<String>,
    /// Data files listed in the manifest (informational only)
    pub data: Vec<String>,
    pub installable: bool,
    pub application: bool,
    pub auto_install: bool,
    pub license: String,
}

impl Module {
    /// Create a module with every manifest field at its default value
    pub fn new(name: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
            version: "1.0".to_string(),
            summary: String::new(),
            description: String::new(),
            author: String::new(),
            category: String::new(),
            depends: Vec::new(),
            data: Vec::new(),
            installable: true,
            application: false,
            auto_install: false,
            license: "LGPL-3".to_string(),
        }
    }

    /// Builder-style helper to set the declared dependencies
    pub fn with_depends<I, S>(mut self, depends: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.depends = depends.into_iter().map(Into::into).collect();
        self
    }

    /// Whether this module is part of the core distribution
    pub fn is_core(&self) -> bool {
        is_core_module(&self.name)
    }

    /// Declared dependencies with duplicates removed, first declaration kept
    pub fn unique_depends(&self) -> Vec<&str> {
        let mut seen = std::collections::HashSet::new();
        self.depends
            .iter()
            .filter(|dep| seen.insert(dep.as_str()))
            .map(String::as_str)
            .collect()
    }
}
