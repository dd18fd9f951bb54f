//! Module discovery
//!
//! Walks addons roots looking for module directories. The walk is shallow:
//! a root can itself be a module, hold modules directly, or hold directories
//! of modules one level further down. Nothing deeper is ever visited.

use crate::error::{ModGraphError, Result, ResultExt};
use crate::models::module::Module;
use crate::parsers::manifest::{find_manifest, is_module_dir, ManifestParser};
use glob::Pattern;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Finds module directories under a set of roots and parses their manifests
pub struct ModuleScanner {
    parser: ManifestParser,
    exclude_patterns: Vec<Pattern>,
    skipped: Vec<PathBuf>,
    errors: Vec<(PathBuf, ModGraphError)>, // non-fatal traversal problems
}

impl Default for ModuleScanner {
    fn default() -> Self {
        Self::new()
    }
}

impl ModuleScanner {
    /// Create a scanner with the default manifest strategies and no exclusions
    pub fn new() -> Self {
        Self {
            parser: ManifestParser::default(),
            exclude_patterns: Vec::new(),
            skipped: Vec::new(),
            errors: Vec::new(),
        }
    }

    /// Replace the manifest parser
    pub fn with_parser(mut self, parser: ManifestParser) -> Self {
        self.parser = parser;
        self
    }

    /// Skip directories matching any of the glob `patterns`
    pub fn with_exclude_patterns<S: AsRef<str>>(mut self, patterns: &[S]) -> Result<Self> {
        self.exclude_patterns = patterns
            .iter()
            .map(|pattern| Pattern::new(pattern.as_ref()))
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(self)
    }

    /// Module directories whose manifest could not be used during the last scan
    pub fn skipped(&self) -> &[PathBuf] {
        &self.skipped
    }

    /// Non-fatal errors collected during the last scan
    pub fn errors(&self) -> &[(PathBuf, ModGraphError)] {
        &self.errors
    }

    /// Scan every root; later modules with the same name replace earlier ones
    pub fn scan<P: AsRef<Path>>(&mut self, roots: &[P]) -> BTreeMap<String, Module> {
        self.scan_with_progress(roots, |_| {})
    }

    /// Scan every root, calling `on_module` for each module found
    pub fn scan_with_progress<P, F>(&mut self, roots: &[P], mut on_module: F) -> BTreeMap<String, Module>
    where
        P: AsRef<Path>,
        F: FnMut(&Module),
    {
        self.skipped.clear();
        self.errors.clear();
        let mut modules = BTreeMap::new();

        for root in roots {
            let root = root.as_ref();
            if !root.is_dir() {
                warn!("Addons path {} does not exist, skipping", root.display());
                self.errors.push((
                    root.to_path_buf(),
                    ModGraphError::InvalidPath { path: root.to_path_buf() },
                ));
                continue;
            }

            if is_module_dir(root) {
                self.load_module(root, &mut modules, &mut on_module);
                continue;
            }

            for child in self.subdirectories(root) {
                if is_module_dir(&child) {
                    self.load_module(&child, &mut modules, &mut on_module);
                } else {
                    // One extra level for repositories that group modules
                    for grandchild in self.subdirectories(&child) {
                        if is_module_dir(&grandchild) {
                            self.load_module(&grandchild, &mut modules, &mut on_module);
                        }
                    }
                }
            }
        }

        info!(
            "Scanned {} root(s): {} module(s), {} skipped",
            roots.len(),
            modules.len(),
            self.skipped.len()
        );
        modules
    }

    /// Parse the manifest of `dir` and record the module under its directory name
    fn load_module<F>(&mut self, dir: &Path, modules: &mut BTreeMap<String, Module>, on_module: &mut F)
    where
        F: FnMut(&Module),
    {
        let Some(name) = dir.file_name().map(|name| name.to_string_lossy().into_owned()) else {
            return;
        };
        let Some(manifest) = find_manifest(dir) else {
            return;
        };

        match self.parser.parse_file(&manifest) {
            Some(data) => {
                let module = data.into_module(&name, dir);
                debug!("Found module {} at {}", name, dir.display());
                on_module(&module);
                if let Some(previous) = modules.insert(name, module) {
                    debug!(
                        "Module {} at {} replaced by a later path",
                        previous.name,
                        previous.path.display()
                    );
                }
            }
            None => self.skipped.push(dir.to_path_buf()),
        }
    }

    /// Visible, non-excluded subdirectories of `dir` in name order
    fn subdirectories(&mut self, dir: &Path) -> Vec<PathBuf> {
        let entries = match fs::read_dir(dir).with_file_context(dir) {
            Ok(entries) => entries,
            Err(err) => {
                warn!("Cannot read directory {}: {}", dir.display(), err);
                self.errors.push((dir.to_path_buf(), err));
                return Vec::new();
            }
        };

        let mut dirs: Vec<PathBuf> = entries
            .filter_map(|entry| match entry {
                Ok(entry) => Some(entry.path()),
                Err(err) => {
                    warn!("Cannot read an entry of {}: {}", dir.display(), err);
                    None
                }
            })
            .filter(|path| path.is_dir())
            .filter(|path| !is_hidden(path))
            .filter(|path| !self.is_excluded(path))
            .collect();
        dirs.sort();
        dirs
    }

    /// Check if a directory matches any exclude pattern, by name or by full path
    pub fn is_excluded(&self, path: &Path) -> bool {
        let name = path
            .file_name()
            .map(|name| name.to_string_lossy())
            .unwrap_or_default();
        let full = path.to_string_lossy();
        self.exclude_patterns
            .iter()
            .any(|pattern| pattern.matches(&name) || pattern.matches(&full))
    }
}

fn is_hidden(path: &Path) -> bool {
    path.file_name()
        .map(|name| name.to_string_lossy().starts_with('.'))
        .unwrap_or(false)
}
