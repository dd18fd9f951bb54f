//! Model extraction across modules

use crate::models::analysis::ModelReport;
use crate::models::entity::{Model, ModelStatistics, Relationship};
use crate::models::module::Module;
use crate::parsers::manifest::{INIT_FILE, LEGACY_MANIFEST_FILE, MANIFEST_FILE};
use crate::parsers::source::parse_models;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;
use walkdir::WalkDir;

const MODELS_DIR: &str = "models";

/// Collects model definitions from module sources
///
/// Definitions are keyed by model name. When two files define the same
/// key, the one parsed last wins.
#[derive(Debug, Default)]
pub struct ModelAnalyzer {
    models: BTreeMap<String, Model>,
}

impl ModelAnalyzer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse the model sources of one module and merge them into the collection
    ///
    /// Returns the definitions found in this module only.
    pub fn analyze_module(&mut self, path: &Path, module_name: &str) -> BTreeMap<String, Model> {
        let mut found = BTreeMap::new();

        for file in source_files(path) {
            let source = match fs::read_to_string(&file) {
                Ok(source) => source,
                Err(err) => {
                    debug!("Skipping unreadable source {}: {}", file.display(), err);
                    continue;
                }
            };
            match parse_models(&source, module_name, &file) {
                Ok(definitions) => {
                    for definition in definitions {
                        let key = definition.key().to_string();
                        found.insert(key, definition.model);
                    }
                }
                Err(err) => debug!("Skipping unparsable source {}: {}", file.display(), err),
            }
        }

        for (key, model) in &found {
            self.models.insert(key.clone(), model.clone());
        }
        found
    }

    /// Analyze every module, replacing any previously collected models
    pub fn analyze_modules(&mut self, modules: &BTreeMap<String, Module>) -> &BTreeMap<String, Model> {
        self.models.clear();
        for module in modules.values() {
            let found = self.analyze_module(&module.path, &module.name);
            debug!("Module {}: {} model(s)", module.name, found.len());
        }
        &self.models
    }

    pub fn models(&self) -> &BTreeMap<String, Model> {
        &self.models
    }

    /// Links from each model to other models, for models that have any
    pub fn relationships(&self) -> BTreeMap<String, Vec<Relationship>> {
        self.models
            .iter()
            .filter_map(|(name, model)| {
                let links: Vec<Relationship> = model
                    .fields
                    .values()
                    .filter_map(|field| {
                        field.comodel_name.as_ref().map(|target| Relationship {
                            field: field.name.clone(),
                            field_type: field.field_type,
                            target: target.clone(),
                        })
                    })
                    .collect();
                (!links.is_empty()).then(|| (name.clone(), links))
            })
            .collect()
    }

    pub fn statistics(&self) -> ModelStatistics {
        if self.models.is_empty() {
            return ModelStatistics::default();
        }

        let fields = self.models.values().flat_map(|model| model.fields.values());
        let mut stats = ModelStatistics {
            total_models: self.models.len(),
            ..Default::default()
        };
        for field in fields {
            stats.total_fields += 1;
            if field.field_type.is_relational() {
                stats.relation_fields += 1;
            }
            if field.compute.is_some() {
                stats.computed_fields += 1;
            }
        }
        let average = stats.total_fields as f64 / stats.total_models as f64;
        stats.avg_fields_per_model = (average * 10.0).round() / 10.0;
        stats
    }

    /// Models, relationships and statistics in one serializable value
    pub fn report(&self) -> ModelReport {
        ModelReport {
            models: self.models.clone(),
            relationships: self.relationships(),
            statistics: self.statistics(),
        }
    }
}

/// Source files holding model definitions, in path order
///
/// Uses the `models/` package when present, otherwise the module's own
/// top-level files.
fn source_files(module_path: &Path) -> Vec<PathBuf> {
    let models_dir = module_path.join(MODELS_DIR);

    if models_dir.is_dir() {
        WalkDir::new(&models_dir)
            .sort_by_file_name()
            .into_iter()
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.file_type().is_file())
            .map(|entry| entry.into_path())
            .filter(|path| is_python(path) && file_name(path) != INIT_FILE)
            .collect()
    } else {
        let mut files: Vec<PathBuf> = match fs::read_dir(module_path) {
            Ok(entries) => entries
                .filter_map(|entry| entry.ok())
                .map(|entry| entry.path())
                .filter(|path| path.is_file() && is_python(path))
                .filter(|path| {
                    let name = file_name(path);
                    name != INIT_FILE && name != MANIFEST_FILE && name != LEGACY_MANIFEST_FILE
                })
                .collect(),
            Err(err) => {
                debug!("Cannot list {}: {}", module_path.display(), err);
                Vec::new()
            }
        };
        files.sort();
        files
    }
}

fn is_python(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext == "py")
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::entity::FieldType;
    use tempfile::TempDir;

    const PARTNER_MODELS: &str = r#"
from odoo import models, fields

class ResPartner(models.Model):
    _inherit = 'res.partner'

    loyalty_points = fields.Integer(string='Points')
    sponsor_id = fields.Many2one('res.partner')


class LoyaltyCard(models.Model):
    _name = 'loyalty.card'
    _description = 'Loyalty Card'

    partner_id = fields.Many2one(comodel_name='res.partner', required=True)
    total = fields.Float(compute='_compute_total')

    def _compute_total(self):
        pass
"#;

    fn module_with_sources(root: &Path, name: &str, files: &[(&str, &str)]) -> PathBuf {
        let dir = root.join(name);
        for (relative, content) in files {
            let path = dir.join(relative);
            fs::create_dir_all(path.parent().unwrap()).unwrap();
            fs::write(path, content).unwrap();
        }
        dir
    }

    #[test]
    fn test_models_directory() {
        let temp = TempDir::new().unwrap();
        let dir = module_with_sources(
            temp.path(),
            "loyalty",
            &[
                ("__init__.py", "from . import models\n"),
                ("models/__init__.py", "from . import partner\n"),
                ("models/partner.py", PARTNER_MODELS),
                ("wizard.py", "class Ignored(models.Model):\n    _name = 'ignored'\n"),
            ],
        );

        let mut analyzer = ModelAnalyzer::new();
        let found = analyzer.analyze_module(&dir, "loyalty");

        assert_eq!(found.keys().collect::<Vec<_>>(), vec!["loyalty.card", "res.partner"]);
        let card = &found["loyalty.card"];
        assert_eq!(card.module, "loyalty");
        assert_eq!(card.methods, vec!["_compute_total"]);
        assert!(card.fields["partner_id"].required);
    }

    #[test]
    fn test_top_level_sources_without_models_directory() {
        let temp = TempDir::new().unwrap();
        let dir = module_with_sources(
            temp.path(),
            "flat",
            &[
                ("__init__.py", ""),
                ("__manifest__.py", "{'name': 'Flat'}"),
                ("flat.py", "class Flat(models.Model):\n    _name = 'flat.record'\n"),
            ],
        );

        let mut analyzer = ModelAnalyzer::new();
        let found = analyzer.analyze_module(&dir, "flat");
        assert_eq!(found.keys().collect::<Vec<_>>(), vec!["flat.record"]);
    }

    #[test]
    fn test_unparsable_file_is_skipped() {
        let temp = TempDir::new().unwrap();
        let dir = module_with_sources(
            temp.path(),
            "mixed",
            &[
                ("models/broken.py", "class Broken(:\n    _name = 'x'\n    s = '''never closed\n"),
                ("models/good.py", "class Good(models.Model):\n    _name = 'good.model'\n"),
            ],
        );

        let mut analyzer = ModelAnalyzer::new();
        let found = analyzer.analyze_module(&dir, "mixed");
        assert_eq!(found.keys().collect::<Vec<_>>(), vec!["good.model"]);
    }

    #[test]
    fn test_last_definition_wins_across_modules() {
        let temp = TempDir::new().unwrap();
        let first = module_with_sources(
            temp.path(),
            "a_base",
            &[("models/m.py", "class M(models.Model):\n    _name = 'shared.model'\n    x = fields.Char()\n")],
        );
        let second = module_with_sources(
            temp.path(),
            "b_ext",
            &[("models/m.py", "class M(models.Model):\n    _inherit = 'shared.model'\n    y = fields.Char()\n")],
        );

        let mut modules = BTreeMap::new();
        modules.insert("a_base".to_string(), Module::new("a_base", first));
        modules.insert("b_ext".to_string(), Module::new("b_ext", second));

        let mut analyzer = ModelAnalyzer::new();
        let models = analyzer.analyze_modules(&modules);

        assert_eq!(models.len(), 1);
        let shared = &models["shared.model"];
        assert_eq!(shared.module, "b_ext");
        assert!(shared.fields.contains_key("y"));
        assert!(!shared.fields.contains_key("x"));
    }

    #[test]
    fn test_relationships_and_statistics() {
        let temp = TempDir::new().unwrap();
        let dir = module_with_sources(temp.path(), "loyalty", &[("models/partner.py", PARTNER_MODELS)]);

        let mut analyzer = ModelAnalyzer::new();
        analyzer.analyze_module(&dir, "loyalty");

        let relationships = analyzer.relationships();
        assert_eq!(relationships["loyalty.card"].len(), 1);
        let link = &relationships["res.partner"][0];
        assert_eq!(link.field, "sponsor_id");
        assert_eq!(link.field_type, FieldType::Many2one);
        assert_eq!(link.target, "res.partner");

        let stats = analyzer.statistics();
        assert_eq!(stats.total_models, 2);
        assert_eq!(stats.total_fields, 4);
        assert_eq!(stats.relation_fields, 2);
        assert_eq!(stats.computed_fields, 1);
        assert_eq!(stats.avg_fields_per_model, 2.0);
    }

    #[test]
    fn test_empty_statistics() {
        let analyzer = ModelAnalyzer::new();
        assert_eq!(analyzer.statistics(), ModelStatistics::default());
        assert!(analyzer.relationships().is_empty());
    }
}
