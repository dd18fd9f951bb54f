use super::common::{analyzer_for, fixture_addons, write_manifest, write_module};
use modgraph::core::upgrade::{assess_impact, upgrade_order};
use modgraph::models::upgrade::ModuleChange;
use modgraph::{ModelAnalyzer, ModuleAnalyzer, RiskLevel, UpgradeAnalyzer};
use std::fs;
use tempfile::TempDir;

#[test]
fn test_compare_detects_new_dependency() {
    let temp = TempDir::new().unwrap();
    let source = temp.path().join("v1");
    let target = temp.path().join("v2");
    write_module(&source, "a", &[]);
    write_module(&target, "a", &["b"]);
    write_module(&target, "b", &[]);

    let mut upgrades = UpgradeAnalyzer::new();
    upgrades.load_source(&[&source]).unwrap();
    upgrades.load_target(&[&target]).unwrap();
    let diff = upgrades.compare_versions().unwrap();

    assert_eq!(diff.added_modules, vec!["b"]);
    assert!(diff.removed_modules.is_empty());
    assert_eq!(diff.modified_modules.len(), 1);
    assert_eq!(diff.modified_modules[0].name, "a");
    assert_eq!(diff.modified_modules[0].changes, vec![ModuleChange::Dependencies]);
    assert_eq!(diff.dependency_changes.len(), 1);
    assert_eq!(diff.dependency_changes[0].module, "a");
    assert_eq!(diff.dependency_changes[0].added_dependencies, vec!["b"]);
    assert!(diff.dependency_changes[0].removed_dependencies.is_empty());
    assert_eq!(diff.summary.added, 1);
    assert_eq!(diff.summary.modified, 1);
}

#[test]
fn test_compare_identical_trees() {
    let mut upgrades = UpgradeAnalyzer::new();
    upgrades.load_source(&[fixture_addons()]).unwrap();
    upgrades.load_target(&[fixture_addons()]).unwrap();

    assert!(upgrades.compare_versions().unwrap().is_empty());
}

#[test]
fn test_compare_version_bump() {
    let temp = TempDir::new().unwrap();
    let source = temp.path().join("v1");
    let target = temp.path().join("v2");
    write_manifest(&source, "sale_x", "{'name': 'X', 'version': '15.0.1.0.0', 'depends': ['sale']}");
    write_manifest(&target, "sale_x", "{'name': 'X', 'version': '16.0.1.0.0', 'depends': ['sale']}");
    write_module(&source, "dropped", &[]);

    let mut upgrades = UpgradeAnalyzer::new();
    upgrades.load_source(&[&source]).unwrap();
    upgrades.load_target(&[&target]).unwrap();
    let diff = upgrades.compare_versions().unwrap();

    assert_eq!(diff.removed_modules, vec!["dropped"]);
    assert_eq!(
        diff.modified_modules[0].changes,
        vec![ModuleChange::Version {
            from: "15.0.1.0.0".to_string(),
            to: "16.0.1.0.0".to_string(),
        }]
    );
    assert!(diff.dependency_changes.is_empty());
}

#[test]
fn test_widely_used_module_is_critical() {
    let temp = TempDir::new().unwrap();
    write_module(temp.path(), "hub", &[]);
    for i in 0..60 {
        write_module(temp.path(), &format!("leaf_{:02}", i), &["hub"]);
    }

    let analyzer = analyzer_for(&[temp.path()]);
    let impact = assess_impact("hub", &analyzer).unwrap();

    assert_eq!(impact.all_dependents.len(), 60);
    assert_eq!(impact.risk_level, RiskLevel::Critical);
    assert!(!impact.recommendations.is_empty());
}

#[test]
fn test_core_module_is_critical() {
    let temp = TempDir::new().unwrap();
    write_module(temp.path(), "base", &[]);
    write_module(temp.path(), "custom", &["base"]);

    let analyzer = analyzer_for(&[temp.path()]);
    let impact = assess_impact("base", &analyzer).unwrap();

    assert_eq!(impact.risk_level, RiskLevel::Critical);
    assert_eq!(impact.direct_dependents, vec!["custom"]);
}

#[test]
fn test_small_module_with_models_is_low_risk() {
    let temp = TempDir::new().unwrap();
    let dir = write_module(temp.path(), "shop_extra", &[]);
    for name in ["one", "two", "three"] {
        write_module(temp.path(), &format!("uses_{}", name), &["shop_extra"]);
    }
    fs::write(
        dir.join("shop.py"),
        "class A(models.Model):\n    _name = 'shop.a'\n\n\nclass B(models.Model):\n    _name = 'shop.b'\n",
    )
    .unwrap();

    let analyzer = analyzer_for(&[temp.path()]);
    let impact = assess_impact("shop_extra", &analyzer).unwrap();

    assert_eq!(impact.all_dependents.len(), 3);
    assert_eq!(impact.affected_models, vec!["shop.a", "shop.b"]);
    assert_eq!(impact.impact_score, 7);
    assert_eq!(impact.risk_level, RiskLevel::Low);
}

#[test]
fn test_unknown_module_impact() {
    let analyzer = analyzer_for(&[fixture_addons()]);
    let impact = assess_impact("not_scanned", &analyzer).unwrap();

    assert_eq!(impact.risk_level, RiskLevel::Critical);
    assert!(impact.all_dependents.is_empty());
}

#[test]
fn test_fixture_impact() {
    let analyzer = analyzer_for(&[fixture_addons()]);
    let impact = assess_impact("loyalty_base", &analyzer).unwrap();

    assert_eq!(impact.all_dependents, vec!["loyalty_portal", "report_helper"]);
    assert_eq!(impact.affected_models.len(), 3);
    assert_eq!(impact.impact_score, 8);
    assert_eq!(impact.risk_level, RiskLevel::Low);
}

#[test]
fn test_fixture_models() {
    let analyzer = analyzer_for(&[fixture_addons()]);
    let mut models = ModelAnalyzer::new();
    models.analyze_modules(analyzer.modules().unwrap());

    let card = &models.models()["loyalty.card"];
    assert_eq!(card.module, "loyalty_base");
    assert_eq!(card.fields.len(), 4);
    assert_eq!(card.fields["points"].compute.as_deref(), Some("_compute_points"));
    assert_eq!(card.fields["partner_id"].comodel_name.as_deref(), Some("res.partner"));
    assert!(card.methods.contains(&"_compute_points".to_string()));

    let stats = models.statistics();
    assert_eq!(stats.total_models, 3);
    assert_eq!(stats.total_fields, 7);
    assert_eq!(stats.relation_fields, 4);
    assert_eq!(stats.computed_fields, 1);
    assert_eq!(stats.avg_fields_per_model, 2.3);

    let relationships = models.relationships();
    assert!(relationships["loyalty.card"]
        .iter()
        .any(|link| link.target == "loyalty.card.line"));
}

#[test]
fn test_fixture_upgrade_order() {
    let analyzer = analyzer_for(&[fixture_addons()]);
    let steps = upgrade_order(Some(&["report_helper".to_string()]), &analyzer).unwrap();

    let names: Vec<&str> = steps.iter().map(|step| step.module.as_str()).collect();
    assert_eq!(names.last(), Some(&"report_helper"));
    assert!(names.contains(&"loyalty_base"));
    for (i, step) in steps.iter().enumerate() {
        assert_eq!(step.order, i + 1);
    }

    let base = steps.iter().find(|step| step.module == "base").unwrap();
    assert_eq!(base.risk_level, RiskLevel::Critical);
}

#[test]
fn test_analyze_models_keeps_last_definition() {
    let temp = TempDir::new().unwrap();
    let core = write_module(temp.path(), "crm_core", &[]);
    let extra = write_module(temp.path(), "crm_extra", &["crm_core"]);
    fs::write(
        core.join("lead.py"),
        "class Lead(models.Model):\n    _name = 'crm.lead'\n    title = fields.Char()\n",
    )
    .unwrap();
    fs::write(
        extra.join("lead.py"),
        "class Lead(models.Model):\n    _name = 'crm.lead'\n    stage_id = fields.Many2one('crm.stage')\n",
    )
    .unwrap();

    let analyzer = analyzer_for(&[temp.path()]);
    let mut upgrades = UpgradeAnalyzer::new();
    let models = upgrades.analyze_models(&analyzer).unwrap();

    let lead = &models.models()["crm.lead"];
    assert_eq!(lead.module, "crm_extra");
    assert!(lead.fields.contains_key("stage_id"));
    assert!(!lead.fields.contains_key("title"));
    assert_eq!(models.report().statistics.total_models, 1);

    let empty = ModuleAnalyzer::new();
    assert!(upgrades.analyze_models(&empty).is_err());
}

#[test]
fn test_impact_counts_every_indirect_dependent() {
    let temp = TempDir::new().unwrap();
    write_module(temp.path(), "stock_core", &[]);
    write_module(temp.path(), "stock_batch", &["stock_core"]);
    write_module(temp.path(), "stock_batch_ui", &["stock_batch"]);
    write_module(temp.path(), "stock_batch_report", &["stock_batch_ui"]);

    let analyzer = analyzer_for(&[temp.path()]);
    let impact = assess_impact("stock_core", &analyzer).unwrap();

    assert_eq!(impact.direct_dependents, vec!["stock_batch"]);
    assert_eq!(
        impact.all_dependents,
        vec!["stock_batch", "stock_batch_report", "stock_batch_ui"]
    );
}
