use std::fs;
use std::path::Path;

use battle_content::{ContentFactory, TableStats};
use battle_core::{BattlerId, CatalogOracle, SkillId, SlotKey, StatsOracle};

fn shipped() -> ContentFactory {
    ContentFactory::new(Path::new(env!("CARGO_MANIFEST_DIR")).join("data"))
}

#[test]
fn shipped_content_loads_and_cross_references() {
    let factory = shipped();
    let config = factory.load_config().expect("config.toml should load");
    assert!(config.reward_scaling.enabled);

    let loaded = factory.load_catalog().expect("catalog.ron should load");
    let scenario = factory.load_scenario("duel").expect("duel.ron should load");

    for spec in &scenario.battlers {
        for skill in spec.sheet.equipped.values() {
            assert!(
                loaded.catalog.skill(*skill).is_some(),
                "{} equips undefined {skill}",
                spec.id
            );
        }
    }
    for entry in &scenario.script {
        assert!(entry.frame > 0);
    }

    let stats: TableStats = scenario.build_stats(loaded.effects);
    assert_eq!(stats.equipped_skill(BattlerId(0), SlotKey::Tool), Some(SkillId(3)));
}

#[test]
fn missing_config_falls_back_to_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let factory = ContentFactory::new(dir.path());
    let config = factory.load_config().unwrap();
    assert_eq!(config, battle_core::BattleConfig::default());
}

#[test]
fn broken_files_report_their_path() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("config.toml"), "ai_update_radius = 0\n").unwrap();
    fs::write(dir.path().join("catalog.ron"), "(skills: [oops])").unwrap();

    let factory = ContentFactory::new(dir.path());
    let config_err = factory.load_config().unwrap_err();
    assert!(format!("{config_err:#}").contains("config.toml"));
    assert!(format!("{config_err:#}").contains("greater than zero"));

    let catalog_err = factory.load_catalog().unwrap_err();
    assert!(format!("{catalog_err:#}").contains("catalog.ron"));

    let scenario_err = factory.load_scenario("nowhere").unwrap_err();
    assert!(format!("{scenario_err:#}").contains("nowhere.ron"));
}
