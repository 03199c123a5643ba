//! Skill and state catalog loader.

use std::collections::BTreeSet;
use std::path::Path;

use anyhow::{Context, bail};
use battle_core::{Catalog, SkillDefinition, StateDefinition};
use serde::Deserialize;

use crate::loaders::{LoadResult, read_file};
use crate::stats::SkillEffect;

/// Catalog file structure for RON files.
#[derive(Debug, Deserialize)]
struct CatalogRon {
    #[serde(default)]
    skills: Vec<SkillDefinition>,
    #[serde(default)]
    states: Vec<StateDefinition>,
    /// Numbers the reference provider uses when a skill lands.
    #[serde(default)]
    effects: Vec<SkillEffect>,
}

/// Everything a catalog file provides.
#[derive(Clone, Debug, Default)]
pub struct LoadedCatalog {
    pub catalog: Catalog,
    pub effects: Vec<SkillEffect>,
}

/// Loader for skill/state catalogs from RON files.
pub struct CatalogLoader;

impl CatalogLoader {
    /// Load a catalog from a RON file.
    ///
    /// Duplicate ids and effects for undefined skills are rejected.
    pub fn load(path: &Path) -> LoadResult<LoadedCatalog> {
        let content = read_file(path)?;
        Self::parse(&content).with_context(|| format!("Invalid catalog {}", path.display()))
    }

    pub fn parse(content: &str) -> LoadResult<LoadedCatalog> {
        let data: CatalogRon = ron::from_str(content).context("Failed to parse catalog RON")?;

        let mut catalog = Catalog::new();
        for skill in data.skills {
            let id = skill.id;
            if catalog.insert_skill(skill).is_some() {
                bail!("skill {id} is defined twice");
            }
        }
        for state in data.states {
            let id = state.id;
            if catalog.insert_state(state).is_some() {
                bail!("state {} is defined twice", id.0);
            }
        }

        let mut seen = BTreeSet::new();
        for effect in &data.effects {
            if !seen.insert(effect.skill) {
                bail!("effect for skill {} is defined twice", effect.skill);
            }
            if !catalog.skills().any(|skill| skill.id == effect.skill) {
                bail!("effect refers to undefined skill {}", effect.skill);
            }
        }

        tracing::debug!(
            skills = catalog.skills().count(),
            states = catalog.states().count(),
            "catalog loaded"
        );
        Ok(LoadedCatalog {
            catalog,
            effects: data.effects,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use battle_core::{CatalogOracle, CollisionShape, SkillFlags, SkillId, StateId};

    const SAMPLE: &str = r#"
        #![enable(implicit_some)]
        #![enable(unwrap_newtypes)]
        (
            skills: [
                (id: 1, name: "Slash", shape: FrontSquare, range: 1.0, cooldown: 20),
                (
                    id: 2,
                    name: "Arrow",
                    shape: Line,
                    range: 6.0,
                    flags: "UNPARRYABLE | UNIQUE_COOLDOWN",
                    projectile: (frames_per_tile: 2),
                ),
            ],
            states: [(id: 3, name: "Taunt", duration: 120, aggro_out: 2.0)],
            effects: [(skill: 1, power: 12)],
        )
    "#;

    #[test]
    fn sample_catalog_parses_with_defaults() {
        let loaded = CatalogLoader::parse(SAMPLE).unwrap();
        let catalog = &loaded.catalog;

        let slash = catalog.skill(SkillId(1)).unwrap();
        assert_eq!(slash.shape, CollisionShape::FrontSquare);
        assert_eq!(slash.duration, 1);
        assert_eq!(slash.piercing.hits, 1);

        let arrow = catalog.skill(SkillId(2)).unwrap();
        assert!(arrow.flags.contains(SkillFlags::UNPARRYABLE | SkillFlags::UNIQUE_COOLDOWN));
        assert_eq!(arrow.projectile.map(|p| p.frames_per_tile), Some(2));

        let taunt = catalog.state(StateId(3)).unwrap();
        assert_eq!(taunt.aggro_out, 2.0);
        assert_eq!(taunt.aggro_in, 1.0);
        assert_eq!(loaded.effects.len(), 1);
    }

    #[test]
    fn duplicate_skill_ids_are_rejected() {
        let err = CatalogLoader::parse(
            r#"#![enable(unwrap_newtypes)]
            (skills: [(id: 1, name: "A"), (id: 1, name: "B")])"#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("defined twice"));
    }

    #[test]
    fn effects_need_a_skill() {
        let err = CatalogLoader::parse(
            r#"#![enable(unwrap_newtypes)]
            (effects: [(skill: 9, power: 1)])"#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("undefined skill"));
    }
}
