//! Data-driven battle content and loaders.
//!
//! This crate reads everything a battle needs from RON/TOML data files:
//! - Battle configuration (TOML)
//! - Skill and state catalogs, with the effect table of the reference provider (RON)
//! - Scenarios: map rows, battlers, character sheets and scripted requests (RON)
//!
//! [`TableStats`] is the reference stats provider the simulator and tests
//! plug into the engine. Its damage rule is intentionally flat.

pub mod loaders;
pub mod stats;

pub use loaders::{
    BattlerSpec, CatalogLoader, ConfigLoader, ContentFactory, LoadResult, LoadedCatalog, Scenario,
    ScenarioLoader, ScriptedRequest,
};
pub use stats::{CharacterSheet, SkillEffect, TableStats};
