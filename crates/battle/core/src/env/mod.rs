//! Collaborators the engine talks to.
//!
//! Oracles expose the stat system, skill data, map geometry and randomness.
//! The [`World`] context bundles them together with the optional output
//! collaborators (popups, narration, reward curve) and is passed explicitly
//! into every engine call. Optional collaborators are resolved once when the
//! world is built; the engine only checks whether they are present.
mod catalog;
mod map;
mod rewards;
mod rng;
mod sinks;
mod stats;

pub use catalog::{
    Catalog, CatalogOracle, ComboSpec, PiercingSpec, ProjectileSpec, SkillDefinition, SkillFlags,
    SkillScope, StateDefinition,
};
pub use map::{GridMap, MapOracle};
pub use rewards::{FlatScaling, LevelBandScaling, RewardScaling};
pub use rng::{PcgRng, RngOracle, RollContext, compute_seed};
pub use sinks::{CombatLog, PopupSink};
pub use stats::{BattlerStats, DropEntry, RetaliationChance, SkillResult, StatsOracle};

use crate::combat::{LogEntry, PopupDescriptor};

/// Explicit context for one engine call.
pub struct World<'a> {
    /// Character stats, equipment and the skill-effect calculation.
    pub stats: &'a mut dyn StatsOracle,
    /// Skill and state definitions.
    pub catalog: &'a dyn CatalogOracle,
    /// Tile distances and passability.
    pub map: &'a dyn MapOracle,
    /// Seed-addressed randomness for parry, counter and drop rolls.
    pub rng: &'a dyn RngOracle,
    /// Reward curve; when absent the configured band table (or 1.0) applies.
    pub rewards: Option<&'a dyn RewardScaling>,
    /// Receives damage, parry and reward popups.
    pub popups: Option<&'a mut dyn PopupSink>,
    /// Receives narration entries.
    pub log: Option<&'a mut dyn CombatLog>,
}

impl<'a> World<'a> {
    /// World with the required oracles and no optional collaborators.
    pub fn new(
        stats: &'a mut dyn StatsOracle,
        catalog: &'a dyn CatalogOracle,
        map: &'a dyn MapOracle,
        rng: &'a dyn RngOracle,
    ) -> Self {
        Self {
            stats,
            catalog,
            map,
            rng,
            rewards: None,
            popups: None,
            log: None,
        }
    }

    pub fn with_rewards(mut self, rewards: &'a dyn RewardScaling) -> Self {
        self.rewards = Some(rewards);
        self
    }

    pub fn with_popups(mut self, popups: &'a mut dyn PopupSink) -> Self {
        self.popups = Some(popups);
        self
    }

    pub fn with_log(mut self, log: &'a mut dyn CombatLog) -> Self {
        self.log = Some(log);
        self
    }

    pub(crate) fn popup(&mut self, popup: PopupDescriptor) {
        if let Some(sink) = self.popups.as_deref_mut() {
            sink.popup(popup);
        }
    }

    pub(crate) fn narrate(&mut self, entry: LogEntry) {
        if let Some(log) = self.log.as_deref_mut() {
            log.record(entry);
        }
    }
}

impl std::fmt::Debug for World<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("World")
            .field("rewards", &self.rewards.is_some())
            .field("popups", &self.popups.is_some())
            .field("log", &self.log.is_some())
            .finish_non_exhaustive()
    }
}
