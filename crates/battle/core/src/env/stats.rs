//! Boundary to the RPG stat system.
//!
//! The engine never computes damage. It asks the [`StatsOracle`] for stats,
//! equipped skills and skill results, and reports rewards back to it.

use crate::state::{BattlerId, ItemId, SkillId, SlotKey, StateId};

/// Snapshot of the numbers the engine reads from a battler's character.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct BattlerStats {
    pub hp: i32,
    pub max_hp: i32,
    pub mp: i32,
    pub tp: i32,
    pub level: u32,
    /// Hit rate, feeds the attacker side of the parry roll.
    pub hit: f64,
    /// Guard rate, feeds the defender side of the parry roll.
    pub grd: f64,
    /// Counter rate, chance of an auto-counter.
    pub cnt: f64,
    /// Target rate, multiplies aggro this battler generates.
    pub tgr: f64,
    /// Experience rate, multiplies experience this battler receives.
    pub exr: f64,
    /// Experience awarded for defeating this battler.
    pub exp: u32,
    /// Gold awarded for defeating this battler.
    pub gold: u32,
    /// Percentage of knockback ignored, 0..=100.
    pub knockback_resist: u32,
}

impl Default for BattlerStats {
    fn default() -> Self {
        Self {
            hp: 1,
            max_hp: 1,
            mp: 0,
            tp: 0,
            level: 1,
            hit: 0.95,
            grd: 0.0,
            cnt: 0.0,
            tgr: 1.0,
            exr: 1.0,
            exp: 0,
            gold: 0,
            knockback_resist: 0,
        }
    }
}

impl BattlerStats {
    pub fn is_dead(&self) -> bool {
        self.hp <= 0
    }
}

/// Outcome of applying a skill to a target, as reported by the provider.
///
/// Deltas are positive for damage and negative for healing.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SkillResult {
    pub hp_damage: i32,
    pub mp_damage: i32,
    pub tp_damage: i32,
    pub critical: bool,
    pub missed: bool,
    pub evaded: bool,
    pub drained: bool,
    pub added_states: Vec<StateId>,
}

impl SkillResult {
    /// The skill connected (neither missed nor evaded).
    pub fn is_hit(&self) -> bool {
        !self.missed && !self.evaded
    }
}

/// A passive retaliation a battler may fire when struck.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RetaliationChance {
    pub skill: SkillId,
    /// Probability in `[0, 1]`.
    pub chance: f64,
}

/// One entry of a loot table.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DropEntry {
    pub item: ItemId,
    /// Probability in `[0, 1]`.
    pub chance: f64,
}

/// Stats and skill provider.
///
/// Methods taking `&mut self` mutate the underlying characters; the engine
/// calls them only from inside its own update.
pub trait StatsOracle {
    fn stats(&self, battler: BattlerId) -> Option<BattlerStats>;

    fn equipped_skill(&self, battler: BattlerId, slot: SlotKey) -> Option<SkillId>;

    /// Every equipped (slot, skill) pair, used to share cooldowns.
    fn equipped_skills(&self, battler: BattlerId) -> Vec<(SlotKey, SkillId)> {
        use strum::IntoEnumIterator;
        SlotKey::iter()
            .filter_map(|slot| self.equipped_skill(battler, slot).map(|skill| (slot, skill)))
            .collect()
    }

    fn can_use_skill(&self, battler: BattlerId, skill: SkillId) -> bool;

    fn pay_skill_cost(&mut self, battler: BattlerId, skill: SkillId);

    fn apply_skill(&mut self, caster: BattlerId, target: BattlerId, skill: SkillId)
    -> SkillResult;

    /// Lifts a state whose tracked timer ran out.
    fn remove_state(&mut self, battler: BattlerId, state: StateId);

    fn retaliation_skills(&self, _battler: BattlerId) -> Vec<RetaliationChance> {
        Vec::new()
    }

    fn drop_table(&self, _battler: BattlerId) -> Vec<DropEntry> {
        Vec::new()
    }

    /// Grants experience. Returns true when the battler leveled up.
    fn gain_exp(&mut self, battler: BattlerId, exp: u32) -> bool;

    fn gain_gold(&mut self, gold: u32);

    fn gain_item(&mut self, item: ItemId);
}
