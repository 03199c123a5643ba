//! Reference stats provider backed by plain tables.
//!
//! [`TableStats`] keeps one [`CharacterSheet`] per battler and one
//! [`SkillEffect`] per skill. A landed skill deals its flat `power` (negative
//! power heals), optionally drains, and adds its listed states. There is no
//! hit/evasion roll: every application connects.

use std::collections::{BTreeMap, BTreeSet};

use battle_core::{
    BattlerId, BattlerStats, DropEntry, ItemId, RetaliationChance, SkillId, SkillResult, SlotKey,
    StateId, StatsOracle,
};
use serde::{Deserialize, Serialize};

/// What a skill does to its target under the reference rule.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SkillEffect {
    pub skill: SkillId,
    /// HP removed from the target; negative values heal.
    pub power: i32,
    pub mp_damage: i32,
    pub mp_cost: i32,
    pub tp_cost: i32,
    /// Heals the caster by the damage dealt.
    pub drain: bool,
    pub states: Vec<StateId>,
}

/// Character-side record of one battler.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CharacterSheet {
    pub stats: BattlerStats,
    pub equipped: BTreeMap<SlotKey, SkillId>,
    pub retaliations: Vec<RetaliationChance>,
    pub drops: Vec<DropEntry>,
    /// Experience collected so far.
    pub experience: u32,
    pub states: BTreeSet<StateId>,
}

impl CharacterSheet {
    pub fn new(stats: BattlerStats) -> Self {
        Self {
            stats,
            ..Self::default()
        }
    }

    pub fn equip(mut self, slot: SlotKey, skill: SkillId) -> Self {
        self.equipped.insert(slot, skill);
        self
    }
}

/// Table-driven [`StatsOracle`].
#[derive(Clone, Debug, Default)]
pub struct TableStats {
    sheets: BTreeMap<BattlerId, CharacterSheet>,
    effects: BTreeMap<SkillId, SkillEffect>,
    gold: u32,
    inventory: Vec<ItemId>,
}

impl TableStats {
    /// Experience needed to leave `level`.
    pub const EXP_PER_LEVEL: u32 = 100;

    pub fn new(effects: impl IntoIterator<Item = SkillEffect>) -> Self {
        Self {
            effects: effects
                .into_iter()
                .map(|effect| (effect.skill, effect))
                .collect(),
            ..Self::default()
        }
    }

    pub fn insert(&mut self, battler: BattlerId, sheet: CharacterSheet) {
        self.sheets.insert(battler, sheet);
    }

    pub fn sheet(&self, battler: BattlerId) -> Option<&CharacterSheet> {
        self.sheets.get(&battler)
    }

    pub fn gold(&self) -> u32 {
        self.gold
    }

    pub fn inventory(&self) -> &[ItemId] {
        &self.inventory
    }

    fn effect(&self, skill: SkillId) -> Option<&SkillEffect> {
        self.effects.get(&skill)
    }
}

impl StatsOracle for TableStats {
    fn stats(&self, battler: BattlerId) -> Option<BattlerStats> {
        self.sheets.get(&battler).map(|sheet| sheet.stats)
    }

    fn equipped_skill(&self, battler: BattlerId, slot: SlotKey) -> Option<SkillId> {
        self.sheets.get(&battler)?.equipped.get(&slot).copied()
    }

    fn equipped_skills(&self, battler: BattlerId) -> Vec<(SlotKey, SkillId)> {
        self.sheets.get(&battler).map_or_else(Vec::new, |sheet| {
            sheet.equipped.iter().map(|(&slot, &skill)| (slot, skill)).collect()
        })
    }

    fn can_use_skill(&self, battler: BattlerId, skill: SkillId) -> bool {
        let Some(sheet) = self.sheets.get(&battler) else {
            return false;
        };
        self.effect(skill).is_none_or(|effect| {
            sheet.stats.mp >= effect.mp_cost && sheet.stats.tp >= effect.tp_cost
        })
    }

    fn pay_skill_cost(&mut self, battler: BattlerId, skill: SkillId) {
        let Some((mp, tp)) = self.effect(skill).map(|e| (e.mp_cost, e.tp_cost)) else {
            return;
        };
        if let Some(sheet) = self.sheets.get_mut(&battler) {
            sheet.stats.mp -= mp;
            sheet.stats.tp -= tp;
        }
    }

    fn apply_skill(&mut self, caster: BattlerId, target: BattlerId, skill: SkillId) -> SkillResult {
        let Some(effect) = self.effects.get(&skill).cloned() else {
            return SkillResult {
                missed: true,
                ..SkillResult::default()
            };
        };
        let Some(sheet) = self.sheets.get_mut(&target) else {
            return SkillResult {
                missed: true,
                ..SkillResult::default()
            };
        };

        let stats = &mut sheet.stats;
        let hp_damage = if effect.power >= 0 {
            effect.power.min(stats.hp.max(0))
        } else {
            -(-effect.power).min((stats.max_hp - stats.hp).max(0))
        };
        stats.hp -= hp_damage;
        let mp_damage = effect.mp_damage.min(stats.mp.max(0));
        stats.mp -= mp_damage;

        // Reapplied states are reported as well.
        sheet.states.extend(effect.states.iter().copied());
        let added_states = effect.states.clone();

        if effect.drain && hp_damage > 0 {
            if let Some(drainer) = self.sheets.get_mut(&caster) {
                let stats = &mut drainer.stats;
                stats.hp = (stats.hp + hp_damage).min(stats.max_hp);
            }
        }

        SkillResult {
            hp_damage,
            mp_damage,
            drained: effect.drain,
            added_states,
            ..SkillResult::default()
        }
    }

    fn remove_state(&mut self, battler: BattlerId, state: StateId) {
        if let Some(sheet) = self.sheets.get_mut(&battler) {
            sheet.states.remove(&state);
        }
    }

    fn retaliation_skills(&self, battler: BattlerId) -> Vec<RetaliationChance> {
        self.sheets
            .get(&battler)
            .map_or_else(Vec::new, |sheet| sheet.retaliations.clone())
    }

    fn drop_table(&self, battler: BattlerId) -> Vec<DropEntry> {
        self.sheets
            .get(&battler)
            .map_or_else(Vec::new, |sheet| sheet.drops.clone())
    }

    fn gain_exp(&mut self, battler: BattlerId, exp: u32) -> bool {
        let Some(sheet) = self.sheets.get_mut(&battler) else {
            return false;
        };
        sheet.experience = sheet.experience.saturating_add(exp);
        let mut leveled = false;
        while sheet.experience >= sheet.stats.level.max(1) * Self::EXP_PER_LEVEL {
            sheet.experience -= sheet.stats.level.max(1) * Self::EXP_PER_LEVEL;
            sheet.stats.level += 1;
            leveled = true;
        }
        leveled
    }

    fn gain_gold(&mut self, gold: u32) {
        self.gold = self.gold.saturating_add(gold);
    }

    fn gain_item(&mut self, item: ItemId) {
        self.inventory.push(item);
    }
}
