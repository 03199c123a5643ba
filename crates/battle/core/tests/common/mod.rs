//! Shared fixtures for engine integration tests.
#![allow(dead_code)]

use std::collections::BTreeMap;

use battle_core::{
    BattleConfig, BattleEngine, BattleState, BattlerId, BattlerStats, Catalog, DropEntry,
    FrameReport, GridMap, ItemId, LogEntry, PopupDescriptor, RetaliationChance, RngOracle,
    SkillId, SkillResult, SlotKey, StateId, StatsOracle, World,
};

pub const PLAYER: BattlerId = BattlerId(0);
pub const ALLY: BattlerId = BattlerId(1);
pub const ENEMY: BattlerId = BattlerId(10);

/// Rolls the same value every time.
pub struct FixedRng(pub f64);

impl RngOracle for FixedRng {
    fn next_u32(&self, _seed: u64) -> u32 {
        (self.0 * f64::from(u32::MAX)) as u32
    }

    fn random_unit(&self, _seed: u64) -> f64 {
        self.0
    }
}

/// Stats provider with a flat damage rule and full bookkeeping.
#[derive(Default)]
pub struct FakeStats {
    pub stats: BTreeMap<BattlerId, BattlerStats>,
    pub equipped: BTreeMap<(BattlerId, SlotKey), SkillId>,
    /// HP damage dealt by every application, keyed by skill.
    pub damage: BTreeMap<SkillId, i32>,
    pub added_states: BTreeMap<SkillId, Vec<StateId>>,
    pub retaliations: BTreeMap<BattlerId, Vec<RetaliationChance>>,
    pub drops: BTreeMap<BattlerId, Vec<DropEntry>>,
    pub broke: Vec<BattlerId>,
    pub applied: Vec<(BattlerId, BattlerId, SkillId)>,
    pub paid: Vec<(BattlerId, SkillId)>,
    pub exp: BTreeMap<BattlerId, u32>,
    pub gold: Vec<u32>,
    pub items: Vec<ItemId>,
    pub removed_states: Vec<(BattlerId, StateId)>,
}

impl FakeStats {
    pub fn set(&mut self, id: BattlerId, stats: BattlerStats) {
        self.stats.insert(id, stats);
    }

    pub fn edit(&mut self, id: BattlerId, f: impl FnOnce(&mut BattlerStats)) {
        f(self.stats.entry(id).or_default());
    }

    pub fn equip(&mut self, id: BattlerId, slot: SlotKey, skill: SkillId) {
        self.equipped.insert((id, slot), skill);
    }

    pub fn hp(&self, id: BattlerId) -> i32 {
        self.stats.get(&id).map_or(0, |stats| stats.hp)
    }
}

impl StatsOracle for FakeStats {
    fn stats(&self, battler: BattlerId) -> Option<BattlerStats> {
        self.stats.get(&battler).copied()
    }

    fn equipped_skill(&self, battler: BattlerId, slot: SlotKey) -> Option<SkillId> {
        self.equipped.get(&(battler, slot)).copied()
    }

    fn can_use_skill(&self, battler: BattlerId, _skill: SkillId) -> bool {
        !self.broke.contains(&battler)
    }

    fn pay_skill_cost(&mut self, battler: BattlerId, skill: SkillId) {
        self.paid.push((battler, skill));
    }

    fn apply_skill(&mut self, caster: BattlerId, target: BattlerId, skill: SkillId) -> SkillResult {
        self.applied.push((caster, target, skill));
        let damage = self.damage.get(&skill).copied().unwrap_or(0);
        if let Some(stats) = self.stats.get_mut(&target) {
            stats.hp -= damage;
        }
        SkillResult {
            hp_damage: damage,
            added_states: self.added_states.get(&skill).cloned().unwrap_or_default(),
            ..SkillResult::default()
        }
    }

    fn remove_state(&mut self, battler: BattlerId, state: StateId) {
        self.removed_states.push((battler, state));
    }

    fn retaliation_skills(&self, battler: BattlerId) -> Vec<RetaliationChance> {
        self.retaliations.get(&battler).cloned().unwrap_or_default()
    }

    fn drop_table(&self, battler: BattlerId) -> Vec<DropEntry> {
        self.drops.get(&battler).cloned().unwrap_or_default()
    }

    fn gain_exp(&mut self, battler: BattlerId, exp: u32) -> bool {
        *self.exp.entry(battler).or_default() += exp;
        false
    }

    fn gain_gold(&mut self, gold: u32) {
        self.gold.push(gold);
    }

    fn gain_item(&mut self, item: ItemId) {
        self.items.push(item);
    }
}

/// Everything one engine run needs, owned in one place.
pub struct Harness {
    pub state: BattleState,
    pub config: BattleConfig,
    pub stats: FakeStats,
    pub catalog: Catalog,
    pub map: GridMap,
    pub rng: FixedRng,
    pub popups: Vec<PopupDescriptor>,
    pub log: Vec<LogEntry>,
}

impl Harness {
    pub fn new() -> Self {
        Self {
            state: BattleState::new(42),
            config: BattleConfig::default(),
            stats: FakeStats::default(),
            catalog: Catalog::new(),
            map: GridMap::open(20, 20),
            rng: FixedRng(0.4),
            popups: Vec::new(),
            log: Vec::new(),
        }
    }

    /// Runs `f` with an engine and a fully wired world.
    pub fn with_engine<R>(
        &mut self,
        f: impl FnOnce(&mut BattleEngine<'_>, &mut World<'_>) -> R,
    ) -> R {
        let mut world = World::new(&mut self.stats, &self.catalog, &self.map, &self.rng)
            .with_popups(&mut self.popups)
            .with_log(&mut self.log);
        let mut engine = BattleEngine::new(&mut self.state, &self.config);
        f(&mut engine, &mut world)
    }

    pub fn step(&mut self) -> FrameReport {
        self.with_engine(|engine, world| engine.update(world))
    }

    pub fn run(&mut self, frames: usize) -> Vec<FrameReport> {
        (0..frames).map(|_| self.step()).collect()
    }
}

/// Stats with plenty of HP and neutral rates.
pub fn sturdy(level: u32) -> BattlerStats {
    BattlerStats {
        hp: 100,
        max_hp: 100,
        level,
        hit: 0.2,
        ..BattlerStats::default()
    }
}
