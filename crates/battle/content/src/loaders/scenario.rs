//! Scenario loader.
//!
//! A scenario places battlers on a map and carries their character sheets
//! plus an optional script of requests to queue at given frames.

use std::collections::BTreeSet;
use std::path::Path;

use anyhow::{Context, bail};
use battle_core::{
    BattleRequest, BattleState, Battler, BattlerId, BattlerKind, Direction, GridMap, GuardData,
    Position, SlotKey, Team,
};
use serde::Deserialize;

use crate::loaders::{LoadResult, read_file};
use crate::stats::{CharacterSheet, SkillEffect, TableStats};

/// One battler entry of a scenario.
#[derive(Clone, Debug, Deserialize)]
pub struct BattlerSpec {
    pub id: BattlerId,
    pub kind: BattlerKind,
    /// Defaults to the kind's team.
    #[serde(default)]
    pub team: Option<Team>,
    pub position: Position,
    #[serde(default)]
    pub facing: Option<Direction>,
    #[serde(default)]
    pub sight_range: Option<u32>,
    #[serde(default)]
    pub pursuit_range: Option<u32>,
    #[serde(default)]
    pub inanimate: bool,
    #[serde(default)]
    pub guard: Vec<(SlotKey, GuardData)>,
    #[serde(default)]
    pub sheet: CharacterSheet,
}

impl BattlerSpec {
    fn to_battler(&self) -> Battler {
        let mut battler = Battler::new(self.id, self.kind, self.position);
        if let Some(team) = self.team {
            battler = battler.with_team(team);
        }
        if let Some(facing) = self.facing {
            battler = battler.with_facing(facing);
        }
        let sight = self.sight_range.unwrap_or(Battler::DEFAULT_SIGHT_RANGE);
        let pursuit = self.pursuit_range.unwrap_or(Battler::DEFAULT_PURSUIT_RANGE);
        battler = battler.with_ranges(sight, pursuit);
        for (slot, data) in &self.guard {
            battler = battler.with_guard(*slot, data.clone());
        }
        if self.inanimate {
            battler = battler.inanimate();
        }
        battler
    }
}

/// A request the driver queues right before `frame` runs.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct ScriptedRequest {
    pub frame: u64,
    pub request: BattleRequest,
}

/// Scenario file structure.
#[derive(Clone, Debug, Deserialize)]
pub struct Scenario {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub seed: u64,
    /// Map rows; `#` marks a wall.
    pub map: Vec<String>,
    pub battlers: Vec<BattlerSpec>,
    #[serde(default)]
    pub script: Vec<ScriptedRequest>,
}

impl Scenario {
    /// Fresh battle state with every battler registered.
    ///
    /// Party members other than the leader follow it.
    pub fn build_state(&self) -> BattleState {
        let mut state = BattleState::new(self.seed);
        let leader = self
            .battlers
            .iter()
            .find(|spec| spec.kind == BattlerKind::Player)
            .map(|spec| spec.id);
        for spec in &self.battlers {
            let battler = spec.to_battler();
            let battler = match (spec.kind, leader) {
                (BattlerKind::Ally, Some(leader)) => battler.with_leader(leader),
                _ => battler,
            };
            state.add_battler(battler);
        }
        state
    }

    pub fn build_map(&self) -> GridMap {
        GridMap::from_rows(&self.map)
    }

    /// Reference provider holding every battler's sheet.
    pub fn build_stats(&self, effects: impl IntoIterator<Item = SkillEffect>) -> TableStats {
        let mut stats = TableStats::new(effects);
        for spec in &self.battlers {
            stats.insert(spec.id, spec.sheet.clone());
        }
        stats
    }

    /// Requests scheduled for `frame`, in file order.
    pub fn requests_at(&self, frame: u64) -> impl Iterator<Item = &BattleRequest> {
        self.script
            .iter()
            .filter(move |entry| entry.frame == frame)
            .map(|entry| &entry.request)
    }

    fn validate(&self) -> LoadResult<()> {
        let map = self.build_map();
        let mut ids = BTreeSet::new();
        for spec in &self.battlers {
            if !ids.insert(spec.id) {
                bail!("battler {} is placed twice", spec.id);
            }
            if map.is_blocked(spec.position) {
                bail!("battler {} stands on a blocked tile {}", spec.id, spec.position);
            }
        }
        if !self.battlers.iter().any(|spec| spec.kind == BattlerKind::Player) {
            bail!("scenario has no player battler");
        }
        Ok(())
    }
}

/// Loader for scenarios from RON files.
pub struct ScenarioLoader;

impl ScenarioLoader {
    pub fn load(path: &Path) -> LoadResult<Scenario> {
        let content = read_file(path)?;
        Self::parse(&content).with_context(|| format!("Invalid scenario {}", path.display()))
    }

    pub fn parse(content: &str) -> LoadResult<Scenario> {
        let scenario: Scenario = ron::from_str(content).context("Failed to parse scenario RON")?;
        scenario.validate()?;
        tracing::debug!(
            name = %scenario.name,
            battlers = scenario.battlers.len(),
            "scenario loaded"
        );
        Ok(scenario)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use battle_core::{SkillId, StatsOracle};

    const SAMPLE: &str = r##"
        #![enable(implicit_some)]
        #![enable(unwrap_newtypes)]
        (
            name: "corridor",
            seed: 3,
            map: [
                ".....",
                ".....",
                "..#..",
            ],
            battlers: [
                (
                    id: 0,
                    kind: Player,
                    position: (x: 1, y: 1),
                    sheet: (stats: (hp: 50, max_hp: 50), equipped: { Main: 1 }),
                ),
                (id: 1, kind: Ally, position: (x: 2, y: 1)),
                (
                    id: 9,
                    kind: Enemy,
                    position: (x: 3, y: 1),
                    facing: Left,
                    guard: [(Offhand, (guard_ids: [4], counter_guard_ids: [5]))],
                ),
            ],
            script: [(frame: 2, request: UseSlot(caster: 0, slot: Main, target: None))],
        )
    "##;

    #[test]
    fn sample_scenario_builds_state_map_and_stats() {
        let scenario = ScenarioLoader::parse(SAMPLE).unwrap();

        let state = scenario.build_state();
        assert_eq!(state.leader(), Some(BattlerId(0)));
        assert_eq!(state.party(), &[BattlerId(0), BattlerId(1)]);
        assert_eq!(
            state.battler(BattlerId(1)).unwrap().leader(),
            Some(BattlerId(0))
        );
        let enemy = state.battler(BattlerId(9)).unwrap();
        assert_eq!(enemy.facing(), Direction::Left);
        assert_eq!(
            enemy.guard_data().counter_guard(SlotKey::Offhand),
            &[SkillId(5)]
        );

        assert!(scenario.build_map().is_blocked(Position::new(2, 2)));
        let stats = scenario.build_stats(Vec::new());
        assert_eq!(stats.stats(BattlerId(0)).unwrap().hp, 50);
        assert_eq!(stats.equipped_skill(BattlerId(0), SlotKey::Main), Some(SkillId(1)));

        assert_eq!(scenario.requests_at(2).count(), 1);
        assert_eq!(scenario.requests_at(1).count(), 0);
    }

    #[test]
    fn battlers_inside_walls_are_rejected() {
        let err = ScenarioLoader::parse(
            r##"#![enable(unwrap_newtypes)]
            (map: [".#"], battlers: [(id: 0, kind: Player, position: (x: 1, y: 0))])"##,
        )
        .unwrap_err();
        assert!(err.to_string().contains("blocked tile"));
    }

    #[test]
    fn scenarios_need_a_player() {
        let err = ScenarioLoader::parse(
            r##"#![enable(unwrap_newtypes)]
            (map: ["."], battlers: [(id: 3, kind: Enemy, position: (x: 0, y: 0))])"##,
        )
        .unwrap_err();
        assert!(err.to_string().contains("no player"));
    }
}
