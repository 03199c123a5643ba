//! Owns every engine input and steps the battle.

use std::fmt;

use battle_content::{LoadedCatalog, Scenario, TableStats};
use battle_core::{
    BattleConfig, BattleEngine, BattleState, BattlerKind, Catalog, FrameReport, GridMap,
    LevelBandScaling, LogEntry, PcgRng, PopupDescriptor, Team, World,
};
use tracing::{debug, info};

use crate::pilot;

/// How a run ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Outcome {
    Victory,
    Defeat,
    /// Frame budget ran out with both sides standing.
    Timeout,
}

/// Totals printed after a run.
#[derive(Clone, Debug)]
pub struct Summary {
    pub outcome: Outcome,
    pub frames: u64,
    pub hits: usize,
    pub defeats: usize,
    pub gold: u32,
    pub items: usize,
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:?} after {} frames: {} hits, {} defeats, {} gold, {} items",
            self.outcome, self.frames, self.hits, self.defeats, self.gold, self.items
        )
    }
}

pub struct Simulation {
    config: BattleConfig,
    rewards: Option<LevelBandScaling>,
    catalog: Catalog,
    scenario: Scenario,
    state: BattleState,
    stats: TableStats,
    map: GridMap,
    rng: PcgRng,
    autopilot: bool,
    log: Vec<LogEntry>,
    popups: Vec<PopupDescriptor>,
}

impl Simulation {
    pub fn new(
        config: BattleConfig,
        loaded: LoadedCatalog,
        scenario: Scenario,
        autopilot: bool,
    ) -> Self {
        let state = scenario.build_state();
        let stats = scenario.build_stats(loaded.effects);
        let map = scenario.build_map();
        Self {
            rewards: LevelBandScaling::from_config(&config.reward_scaling),
            config,
            catalog: loaded.catalog,
            scenario,
            state,
            stats,
            map,
            rng: PcgRng,
            autopilot,
            log: Vec::new(),
            popups: Vec::new(),
        }
    }

    pub fn state(&self) -> &BattleState {
        &self.state
    }

    /// Runs until one side is gone or `frames` frames have passed.
    pub fn run(&mut self, frames: u64) -> Summary {
        let mut hits = 0;
        let mut defeats = 0;
        let mut outcome = Outcome::Timeout;

        for _ in 0..frames {
            let report = self.step();
            hits += report.hits.len();
            defeats += report.defeats.len();

            if self.state.is_party_defeated() {
                outcome = Outcome::Defeat;
                break;
            }
            if !self.enemies_standing() {
                outcome = Outcome::Victory;
                break;
            }
        }

        info!(?outcome, frame = self.state.frame(), "simulation finished");
        Summary {
            outcome,
            frames: self.state.frame(),
            hits,
            defeats,
            gold: self.stats.gold(),
            items: self.stats.inventory().len(),
        }
    }

    /// Queues scripted and piloted requests, then advances one frame.
    pub fn step(&mut self) -> FrameReport {
        let next = self.state.frame() + 1;
        let scripted: Vec<_> = self.scenario.requests_at(next).cloned().collect();
        let piloted = pilot::plan(&self.state, &self.stats, &self.map, self.autopilot);

        let mut world = World::new(&mut self.stats, &self.catalog, &self.map, &self.rng)
            .with_popups(&mut self.popups)
            .with_log(&mut self.log);
        if let Some(curve) = &self.rewards {
            world = world.with_rewards(curve);
        }
        let mut engine = BattleEngine::new(&mut self.state, &self.config);

        for order in piloted {
            order.apply(&mut engine);
        }
        for request in scripted {
            debug!(frame = next, ?request, "scripted request");
            engine.request(request);
        }
        let report = engine.update(&mut world);

        for entry in self.log.drain(..) {
            println!("[{:>5}] {entry}", report.frame);
        }
        for popup in self.popups.drain(..) {
            debug!(battler = %popup.battler, kind = ?popup.kind, "popup");
        }
        report
    }

    fn enemies_standing(&self) -> bool {
        self.state.battlers().any(|battler| {
            battler.kind() == BattlerKind::Enemy
                && battler.team() == Team::Enemy
                && battler.is_capable()
        })
    }
}
