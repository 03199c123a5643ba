//! Frame-stepped battle orchestrator.
//!
//! [`BattleEngine`] borrows the [`BattleState`] and configuration and runs
//! the fixed per-frame order:
//!
//! 1. the player-controlled leader
//! 2. AI battlers within `ai_update_radius` of the leader (recomputed every frame)
//! 3. live actions: countdowns, collision, resolution, cleanup
//! 4. tracked-state expiry
//! 5. queued requests
//!
//! External layers never touch the action list directly. They queue
//! [`BattleRequest`]s, which are consumed at step 5.
mod frame;
mod party;
mod requests;
mod spawn;

pub use requests::BattleRequest;

pub(crate) use party::promote_next_leader;
pub(crate) use spawn::{CastOrigin, build_action};

use crate::config::BattleConfig;
use crate::env::{SkillResult, World};
use crate::state::{ActionId, BattleState, BattlerId, Direction, Position, SkillId};

/// One resolved collision.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct HitRecord {
    pub action: ActionId,
    pub caster: BattlerId,
    pub target: BattlerId,
    pub skill: SkillId,
    /// The target parried; `result` is then empty.
    pub parried: bool,
    /// What the stats provider reported for the application.
    pub result: SkillResult,
}

/// What happened during one call to [`BattleEngine::update`].
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FrameReport {
    /// Frame counter value this report was produced for.
    pub frame: u64,
    /// Resolutions in the order they ran, retaliations included.
    pub hits: Vec<HitRecord>,
    /// Battlers that started dying this frame.
    pub defeats: Vec<BattlerId>,
    /// Actions that joined the live list this frame.
    pub spawned: Vec<ActionId>,
    /// Actions removed by cleanup; the visual layer should despawn them.
    pub despawned: Vec<ActionId>,
}

impl FrameReport {
    pub fn new(frame: u64) -> Self {
        Self {
            frame,
            ..Self::default()
        }
    }

    /// True when nothing observable happened.
    pub fn is_quiet(&self) -> bool {
        self.hits.is_empty()
            && self.defeats.is_empty()
            && self.spawned.is_empty()
            && self.despawned.is_empty()
    }
}

/// Battle engine operating on a mutable [`BattleState`].
///
/// Cheap to build: hosts create one per frame around the state they own and
/// drop it once [`update`](Self::update) returns.
pub struct BattleEngine<'a> {
    state: &'a mut BattleState,
    config: &'a BattleConfig,
}

impl<'a> BattleEngine<'a> {
    pub fn new(state: &'a mut BattleState, config: &'a BattleConfig) -> Self {
        Self { state, config }
    }

    pub fn state(&self) -> &BattleState {
        self.state
    }

    pub fn config(&self) -> &BattleConfig {
        self.config
    }

    /// Queues a request for step 5 of the next frame.
    pub fn request(&mut self, request: BattleRequest) {
        self.state.requests.push_back(request);
    }

    /// Promotes the next living party member to leader.
    ///
    /// Returns the new leader, or `None` when nobody else can lead.
    pub fn cycle_party(&mut self) -> Option<BattlerId> {
        let promoted = promote_next_leader(self.state);
        match promoted {
            Some(leader) => tracing::debug!(%leader, "party leader cycled"),
            None => tracing::debug!("no party member available to lead"),
        }
        promoted
    }

    /// Flags every live action for removal (map clear).
    ///
    /// The actions stay in the list until the cleanup of the next action pass.
    pub fn clear_actions(&mut self) {
        let frame = self.state.frame;
        for action in &mut self.state.actions {
            action.flag_removal(frame);
        }
        for action in &mut self.state.pending {
            action.flag_removal(frame);
        }
    }

    /// Moves a battler, e.g. when the movement layer reports a step.
    pub fn place_battler(&mut self, id: BattlerId, position: Position) -> bool {
        match self.state.battlers.get_mut(&id) {
            Some(battler) => {
                battler.position = position;
                true
            }
            None => false,
        }
    }

    /// Turns a battler; later casts capture the new facing.
    pub fn turn_battler(&mut self, id: BattlerId, facing: Direction) -> bool {
        match self.state.battlers.get_mut(&id) {
            Some(battler) => {
                battler.facing = facing;
                true
            }
            None => false,
        }
    }

    /// Runs defeat handling for `defeated` outside the resolution pipeline
    /// (scripted kills, damage over time).
    ///
    /// Returns false when the battler is unknown or already dying.
    pub fn handle_defeat(
        &mut self,
        world: &mut World<'_>,
        defeated: BattlerId,
        killer: Option<BattlerId>,
    ) -> bool {
        let mut report = FrameReport::new(self.state.frame);
        crate::combat::handle_defeat(self.state, world, self.config, defeated, killer, &mut report);
        !report.defeats.is_empty()
    }
}
