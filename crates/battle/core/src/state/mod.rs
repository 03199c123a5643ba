//! Canonical battle state owned by the simulation loop.
//!
//! [`BattleState`] is everything the engine mutates between frames. It is
//! also the opaque snapshot handed to save systems: with the `serde` feature
//! it round-trips through [`BattleState::to_bytes`] and
//! [`BattleState::from_bytes`].
mod action;
mod aggro;
mod battler;
mod common;
mod cooldown;
mod pickup;
mod tracked;

use std::collections::{BTreeMap, VecDeque};

pub use action::{Action, ActivePhase, ProjectileMotion};
pub use aggro::AggroTable;
pub use battler::{AlertState, Battler, BattlerKind, EngagementState, Stance};
pub use common::{
    ActionId, BattlerId, Direction, ItemId, PickupId, Position, SkillId, SlotKey, StateId, Team,
};
pub use cooldown::{ComboLink, CooldownBook, GuardBook, GuardData, SlotCast, SlotTimers};
pub use pickup::Pickup;
pub use tracked::{TrackedState, TrackedStates};

use crate::engine::BattleRequest;
use crate::env::{RngOracle, RollContext, compute_seed};

/// Everything the engine tracks between frames.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BattleState {
    /// Frames simulated so far.
    pub(crate) frame: u64,
    /// Base seed for deterministic rolls.
    pub(crate) seed: u64,
    /// Rolls consumed so far; mixed into every roll seed.
    pub(crate) nonce: u64,
    pub(crate) leader: Option<BattlerId>,
    /// Party order used by party cycling.
    pub(crate) party: Vec<BattlerId>,
    pub(crate) battlers: BTreeMap<BattlerId, Battler>,
    pub(crate) actions: Vec<Action>,
    /// Actions spawned during resolution, drained after the action pass.
    pub(crate) pending: Vec<Action>,
    pub(crate) requests: VecDeque<BattleRequest>,
    pub(crate) tracked: TrackedStates,
    pub(crate) pickups: Vec<Pickup>,
    pub(crate) next_action_id: u64,
    pub(crate) next_pickup_id: u64,
    pub(crate) party_defeated: bool,
}

impl BattleState {
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            ..Self::default()
        }
    }

    /// Registers a battler. Player and ally battlers join the party; the
    /// first player battler becomes the leader.
    ///
    /// Returns the battler previously registered under the same id.
    pub fn add_battler(&mut self, battler: Battler) -> Option<Battler> {
        let id = battler.id;
        match battler.kind {
            BattlerKind::Player => {
                if self.leader.is_none() {
                    self.leader = Some(id);
                }
                self.join_party(id);
            }
            BattlerKind::Ally => self.join_party(id),
            BattlerKind::Enemy => {}
        }
        self.battlers.insert(id, battler)
    }

    fn join_party(&mut self, id: BattlerId) {
        if !self.party.contains(&id) {
            self.party.push(id);
        }
    }

    /// Removes a battler whose character left the map.
    ///
    /// Aggro held against it, its tracked states and its leader links go with it.
    pub fn remove_battler(&mut self, id: BattlerId) -> Option<Battler> {
        let removed = self.battlers.remove(&id)?;
        self.forget_battler(id);
        self.party.retain(|&member| member != id);
        if self.leader == Some(id) {
            self.leader = None;
        }
        Some(removed)
    }

    /// Drops references other records hold to `id`.
    pub(crate) fn forget_battler(&mut self, id: BattlerId) {
        for other in self.battlers.values_mut() {
            other.aggro.remove(id);
            if other.leader == Some(id) {
                other.leader = None;
            }
            if other.target == Some(id) {
                other.disengage();
            }
        }
        self.tracked.forget(id);
    }

    pub fn frame(&self) -> u64 {
        self.frame
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn leader(&self) -> Option<BattlerId> {
        self.leader
    }

    pub fn party(&self) -> &[BattlerId] {
        &self.party
    }

    pub fn battler(&self, id: BattlerId) -> Option<&Battler> {
        self.battlers.get(&id)
    }

    pub fn battlers(&self) -> impl Iterator<Item = &Battler> {
        self.battlers.values()
    }

    pub fn actions(&self) -> &[Action] {
        &self.actions
    }

    pub fn action(&self, id: ActionId) -> Option<&Action> {
        self.actions.iter().find(|action| action.id == id)
    }

    /// Actions queued during resolution that join the live list after the
    /// current action pass.
    pub fn pending_actions(&self) -> &[Action] {
        &self.pending
    }

    pub fn tracked_states(&self) -> &TrackedStates {
        &self.tracked
    }

    pub fn pickups(&self) -> &[Pickup] {
        &self.pickups
    }

    pub fn queued_requests(&self) -> impl Iterator<Item = &BattleRequest> {
        self.requests.iter()
    }

    /// True once the whole party has fallen.
    pub fn is_party_defeated(&self) -> bool {
        self.party_defeated
    }

    pub(crate) fn allocate_action_id(&mut self) -> ActionId {
        self.next_action_id += 1;
        ActionId(self.next_action_id)
    }

    pub(crate) fn allocate_pickup_id(&mut self) -> PickupId {
        self.next_pickup_id += 1;
        PickupId(self.next_pickup_id)
    }

    /// Draws the next roll in `[0, 1)` on behalf of `battler`.
    pub(crate) fn roll(&mut self, rng: &dyn RngOracle, battler: BattlerId, context: RollContext) -> f64 {
        let seed = compute_seed(self.seed, self.nonce, battler.0, context);
        self.nonce += 1;
        rng.random_unit(seed)
    }

    /// True for a tracked battler that has not fallen.
    pub(crate) fn is_alive(&self, id: BattlerId) -> bool {
        self.battlers.get(&id).is_some_and(|battler| !battler.dying)
    }
}

#[cfg(feature = "serde")]
impl BattleState {
    /// Encodes the whole state as an opaque snapshot.
    pub fn to_bytes(&self) -> Result<Vec<u8>, crate::error::SnapshotError> {
        bincode::serialize(self).map_err(crate::error::SnapshotError::Encode)
    }

    /// Restores a snapshot produced by [`BattleState::to_bytes`].
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, crate::error::SnapshotError> {
        bincode::deserialize(bytes).map_err(crate::error::SnapshotError::Decode)
    }
}
