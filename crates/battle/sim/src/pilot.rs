//! Scripted stand-in for the AI and input layers.
//!
//! Engaged battlers turn toward their target, walk up to it and use their
//! main slot whenever it is ready. The engine only sees the resulting
//! placements and requests.

use battle_core::{
    BattleEngine, BattleRequest, BattleState, Battler, BattlerId, BattlerKind, Direction,
    MapOracle, Position, SlotKey, StatsOracle,
};

/// Frames between two steps of a walking battler.
const STEP_PERIOD: u64 = 8;

/// One decision for the coming frame.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Order {
    Turn(BattlerId, Direction),
    Walk(BattlerId, Position),
    Request(BattleRequest),
}

impl Order {
    pub fn apply(self, engine: &mut BattleEngine<'_>) {
        match self {
            Order::Turn(id, facing) => {
                engine.turn_battler(id, facing);
            }
            Order::Walk(id, to) => {
                engine.place_battler(id, to);
            }
            Order::Request(request) => engine.request(request),
        }
    }
}

/// Decides what every piloted battler does next frame.
pub fn plan(
    state: &BattleState,
    stats: &dyn StatsOracle,
    map: &dyn MapOracle,
    autopilot: bool,
) -> Vec<Order> {
    let walking = (state.frame() + 1) % STEP_PERIOD == 0;
    let mut occupied: Vec<Position> = state
        .battlers()
        .filter(|battler| !battler.is_dying())
        .map(Battler::position)
        .collect();
    let mut orders = Vec::new();

    for battler in state.battlers().filter(|battler| battler.is_capable()) {
        let piloted = battler.kind() != BattlerKind::Player || autopilot;
        if !piloted {
            continue;
        }
        let Some(target) = pick_target(state, battler) else {
            continue;
        };
        let (from, to) = (battler.position(), target.position());
        let Some(facing) = Direction::toward(from, to) else {
            continue;
        };
        if facing != battler.facing() {
            orders.push(Order::Turn(battler.id(), facing));
        }

        if from.chebyshev(to) <= 1 {
            let equipped = stats.equipped_skill(battler.id(), SlotKey::Main);
            if battler.cooldowns().next_cast(SlotKey::Main, equipped).is_some() {
                orders.push(Order::Request(BattleRequest::UseSlot {
                    caster: battler.id(),
                    slot: SlotKey::Main,
                    target: None,
                }));
            }
            continue;
        }

        let ahead = from.step(facing);
        if walking && map.is_passable(from, facing) && !occupied.contains(&ahead) {
            occupied.retain(|&tile| tile != from);
            occupied.push(ahead);
            orders.push(Order::Walk(battler.id(), ahead));
        }
    }
    orders
}

/// Engaged AI battlers follow their engagement; the autopiloted leader picks
/// the nearest opponent.
fn pick_target<'s>(state: &'s BattleState, battler: &Battler) -> Option<&'s Battler> {
    if battler.kind().is_ai_controlled() {
        return battler
            .target()
            .and_then(|id| state.battler(id))
            .filter(|target| target.is_capable());
    }
    state
        .battlers()
        .filter(|other| other.is_capable() && battler.team().opposes(other.team()))
        .min_by_key(|other| battler.position().chebyshev(other.position()))
}
