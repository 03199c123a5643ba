use crate::state::{BattleState, BattlerId, BattlerKind};

/// Hands leadership to the next living party member in party order.
///
/// The old and new leader swap kinds, and swap tiles when the old leader is
/// still standing. Every other member follows the new leader afterwards.
pub(crate) fn promote_next_leader(state: &mut BattleState) -> Option<BattlerId> {
    let party = state.party.clone();
    let start = state
        .leader
        .and_then(|leader| party.iter().position(|&member| member == leader))
        .map_or(0, |index| index + 1);

    let next = (0..party.len())
        .map(|offset| party[(start + offset) % party.len()])
        .find(|&member| Some(member) != state.leader && state.is_alive(member))?;

    // Tile the new leader takes over, when the old leader can hand it over.
    let handover = state
        .leader
        .and_then(|id| state.battlers.get(&id))
        .filter(|battler| !battler.dying)
        .map(|battler| battler.position);
    let next_tile = state.battlers.get(&next).map(|battler| battler.position);

    if let Some(previous) = state.leader.and_then(|id| state.battlers.get_mut(&id)) {
        previous.kind = BattlerKind::Ally;
        if let (Some(_), Some(tile)) = (handover, next_tile) {
            previous.position = tile;
        }
    }
    if let (Some(tile), Some(promoted)) = (handover, state.battlers.get_mut(&next)) {
        promoted.position = tile;
    }

    if let Some(promoted) = state.battlers.get_mut(&next) {
        promoted.kind = BattlerKind::Player;
        promoted.leader = None;
        promoted.disengage();
    }
    for &member in &party {
        if member == next {
            continue;
        }
        if let Some(follower) = state.battlers.get_mut(&member) {
            follower.leader = Some(next);
        }
    }
    state.leader = Some(next);
    Some(next)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::{Battler, Position};

    fn party() -> BattleState {
        let mut state = BattleState::new(1);
        state.add_battler(Battler::new(BattlerId(0), BattlerKind::Player, Position::new(5, 5)));
        state.add_battler(
            Battler::new(BattlerId(1), BattlerKind::Ally, Position::new(4, 5))
                .with_leader(BattlerId(0)),
        );
        state.add_battler(
            Battler::new(BattlerId(2), BattlerKind::Ally, Position::new(3, 5))
                .with_leader(BattlerId(0)),
        );
        state
    }

    #[test]
    fn cycling_swaps_kinds_tiles_and_links() {
        let mut state = party();
        assert_eq!(promote_next_leader(&mut state), Some(BattlerId(1)));

        let leader = state.battler(BattlerId(1)).unwrap();
        assert_eq!(leader.kind(), BattlerKind::Player);
        assert_eq!(leader.position(), Position::new(5, 5));
        assert_eq!(leader.leader(), None);

        let old = state.battler(BattlerId(0)).unwrap();
        assert_eq!(old.kind(), BattlerKind::Ally);
        assert_eq!(old.position(), Position::new(4, 5));
        assert_eq!(old.leader(), Some(BattlerId(1)));
        assert_eq!(state.battler(BattlerId(2)).unwrap().leader(), Some(BattlerId(1)));
    }

    #[test]
    fn fallen_members_are_skipped() {
        let mut state = party();
        state.battlers.get_mut(&BattlerId(1)).unwrap().dying = true;
        assert_eq!(promote_next_leader(&mut state), Some(BattlerId(2)));
        assert_eq!(promote_next_leader(&mut state), Some(BattlerId(0)));
    }

    #[test]
    fn lone_survivor_cannot_cycle() {
        let mut state = party();
        for id in [1, 2] {
            state.battlers.get_mut(&BattlerId(id)).unwrap().dying = true;
        }
        assert_eq!(promote_next_leader(&mut state), None);
        assert_eq!(state.leader(), Some(BattlerId(0)));
    }
}
