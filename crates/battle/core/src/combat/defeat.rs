//! Defeat handling and rewards.

use tracing::{debug, info, warn};

use super::report::{LogEntry, PopupDescriptor, PopupKind};
use crate::config::BattleConfig;
use crate::engine::{FrameReport, promote_next_leader};
use crate::env::{LevelBandScaling, RewardScaling, RollContext, World};
use crate::state::{BattleState, BattlerId, Pickup, Position, Team};

/// `floor(base * multiplier)`, never negative.
pub fn scale_reward(base: u32, multiplier: f64) -> u32 {
    (f64::from(base) * multiplier).floor().max(0.0) as u32
}

/// Experience one party member receives: `round(exp * exr)`.
pub fn member_share(exp: u32, exr: f64) -> u32 {
    (f64::from(exp) * exr).round().max(0.0) as u32
}

/// Marks `defeated` as dying and settles everything that follows from it.
///
/// Does nothing for unknown or already dying battlers.
pub(crate) fn handle_defeat(
    state: &mut BattleState,
    world: &mut World<'_>,
    config: &BattleConfig,
    defeated: BattlerId,
    killer: Option<BattlerId>,
    report: &mut FrameReport,
) {
    let Some(battler) = state.battlers.get_mut(&defeated) else {
        warn!(%defeated, "defeat of untracked battler ignored");
        return;
    };
    if battler.dying {
        return;
    }
    battler.dying = true;
    battler.leader = None;
    battler.guard = None;
    battler.parry_window = None;
    battler.dashing = false;
    battler.disengage();
    let (team, position) = (battler.team, battler.position);

    state.forget_battler(defeated);
    report.defeats.push(defeated);
    info!(%defeated, ?killer, "battler defeated");
    world.popup(PopupDescriptor::new(defeated, PopupKind::Defeated));
    world.narrate(LogEntry::Defeated {
        battler: defeated,
        killer,
    });

    let party_kill = killer
        .and_then(|id| state.battlers.get(&id))
        .is_some_and(|battler| battler.team == Team::Party);
    if let Some(killer) = killer.filter(|_| party_kill && team != Team::Party) {
        grant_rewards(state, world, config, defeated, killer, position);
    }

    if state.leader == Some(defeated) {
        match promote_next_leader(state) {
            Some(leader) => info!(%leader, "leader fell, next party member takes over"),
            None => {
                info!("party defeated");
                state.party_defeated = true;
            }
        }
    }
}

fn grant_rewards(
    state: &mut BattleState,
    world: &mut World<'_>,
    config: &BattleConfig,
    defeated: BattlerId,
    killer: BattlerId,
    position: Position,
) {
    let Some(foe) = world.stats.stats(defeated) else {
        warn!(%defeated, "no stats for defeated battler, rewards skipped");
        return;
    };
    let killer_level = world.stats.stats(killer).map_or(foe.level, |stats| stats.level);
    let diff = foe.level as i32 - killer_level as i32;
    let multiplier = match world.rewards {
        Some(curve) => curve.multiplier(diff),
        None => LevelBandScaling::from_config(&config.reward_scaling)
            .map_or(1.0, |curve| curve.multiplier(diff)),
    };
    let exp = scale_reward(foe.exp, multiplier);
    let gold = scale_reward(foe.gold, multiplier);

    let members: Vec<BattlerId> = state
        .party
        .iter()
        .copied()
        .filter(|&member| state.is_alive(member))
        .collect();
    for member in members {
        let exr = world.stats.stats(member).map_or(1.0, |stats| stats.exr);
        let share = member_share(exp, exr);
        if share > 0 && world.stats.gain_exp(member, share) {
            info!(%member, "level up");
            world.popup(PopupDescriptor::new(member, PopupKind::LevelUp));
            world.narrate(LogEntry::LevelUp { battler: member });
        }
    }
    if gold > 0 {
        world.stats.gain_gold(gold);
    }

    info!(%defeated, exp, gold, multiplier, "rewards granted");
    world.popup(PopupDescriptor::new(killer, PopupKind::Experience(exp)));
    world.popup(PopupDescriptor::new(killer, PopupKind::Gold(gold)));
    world.narrate(LogEntry::Rewards { exp, gold });

    for entry in world.stats.drop_table(defeated) {
        if state.roll(world.rng, defeated, RollContext::Loot) >= entry.chance {
            continue;
        }
        let id = state.allocate_pickup_id();
        debug!(item = entry.item.0, %position, "loot dropped");
        state.pickups.push(Pickup {
            id,
            item: entry.item,
            position,
            expires_in: config.loot_expiration.max(1),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rewards_floor_after_scaling() {
        assert_eq!(scale_reward(100, 1.0), 100);
        assert_eq!(scale_reward(55, 0.5), 27);
        assert_eq!(scale_reward(10, -2.0), 0);
    }

    #[test]
    fn member_share_rounds() {
        assert_eq!(member_share(100, 1.0), 100);
        assert_eq!(member_share(5, 1.5), 8);
        assert_eq!(member_share(100, 0.0), 0);
    }
}
