//! Counter casts fired by a struck battler.
//!
//! Sources, in order: counter-parry skills of the stance slot when the hit
//! was parried, counter-guard skills when guarding, otherwise an
//! auto-counter roll against CNT. The provider's unconditional retaliation
//! list is rolled on top. Every cast becomes a pending retaliation action,
//! and retaliation actions never retaliate in turn.

use tracing::{debug, warn};

use super::report::LogEntry;
use crate::config::BattleConfig;
use crate::engine::{CastOrigin, build_action};
use crate::env::{RollContext, World};
use crate::state::{BattleState, BattlerId, Direction, SkillId};

pub(crate) fn trigger(
    state: &mut BattleState,
    world: &mut World<'_>,
    config: &BattleConfig,
    attacker: BattlerId,
    defender: BattlerId,
    parried: bool,
) {
    let (Some(striker), Some(struck)) = (state.battlers.get(&attacker), state.battlers.get(&defender))
    else {
        return;
    };
    if !struck.team.opposes(striker.team) || !struck.is_capable() {
        return;
    }
    let Some(stats) = world.stats.stats(defender).filter(|stats| !stats.is_dead()) else {
        return;
    };

    let facing = Direction::toward(struck.position, striker.position).unwrap_or(struck.facing);
    let origin = CastOrigin {
        caster: defender,
        position: struck.position,
        facing,
    };
    let stance_slot = struck.parry_window.or(struck.guard).map(|stance| stance.slot);
    let mut skills: Vec<SkillId> = Vec::new();
    let mut roll_auto_counter = false;
    if parried {
        if let Some(slot) = stance_slot {
            skills.extend_from_slice(struck.guard_data.counter_parry(slot));
        }
    } else if let Some(guard) = struck.guard {
        skills.extend_from_slice(struck.guard_data.counter_guard(guard.slot));
    } else {
        roll_auto_counter = stats.cnt > 0.0;
    }

    if roll_auto_counter && state.roll(world.rng, defender, RollContext::AutoCounter) < stats.cnt {
        match world.stats.equipped_skill(defender, config.auto_counter_slot) {
            Some(skill) => skills.push(skill),
            None => debug!(%defender, slot = %config.auto_counter_slot, "auto-counter slot is empty"),
        }
    }
    for passive in world.stats.retaliation_skills(defender) {
        if passive.chance > 0.0
            && state.roll(world.rng, defender, RollContext::Retaliation) < passive.chance
        {
            skills.push(passive.skill);
        }
    }

    let catalog = world.catalog;
    for skill in skills {
        let Some(definition) = catalog.skill(skill) else {
            warn!(%defender, %skill, "retaliation skill is not in the catalog");
            continue;
        };
        let action = build_action(state, definition, origin, None, true, None);
        debug!(%defender, %skill, action = %action.id(), "retaliation queued");
        state.pending.push(action);
        world.narrate(LogEntry::Retaliated {
            battler: defender,
            skill: definition.name.clone(),
        });
    }
}
