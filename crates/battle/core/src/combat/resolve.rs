//! Resolution of one action against one collided target.
//!
//! Steps run in a fixed order: parry bypass, parry roll, skill application,
//! on-hit effects (combo, knockback, alert), aggro, retaliation, popups and
//! narration, then the defeat check. Missing battlers or skills abort the
//! resolution for this frame without touching state.

use tracing::{debug, warn};

use super::aggro::{AggroModifiers, hit_aggro};
use super::knockback::{knockback_tiles, push};
use super::parry::{ParryOutcome, bypasses_parry, roll_parry};
use super::report::{skill_narration, skill_popups};
use super::{handle_defeat, retaliation};
use crate::config::BattleConfig;
use crate::engine::{FrameReport, HitRecord};
use crate::env::{
    CatalogOracle, RollContext, SkillDefinition, SkillResult, SkillScope, StateDefinition, World,
};
use crate::state::{
    Action, BattleState, BattlerId, BattlerKind, EngagementState, Position, StateId, Team,
    TrackedStates,
};

/// Immutable facts about the resolution in progress.
#[derive(Clone, Copy)]
struct Strike<'r> {
    config: &'r BattleConfig,
    skill: &'r SkillDefinition,
    action: &'r Action,
    caster: BattlerId,
    caster_team: Team,
    caster_position: Position,
    target: BattlerId,
    parried: bool,
}

/// Runs the pipeline for `action` against `target`.
///
/// Returns `None` when the resolution was skipped.
pub(crate) fn resolve(
    state: &mut BattleState,
    world: &mut World<'_>,
    config: &BattleConfig,
    action: &Action,
    target: BattlerId,
    report: &mut FrameReport,
) -> Option<HitRecord> {
    let catalog = world.catalog;
    let Some(skill) = catalog.skill(action.skill) else {
        warn!(skill = %action.skill, "resolution skipped: unknown skill");
        return None;
    };
    let Some(caster) = state.battlers.get(&action.caster) else {
        warn!(caster = %action.caster, "resolution skipped: caster not tracked");
        return None;
    };
    let (caster_kind, caster_team, caster_position) = (caster.kind, caster.team, caster.position);
    let Some(defender) = state.battlers.get(&target) else {
        warn!(%target, "resolution skipped: target not tracked");
        return None;
    };
    if defender.dying {
        return None;
    }
    let target_team = defender.team;
    let (Some(caster_stats), Some(target_stats)) =
        (world.stats.stats(action.caster), world.stats.stats(target))
    else {
        warn!(caster = %action.caster, %target, "resolution skipped: stats unavailable");
        return None;
    };

    // Friendly casts (heals, self buffs) are never parried.
    let friendly = !caster_team.opposes(target_team);
    let outcome = if friendly || bypasses_parry(skill, defender) {
        ParryOutcome::Bypassed
    } else if target_stats.grd <= 0.0 {
        ParryOutcome::NoGuard
    } else if defender.parry_window.is_some() {
        ParryOutcome::Precise
    } else {
        let random = state.roll(world.rng, action.caster, RollContext::Parry);
        ParryOutcome::Rolled {
            parried: roll_parry(
                &config.parry,
                random,
                caster_stats.hit,
                target_stats.grd,
                skill.ignore_parry,
            ),
        }
    };

    let strike = Strike {
        config,
        skill,
        action,
        caster: action.caster,
        caster_team,
        caster_position,
        target,
        parried: outcome.parried(),
    };

    let result = if strike.parried {
        SkillResult::default()
    } else {
        world.stats.apply_skill(strike.caster, target, skill.id)
    };
    if !strike.parried && result.is_hit() {
        for &added in &result.added_states {
            track_state(&mut state.tracked, catalog, target, added);
        }
    }

    if strike.parried || result.is_hit() {
        apply_on_hit(state, world, strike);
    }

    if caster_team != target_team {
        let modifiers = AggroModifiers {
            caster_out: amplifier(&state.tracked, catalog, strike.caster, |d| d.aggro_out),
            target_in: amplifier(&state.tracked, catalog, target, |d| d.aggro_in),
            caster_tgr: caster_stats.tgr,
            from_player: caster_kind == BattlerKind::Player,
        };
        apply_aggro(state, strike, &result, modifiers);
    }

    if !action.is_retaliation {
        retaliation::trigger(state, world, config, strike.caster, target, strike.parried);
    }

    for popup in skill_popups(target, &result, strike.parried) {
        world.popup(popup);
    }
    for entry in skill_narration(strike.caster, target, &skill.name, &result, strike.parried) {
        world.narrate(entry);
    }
    debug!(
        caster = %strike.caster,
        %target,
        skill = %skill.id,
        ?outcome,
        hp = result.hp_damage,
        "resolved"
    );

    let fallen = world.stats.stats(target).is_some_and(|stats| stats.is_dead());
    if fallen {
        handle_defeat(state, world, config, target, Some(strike.caster), report);
    }

    Some(HitRecord {
        action: action.id,
        caster: strike.caster,
        target,
        skill: skill.id,
        parried: strike.parried,
        result,
    })
}

fn track_state(
    tracked: &mut TrackedStates,
    catalog: &dyn CatalogOracle,
    battler: BattlerId,
    state: StateId,
) {
    match catalog.state(state) {
        Some(definition) if definition.duration > 0 => {
            tracked.afflict(battler, state, definition.duration);
        }
        Some(_) => {}
        None => warn!(%battler, state = state.0, "added state is not in the catalog"),
    }
}

/// Product of one aggro amplifier over a battler's active tracked states.
fn amplifier(
    tracked: &TrackedStates,
    catalog: &dyn CatalogOracle,
    battler: BattlerId,
    pick: impl Fn(&StateDefinition) -> f64,
) -> f64 {
    tracked
        .states_of(battler)
        .filter_map(|record| catalog.state(record.state))
        .map(pick)
        .product()
}

/// Combo staging, knockback and alert.
fn apply_on_hit(state: &mut BattleState, world: &World<'_>, strike: Strike<'_>) {
    if let (Some(combo), Some(slot)) = (strike.skill.combo, strike.action.slot) {
        if let Some(caster) = state.battlers.get_mut(&strike.caster) {
            if caster.cooldowns.stage_combo(slot, combo.next, combo.delay) {
                debug!(caster = %strike.caster, %slot, next = %combo.next, "combo staged");
            }
        }
    }

    let resist = world
        .stats
        .stats(strike.target)
        .map_or(0, |stats| stats.knockback_resist);
    let Some(target) = state.battlers.get_mut(&strike.target) else {
        return;
    };

    let tiles = knockback_tiles(strike.skill.knockback, resist);
    let self_cast = strike.skill.scope == SkillScope::User || strike.target == strike.caster;
    if tiles > 0 && !strike.parried && !target.inanimate && !self_cast {
        let landed = push(world.map, target.position, strike.action.facing(), tiles);
        if landed != target.position {
            debug!(target = %strike.target, from = %target.position, to = %landed, "knocked back");
            target.position = landed;
        }
    }

    let origin = strike.caster_position;
    if target.kind.is_ai_controlled()
        && target.team.opposes(strike.caster_team)
        && target.engagement != EngagementState::Engaged
        && origin.chebyshev(target.position) > target.sight_range
    {
        debug!(target = %strike.target, %origin, "alerted");
        target.raise_alert(origin, strike.config.alert_duration);
    }
}

/// Aggro between battlers of different teams. Parries replace the formula
/// with flat adjustments on both sides.
fn apply_aggro(
    state: &mut BattleState,
    strike: Strike<'_>,
    result: &SkillResult,
    modifiers: AggroModifiers,
) {
    let config = &strike.config.aggro;
    if strike.parried {
        if let Some(target) = state.battlers.get_mut(&strike.target) {
            target.aggro.adjust(strike.caster, -config.parry_penalty);
        }
        if let Some(caster) = state.battlers.get_mut(&strike.caster) {
            caster.aggro.adjust(strike.target, config.parry_bonus);
        }
        return;
    }

    let value = hit_aggro(config, strike.skill, result, modifiers);
    if let Some(target) = state.battlers.get_mut(&strike.target) {
        target.aggro.adjust(strike.caster, value);
    }
}
