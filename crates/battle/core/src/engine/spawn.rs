//! Turning skill use into live actions.

use tracing::debug;

use super::BattleEngine;
use crate::env::{SkillDefinition, SkillFlags, World};
use crate::error::SpawnError;
use crate::geometry::Hitbox;
use crate::state::{
    Action, ActionId, BattleState, Battler, BattlerId, Direction, Position, ProjectileMotion,
    SkillId, SlotKey, Stance,
};

/// Where and how a cast originates.
#[derive(Clone, Copy, Debug)]
pub(crate) struct CastOrigin {
    pub caster: BattlerId,
    pub position: Position,
    pub facing: Direction,
}

impl CastOrigin {
    pub fn of(battler: &Battler) -> Self {
        Self {
            caster: battler.id,
            position: battler.position,
            facing: battler.facing,
        }
    }
}

/// Builds a fresh action for `skill`.
///
/// Direct actions sit on their caster. Other actions start at `target`
/// when given, otherwise at the caster's tile. Retaliations are never direct.
pub(crate) fn build_action(
    state: &mut BattleState,
    skill: &SkillDefinition,
    origin: CastOrigin,
    slot: Option<SlotKey>,
    is_retaliation: bool,
    target: Option<Position>,
) -> Action {
    let is_direct = skill.is_direct() && !is_retaliation;
    let position = if is_direct {
        origin.position
    } else {
        target.unwrap_or(origin.position)
    };
    let projectile = skill
        .projectile
        .filter(|_| !is_direct)
        .map(|spec| ProjectileMotion {
            frames_per_tile: spec.frames_per_tile,
            progress: 0,
        });

    Action {
        id: state.allocate_action_id(),
        caster: origin.caster,
        skill: skill.id,
        slot,
        hitbox: Hitbox::new(skill.shape, skill.range, origin.facing),
        proximity: skill.proximity,
        position,
        delay_remaining: skill.delay,
        duration_remaining: skill.duration,
        piercing_hits_remaining: skill.piercing.hits,
        piercing_delay: skill.piercing.delay,
        piercing_delay_remaining: 0,
        active_frames: 0,
        is_direct,
        is_retaliation,
        touch_trigger: skill.flags.contains(SkillFlags::TOUCH_TRIGGER),
        projectile,
        needs_removal: false,
        flagged_at: None,
    }
}

impl BattleEngine<'_> {
    /// Casts whatever `slot` resolves to right now.
    ///
    /// A ready combo follow-up takes precedence over the equipped skill.
    pub fn use_slot(
        &mut self,
        world: &mut World<'_>,
        caster: BattlerId,
        slot: SlotKey,
        target: Option<Position>,
    ) -> Result<ActionId, SpawnError> {
        let battler = self
            .state
            .battlers
            .get(&caster)
            .ok_or(SpawnError::CasterNotFound(caster))?;
        let equipped = world.stats.equipped_skill(caster, slot);
        let cooldowns = &battler.cooldowns;

        let Some(cast) = cooldowns.next_cast(slot, equipped) else {
            let combo = cooldowns.combo(slot);
            if equipped.is_none() && combo.is_none() {
                return Err(SpawnError::EmptySlot { caster, slot });
            }
            let combo_wait = combo.map_or(0, |link| link.frames_remaining);
            return Err(SpawnError::OnCooldown {
                caster,
                slot,
                remaining: cooldowns.remaining(slot).max(combo_wait),
            });
        };
        self.spawn_action(world, caster, cast.skill(), Some(slot), target)
    }

    /// Spawns `skill` for `caster` after checking every precondition.
    ///
    /// With a `slot`, the slot must be off cooldown (or hold a ready combo
    /// link to `skill`) and is charged afterwards. Rejections leave the state
    /// untouched.
    pub fn spawn_action(
        &mut self,
        world: &mut World<'_>,
        caster: BattlerId,
        skill: SkillId,
        slot: Option<SlotKey>,
        target: Option<Position>,
    ) -> Result<ActionId, SpawnError> {
        let battler = self
            .state
            .battlers
            .get(&caster)
            .ok_or(SpawnError::CasterNotFound(caster))?;
        if !battler.is_capable() {
            return Err(SpawnError::CasterIncapable(caster));
        }
        let catalog = world.catalog;
        let definition = catalog.skill(skill).ok_or(SpawnError::UnknownSkill(skill))?;

        let mut combo_cast = false;
        if let Some(slot) = slot {
            combo_cast = battler
                .cooldowns
                .combo(slot)
                .is_some_and(|link| link.is_ready() && link.next == skill);
            let remaining = battler.cooldowns.remaining(slot);
            if !combo_cast && remaining > 0 {
                return Err(SpawnError::OnCooldown {
                    caster,
                    slot,
                    remaining,
                });
            }
        }
        if !world.stats.can_use_skill(caster, skill) {
            return Err(SpawnError::CannotPay { caster, skill });
        }

        let origin = CastOrigin::of(battler);
        world.stats.pay_skill_cost(caster, skill);
        let action = build_action(self.state, definition, origin, slot, false, target);
        let id = action.id;
        self.state.actions.push(action);

        if let Some(slot) = slot {
            let equipped = world.stats.equipped_skills(caster);
            self.charge_slot(caster, slot, definition, combo_cast, &equipped);
        }
        debug!(%caster, %skill, action = %id, ?slot, "action spawned");
        Ok(id)
    }

    /// Spawns `skill` for `caster` ignoring cooldowns and costs.
    ///
    /// Used by scripted casts. `target` overrides the action's origin tile.
    pub fn force_action(
        &mut self,
        world: &mut World<'_>,
        caster: BattlerId,
        skill: SkillId,
        is_retaliation: bool,
        target: Option<Position>,
    ) -> Result<ActionId, SpawnError> {
        let battler = self
            .state
            .battlers
            .get(&caster)
            .ok_or(SpawnError::CasterNotFound(caster))?;
        let catalog = world.catalog;
        let definition = catalog.skill(skill).ok_or(SpawnError::UnknownSkill(skill))?;

        let origin = CastOrigin::of(battler);
        let action = build_action(self.state, definition, origin, None, is_retaliation, target);
        let id = action.id;
        self.state.actions.push(action);
        debug!(%caster, %skill, action = %id, is_retaliation, "action forced");
        Ok(id)
    }

    /// Applies cooldown, combo consumption and stances after a slot cast.
    fn charge_slot(
        &mut self,
        caster: BattlerId,
        slot: SlotKey,
        skill: &SkillDefinition,
        combo_cast: bool,
        equipped: &[(SlotKey, SkillId)],
    ) {
        let precise_window = self.config.parry.precise_window;
        let Some(battler) = self.state.battlers.get_mut(&caster) else {
            return;
        };

        if combo_cast {
            battler.cooldowns.clear_combo(slot);
            battler.cooldowns.hold_cooldown(slot, skill.cooldown);
        } else {
            let unique = skill.flags.contains(SkillFlags::UNIQUE_COOLDOWN);
            battler
                .cooldowns
                .apply_cooldown(slot, skill.id, skill.cooldown, unique, equipped);
        }

        if battler.guard_data.raises_guard(slot, skill.id) {
            battler.guard = Some(Stance {
                slot,
                frames: skill.duration.max(1),
            });
        }
        if battler.guard_data.opens_parry(slot, skill.id) && precise_window > 0 {
            battler.parry_window = Some(Stance {
                slot,
                frames: precise_window,
            });
        }
    }
}
