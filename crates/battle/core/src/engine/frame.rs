//! The per-frame update.

use std::mem;

use tracing::{debug, warn};

use super::{BattleEngine, BattleRequest, FrameReport};
use crate::combat::{self, LogEntry, PopupDescriptor, PopupKind};
use crate::env::{SkillScope, World};
use crate::error::BattleError;
use crate::geometry::within_proximity;
use crate::state::{
    Action, ActivePhase, Battler, BattlerId, EngagementState, Position, Stance, Team,
};

impl BattleEngine<'_> {
    /// Advances the battle by one frame.
    ///
    /// Never fails: missing references are logged and skipped.
    pub fn update(&mut self, world: &mut World<'_>) -> FrameReport {
        self.state.frame += 1;
        let mut report = FrameReport::new(self.state.frame);

        self.update_leader();
        self.update_ai();
        self.update_actions(world, &mut report);
        self.update_tracked_states(world);
        self.update_pickups(world);
        self.process_requests(world, &mut report);

        report
    }

    fn update_leader(&mut self) {
        if let Some(leader) = self.state.leader.and_then(|id| self.state.battlers.get_mut(&id)) {
            if !leader.dying {
                leader.tick_timers();
            }
        }
    }

    /// Ticks AI battlers near the leader and refreshes their engagement.
    fn update_ai(&mut self) {
        let radius = self.config.ai_update_radius;
        let anchor = self
            .state
            .leader
            .and_then(|id| self.state.battlers.get(&id))
            .map(Battler::position);

        let roster: Vec<(BattlerId, Team, Position, bool)> = self
            .state
            .battlers
            .values()
            .map(|b| (b.id, b.team, b.position, b.is_capable()))
            .collect();

        for battler in self.state.battlers.values_mut() {
            if !battler.kind.is_ai_controlled() || battler.dying {
                continue;
            }
            if anchor.is_some_and(|origin| origin.chebyshev(battler.position) > radius) {
                continue;
            }
            battler.tick_timers();
            if battler.inanimate {
                continue;
            }

            if battler.engagement == EngagementState::Engaged {
                let keep = battler.target.and_then(|target| {
                    roster
                        .iter()
                        .find(|(id, _, _, capable)| *id == target && *capable)
                        .filter(|(_, _, position, _)| {
                            battler.position.chebyshev(*position) <= battler.pursuit_range
                        })
                });
                if keep.is_none() {
                    debug!(battler = %battler.id, "disengaged");
                    battler.disengage();
                }
                continue;
            }

            let nearest = roster
                .iter()
                .filter(|(id, team, _, capable)| {
                    *capable && *id != battler.id && battler.team.opposes(*team)
                })
                .map(|(id, _, position, _)| (battler.position.chebyshev(*position), *id))
                .filter(|(distance, _)| *distance <= battler.sight_range)
                .min();
            if let Some((_, target)) = nearest {
                debug!(battler = %battler.id, %target, "engaged");
                battler.engage(target);
            }
        }
    }

    fn update_actions(&mut self, world: &mut World<'_>, report: &mut FrameReport) {
        let frame = self.state.frame;
        let mut actions = mem::take(&mut self.state.actions);

        for action in &mut actions {
            if action.needs_removal {
                continue;
            }
            let Some(skill) = world.catalog.skill(action.skill) else {
                warn!(action = %action.id, skill = %action.skill, "action references unknown skill");
                action.flag_removal(frame);
                continue;
            };
            let scope = skill.scope;

            if action.is_delaying() {
                let touched = action.touch_trigger
                    && !self.collect_targets(world, action, scope).is_empty();
                if touched {
                    debug!(action = %action.id, "touch trigger fired");
                    action.trigger();
                } else {
                    action.advance_delay();
                    continue;
                }
            }

            match action.advance_active(self.config.min_action_lifetime, frame) {
                ActivePhase::Expired => {
                    debug!(action = %action.id, "action expired");
                    continue;
                }
                ActivePhase::PiercingCooldown => {
                    self.advance_projectile(world, action);
                    continue;
                }
                ActivePhase::Ready => self.advance_projectile(world, action),
            }
            if action.piercing_hits_remaining == 0 {
                continue;
            }

            let targets = self.collect_targets(world, action, scope);
            let mut struck = false;
            for target in targets {
                if let Some(hit) =
                    combat::resolve(self.state, world, self.config, action, target, report)
                {
                    report.hits.push(hit);
                    struck = true;
                }
            }
            if struck {
                action.record_hit();
            }
        }

        actions.retain(|action| {
            if action.is_due_for_cleanup(frame) {
                debug!(action = %action.id, "action despawned");
                report.despawned.push(action.id);
                false
            } else {
                true
            }
        });

        // Anything spawned during the pass (retaliations) joins afterwards.
        actions.append(&mut self.state.actions);
        let pending = mem::take(&mut self.state.pending);
        report.spawned.extend(pending.iter().map(Action::id));
        actions.extend(pending);
        self.state.actions = actions;
    }

    fn advance_projectile(&self, world: &World<'_>, action: &mut Action) {
        let map = world.map;
        action.advance_projectile(|position, direction| map.is_passable(position, direction));
    }

    /// Eligible battlers the action currently touches, in id order.
    fn collect_targets(&self, world: &World<'_>, action: &Action, scope: SkillScope) -> Vec<BattlerId> {
        // Actions of fallen casters linger until they expire but hit nothing.
        let Some(caster) = self.state.battlers.get(&action.caster).filter(|b| !b.dying) else {
            return Vec::new();
        };
        let tolerance = self.config.axis_tolerance;

        self.state
            .battlers
            .values()
            .filter(|target| is_eligible(scope, caster, target))
            .filter(|target| {
                if action.is_direct {
                    let separation = world.map.separation(caster.position, target.position);
                    within_proximity(separation, action.proximity)
                } else {
                    let separation = world.map.separation(action.position, target.position);
                    action.hitbox.contains(separation, tolerance)
                }
            })
            .map(Battler::id)
            .collect()
    }

    fn update_tracked_states(&mut self, world: &mut World<'_>) {
        for record in self.state.tracked.tick() {
            debug!(battler = %record.battler, state = record.state.0, "tracked state expired");
            world.stats.remove_state(record.battler, record.state);
        }
    }

    /// Collects pickups under the leader and drops the ones that timed out.
    fn update_pickups(&mut self, world: &mut World<'_>) {
        let leader = self
            .state
            .leader
            .and_then(|id| self.state.battlers.get(&id))
            .filter(|battler| !battler.dying)
            .map(|battler| (battler.id, battler.position));

        let mut kept = Vec::with_capacity(self.state.pickups.len());
        for mut pickup in mem::take(&mut self.state.pickups) {
            if let Some((id, tile)) = leader.filter(|(_, tile)| *tile == pickup.position) {
                debug!(item = pickup.item.0, %tile, "pickup collected");
                world.stats.gain_item(pickup.item);
                world.popup(PopupDescriptor::new(id, PopupKind::Loot(pickup.item)));
                world.narrate(LogEntry::Looted { item: pickup.item });
                continue;
            }
            if pickup.tick() {
                debug!(item = pickup.item.0, "pickup expired");
                continue;
            }
            kept.push(pickup);
        }
        self.state.pickups = kept;
    }

    fn process_requests(&mut self, world: &mut World<'_>, report: &mut FrameReport) {
        while let Some(request) = self.state.requests.pop_front() {
            let spawned = match request {
                BattleRequest::UseSlot {
                    caster,
                    slot,
                    target,
                } => self.use_slot(world, caster, slot, target),
                BattleRequest::SpawnAction {
                    caster,
                    skill,
                    slot,
                    target,
                } => self.spawn_action(world, caster, skill, slot, target),
                BattleRequest::CycleParty => {
                    self.cycle_party();
                    continue;
                }
                BattleRequest::SetGuard { battler, slot } => {
                    match self.state.battlers.get_mut(&battler) {
                        Some(guarding) => {
                            guarding.guard = slot.map(|slot| Stance {
                                slot,
                                frames: u32::MAX,
                            })
                        }
                        None => warn!(%battler, "guard request for unknown battler"),
                    }
                    continue;
                }
                BattleRequest::SetDashing { battler, dashing } => {
                    match self.state.battlers.get_mut(&battler) {
                        Some(dasher) => dasher.dashing = dashing,
                        None => warn!(%battler, "dash request for unknown battler"),
                    }
                    continue;
                }
                BattleRequest::ClearActions => {
                    self.clear_actions();
                    continue;
                }
            };

            match spawned {
                Ok(id) => report.spawned.push(id),
                Err(err) if err.severity().is_recoverable() => {
                    debug!(code = err.error_code(), "spawn request rejected: {err}")
                }
                Err(err) => warn!(code = err.error_code(), "spawn request rejected: {err}"),
            }
        }
    }
}

/// Whether `target` falls within `scope` relative to `caster`.
pub(crate) fn is_eligible(scope: SkillScope, caster: &Battler, target: &Battler) -> bool {
    if target.dying {
        return false;
    }
    match scope {
        SkillScope::Opponents => caster.team.opposes(target.team),
        SkillScope::Allies => caster.team == target.team,
        SkillScope::User => caster.id == target.id,
        SkillScope::Everyone => true,
    }
}
