//! Aggro produced by a resolved skill.

use crate::config::AggroConfig;
use crate::env::{SkillDefinition, SkillFlags, SkillResult};

/// Multipliers gathered from the two battlers involved.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AggroModifiers {
    /// Product of the caster's tracked states' `aggro_out`.
    pub caster_out: f64,
    /// Product of the target's tracked states' `aggro_in`.
    pub target_in: f64,
    /// Caster's TGR stat.
    pub caster_tgr: f64,
    /// The caster is the player-controlled leader.
    pub from_player: bool,
}

impl Default for AggroModifiers {
    fn default() -> Self {
        Self {
            caster_out: 1.0,
            target_in: 1.0,
            caster_tgr: 1.0,
            from_player: false,
        }
    }
}

/// Aggro the target gains toward the caster for a non-parried resolution.
///
/// Healing counts like damage. Misses still produce the base amount.
pub fn hit_aggro(
    config: &AggroConfig,
    skill: &SkillDefinition,
    result: &SkillResult,
    modifiers: AggroModifiers,
) -> f64 {
    let hp = f64::from(result.hp_damage.unsigned_abs());
    let mp = f64::from(result.mp_damage.unsigned_abs());
    let tp = f64::from(result.tp_damage.unsigned_abs());
    let drained = result.drained || skill.flags.contains(SkillFlags::DRAIN);

    let mut aggro = config.base + hp * config.hp_factor + mp * config.mp_factor + tp * config.tp_factor;
    if drained {
        aggro += hp * config.drain_factor;
    }
    aggro += skill.bonus_aggro;
    aggro *= skill.aggro_multiplier;
    aggro *= modifiers.caster_out;
    aggro *= modifiers.target_in;
    aggro *= modifiers.caster_tgr;
    if modifiers.from_player {
        aggro *= config.player_dampening;
    }
    aggro.max(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::SkillId;

    fn damage(hp: i32, mp: i32, tp: i32) -> SkillResult {
        SkillResult {
            hp_damage: hp,
            mp_damage: mp,
            tp_damage: tp,
            ..SkillResult::default()
        }
    }

    #[test]
    fn formula_matches_coefficients() {
        let config = AggroConfig::default();
        let skill = SkillDefinition::new(SkillId(1), "Slash");
        // 10 + 20*1 + 3*2 + 1*5
        let value = hit_aggro(&config, &skill, &damage(20, 3, 1), AggroModifiers::default());
        assert_eq!(value, 41.0);
    }

    #[test]
    fn bonus_then_multipliers() {
        let config = AggroConfig::default();
        let mut skill = SkillDefinition::new(SkillId(1), "Taunt");
        skill.bonus_aggro = 30.0;
        skill.aggro_multiplier = 2.0;
        let modifiers = AggroModifiers {
            caster_out: 1.5,
            target_in: 1.0,
            caster_tgr: 2.0,
            from_player: true,
        };
        // (10 + 30) * 2 * 1.5 * 2 * 0.5
        let value = hit_aggro(&config, &skill, &SkillResult::default(), modifiers);
        assert_eq!(value, 120.0);
    }

    #[test]
    fn drain_adds_extra_hp_term() {
        let config = AggroConfig::default();
        let skill = SkillDefinition::new(SkillId(1), "Leech");
        let mut result = damage(10, 0, 0);
        result.drained = true;
        // 10 + 10 + 10*1.5
        assert_eq!(hit_aggro(&config, &skill, &result, AggroModifiers::default()), 35.0);
    }
}
