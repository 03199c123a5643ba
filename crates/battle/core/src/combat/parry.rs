//! Parry roll.
//!
//! ```text
//! parried = random + hit * hit_factor < grd - grd_offset - ignore_parry
//! ```
//!
//! A defender with a GRD of zero or less can never parry, not even inside
//! a precise-parry window.

use crate::config::ParryConfig;
use crate::env::SkillDefinition;
use crate::state::Battler;

/// How a parry check was settled.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ParryOutcome {
    /// The skill or the defender's stance bypassed the check.
    Bypassed,
    /// The defender's precise-parry window was open.
    Precise,
    /// The roll was made; `parried` is its result.
    Rolled { parried: bool },
    /// The defender has no guard rate, so no parry of any kind.
    NoGuard,
}

impl ParryOutcome {
    /// True when the hit was turned aside.
    pub fn parried(self) -> bool {
        matches!(
            self,
            ParryOutcome::Precise | ParryOutcome::Rolled { parried: true }
        )
    }
}

/// Unparryable skills and dashing defenders skip the parry check.
pub fn bypasses_parry(skill: &SkillDefinition, target: &Battler) -> bool {
    skill.is_unparryable() || target.is_dashing()
}

/// Attacker side of the comparison.
pub fn hit_roll(config: &ParryConfig, random: f64, caster_hit: f64) -> f64 {
    random + config.hit_factor * caster_hit
}

/// Defender side of the comparison.
pub fn parry_rate(config: &ParryConfig, target_grd: f64, ignore_parry: f64) -> f64 {
    target_grd - config.grd_offset - ignore_parry
}

/// Deterministic given `random`; always false for a GRD of zero.
pub fn roll_parry(
    config: &ParryConfig,
    random: f64,
    caster_hit: f64,
    target_grd: f64,
    ignore_parry: f64,
) -> bool {
    if target_grd <= 0.0 {
        return false;
    }
    hit_roll(config, random, caster_hit) < parry_rate(config, target_grd, ignore_parry)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::{BattlerId, BattlerKind, Position, SkillId};

    #[test]
    fn high_guard_parries_weak_hit() {
        let config = ParryConfig::default();
        // 0.4 + 0.02 = 0.42 < 1.5 - 1.0 = 0.5
        assert!(roll_parry(&config, 0.4, 0.2, 1.5, 0.0));
        // ignore_parry pushes the rate below the roll
        assert!(!roll_parry(&config, 0.4, 0.2, 1.5, 0.1));
    }

    #[test]
    fn zero_guard_never_parries() {
        let config = ParryConfig {
            grd_offset: -5.0,
            ..ParryConfig::default()
        };
        for random in [0.0, 0.25, 0.5, 0.99] {
            assert!(!roll_parry(&config, random, 0.0, 0.0, 0.0));
        }
    }

    #[test]
    fn dashing_targets_bypass() {
        let skill = SkillDefinition::new(SkillId(1), "Slash");
        let mut target = Battler::new(BattlerId(2), BattlerKind::Enemy, Position::ORIGIN);
        assert!(!bypasses_parry(&skill, &target));
        target.dashing = true;
        assert!(bypasses_parry(&skill, &target));
    }

    #[test]
    fn outcome_reports_parried() {
        assert!(ParryOutcome::Precise.parried());
        assert!(!ParryOutcome::Bypassed.parried());
        assert!(!ParryOutcome::Rolled { parried: false }.parried());
    }
}
