//! Tunable battle constants.
//!
//! Every numeric design value of the engine (aggro coefficients, parry
//! constants, radii, timers) lives here so a game can retune them without
//! touching the pipeline. [`BattleConfig::validate`] is the single startup
//! gate for configuration that cannot be recovered from at runtime.

use crate::error::ConfigError;
use crate::state::SlotKey;

/// Coefficients of the aggro formula.
///
/// ```text
/// aggro = base + hp*hp_factor + mp*mp_factor + tp*tp_factor (+ hp*drain_factor)
/// ```
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct AggroConfig {
    pub base: f64,
    pub hp_factor: f64,
    pub mp_factor: f64,
    pub tp_factor: f64,
    pub drain_factor: f64,
    /// Aggro removed from the defender's entry for an attacker it parried.
    pub parry_penalty: f64,
    /// Aggro the attacker gains toward a defender that parried it.
    pub parry_bonus: f64,
    /// Multiplier applied to aggro produced by the player-controlled battler.
    pub player_dampening: f64,
}

impl Default for AggroConfig {
    fn default() -> Self {
        Self {
            base: 10.0,
            hp_factor: 1.0,
            mp_factor: 2.0,
            tp_factor: 5.0,
            drain_factor: 1.5,
            parry_penalty: 50.0,
            parry_bonus: 25.0,
            player_dampening: 0.5,
        }
    }
}

/// Constants of the parry roll: `random + hit*hit_factor < grd - grd_offset - ignore`.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ParryConfig {
    pub hit_factor: f64,
    pub grd_offset: f64,
    /// Frames a precise-parry stance stays open after casting a parry skill.
    pub precise_window: u32,
}

impl Default for ParryConfig {
    fn default() -> Self {
        Self {
            hit_factor: 0.1,
            grd_offset: 1.0,
            precise_window: 12,
        }
    }
}

/// One band of the level-difference reward curve.
///
/// `diff` is `target_level - caster_level`; the band applies when
/// `min_diff <= diff <= max_diff`.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ScalingBand {
    pub min_diff: i32,
    pub max_diff: i32,
    pub multiplier: f64,
}

/// Reward scaling table. When enabled it must define a fallback multiplier
/// for level differences no band covers.
#[derive(Clone, Debug, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct RewardScalingConfig {
    pub enabled: bool,
    pub bands: Vec<ScalingBand>,
    pub fallback: Option<f64>,
}

/// Battle configuration constants and tunable parameters.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct BattleConfig {
    /// AI battlers farther than this (Chebyshev tiles) from the leader are
    /// not updated during a frame.
    pub ai_update_radius: u32,
    /// Frames an alerted battler stays alerted without new stimulus.
    pub alert_duration: u32,
    /// Active frames an action must live before it can be flagged for removal.
    pub min_action_lifetime: u32,
    /// Frames a dropped pickup stays on the map.
    pub loot_expiration: u32,
    /// Half-width of the axis band used by line, wall and cross shapes.
    pub axis_tolerance: f64,
    /// Slot whose skill fires when an auto-counter roll succeeds.
    pub auto_counter_slot: SlotKey,
    pub aggro: AggroConfig,
    pub parry: ParryConfig,
    pub reward_scaling: RewardScalingConfig,
}

impl BattleConfig {
    // ===== compile-time constants =====
    /// Maximum skills listed per guard category of a single slot.
    pub const MAX_GUARD_SKILLS: usize = 4;

    // ===== runtime-tunable defaults =====
    pub const DEFAULT_AI_UPDATE_RADIUS: u32 = 20;
    pub const DEFAULT_ALERT_DURATION: u32 = 300;
    pub const DEFAULT_MIN_ACTION_LIFETIME: u32 = 1;
    pub const DEFAULT_LOOT_EXPIRATION: u32 = 1800;
    pub const DEFAULT_AXIS_TOLERANCE: f64 = 0.5;

    pub fn new() -> Self {
        Self {
            ai_update_radius: Self::DEFAULT_AI_UPDATE_RADIUS,
            alert_duration: Self::DEFAULT_ALERT_DURATION,
            min_action_lifetime: Self::DEFAULT_MIN_ACTION_LIFETIME,
            loot_expiration: Self::DEFAULT_LOOT_EXPIRATION,
            axis_tolerance: Self::DEFAULT_AXIS_TOLERANCE,
            auto_counter_slot: SlotKey::Main,
            aggro: AggroConfig::default(),
            parry: ParryConfig::default(),
            reward_scaling: RewardScalingConfig::default(),
        }
    }

    pub fn with_ai_update_radius(mut self, radius: u32) -> Self {
        self.ai_update_radius = radius;
        self
    }

    /// Rejects configuration the engine cannot run with.
    ///
    /// Called once before combat begins; every error here is fatal.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.ai_update_radius == 0 {
            return Err(ConfigError::ZeroUpdateRadius);
        }
        if self.min_action_lifetime == 0 {
            return Err(ConfigError::ZeroActionLifetime);
        }
        if self.axis_tolerance < 0.0 {
            return Err(ConfigError::NegativeValue {
                field: "axis_tolerance",
                value: self.axis_tolerance,
            });
        }

        let aggro = &self.aggro;
        for (field, value) in [
            ("aggro.base", aggro.base),
            ("aggro.hp_factor", aggro.hp_factor),
            ("aggro.mp_factor", aggro.mp_factor),
            ("aggro.tp_factor", aggro.tp_factor),
            ("aggro.drain_factor", aggro.drain_factor),
            ("aggro.parry_penalty", aggro.parry_penalty),
            ("aggro.parry_bonus", aggro.parry_bonus),
            ("aggro.player_dampening", aggro.player_dampening),
            ("parry.hit_factor", self.parry.hit_factor),
        ] {
            if value < 0.0 || !value.is_finite() {
                return Err(ConfigError::NegativeValue { field, value });
            }
        }

        let scaling = &self.reward_scaling;
        if scaling.enabled {
            if scaling.fallback.is_none() {
                return Err(ConfigError::MissingFallback {
                    table: "reward_scaling",
                });
            }
            if let Some(band) = scaling.bands.iter().find(|b| b.min_diff > b.max_diff) {
                return Err(ConfigError::InvertedBand {
                    min_diff: band.min_diff,
                    max_diff: band.max_diff,
                });
            }
        }

        Ok(())
    }
}

impl Default for BattleConfig {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        assert!(BattleConfig::default().validate().is_ok());
    }

    #[test]
    fn enabled_scaling_without_fallback_is_fatal() {
        let mut config = BattleConfig::default();
        config.reward_scaling.enabled = true;
        config.reward_scaling.bands.push(ScalingBand {
            min_diff: 5,
            max_diff: 99,
            multiplier: 1.5,
        });

        let err = config.validate().unwrap_err();
        assert_eq!(
            err,
            ConfigError::MissingFallback {
                table: "reward_scaling"
            }
        );
    }

    #[test]
    fn zero_radius_is_rejected() {
        let config = BattleConfig::default().with_ai_update_radius(0);
        assert_eq!(config.validate(), Err(ConfigError::ZeroUpdateRadius));
    }

    #[test]
    fn zero_action_lifetime_is_rejected() {
        let mut config = BattleConfig::default();
        config.min_action_lifetime = 0;
        assert_eq!(config.validate(), Err(ConfigError::ZeroActionLifetime));
    }

    #[test]
    fn negative_coefficient_is_rejected() {
        let mut config = BattleConfig::default();
        config.aggro.tp_factor = -1.0;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::NegativeValue {
                field: "aggro.tp_factor",
                ..
            })
        ));
    }
}
