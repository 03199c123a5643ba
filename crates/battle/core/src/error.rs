//! Common error infrastructure for battle-core.
//!
//! Nothing fails across a frame boundary: the engine logs and skips.
//! Errors surface only from explicit entry points (spawn requests,
//! configuration validation, snapshot decoding) and are classified by
//! [`ErrorSeverity`] so callers can decide whether to retry.

use crate::state::{BattlerId, SkillId, SlotKey};

/// Severity level of an error, used for categorization and recovery strategies.
///
/// - **Recoverable**: precondition not met yet (cooldown, cost); retry later
/// - **Validation**: invalid input, do not retry without changes
/// - **Internal**: state inconsistency that indicates a bug
/// - **Fatal**: configuration the engine cannot start with
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ErrorSeverity {
    Recoverable,
    Validation,
    Internal,
    Fatal,
}

impl ErrorSeverity {
    /// Lowercase name for logs and metrics labels.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Recoverable => "recoverable",
            Self::Validation => "validation",
            Self::Internal => "internal",
            Self::Fatal => "fatal",
        }
    }

    /// True when retrying later may succeed.
    pub const fn is_recoverable(&self) -> bool {
        matches!(self, Self::Recoverable)
    }
}

/// Common trait for all battle-core errors.
pub trait BattleError: core::fmt::Display + core::fmt::Debug {
    /// Returns the severity level of this error.
    fn severity(&self) -> ErrorSeverity;

    /// Returns a static string identifier for this error variant.
    fn error_code(&self) -> &'static str;
}

/// Reasons a spawn request is rejected. Rejection never mutates state.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SpawnError {
    /// The caster id is not registered in the battle state.
    #[error("caster {0} is not tracked by the engine")]
    CasterNotFound(BattlerId),

    /// The caster is dying or otherwise unable to act.
    #[error("caster {0} cannot act (dying or defeated)")]
    CasterIncapable(BattlerId),

    /// The skill id has no catalog definition.
    #[error("skill {0} is not defined in the catalog")]
    UnknownSkill(SkillId),

    /// Nothing is equipped in the slot and no combo is staged there.
    #[error("slot {slot} of {caster} has no skill equipped")]
    EmptySlot { caster: BattlerId, slot: SlotKey },

    /// The slot is cooling down or its combo link is not ready yet.
    #[error("slot {slot} of {caster} is cooling down ({remaining} frames)")]
    OnCooldown {
        caster: BattlerId,
        slot: SlotKey,
        remaining: u32,
    },

    /// The stats provider refused the skill cost.
    #[error("{caster} cannot pay the cost of {skill}")]
    CannotPay { caster: BattlerId, skill: SkillId },
}

impl BattleError for SpawnError {
    fn severity(&self) -> ErrorSeverity {
        match self {
            Self::OnCooldown { .. } | Self::CannotPay { .. } | Self::CasterIncapable(_) => {
                ErrorSeverity::Recoverable
            }
            Self::CasterNotFound(_) | Self::EmptySlot { .. } => ErrorSeverity::Validation,
            Self::UnknownSkill(_) => ErrorSeverity::Internal,
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::CasterNotFound(_) => "SPAWN_CASTER_NOT_FOUND",
            Self::CasterIncapable(_) => "SPAWN_CASTER_INCAPABLE",
            Self::UnknownSkill(_) => "SPAWN_UNKNOWN_SKILL",
            Self::EmptySlot { .. } => "SPAWN_EMPTY_SLOT",
            Self::OnCooldown { .. } => "SPAWN_ON_COOLDOWN",
            Self::CannotPay { .. } => "SPAWN_CANNOT_PAY",
        }
    }
}

/// Configuration the engine refuses to start with.
#[derive(Clone, Debug, PartialEq, thiserror::Error)]
pub enum ConfigError {
    /// AI would never be updated.
    #[error("ai_update_radius must be greater than zero")]
    ZeroUpdateRadius,

    /// Actions could expire before their first collision pass.
    #[error("min_action_lifetime must be at least one frame")]
    ZeroActionLifetime,

    /// A coefficient or tolerance is negative, NaN or infinite.
    #[error("{field} must be a finite non-negative number (got {value})")]
    NegativeValue { field: &'static str, value: f64 },

    /// An enabled lookup table has no entry for unmatched inputs.
    #[error("conditional table '{table}' has no fallback entry")]
    MissingFallback { table: &'static str },

    /// A reward band whose bounds are reversed.
    #[error("scaling band has min_diff {min_diff} above max_diff {max_diff}")]
    InvertedBand { min_diff: i32, max_diff: i32 },
}

impl BattleError for ConfigError {
    fn severity(&self) -> ErrorSeverity {
        ErrorSeverity::Fatal
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::ZeroUpdateRadius => "CONFIG_ZERO_RADIUS",
            Self::ZeroActionLifetime => "CONFIG_ZERO_LIFETIME",
            Self::NegativeValue { .. } => "CONFIG_NEGATIVE_VALUE",
            Self::MissingFallback { .. } => "CONFIG_MISSING_FALLBACK",
            Self::InvertedBand { .. } => "CONFIG_INVERTED_BAND",
        }
    }
}

/// Snapshot encode/decode failures.
#[cfg(feature = "serde")]
#[derive(Debug, thiserror::Error)]
pub enum SnapshotError {
    /// Serializing the state failed.
    #[error("failed to encode battle snapshot: {0}")]
    Encode(#[source] bincode::Error),

    /// The bytes are not a valid snapshot.
    #[error("failed to decode battle snapshot: {0}")]
    Decode(#[source] bincode::Error),
}

#[cfg(feature = "serde")]
impl BattleError for SnapshotError {
    fn severity(&self) -> ErrorSeverity {
        match self {
            Self::Encode(_) => ErrorSeverity::Internal,
            Self::Decode(_) => ErrorSeverity::Validation,
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::Encode(_) => "SNAPSHOT_ENCODE",
            Self::Decode(_) => "SNAPSHOT_DECODE",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cooldown_rejection_is_recoverable() {
        let err = SpawnError::OnCooldown {
            caster: BattlerId(1),
            slot: SlotKey::Main,
            remaining: 4,
        };
        assert!(err.severity().is_recoverable());
        assert_eq!(err.error_code(), "SPAWN_ON_COOLDOWN");
        assert_eq!(
            err.to_string(),
            "slot Main of #1 is cooling down (4 frames)"
        );
    }

    #[test]
    fn config_errors_are_fatal() {
        let err = ConfigError::MissingFallback { table: "x" };
        assert_eq!(err.severity(), ErrorSeverity::Fatal);
    }
}
