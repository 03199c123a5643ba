//! Deterministic real-time action combat over a tile map.
//!
//! `battle-core` turns skill use into live actions, tests their collision
//! shapes against battlers every frame and resolves each contact through the
//! combat pipeline (parry, skill effect, combo, knockback, aggro,
//! retaliation, defeat and rewards). All state mutation flows through
//! [`engine::BattleEngine`]; the stat system, skill data, map and optional
//! output collaborators are reached through the [`env::World`] context.
pub mod combat;
pub mod config;
pub mod engine;
pub mod env;
pub mod error;
pub mod geometry;
pub mod state;

pub use combat::{LogEntry, PopupDescriptor, PopupKind};
pub use config::{AggroConfig, BattleConfig, ParryConfig, RewardScalingConfig, ScalingBand};
pub use engine::{BattleEngine, BattleRequest, FrameReport, HitRecord};
pub use env::{
    BattlerStats, Catalog, CatalogOracle, CombatLog, DropEntry, FlatScaling, GridMap,
    LevelBandScaling, MapOracle, PcgRng, PopupSink, RetaliationChance, RewardScaling, RngOracle,
    SkillDefinition, SkillFlags, SkillResult, SkillScope, StateDefinition, StatsOracle, World,
};
pub use error::{BattleError, ConfigError, ErrorSeverity, SpawnError};
pub use geometry::{CollisionShape, Hitbox, Separation, collides};
pub use state::{
    Action, ActionId, AggroTable, BattleState, Battler, BattlerId, BattlerKind, CooldownBook,
    Direction, EngagementState, GuardData, ItemId, Pickup, PickupId, Position, SkillId, SlotKey,
    StateId, Team, TrackedState, TrackedStates,
};
