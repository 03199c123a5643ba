//! Skill and state definitions.
//!
//! The engine reads skill data (shape, timers, flags, combo links) and
//! state data (duration, aggro amplifiers) through [`CatalogOracle`].
//! [`Catalog`] is the in-memory implementation loaded by `battle-content`.

use std::collections::BTreeMap;

use crate::geometry::CollisionShape;
use crate::state::{SkillId, StateId};

/// Oracle providing skill and state definitions.
pub trait CatalogOracle {
    fn skill(&self, id: SkillId) -> Option<&SkillDefinition>;

    fn state(&self, id: StateId) -> Option<&StateDefinition>;
}

bitflags::bitflags! {
    /// Behaviour switches of a skill.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
    #[cfg_attr(feature = "serde", serde(transparent))]
    pub struct SkillFlags: u8 {
        /// Skips shape geometry and tests distance to the caster instead.
        const DIRECT = 1 << 0;
        /// Can never be parried.
        const UNPARRYABLE = 1 << 1;
        /// Cooldown stays on the casting slot only.
        const UNIQUE_COOLDOWN = 1 << 2;
        /// Fires early when an eligible target touches it while delaying.
        const TOUCH_TRIGGER = 1 << 3;
        /// HP damage counts as drained for aggro purposes.
        const DRAIN = 1 << 4;
    }
}

/// Which battlers an action may resolve against, relative to its caster.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, strum::Display)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SkillScope {
    #[default]
    Opponents,
    Allies,
    /// Only the caster itself.
    User,
    Everyone,
}

/// Piercing budget of an action: how many hits and the frames between them.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PiercingSpec {
    pub hits: u32,
    pub delay: u32,
}

impl Default for PiercingSpec {
    fn default() -> Self {
        Self { hits: 1, delay: 0 }
    }
}

/// Follow-up staged in the casting slot after a hit.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ComboSpec {
    pub next: SkillId,
    pub delay: u32,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ProjectileSpec {
    pub frames_per_tile: u32,
}

/// Everything the engine needs to know about a skill.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct SkillDefinition {
    pub id: SkillId,
    pub name: String,
    pub shape: CollisionShape,
    pub range: f64,
    /// Reach of a direct action around its caster.
    pub proximity: f64,
    /// Frames before the action becomes active.
    pub delay: u32,
    /// Active frames.
    pub duration: u32,
    pub piercing: PiercingSpec,
    /// Frames the casting slot stays unavailable.
    pub cooldown: u32,
    pub flags: SkillFlags,
    /// Subtracted from the defender's parry rate.
    pub ignore_parry: f64,
    pub bonus_aggro: f64,
    pub aggro_multiplier: f64,
    pub combo: Option<ComboSpec>,
    /// Tiles of knockback before resistance.
    pub knockback: u32,
    pub scope: SkillScope,
    pub projectile: Option<ProjectileSpec>,
}

impl SkillDefinition {
    pub fn new(id: SkillId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn is_direct(&self) -> bool {
        self.flags.contains(SkillFlags::DIRECT)
    }

    pub fn is_unparryable(&self) -> bool {
        self.flags.contains(SkillFlags::UNPARRYABLE)
    }
}

impl Default for SkillDefinition {
    fn default() -> Self {
        Self {
            id: SkillId(0),
            name: String::new(),
            shape: CollisionShape::Circle,
            range: 1.0,
            proximity: 1.0,
            delay: 0,
            duration: 1,
            piercing: PiercingSpec::default(),
            cooldown: 0,
            flags: SkillFlags::empty(),
            ignore_parry: 0.0,
            bonus_aggro: 0.0,
            aggro_multiplier: 1.0,
            combo: None,
            knockback: 0,
            scope: SkillScope::Opponents,
            projectile: None,
        }
    }
}

/// A timed status affliction.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct StateDefinition {
    pub id: StateId,
    pub name: String,
    /// Frames the affliction lasts once applied.
    pub duration: u32,
    /// Multiplies aggro the afflicted battler generates.
    pub aggro_out: f64,
    /// Multiplies aggro generated against the afflicted battler.
    pub aggro_in: f64,
}

impl Default for StateDefinition {
    fn default() -> Self {
        Self {
            id: StateId(0),
            name: String::new(),
            duration: 0,
            aggro_out: 1.0,
            aggro_in: 1.0,
        }
    }
}

/// In-memory catalog keyed by id.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Catalog {
    skills: BTreeMap<SkillId, SkillDefinition>,
    states: BTreeMap<StateId, StateDefinition>,
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_skill(&mut self, skill: SkillDefinition) -> Option<SkillDefinition> {
        self.skills.insert(skill.id, skill)
    }

    pub fn insert_state(&mut self, state: StateDefinition) -> Option<StateDefinition> {
        self.states.insert(state.id, state)
    }

    pub fn with_skill(mut self, skill: SkillDefinition) -> Self {
        self.insert_skill(skill);
        self
    }

    pub fn with_state(mut self, state: StateDefinition) -> Self {
        self.insert_state(state);
        self
    }

    pub fn skills(&self) -> impl Iterator<Item = &SkillDefinition> {
        self.skills.values()
    }

    pub fn states(&self) -> impl Iterator<Item = &StateDefinition> {
        self.states.values()
    }
}

impl CatalogOracle for Catalog {
    fn skill(&self, id: SkillId) -> Option<&SkillDefinition> {
        self.skills.get(&id)
    }

    fn state(&self, id: StateId) -> Option<&StateDefinition> {
        self.states.get(&id)
    }
}
