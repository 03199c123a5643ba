use crate::state::{BattlerId, Position, SkillId, SlotKey};

/// Commands external layers queue for the engine.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum BattleRequest {
    /// Cast whatever `slot` resolves to (combo follow-up or equipped skill).
    UseSlot {
        caster: BattlerId,
        slot: SlotKey,
        target: Option<Position>,
    },
    /// Cast a specific skill, optionally charging a slot's cooldown.
    SpawnAction {
        caster: BattlerId,
        skill: SkillId,
        slot: Option<SlotKey>,
        target: Option<Position>,
    },
    /// Hand leadership to the next living party member.
    CycleParty,
    /// Holds (`Some`) or releases (`None`) a guard stance backed by `slot`'s
    /// guard data.
    SetGuard {
        battler: BattlerId,
        slot: Option<SlotKey>,
    },
    /// Toggles the dash flag; a dashing battler never parries.
    SetDashing {
        battler: BattlerId,
        dashing: bool,
    },
    /// Flags every live action for removal.
    ClearActions,
}
