//! Result descriptors for the popup and narration collaborators.
//!
//! Builders here are pure: they read a resolution and return descriptors,
//! leaving combat state untouched.

use std::fmt;

use crate::env::SkillResult;
use crate::state::{BattlerId, ItemId, StateId};

/// What a popup shows.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum PopupKind {
    /// HP lost by the anchor battler.
    Damage { amount: i32, critical: bool },
    /// HP restored; `amount` is positive.
    Heal { amount: i32 },
    MpDamage { amount: i32 },
    TpDamage { amount: i32 },
    Parry,
    Miss,
    Evade,
    StateAdded(StateId),
    Defeated,
    /// Experience earned by a kill, shown on the killer.
    Experience(u32),
    Gold(u32),
    LevelUp,
    Loot(ItemId),
}

/// A popup anchored on a battler.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PopupDescriptor {
    pub battler: BattlerId,
    pub kind: PopupKind,
}

impl PopupDescriptor {
    pub fn new(battler: BattlerId, kind: PopupKind) -> Self {
        Self { battler, kind }
    }
}

/// One line of combat narration.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum LogEntry {
    Hit {
        caster: BattlerId,
        target: BattlerId,
        skill: String,
        damage: i32,
        critical: bool,
    },
    Healed {
        caster: BattlerId,
        target: BattlerId,
        skill: String,
        amount: i32,
    },
    Parried {
        caster: BattlerId,
        target: BattlerId,
        skill: String,
    },
    Missed {
        caster: BattlerId,
        target: BattlerId,
        skill: String,
    },
    Evaded {
        caster: BattlerId,
        target: BattlerId,
        skill: String,
    },
    StateApplied {
        target: BattlerId,
        state: StateId,
    },
    Retaliated {
        battler: BattlerId,
        skill: String,
    },
    Defeated {
        battler: BattlerId,
        killer: Option<BattlerId>,
    },
    Rewards {
        exp: u32,
        gold: u32,
    },
    LevelUp {
        battler: BattlerId,
    },
    Looted {
        item: ItemId,
    },
}

impl fmt::Display for LogEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogEntry::Hit {
                caster,
                target,
                skill,
                damage,
                critical,
            } => {
                write!(f, "{caster} hits {target} with {skill} for {damage} damage")?;
                if *critical {
                    f.write_str(" (critical)")?;
                }
                Ok(())
            }
            LogEntry::Healed {
                caster,
                target,
                skill,
                amount,
            } => write!(f, "{caster} restores {amount} HP to {target} with {skill}"),
            LogEntry::Parried {
                caster,
                target,
                skill,
            } => write!(f, "{target} parries {skill} from {caster}"),
            LogEntry::Missed {
                caster,
                target,
                skill,
            } => write!(f, "{caster}'s {skill} misses {target}"),
            LogEntry::Evaded {
                caster,
                target,
                skill,
            } => write!(f, "{target} evades {skill} from {caster}"),
            LogEntry::StateApplied { target, state } => {
                write!(f, "{target} is afflicted with state {}", state.0)
            }
            LogEntry::Retaliated { battler, skill } => {
                write!(f, "{battler} retaliates with {skill}")
            }
            LogEntry::Defeated {
                battler,
                killer: Some(killer),
            } => write!(f, "{battler} was defeated by {killer}"),
            LogEntry::Defeated {
                battler,
                killer: None,
            } => write!(f, "{battler} was defeated"),
            LogEntry::Rewards { exp, gold } => {
                write!(f, "the party gains {exp} experience and {gold} gold")
            }
            LogEntry::LevelUp { battler } => write!(f, "{battler} reached a new level"),
            LogEntry::Looted { item } => write!(f, "picked up item {}", item.0),
        }
    }
}

/// Popups for one resolution, anchored on the target.
pub fn skill_popups(target: BattlerId, result: &SkillResult, parried: bool) -> Vec<PopupDescriptor> {
    let popup = |kind| PopupDescriptor::new(target, kind);
    if parried {
        return vec![popup(PopupKind::Parry)];
    }
    if result.missed {
        return vec![popup(PopupKind::Miss)];
    }
    if result.evaded {
        return vec![popup(PopupKind::Evade)];
    }

    let mut popups = Vec::new();
    match result.hp_damage {
        amount if amount > 0 => popups.push(popup(PopupKind::Damage {
            amount,
            critical: result.critical,
        })),
        amount if amount < 0 => popups.push(popup(PopupKind::Heal { amount: -amount })),
        _ => {}
    }
    if result.mp_damage != 0 {
        popups.push(popup(PopupKind::MpDamage {
            amount: result.mp_damage,
        }));
    }
    if result.tp_damage != 0 {
        popups.push(popup(PopupKind::TpDamage {
            amount: result.tp_damage,
        }));
    }
    popups.extend(
        result
            .added_states
            .iter()
            .map(|&state| popup(PopupKind::StateAdded(state))),
    );
    popups
}

/// Narration for one resolution.
pub fn skill_narration(
    caster: BattlerId,
    target: BattlerId,
    skill: &str,
    result: &SkillResult,
    parried: bool,
) -> Vec<LogEntry> {
    let skill = skill.to_owned();
    if parried {
        return vec![LogEntry::Parried {
            caster,
            target,
            skill,
        }];
    }
    if result.missed {
        return vec![LogEntry::Missed {
            caster,
            target,
            skill,
        }];
    }
    if result.evaded {
        return vec![LogEntry::Evaded {
            caster,
            target,
            skill,
        }];
    }

    let mut entries = vec![if result.hp_damage < 0 {
        LogEntry::Healed {
            caster,
            target,
            skill,
            amount: -result.hp_damage,
        }
    } else {
        LogEntry::Hit {
            caster,
            target,
            skill,
            damage: result.hp_damage,
            critical: result.critical,
        }
    }];
    entries.extend(
        result
            .added_states
            .iter()
            .map(|&state| LogEntry::StateApplied { target, state }),
    );
    entries
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parry_suppresses_damage_popups() {
        let result = SkillResult {
            hp_damage: 30,
            ..SkillResult::default()
        };
        let popups = skill_popups(BattlerId(2), &result, true);
        assert_eq!(popups, vec![PopupDescriptor::new(BattlerId(2), PopupKind::Parry)]);
    }

    #[test]
    fn damage_and_states() {
        let result = SkillResult {
            hp_damage: 12,
            critical: true,
            added_states: vec![StateId(3)],
            ..SkillResult::default()
        };
        let popups = skill_popups(BattlerId(2), &result, false);
        assert_eq!(popups.len(), 2);
        assert_eq!(
            popups[0].kind,
            PopupKind::Damage {
                amount: 12,
                critical: true
            }
        );

        let log = skill_narration(BattlerId(1), BattlerId(2), "Slash", &result, false);
        assert_eq!(log[0].to_string(), "#1 hits #2 with Slash for 12 damage (critical)");
        assert_eq!(log[1], LogEntry::StateApplied {
            target: BattlerId(2),
            state: StateId(3)
        });
    }

    #[test]
    fn negative_hp_is_healing() {
        let result = SkillResult {
            hp_damage: -8,
            ..SkillResult::default()
        };
        let popups = skill_popups(BattlerId(4), &result, false);
        assert_eq!(popups[0].kind, PopupKind::Heal { amount: 8 });
        let log = skill_narration(BattlerId(4), BattlerId(4), "Mend", &result, false);
        assert_eq!(log[0].to_string(), "#4 restores 8 HP to #4 with Mend");
    }
}
