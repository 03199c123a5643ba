//! Per-slot cooldowns, combo chains and guard data.
//!
//! Every skill slot counts down independently. A combo link overrides the
//! slot's next cast with a follow-up skill once its own counter reaches zero.
//! Staging a *new* link extends the slot's cooldown by the combo delay, so
//! chaining into a cheaper follow-up never refunds cooldown.

use std::collections::BTreeMap;

use arrayvec::ArrayVec;

use crate::config::BattleConfig;
use crate::state::{SkillId, SlotKey};

/// Follow-up staged for a slot.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ComboLink {
    pub next: SkillId,
    /// Frames until the follow-up becomes castable.
    pub frames_remaining: u32,
}

impl ComboLink {
    pub fn is_ready(&self) -> bool {
        self.frames_remaining == 0
    }
}

/// Timers of one slot.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SlotTimers {
    pub cooldown: u32,
    pub combo: Option<ComboLink>,
}

/// Which skill a slot casts next.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SlotCast {
    /// The slot's equipped skill.
    Base(SkillId),
    /// A staged combo follow-up.
    Combo(SkillId),
}

impl SlotCast {
    pub fn skill(self) -> SkillId {
        match self {
            SlotCast::Base(skill) | SlotCast::Combo(skill) => skill,
        }
    }
}

/// Cooldown and combo state of a battler, keyed by slot.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CooldownBook {
    slots: BTreeMap<SlotKey, SlotTimers>,
}

impl CooldownBook {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn timers(&self, slot: SlotKey) -> SlotTimers {
        self.slots.get(&slot).copied().unwrap_or_default()
    }

    pub fn remaining(&self, slot: SlotKey) -> u32 {
        self.timers(slot).cooldown
    }

    pub fn is_ready(&self, slot: SlotKey) -> bool {
        self.remaining(slot) == 0
    }

    pub fn combo(&self, slot: SlotKey) -> Option<ComboLink> {
        self.timers(slot).combo
    }

    /// Resolves what `slot` would cast now, given its equipped skill.
    ///
    /// A ready combo takes precedence over the base skill and ignores the
    /// base cooldown. Returns `None` while the slot is unavailable.
    pub fn next_cast(&self, slot: SlotKey, equipped: Option<SkillId>) -> Option<SlotCast> {
        let timers = self.timers(slot);
        if let Some(link) = timers.combo.filter(ComboLink::is_ready) {
            return Some(SlotCast::Combo(link.next));
        }
        match equipped {
            Some(skill) if timers.cooldown == 0 => Some(SlotCast::Base(skill)),
            _ => None,
        }
    }

    /// Puts `slot` on cooldown after casting `skill`.
    ///
    /// Unless `unique` is set or the slot is a basic-attack slot, every
    /// other slot in `equipped` holding the same skill shares the cooldown.
    pub fn apply_cooldown(
        &mut self,
        slot: SlotKey,
        skill: SkillId,
        frames: u32,
        unique: bool,
        equipped: &[(SlotKey, SkillId)],
    ) {
        self.slots.entry(slot).or_default().cooldown = frames;
        if unique || slot.is_basic_attack() {
            return;
        }
        for &(other, equipped_skill) in equipped {
            if other != slot && equipped_skill == skill {
                self.slots.entry(other).or_default().cooldown = frames;
            }
        }
    }

    /// Charges `slot` after a combo follow-up.
    ///
    /// The follow-up never shortens what is left of the base skill's
    /// cooldown: the slot keeps the longer of the two.
    pub fn hold_cooldown(&mut self, slot: SlotKey, frames: u32) {
        let timers = self.slots.entry(slot).or_default();
        timers.cooldown = timers.cooldown.max(frames);
    }

    /// Stages `next` as the follow-up of `slot`.
    ///
    /// Returns true when this is a new link, in which case the slot's
    /// cooldown was extended by `delay`. Restaging the same follow-up only
    /// refreshes the combo counter.
    pub fn stage_combo(&mut self, slot: SlotKey, next: SkillId, delay: u32) -> bool {
        let timers = self.slots.entry(slot).or_default();
        let is_new = timers.combo.map(|link| link.next) != Some(next);
        if is_new {
            timers.cooldown = timers.cooldown.saturating_add(delay);
        }
        timers.combo = Some(ComboLink {
            next,
            frames_remaining: delay,
        });
        is_new
    }

    pub fn clear_combo(&mut self, slot: SlotKey) {
        if let Some(timers) = self.slots.get_mut(&slot) {
            timers.combo = None;
        }
    }

    /// Advances every counter by one frame.
    pub fn tick(&mut self) {
        for timers in self.slots.values_mut() {
            timers.cooldown = timers.cooldown.saturating_sub(1);
            if let Some(link) = timers.combo.as_mut() {
                link.frames_remaining = link.frames_remaining.saturating_sub(1);
            }
        }
    }
}

type GuardList = ArrayVec<SkillId, { BattleConfig::MAX_GUARD_SKILLS }>;

/// Guard configuration of a single slot.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct GuardData {
    /// Skills that open a precise-parry window when cast from this slot.
    pub parry_ids: GuardList,
    /// Skills that raise a guard stance when cast from this slot.
    pub guard_ids: GuardList,
    /// Retaliation cast after a successful parry.
    pub counter_parry_ids: GuardList,
    /// Retaliation cast when struck while guarding.
    pub counter_guard_ids: GuardList,
}

impl GuardData {
    /// Builds guard data, keeping at most `MAX_GUARD_SKILLS` per list.
    pub fn new(
        parry_ids: &[SkillId],
        guard_ids: &[SkillId],
        counter_parry_ids: &[SkillId],
        counter_guard_ids: &[SkillId],
    ) -> Self {
        fn bounded(ids: &[SkillId]) -> GuardList {
            ids.iter().copied().take(BattleConfig::MAX_GUARD_SKILLS).collect()
        }
        Self {
            parry_ids: bounded(parry_ids),
            guard_ids: bounded(guard_ids),
            counter_parry_ids: bounded(counter_parry_ids),
            counter_guard_ids: bounded(counter_guard_ids),
        }
    }
}

/// Guard data of a battler, keyed by slot.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GuardBook {
    slots: BTreeMap<SlotKey, GuardData>,
}

impl GuardBook {
    pub fn set(&mut self, slot: SlotKey, data: GuardData) {
        self.slots.insert(slot, data);
    }

    pub fn get(&self, slot: SlotKey) -> Option<&GuardData> {
        self.slots.get(&slot)
    }

    pub fn opens_parry(&self, slot: SlotKey, skill: SkillId) -> bool {
        self.get(slot).is_some_and(|g| g.parry_ids.contains(&skill))
    }

    pub fn raises_guard(&self, slot: SlotKey, skill: SkillId) -> bool {
        self.get(slot).is_some_and(|g| g.guard_ids.contains(&skill))
    }

    pub fn counter_parry(&self, slot: SlotKey) -> &[SkillId] {
        self.get(slot)
            .map(|g| g.counter_parry_ids.as_slice())
            .unwrap_or_default()
    }

    pub fn counter_guard(&self, slot: SlotKey) -> &[SkillId] {
        self.get(slot)
            .map(|g| g.counter_guard_ids.as_slice())
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SLASH: SkillId = SkillId(1);
    const FOLLOW: SkillId = SkillId(2);
    const FIREBALL: SkillId = SkillId(3);

    #[test]
    fn cooldown_shared_across_slots_with_same_skill() {
        let mut book = CooldownBook::new();
        let equipped = [
            (SlotKey::Combat1, FIREBALL),
            (SlotKey::Combat2, FIREBALL),
            (SlotKey::Combat3, SLASH),
        ];

        book.apply_cooldown(SlotKey::Combat1, FIREBALL, 30, false, &equipped);

        assert_eq!(book.remaining(SlotKey::Combat1), 30);
        assert_eq!(book.remaining(SlotKey::Combat2), 30);
        assert_eq!(book.remaining(SlotKey::Combat3), 0);
    }

    #[test]
    fn follow_up_keeps_the_longer_cooldown() {
        let mut book = CooldownBook::new();
        let equipped = [(SlotKey::Main, SLASH)];
        book.apply_cooldown(SlotKey::Main, SLASH, 30, false, &equipped);

        book.hold_cooldown(SlotKey::Main, 0);
        assert_eq!(book.remaining(SlotKey::Main), 30);

        book.hold_cooldown(SlotKey::Main, 45);
        assert_eq!(book.remaining(SlotKey::Main), 45);
    }

    #[test]
    fn unique_and_basic_slots_keep_cooldown_local() {
        let mut book = CooldownBook::new();
        let equipped = [(SlotKey::Main, SLASH), (SlotKey::Combat1, SLASH)];

        book.apply_cooldown(SlotKey::Main, SLASH, 10, false, &equipped);
        assert_eq!(book.remaining(SlotKey::Combat1), 0);

        book.apply_cooldown(SlotKey::Combat1, SLASH, 20, true, &equipped);
        assert_eq!(book.remaining(SlotKey::Main), 10);
        assert_eq!(book.remaining(SlotKey::Combat1), 20);
    }

    #[test]
    fn restaging_same_combo_does_not_extend_twice() {
        let mut book = CooldownBook::new();
        book.apply_cooldown(SlotKey::Main, SLASH, 10, false, &[]);

        assert!(book.stage_combo(SlotKey::Main, FOLLOW, 6));
        assert_eq!(book.remaining(SlotKey::Main), 16);

        book.apply_cooldown(SlotKey::Main, SLASH, 10, false, &[]);
        assert!(!book.stage_combo(SlotKey::Main, FOLLOW, 6));
        assert_eq!(book.remaining(SlotKey::Main), 10);
    }

    #[test]
    fn ready_combo_overrides_base_cast() {
        let mut book = CooldownBook::new();
        book.apply_cooldown(SlotKey::Main, SLASH, 10, false, &[]);
        book.stage_combo(SlotKey::Main, FOLLOW, 2);

        assert_eq!(book.next_cast(SlotKey::Main, Some(SLASH)), None);
        book.tick();
        book.tick();
        assert_eq!(
            book.next_cast(SlotKey::Main, Some(SLASH)),
            Some(SlotCast::Combo(FOLLOW))
        );

        book.clear_combo(SlotKey::Main);
        assert_eq!(book.next_cast(SlotKey::Main, Some(SLASH)), None);
        for _ in 0..10 {
            book.tick();
        }
        assert_eq!(
            book.next_cast(SlotKey::Main, Some(SLASH)),
            Some(SlotCast::Base(SLASH))
        );
    }

    #[test]
    fn guard_lists_are_bounded() {
        let ids: Vec<SkillId> = (0..10).map(SkillId).collect();
        let data = GuardData::new(&ids, &[], &[], &[]);
        assert_eq!(data.parry_ids.len(), BattleConfig::MAX_GUARD_SKILLS);
    }
}
