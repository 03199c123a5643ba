//! Map-side combat wrapper around a character.
//!
//! A [`Battler`] carries everything the engine tracks per combatant:
//! position, team, engagement, aggro, cooldowns, guard data and stances.
//! Numeric stats stay with the external stats provider and are looked up
//! by [`BattlerId`].

use crate::state::{
    AggroTable, BattlerId, CooldownBook, Direction, GuardBook, GuardData, Position, SlotKey, Team,
};

/// Which kind of character a battler wraps.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum BattlerKind {
    /// The party leader, driven by player input.
    Player,
    /// A party follower.
    Ally,
    Enemy,
}

impl BattlerKind {
    pub const fn default_team(self) -> Team {
        match self {
            BattlerKind::Player | BattlerKind::Ally => Team::Party,
            BattlerKind::Enemy => Team::Enemy,
        }
    }

    /// True for battlers whose decisions come from the AI collaborator.
    pub const fn is_ai_controlled(self) -> bool {
        !matches!(self, BattlerKind::Player)
    }
}

/// Engagement of an AI battler with its surroundings.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, strum::Display)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum EngagementState {
    #[default]
    Idle,
    /// Woken by an out-of-range hit; investigating `AlertState::origin`.
    Alerted,
    /// Fighting a target within pursuit range.
    Engaged,
}

/// Countdown of an alerted battler.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AlertState {
    pub counter: u32,
    pub origin: Option<Position>,
}

/// A timed stance raised by casting a guard or parry skill from `slot`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Stance {
    pub slot: SlotKey,
    pub frames: u32,
}

impl Stance {
    fn tick(stance: &mut Option<Stance>) {
        if let Some(active) = stance {
            active.frames = active.frames.saturating_sub(1);
            if active.frames == 0 {
                *stance = None;
            }
        }
    }
}

/// A combat-capable entity tracked by the engine.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Battler {
    pub(crate) id: BattlerId,
    pub(crate) kind: BattlerKind,
    pub(crate) team: Team,
    pub(crate) position: Position,
    pub(crate) facing: Direction,
    pub(crate) inanimate: bool,
    pub(crate) engagement: EngagementState,
    pub(crate) target: Option<BattlerId>,
    pub(crate) alert: AlertState,
    pub(crate) sight_range: u32,
    pub(crate) pursuit_range: u32,
    pub(crate) aggro: AggroTable,
    pub(crate) cooldowns: CooldownBook,
    pub(crate) guard_data: GuardBook,
    pub(crate) guard: Option<Stance>,
    pub(crate) parry_window: Option<Stance>,
    pub(crate) dashing: bool,
    pub(crate) leader: Option<BattlerId>,
    pub(crate) dying: bool,
}

impl Battler {
    pub const DEFAULT_SIGHT_RANGE: u32 = 4;
    pub const DEFAULT_PURSUIT_RANGE: u32 = 8;

    pub fn new(id: BattlerId, kind: BattlerKind, position: Position) -> Self {
        Self {
            id,
            kind,
            team: kind.default_team(),
            position,
            facing: Direction::Down,
            inanimate: false,
            engagement: EngagementState::Idle,
            target: None,
            alert: AlertState::default(),
            sight_range: Self::DEFAULT_SIGHT_RANGE,
            pursuit_range: Self::DEFAULT_PURSUIT_RANGE,
            aggro: AggroTable::new(),
            cooldowns: CooldownBook::new(),
            guard_data: GuardBook::default(),
            guard: None,
            parry_window: None,
            dashing: false,
            leader: None,
            dying: false,
        }
    }

    pub fn with_team(mut self, team: Team) -> Self {
        self.team = team;
        self
    }

    pub fn with_facing(mut self, facing: Direction) -> Self {
        self.facing = facing;
        self
    }

    pub fn with_ranges(mut self, sight: u32, pursuit: u32) -> Self {
        self.sight_range = sight;
        self.pursuit_range = pursuit.max(sight);
        self
    }

    pub fn with_guard(mut self, slot: SlotKey, data: GuardData) -> Self {
        self.guard_data.set(slot, data);
        self
    }

    pub fn with_leader(mut self, leader: BattlerId) -> Self {
        self.leader = Some(leader);
        self
    }

    /// Seeds aggro toward `opponent` (restoring a saved encounter).
    pub fn with_aggro(mut self, opponent: BattlerId, value: f64) -> Self {
        self.aggro.adjust(opponent, value);
        self
    }

    /// Marks the battler as an inanimate object (crates, totems).
    pub fn inanimate(mut self) -> Self {
        self.inanimate = true;
        self
    }

    pub fn id(&self) -> BattlerId {
        self.id
    }

    pub fn kind(&self) -> BattlerKind {
        self.kind
    }

    pub fn team(&self) -> Team {
        self.team
    }

    pub fn position(&self) -> Position {
        self.position
    }

    pub fn facing(&self) -> Direction {
        self.facing
    }

    pub fn is_inanimate(&self) -> bool {
        self.inanimate
    }

    pub fn engagement(&self) -> EngagementState {
        self.engagement
    }

    /// Opponent an engaged battler is fighting.
    pub fn target(&self) -> Option<BattlerId> {
        self.target
    }

    pub fn alert(&self) -> AlertState {
        self.alert
    }

    pub fn aggro(&self) -> &AggroTable {
        &self.aggro
    }

    pub fn cooldowns(&self) -> &CooldownBook {
        &self.cooldowns
    }

    pub fn guard_data(&self) -> &GuardBook {
        &self.guard_data
    }

    pub fn guard_stance(&self) -> Option<Stance> {
        self.guard
    }

    pub fn parry_window(&self) -> Option<Stance> {
        self.parry_window
    }

    pub fn is_guarding(&self) -> bool {
        self.guard.is_some()
    }

    pub fn is_dashing(&self) -> bool {
        self.dashing
    }

    pub fn leader(&self) -> Option<BattlerId> {
        self.leader
    }

    pub fn is_dying(&self) -> bool {
        self.dying
    }

    /// Can act and be acted upon.
    pub fn is_capable(&self) -> bool {
        !self.dying && !self.inanimate
    }

    /// Raises (or refreshes) an alert toward `origin`.
    pub(crate) fn raise_alert(&mut self, origin: Position, duration: u32) {
        if self.engagement == EngagementState::Engaged {
            return;
        }
        self.engagement = EngagementState::Alerted;
        self.alert = AlertState {
            counter: duration,
            origin: Some(origin),
        };
    }

    pub(crate) fn engage(&mut self, target: BattlerId) {
        self.engagement = EngagementState::Engaged;
        self.target = Some(target);
        self.alert = AlertState::default();
    }

    pub(crate) fn disengage(&mut self) {
        self.engagement = EngagementState::Idle;
        self.target = None;
        self.alert = AlertState::default();
    }

    /// Advances the per-frame counters owned by the battler.
    pub(crate) fn tick_timers(&mut self) {
        self.cooldowns.tick();
        Stance::tick(&mut self.guard);
        Stance::tick(&mut self.parry_window);

        if self.engagement == EngagementState::Alerted {
            self.alert.counter = self.alert.counter.saturating_sub(1);
            if self.alert.counter == 0 {
                self.disengage();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_determines_default_team() {
        let ally = Battler::new(BattlerId(1), BattlerKind::Ally, Position::ORIGIN);
        let enemy = Battler::new(BattlerId(2), BattlerKind::Enemy, Position::ORIGIN);
        assert_eq!(ally.team(), Team::Party);
        assert_eq!(enemy.team(), Team::Enemy);
        assert!(ally.team().opposes(enemy.team()));
        assert!(!enemy.team().opposes(Team::Neutral));
    }

    #[test]
    fn alert_falls_back_to_idle() {
        let mut enemy = Battler::new(BattlerId(2), BattlerKind::Enemy, Position::ORIGIN);
        enemy.raise_alert(Position::new(9, 9), 2);
        assert_eq!(enemy.engagement(), EngagementState::Alerted);
        assert_eq!(enemy.alert().origin, Some(Position::new(9, 9)));

        enemy.tick_timers();
        assert_eq!(enemy.engagement(), EngagementState::Alerted);
        enemy.tick_timers();
        assert_eq!(enemy.engagement(), EngagementState::Idle);
        assert_eq!(enemy.alert().origin, None);
    }

    #[test]
    fn engaged_battlers_ignore_alerts() {
        let mut enemy = Battler::new(BattlerId(2), BattlerKind::Enemy, Position::ORIGIN);
        enemy.engage(BattlerId(0));
        enemy.raise_alert(Position::new(1, 1), 10);
        assert_eq!(enemy.engagement(), EngagementState::Engaged);
        assert_eq!(enemy.target(), Some(BattlerId(0)));
    }

    #[test]
    fn stances_expire() {
        let mut battler = Battler::new(BattlerId(1), BattlerKind::Player, Position::ORIGIN);
        battler.guard = Some(Stance {
            slot: SlotKey::Offhand,
            frames: 1,
        });
        assert!(battler.is_guarding());
        battler.tick_timers();
        assert!(!battler.is_guarding());
    }
}
