//! Live instance of a cast skill.
//!
//! Lifecycle per frame: `Delaying -> Active -> (PiercingCooldown <-> Active) -> Expired`.
//! Removal is deferred: an action flagged on frame `n` is dropped by the
//! cleanup at the end of frame `n + 1`'s action pass, which guarantees every
//! action gets at least one collision pass.

use crate::geometry::Hitbox;
use crate::state::{ActionId, BattlerId, Direction, Position, SkillId, SlotKey};

/// Result of advancing an active (non-delaying) action by one frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ActivePhase {
    /// Duration or piercing budget ran out; the action is flagged for removal.
    Expired,
    /// Between piercing hits; exists but cannot hit this frame.
    PiercingCooldown,
    /// Eligible for collision this frame.
    Ready,
}

/// Tile-by-tile travel of a projectile action.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ProjectileMotion {
    pub frames_per_tile: u32,
    pub progress: u32,
}

/// A live action on the map.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Action {
    pub(crate) id: ActionId,
    pub(crate) caster: BattlerId,
    pub(crate) skill: SkillId,
    pub(crate) slot: Option<SlotKey>,
    pub(crate) hitbox: Hitbox,
    pub(crate) proximity: f64,
    pub(crate) position: Position,
    pub(crate) delay_remaining: u32,
    pub(crate) duration_remaining: u32,
    pub(crate) piercing_hits_remaining: u32,
    pub(crate) piercing_delay: u32,
    pub(crate) piercing_delay_remaining: u32,
    pub(crate) active_frames: u32,
    pub(crate) is_direct: bool,
    pub(crate) is_retaliation: bool,
    pub(crate) touch_trigger: bool,
    pub(crate) projectile: Option<ProjectileMotion>,
    pub(crate) needs_removal: bool,
    pub(crate) flagged_at: Option<u64>,
}

impl Action {
    pub fn id(&self) -> ActionId {
        self.id
    }

    pub fn caster(&self) -> BattlerId {
        self.caster
    }

    pub fn skill(&self) -> SkillId {
        self.skill
    }

    pub fn slot(&self) -> Option<SlotKey> {
        self.slot
    }

    pub fn hitbox(&self) -> Hitbox {
        self.hitbox
    }

    pub fn facing(&self) -> Direction {
        self.hitbox.facing
    }

    pub fn position(&self) -> Position {
        self.position
    }

    pub fn delay_remaining(&self) -> u32 {
        self.delay_remaining
    }

    pub fn duration_remaining(&self) -> u32 {
        self.duration_remaining
    }

    pub fn piercing_hits_remaining(&self) -> u32 {
        self.piercing_hits_remaining
    }

    pub fn piercing_delay_remaining(&self) -> u32 {
        self.piercing_delay_remaining
    }

    pub fn is_direct(&self) -> bool {
        self.is_direct
    }

    pub fn is_retaliation(&self) -> bool {
        self.is_retaliation
    }

    pub fn needs_removal(&self) -> bool {
        self.needs_removal
    }

    pub fn is_delaying(&self) -> bool {
        self.delay_remaining > 0
    }

    /// Counts the cast delay down. Returns true while the action is still
    /// delaying this frame.
    pub(crate) fn advance_delay(&mut self) -> bool {
        if self.delay_remaining == 0 {
            return false;
        }
        self.delay_remaining -= 1;
        true
    }

    /// Ends the delay early (touch trigger).
    pub(crate) fn trigger(&mut self) {
        self.delay_remaining = 0;
    }

    /// Advances duration and piercing counters of an action past its delay.
    ///
    /// Every action gets at least one collision pass, whatever `min_lifetime`.
    pub(crate) fn advance_active(&mut self, min_lifetime: u32, frame: u64) -> ActivePhase {
        self.duration_remaining = self.duration_remaining.saturating_sub(1);

        let spent = self.duration_remaining == 0 || self.piercing_hits_remaining == 0;
        if spent && self.active_frames >= min_lifetime.max(1) {
            self.flag_removal(frame);
            return ActivePhase::Expired;
        }
        self.active_frames += 1;

        if self.piercing_delay_remaining > 0 {
            self.piercing_delay_remaining -= 1;
            return ActivePhase::PiercingCooldown;
        }
        ActivePhase::Ready
    }

    /// Consumes one piercing hit and restarts the piercing delay.
    pub(crate) fn record_hit(&mut self) {
        self.piercing_hits_remaining = self.piercing_hits_remaining.saturating_sub(1);
        self.piercing_delay_remaining = self.piercing_delay;
    }

    /// Moves a projectile one tile when its travel counter fills up.
    ///
    /// `passable` reports whether the tile ahead can be entered. A blocked
    /// projectile is spent.
    pub(crate) fn advance_projectile<F>(&mut self, passable: F)
    where
        F: FnOnce(Position, Direction) -> bool,
    {
        let Some(motion) = self.projectile.as_mut() else {
            return;
        };
        motion.progress += 1;
        if motion.progress < motion.frames_per_tile.max(1) {
            return;
        }
        motion.progress = 0;

        let facing = self.hitbox.facing;
        if passable(self.position, facing) {
            self.position = self.position.step(facing);
        } else {
            self.piercing_hits_remaining = 0;
        }
    }

    /// Flags the action for removal. Only the first call records the frame.
    pub(crate) fn flag_removal(&mut self, frame: u64) {
        if !self.needs_removal {
            self.needs_removal = true;
            self.flagged_at = Some(frame);
        }
    }

    /// True once the frame after flagging has run its action pass.
    pub(crate) fn is_due_for_cleanup(&self, frame: u64) -> bool {
        self.flagged_at.is_some_and(|flagged| flagged < frame)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::CollisionShape;

    fn sample_action(duration: u32, hits: u32) -> Action {
        Action {
            id: ActionId(1),
            caster: BattlerId(0),
            skill: SkillId(1),
            slot: None,
            hitbox: Hitbox::new(CollisionShape::Circle, 1.0, Direction::Down),
            proximity: 1.0,
            position: Position::ORIGIN,
            delay_remaining: 0,
            duration_remaining: duration,
            piercing_hits_remaining: hits,
            piercing_delay: 2,
            piercing_delay_remaining: 0,
            active_frames: 0,
            is_direct: false,
            is_retaliation: false,
            touch_trigger: false,
            projectile: None,
            needs_removal: false,
            flagged_at: None,
        }
    }

    #[test]
    fn instant_action_gets_one_collision_pass() {
        let mut action = sample_action(0, 1);
        assert_eq!(action.advance_active(1, 1), ActivePhase::Ready);
        assert_eq!(action.advance_active(1, 2), ActivePhase::Expired);
        assert!(action.needs_removal());
        assert!(!action.is_due_for_cleanup(2));
        assert!(action.is_due_for_cleanup(3));
    }

    #[test]
    fn zero_min_lifetime_still_allows_one_pass() {
        let mut action = sample_action(1, 1);
        assert_eq!(action.advance_active(0, 1), ActivePhase::Ready);
        assert_eq!(action.advance_active(0, 2), ActivePhase::Expired);
    }

    #[test]
    fn piercing_delay_blocks_consecutive_hits() {
        let mut action = sample_action(10, 3);
        assert_eq!(action.advance_active(1, 1), ActivePhase::Ready);
        action.record_hit();
        assert_eq!(action.piercing_hits_remaining(), 2);
        assert_eq!(action.advance_active(1, 2), ActivePhase::PiercingCooldown);
        assert_eq!(action.advance_active(1, 3), ActivePhase::PiercingCooldown);
        assert_eq!(action.advance_active(1, 4), ActivePhase::Ready);
    }

    #[test]
    fn removal_frame_is_recorded_once() {
        let mut action = sample_action(5, 1);
        action.flag_removal(4);
        action.flag_removal(9);
        assert_eq!(action.flagged_at, Some(4));
    }

    #[test]
    fn delay_counts_down_before_activation() {
        let mut action = sample_action(5, 1);
        action.delay_remaining = 2;
        assert!(action.advance_delay());
        assert!(action.advance_delay());
        assert!(!action.advance_delay());
    }

    #[test]
    fn blocked_projectile_is_spent() {
        let mut action = sample_action(30, 2);
        action.projectile = Some(ProjectileMotion {
            frames_per_tile: 1,
            progress: 0,
        });
        action.advance_projectile(|_, _| true);
        assert_eq!(action.position(), Position::new(0, 1));
        action.advance_projectile(|_, _| false);
        assert_eq!(action.position(), Position::new(0, 1));
        assert_eq!(action.piercing_hits_remaining(), 0);
    }
}
