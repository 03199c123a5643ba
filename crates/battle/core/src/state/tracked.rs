//! Engine-owned timers mirroring timed status afflictions.
//!
//! The stats provider owns the actual states; this table only decides when
//! they run out. At most one record exists per (battler, state) pair.

use crate::state::{BattlerId, StateId};

/// A single timed affliction.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TrackedState {
    pub battler: BattlerId,
    pub state: StateId,
    /// Frames left before expiry.
    pub duration: u32,
    pub expired: bool,
}

/// All tracked afflictions, kept sorted by (battler, state).
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TrackedStates {
    records: Vec<TrackedState>,
}

impl TrackedStates {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts tracking `state` on `battler`, or refreshes the existing record.
    ///
    /// Returns true when a new record was created.
    pub fn afflict(&mut self, battler: BattlerId, state: StateId, duration: u32) -> bool {
        match self.search(battler, state) {
            Ok(index) => {
                let record = &mut self.records[index];
                record.duration = duration;
                record.expired = false;
                false
            }
            Err(index) => {
                self.records.insert(
                    index,
                    TrackedState {
                        battler,
                        state,
                        duration,
                        expired: false,
                    },
                );
                true
            }
        }
    }

    pub fn get(&self, battler: BattlerId, state: StateId) -> Option<&TrackedState> {
        self.search(battler, state).ok().map(|index| &self.records[index])
    }

    fn search(&self, battler: BattlerId, state: StateId) -> Result<usize, usize> {
        self.records
            .binary_search_by_key(&(battler, state), |r| (r.battler, r.state))
    }

    pub fn is_active(&self, battler: BattlerId, state: StateId) -> bool {
        self.get(battler, state).is_some_and(|r| !r.expired)
    }

    /// Active states of one battler, in state-id order.
    pub fn states_of(&self, battler: BattlerId) -> impl Iterator<Item = &TrackedState> + '_ {
        self.records
            .iter()
            .filter(move |record| record.battler == battler && !record.expired)
    }

    /// Advances every timer by one frame and removes records that ran out.
    ///
    /// Returns the expired records so the caller can lift the underlying states.
    pub fn tick(&mut self) -> Vec<TrackedState> {
        let mut expired = Vec::new();
        for record in &mut self.records {
            record.duration = record.duration.saturating_sub(1);
            if record.duration == 0 {
                record.expired = true;
                expired.push(*record);
            }
        }
        self.records.retain(|record| !record.expired);
        expired
    }

    /// Drops every record belonging to `battler`.
    pub fn forget(&mut self, battler: BattlerId) {
        self.records.retain(|record| record.battler != battler);
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const POISON: StateId = StateId(4);

    #[test]
    fn reapplying_refreshes_without_duplicating() {
        let mut table = TrackedStates::new();
        assert!(table.afflict(BattlerId(1), POISON, 10));
        table.tick();
        table.tick();
        assert_eq!(table.get(BattlerId(1), POISON).unwrap().duration, 8);

        assert!(!table.afflict(BattlerId(1), POISON, 10));
        assert_eq!(table.len(), 1);
        assert_eq!(table.get(BattlerId(1), POISON).unwrap().duration, 10);
    }

    #[test]
    fn tick_expires_and_removes_at_zero() {
        let mut table = TrackedStates::new();
        table.afflict(BattlerId(1), POISON, 2);
        table.afflict(BattlerId(2), POISON, 5);

        assert!(table.tick().is_empty());
        let expired = table.tick();
        assert_eq!(expired.len(), 1);
        assert_eq!(expired[0].battler, BattlerId(1));
        assert!(expired[0].expired);
        assert!(!table.is_active(BattlerId(1), POISON));
        assert!(table.is_active(BattlerId(2), POISON));
    }

    #[test]
    fn states_of_filters_by_battler() {
        let mut table = TrackedStates::new();
        table.afflict(BattlerId(1), StateId(1), 5);
        table.afflict(BattlerId(1), StateId(7), 5);
        table.afflict(BattlerId(2), StateId(3), 5);

        let ids: Vec<_> = table.states_of(BattlerId(1)).map(|r| r.state).collect();
        assert_eq!(ids, vec![StateId(1), StateId(7)]);

        table.forget(BattlerId(1));
        assert_eq!(table.len(), 1);
    }
}
