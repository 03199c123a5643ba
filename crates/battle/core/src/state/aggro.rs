use std::collections::BTreeMap;

use crate::state::BattlerId;

/// Aggro a battler holds toward each opponent. Values never drop below zero.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AggroTable {
    entries: BTreeMap<BattlerId, f64>,
}

impl AggroTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, opponent: BattlerId) -> f64 {
        self.entries.get(&opponent).copied().unwrap_or(0.0)
    }

    /// Adds `delta` (possibly negative) and clamps the result at zero.
    /// Returns the new value.
    pub fn adjust(&mut self, opponent: BattlerId, delta: f64) -> f64 {
        let entry = self.entries.entry(opponent).or_insert(0.0);
        let next = *entry + delta;
        *entry = if next.is_finite() { next.max(0.0) } else { 0.0 };
        *entry
    }

    pub fn remove(&mut self, opponent: BattlerId) -> Option<f64> {
        self.entries.remove(&opponent)
    }

    /// Opponent with the highest aggro. Ties resolve to the lowest id.
    pub fn highest(&self) -> Option<(BattlerId, f64)> {
        self.entries
            .iter()
            .fold(None, |best: Option<(BattlerId, f64)>, (&id, &value)| match best {
                Some((_, top)) if top >= value => best,
                _ => Some((id, value)),
            })
    }

    pub fn iter(&self) -> impl Iterator<Item = (BattlerId, f64)> + '_ {
        self.entries.iter().map(|(&id, &value)| (id, value))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn adjust_clamps_at_zero() {
        let mut table = AggroTable::new();
        assert_eq!(table.adjust(BattlerId(2), 30.0), 30.0);
        assert_eq!(table.adjust(BattlerId(2), -100.0), 0.0);
        assert_eq!(table.get(BattlerId(2)), 0.0);
    }

    #[test]
    fn highest_prefers_lowest_id_on_ties() {
        let mut table = AggroTable::new();
        table.adjust(BattlerId(5), 10.0);
        table.adjust(BattlerId(3), 10.0);
        table.adjust(BattlerId(9), 4.0);
        assert_eq!(table.highest(), Some((BattlerId(3), 10.0)));
    }
}
