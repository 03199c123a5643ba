use crate::state::{ItemId, PickupId, Position};

/// Loot lying on the map after a defeat, waiting to be collected.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Pickup {
    pub id: PickupId,
    pub item: ItemId,
    pub position: Position,
    /// Frames left before the pickup vanishes.
    pub expires_in: u32,
}

impl Pickup {
    /// Counts the expiration timer down. Returns true once it ran out.
    pub fn tick(&mut self) -> bool {
        self.expires_in = self.expires_in.saturating_sub(1);
        self.expires_in == 0
    }
}
