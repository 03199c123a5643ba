//! Knockback distance and obstacle-aware pushing.

use crate::env::MapOracle;
use crate::state::{Direction, Position};

/// Tiles a target is pushed: `floor(base * (100 - resist) / 100)`.
pub fn knockback_tiles(base: u32, resist_percent: u32) -> u32 {
    let kept = u64::from(100 - resist_percent.min(100));
    // Never exceeds `base`, so the narrowing cannot fail.
    u32::try_from(u64::from(base) * kept / 100).unwrap_or(base)
}

/// Pushes `from` up to `tiles` steps along `direction`, stopping at the
/// first impassable tile.
pub fn push(map: &dyn MapOracle, from: Position, direction: Direction, tiles: u32) -> Position {
    let mut position = from;
    for _ in 0..tiles {
        if !map.is_passable(position, direction) {
            break;
        }
        position = position.step(direction);
    }
    position
}
