//! Seed-addressed random numbers for parry, counter and loot rolls.
//!
//! Rolls are pure functions of a seed, so a battle replays identically
//! from the same state snapshot. The engine derives each seed from the
//! battle seed, its roll nonce, the rolling battler and a [`RollContext`].

/// RNG oracle for deterministic random number generation.
///
/// Implementations must return the same values for the same seed.
pub trait RngOracle {
    /// Generate a random u32 value from a seed.
    fn next_u32(&self, seed: u64) -> u32;

    /// Uniform value in `[0, 1)`.
    fn random_unit(&self, seed: u64) -> f64 {
        f64::from(self.next_u32(seed)) / (f64::from(u32::MAX) + 1.0)
    }

    /// Returns true with probability `chance` (clamped to `[0, 1]`).
    fn chance(&self, seed: u64, chance: f64) -> bool {
        self.random_unit(seed) < chance.clamp(0.0, 1.0)
    }
}

/// Distinguishes independent rolls made for the same battler and nonce.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u32)]
pub enum RollContext {
    Parry = 0,
    AutoCounter = 1,
    Retaliation = 2,
    Loot = 3,
}

/// PCG-XSH-RR: 64-bit LCG state, 32-bit permuted output.
#[derive(Clone, Copy, Debug, Default)]
pub struct PcgRng;

impl PcgRng {
    const MULTIPLIER: u64 = 6364136223846793005;
    const INCREMENT: u64 = 1442695040888963407;

    #[inline]
    fn step(state: u64) -> u64 {
        state
            .wrapping_mul(Self::MULTIPLIER)
            .wrapping_add(Self::INCREMENT)
    }

    #[inline]
    fn output(state: u64) -> u32 {
        let xorshifted = (((state >> 18) ^ state) >> 27) as u32;
        let rot = (state >> 59) as u32;
        xorshifted.rotate_right(rot)
    }
}

impl RngOracle for PcgRng {
    fn next_u32(&self, seed: u64) -> u32 {
        Self::output(Self::step(seed))
    }
}

/// Mixes the battle seed, roll nonce, rolling battler and roll context
/// into a single seed (SplitMix64-style avalanche).
pub fn compute_seed(battle_seed: u64, nonce: u64, battler: u32, context: RollContext) -> u64 {
    let mut hash = battle_seed;
    hash ^= nonce.wrapping_mul(0x9e3779b97f4a7c15);
    hash ^= u64::from(battler).wrapping_mul(0x517cc1b727220a95);
    hash ^= (context as u64).wrapping_mul(0x85ebca6b);

    hash ^= hash >> 33;
    hash = hash.wrapping_mul(0xff51afd7ed558ccd);
    hash ^= hash >> 33;
    hash
}
