use serde::{Deserialize, Serialize};

use crate::error::TypeError;
use crate::item::Identifier;

/// How the collection's reveal seed comes into existence.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum RevealMode {
    /// Seed is set at construction; identifiers are interpreted directly.
    Immediate,
    /// Seed is set later by an explicit operator reveal; identifiers are
    /// rotated by the seed before interpretation.
    Delayed,
}

/// Collection-wide mutable state.
///
/// Owned by the top-level collection service and passed by reference into
/// the pool, catalog and resolver. Two transitions are one-way: `remaining`
/// only shrinks, and `reveal_seed` moves from zero to a non-zero value once.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollectionState {
    capacity: u64,
    remaining: u64,
    reveal_seed: u64,
    reveal_mode: RevealMode,
}

impl CollectionState {
    /// Fresh state: nothing allocated, not revealed.
    pub fn new(capacity: u64, reveal_mode: RevealMode) -> Result<Self, TypeError> {
        if capacity == 0 {
            return Err(TypeError::ZeroCapacity);
        }
        Ok(Self {
            capacity,
            remaining: capacity,
            reveal_seed: 0,
            reveal_mode,
        })
    }

    pub fn capacity(&self) -> u64 {
        self.capacity
    }

    /// Identifiers not yet drawn.
    pub fn remaining(&self) -> u64 {
        self.remaining
    }

    /// Identifiers already drawn.
    pub fn allocated(&self) -> u64 {
        self.capacity - self.remaining
    }

    /// Sealed once every identifier has been drawn.
    pub fn is_sealed(&self) -> bool {
        self.remaining == 0
    }

    pub fn reveal_seed(&self) -> u64 {
        self.reveal_seed
    }

    pub fn is_revealed(&self) -> bool {
        self.reveal_seed != 0
    }

    pub fn reveal_mode(&self) -> RevealMode {
        self.reveal_mode
    }

    /// Record that `count` identifiers left the pool.
    pub fn drain(&mut self, count: u64) -> Result<(), TypeError> {
        if count > self.remaining {
            return Err(TypeError::InsufficientRemaining {
                requested: count,
                remaining: self.remaining,
            });
        }
        self.remaining -= count;
        Ok(())
    }

    /// Set the reveal seed. Valid exactly once, and only with a non-zero seed.
    pub fn set_reveal_seed(&mut self, seed: u64) -> Result<(), TypeError> {
        if seed == 0 {
            return Err(TypeError::ZeroSeed);
        }
        if self.is_revealed() {
            return Err(TypeError::AlreadyRevealed);
        }
        self.reveal_seed = seed;
        Ok(())
    }

    /// The identifier actually fed to trait derivation for an allocated one.
    ///
    /// Delayed reveal rotates by the seed so the item-to-traits mapping is
    /// unpredictable before reveal; immediate reveal is the identity.
    pub fn derivation_identifier(&self, allocated: Identifier) -> Identifier {
        match self.reveal_mode {
            RevealMode::Immediate => allocated,
            RevealMode::Delayed => {
                let cap = u128::from(self.capacity);
                let rotated =
                    (u128::from(allocated.0) + u128::from(self.reveal_seed) % cap) % cap;
                Identifier(rotated as u64)
            }
        }
    }
}
