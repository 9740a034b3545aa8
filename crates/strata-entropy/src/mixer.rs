use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::environment::EnvironmentSnapshot;

/// Domain-separated BLAKE3 mixer turning an environment snapshot into seed
/// material.
///
/// Allocation and reveal use different domains so the same block can never
/// yield correlated seeds for both.
pub struct EntropyMixer {
    domain: &'static str,
}

impl EntropyMixer {
    /// Mixer for allocation batch RNG seeds.
    pub const ALLOCATION: Self = Self {
        domain: "strata-allocation-v1",
    };
    /// Mixer for the collection reveal seed.
    pub const REVEAL: Self = Self {
        domain: "strata-reveal-v1",
    };

    pub const fn new(domain: &'static str) -> Self {
        Self { domain }
    }

    /// Mix a snapshot and a request-specific salt into 32 bytes.
    pub fn mix(&self, snapshot: &EnvironmentSnapshot, salt: u64) -> [u8; 32] {
        let mut hasher = blake3::Hasher::new();
        hasher.update(self.domain.as_bytes());
        hasher.update(b":");
        hasher.update(&snapshot.block_height.to_le_bytes());
        hasher.update(&snapshot.timestamp_ms.to_le_bytes());
        hasher.update(&snapshot.prev_block_hash);
        hasher.update(snapshot.caller.as_bytes());
        hasher.update(&snapshot.gas_price.to_le_bytes());
        hasher.update(&salt.to_le_bytes());
        *hasher.finalize().as_bytes()
    }

    /// Mix into a non-zero `u64`.
    pub fn mix_u64(&self, snapshot: &EnvironmentSnapshot, salt: u64) -> u64 {
        let bytes = self.mix(snapshot, salt);
        let mut word = [0u8; 8];
        word.copy_from_slice(&bytes[..8]);
        // Zero is reserved as "not revealed".
        u64::from_le_bytes(word).max(1)
    }

    /// Seed a batch RNG from the mix.
    pub fn rng(&self, snapshot: &EnvironmentSnapshot, salt: u64) -> StdRng {
        StdRng::from_seed(self.mix(snapshot, salt))
    }
}
