use std::sync::Mutex;
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};
use strata_types::AccountId;

/// Everything the host exposes at request time that feeds entropy mixing.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnvironmentSnapshot {
    /// Chain height (or any monotonically increasing request counter).
    pub block_height: u64,
    /// Wall-clock time in milliseconds since the Unix epoch.
    pub timestamp_ms: u64,
    /// Hash of the previous block.
    pub prev_block_hash: [u8; 32],
    /// Account issuing the request.
    pub caller: AccountId,
    /// Gas price visible to the requester.
    pub gas_price: u64,
}

/// Source of request-time environment data.
pub trait Environment: Send + Sync {
    /// Capture the environment as seen by `caller`.
    fn snapshot(&self, caller: &AccountId) -> EnvironmentSnapshot;
}

struct ChainState {
    height: u64,
    prev_hash: [u8; 32],
}

/// Environment for hosts without a real chain.
///
/// Each snapshot advances a simulated block: height increments and the
/// previous-block hash chains over the last snapshot. The chain starts from a
/// random hash so two hosts never share a sequence.
pub struct HostEnvironment {
    gas_price: u64,
    chain: Mutex<ChainState>,
}

impl HostEnvironment {
    pub fn new(gas_price: u64) -> Self {
        let mut genesis = [0u8; 32];
        rand::Rng::fill(&mut rand::thread_rng(), &mut genesis);
        Self {
            gas_price,
            chain: Mutex::new(ChainState {
                height: 0,
                prev_hash: genesis,
            }),
        }
    }

    fn wall_clock_ms() -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_millis() as u64
    }
}

impl Default for HostEnvironment {
    fn default() -> Self {
        Self::new(1)
    }
}

impl Environment for HostEnvironment {
    fn snapshot(&self, caller: &AccountId) -> EnvironmentSnapshot {
        let timestamp_ms = Self::wall_clock_ms();
        let mut chain = self.chain.lock().expect("chain mutex poisoned");
        chain.height += 1;

        let snapshot = EnvironmentSnapshot {
            block_height: chain.height,
            timestamp_ms,
            prev_block_hash: chain.prev_hash,
            caller: caller.clone(),
            gas_price: self.gas_price,
        };

        let mut hasher = blake3::Hasher::new();
        hasher.update(&chain.prev_hash);
        hasher.update(&chain.height.to_le_bytes());
        hasher.update(&timestamp_ms.to_le_bytes());
        chain.prev_hash = *hasher.finalize().as_bytes();

        snapshot
    }
}

/// Environment with every input pinned, for tests and reproducible runs.
///
/// The caller is the only field taken from the request.
#[derive(Clone, Debug)]
pub struct FixedEnvironment {
    pub block_height: u64,
    pub timestamp_ms: u64,
    pub prev_block_hash: [u8; 32],
    pub gas_price: u64,
}

impl FixedEnvironment {
    /// Derive all pinned fields from one number.
    pub fn from_seed(seed: u64) -> Self {
        Self {
            block_height: seed,
            timestamp_ms: seed.wrapping_mul(1_000),
            prev_block_hash: *blake3::hash(&seed.to_le_bytes()).as_bytes(),
            gas_price: 1,
        }
    }
}

impl Environment for FixedEnvironment {
    fn snapshot(&self, caller: &AccountId) -> EnvironmentSnapshot {
        EnvironmentSnapshot {
            block_height: self.block_height,
            timestamp_ms: self.timestamp_ms,
            prev_block_hash: self.prev_block_hash,
            caller: caller.clone(),
            gas_price: self.gas_price,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn host_environment_advances_blocks() {
        let env = HostEnvironment::default();
        let caller = AccountId::derive("minter");
        let a = env.snapshot(&caller);
        let b = env.snapshot(&caller);
        assert_eq!(b.block_height, a.block_height + 1);
        assert_ne!(a.prev_block_hash, b.prev_block_hash);
        assert_eq!(a.caller, caller);
    }

    #[test]
    fn fixed_environment_is_stable() {
        let env = FixedEnvironment::from_seed(9);
        let caller = AccountId::derive("minter");
        assert_eq!(env.snapshot(&caller), env.snapshot(&caller));
    }

    #[test]
    fn fixed_environment_reports_caller() {
        let env = FixedEnvironment::from_seed(9);
        let alice = AccountId::derive("alice");
        let bob = AccountId::derive("bob");
        assert_eq!(env.snapshot(&alice).caller, alice);
        assert_ne!(env.snapshot(&alice), env.snapshot(&bob));
    }
}
