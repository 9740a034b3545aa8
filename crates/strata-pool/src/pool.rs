use std::collections::HashMap;

use rand::Rng;
use strata_entropy::{EntropyMixer, Environment};
use strata_types::{AccountId, CollectionState, Identifier, ItemId};
use tracing::debug;

use crate::error::{PoolError, PoolResult};

/// Drain-only sampler over `0..capacity`.
///
/// The live range is `0..state.remaining()`. A draw picks a live slot,
/// returns its value, then moves the value at the end of the live range into
/// the drawn slot and shrinks the range by one (Fisher-Yates). Slots absent
/// from `displaced` hold their own index.
///
/// The pool keeps no counter of its own: the remaining count lives in
/// [`CollectionState`], which must only be drained through this pool.
#[derive(Debug, Default)]
pub struct AllocationPool {
    displaced: HashMap<u64, u64>,
}

impl AllocationPool {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of slots currently holding a value other than their index.
    pub fn displaced_len(&self) -> usize {
        self.displaced.len()
    }

    fn slot_value(&self, slot: u64) -> u64 {
        self.displaced.get(&slot).copied().unwrap_or(slot)
    }

    /// Draw `count` distinct identifiers using `rng`.
    ///
    /// All-or-nothing: when `count` exceeds the remaining identifiers nothing
    /// is drawn and the state is left untouched.
    pub fn allocate<R: Rng + ?Sized>(
        &mut self,
        state: &mut CollectionState,
        count: u64,
        rng: &mut R,
    ) -> PoolResult<Vec<Identifier>> {
        let live = state.remaining();
        state.drain(count).map_err(|_| PoolError::Exhausted {
            requested: count,
            remaining: live,
        })?;

        let mut drawn = Vec::with_capacity(count as usize);
        for k in 0..count {
            let size = live - k;
            let r = rng.gen_range(0..size);
            let last = size - 1;

            drawn.push(Identifier(self.slot_value(r)));

            if r != last {
                let tail = self.slot_value(last);
                if tail == r {
                    self.displaced.remove(&r);
                } else {
                    self.displaced.insert(r, tail);
                }
            }
            // `last` is now outside the live range and is never read again.
            self.displaced.remove(&last);
        }

        debug!(
            count,
            remaining = state.remaining(),
            displaced = self.displaced.len(),
            "allocated identifier batch"
        );
        Ok(drawn)
    }

    /// Draw a creation batch seeded from the host environment.
    ///
    /// The batch RNG mixes the environment snapshot with the batch's first
    /// item index, so consecutive batches in one block still diverge.
    pub fn allocate_from(
        &mut self,
        state: &mut CollectionState,
        count: u64,
        environment: &dyn Environment,
        caller: &AccountId,
        start_item: ItemId,
    ) -> PoolResult<Vec<Identifier>> {
        if count > state.remaining() {
            return Err(PoolError::Exhausted {
                requested: count,
                remaining: state.remaining(),
            });
        }
        let snapshot = environment.snapshot(caller);
        let mut rng = EntropyMixer::ALLOCATION.rng(&snapshot, start_item.value());
        self.allocate(state, count, &mut rng)
    }
}
