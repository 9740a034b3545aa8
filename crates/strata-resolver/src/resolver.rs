use strata_catalog::{Catalog, Layer, TraitRef};
use strata_types::{CollectionState, Identifier, TraitVector};

use crate::error::{ResolveError, ResolveResult};
use crate::overrides::OverrideTable;

/// Layer-specific selection value for an identifier.
///
/// `(identifier + layer + seed mod capacity) * prime mod capacity`, reduced
/// before the multiply so the product fits in `u128`.
pub fn scramble(identifier: u64, layer: usize, seed: u64, capacity: u64, prime: u64) -> u64 {
    let cap = u128::from(capacity);
    let base = (u128::from(identifier) + layer as u128 + u128::from(seed) % cap) % cap;
    ((base * u128::from(prime)) % cap) as u64
}

/// Weighted lottery: the slot whose `[lower, lower + weight)` interval holds
/// `value`, walking traits in slot order.
pub fn select_trait(layer: &Layer, layer_index: usize, value: u64) -> ResolveResult<usize> {
    let value = u128::from(value);
    let mut lower: u128 = 0;
    for (slot, candidate) in layer.traits.iter().enumerate() {
        let upper = lower + u128::from(candidate.weight);
        if value >= lower && value < upper {
            return Ok(slot);
        }
        lower = upper;
    }
    Err(ResolveError::InvalidSelection {
        layer: layer_index,
        value: value as u64,
    })
}

/// Read-only view deriving trait vectors from identifiers.
pub struct TraitResolver<'a> {
    catalog: &'a Catalog,
    overrides: &'a OverrideTable,
    state: &'a CollectionState,
}

impl<'a> TraitResolver<'a> {
    pub fn new(
        catalog: &'a Catalog,
        overrides: &'a OverrideTable,
        state: &'a CollectionState,
    ) -> Self {
        Self {
            catalog,
            overrides,
            state,
        }
    }

    /// Trait vector for `identifier`.
    ///
    /// An override is returned verbatim. Otherwise each layer is rolled in
    /// order, except layers already forced by a link from an earlier pick.
    /// Links leave rolled traits only; a forced trait's own link is ignored.
    pub fn derive(&self, identifier: Identifier) -> ResolveResult<TraitVector> {
        if !self.state.is_revealed() {
            return Err(ResolveError::NotRevealed);
        }
        if let Some(vector) = self.overrides.get(identifier) {
            return Ok(vector.clone());
        }

        let seed = self.state.reveal_seed();
        let capacity = self.state.capacity();
        let layer_count = self.catalog.layer_count();
        let mut slots = vec![0usize; layer_count];
        let mut forced = vec![false; layer_count];

        for (index, layer) in self.catalog.layers().iter().enumerate() {
            if forced[index] {
                continue;
            }
            let value = scramble(
                identifier.value(),
                index,
                seed,
                capacity,
                layer.selection_prime,
            );
            let slot = select_trait(layer, index, value)?;
            slots[index] = slot;

            let source = TraitRef::new(index, slot);
            if let Some(rule) = self.catalog.link(source) {
                if self.catalog.trait_at(rule.target()).is_none() {
                    return Err(ResolveError::BrokenLink {
                        from: source,
                        target: rule.target(),
                    });
                }
                slots[rule.target_layer] = rule.forced_slot;
                forced[rule.target_layer] = true;
            }
        }

        Ok(TraitVector::new(slots))
    }
}
